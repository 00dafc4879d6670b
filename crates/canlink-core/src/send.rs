//! Outbound half of a link.
//!
//! A message of up to 7 octets leaves as one single frame and the send
//! completes synchronously. Anything longer opens with a first frame and
//! then waits: consecutive frames flow only while the peer has granted
//! block credit, paced by the advertised separation time, and every
//! frame of progress re-arms the BS deadline for the next flow control.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ send(>7)  ┌─────────────┐ last CF sent ┌──────┐
//! │ Idle │──────────>│ InProgress  │─────────────>│ Idle │
//! └──────┘           └─────────────┘              └──────┘
//!     │ send(≤7)           │ FC overflow / wait overrun /
//!     │ SF + done          │ BS timeout / transmit failure
//!     ↓                    ↓
//!  stays Idle         ┌───────┐   next send()
//!                     │ Error │─────────────────> Idle
//!                     └───────┘
//! ```
//!
//! The state machine never sleeps; the host's `poll` cadence is the only
//! engine of progress between flow controls.

use canlink_proto::{
    CF_MAX_DATA, ConsecutiveFrame, FF_DATA, FirstFrame, FlowControl, FlowStatus, MAX_MESSAGE_SIZE,
    Pdu, SF_MAX_DATA, SingleFrame,
};

use crate::{
    error::{Diagnostic, SendError, TransferFailure},
    link::Link,
    shim::Shim,
    storage::Storage,
    time,
};

/// Send-side status of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// No transfer running; `send` may start one.
    Idle,
    /// A multi-frame transfer is being paced out.
    InProgress,
    /// The last transfer was aborted; `send` may start a new one.
    Error,
}

/// Consecutive-frame credit granted by the most recent flow control.
///
/// A wire BS of zero means the peer wants the whole remainder without
/// further flow controls; any other value is a bounded block. After the
/// first frame the credit is an exhausted block, so nothing flows until
/// the peer speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockCredit {
    /// BS 0: the remainder may be sent without further flow controls.
    Unlimited,
    /// Frames left in the granted block.
    Frames(u16),
}

impl BlockCredit {
    pub(crate) fn available(self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Frames(n) => n > 0,
        }
    }

    pub(crate) fn consume(&mut self) {
        if let Self::Frames(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

/// State and buffer of the outbound direction.
pub(crate) struct SendHalf<'buf, M: Storage> {
    pub(crate) arena: &'buf mut [M::Word],
    pub(crate) capacity: usize,
    pub(crate) size: usize,
    pub(crate) offset: usize,
    pub(crate) sn: u8,
    pub(crate) credit: BlockCredit,
    pub(crate) st_min_ms: u8,
    pub(crate) wait_count: u8,
    pub(crate) timer_st: u32,
    pub(crate) timer_bs: u32,
    pub(crate) status: SendStatus,
    pub(crate) diagnostic: Option<Diagnostic>,
}

impl<'buf, M: Storage> SendHalf<'buf, M> {
    pub(crate) fn new(arena: &'buf mut [M::Word]) -> Self {
        let capacity = arena.len() * M::WIDTH;
        Self {
            arena,
            capacity,
            size: 0,
            offset: 0,
            sn: 0,
            credit: BlockCredit::Frames(0),
            st_min_ms: 0,
            wait_count: 0,
            timer_st: 0,
            timer_bs: 0,
            status: SendStatus::Idle,
            diagnostic: None,
        }
    }
}

impl<'buf, S: Shim, M: Storage> Link<'buf, S, M> {
    /// Start a transfer: single frame inline, or first frame plus
    /// `InProgress` bookkeeping for the poll loop to continue.
    pub(crate) fn start_send(
        &mut self,
        id: u32,
        payload: &[M::Word],
        size: usize,
    ) -> Result<(), SendError> {
        let capacity = self.tx.capacity.min(MAX_MESSAGE_SIZE);
        if size > capacity {
            return Err(SendError::Overflow { size, capacity });
        }
        if self.tx.status == SendStatus::InProgress {
            return Err(SendError::InProgress);
        }

        let words = M::words_for(size);
        self.tx.arena[..words].copy_from_slice(&payload[..words]);
        self.tx.size = size;
        self.tx.offset = 0;

        if size <= SF_MAX_DATA {
            let mut data = [0u8; SF_MAX_DATA];
            M::unpack(&self.tx.arena[..], 0, &mut data[..size]);
            let result = self.transmit(id, &Pdu::Single(SingleFrame::new(&data[..size])));
            // Completion is reported even when the driver refused the
            // frame; the refusal itself travels back through the Result.
            self.shim.send_done();
            result.map_err(SendError::from)
        } else {
            let mut head = [0u8; FF_DATA];
            M::unpack(&self.tx.arena[..], 0, &mut head);
            self.transmit(id, &Pdu::First(FirstFrame::new(size as u16, head)))?;

            let now = self.shim.now_ms();
            self.tx.offset = FF_DATA;
            self.tx.sn = 1;
            // No consecutive frame may leave before the peer grants a
            // block; the BS timer bounds that wait.
            self.tx.credit = BlockCredit::Frames(0);
            self.tx.st_min_ms = 0;
            self.tx.wait_count = 0;
            self.tx.timer_st = now;
            self.tx.timer_bs = now.wrapping_add(self.config.response_timeout_ms);
            self.tx.diagnostic = None;
            self.tx.status = SendStatus::InProgress;
            Ok(())
        }
    }

    /// React to a flow control. Only meaningful while a send is running;
    /// anything else is dropped where it stands.
    pub(crate) fn handle_flow_control(&mut self, fc: &FlowControl) {
        if self.tx.status != SendStatus::InProgress {
            return;
        }

        let now = self.shim.now_ms();
        self.tx.timer_bs = now.wrapping_add(self.config.response_timeout_ms);

        match fc.status() {
            Some(FlowStatus::Overflow) => {
                self.tx.diagnostic = Some(Diagnostic::BufferOverflow);
                self.shim.send_fail(TransferFailure::Overflow);
                self.tx.status = SendStatus::Error;
            },
            Some(FlowStatus::Wait) => {
                self.tx.wait_count = self.tx.wait_count.saturating_add(1);
                if self.tx.wait_count > self.config.max_wait_frames {
                    self.tx.diagnostic = Some(Diagnostic::WaitOverrun);
                    self.shim.send_fail(TransferFailure::Protocol);
                    self.tx.status = SendStatus::Error;
                }
            },
            Some(FlowStatus::Continue) => {
                self.tx.credit = match fc.block_size() {
                    0 => BlockCredit::Unlimited,
                    bs => BlockCredit::Frames(u16::from(bs)),
                };
                self.tx.st_min_ms = fc.st_min_ms();
                self.tx.wait_count = 0;
            },
            None => {
                // Unassigned FS nibble: neither clearance nor wait. The
                // send stalls until the refreshed BS timer fires.
                self.tx.diagnostic = Some(Diagnostic::InvalidFlowStatus);
            },
        }
    }

    /// One tick of the outbound direction: at most one consecutive frame
    /// if credit and pacing allow, then the BS deadline check.
    pub(crate) fn poll_send(&mut self) {
        if self.tx.status != SendStatus::InProgress {
            return;
        }

        let now = self.shim.now_ms();
        let paced = self.tx.st_min_ms == 0 || time::is_after(now, self.tx.timer_st);
        if self.tx.credit.available() && paced {
            let chunk = (self.tx.size - self.tx.offset).min(CF_MAX_DATA);
            let mut data = [0u8; CF_MAX_DATA];
            M::unpack(&self.tx.arena[..], self.tx.offset, &mut data[..chunk]);
            let cf = Pdu::Consecutive(ConsecutiveFrame::new(self.tx.sn, &data[..chunk]));

            match self.transmit(self.send_id, &cf) {
                Ok(()) => {
                    self.tx.offset += chunk;
                    self.tx.sn = (self.tx.sn + 1) & 0x0F;
                    self.tx.credit.consume();
                    let sent_at = self.shim.now_ms();
                    self.tx.timer_bs = sent_at.wrapping_add(self.config.response_timeout_ms);
                    self.tx.timer_st = sent_at.wrapping_add(u32::from(self.tx.st_min_ms));
                    if self.tx.offset >= self.tx.size {
                        self.shim.send_done();
                        self.tx.status = SendStatus::Idle;
                    }
                },
                Err(_) => {
                    self.tx.diagnostic = Some(Diagnostic::Error);
                    self.shim.send_fail(TransferFailure::Error);
                    self.tx.status = SendStatus::Error;
                    return;
                },
            }
        }

        // Gated on still being in progress so an abort above cannot be
        // followed by a second failure report.
        if self.tx.status == SendStatus::InProgress && time::is_after(now, self.tx.timer_bs) {
            self.tx.diagnostic = Some(Diagnostic::TimeoutBs);
            self.shim.send_fail(TransferFailure::Timeout);
            self.tx.status = SendStatus::Error;
        }
    }
}
