//! Inbound half of a link.
//!
//! A single frame completes a message on the spot. A first frame opens a
//! multi-frame reception: the engine answers with a flow control before
//! the call returns, then expects consecutive frames with sequence
//! numbers 1, 2, …, 15, 0, … and re-arms the CR deadline on each one.
//! Every `block_size` frames another flow control renews the peer's
//! credit.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐   SF    ┌──────┐ receive()/reset ┌──────┐
//! │ Idle │────────>│ Full │────────────────>│ Idle │
//! └──────┘         └──────┘                 └──────┘
//!     │ FF (fits)      ↑ last CF
//!     ↓                │
//! ┌─────────────┐──────┘
//! │ InProgress  │
//! └─────────────┘
//!     │ wrong SN / CR timeout          → Idle (recv_fail)
//!     │ FF too large for the arena     → Idle (recv_fail + FC overflow)
//! ```
//!
//! A new SF or FF while `InProgress` is recorded as an unexpected PDU
//! but still starts over: the wire is the authority on what the peer is
//! doing now.

use canlink_proto::{
    CF_MAX_DATA, ConsecutiveFrame, FF_DATA, FirstFrame, FlowControl, FlowStatus, Pdu, SingleFrame,
};

use crate::{
    error::{Diagnostic, ShimError, TransferFailure},
    link::Link,
    shim::Shim,
    storage::Storage,
    time,
};

/// Receive-side status of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveStatus {
    /// Nothing assembled and nothing expected.
    Idle,
    /// A multi-frame message is being assembled.
    InProgress,
    /// A complete message is waiting to be picked up.
    Full,
}

/// State and buffer of the inbound direction.
pub(crate) struct RecvHalf<'buf, M: Storage> {
    pub(crate) arena: &'buf mut [M::Word],
    pub(crate) capacity: usize,
    pub(crate) size: usize,
    pub(crate) offset: usize,
    pub(crate) sn: u8,
    pub(crate) bs_count: u8,
    pub(crate) timer_cr: u32,
    pub(crate) status: ReceiveStatus,
    pub(crate) diagnostic: Option<Diagnostic>,
}

impl<'buf, M: Storage> RecvHalf<'buf, M> {
    pub(crate) fn new(arena: &'buf mut [M::Word]) -> Self {
        let capacity = arena.len() * M::WIDTH;
        Self {
            arena,
            capacity,
            size: 0,
            offset: 0,
            sn: 0,
            bs_count: 0,
            timer_cr: 0,
            status: ReceiveStatus::Idle,
            diagnostic: None,
        }
    }

    /// Back to `Idle`, dropping assembly progress. The diagnostic is
    /// kept so the host can still read why the last reception ended.
    pub(crate) fn reset(&mut self) {
        self.status = ReceiveStatus::Idle;
        self.size = 0;
        self.offset = 0;
        self.sn = 0;
        self.bs_count = 0;
    }
}

impl<'buf, S: Shim, M: Storage> Link<'buf, S, M> {
    /// Bookkeeping shared by SF and FF arrival: a message-opening frame
    /// in the middle of an assembly is an unexpected PDU (recorded, not
    /// fatal — the new message wins). Runs before shape validation so
    /// the diagnostic is recorded even for malformed openers.
    pub(crate) fn note_inbound_message(&mut self) {
        self.rx.diagnostic = if self.rx.status == ReceiveStatus::InProgress {
            Some(Diagnostic::UnexpectedPdu)
        } else {
            None
        };
    }

    /// A single frame is a complete message.
    pub(crate) fn handle_single(&mut self, sf: &SingleFrame) {
        if sf.size() > self.rx.capacity {
            // Degenerate arena smaller than one frame; nothing sensible
            // to assemble.
            self.rx.diagnostic = Some(Diagnostic::BufferOverflow);
            self.shim.recv_fail(TransferFailure::Overflow);
            self.rx.reset();
            return;
        }

        M::pack(&mut self.rx.arena[..], 0, sf.data());
        self.rx.size = sf.size();
        self.rx.offset = sf.size();
        self.rx.status = ReceiveStatus::Full;
        self.shim.recv_done();
    }

    /// A first frame opens a multi-frame reception and is answered with
    /// a flow control before returning to the caller.
    pub(crate) fn handle_first(&mut self, ff: &FirstFrame) {
        if ff.total() > self.rx.capacity {
            self.rx.diagnostic = Some(Diagnostic::BufferOverflow);
            self.shim.recv_fail(TransferFailure::Overflow);
            self.rx.reset();
            let _ = self.emit_flow_control(FlowStatus::Overflow, 0, 0);
            return;
        }

        M::pack(&mut self.rx.arena[..], 0, ff.data());
        self.rx.size = ff.total();
        self.rx.offset = FF_DATA;
        self.rx.sn = 1;
        self.rx.status = ReceiveStatus::InProgress;
        self.rx.bs_count = self.config.block_size;
        let _ = self.emit_flow_control(
            FlowStatus::Continue,
            self.config.block_size,
            self.config.st_min_ms,
        );
        self.rx.timer_cr = self.shim.now_ms().wrapping_add(self.config.response_timeout_ms);
    }

    /// One segment of the running assembly.
    pub(crate) fn handle_consecutive(&mut self, cf: &ConsecutiveFrame) {
        if self.rx.status != ReceiveStatus::InProgress {
            self.rx.diagnostic = Some(Diagnostic::UnexpectedPdu);
            return;
        }

        if cf.sn() != self.rx.sn {
            self.rx.diagnostic = Some(Diagnostic::WrongSn);
            self.shim.recv_fail(TransferFailure::Protocol);
            self.rx.reset();
            return;
        }

        let remaining = (self.rx.size - self.rx.offset).min(CF_MAX_DATA);
        if remaining > cf.data().len() {
            // Frame shorter than the remainder it had to carry.
            return;
        }

        M::pack(&mut self.rx.arena[..], self.rx.offset, &cf.data()[..remaining]);
        self.rx.offset += remaining;
        self.rx.sn = (self.rx.sn + 1) & 0x0F;
        self.rx.timer_cr = self.shim.now_ms().wrapping_add(self.config.response_timeout_ms);

        if self.rx.offset >= self.rx.size {
            self.rx.status = ReceiveStatus::Full;
            self.shim.recv_done();
        } else if self.config.block_size != 0 {
            self.rx.bs_count -= 1;
            if self.rx.bs_count == 0 {
                self.rx.bs_count = self.config.block_size;
                let _ = self.emit_flow_control(
                    FlowStatus::Continue,
                    self.config.block_size,
                    self.config.st_min_ms,
                );
            }
        }
    }

    /// One tick of the inbound direction: the CR deadline check.
    pub(crate) fn poll_receive(&mut self) {
        if self.rx.status != ReceiveStatus::InProgress {
            return;
        }

        let now = self.shim.now_ms();
        if time::is_after(now, self.rx.timer_cr) {
            self.rx.diagnostic = Some(Diagnostic::TimeoutCr);
            self.shim.recv_fail(TransferFailure::Timeout);
            self.rx.reset();
        }
    }

    pub(crate) fn emit_flow_control(
        &mut self,
        status: FlowStatus,
        block_size: u8,
        st_min_ms: u8,
    ) -> Result<(), ShimError> {
        let fc = Pdu::FlowControl(FlowControl::new(status, block_size, st_min_ms));
        self.transmit(self.send_id, &fc)
    }
}
