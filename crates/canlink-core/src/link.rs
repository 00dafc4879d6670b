//! The link facade: one value per point-to-point ISO-TP connection.

use canlink_proto::{FRAME_CAPACITY, Pdu, PduKind};

use crate::{
    config::LinkConfig,
    error::{Diagnostic, ReceiveError, SendError, ShimError},
    recv::{ReceiveStatus, RecvHalf},
    send::{SendHalf, SendStatus},
    shim::Shim,
    storage::{ByteStorage, Storage},
};

/// A point-to-point ISO-TP link.
///
/// Owns the send and receive state machines and exclusively borrows two
/// caller-supplied payload arenas for its lifetime. All methods are
/// synchronous and bounded: `send` emits at most one frame, `on_frame`
/// digests exactly one, `poll` emits at most one consecutive frame. The
/// host serialises all calls on one link; independent links share
/// nothing.
///
/// Type parameters: `S` is the host capability value (see [`Shim`]),
/// `M` the arena backing — [`ByteStorage`] for ordinary targets,
/// [`WordStorage`](crate::storage::WordStorage) for 16-bit-addressable
/// ones.
///
/// # Invariants
///
/// - While a send is `InProgress`, `offset < size` and `size > 7`.
/// - The receive assembly never outgrows `size`, which never outgrows
///   the arena capacity.
/// - A completion callback fires exactly once per transfer and
///   direction.
pub struct Link<'buf, S: Shim, M: Storage = ByteStorage> {
    pub(crate) shim: S,
    pub(crate) config: LinkConfig,
    pub(crate) send_id: u32,
    pub(crate) tx: SendHalf<'buf, M>,
    pub(crate) rx: RecvHalf<'buf, M>,
}

impl<'buf, S: Shim, M: Storage> Link<'buf, S, M> {
    /// Create a link with the default configuration.
    ///
    /// `send_id` is the arbitration id for every frame this link emits.
    /// The arenas bound the largest message each direction can carry
    /// (their octet capacity is the word count times the storage width).
    pub fn new(
        shim: S,
        send_id: u32,
        send_arena: &'buf mut [M::Word],
        recv_arena: &'buf mut [M::Word],
    ) -> Self {
        Self::with_config(shim, send_id, send_arena, recv_arena, LinkConfig::default())
    }

    /// Create a link with an explicit configuration.
    pub fn with_config(
        shim: S,
        send_id: u32,
        send_arena: &'buf mut [M::Word],
        recv_arena: &'buf mut [M::Word],
        config: LinkConfig,
    ) -> Self {
        Self {
            shim,
            config,
            send_id,
            tx: SendHalf::new(send_arena),
            rx: RecvHalf::new(recv_arena),
        }
    }

    /// Start sending `size` octets taken from `payload` (in arena words,
    /// packed for wide-storage hosts), addressed with the link's id.
    ///
    /// Up to 7 octets leave as a single frame before this returns; more
    /// opens a multi-frame transfer that [`poll`](Self::poll) advances.
    ///
    /// # Errors
    ///
    /// [`SendError::Overflow`] if the payload exceeds the send arena or
    /// the 4095-octet protocol ceiling, [`SendError::InProgress`] if a
    /// transfer is already running (nothing is disturbed), or the shim's
    /// refusal of the opening frame.
    pub fn send(&mut self, payload: &[M::Word], size: usize) -> Result<(), SendError> {
        self.start_send(self.send_id, payload, size)
    }

    /// Like [`send`](Self::send) with an explicit arbitration id for the
    /// opening frame, for functionally addressed requests. Consecutive
    /// frames still use the link's own id.
    pub fn send_with_id(
        &mut self,
        id: u32,
        payload: &[M::Word],
        size: usize,
    ) -> Result<(), SendError> {
        self.start_send(id, payload, size)
    }

    /// Digest one frame received from the bus.
    ///
    /// Frames outside the 2..=8 octet range, with unassigned PCI types,
    /// or with malformed bodies are dropped without disturbing transfer
    /// state (the receive diagnostic may still record them).
    pub fn on_frame(&mut self, raw: &[u8]) {
        if raw.len() < 2 || raw.len() > FRAME_CAPACITY {
            return;
        }
        let Some(kind) = PduKind::of(raw) else {
            return;
        };
        if matches!(kind, PduKind::Single | PduKind::First) {
            self.note_inbound_message();
        }
        let Ok(pdu) = Pdu::decode(raw) else {
            return;
        };
        match pdu {
            Pdu::Single(sf) => self.handle_single(&sf),
            Pdu::First(ff) => self.handle_first(&ff),
            Pdu::Consecutive(cf) => self.handle_consecutive(&cf),
            Pdu::FlowControl(fc) => self.handle_flow_control(&fc),
        }
    }

    /// Advance both directions against the clock: emit the next
    /// consecutive frame when credit and pacing allow, and fire the BS /
    /// CR deadlines. Call at least as often as the tightest separation
    /// time in use.
    pub fn poll(&mut self) {
        self.poll_send();
        self.poll_receive();
    }

    /// Copy a completed message out and return its size in octets,
    /// releasing the receive side.
    ///
    /// # Errors
    ///
    /// [`ReceiveError::NoData`] when nothing is waiting.
    /// [`ReceiveError::Truncated`] when `out` is too small: the prefix
    /// that fits is copied, the message is released anyway, and the full
    /// size is reported.
    pub fn receive(&mut self, out: &mut [M::Word]) -> Result<usize, ReceiveError> {
        if self.rx.status != ReceiveStatus::Full {
            return Err(ReceiveError::NoData);
        }

        let size = self.rx.size;
        let words = M::words_for(size);
        if out.len() < words {
            let fit = out.len();
            out.copy_from_slice(&self.rx.arena[..fit]);
            self.rx.reset();
            return Err(ReceiveError::Truncated { size });
        }

        out[..words].copy_from_slice(&self.rx.arena[..words]);
        self.rx.reset();
        Ok(size)
    }

    /// Borrow a completed message in place: the filled words of the
    /// receive arena and the message size in octets. `None` when nothing
    /// is waiting.
    ///
    /// The receive side stays `Full` while borrowed; call
    /// [`reset_receive`](Self::reset_receive) to release it.
    pub fn receive_in_place(&self) -> Option<(&[M::Word], usize)> {
        if self.rx.status == ReceiveStatus::Full {
            let words = M::words_for(self.rx.size);
            Some((&self.rx.arena[..words], self.rx.size))
        } else {
            None
        }
    }

    /// Return the receive side to `Idle`, abandoning any assembly or
    /// unclaimed message. Idempotent. The receive diagnostic survives.
    pub fn reset_receive(&mut self) {
        self.rx.reset();
    }

    /// Send-side status.
    #[must_use]
    pub fn send_status(&self) -> SendStatus {
        self.tx.status
    }

    /// Receive-side status.
    #[must_use]
    pub fn receive_status(&self) -> ReceiveStatus {
        self.rx.status
    }

    /// Last protocol diagnostic of the send direction, if any.
    #[must_use]
    pub fn send_diagnostic(&self) -> Option<Diagnostic> {
        self.tx.diagnostic
    }

    /// Last protocol diagnostic of the receive direction, if any.
    #[must_use]
    pub fn receive_diagnostic(&self) -> Option<Diagnostic> {
        self.rx.diagnostic
    }

    /// Arbitration id this link transmits with.
    #[must_use]
    pub fn send_id(&self) -> u32 {
        self.send_id
    }

    /// The host capability value.
    pub fn shim(&self) -> &S {
        &self.shim
    }

    /// Mutable access to the host capability value.
    pub fn shim_mut(&mut self) -> &mut S {
        &mut self.shim
    }

    /// Encode and transmit one PDU under the configured padding.
    pub(crate) fn transmit(&mut self, id: u32, pdu: &Pdu) -> Result<(), ShimError> {
        self.shim.send_can(id, pdu.encode(self.config.padding).as_bytes())
    }
}
