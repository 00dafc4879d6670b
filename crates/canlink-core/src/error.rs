//! Error types for the transport engine.
//!
//! Faults travel on two axes. Synchronous faults (oversized payload, a
//! transfer already running, a refused transmit) come back as `Result`s
//! from the entry point that caused them. Asynchronous faults — a
//! multi-frame transfer dying midway — are delivered through the shim's
//! completion callbacks as a [`TransferFailure`], while the precise
//! protocol-level cause is retained per direction as a [`Diagnostic`]
//! readable after the fact.

use thiserror::Error;

/// The CAN driver refused a transmit.
///
/// Carries no detail on purpose: the engine reacts identically to every
/// refusal (a single frame reports it to the caller, a consecutive frame
/// aborts the transfer), so any driver-specific cause stays on the
/// host's side of the shim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("CAN transmit failed")]
pub struct ShimError;

/// Why a multi-frame transfer was aborted, as reported to the completion
/// callbacks.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFailure {
    /// The peer missed a protocol deadline (BS or CR timer).
    #[error("peer missed a protocol deadline")]
    Timeout,

    /// A buffer limit was exceeded on one side of the transfer.
    #[error("message does not fit the receive buffer")]
    Overflow,

    /// The peer violated the flow-control protocol.
    #[error("flow-control protocol violation")]
    Protocol,

    /// Frame transmission failed mid-transfer.
    #[error("frame transmission failed")]
    Error,
}

/// Protocol-level diagnostic recorded per direction.
///
/// Finer-grained than [`TransferFailure`]: several diagnostics map onto
/// one user-facing failure (see [`Diagnostic::failure`]). Recoverable
/// conditions such as [`UnexpectedPdu`](Diagnostic::UnexpectedPdu) are
/// recorded here without aborting anything.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// N_As expired (reserved; this engine does not time frame writes).
    #[error("timeout waiting for frame transmission")]
    TimeoutA,

    /// No flow control arrived within the response timeout.
    #[error("timeout waiting for flow control")]
    TimeoutBs,

    /// No consecutive frame arrived within the response timeout.
    #[error("timeout waiting for consecutive frame")]
    TimeoutCr,

    /// A consecutive frame carried the wrong sequence number.
    #[error("wrong sequence number")]
    WrongSn,

    /// A flow control carried an unassigned FS nibble.
    #[error("invalid flow status")]
    InvalidFlowStatus,

    /// A frame arrived that no state was expecting.
    #[error("unexpected PDU")]
    UnexpectedPdu,

    /// The peer asked to wait more times than tolerated.
    #[error("too many wait frames")]
    WaitOverrun,

    /// The announced message exceeds the available buffer.
    #[error("buffer overflow")]
    BufferOverflow,

    /// Frame transmission failed.
    #[error("transmission error")]
    Error,
}

impl Diagnostic {
    /// The user-facing failure this diagnostic maps onto. The mapping is
    /// fixed: timeouts collapse to [`TransferFailure::Timeout`], buffer
    /// overflow to [`TransferFailure::Overflow`], and every protocol
    /// violation to [`TransferFailure::Protocol`].
    #[must_use]
    pub fn failure(self) -> TransferFailure {
        match self {
            Self::TimeoutA | Self::TimeoutBs | Self::TimeoutCr => TransferFailure::Timeout,
            Self::BufferOverflow => TransferFailure::Overflow,
            Self::WrongSn | Self::InvalidFlowStatus | Self::UnexpectedPdu | Self::WaitOverrun => {
                TransferFailure::Protocol
            },
            Self::Error => TransferFailure::Error,
        }
    }
}

/// Synchronous faults of [`Link::send`](crate::Link::send).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The payload does not fit the send buffer (or the 4095-octet
    /// protocol ceiling).
    #[error("payload of {size} octets exceeds the {capacity}-octet send capacity")]
    Overflow {
        /// Requested payload size in octets.
        size: usize,
        /// Usable capacity in octets.
        capacity: usize,
    },

    /// A transmission is already in progress on this link.
    #[error("a transmission is already in progress")]
    InProgress,

    /// The CAN driver refused the opening frame.
    #[error(transparent)]
    Shim(#[from] ShimError),
}

/// Synchronous faults of [`Link::receive`](crate::Link::receive).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveError {
    /// No completed message is waiting.
    #[error("no completed message is waiting")]
    NoData,

    /// The destination buffer is smaller than the assembled message. The
    /// prefix that fits has been copied and the message discarded; the
    /// full size is reported so the host can tell what was lost.
    #[error("assembled message of {size} octets exceeds the destination buffer")]
    Truncated {
        /// Size of the assembled message in octets.
        size: usize,
    },
}
