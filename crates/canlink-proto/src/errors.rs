//! Error types for the wire codec.
//!
//! Every variant names the syntactic rule a frame violated. The codec
//! reports and the caller decides: the link layer drops malformed frames
//! without disturbing transfer state, so these errors never abort a
//! transfer on their own.

use thiserror::Error;

/// Syntactic faults found while decoding a frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The frame is outside the 2..=8 octet range an ISO-TP frame may
    /// occupy.
    #[error("frame of {len} octets is outside the 2..=8 octet range")]
    FrameLength {
        /// Observed frame length.
        len: usize,
    },

    /// The PCI nibble is not one of the four assigned types.
    #[error("unknown PCI type {pci:#x}")]
    UnknownPci {
        /// The unassigned PCI nibble.
        pci: u8,
    },

    /// SF_DL is zero or larger than the data actually present.
    #[error("single frame announces {sf_dl} data octets but the frame carries {available}")]
    SingleFrameLength {
        /// The SF_DL nibble as received.
        sf_dl: u8,
        /// Data octets that arrived with the frame.
        available: usize,
    },

    /// A first frame must occupy the full 8 octets.
    #[error("first frame must occupy all 8 octets, got {len}")]
    FirstFrameLength {
        /// Observed frame length.
        len: usize,
    },

    /// FF_DL announces a message short enough for a single frame.
    #[error("first frame announces {total} octets, which fits a single frame")]
    FirstFrameTooShort {
        /// The announced FF_DL.
        total: u16,
    },

    /// A flow-control frame needs its three PCI octets.
    #[error("flow control frame needs 3 octets, got {len}")]
    FlowControlLength {
        /// Observed frame length.
        len: usize,
    },
}
