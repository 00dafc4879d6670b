//! Wire codec for the ISO-TP transport layer.
//!
//! ISO 15765-2 carries messages of up to 4095 octets over a datagram link
//! whose frames hold at most 8 octets (classical CAN). This crate owns the
//! frame-level picture only: the four protocol data unit shapes, their
//! encoding into an 8-octet frame, and the small wire mappings that ride
//! along with them (flow status nibble, separation-time byte, optional
//! frame padding).
//!
//! Segmentation, reassembly, flow control and timing live in
//! `canlink-core`; this crate is pure data and never performs I/O.

pub mod errors;
pub mod pdu;

pub use errors::FrameError;
pub use pdu::{
    CF_MAX_DATA, ConsecutiveFrame, FF_DATA, FRAME_CAPACITY, FirstFrame, FlowControl, FlowStatus,
    FramePadding, MAX_MESSAGE_SIZE, Pdu, PduKind, SF_MAX_DATA, SingleFrame, WireFrame,
    ms_to_st_min, st_min_to_ms,
};

/// Convenience alias for codec results.
pub type Result<T> = core::result::Result<T, FrameError>;
