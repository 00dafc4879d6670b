//! ISO-TP (ISO 15765-2) transport engine for classical CAN.
//!
//! Segments messages of up to 4095 octets into 8-octet CAN frames and
//! reassembles them on the far side, with the standard's flow control
//! (block size, separation time, wait/overflow) and timing model (BS and
//! CR deadlines) in between. Built for embedded hosts: no allocation, no
//! threads, no I/O ownership.
//!
//! The central value is [`Link`], one per point-to-point logical
//! connection. It is a pure state machine over caller-owned buffers,
//! driven by three stimuli and nothing else:
//!
//! - [`Link::on_frame`] for every frame received from the bus,
//! - [`Link::poll`] from the host's timing loop,
//! - [`Link::send`] when the application has a message to move.
//!
//! Everything the engine needs from its surroundings (CAN transmit, a
//! millisecond clock, completion notifications) enters through one
//! capability value implementing [`Shim`], handed over at construction.
//!
//! Hosts whose smallest addressable unit is wider than an octet keep
//! their payload buffers packed two-octets-per-word; the [`storage`]
//! module hides that behind a pluggable backing so the same state
//! machines run on 8-bit and 16-bit targets.

pub mod config;
pub mod error;
pub mod link;
pub mod recv;
pub mod send;
pub mod shim;
pub mod storage;
pub mod time;

pub use canlink_proto::FramePadding;
pub use config::{
    DEFAULT_BLOCK_SIZE, DEFAULT_MAX_WAIT_FRAMES, DEFAULT_RESPONSE_TIMEOUT_MS, DEFAULT_ST_MIN_MS,
    LinkConfig,
};
pub use error::{Diagnostic, ReceiveError, SendError, ShimError, TransferFailure};
pub use link::Link;
pub use recv::ReceiveStatus;
pub use send::SendStatus;
pub use shim::Shim;
pub use storage::{ByteStorage, Storage, WordStorage, pack16, unpack16};
pub use time::is_after;
