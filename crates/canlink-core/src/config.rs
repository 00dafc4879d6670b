//! Per-link protocol configuration.

use canlink_proto::FramePadding;

/// Block size advertised while receiving: consecutive frames the peer
/// may send between flow controls. Zero would grant the whole message in
/// one block.
pub const DEFAULT_BLOCK_SIZE: u8 = 8;

/// Separation time advertised while receiving, in milliseconds.
pub const DEFAULT_ST_MIN_MS: u8 = 0;

/// Deadline refresh value for both the BS timer (sender waiting for flow
/// control) and the CR timer (receiver waiting for the next consecutive
/// frame).
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 100;

/// FC.Wait frames tolerated within one block before the send is
/// abandoned.
pub const DEFAULT_MAX_WAIT_FRAMES: u8 = 1;

/// Tunable knobs of a [`Link`](crate::Link).
///
/// The defaults match the original deployment values; most hosts only
/// ever touch `padding` (some networks mandate full 8-octet frames) and
/// `block_size`/`st_min_ms` (receive-side pacing advertised to peers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Padding policy for every emitted frame.
    pub padding: FramePadding,

    /// BS advertised in flow controls this end emits while receiving.
    pub block_size: u8,

    /// STmin advertised while receiving, in milliseconds (saturated to
    /// the wire maximum of 0x7F on emission).
    pub st_min_ms: u8,

    /// BS/CR deadline refresh, in milliseconds.
    pub response_timeout_ms: u32,

    /// FC.Wait frames tolerated before giving up a send.
    pub max_wait_frames: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            padding: FramePadding::Off,
            block_size: DEFAULT_BLOCK_SIZE,
            st_min_ms: DEFAULT_ST_MIN_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            max_wait_frames: DEFAULT_MAX_WAIT_FRAMES,
        }
    }
}
