//! The host capability boundary.
//!
//! A [`Link`](crate::Link) owns no I/O and no clock. Everything it needs
//! from its surroundings is bundled into one capability value the host
//! hands over at construction: frame transmission, a monotonic
//! millisecond counter, and four completion notifications. Passing the
//! capabilities as a value (rather than process-wide hooks) keeps every
//! link independently testable and lets a host run many links against
//! different buses.

use crate::error::{ShimError, TransferFailure};

/// Capabilities the host provides to a link.
///
/// # Contract
///
/// - [`send_can`](Shim::send_can) transmits one CAN frame; `frame` is
///   0..=8 octets, already laid out for the wire. The call may fail but
///   must not block indefinitely: the engine transmits from within its
///   entry points.
/// - [`now_ms`](Shim::now_ms) is a free-running millisecond counter that
///   never runs backwards. Wrapping at `u32::MAX` is fine; all deadline
///   arithmetic is wrap-safe.
/// - The completion notifications are called from within `send`,
///   `on_frame` and `poll`, at most once per transfer and direction.
///   They default to no-ops for hosts that prefer polling the status
///   accessors.
pub trait Shim {
    /// Transmit one CAN frame with the given arbitration id.
    fn send_can(&mut self, id: u32, frame: &[u8]) -> Result<(), ShimError>;

    /// Read the monotonic millisecond counter.
    fn now_ms(&mut self) -> u32;

    /// An outbound message has been fully handed to the driver.
    fn send_done(&mut self) {}

    /// An outbound multi-frame transfer was aborted.
    fn send_fail(&mut self, _failure: TransferFailure) {}

    /// An inbound message has been fully assembled.
    fn recv_done(&mut self) {}

    /// An inbound multi-frame transfer was aborted.
    fn recv_fail(&mut self, _failure: TransferFailure) {}
}
