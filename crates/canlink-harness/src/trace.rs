//! Wire-tap analysis helpers.

use crate::sim_driver::{Side, TapFrame};

/// Sequence numbers of the consecutive frames one side put on the bus,
/// in transmit order (dropped frames included; the sender did emit
/// them).
#[must_use]
pub fn consecutive_sns(tap: &[TapFrame], from: Side) -> Vec<u8> {
    tap.iter()
        .filter(|frame| frame.from == from)
        .filter(|frame| frame.bytes.first().is_some_and(|b| b >> 4 == 0x2))
        .filter_map(|frame| frame.bytes.first().map(|b| b & 0x0F))
        .collect()
}

/// The consecutive-frame sequence-number law: SNs run 1, 2, …, 15, 0,
/// 1, … from the start of a message.
#[must_use]
pub fn sn_law_holds(sns: &[u8]) -> bool {
    sns.iter().enumerate().all(|(i, &sn)| usize::from(sn) == (i + 1) % 16)
}
