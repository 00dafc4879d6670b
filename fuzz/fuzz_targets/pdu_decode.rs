//! Fuzz target for Pdu::decode
//!
//! Feeds arbitrary byte sequences to the frame decoder to find:
//! - Parser crashes or panics
//! - Out-of-bounds reads in nibble/octet extraction
//! - Announced lengths that bypass validation
//!
//! The decoder must never panic; every invalid input is an error value.

#![no_main]

use canlink_proto::Pdu;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Pdu::decode(data);
});
