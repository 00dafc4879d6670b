//! Fuzz target for the link state machines
//!
//! Drives a link with an arbitrary interleaving of inbound frames, clock
//! jumps, polls, sends and receive calls. Whatever the bus does, the
//! engine must never panic and never leave a half state that a later
//! entry point trips over.

#![no_main]

use arbitrary::Arbitrary;
use canlink_core::{Link, Shim, ShimError};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Frame(Vec<u8>),
    Advance(u16),
    Poll,
    Send(Vec<u8>),
    Receive,
    ResetReceive,
}

#[derive(Default)]
struct FuzzShim {
    now: u32,
    refuse: bool,
}

impl Shim for FuzzShim {
    fn send_can(&mut self, _id: u32, _frame: &[u8]) -> Result<(), ShimError> {
        // Alternate acceptance so both transmit outcomes get exercised.
        self.refuse = !self.refuse;
        if self.refuse { Err(ShimError) } else { Ok(()) }
    }

    fn now_ms(&mut self) -> u32 {
        self.now
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut send_arena = [0u8; 256];
    let mut recv_arena = [0u8; 256];
    let mut link =
        Link::<FuzzShim>::new(FuzzShim::default(), 0x7E0, &mut send_arena, &mut recv_arena);

    for op in ops {
        match op {
            Op::Frame(bytes) => link.on_frame(&bytes),
            Op::Advance(ms) => link.shim_mut().now = link.shim().now.wrapping_add(u32::from(ms)),
            Op::Poll => link.poll(),
            Op::Send(payload) => {
                let size = payload.len();
                let _ = link.send(&payload, size);
            },
            Op::Receive => {
                let mut out = [0u8; 64];
                let _ = link.receive(&mut out);
            },
            Op::ResetReceive => link.reset_receive(),
        }
    }
});
