//! Deterministic simulation harness for canlink testing.
//!
//! The engine is synchronous and clock-driven, so simulating a CAN bus
//! needs no runtime: a hand-cranked millisecond clock, an in-memory
//! frame queue per endpoint, and a driver that shuttles frames between
//! two links one simulated millisecond at a time.
//!
//! # Determinism
//!
//! Nothing here reads wall-clock time or ambient randomness. Frame loss
//! is expressed as explicit drop filters; the random variant is seeded
//! ChaCha, so every failure reproduces from its seed.
//!
//! # Wire tap
//!
//! The driver records every frame it moves (or drops) in a tap that
//! tests inspect afterwards, e.g. to verify the consecutive-frame
//! sequence-number law with [`sn_law_holds`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_clock;
pub mod sim_driver;
pub mod sim_shim;
pub mod trace;

pub use sim_clock::SimClock;
pub use sim_driver::{FrameLoss, Side, SimDriver, TapFrame};
pub use sim_shim::{ShimEvent, SimShim};
pub use trace::{consecutive_sns, sn_law_holds};
