//! Two links wired back to back over a simulated bus.
//!
//! Each simulation step polls both links, moves every queued frame to
//! the opposite endpoint (through the drop filters, recording a wire
//! tap), then advances the shared clock by one millisecond. That gives a
//! 1 kHz poll rate and a one-step bus latency, which is enough to drive
//! every protocol path deterministically.

use canlink_core::{Link, LinkConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    sim_clock::SimClock,
    sim_shim::{ShimEvent, SimShim},
};

/// Which endpoint of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The endpoint created from the first arena pair (id 0x7E0).
    Left,
    /// The endpoint created from the second arena pair (id 0x7E8).
    Right,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// One frame observed on the simulated bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapFrame {
    /// Transmitting endpoint.
    pub from: Side,
    /// Arbitration id.
    pub id: u32,
    /// Frame payload as handed to the driver.
    pub bytes: Vec<u8>,
    /// Simulated instant of transmission.
    pub at_ms: u32,
    /// False when a drop filter ate the frame.
    pub delivered: bool,
}

type DropFilter = Box<dyn FnMut(&[u8]) -> bool>;

/// Seeded random frame loss, usable as a drop filter.
pub struct FrameLoss {
    rng: ChaCha8Rng,
    probability: f64,
}

impl FrameLoss {
    /// Lose each frame with `probability`, reproducibly from `seed`.
    #[must_use]
    pub fn new(seed: u64, probability: f64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), probability }
    }

    /// Turn into a drop filter for [`SimDriver::drop_from`].
    pub fn into_filter(mut self) -> impl FnMut(&[u8]) -> bool {
        move |_| self.rng.gen_bool(self.probability)
    }
}

/// A pair of links and the bus between them.
pub struct SimDriver<'buf> {
    links: [Link<'buf, SimShim>; 2],
    clock: SimClock,
    tap: Vec<TapFrame>,
    filters: [Option<DropFilter>; 2],
}

impl<'buf> SimDriver<'buf> {
    /// Wire two default-configured links back to back. Each endpoint
    /// needs its own send and receive arena.
    pub fn new(
        left_arenas: (&'buf mut [u8], &'buf mut [u8]),
        right_arenas: (&'buf mut [u8], &'buf mut [u8]),
    ) -> Self {
        Self::with_configs(left_arenas, right_arenas, LinkConfig::default(), LinkConfig::default())
    }

    /// Wire two links with explicit per-endpoint configurations.
    pub fn with_configs(
        left_arenas: (&'buf mut [u8], &'buf mut [u8]),
        right_arenas: (&'buf mut [u8], &'buf mut [u8]),
        left_config: LinkConfig,
        right_config: LinkConfig,
    ) -> Self {
        let clock = SimClock::new();
        let left = Link::with_config(
            SimShim::new(clock.clone()),
            0x7E0,
            left_arenas.0,
            left_arenas.1,
            left_config,
        );
        let right = Link::with_config(
            SimShim::new(clock.clone()),
            0x7E8,
            right_arenas.0,
            right_arenas.1,
            right_config,
        );
        Self { links: [left, right], clock, tap: Vec::new(), filters: [None, None] }
    }

    /// The link on one side.
    pub fn link(&self, side: Side) -> &Link<'buf, SimShim> {
        &self.links[side.index()]
    }

    /// Mutable access to one side's link, e.g. to start a send.
    pub fn link_mut(&mut self, side: Side) -> &mut Link<'buf, SimShim> {
        &mut self.links[side.index()]
    }

    /// Completion notifications observed on one side so far.
    #[must_use]
    pub fn events(&self, side: Side) -> Vec<ShimEvent> {
        self.links[side.index()].shim().events()
    }

    /// The shared clock.
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Everything the bus has seen.
    #[must_use]
    pub fn tap(&self) -> &[TapFrame] {
        &self.tap
    }

    /// Install a drop filter for frames transmitted by `side`: the
    /// filter sees each frame and returns true to eat it.
    pub fn drop_from(&mut self, side: Side, filter: impl FnMut(&[u8]) -> bool + 'static) {
        self.filters[side.index()] = Some(Box::new(filter));
    }

    /// Remove the drop filter on one side.
    pub fn clear_drop(&mut self, side: Side) {
        self.filters[side.index()] = None;
    }

    /// One simulated millisecond: poll both links, move queued frames,
    /// advance the clock.
    pub fn step(&mut self) {
        self.links[0].poll();
        self.links[1].poll();
        self.deliver(Side::Left);
        self.deliver(Side::Right);
        self.clock.advance(1);
    }

    /// Run `ms` simulated milliseconds.
    pub fn run(&mut self, ms: u32) {
        for _ in 0..ms {
            self.step();
        }
    }

    /// Step until `done` observes the driver returning true, or the
    /// budget runs out. Returns whether the predicate was met.
    pub fn run_until(&mut self, budget_ms: u32, mut done: impl FnMut(&Self) -> bool) -> bool {
        for _ in 0..budget_ms {
            if done(self) {
                return true;
            }
            self.step();
        }
        done(self)
    }

    fn deliver(&mut self, from: Side) {
        let frames = self.links[from.index()].shim().drain_outbox();
        for (id, bytes) in frames {
            let eaten =
                self.filters[from.index()].as_mut().is_some_and(|filter| filter(&bytes));
            if eaten {
                tracing::debug!(?from, id, len = bytes.len(), "frame dropped by filter");
            } else {
                tracing::trace!(?from, id, len = bytes.len(), "frame delivered");
            }
            self.tap.push(TapFrame {
                from,
                id,
                bytes: bytes.clone(),
                at_ms: self.clock.now(),
                delivered: !eaten,
            });
            if !eaten {
                let to = match from {
                    Side::Left => Side::Right,
                    Side::Right => Side::Left,
                };
                self.links[to.index()].on_frame(&bytes);
            }
        }
    }
}
