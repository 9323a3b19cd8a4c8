#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Perception providers recomputed from world state before agents think.

mod log;
mod stock;

use std::fmt;

use maze_chase_core::{Action, AgentSnapshot, PerceptionValue, Perceptions};
use maze_chase_world::World;

pub use crate::{
    log::PerceptionLog,
    stock::{CoinFlip, FoodAhead, GhostAhead, HeadingIs, HeadingLabel, WallAhead},
};

/// Named reading derived from the world and the perceiving agent.
pub trait Perception {
    /// Stable name under which the reading is published.
    fn name(&self) -> &str;

    /// Computes the current reading for `agent`.
    fn sense(&mut self, world: &World, agent: &AgentSnapshot) -> PerceptionValue;
}

/// Ordered list of perception providers attached to one agent.
///
/// Readings are published in the order the providers were added.
#[derive(Default)]
pub struct PerceptionSet {
    providers: Vec<Box<dyn Perception>>,
}

impl PerceptionSet {
    /// Creates a set without providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard readings for a player: heading flags, walls, food, ghosts and a coin flip.
    #[must_use]
    pub fn standard(seed: u64) -> Self {
        let mut set = Self::new();
        for action in Action::ALL {
            set.push(HeadingIs::new(action));
        }
        for action in Action::ALL {
            set.push(WallAhead::new(action));
        }
        for action in Action::ALL {
            set.push(FoodAhead::new(action));
        }
        set.with(GhostAhead::new()).with(CoinFlip::new(seed))
    }

    /// Appends a provider and returns the set.
    #[must_use]
    pub fn with(mut self, provider: impl Perception + 'static) -> Self {
        self.push(provider);
        self
    }

    /// Appends a provider.
    pub fn push(&mut self, provider: impl Perception + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Names of the readings in publication order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|provider| provider.name())
    }

    /// Number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Reports whether the set has no provider.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Recomputes every reading for `agent`.
    pub fn refresh(&mut self, world: &World, agent: &AgentSnapshot) -> Perceptions {
        let mut perceptions = Perceptions::new();
        for provider in &mut self.providers {
            let value = provider.sense(world, agent);
            perceptions.push(provider.name(), value);
        }
        perceptions
    }
}

impl fmt::Debug for PerceptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
