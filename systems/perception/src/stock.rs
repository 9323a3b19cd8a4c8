//! Ready-made perception providers.

use maze_chase_core::{Action, AgentSnapshot, PerceptionValue};
use maze_chase_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::Perception;

/// Publishes `direction` as `going_<heading>`, or `going_stop` before the first move.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingLabel;

impl Perception for HeadingLabel {
    fn name(&self) -> &str {
        "direction"
    }

    fn sense(&mut self, _world: &World, agent: &AgentSnapshot) -> PerceptionValue {
        let heading = agent.heading.map_or("stop", Action::name);
        PerceptionValue::Label(format!("going_{heading}"))
    }
}

/// Flag `going_<action>` set while the agent heads that way.
#[derive(Clone, Debug)]
pub struct HeadingIs {
    action: Action,
    name: String,
}

impl HeadingIs {
    /// Creates the flag for `action`.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            name: format!("going_{action}"),
        }
    }
}

impl Perception for HeadingIs {
    fn name(&self) -> &str {
        &self.name
    }

    fn sense(&mut self, _world: &World, agent: &AgentSnapshot) -> PerceptionValue {
        PerceptionValue::Flag(agent.heading == Some(self.action))
    }
}

/// Flag `wall_<action>` set when the adjacent cell in that direction is a wall.
#[derive(Clone, Debug)]
pub struct WallAhead {
    action: Action,
    name: String,
}

impl WallAhead {
    /// Creates the flag for `action`.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            name: format!("wall_{action}"),
        }
    }
}

impl Perception for WallAhead {
    fn name(&self) -> &str {
        &self.name
    }

    fn sense(&mut self, world: &World, agent: &AgentSnapshot) -> PerceptionValue {
        let grid = query::grid(world);
        let (columns, rows) = grid.dimensions();
        PerceptionValue::Flag(grid.has_wall(agent.cell.neighbor(self.action, columns, rows)))
    }
}

/// Flag `food_<action>` set when the adjacent cell in that direction holds food.
#[derive(Clone, Debug)]
pub struct FoodAhead {
    action: Action,
    name: String,
}

impl FoodAhead {
    /// Creates the flag for `action`.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            name: format!("food_{action}"),
        }
    }
}

impl Perception for FoodAhead {
    fn name(&self) -> &str {
        &self.name
    }

    fn sense(&mut self, world: &World, agent: &AgentSnapshot) -> PerceptionValue {
        let grid = query::grid(world);
        let (columns, rows) = grid.dimensions();
        PerceptionValue::Flag(grid.has_food(agent.cell.neighbor(self.action, columns, rows)))
    }
}

/// Flag `ghost` set when a ghost occupies the fan of cells ahead of the agent.
///
/// The fan covers the next cell, its two side neighbours and the cell two
/// steps ahead. An agent that never moved sees nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct GhostAhead;

impl GhostAhead {
    /// Creates the ghost detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fan(heading: Action) -> [(i32, i32); 4] {
        let (dx, dy) = heading.delta();
        let (px, py) = (dy, dx);
        [
            (dx, dy),
            (dx - px, dy - py),
            (dx + px, dy + py),
            (2 * dx, 2 * dy),
        ]
    }
}

impl Perception for GhostAhead {
    fn name(&self) -> &str {
        "ghost"
    }

    fn sense(&mut self, world: &World, agent: &AgentSnapshot) -> PerceptionValue {
        let Some(heading) = agent.heading else {
            return PerceptionValue::Flag(false);
        };

        let (columns, rows) = query::grid(world).dimensions();
        let seen = Self::fan(heading).into_iter().any(|delta| {
            query::has_ghost_at(world, agent.cell.offset(delta, columns, rows))
        });
        PerceptionValue::Flag(seen)
    }
}

/// Flag `random` drawn from a seeded fair coin.
#[derive(Clone, Debug)]
pub struct CoinFlip {
    rng: ChaCha8Rng,
}

impl CoinFlip {
    /// Creates a coin whose flips are determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Perception for CoinFlip {
    fn name(&self) -> &str {
        "random"
    }

    fn sense(&mut self, _world: &World, _agent: &AgentSnapshot) -> PerceptionValue {
        PerceptionValue::Flag(self.rng.gen_bool(0.5))
    }
}
