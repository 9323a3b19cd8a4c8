#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Chase.

mod actions;
mod body;
mod graph;
mod grid;
mod level;

use std::{path::Path, time::Duration};

use maze_chase_core::{
    Action, AgentId, AgentRole, AgentSnapshot, CellCoord, Command, Event, FoodKind, GhostColor,
    Outcome, GHOST_PALETTE,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::actions::ActionTable;

pub use crate::{
    body::Body,
    graph::{ConnectivityGraph, CountingGraph, Edge},
    grid::{Food, Grid},
    level::{Level, LevelError, Tile},
};

const DEFAULT_SPEED: f32 = 5.0;
const DEFAULT_SCARED_SPEED_FACTOR: f32 = 0.5;
const DEFAULT_SCARE_DURATION: Duration = Duration::from_secs(6);
const DEFAULT_INITIAL_LIVES: u32 = 3;
const DEFAULT_DOT_VALUE: u32 = 10;
const DEFAULT_PELLET_VALUE: u32 = 50;
const DEFAULT_SEED: u64 = 0x6d61_7a65_6368_6173;

/// Immutable tuning values shared by every agent of a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    speed: f32,
    scared_speed_factor: f32,
    scare_duration: Duration,
    initial_lives: u32,
    dot_value: u32,
    pellet_value: u32,
    seed: u64,
    animate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            scared_speed_factor: DEFAULT_SCARED_SPEED_FACTOR,
            scare_duration: DEFAULT_SCARE_DURATION,
            initial_lives: DEFAULT_INITIAL_LIVES,
            dot_value: DEFAULT_DOT_VALUE,
            pellet_value: DEFAULT_PELLET_VALUE,
            seed: DEFAULT_SEED,
            animate: true,
        }
    }
}

impl Config {
    /// Sets the body speed in cells per second.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Sets the fraction of the base speed used by scared ghosts.
    #[must_use]
    pub const fn with_scared_speed_factor(mut self, factor: f32) -> Self {
        self.scared_speed_factor = factor;
        self
    }

    /// Sets how long ghosts stay scared after a pellet is eaten.
    #[must_use]
    pub const fn with_scare_duration(mut self, duration: Duration) -> Self {
        self.scare_duration = duration;
        self
    }

    /// Sets the number of lives the player starts with.
    #[must_use]
    pub const fn with_initial_lives(mut self, lives: u32) -> Self {
        self.initial_lives = lives;
        self
    }

    /// Sets the points awarded for a dot.
    #[must_use]
    pub const fn with_dot_value(mut self, value: u32) -> Self {
        self.dot_value = value;
        self
    }

    /// Sets the points awarded for a pellet.
    #[must_use]
    pub const fn with_pellet_value(mut self, value: u32) -> Self {
        self.pellet_value = value;
        self
    }

    /// Sets the seed of the ghost spawn generator.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables smooth motion between cells.
    #[must_use]
    pub const fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Body speed in cells per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Fraction of the base speed used by scared ghosts.
    #[must_use]
    pub const fn scared_speed_factor(&self) -> f32 {
        self.scared_speed_factor
    }

    /// Length of the scare window.
    #[must_use]
    pub const fn scare_duration(&self) -> Duration {
        self.scare_duration
    }

    /// Lives the player starts with.
    #[must_use]
    pub const fn initial_lives(&self) -> u32 {
        self.initial_lives
    }

    /// Points awarded for a dot.
    #[must_use]
    pub const fn dot_value(&self) -> u32 {
        self.dot_value
    }

    /// Points awarded for a pellet.
    #[must_use]
    pub const fn pellet_value(&self) -> u32 {
        self.pellet_value
    }

    /// Seed of the ghost spawn generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Reports whether bodies move smoothly between cells.
    #[must_use]
    pub const fn animate(&self) -> bool {
        self.animate
    }

    fn scared_speed(&self) -> f32 {
        self.speed * self.scared_speed_factor
    }

    fn validate(&self) -> Result<(), WorldError> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(WorldError::InvalidSpeed { speed: self.speed });
        }
        if !self.scared_speed_factor.is_finite() || self.scared_speed_factor <= 0.0 {
            return Err(WorldError::InvalidScaredSpeedFactor {
                factor: self.scared_speed_factor,
            });
        }
        Ok(())
    }
}

/// Errors that prevent a world from being built.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The level could not be loaded.
    #[error(transparent)]
    Level(#[from] LevelError),
    /// The configured speed cannot move a body.
    #[error("speed must be a positive number of cells per second, got {speed}")]
    InvalidSpeed {
        /// Rejected speed.
        speed: f32,
    },
    /// The configured scared speed factor cannot move a body.
    #[error("scared speed factor must be positive, got {factor}")]
    InvalidScaredSpeedFactor {
        /// Rejected factor.
        factor: f32,
    },
}

/// Represents the authoritative Maze Chase world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    grid: Grid,
    graph: ConnectivityGraph,
    actions: ActionTable,
    agents: Vec<Agent>,
    next_agent_id: u32,
    player: Option<AgentId>,
    ghosts_spawned: usize,
    score: u32,
    lives: u32,
    outcome: Option<Outcome>,
    rng: ChaCha8Rng,
    elapsed: Duration,
}

impl World {
    /// Builds a world from a parsed level.
    pub fn new(level: &Level, config: Config) -> Result<Self, WorldError> {
        config.validate()?;

        let grid = Grid::from_level(level, config.dot_value, config.pellet_value);
        let actions = ActionTable::build(&grid);
        let graph = ConnectivityGraph::build(&grid, &actions);

        info!(
            columns = grid.columns(),
            rows = grid.rows(),
            food = grid.food_count(),
            ghost_spawns = grid.ghost_spawns().len(),
            edges = graph.edge_count(),
            "world built"
        );

        Ok(Self {
            grid,
            graph,
            actions,
            agents: Vec::new(),
            next_agent_id: 0,
            player: None,
            ghosts_spawned: 0,
            score: 0,
            lives: config.initial_lives,
            outcome: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            elapsed: Duration::ZERO,
            config,
        })
    }

    /// Reads the level file at `path` and builds a world from it.
    pub fn load(path: impl AsRef<Path>, config: Config) -> Result<Self, WorldError> {
        let level = Level::load(path)?;
        Self::new(&level, config)
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.saturating_add(1);
        id
    }

    fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let index = self.agents.binary_search_by_key(&id, |agent| agent.id).ok()?;
        self.agents.get_mut(index)
    }

    fn agent(&self, id: AgentId) -> Option<&Agent> {
        let index = self.agents.binary_search_by_key(&id, |agent| agent.id).ok()?;
        self.agents.get(index)
    }

    fn new_body(&self, cell: CellCoord, speed: f32) -> Body {
        Body::new(cell, speed).with_animation(self.config.animate)
    }

    fn player_alive(&self) -> bool {
        self.player
            .and_then(|id| self.agent(id))
            .is_some_and(|agent| agent.body.is_some())
    }

    fn spawn_player(&mut self, out_events: &mut Vec<Event>) {
        if self.player_alive() || self.lives == 0 {
            debug!(lives = self.lives, "player spawn rejected");
            out_events.push(Event::PlayerSpawnRejected);
            return;
        }

        let cell = self.grid.player_spawn();
        let body = self.new_body(cell, self.config.speed);
        let id = match self.player {
            Some(id) => id,
            None => {
                let id = self.allocate_id();
                self.agents.push(Agent {
                    id,
                    kind: AgentKind::Player,
                    body: None,
                });
                self.player = Some(id);
                id
            }
        };

        if let Some(agent) = self.agent_mut(id) {
            agent.body = Some(body);
        }
        debug!(agent = id.get(), column = cell.column(), row = cell.row(), "player spawned");
        out_events.push(Event::PlayerSpawned { agent: id, cell });
    }

    fn spawn_ghost(&mut self, out_events: &mut Vec<Event>) {
        let spawns = self.grid.ghost_spawns();
        if spawns.is_empty() {
            debug!("ghost spawn rejected: level declares no ghost spawn");
            out_events.push(Event::GhostSpawnRejected);
            return;
        }

        let home = spawns[self.rng.gen_range(0..spawns.len())];
        let color = GHOST_PALETTE[self.ghosts_spawned % GHOST_PALETTE.len()];
        self.ghosts_spawned += 1;

        let id = self.allocate_id();
        let body = self.new_body(home, self.config.speed);
        self.agents.push(Agent {
            id,
            kind: AgentKind::Ghost(GhostState::new(home, color)),
            body: Some(body),
        });

        debug!(agent = id.get(), column = home.column(), row = home.row(), "ghost spawned");
        out_events.push(Event::GhostSpawned {
            agent: id,
            cell: home,
            color,
        });
    }

    fn perform_action(&mut self, id: AgentId, action: Action, out_events: &mut Vec<Event>) {
        let (columns, rows) = self.grid.dimensions();
        let Ok(index) = self.agents.binary_search_by_key(&id, |agent| agent.id) else {
            trace!(agent = id.get(), %action, "action dropped: unknown agent");
            return;
        };
        let agent = &mut self.agents[index];
        let role = agent.kind.role();
        let Some(body) = agent.body.as_mut() else {
            trace!(agent = id.get(), %action, "action dropped: agent has no body");
            return;
        };

        if !self.actions.valid_for(role, body).contains(action) {
            trace!(agent = id.get(), %action, "action dropped by validator");
            return;
        }

        let from = body.cell(columns, rows);
        if body.set_direction(Some(action), columns, rows) {
            out_events.push(Event::AgentDeparted {
                agent: id,
                from,
                action,
            });
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let (columns, rows) = self.grid.dimensions();
        for agent in &mut self.agents {
            let Some(body) = agent.body.as_mut() else {
                continue;
            };
            if let Some(cell) = body.advance(dt, columns, rows) {
                out_events.push(Event::AgentArrived {
                    agent: agent.id,
                    cell,
                });
            }
        }

        let normal_speed = self.config.speed;
        for agent in &mut self.agents {
            let AgentKind::Ghost(state) = &mut agent.kind else {
                continue;
            };
            if !state.scared {
                continue;
            }

            state.scare_remaining = state.scare_remaining.saturating_sub(dt);
            if state.scare_remaining.is_zero() {
                state.scared = false;
                if let Some(body) = agent.body.as_mut() {
                    body.set_speed(normal_speed);
                }
                out_events.push(Event::GhostRecovered { agent: agent.id });
            }
        }
    }

    fn resolve_contacts(&mut self, out_events: &mut Vec<Event>) {
        let (columns, rows) = self.grid.dimensions();
        let Some(player) = self.player else {
            return;
        };
        let Some(cell) = self
            .agent(player)
            .and_then(|agent| agent.body.as_ref())
            .map(|body| body.cell(columns, rows))
        else {
            return;
        };

        if let Some(food) = self.grid.eat_food(cell) {
            self.score = self.score.saturating_add(food.value);
            out_events.push(Event::FoodEaten {
                agent: player,
                cell,
                kind: food.kind,
                value: food.value,
                score: self.score,
            });
            if food.kind == FoodKind::Pellet {
                self.scare_ghosts(out_events);
            }
        }

        let contacts: Vec<(AgentId, bool)> = self
            .agents
            .iter()
            .filter_map(|agent| {
                let AgentKind::Ghost(state) = &agent.kind else {
                    return None;
                };
                let body = agent.body.as_ref()?;
                (body.cell(columns, rows) == cell).then_some((agent.id, state.scared))
            })
            .collect();

        for (ghost, scared) in contacts {
            if scared {
                self.send_ghost_home(ghost, cell, out_events);
            } else {
                self.kill_player(player, cell, ghost, out_events);
                break;
            }
        }
    }

    fn scare_ghosts(&mut self, out_events: &mut Vec<Event>) {
        let duration = self.config.scare_duration;
        let scared_speed = self.config.scared_speed();
        for agent in &mut self.agents {
            let AgentKind::Ghost(state) = &mut agent.kind else {
                continue;
            };
            state.scared = true;
            state.scare_remaining = duration;
            if let Some(body) = agent.body.as_mut() {
                body.set_speed(scared_speed);
            }
        }
        debug!(?duration, "ghosts scared");
        out_events.push(Event::GhostsScared { duration });
    }

    fn send_ghost_home(&mut self, ghost: AgentId, cell: CellCoord, out_events: &mut Vec<Event>) {
        let speed = self.config.speed;
        let animate = self.config.animate;
        let Some(agent) = self.agent_mut(ghost) else {
            return;
        };
        let AgentKind::Ghost(state) = &mut agent.kind else {
            return;
        };

        state.scared = false;
        state.scare_remaining = Duration::ZERO;
        let home = state.home;
        let color = state.color;
        agent.body = Some(Body::new(home, speed).with_animation(animate));

        debug!(agent = ghost.get(), "ghost eaten");
        out_events.push(Event::GhostEaten { agent: ghost, cell });
        out_events.push(Event::GhostSpawned {
            agent: ghost,
            cell: home,
            color,
        });
    }

    fn kill_player(
        &mut self,
        player: AgentId,
        cell: CellCoord,
        by: AgentId,
        out_events: &mut Vec<Event>,
    ) {
        self.lives = self.lives.saturating_sub(1);
        let lives_remaining = self.lives;
        let spawn = self.grid.player_spawn();
        let body = (lives_remaining > 0).then(|| self.new_body(spawn, self.config.speed));
        let respawned = body.is_some();

        if let Some(agent) = self.agent_mut(player) {
            agent.body = body;
        }

        debug!(
            agent = player.get(),
            by = by.get(),
            lives_remaining,
            "player killed"
        );
        out_events.push(Event::PlayerKilled {
            agent: player,
            cell,
            by,
            lives_remaining,
        });

        if respawned {
            out_events.push(Event::PlayerSpawned {
                agent: player,
                cell: spawn,
            });
        }
    }

    fn evaluate_outcome(&mut self, out_events: &mut Vec<Event>) {
        let outcome = if self.grid.food_count() == 0 {
            Outcome::Won
        } else if self.lives == 0 {
            Outcome::Lost
        } else {
            return;
        };

        self.outcome = Some(outcome);
        debug!(?outcome, score = self.score, "game over");
        out_events.push(Event::GameOver { outcome });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the game reached a terminal state every command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }

    match command {
        Command::SpawnPlayer => world.spawn_player(out_events),
        Command::SpawnGhost => world.spawn_ghost(out_events),
        Command::PerformAction { agent, action } => world.perform_action(agent, action, out_events),
        Command::ResolveContacts => world.resolve_contacts(out_events),
        Command::Advance { dt } => world.advance(dt, out_events),
        Command::EvaluateOutcome => world.evaluate_outcome(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use maze_chase_core::{
        Action, ActionSet, AgentId, AgentRole, AgentSnapshot, AgentView, CellCoord, GameStatus,
    };

    use super::{Config, ConnectivityGraph, Grid, World};

    /// Provides read-only access to the wall and food layout.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Provides read-only access to the connectivity graph.
    #[must_use]
    pub fn graph(world: &World) -> &ConnectivityGraph {
        &world.graph
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Score, lives, remaining food and terminal outcome.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        GameStatus {
            score: world.score,
            lives: world.lives,
            food_remaining: world.grid.food_count(),
            outcome: world.outcome,
        }
    }

    /// Total simulated time advanced so far.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Snapshot of the agent, if it currently has a body.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        let (columns, rows) = world.grid.dimensions();
        world.agent(agent)?.snapshot(columns, rows)
    }

    /// Identifier of the player agent, once it has been spawned.
    #[must_use]
    pub fn player_id(world: &World) -> Option<AgentId> {
        world.player
    }

    /// Snapshot of the live player, if any.
    #[must_use]
    pub fn player(world: &World) -> Option<AgentSnapshot> {
        agent(world, world.player?)
    }

    /// Snapshots of every ghost in id order.
    #[must_use]
    pub fn ghosts(world: &World) -> Vec<AgentSnapshot> {
        agent_view(world)
            .into_vec()
            .into_iter()
            .filter(|snapshot| snapshot.role == AgentRole::Ghost)
            .collect()
    }

    /// Captures a read-only view of every agent with a body.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let (columns, rows) = world.grid.dimensions();
        AgentView::from_snapshots(
            world
                .agents
                .iter()
                .filter_map(|agent| agent.snapshot(columns, rows))
                .collect(),
        )
    }

    /// Actions the validator would accept for the agent right now.
    #[must_use]
    pub fn valid_actions(world: &World, agent: AgentId) -> ActionSet {
        world
            .agent(agent)
            .and_then(|agent| {
                let body = agent.body.as_ref()?;
                Some(world.actions.valid_for(agent.kind.role(), body))
            })
            .unwrap_or_default()
    }

    /// Reports whether the validator would accept the action for the agent.
    #[must_use]
    pub fn is_valid_action(world: &World, agent: AgentId, action: Action) -> bool {
        valid_actions(world, agent).contains(action)
    }

    /// Cell the agent would reach by performing the action from its current cell.
    ///
    /// Walls are not consulted; the projection only applies the wrapped offset.
    #[must_use]
    pub fn predict_result(world: &World, agent: AgentId, action: Action) -> Option<CellCoord> {
        let (columns, rows) = world.grid.dimensions();
        let body = world.agent(agent)?.body.as_ref()?;
        Some(body.cell(columns, rows).neighbor(action, columns, rows))
    }

    /// Reports whether any ghost currently counts as occupying the cell.
    #[must_use]
    pub fn has_ghost_at(world: &World, cell: CellCoord) -> bool {
        let (columns, rows) = world.grid.dimensions();
        let cell = world.grid.wrap(cell);
        world.agents.iter().any(|agent| {
            agent.kind.role() == AgentRole::Ghost
                && agent
                    .body
                    .as_ref()
                    .is_some_and(|body| body.cell(columns, rows) == cell)
        })
    }
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    kind: AgentKind,
    body: Option<Body>,
}

impl Agent {
    fn snapshot(&self, columns: u32, rows: u32) -> Option<AgentSnapshot> {
        let body = self.body.as_ref()?;
        let (scared, scare_remaining, color) = match &self.kind {
            AgentKind::Player => (false, Duration::ZERO, None),
            AgentKind::Ghost(state) => (state.scared, state.scare_remaining, Some(state.color)),
        };

        Some(AgentSnapshot {
            id: self.id,
            role: self.kind.role(),
            cell: body.cell(columns, rows),
            position: body.position(),
            heading: body.heading(),
            moving: !body.is_resting(),
            scared,
            scare_remaining,
            color,
        })
    }
}

#[derive(Clone, Debug)]
enum AgentKind {
    Player,
    Ghost(GhostState),
}

impl AgentKind {
    fn role(&self) -> AgentRole {
        match self {
            Self::Player => AgentRole::Player,
            Self::Ghost(_) => AgentRole::Ghost,
        }
    }
}

#[derive(Clone, Debug)]
struct GhostState {
    home: CellCoord,
    color: GhostColor,
    scared: bool,
    scare_remaining: Duration,
}

impl GhostState {
    fn new(home: CellCoord, color: GhostColor) -> Self {
        Self {
            home,
            color,
            scared: false,
            scare_remaining: Duration::ZERO,
        }
    }
}
