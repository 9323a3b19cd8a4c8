#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Drivers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Agent brains never touch the world directly: they receive a
//! [`ThinkContext`] built from immutable snapshots and answer with at most one
//! [`Action`] per tick through the [`Brain`] contract.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player be spawned at the level's player spawn cell.
    SpawnPlayer,
    /// Requests that a ghost be spawned at one of the level's ghost spawn cells.
    SpawnGhost,
    /// Requests that an agent start moving according to the provided action.
    ///
    /// The world only honours the request when the action validator accepts
    /// it; rejected requests are dropped without producing events.
    PerformAction {
        /// Agent whose body should start moving.
        agent: AgentId,
        /// Discrete move the agent wants to perform.
        action: Action,
    },
    /// Runs a single collision and eating pass over the current positions.
    ResolveContacts,
    /// Integrates every body and counts down scare timers.
    Advance {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Checks whether the game reached a terminal state.
    EvaluateOutcome,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player body was (re)created at the spawn cell.
    PlayerSpawned {
        /// Identifier of the player agent.
        agent: AgentId,
        /// Cell the player occupies after spawning.
        cell: CellCoord,
    },
    /// Reports that a player spawn was refused because a live player exists.
    PlayerSpawnRejected,
    /// Confirms that a ghost was created or respawned.
    GhostSpawned {
        /// Identifier of the ghost agent.
        agent: AgentId,
        /// Cell the ghost occupies after spawning.
        cell: CellCoord,
        /// Appearance assigned to the ghost.
        color: GhostColor,
    },
    /// Reports that a ghost spawn was refused because the level has no ghost spawn cells.
    GhostSpawnRejected,
    /// Confirms that an accepted action set a body in motion.
    AgentDeparted {
        /// Identifier of the agent that started moving.
        agent: AgentId,
        /// Cell the agent rested on before moving.
        from: CellCoord,
        /// Action that was accepted.
        action: Action,
    },
    /// Confirms that a moving body reached its target cell and is resting again.
    AgentArrived {
        /// Identifier of the agent that arrived.
        agent: AgentId,
        /// Cell the body now rests on.
        cell: CellCoord,
    },
    /// Reports that the player consumed a food item.
    FoodEaten {
        /// Identifier of the agent that ate the food.
        agent: AgentId,
        /// Cell that held the food.
        cell: CellCoord,
        /// Kind of food that was consumed.
        kind: FoodKind,
        /// Points awarded for the food.
        value: u32,
        /// Score after the points were awarded.
        score: u32,
    },
    /// Announces that every ghost became vulnerable.
    GhostsScared {
        /// Length of the vulnerability window.
        duration: Duration,
    },
    /// Announces that a ghost's scare timer ran out.
    GhostRecovered {
        /// Identifier of the ghost that recovered.
        agent: AgentId,
    },
    /// Reports that the player ate a scared ghost, sending it home.
    GhostEaten {
        /// Identifier of the ghost that was eaten.
        agent: AgentId,
        /// Cell on which the ghost was caught.
        cell: CellCoord,
    },
    /// Reports that a ghost caught the player.
    PlayerKilled {
        /// Identifier of the player agent.
        agent: AgentId,
        /// Cell on which the player was caught.
        cell: CellCoord,
        /// Ghost that caught the player.
        by: AgentId,
        /// Lives left after the kill.
        lives_remaining: u32,
    },
    /// Announces that the game reached a terminal state.
    GameOver {
        /// Final result of the game.
        outcome: Outcome,
    },
}

/// Terminal result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every food item was eaten.
    Won,
    /// The player ran out of lives.
    Lost,
}

/// Visual appearance applied to a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GhostColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl GhostColor {
    /// Creates a new ghost color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Colors handed out to ghosts in spawn order.
pub const GHOST_PALETTE: [GhostColor; 4] = [
    GhostColor::from_rgb(220, 0, 0),
    GhostColor::from_rgb(0, 220, 0),
    GhostColor::from_rgb(0, 100, 220),
    GhostColor::from_rgb(180, 180, 20),
];

/// Discrete one-cell moves available to every agent.
///
/// Row indices grow upward, so [`Action::Up`] increases the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Movement toward increasing row indices.
    Up,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Action {
    /// Every action in canonical order.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Symbolic name of the action.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Unit direction vector expressed as `(column delta, row delta)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Action that exactly undoes this one.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether the action moves along the column axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Down => 0b0010,
            Self::Left => 0b0100,
            Self::Right => 0b1000,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown action name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown action `{0}`; expected one of up, down, left, right")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == value)
            .ok_or_else(|| UnknownAction(value.to_owned()))
    }
}

/// Compact set of actions iterated in canonical order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u8);

impl ActionSet {
    /// Creates a set without any action.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set containing every action.
    #[must_use]
    pub const fn all() -> Self {
        Self(0b1111)
    }

    /// Adds an action to the set.
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    /// Removes an action from the set.
    pub fn remove(&mut self, action: Action) {
        self.0 &= !action.bit();
    }

    /// Reports whether the action belongs to the set.
    #[must_use]
    pub const fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    /// Number of actions in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Reports whether the set holds no action.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained actions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL
            .into_iter()
            .filter(move |action| self.contains(*action))
    }

    /// Collects the contained actions into a vector in canonical order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Action> {
        self.iter().collect()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = Self::empty();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// Unique identifier assigned to an agent by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kind of agent bound to a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    /// The single player agent that eats food and owns the lives counter.
    Player,
    /// A ghost chasing the player.
    Ghost,
}

/// Kinds of food laid out in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    /// Regular food item.
    Dot,
    /// Power food item that scares every ghost.
    Pellet,
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the bottom row of the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Normalises signed coordinates onto a toroidal grid of the given size.
    ///
    /// Zero dimensions are treated as one so the result is always defined.
    #[must_use]
    pub fn wrapped(column: i64, row: i64, columns: u32, rows: u32) -> Self {
        let columns = i64::from(columns.max(1));
        let rows = i64::from(rows.max(1));
        Self {
            column: column.rem_euclid(columns) as u32,
            row: row.rem_euclid(rows) as u32,
        }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell reached by performing `action`, wrapping around the grid edges.
    #[must_use]
    pub fn neighbor(self, action: Action, columns: u32, rows: u32) -> Self {
        self.offset(action.delta(), columns, rows)
    }

    /// Cell displaced by `(column delta, row delta)`, wrapping around the grid edges.
    #[must_use]
    pub fn offset(self, delta: (i32, i32), columns: u32, rows: u32) -> Self {
        Self::wrapped(
            i64::from(self.column) + i64::from(delta.0),
            i64::from(self.row) + i64::from(delta.1),
            columns,
            rows,
        )
    }
}

/// Continuous position of a body measured in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Kind of agent.
    pub role: AgentRole,
    /// Grid cell the body currently counts as occupying.
    pub cell: CellCoord,
    /// Continuous position of the body.
    pub position: Position,
    /// Direction of the most recent accepted action, if any.
    pub heading: Option<Action>,
    /// Indicates whether the body is travelling toward a target cell.
    pub moving: bool,
    /// Indicates whether the agent is a scared ghost.
    pub scared: bool,
    /// Time left on the scare timer.
    pub scare_remaining: Duration,
    /// Appearance assigned to ghosts.
    pub color: Option<GhostColor>,
}

impl AgentSnapshot {
    /// Reports whether the body rests exactly on a cell without a pending target.
    #[must_use]
    pub const fn is_resting(&self) -> bool {
        !self.moving
    }
}

/// Read-only snapshot describing every live agent.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided agent.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Score, lives and progress of the running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameStatus {
    /// Points accumulated by the player.
    pub score: u32,
    /// Lives left to the player.
    pub lives: u32,
    /// Food items still laid out in the maze.
    pub food_remaining: u32,
    /// Terminal result, once reached.
    pub outcome: Option<Outcome>,
}

impl GameStatus {
    /// Reports whether the game reached a terminal state.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Reports whether the player won.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.outcome == Some(Outcome::Won)
    }
}

/// Value produced by a perception.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerceptionValue {
    /// Boolean reading.
    Flag(bool),
    /// Integer reading.
    Count(i64),
    /// Symbolic reading; an empty label means nothing was perceived.
    Label(String),
}

impl PerceptionValue {
    /// Reports whether the reading carries no information.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Label(label) if label.is_empty())
    }
}

impl fmt::Display for PerceptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => f.write_str(if *value { "1" } else { "0" }),
            Self::Count(value) => write!(f, "{value}"),
            Self::Label(value) => f.write_str(value),
        }
    }
}

/// Ordered list of named perception readings.
///
/// Iteration follows insertion order. Pushing a name that already exists
/// replaces its value in place, so names stay stable across ticks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Perceptions {
    entries: Vec<(String, PerceptionValue)>,
}

impl Perceptions {
    /// Creates an empty reading list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reading under the provided name.
    pub fn push(&mut self, name: impl Into<String>, value: PerceptionValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Retrieves the reading recorded under the provided name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PerceptionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Iterates readings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PerceptionValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates reading names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no reading was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a brain may look at while deciding on its next action.
#[derive(Clone, Copy, Debug)]
pub struct ThinkContext<'a> {
    /// Snapshot of the thinking agent.
    pub agent: &'a AgentSnapshot,
    /// Perceptions recomputed for the agent this tick.
    pub perceptions: &'a Perceptions,
    /// Actions the validator would accept right now.
    pub valid_actions: ActionSet,
}

/// Think callback contract implemented by every agent brain.
///
/// Brains are polled once per tick in registration order while the game is
/// running. They must return immediately; the returned action is still
/// subject to validation by the world.
pub trait Brain {
    /// Decides which action, if any, the agent attempts this tick.
    fn think(&mut self, elapsed: Duration, context: &ThinkContext<'_>) -> Option<Action>;
}

impl<F> Brain for F
where
    F: FnMut(Duration, &ThinkContext<'_>) -> Option<Action>,
{
    fn think(&mut self, elapsed: Duration, context: &ThinkContext<'_>) -> Option<Action> {
        self(elapsed, context)
    }
}
