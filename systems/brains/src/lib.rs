#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stock think callbacks for players and ghosts.
//!
//! Every brain only looks at the [`ThinkContext`] it is handed and answers
//! with at most one action. The world still validates whatever comes back.

use std::{collections::VecDeque, time::Duration};

use maze_chase_core::{Action, Brain, ThinkContext, UnknownAction};
use rand::{seq::IteratorRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Brain that never acts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl Brain for Idle {
    fn think(&mut self, _elapsed: Duration, _context: &ThinkContext<'_>) -> Option<Action> {
        None
    }
}

/// Picks a uniformly random valid action whenever the agent rests.
///
/// Ghost contexts already omit the reversing action, so a wandering ghost
/// only turns back in dead ends.
#[derive(Clone, Debug)]
pub struct Wanderer {
    rng: ChaCha8Rng,
}

impl Wanderer {
    /// Creates a wanderer whose choices are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Brain for Wanderer {
    fn think(&mut self, _elapsed: Duration, context: &ThinkContext<'_>) -> Option<Action> {
        if !context.agent.is_resting() {
            return None;
        }
        context.valid_actions.iter().choose(&mut self.rng)
    }
}

/// Keyboard-style control: a requested direction is taken as soon as it is
/// valid, otherwise the agent keeps going the way it last went.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeldDirection {
    requested: Option<Action>,
    current: Option<Action>,
}

impl HeldDirection {
    /// Creates a brain without any requested direction.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requested: None,
            current: None,
        }
    }

    /// Replaces the requested direction; `None` releases the key.
    pub fn request(&mut self, action: Option<Action>) {
        self.requested = action;
    }

    /// Direction currently requested.
    #[must_use]
    pub const fn requested(&self) -> Option<Action> {
        self.requested
    }

    /// Direction most recently handed to the world.
    #[must_use]
    pub const fn current(&self) -> Option<Action> {
        self.current
    }
}

impl Brain for HeldDirection {
    fn think(&mut self, _elapsed: Duration, context: &ThinkContext<'_>) -> Option<Action> {
        if !context.agent.is_resting() {
            return None;
        }

        let next = self
            .requested
            .filter(|action| context.valid_actions.contains(*action))
            .or_else(|| {
                self.current
                    .filter(|action| context.valid_actions.contains(*action))
            });

        if next.is_some() {
            self.current = next;
        }
        next
    }
}

/// Replays a scripted sequence of actions, one per resting tick.
#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    queue: VecDeque<Action>,
}

impl PathFollower {
    /// Creates a follower that performs `actions` in order.
    #[must_use]
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
        }
    }

    /// Parses a list of action names such as `["up", "left"]`.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, UnknownAction> {
        let queue = names
            .into_iter()
            .map(str::parse::<Action>)
            .collect::<Result<VecDeque<Action>, _>>()?;
        Ok(Self { queue })
    }

    /// Appends an action to the end of the script.
    pub fn push(&mut self, action: Action) {
        self.queue.push_back(action);
    }

    /// Number of actions not yet performed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether every scripted action was handed out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Brain for PathFollower {
    fn think(&mut self, _elapsed: Duration, context: &ThinkContext<'_>) -> Option<Action> {
        if !context.agent.is_resting() {
            return None;
        }
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{
        ActionSet, AgentId, AgentRole, AgentSnapshot, CellCoord, Perceptions, Position,
    };

    const TICK: Duration = Duration::from_millis(16);

    fn snapshot(moving: bool) -> AgentSnapshot {
        AgentSnapshot {
            id: AgentId::new(0),
            role: AgentRole::Player,
            cell: CellCoord::new(1, 1),
            position: Position { x: 1.0, y: 1.0 },
            heading: None,
            moving,
            scared: false,
            scare_remaining: Duration::ZERO,
            color: None,
        }
    }

    fn think(brain: &mut impl Brain, moving: bool, valid: &[Action]) -> Option<Action> {
        let agent = snapshot(moving);
        let perceptions = Perceptions::new();
        let context = ThinkContext {
            agent: &agent,
            perceptions: &perceptions,
            valid_actions: valid.iter().copied().collect::<ActionSet>(),
        };
        brain.think(TICK, &context)
    }

    #[test]
    fn idle_never_acts() {
        assert_eq!(think(&mut Idle, false, &Action::ALL), None);
    }

    #[test]
    fn wanderer_only_picks_valid_actions() {
        let mut wanderer = Wanderer::new(7);
        let valid = [Action::Down, Action::Left];
        for _ in 0..64 {
            let action = think(&mut wanderer, false, &valid).expect("an action");
            assert!(valid.contains(&action));
        }
        assert_eq!(think(&mut wanderer, false, &[]), None);
        assert_eq!(think(&mut wanderer, true, &valid), None);
    }

    #[test]
    fn wanderers_with_equal_seeds_agree() {
        let mut first = Wanderer::new(99);
        let mut second = Wanderer::new(99);
        for _ in 0..32 {
            assert_eq!(
                think(&mut first, false, &Action::ALL),
                think(&mut second, false, &Action::ALL)
            );
        }
    }

    #[test]
    fn held_direction_keeps_going_until_the_request_is_possible() {
        let mut brain = HeldDirection::new();
        brain.request(Some(Action::Right));
        assert_eq!(
            think(&mut brain, false, &[Action::Left, Action::Right]),
            Some(Action::Right)
        );

        brain.request(Some(Action::Up));
        assert_eq!(
            think(&mut brain, false, &[Action::Left, Action::Right]),
            Some(Action::Right)
        );
        assert_eq!(think(&mut brain, true, &[]), None);
        assert_eq!(
            think(&mut brain, false, &[Action::Up, Action::Right]),
            Some(Action::Up)
        );
        assert_eq!(brain.current(), Some(Action::Up));

        assert_eq!(think(&mut brain, false, &[Action::Down]), None);
        assert_eq!(brain.current(), Some(Action::Up));
    }

    #[test]
    fn released_key_still_follows_the_corridor() {
        let mut brain = HeldDirection::new();
        brain.request(Some(Action::Left));
        let _ = think(&mut brain, false, &Action::ALL);
        brain.request(None);

        assert_eq!(
            think(&mut brain, false, &[Action::Left, Action::Right]),
            Some(Action::Left)
        );
    }

    #[test]
    fn path_follower_pops_one_action_per_resting_tick() {
        let mut follower = PathFollower::from_names(["up", "left"]).expect("valid names");
        assert_eq!(follower.remaining(), 2);

        assert_eq!(think(&mut follower, false, &Action::ALL), Some(Action::Up));
        assert_eq!(think(&mut follower, true, &Action::ALL), None);
        assert_eq!(think(&mut follower, false, &Action::ALL), Some(Action::Left));
        assert!(follower.is_finished());
        assert_eq!(think(&mut follower, false, &Action::ALL), None);

        follower.push(Action::Down);
        assert_eq!(think(&mut follower, false, &[]), Some(Action::Down));
    }

    #[test]
    fn path_follower_rejects_unknown_names() {
        let error = PathFollower::from_names(["up", "jump"]).expect_err("unknown name");
        assert_eq!(error, UnknownAction("jump".to_owned()));
    }
}
