#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game state controller driving one simulation tick at a time.
//!
//! Each call to [`Controller::update`] runs the same fixed sequence against
//! the world: an optional contact pass, perceptions and think callbacks in
//! registration order, body integration, a second contact pass and finally
//! the terminal check.

use std::{fmt, time::Duration};

use maze_chase_core::{AgentId, Brain, Command, Event, ThinkContext};
use maze_chase_system_perception::{PerceptionLog, PerceptionSet};
use maze_chase_world::{self as world, query, World};
use tracing::{debug, trace};

/// When contact checks run within a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactPasses {
    /// Check before the agents think and again after bodies moved.
    #[default]
    PreAndPost,
    /// Check only after bodies moved.
    PostOnly,
}

/// Configuration parameters required to construct the controller.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    contact_passes: ContactPasses,
}

impl Config {
    /// Creates a configuration using the provided contact policy.
    #[must_use]
    pub const fn new(contact_passes: ContactPasses) -> Self {
        Self { contact_passes }
    }

    /// Contact policy applied every tick.
    #[must_use]
    pub const fn contact_passes(&self) -> ContactPasses {
        self.contact_passes
    }
}

struct Registration {
    agent: AgentId,
    brain: Box<dyn Brain>,
    perceptions: PerceptionSet,
    log: Option<PerceptionLog>,
}

/// Binds think callbacks to world agents and advances the game.
pub struct Controller {
    config: Config,
    registrations: Vec<Registration>,
    ticks: u64,
}

impl Controller {
    /// Creates a controller without registered agents.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registrations: Vec::new(),
            ticks: 0,
        }
    }

    /// Registers a think callback and its perceptions for `agent`.
    ///
    /// Agents think in the order they were registered.
    pub fn register(
        &mut self,
        agent: AgentId,
        brain: impl Brain + 'static,
        perceptions: PerceptionSet,
    ) {
        self.registrations.push(Registration {
            agent,
            brain: Box::new(brain),
            perceptions,
            log: None,
        });
    }

    /// Starts recording perceptions and actions of a registered agent.
    ///
    /// Returns `false` when the agent is not registered.
    pub fn record(&mut self, agent: AgentId) -> bool {
        match self.registration_mut(agent) {
            Some(registration) => {
                let _ = registration.log.get_or_insert_with(PerceptionLog::new);
                true
            }
            None => false,
        }
    }

    /// Recording captured for the agent, if recording was enabled.
    #[must_use]
    pub fn log(&self, agent: AgentId) -> Option<&PerceptionLog> {
        self.registrations
            .iter()
            .find(|registration| registration.agent == agent)
            .and_then(|registration| registration.log.as_ref())
    }

    /// Number of ticks that ran while the game was live.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one tick of `dt` simulated time.
    ///
    /// Does nothing once the game is over.
    pub fn update(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        if query::status(world).is_over() {
            return;
        }
        self.ticks += 1;
        let first_event = out_events.len();

        if self.config.contact_passes == ContactPasses::PreAndPost {
            world::apply(world, Command::ResolveContacts, out_events);
        }

        for registration in &mut self.registrations {
            registration.think(world, dt, out_events);
        }

        world::apply(world, Command::Advance { dt }, out_events);
        world::apply(world, Command::ResolveContacts, out_events);
        world::apply(world, Command::EvaluateOutcome, out_events);

        for event in &out_events[first_event..] {
            if let Event::GameOver { outcome } = event {
                let status = query::status(world);
                debug!(
                    ?outcome,
                    score = status.score,
                    ticks = self.ticks,
                    "game finished"
                );
            }
        }
        trace!(
            tick = self.ticks,
            events = out_events.len() - first_event,
            "tick complete"
        );
    }

    fn registration_mut(&mut self, agent: AgentId) -> Option<&mut Registration> {
        self.registrations
            .iter_mut()
            .find(|registration| registration.agent == agent)
    }
}

impl Registration {
    fn think(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(snapshot) = query::agent(world, self.agent) else {
            return;
        };

        let perceptions = self.perceptions.refresh(world, &snapshot);
        let context = ThinkContext {
            agent: &snapshot,
            perceptions: &perceptions,
            valid_actions: query::valid_actions(world, self.agent),
        };

        if let Some(action) = self.brain.think(dt, &context) {
            world::apply(
                world,
                Command::PerformAction {
                    agent: self.agent,
                    action,
                },
                out_events,
            );
        }

        if let Some(log) = self.log.as_mut() {
            if snapshot.is_resting() {
                let heading = query::agent(world, self.agent).and_then(|agent| agent.heading);
                log.record(&perceptions, heading);
            }
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agents: Vec<AgentId> = self
            .registrations
            .iter()
            .map(|registration| registration.agent)
            .collect();
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("agents", &agents)
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::Action;

    #[test]
    fn contact_checks_run_twice_by_default() {
        assert_eq!(Config::default().contact_passes(), ContactPasses::PreAndPost);
        assert_eq!(
            Config::new(ContactPasses::PostOnly).contact_passes(),
            ContactPasses::PostOnly
        );
    }

    #[test]
    fn recording_requires_registration() {
        let mut controller = Controller::new(Config::default());
        assert!(!controller.record(AgentId::new(0)));

        controller.register(
            AgentId::new(0),
            |_: Duration, _: &ThinkContext<'_>| -> Option<Action> { None },
            PerceptionSet::new(),
        );
        assert!(controller.record(AgentId::new(0)));
        assert!(controller.log(AgentId::new(0)).is_some_and(PerceptionLog::is_empty));
        assert!(controller.log(AgentId::new(1)).is_none());
    }
}
