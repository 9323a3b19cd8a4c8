use std::{cell::RefCell, rc::Rc, time::Duration};

use maze_chase_core::{Action, AgentId, Command, Event, Outcome, ThinkContext};
use maze_chase_system_brains::{Idle, PathFollower};
use maze_chase_system_controller::{Config, ContactPasses, Controller};
use maze_chase_system_perception::{HeadingLabel, PerceptionSet};
use maze_chase_world::{self as world, query, Config as WorldConfig, Level, World};

const TICK: Duration = Duration::from_millis(100);

fn build(text: &str) -> World {
    let level = Level::parse(text).expect("valid level");
    World::new(&level, WorldConfig::default()).expect("valid world")
}

fn spawn(world: &mut World, command: Command) -> AgentId {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    match events.as_slice() {
        [Event::PlayerSpawned { agent, .. }] | [Event::GhostSpawned { agent, .. }] => *agent,
        other => panic!("unexpected spawn events {other:?}"),
    }
}

fn ghost_onto_player(passes: ContactPasses) -> (World, Controller) {
    let mut world = build("XXXXXX\nXGP  X\nXXXXXX\n");
    let player = spawn(&mut world, Command::SpawnPlayer);
    let ghost = spawn(&mut world, Command::SpawnGhost);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PerformAction {
            agent: ghost,
            action: Action::Right,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::Advance {
            dt: Duration::from_millis(200),
        },
        &mut events,
    );
    assert_eq!(
        query::agent(&world, ghost).expect("ghost").cell,
        query::player(&world).expect("player").cell
    );

    let mut controller = Controller::new(Config::new(passes));
    controller.register(
        player,
        PathFollower::new([Action::Right]),
        PerceptionSet::new(),
    );
    controller.register(ghost, Idle, PerceptionSet::new());
    (world, controller)
}

#[test]
fn pre_check_catches_contacts_left_from_outside_the_tick() {
    let (mut world, mut controller) = ghost_onto_player(ContactPasses::PreAndPost);
    let mut events = Vec::new();

    controller.update(&mut world, TICK, &mut events);

    assert_eq!(query::status(&world).lives, 2);
    let killed = events
        .iter()
        .position(|event| matches!(event, Event::PlayerKilled { .. }))
        .expect("player killed");
    let departed = events
        .iter()
        .position(|event| matches!(event, Event::AgentDeparted { .. }))
        .expect("player departed");
    let advanced = events
        .iter()
        .position(|event| matches!(event, Event::TimeAdvanced { .. }))
        .expect("time advanced");
    assert!(killed < departed);
    assert!(departed < advanced);
}

#[test]
fn post_only_lets_the_player_slip_away() {
    let (mut world, mut controller) = ghost_onto_player(ContactPasses::PostOnly);
    let mut events = Vec::new();

    controller.update(&mut world, TICK, &mut events);

    assert_eq!(query::status(&world).lives, 3);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerKilled { .. })));
}

#[test]
fn agents_think_in_registration_order() {
    let mut world = build("XXXXXXX\nXG.P.GX\nXXXXXXX\n");
    let player = spawn(&mut world, Command::SpawnPlayer);
    let first_ghost = spawn(&mut world, Command::SpawnGhost);
    let second_ghost = spawn(&mut world, Command::SpawnGhost);

    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut controller = Controller::new(Config::default());
    for agent in [second_ghost, player, first_ghost] {
        let calls = Rc::clone(&calls);
        controller.register(
            agent,
            move |_: Duration, context: &ThinkContext<'_>| -> Option<Action> {
                calls.borrow_mut().push(context.agent.id);
                None
            },
            PerceptionSet::new(),
        );
    }

    let mut events = Vec::new();
    controller.update(&mut world, TICK, &mut events);
    controller.update(&mut world, TICK, &mut events);

    assert_eq!(
        *calls.borrow(),
        vec![
            second_ghost,
            player,
            first_ghost,
            second_ghost,
            player,
            first_ghost
        ]
    );
}

#[test]
fn brains_see_perceptions_and_valid_actions() {
    let mut world = build("XXXXX\nX P X\nXXXXX\n");
    let player = spawn(&mut world, Command::SpawnPlayer);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut controller = Controller::new(Config::default());
    let sink = Rc::clone(&seen);
    controller.register(
        player,
        move |elapsed: Duration, context: &ThinkContext<'_>| -> Option<Action> {
            sink.borrow_mut().push((
                elapsed,
                context.valid_actions.to_vec(),
                context.perceptions.get("direction").cloned(),
            ));
            None
        },
        PerceptionSet::new().with(HeadingLabel),
    );

    let mut events = Vec::new();
    controller.update(&mut world, TICK, &mut events);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, TICK);
    assert_eq!(seen[0].1, vec![Action::Left, Action::Right]);
    assert_eq!(
        seen[0].2,
        Some(maze_chase_core::PerceptionValue::Label("going_stop".to_owned()))
    );
}

#[test]
fn finished_games_stop_ticking() {
    let mut world = build("XXXX\nXP.X\nXXXX\n");
    let player = spawn(&mut world, Command::SpawnPlayer);

    let thoughts = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&thoughts);
    let mut controller = Controller::new(Config::default());
    let mut script = PathFollower::new([Action::Right]);
    controller.register(
        player,
        move |elapsed: Duration, context: &ThinkContext<'_>| -> Option<Action> {
            *counter.borrow_mut() += 1;
            maze_chase_core::Brain::think(&mut script, elapsed, context)
        },
        PerceptionSet::new(),
    );

    let mut events = Vec::new();
    controller.update(&mut world, TICK, &mut events);
    assert!(events.contains(&Event::GameOver {
        outcome: Outcome::Won
    }));
    assert_eq!(*thoughts.borrow(), 1);
    assert_eq!(controller.ticks(), 1);

    events.clear();
    controller.update(&mut world, TICK, &mut events);
    assert!(events.is_empty());
    assert_eq!(*thoughts.borrow(), 1);
    assert_eq!(controller.ticks(), 1);
}

#[test]
fn recording_captures_resting_decisions_only() {
    let mut world = build("     \n  P  \n.    \n");
    let player = spawn(&mut world, Command::SpawnPlayer);

    let mut controller = Controller::new(Config::default());
    controller.register(
        player,
        PathFollower::new([Action::Right, Action::Up]),
        PerceptionSet::new().with(HeadingLabel),
    );
    assert!(controller.record(player));

    let mut events = Vec::new();
    for _ in 0..5 {
        controller.update(&mut world, TICK, &mut events);
    }

    let log = controller.log(player).expect("recording enabled");
    assert_eq!(log.header(), &["direction", "action"]);
    assert_eq!(
        log.rows(),
        &[
            vec!["going_stop".to_owned(), "right".to_owned()],
            vec!["going_right".to_owned(), "up".to_owned()],
            vec!["going_up".to_owned(), "up".to_owned()],
        ]
    );
}
