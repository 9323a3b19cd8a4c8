use std::time::Duration;

use maze_chase_core::{Action, Command, PerceptionValue, Perceptions};
use maze_chase_system_perception::{CoinFlip, HeadingLabel, PerceptionLog, PerceptionSet};
use maze_chase_world::{self as world, query, Config, Level, World};

const LEVEL: &str = "XXXXXX\nX.P GX\nXXXXXX\n";

fn world_with_ghost() -> World {
    let level = Level::parse(LEVEL).expect("valid level");
    let mut world = World::new(&level, Config::default()).expect("valid world");
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnPlayer, &mut events);
    world::apply(&mut world, Command::SpawnGhost, &mut events);
    world
}

fn sense(world: &World, set: &mut PerceptionSet) -> Perceptions {
    let player = query::player(world).expect("player alive");
    set.refresh(world, &player)
}

fn flag(perceptions: &Perceptions, name: &str) -> bool {
    match perceptions.get(name) {
        Some(PerceptionValue::Flag(value)) => *value,
        other => panic!("expected flag for {name}, got {other:?}"),
    }
}

#[test]
fn standard_set_publishes_readings_in_order() {
    let world = world_with_ghost();
    let mut set = PerceptionSet::standard(3);
    let perceptions = sense(&world, &mut set);

    let names: Vec<_> = perceptions.names().collect();
    assert_eq!(
        names,
        vec![
            "going_up",
            "going_down",
            "going_left",
            "going_right",
            "wall_up",
            "wall_down",
            "wall_left",
            "wall_right",
            "food_up",
            "food_down",
            "food_left",
            "food_right",
            "ghost",
            "random",
        ]
    );
    assert_eq!(set.names().collect::<Vec<_>>(), names);

    assert!(flag(&perceptions, "wall_up"));
    assert!(flag(&perceptions, "wall_down"));
    assert!(!flag(&perceptions, "wall_left"));
    assert!(!flag(&perceptions, "wall_right"));
    assert!(flag(&perceptions, "food_left"));
    assert!(!flag(&perceptions, "food_right"));
    assert!(!flag(&perceptions, "going_right"));
    assert!(!flag(&perceptions, "ghost"));
}

#[test]
fn heading_and_ghost_readings_follow_the_move() {
    let mut world = world_with_ghost();
    let player = query::player_id(&world).expect("player spawned");
    let mut set = PerceptionSet::standard(3).with(HeadingLabel);
    assert_eq!(
        sense(&world, &mut set).get("direction"),
        Some(&PerceptionValue::Label("going_stop".to_owned()))
    );

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PerformAction {
            agent: player,
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

    let perceptions = sense(&world, &mut set);
    assert!(flag(&perceptions, "going_right"));
    assert!(!flag(&perceptions, "going_left"));
    assert!(flag(&perceptions, "ghost"));
    assert_eq!(
        perceptions.get("direction"),
        Some(&PerceptionValue::Label("going_right".to_owned()))
    );
}

#[test]
fn coin_flips_repeat_for_equal_seeds() {
    let world = world_with_ghost();
    let mut first = PerceptionSet::new().with(CoinFlip::new(11));
    let mut second = PerceptionSet::new().with(CoinFlip::new(11));

    for _ in 0..16 {
        assert_eq!(sense(&world, &mut first), sense(&world, &mut second));
    }
}

#[test]
fn log_records_the_standard_readings() {
    let world = world_with_ghost();
    let mut set = PerceptionSet::standard(5);
    let mut log = PerceptionLog::new();

    let perceptions = sense(&world, &mut set);
    log.record(&perceptions, None);

    assert_eq!(log.header().len(), set.len() + 1);
    assert_eq!(log.header().last().map(String::as_str), Some("action"));
    assert_eq!(log.rows()[0].last().map(String::as_str), Some("stop"));
}
