//! Continuous motion of agents between discrete cells.

use std::time::Duration;

use maze_chase_core::{Action, CellCoord, Position};

/// Slack, in cells, accepted when testing whether a move is complete.
const ARRIVAL_TOLERANCE: f64 = 1e-9;

/// Kinematic state of a single agent.
///
/// A body is RESTING when it has no pending move, in which case its position
/// sits exactly on an integer cell. Assigning a direction makes it MOVING
/// toward the adjacent cell. Progress is measured from the origin cell as
/// distance travelled, so arrival does not depend on the magnitude of the
/// coordinates or on how the crossing time was split into ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    x: f32,
    y: f32,
    heading: Option<Action>,
    motion: Option<Motion>,
    speed: f32,
    excess: f32,
    animate: bool,
}

/// One move from an origin cell to its neighbour.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    origin: (i64, i64),
    delta: (i64, i64),
    speed: f64,
    carried: f64,
    elapsed: Duration,
}

impl Motion {
    /// Cells covered so far, including overshoot carried from the last move.
    fn travelled(&self) -> f64 {
        self.carried + self.speed * self.elapsed.as_secs_f64()
    }

    fn target(&self) -> (i64, i64) {
        (self.origin.0 + self.delta.0, self.origin.1 + self.delta.1)
    }

    fn position(&self, travelled: f64, columns: u32, rows: u32) -> (f32, f32) {
        let x = self.origin.0 as f64 + self.delta.0 as f64 * travelled;
        let y = self.origin.1 as f64 + self.delta.1 as f64 * travelled;
        (wrap_axis(x, columns) as f32, wrap_axis(y, rows) as f32)
    }
}

/// Shifts a coordinate that passed half a cell beyond either edge.
fn wrap_axis(value: f64, extent: u32) -> f64 {
    let extent = f64::from(extent);
    if value > extent - 0.5 {
        value - extent
    } else if value < -0.5 {
        value + extent
    } else {
        value
    }
}

impl Body {
    /// Creates a resting body on the provided cell.
    #[must_use]
    pub fn new(cell: CellCoord, speed: f32) -> Self {
        Self {
            x: cell.column() as f32,
            y: cell.row() as f32,
            heading: None,
            motion: None,
            speed,
            excess: 0.0,
            animate: true,
        }
    }

    /// Enables or disables smooth motion; disabled bodies snap to their target.
    #[must_use]
    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Continuous position of the body.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    /// Direction of the most recently assigned move.
    #[must_use]
    pub const fn heading(&self) -> Option<Action> {
        self.heading
    }

    /// Reports whether the body rests on a cell without a pending move.
    #[must_use]
    pub const fn is_resting(&self) -> bool {
        self.motion.is_none()
    }

    /// Cells travelled per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Changes the speed used by the next assigned direction.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Distance carried over from the last overshoot, along the heading.
    #[must_use]
    pub fn excess(&self) -> (f32, f32) {
        let (dx, dy) = self.heading.map_or((0, 0), Action::delta);
        (dx as f32 * self.excess, dy as f32 * self.excess)
    }

    /// Cell the body counts as occupying: its rounded, wrapped position.
    #[must_use]
    pub fn cell(&self, columns: u32, rows: u32) -> CellCoord {
        CellCoord::wrapped(
            self.x.round() as i64,
            self.y.round() as i64,
            columns,
            rows,
        )
    }

    /// Target cell of the current move, wrapped onto the grid.
    #[must_use]
    pub fn target_cell(&self, columns: u32, rows: u32) -> Option<CellCoord> {
        self.motion.map(|motion| {
            let (column, row) = motion.target();
            CellCoord::wrapped(column, row, columns, rows)
        })
    }

    /// Starts a move in the given direction, or a stop when `None`.
    ///
    /// Returns `false` without changing anything while the body is moving.
    pub fn set_direction(&mut self, heading: Option<Action>, columns: u32, rows: u32) -> bool {
        if self.motion.is_some() {
            return false;
        }

        if heading != self.heading {
            self.excess = 0.0;
        }

        let origin = self.cell(columns, rows);
        let (dx, dy) = heading.map_or((0, 0), Action::delta);
        self.heading = heading;
        self.motion = Some(Motion {
            origin: (i64::from(origin.column()), i64::from(origin.row())),
            delta: (i64::from(dx), i64::from(dy)),
            speed: f64::from(self.speed),
            carried: f64::from(std::mem::take(&mut self.excess)),
            elapsed: Duration::ZERO,
        });
        true
    }

    /// Integrates motion over `dt`, returning the cell reached on arrival.
    pub fn advance(&mut self, dt: Duration, columns: u32, rows: u32) -> Option<CellCoord> {
        let motion = self.motion.as_mut()?;
        let target = motion.target();

        if !self.animate || motion.delta == (0, 0) {
            return Some(self.arrive(target, 0.0, columns, rows));
        }

        motion.elapsed += dt;
        let travelled = motion.travelled();
        if travelled >= 1.0 - ARRIVAL_TOLERANCE {
            let overshoot = (travelled - 1.0).max(0.0) as f32;
            return Some(self.arrive(target, overshoot, columns, rows));
        }

        let (x, y) = motion.position(travelled, columns, rows);
        self.x = x;
        self.y = y;
        None
    }

    fn arrive(&mut self, target: (i64, i64), excess: f32, columns: u32, rows: u32) -> CellCoord {
        let cell = CellCoord::wrapped(target.0, target.1, columns, rows);
        self.x = cell.column() as f32;
        self.y = cell.row() as f32;
        self.excess = excess;
        self.motion = None;
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: u32 = 5;
    const ROWS: u32 = 4;

    fn ticks(body: &mut Body, count: usize, dt: Duration) -> Option<CellCoord> {
        let mut arrived = None;
        for _ in 0..count {
            if let Some(cell) = body.advance(dt, COLUMNS, ROWS) {
                arrived = Some(cell);
            }
        }
        arrived
    }

    #[test]
    fn resting_body_does_not_move() {
        let mut body = Body::new(CellCoord::new(1, 1), 5.0);
        assert_eq!(body.advance(Duration::from_secs(1), COLUMNS, ROWS), None);
        assert_eq!(body.position(), Position { x: 1.0, y: 1.0 });
        assert!(body.is_resting());
    }

    #[test]
    fn single_move_lands_exactly_on_target() {
        let mut body = Body::new(CellCoord::new(1, 1), 5.0);
        assert!(body.set_direction(Some(Action::Up), COLUMNS, ROWS));
        assert!(!body.is_resting());
        assert_eq!(
            body.target_cell(COLUMNS, ROWS),
            Some(CellCoord::new(1, 2))
        );

        assert_eq!(ticks(&mut body, 1, Duration::from_millis(100)), None);
        assert!((body.position().y - 1.5).abs() < 1e-5);

        let arrived = ticks(&mut body, 1, Duration::from_millis(100));
        assert_eq!(arrived, Some(CellCoord::new(1, 2)));
        assert_eq!(body.position(), Position { x: 1.0, y: 2.0 });
        assert!(body.is_resting());
    }

    #[test]
    fn direction_changes_are_refused_while_moving() {
        let mut body = Body::new(CellCoord::new(1, 1), 5.0);
        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));
        assert!(!body.set_direction(Some(Action::Up), COLUMNS, ROWS));
        assert_eq!(body.heading(), Some(Action::Right));
    }

    #[test]
    fn overshoot_is_carried_into_next_move() {
        let mut body = Body::new(CellCoord::new(0, 0), 5.0);
        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));

        let arrived = ticks(&mut body, 1, Duration::from_millis(300));
        assert_eq!(arrived, Some(CellCoord::new(1, 0)));
        assert_eq!(body.position().x, 1.0);
        assert!((body.excess().0 - 0.5).abs() < 1e-5);

        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));
        assert_eq!(ticks(&mut body, 1, Duration::from_millis(100)), Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn turning_discards_carried_overshoot() {
        let mut body = Body::new(CellCoord::new(0, 0), 5.0);
        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));
        let _ = ticks(&mut body, 1, Duration::from_millis(300));

        assert!(body.set_direction(Some(Action::Up), COLUMNS, ROWS));
        assert_eq!(body.excess(), (0.0, 0.0));
        assert_eq!(ticks(&mut body, 1, Duration::from_millis(100)), None);
    }

    #[test]
    fn right_edge_wraps_to_first_column() {
        let mut body = Body::new(CellCoord::new(COLUMNS - 1, 2), 5.0);
        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));

        let arrived = ticks(&mut body, 4, Duration::from_millis(50));
        assert_eq!(arrived, Some(CellCoord::new(0, 2)));
        assert_eq!(body.position(), Position { x: 0.0, y: 2.0 });
    }

    #[test]
    fn left_edge_wraps_to_last_column() {
        let mut body = Body::new(CellCoord::new(0, 2), 5.0);
        assert!(body.set_direction(Some(Action::Left), COLUMNS, ROWS));

        let arrived = ticks(&mut body, 4, Duration::from_millis(50));
        assert_eq!(arrived, Some(CellCoord::new(COLUMNS - 1, 2)));
        assert_eq!(body.position().x, (COLUMNS - 1) as f32);
    }

    #[test]
    fn vertical_edges_wrap() {
        let mut body = Body::new(CellCoord::new(1, ROWS - 1), 5.0);
        assert!(body.set_direction(Some(Action::Up), COLUMNS, ROWS));
        assert_eq!(
            ticks(&mut body, 2, Duration::from_millis(100)),
            Some(CellCoord::new(1, 0))
        );

        assert!(body.set_direction(Some(Action::Down), COLUMNS, ROWS));
        assert_eq!(
            ticks(&mut body, 2, Duration::from_millis(100)),
            Some(CellCoord::new(1, ROWS - 1))
        );
    }

    #[test]
    fn crossing_the_edge_mid_move_counts_as_the_far_cell() {
        let mut body = Body::new(CellCoord::new(COLUMNS - 1, 0), 5.0);
        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));
        let _ = ticks(&mut body, 3, Duration::from_millis(40));

        assert!(body.position().x < 0.0);
        assert_eq!(body.cell(COLUMNS, ROWS), CellCoord::new(0, 0));
    }

    #[test]
    fn stopping_arrives_in_place() {
        let mut body = Body::new(CellCoord::new(2, 2), 5.0);
        assert!(body.set_direction(None, COLUMNS, ROWS));
        assert_eq!(
            body.advance(Duration::from_millis(1), COLUMNS, ROWS),
            Some(CellCoord::new(2, 2))
        );
        assert!(body.is_resting());
    }

    #[test]
    fn disabled_animation_snaps_to_target() {
        let mut body = Body::new(CellCoord::new(2, 2), 5.0).with_animation(false);
        assert!(body.set_direction(Some(Action::Left), COLUMNS, ROWS));
        assert_eq!(
            body.advance(Duration::from_millis(1), COLUMNS, ROWS),
            Some(CellCoord::new(1, 2))
        );
    }

    #[test]
    fn speed_changes_apply_to_the_next_move() {
        let mut body = Body::new(CellCoord::new(0, 0), 5.0);
        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));
        body.set_speed(2.5);
        assert_eq!(
            ticks(&mut body, 2, Duration::from_millis(100)),
            Some(CellCoord::new(1, 0))
        );

        assert!(body.set_direction(Some(Action::Right), COLUMNS, ROWS));
        assert_eq!(ticks(&mut body, 2, Duration::from_millis(100)), None);
        assert_eq!(
            ticks(&mut body, 2, Duration::from_millis(100)),
            Some(CellCoord::new(2, 0))
        );
    }

    #[test]
    fn fine_ticks_on_wide_grids_arrive_on_schedule() {
        for (columns, spawn, count) in [(19, 17, 200), (19, 17, 1000), (1000, 900, 1000)] {
            let mut body = Body::new(CellCoord::new(spawn, 0), 5.0);
            assert!(body.set_direction(Some(Action::Right), columns, 1));

            let dt = Duration::from_millis(200) / count;
            for tick in 1..count {
                assert_eq!(body.advance(dt, columns, 1), None, "tick {tick} of {count}");
            }
            assert_eq!(
                body.advance(dt, columns, 1),
                Some(CellCoord::new(spawn + 1, 0))
            );
            assert!(body.is_resting());
            assert_eq!(body.position().x, (spawn + 1) as f32);
            assert_eq!(body.excess(), (0.0, 0.0));
        }
    }

    #[test]
    fn mid_move_position_tracks_distance_from_origin() {
        let mut body = Body::new(CellCoord::new(900, 0), 5.0);
        assert!(body.set_direction(Some(Action::Right), 1000, 1));
        for _ in 0..500 {
            let _ = body.advance(Duration::from_micros(200), 1000, 1);
        }
        assert!((body.position().x - 900.5).abs() < 1e-3);
        assert!(!body.is_resting());
    }
}
