//! Static wall layout and mutable food layer of the maze.

use maze_chase_core::{CellCoord, FoodKind};

use crate::level::{Level, Tile};

/// Food item laid out on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Food {
    /// Kind of food.
    pub kind: FoodKind,
    /// Points awarded when the food is eaten.
    pub value: u32,
}

/// Toroidal grid holding walls, food and spawn points.
///
/// Every lookup normalises its coordinates modulo the grid size, so no cell
/// coordinate can index out of bounds. The wall bitmap never changes after
/// construction and the food count only ever decreases.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    walls: Vec<bool>,
    food: Vec<Option<Food>>,
    food_count: u32,
    player_spawn: CellCoord,
    ghost_spawns: Vec<CellCoord>,
}

impl Grid {
    /// Builds the grid described by `level`, pricing food with the given values.
    #[must_use]
    pub fn from_level(level: &Level, dot_value: u32, pellet_value: u32) -> Self {
        let cell_count = level.columns() as usize * level.rows() as usize;
        let mut walls = vec![false; cell_count];
        let mut food = vec![None; cell_count];
        let mut food_count = 0;
        let mut player_spawn = CellCoord::new(0, 0);
        let mut ghost_spawns = Vec::new();

        for (index, (cell, tile)) in level.cells().enumerate() {
            match tile {
                Tile::Floor => {}
                Tile::Wall => walls[index] = true,
                Tile::Food(kind) => {
                    let value = match kind {
                        FoodKind::Dot => dot_value,
                        FoodKind::Pellet => pellet_value,
                    };
                    food[index] = Some(Food { kind, value });
                    food_count += 1;
                }
                Tile::PlayerSpawn => player_spawn = cell,
                Tile::GhostSpawn => ghost_spawns.push(cell),
            }
        }

        Self {
            columns: level.columns(),
            rows: level.rows(),
            walls,
            food,
            food_count,
            player_spawn,
            ghost_spawns,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Provides the grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell holds a wall.
    #[must_use]
    pub fn has_wall(&self, cell: CellCoord) -> bool {
        self.walls[self.index(cell)]
    }

    /// Reports whether the signed coordinates, wrapped onto the grid, hold a wall.
    #[must_use]
    pub fn has_wall_at(&self, column: i64, row: i64) -> bool {
        self.has_wall(CellCoord::wrapped(column, row, self.columns, self.rows))
    }

    /// Reports whether the cell holds food.
    #[must_use]
    pub fn has_food(&self, cell: CellCoord) -> bool {
        self.food[self.index(cell)].is_some()
    }

    /// Food laid out on the cell, if any.
    #[must_use]
    pub fn food_at(&self, cell: CellCoord) -> Option<Food> {
        self.food[self.index(cell)]
    }

    /// Removes and returns the food on the cell, decrementing the food count.
    pub fn eat_food(&mut self, cell: CellCoord) -> Option<Food> {
        let index = self.index(cell);
        let eaten = self.food[index].take()?;
        self.food_count -= 1;
        Some(eaten)
    }

    /// Number of food items left in the maze.
    #[must_use]
    pub const fn food_count(&self) -> u32 {
        self.food_count
    }

    /// Cell where the player appears.
    #[must_use]
    pub const fn player_spawn(&self) -> CellCoord {
        self.player_spawn
    }

    /// Cells where ghosts may appear, in row-major order from the bottom row.
    #[must_use]
    pub fn ghost_spawns(&self) -> &[CellCoord] {
        &self.ghost_spawns
    }

    /// Normalises a cell onto the grid.
    #[must_use]
    pub fn wrap(&self, cell: CellCoord) -> CellCoord {
        CellCoord::new(cell.column() % self.columns, cell.row() % self.rows)
    }

    fn index(&self, cell: CellCoord) -> usize {
        let cell = self.wrap(cell);
        cell.row() as usize * self.columns as usize + cell.column() as usize
    }
}
