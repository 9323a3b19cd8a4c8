//! Plain-text level parsing.
//!
//! Levels are grids of characters, one row per line. The last line of the
//! text becomes row zero so that rows grow upward.

use std::{
    fs,
    path::{Path, PathBuf},
};

use maze_chase_core::{CellCoord, FoodKind};
use thiserror::Error;

/// Content of a single level cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Open floor without any object.
    Floor,
    /// Impassable wall.
    Wall,
    /// Open floor holding a food item.
    Food(FoodKind),
    /// Open floor where the player appears.
    PlayerSpawn,
    /// Open floor where ghosts appear.
    GhostSpawn,
}

impl Tile {
    fn from_char(symbol: char) -> Option<Self> {
        match symbol {
            'X' => Some(Self::Wall),
            '.' => Some(Self::Food(FoodKind::Dot)),
            'O' => Some(Self::Food(FoodKind::Pellet)),
            'P' => Some(Self::PlayerSpawn),
            'G' => Some(Self::GhostSpawn),
            ' ' => Some(Self::Floor),
            _ => None,
        }
    }
}

/// Errors that abort level construction.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level text contained no cells.
    #[error("level contains no cells")]
    Empty,
    /// The level did not declare a player spawn cell.
    #[error("level does not declare a player spawn `P`")]
    MissingPlayerSpawn,
    /// The level declared more than one player spawn cell.
    #[error("level declares a second player spawn at line {line}, column {column}")]
    DuplicatePlayerSpawn {
        /// One-based line of the duplicate spawn in the source text.
        line: usize,
        /// One-based character column of the duplicate spawn.
        column: usize,
    },
    /// The level contained a character without a tile meaning.
    #[error("unknown tile `{symbol}` at line {line}, column {column}")]
    UnknownTile {
        /// Offending character.
        symbol: char,
        /// One-based line in the source text.
        line: usize,
        /// One-based character column in the source text.
        column: usize,
    },
    /// The level has more columns or rows than a grid coordinate can address.
    #[error("level of {columns}x{rows} cells exceeds the addressable grid size")]
    TooLarge {
        /// Number of columns in the source text.
        columns: usize,
        /// Number of lines in the source text.
        rows: usize,
    },
    /// The level file could not be read.
    #[error("failed to read level file {path}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Parsed level layout ready to seed a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Level {
    /// Reads and parses the level stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses level text.
    ///
    /// The grid is as wide as the longest line; shorter lines are padded
    /// with floor. Trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            let _ = lines.pop();
        }

        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let (columns, rows) = grid_extent(width, lines.len())?;
        let mut tiles = vec![Tile::Floor; width * lines.len()];
        let mut player_spawn_seen = false;

        for (line_index, line) in lines.iter().enumerate() {
            let row = lines.len() - 1 - line_index;
            for (column, symbol) in line.chars().enumerate() {
                let tile = Tile::from_char(symbol).ok_or(LevelError::UnknownTile {
                    symbol,
                    line: line_index + 1,
                    column: column + 1,
                })?;

                if tile == Tile::PlayerSpawn {
                    if player_spawn_seen {
                        return Err(LevelError::DuplicatePlayerSpawn {
                            line: line_index + 1,
                            column: column + 1,
                        });
                    }
                    player_spawn_seen = true;
                }

                tiles[row * width + column] = tile;
            }
        }

        if !player_spawn_seen {
            return Err(LevelError::MissingPlayerSpawn);
        }

        Ok(Self {
            columns,
            rows,
            tiles,
        })
    }

    /// Number of columns in the level.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the level.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile stored at the provided cell, wrapping around the edges.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Tile {
        let column = (cell.column() % self.columns) as usize;
        let row = (cell.row() % self.rows) as usize;
        self.tiles[row * self.columns as usize + column]
    }

    /// Iterates every cell with its tile in row-major order from the bottom row.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        let columns = self.columns;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }
}

fn grid_extent(columns: usize, rows: usize) -> Result<(u32, u32), LevelError> {
    match (u32::try_from(columns), u32::try_from(rows)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(LevelError::TooLarge { columns, rows }),
    }
}
