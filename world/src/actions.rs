//! Precomputed action legality used by the action validator.

use maze_chase_core::{Action, ActionSet, AgentRole, CellCoord};

use crate::{body::Body, grid::Grid};

/// Dense per-cell table of actions whose destination is not a wall.
#[derive(Clone, Debug)]
pub(crate) struct ActionTable {
    columns: u32,
    rows: u32,
    sets: Vec<ActionSet>,
}

impl ActionTable {
    /// Builds the table from the finalised wall layout.
    pub(crate) fn build(grid: &Grid) -> Self {
        let (columns, rows) = grid.dimensions();
        let mut sets = Vec::with_capacity(columns as usize * rows as usize);

        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if grid.has_wall(cell) {
                    sets.push(ActionSet::empty());
                    continue;
                }

                sets.push(
                    Action::ALL
                        .into_iter()
                        .filter(|action| !grid.has_wall(cell.neighbor(*action, columns, rows)))
                        .collect(),
                );
            }
        }

        Self {
            columns,
            rows,
            sets,
        }
    }

    /// Actions leading out of the cell into open floor.
    pub(crate) fn at(&self, cell: CellCoord) -> ActionSet {
        let column = (cell.column() % self.columns) as usize;
        let row = (cell.row() % self.rows) as usize;
        self.sets[row * self.columns as usize + column]
    }

    /// Actions the validator accepts for a body this tick.
    ///
    /// Moving bodies accept nothing. Ghosts with a heading may not reverse
    /// unless reversing is their only way out.
    pub(crate) fn valid_for(&self, role: AgentRole, body: &Body) -> ActionSet {
        if !body.is_resting() {
            return ActionSet::empty();
        }

        let mut valid = self.at(body.cell(self.columns, self.rows));
        if role == AgentRole::Ghost {
            if let Some(heading) = body.heading() {
                if valid.len() > 1 {
                    valid.remove(heading.reverse());
                }
            }
        }
        valid
    }
}
