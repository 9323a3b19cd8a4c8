//! Read-only connectivity graph derived from the wall layout.

use maze_chase_core::{Action, CellCoord};

use crate::{actions::ActionTable, grid::Grid};

/// Directed edge leaving a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Cell reached by the edge.
    pub to: CellCoord,
    /// Cost of traversing the edge.
    pub weight: u32,
    /// Action that traverses the edge.
    pub action: Action,
}

/// Dense adjacency over every open cell of the grid.
///
/// Built once after the wall layout is final and never mutated afterwards.
/// Edges are listed in canonical action order and wrap across grid edges.
#[derive(Clone, Debug)]
pub struct ConnectivityGraph {
    columns: u32,
    rows: u32,
    adjacency: Vec<Option<Vec<Edge>>>,
}

impl ConnectivityGraph {
    pub(crate) fn build(grid: &Grid, actions: &ActionTable) -> Self {
        let (columns, rows) = grid.dimensions();
        let mut adjacency = Vec::with_capacity(columns as usize * rows as usize);

        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if grid.has_wall(cell) {
                    adjacency.push(None);
                    continue;
                }

                let edges = actions
                    .at(cell)
                    .iter()
                    .map(|action| Edge {
                        to: cell.neighbor(action, columns, rows),
                        weight: 1,
                        action,
                    })
                    .collect();
                adjacency.push(Some(edges));
            }
        }

        Self {
            columns,
            rows,
            adjacency,
        }
    }

    /// Edges leaving the cell; empty for walls.
    #[must_use]
    pub fn connections(&self, cell: CellCoord) -> &[Edge] {
        self.adjacency[self.index(cell)].as_deref().unwrap_or(&[])
    }

    /// Edges leaving the cell, minus the one undoing the action used to reach it.
    ///
    /// Dead ends keep their single way back out.
    #[must_use]
    pub fn connections_without_reversal(&self, cell: CellCoord, arrived_by: Action) -> Vec<Edge> {
        let edges = self.connections(cell);
        if edges.len() <= 1 {
            return edges.to_vec();
        }

        let reverse = arrived_by.reverse();
        edges
            .iter()
            .copied()
            .filter(|edge| edge.action != reverse)
            .collect()
    }

    /// Reports whether the cell is a node of the graph.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.adjacency[self.index(cell)].is_some()
    }

    /// Iterates every open cell, column by column.
    pub fn nodes(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.columns).flat_map(move |column| {
            (0..self.rows)
                .map(move |row| CellCoord::new(column, row))
                .filter(move |cell| self.contains(*cell))
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.iter().filter(|edges| edges.is_some()).count()
    }

    /// Reports whether the maze has no open cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().flatten().map(Vec::len).sum()
    }

    fn index(&self, cell: CellCoord) -> usize {
        let column = (cell.column() % self.columns) as usize;
        let row = (cell.row() % self.rows) as usize;
        row * self.columns as usize + column
    }
}

/// Graph view that counts the work performed by a search.
#[derive(Debug)]
pub struct CountingGraph<'a> {
    graph: &'a ConnectivityGraph,
    visited: usize,
    expanded: usize,
}

impl<'a> CountingGraph<'a> {
    /// Wraps the graph with zeroed counters.
    #[must_use]
    pub fn new(graph: &'a ConnectivityGraph) -> Self {
        Self {
            graph,
            visited: 0,
            expanded: 0,
        }
    }

    /// Edges leaving the cell, counting the visit and every edge handed out.
    pub fn connections(&mut self, cell: CellCoord) -> &'a [Edge] {
        let edges = self.graph.connections(cell);
        self.visited += 1;
        self.expanded += edges.len();
        edges
    }

    /// Number of cells whose connections were requested.
    #[must_use]
    pub const fn visited(&self) -> usize {
        self.visited
    }

    /// Number of edges handed out.
    #[must_use]
    pub const fn expanded(&self) -> usize {
        self.expanded
    }

    /// Zeroes both counters.
    pub fn reset_counters(&mut self) {
        self.visited = 0;
        self.expanded = 0;
    }
}
