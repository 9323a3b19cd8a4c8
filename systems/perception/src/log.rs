//! Recording of perception readings next to the action taken.

use std::io::{self, Write};

use maze_chase_core::{Action, Perceptions};

const ACTION_COLUMN: &str = "action";
const NO_ACTION: &str = "stop";

/// Table of perception readings, one row per decision.
///
/// The header is fixed by the first recorded row. Each row ends with the
/// heading the agent ended up with, or `stop` when it never moved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerceptionLog {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PerceptionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the readings and the resulting heading as a new row.
    pub fn record(&mut self, perceptions: &Perceptions, heading: Option<Action>) {
        if self.rows.is_empty() {
            self.header = perceptions.names().map(str::to_owned).collect();
            self.header.push(ACTION_COLUMN.to_owned());
        }

        let mut row: Vec<String> = perceptions
            .iter()
            .map(|(_, value)| value.to_string())
            .collect();
        row.push(heading.map_or(NO_ACTION, Action::name).to_owned());
        self.rows.push(row);
    }

    /// Column names, empty until the first row is recorded.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Recorded rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of recorded rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Reports whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the header and every row as comma separated lines.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }

        writeln!(writer, "{}", self.header.join(","))?;
        for row in &self.rows {
            writeln!(writer, "{}", row.join(","))?;
        }
        writer.flush()
    }
}
