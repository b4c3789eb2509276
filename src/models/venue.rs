//! Venue (exam hall) model.
//!
//! A venue is a grid of `rows × columns` seats with a usable capacity that
//! may be lower than the grid size. Rows and columns are 1-based; row 1 is
//! labeled "A".
//!
//! # Joined rows
//! A joined group merges several rows into one wider bench. For filling, the
//! group is a single unit whose seats are the group's rows concatenated in
//! ascending row order, positioned at the group's lowest row.

use serde::{Deserialize, Serialize};

/// A physical exam venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Unique venue identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Maximum number of students seated (capped at grid size).
    pub capacity: usize,
    /// Number of rows.
    pub rows: usize,
    /// Seats per row.
    pub columns: usize,
    /// Groups of 1-based row numbers merged into wider benches.
    pub joined_rows: Vec<Vec<usize>>,
    /// Owning department. `None` = shared by all departments.
    pub department: Option<String>,
}

impl Venue {
    /// Creates a venue whose capacity equals its grid size.
    pub fn new(id: impl Into<String>, rows: usize, columns: usize) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity: rows * columns,
            rows,
            columns,
            joined_rows: Vec::new(),
            department: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Adds a joined-row group.
    pub fn with_joined_rows(mut self, rows: impl IntoIterator<Item = usize>) -> Self {
        self.joined_rows.push(rows.into_iter().collect());
        self
    }

    /// Restricts the venue to a department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Physical seats in the grid.
    #[inline]
    pub fn seat_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Seats that may actually be used.
    #[inline]
    pub fn effective_capacity(&self) -> usize {
        self.capacity.min(self.seat_count())
    }

    /// Whether the venue is usable by a department.
    pub fn serves(&self, department: &str) -> bool {
        self.department.as_deref().map_or(true, |d| d == department)
    }

    /// Joined group containing a row, if any.
    fn group_of(&self, row: usize) -> Option<&Vec<usize>> {
        self.joined_rows.iter().find(|g| g.contains(&row))
    }

    /// Fill units in fill order. Each unit lists its `(row, column)` seats
    /// in fill order.
    pub fn fill_units(&self) -> Vec<Vec<(usize, usize)>> {
        let mut units = Vec::new();
        for row in 1..=self.rows {
            match self.group_of(row) {
                Some(group) => {
                    let mut members: Vec<usize> = group
                        .iter()
                        .copied()
                        .filter(|r| (1..=self.rows).contains(r))
                        .collect();
                    members.sort_unstable();
                    members.dedup();
                    if members.first() != Some(&row) {
                        continue;
                    }
                    units.push(
                        members
                            .iter()
                            .flat_map(|r| (1..=self.columns).map(move |c| (*r, c)))
                            .collect(),
                    );
                }
                None => units.push((1..=self.columns).map(|c| (row, c)).collect()),
            }
        }
        units
    }

    /// Every seat in fill order, truncated to the effective capacity.
    pub fn fill_order(&self) -> Vec<(usize, usize)> {
        self.fill_units()
            .into_iter()
            .flatten()
            .take(self.effective_capacity())
            .collect()
    }
}

/// Letters for a 1-based row number: 1 → "A", 26 → "Z", 27 → "AA".
pub fn row_letters(row: usize) -> String {
    let mut n = row;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Human-readable seat label, e.g. row 2 column 3 → "B3".
pub fn seat_label(row: usize, column: usize) -> String {
    format!("{}{}", row_letters(row), column)
}
