//! Full-row detection and downward compaction.

use crate::grid::Grid;

/// What the row clearer did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub rows: u32,
    /// Sum of the tile values on the cleared rows.
    pub points: u32,
}

impl ClearOutcome {
    #[inline]
    pub fn cleared(&self) -> bool {
        self.rows > 0
    }
}

/// One flag per row, bottom first: true when every column is occupied.
pub fn scan_full_rows(grid: &Grid) -> Vec<bool> {
    (0..grid.height()).map(|row| grid.is_row_full(row)).collect()
}

/// Remove the lowest full row in `full`, shifting everything above it down one.
///
/// Returns the value sum of the removed row, or `None` when no row is flagged.
pub fn collapse(grid: &mut Grid, full: &[bool]) -> Option<u32> {
    let row = full.iter().position(|&f| f)?;
    let points = grid
        .remove_row(row)
        .iter()
        .fold(0u32, |acc, t| acc.saturating_add(t.value()));
    Some(points)
}

/// Collapse full rows, rescanning after each one, until none is full.
pub fn clear_until_stable(grid: &mut Grid) -> ClearOutcome {
    let mut outcome = ClearOutcome::default();
    while let Some(points) = collapse(grid, &scan_full_rows(grid)) {
        outcome.rows += 1;
        outcome.points = outcome.points.saturating_add(points);
    }
    outcome
}
