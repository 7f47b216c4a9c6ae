//! Vertical 2048-style merging of equal neighbours.

use crate::grid::Grid;

/// What one or more merge passes did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of tile pairs merged.
    pub merges: u32,
    /// Sum of the values produced by merging (each merge scores its new value).
    pub points: u32,
}

impl MergeOutcome {
    #[inline]
    pub fn merged(&self) -> bool {
        self.merges > 0
    }

    fn absorb(&mut self, other: Self) {
        self.merges += other.merges;
        self.points = self.points.saturating_add(other.points);
    }
}

/// One pass over every vertically adjacent pair, column by column, bottom to top.
///
/// When a cell and the cell directly above it hold equal values the upper tile
/// is destroyed and the lower one doubles. A gap never carries a merge across.
pub fn merge_pass(grid: &mut Grid) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    let height = grid.height() as i32;
    for col in 0..grid.width() as i32 {
        for row in 0..height - 1 {
            let (Some(lower), Some(upper)) = (grid.get(row, col), grid.get(row + 1, col)) else {
                continue;
            };
            if lower.value() != upper.value() {
                continue;
            }
            grid.take(row + 1, col);
            if let Some(lower) = grid.get_mut(row, col) {
                lower.double();
                outcome.merges += 1;
                outcome.points = outcome.points.saturating_add(lower.value());
            }
        }
    }
    outcome
}

/// Repeat [`merge_pass`] until a pass merges nothing.
pub fn merge_until_stable(grid: &mut Grid) -> MergeOutcome {
    let mut total = MergeOutcome::default();
    loop {
        let pass = merge_pass(grid);
        if !pass.merged() {
            return total;
        }
        total.absorb(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Grid {
        text.parse().unwrap()
    }

    #[test]
    fn no_equal_pair_is_a_no_op() {
        let mut g = grid("4 .\n2 8\n4 2");
        let before = g.clone();
        let outcome = merge_pass(&mut g);
        assert!(!outcome.merged());
        assert_eq!(g, before);
    }

    #[test]
    fn upper_tile_is_absorbed_into_lower() {
        let mut g = grid("2\n2");
        let outcome = merge_pass(&mut g);
        assert_eq!(outcome, MergeOutcome { merges: 1, points: 4 });
        assert_eq!(g.to_string(), ".\n4");
        let tile = g.get(0, 0).unwrap();
        assert_eq!((tile.row, tile.col), (0, 0));
    }

    #[test]
    fn one_pass_merges_each_pair_once() {
        // 2,2,4 bottom-up: the pass merges the bottom pair and leaves a gap
        // under the 4, so the 4s only meet after gravity closes it.
        let mut g = grid("4\n2\n2");
        let outcome = merge_pass(&mut g);
        assert_eq!(outcome.merges, 1);
        assert_eq!(g.to_string(), "4\n.\n4");
        assert!(!merge_pass(&mut g).merged());
    }

    #[test]
    fn stacked_pairs_cascade_within_a_pass() {
        // 2,2,2,2 bottom-up: (0,1) merge -> 4 at row 0, row 1 empty;
        // (2,3) merge -> 4 at row 2.
        let mut g = grid("2\n2\n2\n2");
        let outcome = merge_pass(&mut g);
        assert_eq!(outcome.merges, 2);
        assert_eq!(g.to_string(), ".\n4\n.\n4");
    }

    #[test]
    fn until_stable_follows_new_adjacencies() {
        let mut g = grid("8\n4\n4");
        let outcome = merge_until_stable(&mut g);
        assert_eq!(outcome.merges, 1);
        assert_eq!(g.to_string(), "8\n.\n8");

        // Column 0 is 4,2,2 bottom-up: the 2s make a 4 that only meets the
        // floor 4 on the second pass.
        let mut g = grid("2 .\n2 4\n4 4");
        let outcome = merge_until_stable(&mut g);
        assert_eq!(outcome.merges, 3);
        assert_eq!(outcome.points, 4 + 8 + 8);
        assert_eq!(g.to_string(), ". .\n. .\n8 8");
    }

    #[test]
    fn merging_conserves_the_value_sum() {
        let mut g = grid("2 4 8\n2 4 8\n2 2 16");
        let before = g.value_sum();
        merge_pass(&mut g);
        assert_eq!(g.value_sum(), before);
    }
}
