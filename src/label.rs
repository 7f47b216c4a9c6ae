//! Connected-component labeling of occupied cells and free-tile detection.
//!
//! Labels are computed with the classic two-pass equivalence-class algorithm:
//! a first scan hands out provisional labels and records which ones touch, the
//! equivalence classes are renumbered to `1..=count`, and a second scan writes
//! the final label of every occupied cell.

use crate::grid::Grid;

/// Canonical label that the free-tile detector always treats as anchored.
pub const ANCHOR_LABEL: u32 = 1;

/// Per-cell component labels; 0 marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: usize,
    height: usize,
    labels: Vec<u32>,
    count: u32,
}

impl LabelMap {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Label at (row, col), 0 for empty or out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        if row >= self.height || col >= self.width {
            return 0;
        }
        self.labels[row * self.width + col]
    }

    /// Number of distinct components.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Labels of one row, left to right.
    pub fn row(&self, row: usize) -> &[u32] {
        let start = (row * self.width).min(self.labels.len());
        let end = (start + self.width).min(self.labels.len());
        &self.labels[start..end]
    }
}

/// Union `a` and `b`: every label whose class minimum is either one's minimum
/// now points at the smaller of the two.
fn unify(min_equivalent: &mut [u32], a: u32, b: u32) {
    let ma = min_equivalent[(a - 1) as usize];
    let mb = min_equivalent[(b - 1) as usize];
    let target = ma.min(mb);
    for m in min_equivalent.iter_mut() {
        if *m == ma || *m == mb {
            *m = target;
        }
    }
}

/// Renumber class minimums to consecutive values from 1, preserving order.
fn compact(min_equivalent: &mut [u32]) -> u32 {
    let mut distinct: Vec<u32> = min_equivalent.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    for m in min_equivalent.iter_mut() {
        // distinct holds every value of min_equivalent.
        if let Ok(pos) = distinct.binary_search(m) {
            *m = pos as u32 + 1;
        }
    }
    distinct.len() as u32
}

/// Label 4-connected groups of occupied cells.
///
/// Scans rows from the floor up and columns left to right; the already visited
/// neighbours of a cell are the one below it and the one to its left.
pub fn label_components(grid: &Grid) -> LabelMap {
    let (width, height) = (grid.width(), grid.height());
    let mut labels = vec![0u32; width * height];
    let mut min_equivalent: Vec<u32> = Vec::new();
    let mut next_label = 1u32;

    for row in 0..height {
        for col in 0..width {
            if !grid.is_occupied(row as i32, col as i32) {
                continue;
            }
            let below = (row > 0)
                .then(|| labels[(row - 1) * width + col])
                .filter(|&l| l != 0);
            let left = (col > 0)
                .then(|| labels[row * width + col - 1])
                .filter(|&l| l != 0);

            let label = match (below, left) {
                (None, None) => {
                    let fresh = next_label;
                    next_label += 1;
                    min_equivalent.push(fresh);
                    fresh
                }
                (Some(l), None) | (None, Some(l)) => l,
                (Some(a), Some(b)) => {
                    if a != b {
                        unify(&mut min_equivalent, a, b);
                    }
                    a.min(b)
                }
            };
            labels[row * width + col] = label;
        }
    }

    let count = compact(&mut min_equivalent);
    for label in labels.iter_mut().filter(|l| **l != 0) {
        *label = min_equivalent[(*label - 1) as usize];
    }

    LabelMap {
        width,
        height,
        labels,
        count,
    }
}

/// Cells whose tiles are unsupported and should fall one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTiles {
    width: usize,
    mask: Vec<bool>,
    count: usize,
}

impl FreeTiles {
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_free(&self, row: usize, col: usize) -> bool {
        col < self.width && self.mask.get(row * self.width + col).copied().unwrap_or(false)
    }
}

/// Flag every occupied cell whose component is not anchored.
///
/// A component is anchored when its label is [`ANCHOR_LABEL`] or when the
/// label appears on the floor row. The label-1 rule holds even for a group
/// that never reaches the floor; see DESIGN.md.
pub fn find_free_tiles(labels: &LabelMap) -> FreeTiles {
    let width = labels.width();
    let floor: Vec<u32> = labels.row(0).iter().copied().filter(|&l| l != 0).collect();
    let mut mask = vec![false; labels.labels.len()];
    let mut count = 0;

    for row in 0..labels.height() {
        for col in 0..width {
            let label = labels.get(row, col);
            if label == 0 || label == ANCHOR_LABEL || floor.contains(&label) {
                continue;
            }
            mask[row * width + col] = true;
            count += 1;
        }
    }

    FreeTiles { width, mask, count }
}

/// Move every free tile down one row, lowest rows first.
///
/// Free tiles never sit on the floor row, and the cell under a free tile is
/// either empty or part of the same free group that has already moved.
pub fn drop_free_tiles(grid: &mut Grid, free: &FreeTiles) -> usize {
    let mut moved = 0;
    for row in 1..grid.height() {
        for col in 0..grid.width() {
            if !free.is_free(row, col) {
                continue;
            }
            let (r, c) = (row as i32, col as i32);
            if grid.move_tile((r, c), (r - 1, c)) {
                moved += 1;
            }
        }
    }
    moved
}
