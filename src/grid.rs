//! Playfield: fixed-size grid of numbered tiles. Row 0 is the floor.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Value carried by every freshly spawned tile.
pub const SPAWN_VALUE: u32 = 2;

/// A numbered tile. The value is always a power of two >= 2.
///
/// Tiles are deliberately not `Copy`: moving one between cells transfers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    value: u32,
    pub row: i32,
    pub col: i32,
}

impl Tile {
    /// New tile carrying [`SPAWN_VALUE`].
    pub fn new(row: i32, col: i32) -> Self {
        Self {
            value: SPAWN_VALUE,
            row,
            col,
        }
    }

    /// Tile with an explicit value; `None` unless the value is a power of two >= 2.
    pub fn with_value(value: u32, row: i32, col: i32) -> Option<Self> {
        (value >= 2 && value.is_power_of_two()).then_some(Self { value, row, col })
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Absorb an equal tile: the value doubles.
    pub(crate) fn double(&mut self) {
        self.value = self.value.saturating_mul(2);
    }
}

/// Single cell: either empty or holding one tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Tile),
}

impl Cell {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(_))
    }

    #[inline]
    pub fn tile(&self) -> Option<&Tile> {
        match self {
            Self::Occupied(t) => Some(t),
            Self::Empty => None,
        }
    }

    /// Remove the tile, leaving the cell empty.
    #[inline]
    pub fn take(&mut self) -> Option<Tile> {
        match std::mem::take(self) {
            Self::Occupied(t) => Some(t),
            Self::Empty => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("board text has no rows")]
    Empty,
    #[error("row {line} has {found} cells, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid tile `{token}` on line {line}: expected `.` or a power of two >= 2")]
    InvalidTile { line: usize, token: String },
}

/// The game grid. `rows[0]` is the floor, `rows[height - 1]` the top visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// True if (row, col) lies in `[0, height) x [0, width)`.
    #[inline]
    pub fn is_inside(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// True if the cell holds a tile. Out-of-range cells are never occupied.
    #[inline]
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some()
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    pub fn get(&self, row: i32, col: i32) -> Option<&Tile> {
        if !self.is_inside(row, col) {
            return None;
        }
        self.cell(row as usize, col as usize).and_then(Cell::tile)
    }

    pub(crate) fn get_mut(&mut self, row: i32, col: i32) -> Option<&mut Tile> {
        if !self.is_inside(row, col) {
            return None;
        }
        match self.cell_mut(row as usize, col as usize)? {
            Cell::Occupied(t) => Some(t),
            Cell::Empty => None,
        }
    }

    /// Remove and return the tile at (row, col).
    pub fn take(&mut self, row: i32, col: i32) -> Option<Tile> {
        if !self.is_inside(row, col) {
            return None;
        }
        self.cell_mut(row as usize, col as usize)?.take()
    }

    /// Store a tile at its own (row, col). A tile outside the grid is handed back.
    pub fn put(&mut self, tile: Tile) -> Result<(), Tile> {
        if !self.is_inside(tile.row, tile.col) {
            return Err(tile);
        }
        let (row, col) = (tile.row as usize, tile.col as usize);
        match self.cell_mut(row, col) {
            Some(cell) => {
                *cell = Cell::Occupied(tile);
                Ok(())
            }
            None => Err(tile),
        }
    }

    /// Relocate the tile at `from` to `to`, updating its stored position.
    /// Returns false if `from` is empty or `to` lies outside the grid.
    pub fn move_tile(&mut self, from: (i32, i32), to: (i32, i32)) -> bool {
        if !self.is_inside(to.0, to.1) {
            return false;
        }
        let Some(mut tile) = self.take(from.0, from.1) else {
            return false;
        };
        tile.row = to.0;
        tile.col = to.1;
        self.put(tile).is_ok()
    }

    /// Transfer a locked piece's tiles into the grid.
    ///
    /// Tiles inside the grid are stored. A tile at or above the top edge is
    /// discarded and marks the game as lost; any other outside tile is
    /// discarded without ending the game.
    pub fn place<I>(&mut self, tiles: I) -> bool
    where
        I: IntoIterator<Item = Tile>,
    {
        let height = self.height as i32;
        let mut game_over = false;
        for tile in tiles {
            if let Err(lost) = self.put(tile) {
                game_over |= lost.row >= height;
            }
        }
        game_over
    }

    /// Empty every cell (restart).
    pub fn clear_all(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    /// Row `row` is fully occupied.
    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|r| r.iter().all(Cell::is_occupied))
    }

    /// Drop row `row` entirely; rows above move down by one and a fresh empty
    /// row appears at the top. Returns the removed tiles.
    pub(crate) fn remove_row(&mut self, row: usize) -> Vec<Tile> {
        let Some(removed) = self.rows.remove(row) else {
            return Vec::new();
        };
        self.rows.push_back(vec![Cell::Empty; self.width]);
        for (y, cells) in self.rows.iter_mut().enumerate().skip(row) {
            for cell in cells.iter_mut() {
                if let Cell::Occupied(t) = cell {
                    t.row = y as i32;
                }
            }
        }
        removed
            .into_iter()
            .filter_map(|mut c| c.take())
            .collect()
    }

    /// All tiles, bottom row first, left to right.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.rows.iter().flat_map(|r| r.iter().filter_map(Cell::tile))
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles().count()
    }

    /// Sum of all tile values; merges keep it unchanged.
    pub fn value_sum(&self) -> u64 {
        self.tiles().map(|t| u64::from(t.value())).sum()
    }

    pub fn max_value(&self) -> Option<u32> {
        self.tiles().map(Tile::value).max()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles().next().is_none()
    }
}

/// Rows are printed top to bottom, `.` for an empty cell.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell_width = self
            .max_value()
            .map_or(1, |v| v.to_string().len())
            .max(1);
        for (i, row) in self.rows.iter().rev().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line = row
                .iter()
                .map(|c| match c.tile() {
                    Some(t) => format!("{:>cell_width$}", t.value()),
                    None => format!("{:>cell_width$}", "."),
                })
                .collect::<Vec<_>>()
                .join(" ");
            f.write_str(&line)?;
        }
        Ok(())
    }
}

/// Parses the [`Display`](fmt::Display) format. The first non-blank line is the top row.
impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<(usize, Vec<&str>)> = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.split_whitespace().collect::<Vec<_>>()))
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();
        let Some((_, first)) = lines.first() else {
            return Err(GridParseError::Empty);
        };
        let width = first.len();
        let height = lines.len();
        let mut grid = Self::new(width, height);

        for (idx, (line, tokens)) in lines.iter().enumerate() {
            if tokens.len() != width {
                return Err(GridParseError::Ragged {
                    line: *line,
                    expected: width,
                    found: tokens.len(),
                });
            }
            let row = (height - 1 - idx) as i32;
            for (col, token) in tokens.iter().enumerate() {
                if *token == "." {
                    continue;
                }
                let invalid = || GridParseError::InvalidTile {
                    line: *line,
                    token: (*token).to_string(),
                };
                let tile = token
                    .parse::<u32>()
                    .ok()
                    .and_then(|v| Tile::with_value(v, row, col as i32))
                    .ok_or_else(invalid)?;
                grid.put(tile).map_err(|_| invalid())?;
            }
        }
        Ok(grid)
    }
}
