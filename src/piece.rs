//! Falling tetromino: shape, position, rotation and collision against the grid.

use crate::grid::{Grid, Tile};
use rand::Rng;

/// Tetromino kinds (I, O, Z, J, L, T, S).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    O,
    Z,
    J,
    L,
    T,
    S,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::Z, Self::J, Self::L, Self::T, Self::S];

    /// Side of the square bounding box.
    pub fn box_size(self) -> i32 {
        match self {
            Self::I => 4,
            Self::O => 2,
            _ => 3,
        }
    }

    /// 4 occupied cells in the bounding box; each (col, row), row 0 is the top of the box.
    pub fn cells(self) -> &'static [(i32, i32); 4] {
        match self {
            Self::I => &[(1, 0), (1, 1), (1, 2), (1, 3)],
            Self::O => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::Z => &[(0, 0), (1, 0), (1, 1), (2, 1)],
            Self::J => &[(0, 0), (2, 0), (1, 0), (2, 1)],
            Self::L => &[(0, 0), (2, 0), (1, 0), (0, 1)],
            Self::T => &[(0, 0), (2, 0), (1, 0), (1, 1)],
            Self::S => &[(0, 1), (2, 0), (1, 0), (1, 1)],
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Translation requested by the player or by gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

/// Current piece: kind, box cells, bottom-left anchor and rotation (0..4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: TetrominoKind,
    /// Occupied box cells as (box_row, box_col); box row 0 is the top.
    cells: [(i32, i32); 4],
    /// Absolute row of the bottom edge of the box.
    pub row: i32,
    /// Absolute column of the left edge of the box.
    pub col: i32,
    pub rotation: u8,
}

impl Piece {
    /// Piece with its box's bottom-left corner at (row, col), unrotated.
    pub fn new(kind: TetrominoKind, row: i32, col: i32) -> Self {
        let mut cells = [(0, 0); 4];
        for (slot, &(c, r)) in cells.iter_mut().zip(kind.cells()) {
            *slot = (r, c);
        }
        Self {
            kind,
            cells,
            row,
            col,
            rotation: 0,
        }
    }

    /// Spawn just above the visible area at a random column where the box fits.
    pub fn spawn<R: Rng + ?Sized>(kind: TetrominoKind, grid: &Grid, rng: &mut R) -> Self {
        let max_col = (grid.width() as i32 - kind.box_size()).max(0);
        let col = rng.gen_range(0..=max_col);
        Self::new(kind, grid.height() as i32, col)
    }

    #[inline]
    fn box_size(&self) -> i32 {
        self.kind.box_size()
    }

    /// Absolute (row, col) of a box cell.
    #[inline]
    fn absolute(&self, (r, c): (i32, i32)) -> (i32, i32) {
        (self.row + self.box_size() - 1 - r, self.col + c)
    }

    /// Absolute (row, col) of the four occupied cells.
    pub fn positions(&self) -> [(i32, i32); 4] {
        self.cells.map(|cell| self.absolute(cell))
    }

    /// Fresh tiles at the piece's current cells, ready for [`Grid::place`].
    pub fn tiles(&self) -> [Tile; 4] {
        self.positions().map(|(row, col)| Tile::new(row, col))
    }

    /// Edge tile of each occupied box row (leftmost or rightmost).
    fn row_edges(&self, rightmost: bool) -> Vec<(i32, i32)> {
        let n = self.box_size();
        (0..n)
            .filter_map(|r| {
                let cols = self.cells.iter().filter(|(cr, _)| *cr == r).map(|&(_, c)| c);
                let edge = if rightmost { cols.max() } else { cols.min() };
                edge.map(|c| self.absolute((r, c)))
            })
            .collect()
    }

    /// Bottommost tile of each occupied box column.
    fn column_bottoms(&self) -> Vec<(i32, i32)> {
        let n = self.box_size();
        (0..n)
            .filter_map(|c| {
                self.cells
                    .iter()
                    .filter(|(_, cc)| *cc == c)
                    .map(|&(r, _)| r)
                    .max()
                    .map(|r| self.absolute((r, c)))
            })
            .collect()
    }

    /// True if the piece can translate one cell in `direction`.
    ///
    /// Sideways moves look only at the edge tile of each box row; rows still
    /// above the visible grid are not checked against settled tiles. Downward
    /// moves look at the bottom tile of each box column.
    pub fn can_move(&self, direction: Direction, grid: &Grid) -> bool {
        let height = grid.height() as i32;
        let width = grid.width() as i32;
        match direction {
            Direction::Left => self.row_edges(false).into_iter().all(|(row, col)| {
                if col == 0 {
                    return false;
                }
                row >= height || !grid.is_occupied(row, col - 1)
            }),
            Direction::Right => self.row_edges(true).into_iter().all(|(row, col)| {
                if col == width - 1 {
                    return false;
                }
                row >= height || !grid.is_occupied(row, col + 1)
            }),
            Direction::Down => self
                .column_bottoms()
                .into_iter()
                .all(|(row, col)| row > 0 && !grid.is_occupied(row - 1, col)),
        }
    }

    /// Translate by one cell if possible. `false` on `Down` means the piece must lock.
    pub fn move_in(&mut self, direction: Direction, grid: &Grid) -> bool {
        if !self.can_move(direction, grid) {
            return false;
        }
        match direction {
            Direction::Left => self.col -= 1,
            Direction::Right => self.col += 1,
            Direction::Down => self.row -= 1,
        }
        true
    }

    /// Rotate 90° clockwise inside the box, then shift sideways back into the
    /// grid and up off the floor.
    ///
    /// Settled tiles are not consulted; an overlap is resolved by the next
    /// vertical move.
    pub fn rotate(&mut self, grid: &Grid) {
        let n = self.box_size();
        for cell in &mut self.cells {
            let (r, c) = *cell;
            *cell = (c, n - 1 - r);
        }
        self.rotation = (self.rotation + 1) % 4;

        let width = grid.width() as i32;
        let positions = self.positions();
        let min_col = positions.iter().map(|&(_, c)| c).min().unwrap_or(0);
        let max_col = positions.iter().map(|&(_, c)| c).max().unwrap_or(0);
        if min_col < 0 {
            self.col -= min_col;
        } else if max_col >= width {
            self.col -= max_col - (width - 1);
        }

        // A piece resting with an empty bottom box row sits at anchor row -1.
        let min_row = positions.iter().map(|&(r, _)| r).min().unwrap_or(0);
        if min_row < 0 {
            self.row -= min_row;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sorted(mut p: [(i32, i32); 4]) -> [(i32, i32); 4] {
        p.sort_unstable();
        p
    }

    #[test]
    fn every_kind_has_four_cells_inside_its_box() {
        for kind in TetrominoKind::ALL {
            let n = kind.box_size();
            for &(c, r) in kind.cells() {
                assert!((0..n).contains(&c) && (0..n).contains(&r), "{kind:?}");
            }
        }
    }

    #[test]
    fn spawn_sits_above_the_grid_and_fits_horizontally() {
        let grid = Grid::new(12, 20);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let kind = TetrominoKind::random(&mut rng);
            let piece = Piece::spawn(kind, &grid, &mut rng);
            assert_eq!(piece.row, 20);
            for (row, col) in piece.positions() {
                assert!(row >= 20);
                assert!((0..12).contains(&col));
            }
        }
    }

    #[test]
    fn o_piece_positions() {
        let piece = Piece::new(TetrominoKind::O, 0, 3);
        assert_eq!(sorted(piece.positions()), [(0, 3), (0, 4), (1, 3), (1, 4)]);
    }

    #[test]
    fn down_stops_at_floor_and_on_tiles() {
        let mut grid = Grid::new(6, 6);
        let mut piece = Piece::new(TetrominoKind::O, 1, 0);
        assert!(piece.move_in(Direction::Down, &grid));
        assert_eq!(piece.row, 0);
        assert!(!piece.move_in(Direction::Down, &grid));
        assert_eq!(piece.row, 0);

        grid.put(Tile::new(0, 1)).unwrap();
        let piece = Piece::new(TetrominoKind::O, 1, 0);
        assert!(!piece.can_move(Direction::Down, &grid));
    }

    #[test]
    fn sideways_blocked_by_walls_and_tiles() {
        let mut grid = Grid::new(6, 6);
        let piece = Piece::new(TetrominoKind::O, 0, 0);
        assert!(!piece.can_move(Direction::Left, &grid));
        assert!(piece.can_move(Direction::Right, &grid));

        let piece = Piece::new(TetrominoKind::O, 0, 4);
        assert!(!piece.can_move(Direction::Right, &grid));

        grid.put(Tile::new(1, 3)).unwrap();
        let piece = Piece::new(TetrominoKind::O, 0, 1);
        assert!(!piece.can_move(Direction::Right, &grid));
        let mut piece = Piece::new(TetrominoKind::O, 0, 4);
        assert!(!piece.move_in(Direction::Left, &grid));
        assert_eq!(piece.col, 4);
    }

    #[test]
    fn rows_above_the_grid_skip_the_occupancy_check() {
        let mut grid = Grid::new(6, 2);
        grid.put(Tile::new(1, 0)).unwrap();
        // O piece straddling the top edge: lower row inside, upper row above.
        let piece = Piece::new(TetrominoKind::O, 1, 1);
        assert!(!piece.can_move(Direction::Left, &grid));
        let piece = Piece::new(TetrominoKind::O, 2, 1);
        assert!(piece.can_move(Direction::Left, &grid));
    }

    #[test]
    fn rows_above_the_grid_skip_the_occupancy_check_to_the_right() {
        let mut grid = Grid::new(6, 2);
        grid.put(Tile::new(1, 5)).unwrap();
        let piece = Piece::new(TetrominoKind::O, 1, 3);
        assert!(!piece.can_move(Direction::Right, &grid));
        let piece = Piece::new(TetrominoKind::O, 2, 3);
        assert!(piece.can_move(Direction::Right, &grid));
    }

    #[test]
    fn rotation_at_the_floor_lifts_the_piece_into_the_grid() {
        let grid = Grid::new(8, 10);
        // Z and T leave their bottom box row empty, so they rest at anchor row -1.
        let mut z = Piece::new(TetrominoKind::Z, -1, 3);
        assert!(!z.can_move(Direction::Down, &grid));
        z.rotate(&grid);
        assert_eq!(z.row, 0);
        assert_eq!(sorted(z.positions()), [(0, 4), (1, 4), (1, 5), (2, 5)]);

        let mut t = Piece::new(TetrominoKind::T, -1, 0);
        t.rotate(&grid);
        assert_eq!(t.positions().iter().map(|&(r, _)| r).min(), Some(0));
        assert!(t.positions().iter().all(|&(_, c)| (0..8).contains(&c)));
    }

    #[test]
    fn rotation_on_settled_tiles_keeps_the_anchor() {
        let mut grid = Grid::new(8, 10);
        grid.put(Tile::new(0, 4)).unwrap();
        // T stem rests on the tile at (0,4).
        let mut t = Piece::new(TetrominoKind::T, 0, 3);
        assert!(!t.can_move(Direction::Down, &grid));
        t.rotate(&grid);
        assert_eq!(t.row, 0);
        assert_eq!(sorted(t.positions()), [(0, 5), (1, 4), (1, 5), (2, 5)]);
    }

    #[test]
    fn rotation_turns_clockwise_within_the_box() {
        let grid = Grid::new(10, 10);
        // I starts vertical in column 1 of its 4x4 box.
        let mut piece = Piece::new(TetrominoKind::I, 0, 2);
        assert_eq!(sorted(piece.positions()), [(0, 3), (1, 3), (2, 3), (3, 3)]);
        piece.rotate(&grid);
        assert_eq!(piece.rotation, 1);
        assert_eq!(sorted(piece.positions()), [(2, 2), (2, 3), (2, 4), (2, 5)]);
        for _ in 0..3 {
            piece.rotate(&grid);
        }
        assert_eq!(piece.rotation, 0);
        assert_eq!(sorted(piece.positions()), [(0, 3), (1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn rotation_kicks_back_inside_the_walls() {
        let grid = Grid::new(6, 10);
        let mut piece = Piece::new(TetrominoKind::I, 0, 3);
        piece.rotate(&grid);
        for (_, col) in piece.positions() {
            assert!((0..6).contains(&col));
        }
        assert_eq!(piece.col, 2);

        // Vertical I hugging the left wall: its box hangs one column outside.
        let mut piece = Piece::new(TetrominoKind::I, 0, -1);
        assert!(!piece.can_move(Direction::Left, &grid));
        piece.rotate(&grid);
        assert_eq!(piece.col, 0);
        assert_eq!(sorted(piece.positions()), [(2, 0), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn tiles_carry_spawn_value_and_positions() {
        let piece = Piece::new(TetrominoKind::T, 4, 2);
        let tiles = piece.tiles();
        for (tile, (row, col)) in tiles.iter().zip(piece.positions()) {
            assert_eq!(tile.value(), 2);
            assert_eq!((tile.row, tile.col), (row, col));
        }
    }
}
