//! Tetris 2048: falling tetrominoes whose numbered tiles merge like 2048.
//!
//! The heart of the crate is the board simulation engine. After a piece locks,
//! [`settle::run_settling_sequence`] resolves the grid by merging equal
//! vertical neighbours, clearing full rows and letting unsupported tile groups
//! fall, then reports whether the lock left a tile above the playfield.
//!
//! - [`grid`]: the playfield and its occupancy queries
//! - [`piece`]: tetromino shapes, movement, rotation and collision
//! - [`merge`], [`clear`], [`label`]: the three resolver passes
//! - [`settle`]: the settling state machine run once per lock
//! - [`session`]: menu/playing/paused/game-over flow, score and pace
//! - [`input`], [`config`]: script commands and validated options
//!
//! ```
//! use tetris2048::grid::{Grid, Tile};
//! use tetris2048::settle::{run_settling_sequence, SettlePolicy};
//!
//! let mut grid: Grid = ". . .\n2 4 .".parse().unwrap();
//! let game_over = grid.place([Tile::new(1, 0)]);
//! let report = run_settling_sequence(&mut grid, game_over, SettlePolicy::Literal);
//! assert_eq!(report.merges, 1);
//! assert_eq!(grid.to_string(), ". . .\n4 4 .");
//! ```

pub mod clear;
pub mod config;
pub mod grid;
pub mod input;
pub mod label;
pub mod merge;
pub mod piece;
pub mod session;
pub mod settle;

pub use config::{ConfigError, GameConfig, Speed};
pub use grid::{Cell, Grid, GridParseError, Tile};
pub use input::Command;
pub use piece::{Direction, Piece, TetrominoKind};
pub use session::{Pace, Session, SessionState, TickOutcome};
pub use settle::{SettlePolicy, SettleReport, run_settling_sequence};
