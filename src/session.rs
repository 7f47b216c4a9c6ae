//! Game session: screen state, falling piece, score and drop pace.

use crate::config::{ConfigError, GameConfig, Speed};
use crate::grid::Grid;
use crate::input::Command;
use crate::piece::{Direction, Piece, TetrominoKind};
use crate::settle::{self, SettleReport};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Points needed before the pace quickens.
const PACE_STEP_POINTS: u32 = 500;
/// Drop interval below which the pace stops quickening.
const PACE_FLOOR_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Drop interval that shortens as points come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pace {
    interval_ms: u32,
    accumulated: u32,
    increases: u32,
}

impl Pace {
    pub fn new(speed: Speed) -> Self {
        Self {
            interval_ms: speed.interval_ms(),
            accumulated: 0,
            increases: 0,
        }
    }

    #[inline]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// How many times the pace has quickened.
    #[inline]
    pub fn increases(&self) -> u32 {
        self.increases
    }

    /// Feed freshly earned points; `score` is the running total after them.
    /// Returns true if the interval shrank.
    pub fn record(&mut self, points: u32, score: u32) -> bool {
        self.accumulated = self.accumulated.saturating_add(points);
        if self.accumulated <= PACE_STEP_POINTS || self.interval_ms < PACE_FLOOR_MS {
            return false;
        }
        self.interval_ms -= self.interval_ms * 5 / 100;
        self.increases += 1;
        self.accumulated = score % PACE_STEP_POINTS;
        true
    }
}

/// Result of one gravity tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing (menu, paused or over).
    Ignored,
    /// The piece moved down one row.
    Fell,
    /// The piece locked and the grid settled; a new piece is falling.
    Locked(SettleReport),
    /// The piece locked above the top; the session is over.
    GameOver(SettleReport),
}

/// One game from menu to game over, and any restarts after it.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    state: SessionState,
    grid: Grid,
    piece: Option<Piece>,
    next: TetrominoKind,
    rng: StdRng,
    score: u32,
    pace: Pace,
    pieces_locked: u32,
    last_report: Option<SettleReport>,
}

impl Session {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let next = TetrominoKind::random(&mut rng);
        Ok(Self {
            grid: Grid::new(config.width, config.height),
            pace: Pace::new(config.speed),
            config,
            state: SessionState::Menu,
            piece: None,
            next,
            rng,
            score: 0,
            pieces_locked: 0,
            last_report: None,
        })
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access, e.g. to preload a puzzle before starting.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[inline]
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    /// Replace the falling piece (used by scripted setups).
    pub fn set_piece(&mut self, piece: Piece) {
        self.piece = Some(piece);
    }

    /// Kind of the piece that spawns after the current one.
    #[inline]
    pub fn next_kind(&self) -> TetrominoKind {
        self.next
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn pace(&self) -> &Pace {
        &self.pace
    }

    #[inline]
    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    #[inline]
    pub fn last_report(&self) -> Option<&SettleReport> {
        self.last_report.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Apply a player command. Returns true if the session or the piece changed.
    pub fn apply(&mut self, command: Command) -> bool {
        match (self.state, command) {
            (SessionState::Menu, Command::Start) => {
                self.spawn_next();
                self.state = SessionState::Playing;
                true
            }
            (SessionState::Playing, Command::Pause) => {
                self.state = SessionState::Paused;
                true
            }
            (SessionState::Paused, Command::Pause) => {
                self.state = SessionState::Playing;
                true
            }
            (SessionState::Paused | SessionState::GameOver, Command::Restart) => {
                self.restart();
                true
            }
            (SessionState::Playing, Command::MoveLeft) => self.move_piece(Direction::Left),
            (SessionState::Playing, Command::MoveRight) => self.move_piece(Direction::Right),
            // A blocked player drop does not lock; only gravity does.
            (SessionState::Playing, Command::SoftDrop) => self.move_piece(Direction::Down),
            (SessionState::Playing, Command::Rotate) => match self.piece.as_mut() {
                Some(piece) => {
                    piece.rotate(&self.grid);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn move_piece(&mut self, direction: Direction) -> bool {
        self.piece
            .as_mut()
            .is_some_and(|piece| piece.move_in(direction, &self.grid))
    }

    /// Advance gravity by one step, locking and settling when the piece lands.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SessionState::Playing {
            return TickOutcome::Ignored;
        }
        if self.piece.is_none() {
            self.spawn_next();
        }
        let Some(mut piece) = self.piece.take() else {
            return TickOutcome::Ignored;
        };
        if piece.move_in(Direction::Down, &self.grid) {
            self.piece = Some(piece);
            return TickOutcome::Fell;
        }

        let game_over = self.grid.place(piece.tiles());
        let report = settle::run_settling_sequence(&mut self.grid, game_over, self.config.policy);
        self.score = self.score.saturating_add(report.points());
        self.pace.record(report.points(), self.score);
        self.pieces_locked += 1;
        self.last_report = Some(report);

        if report.game_over {
            self.state = SessionState::GameOver;
            TickOutcome::GameOver(report)
        } else {
            self.spawn_next();
            TickOutcome::Locked(report)
        }
    }

    fn spawn_next(&mut self) {
        let kind = std::mem::replace(&mut self.next, TetrominoKind::random(&mut self.rng));
        self.piece = Some(Piece::spawn(kind, &self.grid, &mut self.rng));
    }

    fn restart(&mut self) {
        self.grid.clear_all();
        self.score = 0;
        self.pace = Pace::new(self.config.speed);
        self.pieces_locked = 0;
        self.last_report = None;
        self.spawn_next();
        self.state = SessionState::Playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> Session {
        Session::new(GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn pace_quickens_after_five_hundred_points() {
        let mut pace = Pace::new(Speed::Slow);
        assert!(!pace.record(500, 500));
        assert!(pace.record(20, 520));
        assert_eq!(pace.interval_ms(), 250 - 12);
        assert_eq!(pace.increases(), 1);
        // Accumulator restarts from score % 500 = 20.
        assert!(!pace.record(400, 920));
        assert!(pace.record(100, 1020));
    }

    #[test]
    fn pace_stops_at_the_floor() {
        let mut pace = Pace::new(Speed::Fast);
        let mut score = 0;
        for _ in 0..100 {
            score += 600;
            pace.record(600, score);
        }
        assert!(pace.interval_ms() < PACE_FLOOR_MS);
        assert!(pace.interval_ms() > 40);
    }

    #[test]
    fn menu_ignores_everything_but_start() {
        let mut session = seeded(1);
        assert!(!session.apply(Command::MoveLeft));
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert!(session.apply(Command::Start));
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.piece().is_some());
    }

    #[test]
    fn pause_freezes_gravity() {
        let mut session = seeded(2);
        session.apply(Command::Start);
        session.apply(Command::Pause);
        assert_eq!(session.state(), SessionState::Paused);
        let row = session.piece().map(|p| p.row);
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert!(!session.apply(Command::Rotate));
        assert_eq!(session.piece().map(|p| p.row), row);
        session.apply(Command::Pause);
        assert_eq!(session.tick(), TickOutcome::Fell);
    }

    #[test]
    fn same_seed_same_pieces() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        a.apply(Command::Start);
        b.apply(Command::Start);
        assert_eq!(a.piece(), b.piece());
        assert_eq!(a.next_kind(), b.next_kind());
    }

    #[test]
    fn locking_spawns_the_previewed_piece() {
        let mut session = seeded(3);
        session.apply(Command::Start);
        let preview = session.next_kind();
        let outcome = loop {
            match session.tick() {
                TickOutcome::Fell => continue,
                other => break other,
            }
        };
        assert!(matches!(outcome, TickOutcome::Locked(_)));
        assert_eq!(session.pieces_locked(), 1);
        assert_eq!(session.piece().map(|p| p.kind), Some(preview));
        assert_eq!(session.grid().occupied_count(), 4 - session.last_report().map_or(0, |r| r.merges as usize));
    }
}
