//! tetris2048: headless driver that plays a seeded, scripted game or settles a board file.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tetris2048::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tetris2048::input::{self, Command};
use tetris2048::{GameConfig, Grid, Session, SettlePolicy, SettleReport, Speed, TickOutcome};

/// Ticks allowed per piece before the driver gives up on it.
const MAX_TICKS_PER_PIECE: u32 = 10_000;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.board.as_deref() {
        return settle_board(path, args.policy);
    }
    let config = GameConfig {
        width: args.width,
        height: args.height,
        speed: args.speed,
        policy: args.policy,
        seed: args.seed,
    };
    play(config, args.moves.as_deref().unwrap_or(""), args.pieces)
}

/// Tetris 2048: tetrominoes of numbered tiles that merge, clear and crumble.
#[derive(Debug, Parser)]
#[command(
    name = "tetris2048",
    version,
    about = "Tetris 2048 board engine: play a scripted game or settle a board, headless.",
    long_about = "Tetris 2048 drops tetrominoes made of numbered tiles. When a piece lands, \
        equal tiles stacked vertically merge, full rows clear, and groups that no longer touch \
        the floor fall until the board is stable.\n\n\
        SCRIPT (--moves), one command per character, each followed by a gravity tick:\n  \
        h/a  Left    l/d  Right    j/s  Down    k/w  Rotate    .  Wait    p  Pause\n\n\
        With --board FILE the board is loaded (top row first, `.` for empty), settled once \
        and printed."
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_name = "COLS")]
    pub width: usize,

    /// Playfield height in rows.
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_name = "ROWS")]
    pub height: usize,

    /// Seed for piece kinds and spawn columns (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Starting speed: slow (250 ms), normal (175 ms) or fast (120 ms) per drop.
    #[arg(long, default_value = "slow")]
    pub speed: Speed,

    /// Settling rounds per lock: literal (exactly two) or until-stable.
    #[arg(long, default_value = "literal")]
    pub policy: SettlePolicy,

    /// Settle the board in FILE once and print it instead of playing.
    #[arg(long, value_name = "FILE")]
    pub board: Option<PathBuf>,

    /// Command script applied one character per tick.
    #[arg(short, long, value_name = "SCRIPT")]
    pub moves: Option<String>,

    /// Stop after this many pieces have locked.
    #[arg(long, default_value = "50", value_name = "N")]
    pub pieces: u32,
}

fn settle_board(path: &Path, policy: SettlePolicy) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading board {}", path.display()))?;
    let mut grid: Grid = text
        .parse()
        .with_context(|| format!("parsing board {}", path.display()))?;
    let report = tetris2048::run_settling_sequence(&mut grid, false, policy);
    println!("{grid}");
    print_report(&report);
    Ok(())
}

fn play(config: GameConfig, script: &str, pieces: u32) -> Result<()> {
    let mut session = Session::new(config).context("invalid game configuration")?;
    session.apply(Command::Start);

    let mut commands = input::parse_script(script).into_iter();
    let mut ticks_this_piece = 0u32;
    while session.pieces_locked() < pieces {
        if let Some(command) = commands.next() {
            session.apply(command);
        }
        match session.tick() {
            TickOutcome::Fell => ticks_this_piece += 1,
            TickOutcome::Locked(_) => ticks_this_piece = 0,
            TickOutcome::GameOver(_) => break,
            // Paused by the script: keep feeding commands, or stop once they run out.
            TickOutcome::Ignored => {
                if commands.as_slice().is_empty() {
                    eprintln!("script ended while paused");
                    break;
                }
            }
        }
        if ticks_this_piece > MAX_TICKS_PER_PIECE {
            bail!("piece did not land after {MAX_TICKS_PER_PIECE} ticks");
        }
    }

    println!("{}", session.grid());
    println!(
        "state: {:?}  pieces: {}  score: {}  interval: {} ms  speed-ups: {}",
        session.state(),
        session.pieces_locked(),
        session.score(),
        session.pace().interval_ms(),
        session.pace().increases(),
    );
    if let Some(report) = session.last_report() {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &SettleReport) {
    println!(
        "merges: {} (+{})  rows: {} (+{})  drops: {}  rounds: {}{}",
        report.merges,
        report.merge_points,
        report.rows_cleared,
        report.clear_points,
        report.drop_passes,
        report.rounds,
        if report.game_over { "  GAME OVER" } else { "" },
    );
}
