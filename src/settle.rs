//! Settling after a lock: merge, clear, drop unsupported groups, repeat.

use crate::clear::{self, ClearOutcome};
use crate::grid::Grid;
use crate::label::{self, FreeTiles};
use crate::merge::{self, MergeOutcome};
use clap::ValueEnum;

/// Rounds performed by [`SettlePolicy::Literal`].
pub const LITERAL_ROUNDS: u32 = 2;

/// How many Merging → Clearing → Labeling/Dropping rounds run per lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SettlePolicy {
    /// Exactly [`LITERAL_ROUNDS`] rounds, whatever the second one leaves behind.
    #[default]
    Literal,
    /// Rounds repeat until one performs no merge, no clear and no drop.
    UntilStable,
}

/// Phase of the settling state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePhase {
    Merging,
    Clearing,
    Labeling,
    Dropping,
    Idle,
}

/// Everything a settling sequence did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub merges: u32,
    pub merge_points: u32,
    pub rows_cleared: u32,
    pub clear_points: u32,
    /// Labeling/Dropping iterations that moved at least one tile.
    pub drop_passes: u32,
    /// Drop passes performed during the first round only.
    pub first_round_drop_passes: u32,
    pub rounds: u32,
    /// The lock left a tile above the visible grid.
    pub game_over: bool,
}

impl SettleReport {
    /// Points earned by merges and clears together.
    pub fn points(&self) -> u32 {
        self.merge_points.saturating_add(self.clear_points)
    }

    fn add_merges(&mut self, outcome: MergeOutcome) {
        self.merges += outcome.merges;
        self.merge_points = self.merge_points.saturating_add(outcome.points);
    }

    fn add_clears(&mut self, outcome: ClearOutcome) {
        self.rows_cleared += outcome.rows;
        self.clear_points = self.clear_points.saturating_add(outcome.points);
    }
}

/// Drives one grid through the settling phases.
#[derive(Debug)]
pub struct Settler<'a> {
    grid: &'a mut Grid,
    policy: SettlePolicy,
    phase: SettlePhase,
    /// Free tiles found by the last Labeling phase, consumed by Dropping.
    pending: Option<FreeTiles>,
    report: SettleReport,
    /// Something moved, merged or cleared during the current round.
    round_changed: bool,
}

impl<'a> Settler<'a> {
    pub fn new(grid: &'a mut Grid, game_over: bool, policy: SettlePolicy) -> Self {
        Self {
            grid,
            policy,
            phase: SettlePhase::Merging,
            pending: None,
            report: SettleReport {
                game_over,
                ..SettleReport::default()
            },
            round_changed: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> SettlePhase {
        self.phase
    }

    #[inline]
    pub fn report(&self) -> &SettleReport {
        &self.report
    }

    /// Run the current phase and advance. Returns the phase now current.
    pub fn step(&mut self) -> SettlePhase {
        self.phase = match self.phase {
            SettlePhase::Merging => {
                let outcome = merge::merge_until_stable(self.grid);
                self.round_changed |= outcome.merged();
                self.report.add_merges(outcome);
                SettlePhase::Clearing
            }
            SettlePhase::Clearing => {
                let outcome = clear::clear_until_stable(self.grid);
                self.round_changed |= outcome.cleared();
                self.report.add_clears(outcome);
                SettlePhase::Labeling
            }
            SettlePhase::Labeling => {
                let labels = label::label_components(self.grid);
                let free = label::find_free_tiles(&labels);
                if free.is_empty() {
                    self.finish_round()
                } else {
                    self.pending = Some(free);
                    SettlePhase::Dropping
                }
            }
            SettlePhase::Dropping => {
                if let Some(free) = self.pending.take() {
                    if label::drop_free_tiles(self.grid, &free) > 0 {
                        self.round_changed = true;
                        self.report.drop_passes += 1;
                        if self.report.rounds == 0 {
                            self.report.first_round_drop_passes += 1;
                        }
                    }
                }
                SettlePhase::Labeling
            }
            SettlePhase::Idle => SettlePhase::Idle,
        };
        self.phase
    }

    fn finish_round(&mut self) -> SettlePhase {
        self.report.rounds += 1;
        let changed = std::mem::take(&mut self.round_changed);
        let again = match self.policy {
            SettlePolicy::Literal => self.report.rounds < LITERAL_ROUNDS,
            SettlePolicy::UntilStable => changed,
        };
        if again {
            SettlePhase::Merging
        } else {
            SettlePhase::Idle
        }
    }

    /// Step until Idle and hand back the report.
    pub fn run(mut self) -> SettleReport {
        while self.step() != SettlePhase::Idle {}
        self.report
    }
}

/// Settle `grid` after a lock. `game_over` is the result of [`Grid::place`];
/// it is carried through so the loss surfaces only once the grid is consistent.
pub fn run_settling_sequence(grid: &mut Grid, game_over: bool, policy: SettlePolicy) -> SettleReport {
    Settler::new(grid, game_over, policy).run()
}
