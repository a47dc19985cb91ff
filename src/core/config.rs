//! Game configuration.
//!
//! Everything the engine needs to know up front: board size, palette,
//! combination rules, session limits, and animation timings. The engine
//! validates the configuration once at construction and treats it as
//! read-only afterwards.
//!
//! `GameConfig::default()` reproduces the classic setup: an 8x8 board, six
//! colors, horizontal and vertical triples, 60 seconds to reach 120 points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Color;
use crate::matching::CombinationRule;

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board must have at least one row and one column (got {rows}x{cols})")]
    EmptyBoard { rows: usize, cols: usize },

    #[error("palette needs at least {min} colors (got {got})")]
    PaletteTooSmall { got: usize, min: usize },

    #[error("palette supports at most 255 colors (got {0})")]
    PaletteTooLarge(usize),

    #[error("no combination rules configured")]
    NoRules,

    #[error("rule {index} has no offsets")]
    EmptyRule { index: usize },

    #[error("rule {index} contains the anchor offset (0, 0)")]
    AnchorInRule { index: usize },

    #[error("rule {index} repeats an offset")]
    DuplicateOffset { index: usize },

    #[error("initial time must be positive")]
    ZeroTime,

    #[error("target score must be positive")]
    ZeroTarget,

    #[error("animation timing `{0}` must be between 0 and {max} seconds", max = MAX_TIMING_SECS)]
    BadTiming(&'static str),

    #[error("grid is {got_rows}x{got_cols} but the configuration asks for {rows}x{cols}")]
    GridMismatch {
        rows: usize,
        cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("starting board has {got} entries for {expected} cells")]
    LayoutLength { expected: usize, got: usize },

    #[error("starting board has {0} empty cells")]
    IncompleteBoard(usize),

    #[error("starting board already contains a match")]
    StartingMatch,

    #[error("starting board uses {color}, outside a palette of {palette} colors")]
    UnknownColor { color: Color, palette: usize },
}

/// Fewest colors that still let the bootstrap converge quickly.
pub const MIN_PALETTE: usize = 3;

/// Longest accepted animation timing, in seconds.
pub const MAX_TIMING_SECS: f32 = 60.0;

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board rows.
    pub rows: usize,

    /// Board columns.
    pub cols: usize,

    /// Palette names. `Color(i)` refers to `palette[i]`.
    pub palette: Vec<String>,

    /// Shapes that count as a match.
    pub rules: Vec<CombinationRule>,

    /// Session length in seconds.
    pub initial_time: u32,

    /// Score that wins the session.
    pub target_score: u32,

    /// Points per removed tile.
    pub points_per_tile: u32,

    /// Duration of a swap (and its reversal).
    pub swap_secs: f32,

    /// Duration of a gravity or refill fall.
    pub fall_secs: f32,

    /// Upper bound of the random part of a refill delay.
    pub refill_jitter_secs: f32,

    /// RNG seed for refills.
    pub seed: u64,

    /// Start a fresh session automatically once one ends.
    /// When false the engine stays in `SessionOver` until restarted.
    pub auto_restart: bool,

    /// Regenerate the board when no swap can produce a match.
    pub reshuffle_on_deadlock: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            palette: ["black", "color", "gold", "green", "white", "yellow"]
                .into_iter()
                .map(String::from)
                .collect(),
            rules: vec![CombinationRule::horizontal(3), CombinationRule::vertical(3)],
            initial_time: 60,
            target_score: 120,
            points_per_tile: 10,
            swap_secs: 0.2,
            fall_secs: 0.5,
            refill_jitter_secs: 0.2,
            seed: 42,
            auto_restart: true,
            reshuffle_on_deadlock: true,
        }
    }
}

impl GameConfig {
    /// Set the board size.
    #[must_use]
    pub fn with_board(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Replace the palette.
    #[must_use]
    pub fn with_palette<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.palette = names.into_iter().map(Into::into).collect();
        self
    }

    /// Use `count` anonymous colors.
    #[must_use]
    pub fn with_palette_size(self, count: usize) -> Self {
        self.with_palette((0..count).map(|i| format!("color{i}")))
    }

    /// Replace the combination rules.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<CombinationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Set session length and target.
    #[must_use]
    pub fn with_session(mut self, initial_time: u32, target_score: u32) -> Self {
        self.initial_time = initial_time;
        self.target_score = target_score;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Toggle automatic restart after a session ends.
    #[must_use]
    pub fn with_auto_restart(mut self, enabled: bool) -> Self {
        self.auto_restart = enabled;
        self
    }

    /// Toggle deadlock reshuffling.
    #[must_use]
    pub fn with_reshuffle_on_deadlock(mut self, enabled: bool) -> Self {
        self.reshuffle_on_deadlock = enabled;
        self
    }

    /// Number of palette colors.
    #[must_use]
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.palette.len() < MIN_PALETTE {
            return Err(ConfigError::PaletteTooSmall {
                got: self.palette.len(),
                min: MIN_PALETTE,
            });
        }
        if self.palette.len() > 255 {
            return Err(ConfigError::PaletteTooLarge(self.palette.len()));
        }
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        for (index, rule) in self.rules.iter().enumerate() {
            let offsets = rule.offsets();
            if offsets.is_empty() {
                return Err(ConfigError::EmptyRule { index });
            }
            if offsets.iter().any(|o| o.is_anchor()) {
                return Err(ConfigError::AnchorInRule { index });
            }
            let duplicated = offsets
                .iter()
                .enumerate()
                .any(|(i, o)| offsets[..i].contains(o));
            if duplicated {
                return Err(ConfigError::DuplicateOffset { index });
            }
        }
        if self.initial_time == 0 {
            return Err(ConfigError::ZeroTime);
        }
        if self.target_score == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        for (name, value) in [
            ("swap_secs", self.swap_secs),
            ("fall_secs", self.fall_secs),
            ("refill_jitter_secs", self.refill_jitter_secs),
        ] {
            if !(0.0..=MAX_TIMING_SECS).contains(&value) {
                return Err(ConfigError::BadTiming(name));
            }
        }
        Ok(())
    }
}
