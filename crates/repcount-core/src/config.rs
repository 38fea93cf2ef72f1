//! Counter configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Axis;

/// Per-axis thresholds for jumping jacks
///
/// Each tracked component must independently exceed its own threshold for a
/// frame to be classified as moving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JackThresholds {
    /// Horizontal left-ankle movement (pixels over the lookback window)
    pub left_ankle: f64,
    /// Horizontal right-ankle movement
    pub right_ankle: f64,
    /// Vertical average-wrist movement
    pub wrist: f64,
}

impl Default for JackThresholds {
    fn default() -> Self {
        Self {
            left_ankle: 8.0,
            right_ankle: 8.0,
            wrist: 8.0,
        }
    }
}

/// Configuration handed to every repetition counter at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Minimum keypoint confidence across the consulted joints
    pub min_confidence: f64,

    /// Minimum seconds between two counted repetitions
    pub rep_cooldown_secs: f64,

    /// Consecutive frames needed to confirm a direction
    pub min_consecutive_frames: u32,

    /// Movement (pixels over the lookback window) needed to leave STABLE
    pub movement_threshold: f64,

    /// Signal range a repetition must strictly exceed
    pub min_movement_range: f64,

    /// Amount both consecutive counters decay by on a stable frame
    pub stable_decay_rate: f64,

    /// Window the short-term movement is measured over (frames)
    pub lookback_frames: usize,

    /// Capacity of the position history
    pub position_history_size: usize,

    /// Capacity of the direction-change history
    pub direction_history_size: usize,

    /// Axis arm exercises measure wrist-shoulder difference along
    pub arm_axis: Axis,

    /// Cumulative movement an arm needs over the lookback window to be tracked
    pub min_arm_movement: f64,

    /// Jumping-jack component thresholds
    pub jack_thresholds: JackThresholds,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            rep_cooldown_secs: 2.0,
            min_consecutive_frames: 3,
            movement_threshold: 8.0,
            min_movement_range: 30.0,
            stable_decay_rate: 0.5,
            lookback_frames: 5,
            position_history_size: 30,
            direction_history_size: 10,
            arm_axis: Axis::Vertical,
            min_arm_movement: 10.0,
            jack_thresholds: JackThresholds::default(),
        }
    }
}

impl CounterConfig {
    /// Load configuration from file, with `REPCOUNT_*` environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(Self::environment())
            .build()?;

        let parsed: Self = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        let parsed: Self = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("REPCOUNT")
            .separator("__")
            .try_parsing(true)
    }

    /// Reject values the counter cannot operate with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.lookback_frames < 2 {
            return Err(Error::Config(format!(
                "lookback_frames must be at least 2, got {}",
                self.lookback_frames
            )));
        }
        if self.position_history_size < self.lookback_frames {
            return Err(Error::Config(format!(
                "position_history_size ({}) must hold the lookback window ({})",
                self.position_history_size, self.lookback_frames
            )));
        }
        if self.direction_history_size < 3 {
            return Err(Error::Config(format!(
                "direction_history_size must be at least 3, got {}",
                self.direction_history_size
            )));
        }
        if self.min_consecutive_frames == 0 {
            return Err(Error::Config("min_consecutive_frames must be positive".into()));
        }

        let non_negative = [
            ("rep_cooldown_secs", self.rep_cooldown_secs),
            ("movement_threshold", self.movement_threshold),
            ("min_movement_range", self.min_movement_range),
            ("stable_decay_rate", self.stable_decay_rate),
            ("min_arm_movement", self.min_arm_movement),
            ("jack_thresholds.left_ankle", self.jack_thresholds.left_ankle),
            ("jack_thresholds.right_ankle", self.jack_thresholds.right_ankle),
            ("jack_thresholds.wrist", self.jack_thresholds.wrist),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(Error::Config(format!("{name} must be non-negative, got {value}")));
            }
        }

        Ok(())
    }
}
