//! Direction classification and consecutive-frame confirmation.
//!
//! A raw per-frame classification is noisy. A direction only becomes
//! "confirmed" after it has been observed for enough consecutive frames; a
//! stable frame decays the counters instead of zeroing them, so a single
//! quiet frame inside a continuous motion does not throw away its progress.

use std::fmt;

use repcount_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Movement direction of the exercise signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Signal increasing
    Up,
    /// Signal decreasing
    Down,
    /// Within the movement threshold
    #[default]
    Stable,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Stable => "stable",
        }
    }

    /// Classify a scalar movement against a symmetric threshold band
    ///
    /// Values within `±threshold` (inclusive) are stable.
    pub fn classify(movement: f64, threshold: f64) -> Self {
        if movement > threshold {
            Direction::Up
        } else if movement < -threshold {
            Direction::Down
        } else {
            Direction::Stable
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confirmed direction change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionEvent {
    pub direction: Direction,
    pub timestamp: Timestamp,
    /// Signal level at the moment the change was confirmed
    pub level: f64,
}

impl DirectionEvent {
    pub fn new(direction: Direction, timestamp: Timestamp, level: f64) -> Self {
        Self {
            direction,
            timestamp,
            level,
        }
    }
}

/// Consecutive-frame counters with decay
///
/// Counters are real-valued so that stable frames can erode them gradually.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionTracker {
    up_frames: f64,
    down_frames: f64,
    current: Direction,
}

impl DirectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw classification
    pub fn observe(&mut self, detected: Direction, decay_rate: f64) {
        match detected {
            Direction::Up => {
                self.up_frames += 1.0;
                self.down_frames = 0.0;
            }
            Direction::Down => {
                self.down_frames += 1.0;
                self.up_frames = 0.0;
            }
            Direction::Stable => {
                self.up_frames = (self.up_frames - decay_rate).max(0.0);
                self.down_frames = (self.down_frames - decay_rate).max(0.0);
            }
        }
    }

    /// Direction the counters currently support
    ///
    /// Falls back to the last confirmed direction while a change is pending;
    /// only returns to stable once both counters have fully decayed.
    pub fn confirmed(&self, min_consecutive_frames: u32) -> Direction {
        let min_frames = min_consecutive_frames as f64;

        if self.up_frames >= min_frames {
            Direction::Up
        } else if self.down_frames >= min_frames {
            Direction::Down
        } else if self.up_frames == 0.0 && self.down_frames == 0.0 {
            Direction::Stable
        } else {
            self.current
        }
    }

    /// Record `direction` as confirmed; returns true if it changed
    pub fn commit(&mut self, direction: Direction) -> bool {
        if direction == self.current {
            return false;
        }
        self.current = direction;
        true
    }

    pub fn current(&self) -> Direction {
        self.current
    }

    pub fn up_frames(&self) -> f64 {
        self.up_frames
    }

    pub fn down_frames(&self) -> f64 {
        self.down_frames
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
