//! Repetition counting state machine.
//!
//! One [`RepCounter`] holds the state of one workout session. Each call to
//! [`RepCounter::analyze`] consumes one keypoint frame:
//!
//! 1. the exercise profile reduces the frame to a signal sample, or rejects
//!    it (the frame is then skipped without touching any state);
//! 2. the sample is appended to the position history;
//! 3. movement over the lookback window is classified as up, down or stable;
//! 4. the direction tracker confirms direction changes across consecutive
//!    frames, and every confirmed change is recorded with the signal level;
//! 5. the newest direction changes are matched against the exercise's rep
//!    pattern, subject to a cooldown and a minimum movement range.
//!
//! Frames for one counter must be fed strictly in capture order.

use std::sync::Arc;

use repcount_core::{Clock, CounterConfig, Error, KeypointFrame, Result, SystemClock, Timestamp};
use serde::{Deserialize, Serialize};

use crate::direction::{Direction, DirectionEvent, DirectionTracker};
use crate::exercise::{ExerciseKind, ExerciseProfile, SignalSample};
use crate::extractor::KeypointExtractor;
use crate::history::BoundedHistory;
use crate::status::Status;

/// Per-session repetition counter
#[derive(Debug)]
pub struct RepCounter {
    profile: Box<dyn ExerciseProfile>,
    config: CounterConfig,
    extractor: KeypointExtractor,
    clock: Arc<dyn Clock>,
    count: u32,
    status: Status,
    positions: BoundedHistory<SignalSample>,
    directions: BoundedHistory<DirectionEvent>,
    tracker: DirectionTracker,
    last_rep: Option<Timestamp>,
    frames_processed: u64,
}

/// Serializable view of a counter's state, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub exercise: ExerciseKind,
    pub count: u32,
    pub status: Status,
    pub direction: Direction,
    pub frames_processed: u64,
    pub position_history_len: usize,
    pub direction_history_len: usize,
    pub up_frames: f64,
    pub down_frames: f64,
    pub last_rep: Option<Timestamp>,
}

impl RepCounter {
    /// Create a counter reading wall-clock time
    pub fn new(exercise: ExerciseKind, config: CounterConfig) -> Result<Self> {
        Self::with_clock(exercise, config, Arc::new(SystemClock))
    }

    /// Create a counter with an explicit time source
    pub fn with_clock(exercise: ExerciseKind, config: CounterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            profile: exercise.profile(&config),
            extractor: KeypointExtractor::from_config(&config),
            positions: BoundedHistory::new(config.position_history_size),
            directions: BoundedHistory::new(config.direction_history_size),
            config,
            clock,
            count: 0,
            status: Status::Neutral,
            tracker: DirectionTracker::new(),
            last_rep: None,
            frames_processed: 0,
        })
    }

    /// Analyze one frame and return the running count and frame status
    ///
    /// Never fails: internal errors are logged and reported as
    /// [`Status::Error`] with the count unchanged.
    pub fn analyze(&mut self, frame: Option<&KeypointFrame>) -> (u32, Status) {
        self.frames_processed += 1;

        match self.step(frame) {
            Ok(status) => (self.count, status),
            Err(e) => {
                tracing::error!(
                    "Analysis failed for {} on frame {}: {}",
                    self.profile.kind(),
                    self.frames_processed,
                    e
                );
                (self.count, Status::Error)
            }
        }
    }

    fn step(&mut self, frame: Option<&KeypointFrame>) -> Result<Status> {
        let sample = match self.profile.extract(&self.extractor, frame) {
            Ok(sample) => sample,
            Err(rejection) => {
                tracing::trace!("Frame {} rejected: {}", self.frames_processed, rejection);
                return Ok(rejection.into());
            }
        };

        if let Some(value) = sample.non_finite() {
            return Err(Error::NonFiniteSignal {
                exercise: self.profile.kind().to_string(),
                value,
            });
        }

        let now = self.clock.now();
        self.positions.push(sample);

        if self.positions.len() < self.config.lookback_frames {
            self.status = Status::Starting;
            return Ok(self.status);
        }

        let Some(motion) = self.profile.motion(&self.positions, self.config.lookback_frames)? else {
            self.status = Status::from_direction(self.tracker.current());
            return Ok(self.status);
        };

        let detected = self.profile.classify(&motion.movement)?;
        self.tracker.observe(detected, self.config.stable_decay_rate);

        let confirmed = self.tracker.confirmed(self.config.min_consecutive_frames);
        if self.tracker.commit(confirmed) {
            tracing::debug!(
                "{}: direction {} at level {:.1}",
                self.profile.kind(),
                confirmed,
                motion.level
            );
            self.directions.push(DirectionEvent::new(confirmed, now, motion.level));
        }

        self.check_rep_completion(now);

        self.status = Status::from_direction(confirmed);
        Ok(self.status)
    }

    /// Count a repetition if the newest direction changes close one
    fn check_rep_completion(&mut self, now: Timestamp) -> bool {
        if let Some(last) = self.last_rep {
            if now.secs_since(last) <= self.config.rep_cooldown_secs {
                return false;
            }
        }

        let Some((first, second)) = self.profile.rep_pattern().match_events(&self.directions) else {
            return false;
        };

        let range = (first.level - second.level).abs();
        if range <= self.config.min_movement_range {
            tracing::trace!(
                "{}: {} -> {} range {:.1} too small",
                self.profile.kind(),
                first.direction,
                second.direction,
                range
            );
            return false;
        }

        self.count = self.count.saturating_add(1);
        self.last_rep = Some(now);
        self.directions.clear();

        tracing::info!(
            "{}: rep {} counted (range {:.1})",
            self.profile.kind(),
            self.count,
            range
        );
        true
    }

    /// Return to the construction-time state
    pub fn reset(&mut self) {
        self.count = 0;
        self.status = Status::Neutral;
        self.positions.clear();
        self.directions.clear();
        self.tracker.reset();
        self.last_rep = None;
        self.frames_processed = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Status of the last frame that reached the state machine
    ///
    /// Rejected frames and internal errors do not update it.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn current_direction(&self) -> Direction {
        self.tracker.current()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.profile.kind()
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn position_history_len(&self) -> usize {
        self.positions.len()
    }

    /// Confirmed direction changes since the last counted rep, oldest first
    pub fn direction_history(&self) -> impl ExactSizeIterator<Item = &DirectionEvent> + '_ {
        self.directions.iter()
    }

    pub fn direction_history_len(&self) -> usize {
        self.directions.len()
    }

    pub fn up_frames(&self) -> f64 {
        self.tracker.up_frames()
    }

    pub fn down_frames(&self) -> f64 {
        self.tracker.down_frames()
    }

    pub fn last_rep(&self) -> Option<Timestamp> {
        self.last_rep
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            exercise: self.exercise(),
            count: self.count,
            status: self.status,
            direction: self.current_direction(),
            frames_processed: self.frames_processed,
            position_history_len: self.positions.len(),
            direction_history_len: self.directions.len(),
            up_frames: self.tracker.up_frames(),
            down_frames: self.tracker.down_frames(),
            last_rep: self.last_rep,
        }
    }
}
