//! Exercise profiles.
//!
//! A profile is the per-exercise strategy plugged into [`crate::RepCounter`]:
//! it turns a keypoint frame into a signal sample, measures short-term
//! movement over the position history, classifies that movement, and names
//! the direction pattern that closes one repetition.

use std::fmt;
use std::str::FromStr;

use repcount_core::{CounterConfig, Error, KeypointFrame, Result};
use serde::{Deserialize, Serialize};

use crate::direction::{Direction, DirectionEvent};
use crate::extractor::{FrameRejection, KeypointExtractor};
use crate::history::BoundedHistory;
use crate::profiles::{BicepCurlProfile, JumpingJackProfile, PullUpProfile, SquatProfile};

/// Supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    PullUp,
    BicepCurl,
    Squat,
    JumpingJack,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 4] = [
        ExerciseKind::PullUp,
        ExerciseKind::BicepCurl,
        ExerciseKind::Squat,
        ExerciseKind::JumpingJack,
    ];

    /// Name shown to (and sent by) clients
    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseKind::PullUp => "Pull Ups",
            ExerciseKind::BicepCurl => "Bicep Curls",
            ExerciseKind::Squat => "Squats",
            ExerciseKind::JumpingJack => "Jumping Jacks",
        }
    }

    /// Build the profile for this exercise from `config`
    pub fn profile(&self, config: &CounterConfig) -> Box<dyn ExerciseProfile> {
        match self {
            ExerciseKind::PullUp => Box::new(PullUpProfile::from_config(config)),
            ExerciseKind::BicepCurl => Box::new(BicepCurlProfile::from_config(config)),
            ExerciseKind::Squat => Box::new(SquatProfile::from_config(config)),
            ExerciseKind::JumpingJack => Box::new(JumpingJackProfile::from_config(config)),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    /// Accepts display names ("Pull Ups") and snake/kebab-case aliases
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pullup" | "pullups" => Ok(ExerciseKind::PullUp),
            "bicepcurl" | "bicepcurls" | "curl" | "curls" => Ok(ExerciseKind::BicepCurl),
            "squat" | "squats" => Ok(ExerciseKind::Squat),
            "jumpingjack" | "jumpingjacks" => Ok(ExerciseKind::JumpingJack),
            _ => Err(Error::UnknownExercise(s.to_string())),
        }
    }
}

/// Signal derived from one keypoint frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSample {
    /// Single positional difference
    Scalar(f64),
    /// Per-arm wrist-shoulder differences
    Arms { left: f64, right: f64 },
    /// Ankle x positions and average wrist y
    Jack {
        left_ankle_x: f64,
        right_ankle_x: f64,
        wrist_y: f64,
    },
}

impl SignalSample {
    /// First non-finite component, if any
    pub fn non_finite(&self) -> Option<f64> {
        let check = |v: f64| (!v.is_finite()).then_some(v);
        match *self {
            SignalSample::Scalar(v) => check(v),
            SignalSample::Arms { left, right } => check(left).or_else(|| check(right)),
            SignalSample::Jack {
                left_ankle_x,
                right_ankle_x,
                wrist_y,
            } => check(left_ankle_x)
                .or_else(|| check(right_ankle_x))
                .or_else(|| check(wrist_y)),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            SignalSample::Scalar(_) => "scalar",
            SignalSample::Arms { .. } => "arms",
            SignalSample::Jack { .. } => "jack",
        }
    }
}

/// Short-term movement over the lookback window (newest minus oldest)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Scalar(f64),
    Jack {
        left_ankle: f64,
        right_ankle: f64,
        wrist: f64,
    },
}

/// Movement plus the signal level it ended at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub movement: Movement,
    /// Level recorded with a direction change; rep range is measured on it
    pub level: f64,
}

/// Ordered pair of confirmed directions that closes one repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepPattern {
    pub first: Direction,
    pub second: Direction,
    /// Treat `first, STABLE, second` like `first, second`
    pub tolerate_plateau: bool,
}

impl RepPattern {
    pub const fn new(first: Direction, second: Direction) -> Self {
        Self {
            first,
            second,
            tolerate_plateau: false,
        }
    }

    pub const fn with_plateau(self) -> Self {
        Self {
            tolerate_plateau: true,
            ..self
        }
    }

    /// Match the newest direction changes against this pattern
    ///
    /// Returns the two matched events, oldest first.
    pub fn match_events(
        &self,
        events: &BoundedHistory<DirectionEvent>,
    ) -> Option<(DirectionEvent, DirectionEvent)> {
        if events.len() < 2 {
            return None;
        }

        let (first, second) = if self.tolerate_plateau && events.len() >= 3 {
            let mut recent = events.recent(3).copied();
            let (a, b, c) = (recent.next()?, recent.next()?, recent.next()?);
            // A plateau between the phases collapses into the phase before it
            let first = if b.direction == Direction::Stable { a } else { b };
            (first, c)
        } else {
            let mut recent = events.recent(2).copied();
            (recent.next()?, recent.next()?)
        };

        (first.direction == self.first && second.direction == self.second).then_some((first, second))
    }
}

/// Per-exercise signal extraction and classification
pub trait ExerciseProfile: Send + Sync + fmt::Debug {
    fn kind(&self) -> ExerciseKind;

    /// Reduce a frame to a signal sample
    fn extract(
        &self,
        extractor: &KeypointExtractor,
        frame: Option<&KeypointFrame>,
    ) -> std::result::Result<SignalSample, FrameRejection>;

    /// Movement over the newest `lookback` samples
    ///
    /// `Ok(None)` means the window does not yield a usable movement this
    /// frame (too short, or no tracked component is moving).
    fn motion(&self, history: &BoundedHistory<SignalSample>, lookback: usize) -> Result<Option<Motion>>;

    /// Raw per-frame direction for a movement
    fn classify(&self, movement: &Movement) -> Result<Direction>;

    fn rep_pattern(&self) -> RepPattern;
}

/// Error for a sample or movement of the wrong shape
pub(crate) fn shape_error(kind: ExerciseKind, expected: &str, sample: &SignalSample) -> Error {
    Error::SignalShape {
        exercise: kind.to_string(),
        detail: format!("expected {expected} sample, got {}", sample.shape()),
    }
}

/// Newest-minus-oldest delta and newest value of one sample component
pub(crate) fn window_delta<F>(
    history: &BoundedHistory<SignalSample>,
    lookback: usize,
    component: F,
) -> Result<Option<(f64, f64)>>
where
    F: Fn(&SignalSample) -> Result<f64>,
{
    if lookback < 2 || history.len() < lookback {
        return Ok(None);
    }

    let mut window = history.recent(lookback);
    let (Some(oldest), Some(newest)) = (window.next(), window.next_back()) else {
        return Ok(None);
    };

    let oldest = component(oldest)?;
    let newest = component(newest)?;
    Ok(Some((newest - oldest, newest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_core::Timestamp;

    fn event(direction: Direction, level: f64) -> DirectionEvent {
        DirectionEvent::new(direction, Timestamp::from_nanos(0), level)
    }

    fn events(entries: &[(Direction, f64)]) -> BoundedHistory<DirectionEvent> {
        let mut history = BoundedHistory::new(10);
        for &(direction, level) in entries {
            history.push(event(direction, level));
        }
        history
    }

    #[test]
    fn test_exercise_names_parse() {
        assert_eq!("Pull Ups".parse::<ExerciseKind>().unwrap(), ExerciseKind::PullUp);
        assert_eq!("pull_up".parse::<ExerciseKind>().unwrap(), ExerciseKind::PullUp);
        assert_eq!("Bicep Curls".parse::<ExerciseKind>().unwrap(), ExerciseKind::BicepCurl);
        assert_eq!("squats".parse::<ExerciseKind>().unwrap(), ExerciseKind::Squat);
        assert_eq!("jumping-jacks".parse::<ExerciseKind>().unwrap(), ExerciseKind::JumpingJack);
        assert!("No Selected Exercise".parse::<ExerciseKind>().is_err());

        for kind in ExerciseKind::ALL {
            assert_eq!(kind.to_string().parse::<ExerciseKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_profiles_report_their_kind() {
        let config = CounterConfig::default();
        for kind in ExerciseKind::ALL {
            assert_eq!(kind.profile(&config).kind(), kind);
        }
    }

    #[test]
    fn test_pattern_uses_newest_two() {
        let pattern = RepPattern::new(Direction::Down, Direction::Up);

        assert!(pattern.match_events(&events(&[(Direction::Down, -30.0)])).is_none());

        let (first, second) = pattern
            .match_events(&events(&[(Direction::Up, 0.0), (Direction::Down, -30.0), (Direction::Up, -70.0)]))
            .unwrap();
        assert_eq!(first.level, -30.0);
        assert_eq!(second.level, -70.0);

        assert!(pattern
            .match_events(&events(&[(Direction::Down, -30.0), (Direction::Stable, -40.0), (Direction::Up, -70.0)]))
            .is_none());
    }

    #[test]
    fn test_pattern_plateau_collapses() {
        let strict = RepPattern::new(Direction::Up, Direction::Down);
        let tolerant = strict.with_plateau();
        let history = events(&[(Direction::Up, 114.0), (Direction::Stable, 30.0), (Direction::Down, 66.0)]);

        assert!(strict.match_events(&history).is_none());

        let (first, second) = tolerant.match_events(&history).unwrap();
        assert_eq!(first.direction, Direction::Up);
        assert_eq!(first.level, 114.0);
        assert_eq!(second.level, 66.0);

        // Without a plateau the middle entry is the first phase
        let direct = events(&[(Direction::Down, 150.0), (Direction::Up, 114.0), (Direction::Down, 66.0)]);
        let (first, _) = tolerant.match_events(&direct).unwrap();
        assert_eq!(first.level, 114.0);
    }

    #[test]
    fn test_non_finite_detection() {
        assert_eq!(SignalSample::Scalar(1.0).non_finite(), None);
        assert!(SignalSample::Arms { left: 0.0, right: f64::NAN }
            .non_finite()
            .is_some());
        assert_eq!(
            SignalSample::Jack {
                left_ankle_x: 0.0,
                right_ankle_x: f64::INFINITY,
                wrist_y: 0.0
            }
            .non_finite(),
            Some(f64::INFINITY)
        );
    }

    #[test]
    fn test_window_delta() {
        let mut history = BoundedHistory::new(30);
        for v in [0.0, 1.0, 2.0, 3.0] {
            history.push(SignalSample::Scalar(v));
        }
        let scalar = |s: &SignalSample| match s {
            SignalSample::Scalar(v) => Ok(*v),
            other => Err(shape_error(ExerciseKind::PullUp, "scalar", other)),
        };

        assert_eq!(window_delta(&history, 5, scalar).unwrap(), None);

        history.push(SignalSample::Scalar(10.0));
        assert_eq!(window_delta(&history, 5, scalar).unwrap(), Some((10.0, 10.0)));

        history.push(SignalSample::Arms { left: 0.0, right: 0.0 });
        assert!(window_delta(&history, 5, scalar).is_err());
    }
}
