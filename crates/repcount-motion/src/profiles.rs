//! Concrete exercise profiles.
//!
//! Sign conventions, in image coordinates (y grows downwards):
//!
//! - **Pull-ups**: average wrist minus average shoulder. Hanging gives a
//!   negative value; pulling up brings the shoulders towards the wrists, so
//!   the signal rises (UP). A rep is a lowering phase followed by a pull.
//! - **Bicep curls**: wrist minus shoulder for the arm that is moving. Curling
//!   lifts the wrist, so the signal falls (DOWN); lowering brings it back UP.
//! - **Squats**: hip-knee vertical distance. The descent shrinks it and is
//!   classified UP (contraction); standing back up grows it (DOWN). A rep
//!   closes on the rise, tolerating a pause at the bottom.
//! - **Jumping jacks**: for a subject facing the camera, opening moves the
//!   left ankle towards +x, the right ankle towards -x and the wrists up.
//!   Opening is UP, closing is DOWN.

use repcount_core::{Axis, CounterConfig, Error, JackThresholds, KeypointFrame, Result};

use crate::direction::Direction;
use crate::exercise::{
    shape_error, window_delta, ExerciseKind, ExerciseProfile, Motion, Movement, RepPattern, SignalSample,
};
use crate::extractor::{FrameRejection, KeypointExtractor};
use crate::history::BoundedHistory;
use crate::metrics::{midpoint, Arm, ArmJoints, LegJoints, ARM_JOINTS, JACK_JOINTS, LEG_JOINTS};

fn scalar_component(kind: ExerciseKind) -> impl Fn(&SignalSample) -> Result<f64> {
    move |sample: &SignalSample| match sample {
        SignalSample::Scalar(v) => Ok(*v),
        other => Err(shape_error(kind, "scalar", other)),
    }
}

fn scalar_movement(kind: ExerciseKind, movement: &Movement) -> Result<f64> {
    match movement {
        Movement::Scalar(m) => Ok(*m),
        Movement::Jack { .. } => Err(Error::SignalShape {
            exercise: kind.to_string(),
            detail: "expected scalar movement, got jack".into(),
        }),
    }
}

/// Scalar motion over the window; level is the newest sample
fn scalar_motion(
    kind: ExerciseKind,
    history: &BoundedHistory<SignalSample>,
    lookback: usize,
) -> Result<Option<Motion>> {
    Ok(window_delta(history, lookback, scalar_component(kind))?.map(|(delta, newest)| Motion {
        movement: Movement::Scalar(delta),
        level: newest,
    }))
}

/// Pull-ups: averaged wrist-shoulder difference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullUpProfile {
    pub axis: Axis,
    pub movement_threshold: f64,
}

impl PullUpProfile {
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            axis: config.arm_axis,
            movement_threshold: config.movement_threshold,
        }
    }
}

impl ExerciseProfile for PullUpProfile {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::PullUp
    }

    fn extract(
        &self,
        extractor: &KeypointExtractor,
        frame: Option<&KeypointFrame>,
    ) -> std::result::Result<SignalSample, FrameRejection> {
        let joints = ArmJoints::from(extractor.select(frame, ARM_JOINTS)?.points);
        Ok(SignalSample::Scalar(joints.wrist_shoulder_diff(Arm::Both, self.axis)))
    }

    fn motion(&self, history: &BoundedHistory<SignalSample>, lookback: usize) -> Result<Option<Motion>> {
        scalar_motion(self.kind(), history, lookback)
    }

    fn classify(&self, movement: &Movement) -> Result<Direction> {
        let m = scalar_movement(self.kind(), movement)?;
        Ok(Direction::classify(m, self.movement_threshold))
    }

    fn rep_pattern(&self) -> RepPattern {
        RepPattern::new(Direction::Down, Direction::Up)
    }
}

/// Bicep curls: tracks whichever arm is moving
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BicepCurlProfile {
    pub axis: Axis,
    pub movement_threshold: f64,
    /// Cumulative per-arm movement over the window needed to track an arm
    pub min_arm_movement: f64,
}

impl BicepCurlProfile {
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            axis: config.arm_axis,
            movement_threshold: config.movement_threshold,
            min_arm_movement: config.min_arm_movement,
        }
    }

    fn arms(&self, sample: &SignalSample) -> Result<(f64, f64)> {
        match sample {
            SignalSample::Arms { left, right } => Ok((*left, *right)),
            other => Err(shape_error(self.kind(), "arms", other)),
        }
    }

    /// Pick the arm to track from the newest `lookback` samples
    ///
    /// Compares the cumulative absolute frame-to-frame movement of each arm.
    /// Returns `None` while neither arm reaches `min_arm_movement`.
    pub fn select_arm(&self, history: &BoundedHistory<SignalSample>, lookback: usize) -> Result<Option<Arm>> {
        let mut left_total = 0.0;
        let mut right_total = 0.0;
        let mut previous: Option<(f64, f64)> = None;

        for sample in history.recent(lookback) {
            let (left, right) = self.arms(sample)?;
            if let Some((prev_left, prev_right)) = previous {
                left_total += (left - prev_left).abs();
                right_total += (right - prev_right).abs();
            }
            previous = Some((left, right));
        }

        if left_total < self.min_arm_movement && right_total < self.min_arm_movement {
            return Ok(None);
        }

        let arm = if left_total > right_total {
            Arm::Left
        } else if right_total > left_total {
            Arm::Right
        } else {
            Arm::Both
        };
        Ok(Some(arm))
    }
}

impl ExerciseProfile for BicepCurlProfile {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::BicepCurl
    }

    fn extract(
        &self,
        extractor: &KeypointExtractor,
        frame: Option<&KeypointFrame>,
    ) -> std::result::Result<SignalSample, FrameRejection> {
        let joints = ArmJoints::from(extractor.select(frame, ARM_JOINTS)?.points);
        Ok(SignalSample::Arms {
            left: joints.wrist_shoulder_diff(Arm::Left, self.axis),
            right: joints.wrist_shoulder_diff(Arm::Right, self.axis),
        })
    }

    fn motion(&self, history: &BoundedHistory<SignalSample>, lookback: usize) -> Result<Option<Motion>> {
        if lookback < 2 || history.len() < lookback {
            return Ok(None);
        }
        let Some(arm) = self.select_arm(history, lookback)? else {
            tracing::trace!("No arm moving enough to track");
            return Ok(None);
        };

        let tracked = |sample: &SignalSample| -> Result<f64> {
            let (left, right) = self.arms(sample)?;
            Ok(match arm {
                Arm::Left => left,
                Arm::Right => right,
                Arm::Both => (left + right) / 2.0,
            })
        };

        Ok(window_delta(history, lookback, tracked)?.map(|(delta, newest)| Motion {
            movement: Movement::Scalar(delta),
            level: newest,
        }))
    }

    fn classify(&self, movement: &Movement) -> Result<Direction> {
        let m = scalar_movement(self.kind(), movement)?;
        Ok(Direction::classify(m, self.movement_threshold))
    }

    fn rep_pattern(&self) -> RepPattern {
        RepPattern::new(Direction::Down, Direction::Up)
    }
}

/// Squats: hip-knee vertical distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquatProfile {
    pub movement_threshold: f64,
}

impl SquatProfile {
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            movement_threshold: config.movement_threshold,
        }
    }
}

impl ExerciseProfile for SquatProfile {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Squat
    }

    fn extract(
        &self,
        extractor: &KeypointExtractor,
        frame: Option<&KeypointFrame>,
    ) -> std::result::Result<SignalSample, FrameRejection> {
        let joints = LegJoints::from(extractor.select(frame, LEG_JOINTS)?.points);
        Ok(SignalSample::Scalar(joints.hip_knee_diff()))
    }

    fn motion(&self, history: &BoundedHistory<SignalSample>, lookback: usize) -> Result<Option<Motion>> {
        scalar_motion(self.kind(), history, lookback)
    }

    fn classify(&self, movement: &Movement) -> Result<Direction> {
        // A shrinking hip-knee distance is the descent.
        let m = scalar_movement(self.kind(), movement)?;
        Ok(Direction::classify(-m, self.movement_threshold))
    }

    fn rep_pattern(&self) -> RepPattern {
        RepPattern::new(Direction::Up, Direction::Down).with_plateau()
    }
}

/// Jumping jacks: both ankles and the wrists must move together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpingJackProfile {
    pub thresholds: JackThresholds,
}

impl JumpingJackProfile {
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            thresholds: config.jack_thresholds,
        }
    }

    fn components(&self, sample: &SignalSample) -> Result<(f64, f64, f64)> {
        match sample {
            SignalSample::Jack {
                left_ankle_x,
                right_ankle_x,
                wrist_y,
            } => Ok((*left_ankle_x, *right_ankle_x, *wrist_y)),
            other => Err(shape_error(self.kind(), "jack", other)),
        }
    }
}

impl ExerciseProfile for JumpingJackProfile {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::JumpingJack
    }

    fn extract(
        &self,
        extractor: &KeypointExtractor,
        frame: Option<&KeypointFrame>,
    ) -> std::result::Result<SignalSample, FrameRejection> {
        let [left_ankle, right_ankle, left_wrist, right_wrist] = extractor.select(frame, JACK_JOINTS)?.points;
        Ok(SignalSample::Jack {
            left_ankle_x: left_ankle.x,
            right_ankle_x: right_ankle.x,
            wrist_y: midpoint(&left_wrist, &right_wrist, Axis::Vertical),
        })
    }

    fn motion(&self, history: &BoundedHistory<SignalSample>, lookback: usize) -> Result<Option<Motion>> {
        if lookback < 2 || history.len() < lookback {
            return Ok(None);
        }

        let mut window = history.recent(lookback);
        let (Some(oldest), Some(newest)) = (window.next(), window.next_back()) else {
            return Ok(None);
        };
        let (old_left, old_right, old_wrist) = self.components(oldest)?;
        let (left, right, wrist) = self.components(newest)?;

        Ok(Some(Motion {
            movement: Movement::Jack {
                left_ankle: left - old_left,
                right_ankle: right - old_right,
                wrist: wrist - old_wrist,
            },
            // Wrist height, so that opening raises the level
            level: -wrist,
        }))
    }

    fn classify(&self, movement: &Movement) -> Result<Direction> {
        let Movement::Jack {
            left_ankle,
            right_ankle,
            wrist,
        } = *movement
        else {
            return Err(Error::SignalShape {
                exercise: self.kind().to_string(),
                detail: "expected jack movement, got scalar".into(),
            });
        };
        let t = &self.thresholds;

        let opening = left_ankle > t.left_ankle && right_ankle < -t.right_ankle && wrist < -t.wrist;
        let closing = left_ankle < -t.left_ankle && right_ankle > t.right_ankle && wrist > t.wrist;

        Ok(if opening {
            Direction::Up
        } else if closing {
            Direction::Down
        } else {
            Direction::Stable
        })
    }

    fn rep_pattern(&self) -> RepPattern {
        RepPattern::new(Direction::Up, Direction::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_core::{Keypoint, KeypointDetection};

    fn history_of(samples: impl IntoIterator<Item = SignalSample>) -> BoundedHistory<SignalSample> {
        let mut history = BoundedHistory::new(30);
        for sample in samples {
            history.push(sample);
        }
        history
    }

    fn arms_frame(shoulder_y: f64, left_wrist_y: f64, right_wrist_y: f64) -> KeypointFrame {
        KeypointFrame::uniform(0.0, 0.0, 0.9)
            .with(Keypoint::LeftShoulder, KeypointDetection::new(100.0, shoulder_y, 0.9))
            .with(Keypoint::RightShoulder, KeypointDetection::new(200.0, shoulder_y, 0.9))
            .with(Keypoint::LeftWrist, KeypointDetection::new(90.0, left_wrist_y, 0.9))
            .with(Keypoint::RightWrist, KeypointDetection::new(210.0, right_wrist_y, 0.9))
    }

    #[test]
    fn test_pull_up_extracts_average_diff() {
        let profile = PullUpProfile::from_config(&CounterConfig::default());
        let frame = arms_frame(300.0, 220.0, 240.0);

        let sample = profile.extract(&KeypointExtractor::default(), Some(&frame)).unwrap();
        assert_eq!(sample, SignalSample::Scalar(-70.0));
    }

    #[test]
    fn test_pull_up_classification() {
        let profile = PullUpProfile::from_config(&CounterConfig::default());
        assert_eq!(profile.classify(&Movement::Scalar(15.0)).unwrap(), Direction::Up);
        assert_eq!(profile.classify(&Movement::Scalar(-15.0)).unwrap(), Direction::Down);
        assert_eq!(profile.classify(&Movement::Scalar(3.0)).unwrap(), Direction::Stable);
        assert!(profile
            .classify(&Movement::Jack {
                left_ankle: 0.0,
                right_ankle: 0.0,
                wrist: 0.0
            })
            .is_err());
    }

    #[test]
    fn test_scalar_motion_uses_lookback_window() {
        let profile = PullUpProfile::from_config(&CounterConfig::default());
        let history = history_of([0.0, -10.0, -20.0, -30.0, -40.0, -55.0].map(SignalSample::Scalar));

        let motion = profile.motion(&history, 5).unwrap().unwrap();
        assert_eq!(motion.movement, Movement::Scalar(-45.0));
        assert_eq!(motion.level, -55.0);
    }

    #[test]
    fn test_bicep_curl_tracks_moving_arm() {
        let profile = BicepCurlProfile::from_config(&CounterConfig::default());
        let history = history_of((0..5).map(|i| SignalSample::Arms {
            left: 250.0 - 20.0 * i as f64,
            right: 250.0 + (i % 2) as f64,
        }));

        assert_eq!(profile.select_arm(&history, 5).unwrap(), Some(Arm::Left));

        let motion = profile.motion(&history, 5).unwrap().unwrap();
        assert_eq!(motion.movement, Movement::Scalar(-80.0));
        assert_eq!(motion.level, 170.0);
        assert_eq!(profile.classify(&motion.movement).unwrap(), Direction::Down);
    }

    #[test]
    fn test_bicep_curl_idle_arms_yield_no_motion() {
        let profile = BicepCurlProfile::from_config(&CounterConfig::default());
        let history = history_of((0..5).map(|i| SignalSample::Arms {
            left: 250.0 + (i % 2) as f64,
            right: 250.0 - (i % 2) as f64,
        }));

        assert_eq!(profile.select_arm(&history, 5).unwrap(), None);
        assert_eq!(profile.motion(&history, 5).unwrap(), None);
    }

    #[test]
    fn test_bicep_curl_equal_arms_average() {
        let profile = BicepCurlProfile::from_config(&CounterConfig::default());
        let history = history_of((0..5).map(|i| SignalSample::Arms {
            left: 200.0 - 10.0 * i as f64,
            right: 260.0 - 10.0 * i as f64,
        }));

        assert_eq!(profile.select_arm(&history, 5).unwrap(), Some(Arm::Both));
        let motion = profile.motion(&history, 5).unwrap().unwrap();
        assert_eq!(motion.movement, Movement::Scalar(-40.0));
        assert_eq!(motion.level, 190.0);
    }

    #[test]
    fn test_squat_signal_and_pattern() {
        let profile = SquatProfile::from_config(&CounterConfig::default());
        let frame = KeypointFrame::uniform(0.0, 0.0, 0.9)
            .with(Keypoint::LeftHip, KeypointDetection::new(0.0, 300.0, 0.9))
            .with(Keypoint::RightHip, KeypointDetection::new(0.0, 300.0, 0.9))
            .with(Keypoint::LeftKnee, KeypointDetection::new(0.0, 450.0, 0.9))
            .with(Keypoint::RightKnee, KeypointDetection::new(0.0, 450.0, 0.9));

        let sample = profile.extract(&KeypointExtractor::default(), Some(&frame)).unwrap();
        assert_eq!(sample, SignalSample::Scalar(150.0));

        // Descending closes the gap, rising opens it again.
        assert_eq!(profile.classify(&Movement::Scalar(-15.0)).unwrap(), Direction::Up);
        assert_eq!(profile.classify(&Movement::Scalar(15.0)).unwrap(), Direction::Down);
        assert_eq!(profile.classify(&Movement::Scalar(5.0)).unwrap(), Direction::Stable);

        let pattern = profile.rep_pattern();
        assert_eq!((pattern.first, pattern.second), (Direction::Up, Direction::Down));
        assert!(pattern.tolerate_plateau);
    }

    #[test]
    fn test_jumping_jack_requires_all_components() {
        let profile = JumpingJackProfile::from_config(&CounterConfig::default());
        let opening = Movement::Jack {
            left_ankle: 20.0,
            right_ankle: -20.0,
            wrist: -40.0,
        };
        let closing = Movement::Jack {
            left_ankle: -20.0,
            right_ankle: 20.0,
            wrist: 40.0,
        };
        let legs_only = Movement::Jack {
            left_ankle: 20.0,
            right_ankle: -20.0,
            wrist: 2.0,
        };

        assert_eq!(profile.classify(&opening).unwrap(), Direction::Up);
        assert_eq!(profile.classify(&closing).unwrap(), Direction::Down);
        assert_eq!(profile.classify(&legs_only).unwrap(), Direction::Stable);
        assert!(profile.classify(&Movement::Scalar(20.0)).is_err());
    }

    #[test]
    fn test_jumping_jack_motion() {
        let profile = JumpingJackProfile::from_config(&CounterConfig::default());
        let history = history_of((0..5).map(|i| SignalSample::Jack {
            left_ankle_x: 300.0 + 10.0 * i as f64,
            right_ankle_x: 200.0 - 10.0 * i as f64,
            wrist_y: 400.0 - 50.0 * i as f64,
        }));

        let motion = profile.motion(&history, 5).unwrap().unwrap();
        assert_eq!(
            motion.movement,
            Movement::Jack {
                left_ankle: 40.0,
                right_ankle: -40.0,
                wrist: -200.0
            }
        );
        assert_eq!(motion.level, -200.0);
        assert_eq!(profile.classify(&motion.movement).unwrap(), Direction::Up);
    }

    #[test]
    fn test_mismatched_sample_is_an_error() {
        let profile = SquatProfile::from_config(&CounterConfig::default());
        let history = history_of((0..5).map(|_| SignalSample::Arms { left: 0.0, right: 0.0 }));
        assert!(profile.motion(&history, 5).is_err());
    }
}
