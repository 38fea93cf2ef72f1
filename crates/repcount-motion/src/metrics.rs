//! Positional metrics derived from selected joints.
//!
//! All values are in image pixels. Image y grows downwards, so a wrist above
//! its shoulder has a negative vertical wrist-shoulder difference.

use repcount_core::{Axis, Keypoint, KeypointDetection};
use serde::{Deserialize, Serialize};

/// Joints consulted by arm exercises, in [`ArmJoints`] order
pub const ARM_JOINTS: [Keypoint; 4] = [
    Keypoint::LeftShoulder,
    Keypoint::RightShoulder,
    Keypoint::LeftWrist,
    Keypoint::RightWrist,
];

/// Joints consulted by squats, in [`LegJoints`] order
pub const LEG_JOINTS: [Keypoint; 4] = [
    Keypoint::LeftHip,
    Keypoint::RightHip,
    Keypoint::LeftKnee,
    Keypoint::RightKnee,
];

/// Joints consulted by jumping jacks
pub const JACK_JOINTS: [Keypoint; 4] = [
    Keypoint::LeftAnkle,
    Keypoint::RightAnkle,
    Keypoint::LeftWrist,
    Keypoint::RightWrist,
];

/// Which arm(s) an arm metric is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arm {
    Left,
    Right,
    Both,
}

/// Shoulders and wrists of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmJoints {
    pub left_shoulder: KeypointDetection,
    pub right_shoulder: KeypointDetection,
    pub left_wrist: KeypointDetection,
    pub right_wrist: KeypointDetection,
}

impl From<[KeypointDetection; 4]> for ArmJoints {
    fn from([left_shoulder, right_shoulder, left_wrist, right_wrist]: [KeypointDetection; 4]) -> Self {
        Self {
            left_shoulder,
            right_shoulder,
            left_wrist,
            right_wrist,
        }
    }
}

impl ArmJoints {
    /// Wrist minus shoulder along `axis`, for one arm or averaged over both
    pub fn wrist_shoulder_diff(&self, arm: Arm, axis: Axis) -> f64 {
        let (shoulder, wrist) = match arm {
            Arm::Left => (
                self.left_shoulder.along(axis),
                self.left_wrist.along(axis),
            ),
            Arm::Right => (
                self.right_shoulder.along(axis),
                self.right_wrist.along(axis),
            ),
            Arm::Both => (
                midpoint(&self.left_shoulder, &self.right_shoulder, axis),
                midpoint(&self.left_wrist, &self.right_wrist, axis),
            ),
        };
        wrist - shoulder
    }
}

/// Hips and knees of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegJoints {
    pub left_hip: KeypointDetection,
    pub right_hip: KeypointDetection,
    pub left_knee: KeypointDetection,
    pub right_knee: KeypointDetection,
}

impl From<[KeypointDetection; 4]> for LegJoints {
    fn from([left_hip, right_hip, left_knee, right_knee]: [KeypointDetection; 4]) -> Self {
        Self {
            left_hip,
            right_hip,
            left_knee,
            right_knee,
        }
    }
}

impl LegJoints {
    /// Vertical distance between average hip and average knee height
    ///
    /// Large when standing, shrinks towards zero at the bottom of a squat.
    pub fn hip_knee_diff(&self) -> f64 {
        let hip = midpoint(&self.left_hip, &self.right_hip, Axis::Vertical);
        let knee = midpoint(&self.left_knee, &self.right_knee, Axis::Vertical);
        (hip - knee).abs()
    }
}

/// Average of two joints along `axis`
pub fn midpoint(a: &KeypointDetection, b: &KeypointDetection, axis: Axis) -> f64 {
    (a.along(axis) + b.along(axis)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f64, y: f64) -> KeypointDetection {
        KeypointDetection::new(x, y, 0.9)
    }

    fn arms() -> ArmJoints {
        ArmJoints::from([kp(100.0, 200.0), kp(200.0, 210.0), kp(90.0, 150.0), kp(210.0, 170.0)])
    }

    #[test]
    fn test_wrist_shoulder_diff_vertical() {
        let arms = arms();
        // Average wrist y 160, average shoulder y 205
        assert!((arms.wrist_shoulder_diff(Arm::Both, Axis::Vertical) + 45.0).abs() < 1e-9);
        assert!((arms.wrist_shoulder_diff(Arm::Left, Axis::Vertical) + 50.0).abs() < 1e-9);
        assert!((arms.wrist_shoulder_diff(Arm::Right, Axis::Vertical) + 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrist_shoulder_diff_horizontal() {
        let arms = arms();
        assert!((arms.wrist_shoulder_diff(Arm::Left, Axis::Horizontal) + 10.0).abs() < 1e-9);
        assert!((arms.wrist_shoulder_diff(Arm::Right, Axis::Horizontal) - 10.0).abs() < 1e-9);
        assert!(arms.wrist_shoulder_diff(Arm::Both, Axis::Horizontal).abs() < 1e-9);
    }

    #[test]
    fn test_hip_knee_diff_is_absolute() {
        let standing = LegJoints::from([kp(0.0, 300.0), kp(0.0, 310.0), kp(0.0, 420.0), kp(0.0, 430.0)]);
        assert!((standing.hip_knee_diff() - 120.0).abs() < 1e-9);

        let inverted = LegJoints::from([kp(0.0, 420.0), kp(0.0, 430.0), kp(0.0, 300.0), kp(0.0, 310.0)]);
        assert!((inverted.hip_knee_diff() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_joint_sets_are_distinct() {
        for set in [ARM_JOINTS, LEG_JOINTS, JACK_JOINTS] {
            for (i, a) in set.iter().enumerate() {
                assert!(set[i + 1..].iter().all(|b| b != a));
            }
        }
    }
}
