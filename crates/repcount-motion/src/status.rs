//! Status labels surfaced to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::extractor::FrameRejection;

/// Per-frame status, stable across exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Confirmed UP
    PullingUp,
    /// Confirmed DOWN
    LoweringDown,
    Stable,
    /// No frame analyzed yet
    #[default]
    Neutral,
    NoPerson,
    InvalidKeypoints,
    LowConfidence,
    /// Internal error while analyzing a frame
    Error,
    /// Not enough history to measure movement
    Starting,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::PullingUp => "pulling_up",
            Status::LoweringDown => "lowering_down",
            Status::Stable => "stable",
            Status::Neutral => "neutral",
            Status::NoPerson => "no_person",
            Status::InvalidKeypoints => "invalid_keypoints",
            Status::LowConfidence => "low_confidence",
            Status::Error => "error",
            Status::Starting => "starting",
        }
    }

    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => Status::PullingUp,
            Direction::Down => Status::LoweringDown,
            Direction::Stable => Status::Stable,
        }
    }

    /// Whether the frame was skipped without touching the counter state
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Status::NoPerson | Status::InvalidKeypoints | Status::LowConfidence
        )
    }
}

impl From<FrameRejection> for Status {
    fn from(rejection: FrameRejection) -> Self {
        match rejection {
            FrameRejection::NoPerson => Status::NoPerson,
            FrameRejection::InvalidKeypoints => Status::InvalidKeypoints,
            FrameRejection::LowConfidence => Status::LowConfidence,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_wire_names() {
        for status in [
            Status::PullingUp,
            Status::LoweringDown,
            Status::Stable,
            Status::Neutral,
            Status::NoPerson,
            Status::InvalidKeypoints,
            Status::LowConfidence,
            Status::Error,
            Status::Starting,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_rejections_map_to_status() {
        for rejection in [
            FrameRejection::NoPerson,
            FrameRejection::InvalidKeypoints,
            FrameRejection::LowConfidence,
        ] {
            let status = Status::from(rejection);
            assert!(status.is_rejection());
            assert_eq!(status.as_str(), rejection.as_str());
        }
    }

    #[test]
    fn test_direction_status() {
        assert_eq!(Status::from_direction(Direction::Up).to_string(), "pulling_up");
        assert_eq!(Status::from_direction(Direction::Down).to_string(), "lowering_down");
        assert_eq!(Status::from_direction(Direction::Stable), Status::Stable);
        assert_eq!(Status::default(), Status::Neutral);
    }
}
