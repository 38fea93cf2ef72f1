//! Keypoint selection and confidence gating.
//!
//! The extractor is the only place that looks at raw detections. It picks the
//! joints an exercise needs out of a frame and decides whether the frame is
//! usable at all; the exercise profiles then reduce the selected joints to a
//! signal sample (see [`crate::metrics`]).

use std::fmt;

use repcount_core::{CounterConfig, Keypoint, KeypointDetection, KeypointFrame};
use serde::{Deserialize, Serialize};

/// Why a frame could not produce a signal sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRejection {
    /// No detection for this frame
    NoPerson,
    /// Too few keypoints, or a required joint is missing
    InvalidKeypoints,
    /// A required joint is below the confidence threshold
    LowConfidence,
}

impl FrameRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameRejection::NoPerson => "no_person",
            FrameRejection::InvalidKeypoints => "invalid_keypoints",
            FrameRejection::LowConfidence => "low_confidence",
        }
    }
}

impl fmt::Display for FrameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joints selected from one frame, in request order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSelection<const N: usize> {
    pub points: [KeypointDetection; N],
    /// Minimum confidence among the selected joints
    pub confidence: f64,
}

/// Confidence-gated joint selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointExtractor {
    min_confidence: f64,
}

impl KeypointExtractor {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.min_confidence)
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Select `joints` from `frame`
    ///
    /// Aggregate confidence is the minimum over the selected joints, so a
    /// single poorly tracked joint invalidates the whole sample.
    pub fn select<const N: usize>(
        &self,
        frame: Option<&KeypointFrame>,
        joints: [Keypoint; N],
    ) -> Result<JointSelection<N>, FrameRejection> {
        let frame = match frame {
            Some(frame) if !frame.is_empty() => frame,
            _ => return Err(FrameRejection::NoPerson),
        };

        if !frame.is_complete() {
            return Err(FrameRejection::InvalidKeypoints);
        }

        let mut points = [KeypointDetection::new(0.0, 0.0, 0.0); N];
        for (slot, joint) in points.iter_mut().zip(joints) {
            *slot = *frame.get(joint).ok_or(FrameRejection::InvalidKeypoints)?;
        }

        let confidence = points
            .iter()
            .map(|p| p.confidence)
            .fold(f64::INFINITY, |min, c| if c.is_nan() || c < min { c } else { min });

        // NaN confidence never passes the gate
        if confidence.is_nan() || confidence < self.min_confidence {
            if let Some((joint, point)) = joints
                .iter()
                .zip(&points)
                .find(|(_, p)| p.confidence.is_nan() || p.confidence < self.min_confidence)
            {
                tracing::trace!("{} confidence {:.2} below threshold", joint.name(), point.confidence);
            }
            return Err(FrameRejection::LowConfidence);
        }

        Ok(JointSelection { points, confidence })
    }
}

impl Default for KeypointExtractor {
    fn default() -> Self {
        Self::from_config(&CounterConfig::default())
    }
}
