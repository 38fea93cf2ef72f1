//! # Repcount-Motion
//!
//! Repetition counting from per-frame body keypoints.
//!
//! ## Pipeline
//!
//! 1. **Extraction** - pick the joints an exercise needs and gate them on
//!    detection confidence
//! 2. **Signal** - reduce the joints to a positional difference (or a small
//!    tuple of them)
//! 3. **Movement** - newest minus oldest sample over a short lookback window,
//!    classified as up, down or stable against a threshold band
//! 4. **Confirmation** - a direction counts only after several consecutive
//!    frames; stable frames decay progress instead of discarding it
//! 5. **Repetition** - the newest confirmed direction changes must form the
//!    exercise's pattern, cover enough range and respect a cooldown
//!
//! ## Exercises
//!
//! | Exercise      | Signal                          | Rep pattern            |
//! |---------------|---------------------------------|------------------------|
//! | Pull-ups      | wrist minus shoulder            | down, up               |
//! | Bicep curls   | wrist minus shoulder, one arm   | down, up               |
//! | Squats        | hip-knee distance, inverted     | up, down (pause ok)    |
//! | Jumping jacks | ankle x, ankle x, wrist y       | open, close            |

pub mod counter;
pub mod direction;
pub mod exercise;
pub mod extractor;
pub mod history;
pub mod metrics;
pub mod profiles;
pub mod registry;
pub mod status;

pub use counter::*;
pub use direction::*;
pub use exercise::*;
pub use extractor::*;
pub use history::*;
pub use metrics::*;
pub use profiles::*;
pub use registry::*;
pub use status::*;
