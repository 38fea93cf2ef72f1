//! # Repcount-Core
//!
//! Core types and utilities for counting exercise repetitions from 2D body
//! keypoints produced by an external pose-estimation model.
//!
//! The pose model is treated as a black box: each camera frame yields either
//! nothing (no person) or an ordered set of 17 COCO keypoints with a
//! confidence score. Everything downstream of that lives in
//! `repcount-motion`.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::*;
pub use config::*;
pub use error::{Error, Result};
pub use types::*;
