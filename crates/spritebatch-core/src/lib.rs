//! Spritebatch Core
//!
//! Shared utilities for the spritebatch crates: logging setup, profiling
//! scopes and the math/geometry types used at the host boundary.

pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
