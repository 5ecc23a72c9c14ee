//! Yardsim Animation Helpers
//!
//! Easing curves and piecewise motion paths used to derive actor positions
//! from a query time.
//!
//! # Features
//!
//! - **Easing**: Normalized progress curves (linear, quadratic in/out)
//! - **Motion Paths**: Time-indexed segments between scene points
//! - **Pure Sampling**: A position depends only on the query time

pub mod easing;
pub mod motion;

pub use easing::{lerp, Easing};
pub use motion::{MotionPath, PathSegment, Point};
