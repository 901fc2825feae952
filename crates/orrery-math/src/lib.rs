//! Small angle utilities shared by the scene and animation crates.

pub mod angle;

pub use angle::{approx_eq, deg_to_rad, normalize_angle, twist_about_y};
