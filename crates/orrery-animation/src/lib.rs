//! Per-tick animation driver for the planetary system.
//!
//! One tick applies the fixed self-rotation and orbit increments to every
//! body, then asks the frame sink to present. Tick rate is whatever cadence
//! the host invokes [`AnimationDriver::tick`] at, nominally the display
//! refresh; speeds are radians per tick and are deliberately not scaled by
//! elapsed wall-clock time.

pub mod driver;

pub use driver::{AnimationDriver, FrameSink};
