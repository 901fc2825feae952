//! Angle conversions, normalization, and quaternion twist extraction.

use glam::Quat;
use std::f32::consts::TAU;

/// Convert degrees to radians.
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// Normalize an angle in radians to the range `[0, 2π)`.
///
/// Works for any finite input, including large accumulated angles and
/// negative angles.
pub fn normalize_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can return exactly TAU when the input is a tiny negative
    // value, due to rounding.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Approximate equality for angles and other small scalars.
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

/// Extract the rotation angle about the +Y axis from a unit quaternion,
/// normalized to `[0, 2π)`.
///
/// This is the twist component of a swing-twist decomposition about Y. For a
/// rotation of the form `tilt-about-X * yaw-about-Y` (the shape produced by
/// tilting a body and then spinning it about its local vertical axis), the
/// result is exactly the accumulated yaw.
pub fn twist_about_y(q: Quat) -> f32 {
    if q.y == 0.0 && q.w == 0.0 {
        // Pure swing perpendicular to Y: no twist component.
        return 0.0;
    }
    normalize_angle(2.0 * q.y.atan2(q.w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_deg_to_rad_known_values() {
        assert!(approx_eq(deg_to_rad(180.0), PI, 1e-6));
        assert!(approx_eq(deg_to_rad(90.0), FRAC_PI_2, 1e-6));
        assert!(approx_eq(deg_to_rad(0.0), 0.0, 1e-6));
        assert!(approx_eq(deg_to_rad(27.0), 0.471_238_9, 1e-6));
    }

    #[test]
    fn test_normalize_angle_in_range() {
        for &angle in &[0.0, 1.0, TAU - 1e-3, TAU, TAU + 1.0, -1.0, -10.0 * TAU, 100.0] {
            let n = normalize_angle(angle);
            assert!(
                (0.0..TAU).contains(&n),
                "normalize_angle({angle}) = {n} out of [0, 2*pi)"
            );
        }
    }

    #[test]
    fn test_normalize_angle_preserves_direction() {
        assert!(approx_eq(normalize_angle(-FRAC_PI_2), 1.5 * PI, 1e-6));
        assert!(approx_eq(normalize_angle(TAU + 0.25), 0.25, 1e-5));
    }

    #[test]
    fn test_twist_recovers_pure_yaw() {
        for &yaw in &[0.0, 0.5, 2.0, PI, 5.0] {
            let q = Quat::from_rotation_y(yaw);
            assert!(
                approx_eq(twist_about_y(q), normalize_angle(yaw), 1e-5),
                "yaw {yaw} not recovered"
            );
        }
    }

    #[test]
    fn test_twist_ignores_x_tilt() {
        // Tilt then spin, the shape a tilted planet's orientation takes.
        let tilt = deg_to_rad(27.0);
        let yaw = 2.0;
        let q = Quat::from_rotation_x(tilt) * Quat::from_rotation_y(yaw);
        assert!(approx_eq(twist_about_y(q), yaw, 1e-5));
    }

    #[test]
    fn test_twist_of_accumulated_rotations() {
        // Many small composed increments should agree with the analytic sum.
        let step = 0.02;
        let mut q = Quat::IDENTITY;
        for _ in 0..100 {
            q = q * Quat::from_rotation_y(step);
        }
        assert!(approx_eq(twist_about_y(q), normalize_angle(2.0), 1e-4));
    }

    #[test]
    fn test_twist_of_identity_is_zero() {
        assert_eq!(twist_about_y(Quat::IDENTITY), 0.0);
    }
}
