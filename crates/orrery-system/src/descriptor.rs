//! Immutable configuration records for the celestial bodies.
//!
//! Distances and radii are scene units, not astronomy; speeds are radians per
//! display tick, so effective angular velocity follows the host refresh rate.

/// Sphere radius of the sun in scene units.
pub const SUN_RADIUS: f32 = 16.0;
/// Self-rotation of the sun per tick, radians.
pub const SUN_ROTATION_PER_TICK: f32 = 0.004;
/// Asset name for the sun's surface texture.
pub const SUN_TEXTURE: &str = "sun.jpg";

/// Intensity of the point light carried by the sun.
pub const SUN_LIGHT_INTENSITY: f32 = 5000.0;
/// Falloff range of the sun's point light in scene units.
pub const SUN_LIGHT_RANGE: f32 = 5000.0;
/// Falloff exponent of the sun's point light.
pub const SUN_LIGHT_DECAY: f32 = 1.75;

/// Scene-wide ambient light intensity.
pub const AMBIENT_LIGHT_INTENSITY: f32 = 1.0;
/// Scene-wide ambient light color, the 0x333333 gray of the reference scene.
pub const AMBIENT_LIGHT_COLOR: [f32; 3] = [0.2, 0.2, 0.2];

/// Ring mesh parameters for the two ringed bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingDescriptor {
    /// Inner edge of the annulus in scene units.
    pub inner_radius: f32,
    /// Outer edge of the annulus in scene units.
    pub outer_radius: f32,
    /// Axial tilt applied to body and ring together, in degrees.
    pub tilt_degrees: f32,
    /// Asset name for the ring texture.
    pub texture: &'static str,
}

/// Static and kinematic parameters of one orbiting body.
///
/// `distance_from_sun` is a fixed radial offset along +X at construction
/// time, not a true orbital radius vector; all bodies start collinear and
/// orbit in one shared plane. Ring radii are not validated here, the
/// descriptor author is responsible for `inner_radius < outer_radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetDescriptor {
    /// Identifier for diagnostics only.
    pub name: &'static str,
    /// Sphere radius in scene units.
    pub radius: f32,
    /// Asset name for the surface texture.
    pub texture: &'static str,
    /// Radial offset from the origin along +X, in scene units. Zero is legal
    /// and produces a degenerate orbit at the origin.
    pub distance_from_sun: f32,
    /// Self-rotation per tick about the body's local Y axis, radians. Sign
    /// sets the direction.
    pub rotation_speed_per_tick: f32,
    /// Orbital revolution per tick about the pivot's Y axis, radians.
    pub orbit_speed_per_tick: f32,
    /// Ring parameters, present only for ringed bodies.
    pub ring: Option<RingDescriptor>,
}

/// The nine documented bodies, in increasing distance from the sun.
pub const PLANETS: [PlanetDescriptor; 9] = [
    PlanetDescriptor {
        name: "mercury",
        radius: 3.2,
        texture: "mercury.jpg",
        distance_from_sun: 28.0,
        rotation_speed_per_tick: 0.004,
        orbit_speed_per_tick: 0.04,
        ring: None,
    },
    PlanetDescriptor {
        name: "venus",
        radius: 5.8,
        texture: "venus.jpg",
        distance_from_sun: 44.0,
        rotation_speed_per_tick: 0.002,
        orbit_speed_per_tick: 0.015,
        ring: None,
    },
    PlanetDescriptor {
        name: "earth",
        radius: 6.0,
        texture: "earth.jpg",
        distance_from_sun: 62.0,
        rotation_speed_per_tick: 0.02,
        orbit_speed_per_tick: 0.01,
        ring: None,
    },
    PlanetDescriptor {
        name: "mars",
        radius: 4.0,
        texture: "mars.jpg",
        distance_from_sun: 78.0,
        rotation_speed_per_tick: 0.018,
        orbit_speed_per_tick: 0.008,
        ring: None,
    },
    PlanetDescriptor {
        name: "jupiter",
        radius: 12.0,
        texture: "jupiter.jpg",
        distance_from_sun: 100.0,
        rotation_speed_per_tick: 0.04,
        orbit_speed_per_tick: 0.002,
        ring: None,
    },
    PlanetDescriptor {
        name: "saturn",
        radius: 10.0,
        texture: "saturn.jpg",
        distance_from_sun: 138.0,
        rotation_speed_per_tick: 0.009,
        orbit_speed_per_tick: 0.003,
        ring: Some(RingDescriptor {
            inner_radius: 10.0,
            outer_radius: 20.0,
            tilt_degrees: 27.0,
            texture: "saturn_ring.png",
        }),
    },
    PlanetDescriptor {
        name: "uranus",
        radius: 7.0,
        texture: "uranus.jpg",
        distance_from_sun: 176.0,
        rotation_speed_per_tick: 0.03,
        orbit_speed_per_tick: 0.004,
        ring: Some(RingDescriptor {
            inner_radius: 7.0,
            outer_radius: 12.0,
            tilt_degrees: 98.0,
            texture: "uranus_ring.png",
        }),
    },
    PlanetDescriptor {
        name: "neptune",
        radius: 7.0,
        texture: "neptune.jpg",
        distance_from_sun: 200.0,
        rotation_speed_per_tick: 0.032,
        orbit_speed_per_tick: 0.001,
        ring: None,
    },
    PlanetDescriptor {
        name: "pluto",
        radius: 2.8,
        texture: "pluto.jpg",
        distance_from_sun: 216.0,
        rotation_speed_per_tick: 0.008,
        orbit_speed_per_tick: 0.0007,
        ring: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_documented_bodies() {
        assert_eq!(PLANETS.len(), 9);
        let names: Vec<&str> = PLANETS.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            [
                "mercury", "venus", "earth", "mars", "jupiter", "saturn", "uranus", "neptune",
                "pluto"
            ]
        );
    }

    #[test]
    fn test_distances_strictly_increase() {
        for pair in PLANETS.windows(2) {
            assert!(
                pair[0].distance_from_sun < pair[1].distance_from_sun,
                "{} is not closer than {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_exactly_two_ringed_bodies() {
        let ringed: Vec<&str> = PLANETS
            .iter()
            .filter(|p| p.ring.is_some())
            .map(|p| p.name)
            .collect();
        assert_eq!(ringed, ["saturn", "uranus"]);
    }

    #[test]
    fn test_ring_radii_well_formed() {
        for planet in PLANETS.iter().filter(|p| p.ring.is_some()) {
            let ring = planet.ring.unwrap();
            assert!(ring.inner_radius < ring.outer_radius, "{}", planet.name);
        }
    }
}
