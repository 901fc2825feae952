//! Scene builder: one pass that turns descriptors into pivot/body pairs.

use glam::Vec3;
use std::f32::consts::FRAC_PI_2;
use tracing::{debug, info};

use orrery_math::deg_to_rad;
use orrery_scene::{NodeId, NodeKind, SceneGraph, TextureRef};

use crate::descriptor::{
    PLANETS, PlanetDescriptor, SUN_LIGHT_DECAY, SUN_LIGHT_INTENSITY, SUN_LIGHT_RANGE, SUN_RADIUS,
    SUN_ROTATION_PER_TICK, SUN_TEXTURE,
};

/// Runtime entity for one orbiting body.
///
/// `body` is a sphere node owned by `pivot`; `pivot` is a transform-only
/// group under the scene root. The body's local position is offset from the
/// pivot's origin by exactly the descriptor's distance along +X, so rotating
/// the pivot sweeps the body in a circle of that radius about the origin.
#[derive(Clone, Debug)]
pub struct OrbitingBody {
    /// Descriptor name, for diagnostics.
    pub name: &'static str,
    /// The renderable sphere node.
    pub body: NodeId,
    /// The orbit pivot node, parent of `body`.
    pub pivot: NodeId,
    /// Self-rotation per tick, radians.
    pub rotation_speed_per_tick: f32,
    /// Orbital revolution per tick, radians.
    pub orbit_speed_per_tick: f32,
}

/// The sun: a sphere at the origin, never parented under a pivot, carrying
/// the point light as a child so the light's position never needs updating.
#[derive(Clone, Debug)]
pub struct SunBody {
    /// The renderable sphere node.
    pub body: NodeId,
    /// The point light node, child of `body`.
    pub light: NodeId,
    /// Self-rotation per tick, radians.
    pub rotation_speed_per_tick: f32,
}

/// Everything the builder produced, in descriptor order.
#[derive(Clone, Debug)]
pub struct SolarSystem {
    pub sun: SunBody,
    pub bodies: Vec<OrbitingBody>,
}

/// Build the nine documented bodies plus the sun into `scene`.
pub fn build_solar_system(scene: &mut SceneGraph) -> SolarSystem {
    build_system(scene, &PLANETS)
}

/// Build a sun and one [`OrbitingBody`] per descriptor, in input order.
///
/// Every pivot is registered as a direct child of the scene root. Calling
/// this twice on the same graph produces two structurally independent
/// subtrees.
pub fn build_system(scene: &mut SceneGraph, descriptors: &[PlanetDescriptor]) -> SolarSystem {
    let sun = build_sun(scene);
    let bodies: Vec<OrbitingBody> = descriptors
        .iter()
        .map(|descriptor| build_planet(scene, descriptor))
        .collect();
    info!(bodies = bodies.len(), "solar system built");
    SolarSystem { sun, bodies }
}

fn build_sun(scene: &mut SceneGraph) -> SunBody {
    let body = scene.spawn(
        scene.root(),
        NodeKind::Sphere {
            radius: SUN_RADIUS,
            texture: TextureRef::new(SUN_TEXTURE),
        },
    );
    let light = scene.spawn(
        body,
        NodeKind::PointLight {
            intensity: SUN_LIGHT_INTENSITY,
            range: SUN_LIGHT_RANGE,
            decay: SUN_LIGHT_DECAY,
        },
    );
    SunBody {
        body,
        light,
        rotation_speed_per_tick: SUN_ROTATION_PER_TICK,
    }
}

fn build_planet(scene: &mut SceneGraph, descriptor: &PlanetDescriptor) -> OrbitingBody {
    let pivot = scene.spawn(scene.root(), NodeKind::Group);
    let body = scene.spawn(
        pivot,
        NodeKind::Sphere {
            radius: descriptor.radius,
            texture: TextureRef::new(descriptor.texture),
        },
    );
    scene.set_translation(body, Vec3::new(descriptor.distance_from_sun, 0.0, 0.0));

    if let Some(ring) = descriptor.ring {
        let annulus = scene.spawn(
            body,
            NodeKind::Annulus {
                inner_radius: ring.inner_radius,
                outer_radius: ring.outer_radius,
                texture: TextureRef::new(ring.texture),
            },
        );
        // Lay the annulus flat, perpendicular to the sphere's rotation axis,
        // then tilt body and ring together.
        scene.rotate_x(annulus, FRAC_PI_2);
        scene.rotate_x(body, deg_to_rad(ring.tilt_degrees));
    }

    debug!(
        name = descriptor.name,
        distance = descriptor.distance_from_sun,
        ringed = descriptor.ring.is_some(),
        "built orbiting body"
    );

    OrbitingBody {
        name: descriptor.name,
        body,
        pivot,
        rotation_speed_per_tick: descriptor.rotation_speed_per_tick,
        orbit_speed_per_tick: descriptor.orbit_speed_per_tick,
    }
}
