//! Planetary system construction: descriptor tables and the scene builder
//! that turns them into pivot/body pairs inside a [`SceneGraph`].
//!
//! [`SceneGraph`]: orrery_scene::SceneGraph

pub mod builder;
pub mod descriptor;

pub use builder::{OrbitingBody, SolarSystem, SunBody, build_solar_system, build_system};
pub use descriptor::{
    AMBIENT_LIGHT_COLOR, AMBIENT_LIGHT_INTENSITY, PLANETS, PlanetDescriptor, RingDescriptor,
    SUN_LIGHT_DECAY, SUN_LIGHT_INTENSITY, SUN_LIGHT_RANGE, SUN_RADIUS, SUN_ROTATION_PER_TICK,
    SUN_TEXTURE,
};
