//! The tick loop body: rotate everything, then present one frame.

use tracing::trace;

use orrery_scene::SceneGraph;
use orrery_system::SolarSystem;

/// Rendering collaborator seam: present the current state of the scene as
/// one frame.
///
/// The real implementation runs the full compositing pipeline; tests
/// substitute a counting mock.
pub trait FrameSink {
    fn present_frame(&mut self, scene: &SceneGraph);
}

/// Holds the built system and applies one update per invocation of
/// [`tick`](Self::tick).
///
/// All increments are relative deltas, so rotation accumulates across the
/// run; the scene graph's quaternion representation keeps the accumulated
/// orientation bounded without an explicit wraparound pass.
pub struct AnimationDriver {
    system: SolarSystem,
    tick_count: u64,
}

impl AnimationDriver {
    /// Create a driver for a system previously built into a scene graph.
    pub fn new(system: SolarSystem) -> Self {
        Self {
            system,
            tick_count: 0,
        }
    }

    /// Run one tick: rotate the sun, then every body and pivot in
    /// construction order, then present a frame through `sink`.
    pub fn tick(&mut self, scene: &mut SceneGraph, sink: &mut dyn FrameSink) {
        scene.rotate_y(self.system.sun.body, self.system.sun.rotation_speed_per_tick);

        for body in &self.system.bodies {
            scene.rotate_y(body.body, body.rotation_speed_per_tick);
            scene.rotate_y(body.pivot, body.orbit_speed_per_tick);
        }

        self.tick_count += 1;
        trace!(tick = self.tick_count, "animation tick");
        sink.present_frame(scene);
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The system this driver animates.
    pub fn system(&self) -> &SolarSystem {
        &self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_math::{approx_eq, normalize_angle, twist_about_y};
    use orrery_system::{PLANETS, build_solar_system};

    /// Counts presented frames and remembers the scene size it last saw.
    struct CountingSink {
        frames: u32,
        last_node_count: usize,
    }

    impl CountingSink {
        fn new() -> Self {
            Self {
                frames: 0,
                last_node_count: 0,
            }
        }
    }

    impl FrameSink for CountingSink {
        fn present_frame(&mut self, scene: &SceneGraph) {
            self.frames += 1;
            self.last_node_count = scene.len();
        }
    }

    fn ticked_system(ticks: u32) -> (SceneGraph, AnimationDriver, CountingSink) {
        let mut scene = SceneGraph::new();
        let system = build_solar_system(&mut scene);
        let mut driver = AnimationDriver::new(system);
        let mut sink = CountingSink::new();
        for _ in 0..ticks {
            driver.tick(&mut scene, &mut sink);
        }
        (scene, driver, sink)
    }

    #[test]
    fn test_one_frame_presented_per_tick() {
        let (_, driver, sink) = ticked_system(25);
        assert_eq!(sink.frames, 25);
        assert_eq!(driver.tick_count(), 25);
    }

    #[test]
    fn test_single_tick_applies_exactly_one_increment() {
        let (scene, driver, _) = ticked_system(1);

        for (descriptor, built) in PLANETS.iter().zip(&driver.system().bodies) {
            let spin = twist_about_y(scene.node(built.body).rotation());
            let orbit = twist_about_y(scene.node(built.pivot).rotation());
            assert!(
                approx_eq(spin, normalize_angle(descriptor.rotation_speed_per_tick), 1e-6),
                "{} spin {spin}",
                descriptor.name
            );
            assert!(
                approx_eq(orbit, normalize_angle(descriptor.orbit_speed_per_tick), 1e-6),
                "{} orbit {orbit}",
                descriptor.name
            );
        }
    }

    #[test]
    fn test_accumulated_rotation_after_n_ticks() {
        let n = 100;
        let (scene, driver, _) = ticked_system(n);

        // Third descriptor is earth: 0.02 rad/tick spin, so 2.0 rad after
        // 100 ticks.
        let earth = &driver.system().bodies[2];
        let spin = twist_about_y(scene.node(earth.body).rotation());
        assert!(approx_eq(spin, 2.0, 1e-4), "earth spin was {spin}");

        for (descriptor, built) in PLANETS.iter().zip(&driver.system().bodies) {
            let expected_spin = normalize_angle(n as f32 * descriptor.rotation_speed_per_tick);
            let expected_orbit = normalize_angle(n as f32 * descriptor.orbit_speed_per_tick);
            let spin = twist_about_y(scene.node(built.body).rotation());
            let orbit = twist_about_y(scene.node(built.pivot).rotation());
            assert!(
                approx_eq(spin, expected_spin, 1e-4),
                "{}: spin {spin} != {expected_spin}",
                descriptor.name
            );
            assert!(
                approx_eq(orbit, expected_orbit, 1e-4),
                "{}: orbit {orbit} != {expected_orbit}",
                descriptor.name
            );
        }
    }

    #[test]
    fn test_sun_rotates_at_fixed_rate() {
        let n = 50;
        let (scene, driver, _) = ticked_system(n);
        let spin = twist_about_y(scene.node(driver.system().sun.body).rotation());
        assert!(approx_eq(
            spin,
            normalize_angle(n as f32 * orrery_system::SUN_ROTATION_PER_TICK),
            1e-4
        ));
    }

    #[test]
    fn test_tilted_body_keeps_tilt_while_spinning() {
        let (scene, driver, _) = ticked_system(200);
        let saturn = &driver.system().bodies[5];
        let rotation = scene.node(saturn.body).rotation();

        let tilt = orrery_math::deg_to_rad(27.0);
        let expected = glam::Quat::from_rotation_x(tilt)
            * glam::Quat::from_rotation_y(200.0 * saturn.rotation_speed_per_tick);
        assert!(rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_sink_sees_full_scene() {
        let (scene, _, sink) = ticked_system(3);
        assert_eq!(sink.last_node_count, scene.len());
    }

    #[test]
    fn test_zero_ticks_leaves_scene_untouched() {
        let mut scene = SceneGraph::new();
        let system = build_solar_system(&mut scene);
        let driver = AnimationDriver::new(system);

        assert_eq!(driver.tick_count(), 0);
        for body in &driver.system().bodies {
            let spin = twist_about_y(scene.node(body.body).rotation());
            // Ringed bodies carry only their construction tilt, which has no
            // twist about Y.
            assert!(approx_eq(spin, 0.0, 1e-6), "{}", body.name);
        }
    }
}
