//! Orbit demo application
//!
//! Builds a small solar system scene, runs it for three seconds of wall
//! clock time at a fixed step against a recording renderer and prints the
//! final scene as RON.
//!
//! Usage: `scene_demo [scene_config.toml|.ron]`

use std::time::Duration;

use rand::Rng;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use thiserror::Error;

const STEPS: u32 = 180;
const FIXED_STEP: f32 = 1.0 / 60.0;
const MAX_ASTEROID_LIFETIME: f32 = 6.0;
const ASTEROID_COUNT: usize = 8;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

struct OrbitDemo {
    scene_name: String,
    scenes: SceneManager,
    renderer: RecordingRenderer,
    timer: FrameTimer,
    step: FixedStep,
}

impl OrbitDemo {
    fn new(config: SceneConfig) -> Self {
        log::info!("Creating orbit demo with scene '{}'", config.name);
        let scene_name = config.name.clone();
        let mut scenes = SceneManager::new();
        scenes.add_scene(SceneGraph::with_config(config));
        Self {
            scene_name,
            scenes,
            renderer: RecordingRenderer::new(),
            timer: FrameTimer::new(),
            step: FixedStep::new(FIXED_STEP),
        }
    }

    fn initialize(&mut self) -> Result<(), DemoError> {
        self.scenes.activate(&self.scene_name)?;
        let Some(scene) = self.scenes.active_mut() else {
            return Ok(());
        };

        let sun = scene.spawn("Sun");
        if let Some(node) = scene.node_mut(sun) {
            node.set_tag("star");
        }
        scene.set_local_scale(sun, Vec3::new(3.0, 3.0, 3.0))?;
        scene.add_component(sun, Rotator::new(Vec3::new(0.0, 0.2, 0.0)))?;
        scene.add_component(sun, MeshRenderer::new("sphere", "sun_emissive"))?;

        let orbit = scene.spawn_child(sun, "PlanetOrbit")?;
        scene.add_component(orbit, Rotator::new(Vec3::new(0.0, 0.8, 0.0)))?;

        let planet = scene.spawn_child(orbit, "Planet")?;
        scene.set_local_position(planet, Vec3::new(4.0, 0.0, 0.0))?;
        scene.set_local_scale(planet, Vec3::new(0.3, 0.3, 0.3))?;
        scene.add_component(planet, MeshRenderer::new("sphere", "planet_rock"))?;

        let moon = scene.spawn_child(planet, "Moon")?;
        scene.set_local_position(moon, Vec3::new(2.0, 0.0, 0.0))?;
        scene.add_component(moon, MeshRenderer::new("sphere", "moon_dust"))?;

        let mut rng = rand::thread_rng();
        for index in 0..ASTEROID_COUNT {
            let asteroid = scene.spawn(format!("Asteroid{index}"));
            if let Some(node) = scene.node_mut(asteroid) {
                node.set_tag("asteroid");
            }
            let position = Vec3::new(rng.gen_range(-20.0..20.0), rng.gen_range(-2.0..2.0), rng.gen_range(-20.0..20.0));
            scene.set_local_position(asteroid, position)?;
            let velocity = Vec3::new(rng.gen_range(-3.0..3.0), 0.0, rng.gen_range(-3.0..3.0));
            scene.add_component(asteroid, Mover::new(velocity, Space::World))?;
            scene.add_component(asteroid, Rotator::new(Vec3::new(rng.gen_range(0.0..2.0), rng.gen_range(0.0..2.0), 0.0)))?;
            scene.add_component(asteroid, Lifetime::new(rng.gen_range(0.5..MAX_ASTEROID_LIFETIME)))?;
            scene.add_component(asteroid, MeshRenderer::new("rock", "asteroid"))?;
        }

        log::info!("Spawned {} nodes", scene.len());
        Ok(())
    }

    fn run(&mut self) {
        let mut simulated = 0;
        while simulated < STEPS {
            std::thread::sleep(Duration::from_secs_f32(FIXED_STEP));
            let dt = self.timer.tick();
            let steps = self.step.accumulate(dt).min(STEPS - simulated);
            for _ in 0..steps {
                self.scenes.advance(self.step.step());
            }
            simulated += steps;
            if let Some(scene) = self.scenes.active_mut() {
                self.renderer.begin_frame();
                scene.sync_visuals(&mut self.renderer);
            }
        }

        let asteroids = self
            .scenes
            .active()
            .map_or(0, |scene| scene.find_by_tag("asteroid").len());
        log::info!(
            "Ran {} steps over {} frames ({:.0} fps wall clock), {} asteroids left, {} visuals bound, {} released",
            STEPS,
            self.timer.frame_count(),
            self.timer.average_fps(),
            asteroids,
            self.renderer.bound_count(),
            self.renderer.released().len()
        );
    }

    fn report(&self) -> Result<(), DemoError> {
        let Some(scene) = self.scenes.active() else {
            return Ok(());
        };
        if let Some(moon) = scene.find_by_name("Moon") {
            if let Some(position) = scene.world_position(moon) {
                log::info!("Moon world position: {:.2} {:.2} {:.2}", position.x, position.y, position.z);
            }
        }
        let data = SceneSerializer::serialize_scene(scene);
        println!("{}", SceneSerializer::to_ron(&data)?);
        Ok(())
    }
}

fn main() -> Result<(), DemoError> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load_from_file(&path)?,
        None => SceneConfig::named("Orbit"),
    };

    let mut demo = OrbitDemo::new(config);
    demo.initialize()?;
    demo.run();
    demo.report()?;
    Ok(())
}
