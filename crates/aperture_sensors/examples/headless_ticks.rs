//! Headless demonstration: a mock render engine and two cameras driven
//! through twenty 50 ms simulation ticks.
//!
//! Run with: cargo run --package aperture_sensors --example headless_ticks

use std::sync::Arc;

use aperture_core::{SensorKind, SensorResult, SensorSpec, SimTime};
use aperture_sensors::{
    NodeId, RenderEngine, RenderingSensor, SceneGraph, SensorFactory, SensorSystem,
    SensorsConfig, WorldView,
};

struct HeadlessScene;

impl SceneGraph for HeadlessScene {
    fn is_initialized(&self) -> bool {
        true
    }
    fn pre_render(&self) {
        println!("  [scene] graph updated");
    }
    fn find_node(&self, _name: &str) -> Option<NodeId> {
        Some(NodeId(1))
    }
}

struct HeadlessEngine;

impl RenderEngine for HeadlessEngine {
    fn engine_name(&self) -> &str {
        "headless"
    }
    fn create_scene(&mut self, world_name: &str) -> SensorResult<Arc<dyn SceneGraph>> {
        println!("  [engine] scene created for world '{world_name}'");
        Ok(Arc::new(HeadlessScene))
    }
}

struct PrintSensor {
    name: String,
    rate_hz: f64,
}

impl RenderingSensor for PrintSensor {
    fn name(&self) -> &str {
        &self.name
    }
    fn update_rate_hz(&self) -> f64 {
        self.rate_hz
    }
    fn attach(&mut self, _scene: &Arc<dyn SceneGraph>, parent: &str) {
        println!("  [{}] attached under '{parent}'", self.name);
    }
    fn render(&mut self, now: SimTime) {
        println!("  [{}] frame at {now}", self.name);
    }
}

struct PrintFactory;

impl SensorFactory for PrintFactory {
    fn create(&self, spec: &SensorSpec) -> Option<Box<dyn RenderingSensor>> {
        Some(Box::new(PrintSensor {
            name: spec.name.clone(),
            rate_hz: spec.update_rate_hz,
        }))
    }
}

struct DemoWorld;

impl WorldView for DemoWorld {
    fn world_name(&self) -> &str {
        "demo"
    }
    fn has_rendering_sensors(&self) -> bool {
        true
    }
}

fn main() -> SensorResult<()> {
    let config = SensorsConfig::default();
    let system = SensorSystem::new(&config, Box::new(HeadlessEngine), Box::new(PrintFactory));

    system.create_sensor(
        &SensorSpec {
            name: "front_camera".into(),
            kind: Some(SensorKind::Camera),
            update_rate_hz: 10.0,
            topic: None,
        },
        "chassis",
    )?;
    system.create_sensor(
        &SensorSpec {
            name: "roof_lidar".into(),
            kind: Some(SensorKind::GpuLidar),
            update_rate_hz: 5.0,
            topic: None,
        },
        "roof_mast",
    )?;

    for tick in 0u32..20 {
        let now = SimTime::from_secs_f64(f64::from(tick) * 0.05);
        let handed_off = system.advance(now, &DemoWorld);
        println!("tick {tick:>2} at {now}: {handed_off} sensor(s) scheduled");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    system.stop();
    Ok(())
}
