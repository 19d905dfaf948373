//! Scenario configuration: built-in presets and YAML scenario files.
//!
//! A scenario describes the starting state of a run:
//!
//! - [`CameraConfig`]   – orbit target, distance, angles and field of view
//! - [`LightingConfig`] – fixed point light or emissive bodies as lights
//! - [`PhysicsConfig`]  – integrator constants and the initial pause flag
//! - [`RenderConfig`]   – window size and shadow ray bias
//! - [`GridConfig`]     – placement and look of the spacetime grid
//! - [`BodyConfig`]     – initial state of each body
//!
//! Every section is optional. Example:
//!
//! ```yaml
//! camera:
//!   target: [0.0, 0.0, -9.0]
//!   distance: 15.0
//!   yaw: 90.0
//!   fov: 90.0
//!
//! lighting:
//!   mode: point
//!   position: [5.0, 5.0, 5.0]
//!
//! render:
//!   width: 1024
//!   height: 768
//!
//! grid:
//!   visible: true
//!   center: [0.0, -8.0, -9.0]
//!   size: 40.0
//!   divisions: 20
//!
//! physics:
//!   paused: true
//!   collision_damping: -0.2
//!
//! bodies:
//!   - position: [0.0, -5.0, -9.0]
//!     radius: 2.0
//!     color: [1.0, 0.2, 0.2]
//!   - position: [5.0, -2.0, -11.0]
//!     mass: 4.5e18
//!     density: 5000.0
//!     velocity: [0.0, 1.0, 0.0]
//! ```
//!
//! Scenario files are inputs only; simulation state is never written back.

use anyhow::{bail, Context, Result};
use glam::DVec3;
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};

use crate::body::{Body, Material, DEFAULT_DENSITY};
use crate::camera::{OrbitCamera, DEFAULT_FOV_DEGREES, DEFAULT_MIN_DISTANCE};
use crate::frame::SimulationState;
use crate::grid::{SpacetimeGrid, MAX_GRID_DIVISIONS};
use crate::integrator::{GravityIntegrator, IntegratorParams};
use crate::scene::{
    Illumination, Scene, DEFAULT_AMBIENT, DEFAULT_BACKGROUND, DEFAULT_LIGHT_POSITION, DEFAULT_SHADOW_BIAS,
};

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub target: [f64; 3],
    pub distance: f64,
    pub yaw: f64,   // degrees
    pub pitch: f64, // degrees
    pub fov: f64,   // degrees
    pub min_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, -9.0],
            distance: 15.0,
            yaw: 90.0,
            pitch: 0.0,
            fov: DEFAULT_FOV_DEGREES,
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LightingMode {
    #[default]
    Point,
    EmissiveBodies,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub mode: LightingMode,
    pub position: [f64; 3], // only used by `point`
    pub ambient: f64,
    pub background: [f64; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            mode: LightingMode::Point,
            position: DEFAULT_LIGHT_POSITION.to_array(),
            ambient: DEFAULT_AMBIENT,
            background: DEFAULT_BACKGROUND.to_array(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PhysicsConfig {
    pub paused: bool,
    #[serde(flatten)]
    pub integrator: IntegratorParams,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub shadow_bias: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            shadow_bias: DEFAULT_SHADOW_BIAS,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub visible: bool,
    pub center: [f64; 3],
    pub size: f64,
    pub divisions: u32,
    pub color: [f64; 3],
    pub opacity: f64,
    pub line_width: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        let grid = SpacetimeGrid::default();
        Self {
            visible: grid.visible,
            center: grid.center.to_array(),
            size: grid.size,
            divisions: grid.divisions,
            color: grid.color.to_array(),
            opacity: grid.opacity,
            line_width: grid.line_width,
        }
    }
}

impl GridConfig {
    /// The grid bends with the same constants the integrator uses.
    pub fn build(&self, params: &IntegratorParams) -> Result<SpacetimeGrid> {
        ensure_positive(self.size, "grid size")?;
        ensure_positive(self.line_width, "grid line_width")?;
        ensure_finite(self.opacity, "grid opacity")?;
        if self.divisions == 0 || self.divisions > MAX_GRID_DIVISIONS {
            bail!("grid divisions must be in 1..={}, got {}", MAX_GRID_DIVISIONS, self.divisions);
        }
        Ok(SpacetimeGrid {
            visible: self.visible,
            center: finite_vec(self.center, "grid center")?,
            size: self.size,
            divisions: self.divisions,
            color: finite_vec(self.color, "grid color")?.clamp(DVec3::ZERO, DVec3::ONE),
            opacity: self.opacity.clamp(0.0, 1.0),
            line_width: self.line_width,
            gravitational_constant: params.gravitational_constant,
            meters_per_unit: params.meters_per_unit,
        })
    }
}

/// Initial state of one body. Either `mass` or `radius` must be given.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub mass: Option<f64>,
    pub radius: Option<f64>,
    pub density: f64,
    pub color: [f64; 3],
    pub specular: f64,
    pub emission: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            velocity: [0.0; 3],
            mass: None,
            radius: None,
            density: DEFAULT_DENSITY,
            color: [1.0, 0.0, 0.0],
            specular: 0.5,
            emission: 0.0,
        }
    }
}

impl BodyConfig {
    pub fn build(&self) -> Result<Body> {
        let position = finite_vec(self.position, "position")?;
        let velocity = finite_vec(self.velocity, "velocity")?;
        ensure_positive(self.density, "density")?;
        let material = Material::new(finite_vec(self.color, "color")?, self.specular, self.emission);

        let mut body = match (self.mass, self.radius) {
            (Some(mass), _) => {
                ensure_positive(mass, "mass")?;
                Body::new(position, velocity, mass, self.density, material)
            }
            (None, Some(radius)) => {
                ensure_positive(radius, "radius")?;
                Body::with_radius(position, radius, self.density, material)
            }
            (None, None) => bail!("body needs either `mass` or `radius`"),
        };
        body.velocity = velocity;
        Ok(body)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub physics: PhysicsConfig,
    pub render: RenderConfig,
    pub grid: GridConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening scenario {}", path.display()))?;
        let config: ScenarioConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        log::info!("Loaded scenario {} with {} bodies", path.display(), config.bodies.len());
        Ok(config)
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Validates the scenario and builds the runtime state.
    pub fn build(&self) -> Result<SimulationState> {
        let bodies = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, body)| body.build().with_context(|| format!("body {}", index)))
            .collect::<Result<Vec<_>>>()?;

        let illumination = match self.lighting.mode {
            LightingMode::Point => Illumination::Point(finite_vec(self.lighting.position, "light position")?),
            LightingMode::EmissiveBodies => Illumination::EmissiveBodies,
        };
        let mut scene = Scene::new(bodies).with_illumination(illumination);
        scene.ambient = self.lighting.ambient.clamp(0.0, 1.0);
        scene.background = finite_vec(self.lighting.background, "background")?;
        ensure_positive(self.render.shadow_bias, "shadow_bias")?;
        scene.shadow_bias = self.render.shadow_bias;
        if self.render.width == 0 || self.render.height == 0 {
            bail!("render size must be non-zero, got {}x{}", self.render.width, self.render.height);
        }

        let camera_config = &self.camera;
        ensure_positive(camera_config.distance, "camera distance")?;
        ensure_positive(camera_config.min_distance, "camera min_distance")?;
        ensure_finite(camera_config.yaw, "camera yaw")?;
        ensure_finite(camera_config.pitch, "camera pitch")?;
        ensure_positive(camera_config.fov, "camera fov")?;
        let camera = OrbitCamera::new(
            finite_vec(camera_config.target, "camera target")?,
            camera_config.distance,
            camera_config.yaw,
            camera_config.pitch,
        )
        .with_min_distance(camera_config.min_distance)
        .with_fov(camera_config.fov);

        let params = &self.physics.integrator;
        ensure_positive(params.velocity_divisor, "velocity_divisor")?;
        ensure_positive(params.position_divisor, "position_divisor")?;
        ensure_positive(params.meters_per_unit, "meters_per_unit")?;
        ensure_positive(params.reference_rate, "reference_rate")?;
        ensure_positive(params.max_dt, "max_dt")?;
        ensure_positive(params.gravitational_constant, "gravitational_constant")?;
        ensure_finite(params.min_separation, "min_separation")?;
        scene.grid = self.grid.build(params)?;

        let mut state = SimulationState::new(scene, camera, GravityIntegrator::new(params.clone()));
        state.paused = self.physics.paused;
        Ok(state)
    }
}

/// Built-in starting scenes.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Three matte spheres under a fixed light, paused.
    #[default]
    Spheres,
    /// An emissive star with planets on circular orbits over the spacetime grid.
    Orbits,
    /// Two equal masses at rest falling together.
    Binary,
}

impl Preset {
    pub fn build(self) -> SimulationState {
        match self {
            Preset::Spheres => spheres(),
            Preset::Orbits => orbits(),
            Preset::Binary => binary(),
        }
    }
}

fn spheres() -> SimulationState {
    let bodies = vec![
        Body::with_radius(DVec3::new(0.0, -5.0, -9.0), 2.0, DEFAULT_DENSITY, Material::matte(DVec3::new(1.0, 0.2, 0.2))),
        Body::with_radius(DVec3::new(5.0, -2.0, -11.0), 1.5, DEFAULT_DENSITY, Material::matte(DVec3::new(0.1, 1.0, 0.5))),
        Body::with_radius(DVec3::new(-2.0, -1.0, -6.0), 1.0, DEFAULT_DENSITY, Material::matte(DVec3::new(0.4, 0.3, 1.0))),
    ];
    let mut state = SimulationState::new(Scene::new(bodies), OrbitCamera::default(), GravityIntegrator::default());
    state.paused = true;
    state
}

const STAR_DENSITY: f64 = 5.0e5;

fn orbits() -> SimulationState {
    let integrator = GravityIntegrator::default();
    let star = Body::with_radius(DVec3::ZERO, 5.0, STAR_DENSITY, Material::emissive(DVec3::new(1.0, 0.929, 0.176), 1.0));
    let star_mass = star.mass;

    let planets = [
        (40.0, 1.5, DVec3::new(0.0, 1.0, 1.0)),
        (70.0, 2.0, DVec3::new(1.0, 0.25, 0.56)),
        (100.0, 2.5, DVec3::new(1.0, 0.5, 0.15)),
    ];
    let mut bodies = vec![star];
    for (orbit_radius, radius, color) in planets {
        let mut planet = Body::with_radius(DVec3::new(orbit_radius, 0.0, 0.0), radius, DEFAULT_DENSITY, Material::matte(color));
        planet.velocity = DVec3::new(0.0, 0.0, -integrator.circular_orbit_speed(star_mass, orbit_radius));
        bodies.push(planet);
    }

    let mut scene = Scene::new(bodies).with_illumination(Illumination::EmissiveBodies);
    scene.grid = SpacetimeGrid {
        visible: true,
        center: DVec3::new(0.0, -12.0, 0.0),
        size: 300.0,
        divisions: 30,
        ..SpacetimeGrid::default()
    };
    let camera = OrbitCamera::new(DVec3::ZERO, 180.0, 90.0, 30.0).with_fov(60.0);
    SimulationState::new(scene, camera, integrator)
}

fn binary() -> SimulationState {
    let bodies = vec![
        Body::with_radius(DVec3::new(-6.0, 0.0, -9.0), 1.5, DEFAULT_DENSITY, Material::matte(DVec3::new(0.2, 0.6, 1.0))),
        Body::with_radius(DVec3::new(6.0, 0.0, -9.0), 1.5, DEFAULT_DENSITY, Material::matte(DVec3::new(1.0, 0.6, 0.2))),
    ];
    SimulationState::new(Scene::new(bodies), OrbitCamera::default(), GravityIntegrator::default())
}

fn finite_vec(values: [f64; 3], name: &str) -> Result<DVec3> {
    let v = DVec3::from_array(values);
    if !v.is_finite() {
        bail!("{} must be finite, got {:?}", name, values);
    }
    Ok(v)
}

fn ensure_finite(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() {
        bail!("{} must be finite, got {}", name, value);
    }
    Ok(())
}

fn ensure_positive(value: f64, name: &str) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        bail!("{} must be a positive number, got {}", name, value);
    }
    Ok(())
}
