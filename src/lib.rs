pub mod body;
pub mod camera;
pub mod config;
pub mod frame;
pub mod gpu;
pub mod grid;
pub mod input;
pub mod integrator;
pub mod present;
pub mod ray;
pub mod scene;

pub use body::{Body, BodyState, Material};
pub use camera::OrbitCamera;
pub use frame::{Frame, FrameDriver, Presenter, SceneEdit, SimulationState};
pub use grid::SpacetimeGrid;
pub use integrator::{GravityIntegrator, IntegratorParams};
pub use ray::{intersect, Ray, Sphere};
pub use scene::{Illumination, Scene};
