//! Per-frame loop: apply deferred edits, integrate, ray-trace, present.

use glam::DVec3;
use log::{debug, info};
use std::time::Instant;

use crate::body::{Body, Material, DEFAULT_DENSITY};
use crate::camera::OrbitCamera;
use crate::integrator::GravityIntegrator;
use crate::scene::Scene;

pub const DEFAULT_SPAWN_MASS: f64 = 1.0e23;
pub const DEFAULT_GROWTH_RATE: f64 = 5.0;

/// RGB8 pixel buffer, row-major, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// RGB of pixel `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = pixel_offset(x, y, self.width);
        let rgb = self.pixels.get(index..index + 3)?;
        Some([rgb[0], rgb[1], rgb[2]])
    }
}

/// Byte offset of pixel `(x, y)` in a packed RGB8 buffer `width` pixels wide.
pub fn pixel_offset(x: u32, y: u32, width: u32) -> usize {
    (y as usize * width as usize + x as usize) * 3
}

/// Receives each finished frame. The buffer is only borrowed for the call.
pub trait Presenter {
    fn present(&mut self, frame: &Frame);
}

/// Body insertion, deletion and authoring commands, applied between frames.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEdit {
    SpawnBegin { position: DVec3 },
    Grow { factor: f64 },
    /// Moves the authoring body by `offset` body radii.
    Nudge { offset: DVec3 },
    Release { velocity: DVec3 },
    DeleteLast,
}

/// Defaults for bodies created by the spawn gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnParams {
    pub mass: f64,
    pub density: f64,
    pub material: Material,
    /// Mass grows by `1 + growth_rate * dt` per frame while the grow gesture is held.
    pub growth_rate: f64,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            mass: DEFAULT_SPAWN_MASS,
            density: DEFAULT_DENSITY,
            material: Material::default(),
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }
}

impl SpawnParams {
    pub fn growth_factor(&self, dt: f64) -> f64 {
        1.0 + self.growth_rate * dt.max(0.0)
    }
}

#[derive(Debug)]
pub struct SimulationState {
    pub scene: Scene,
    pub camera: OrbitCamera,
    pub integrator: GravityIntegrator,
    pub spawn: SpawnParams,
    pub paused: bool,
    pending: Vec<SceneEdit>,
}

impl SimulationState {
    pub fn new(scene: Scene, camera: OrbitCamera, integrator: GravityIntegrator) -> Self {
        Self {
            scene,
            camera,
            integrator,
            spawn: SpawnParams::default(),
            paused: false,
            pending: Vec::new(),
        }
    }

    /// Defers `edit` to the start of the next frame.
    pub fn queue(&mut self, edit: SceneEdit) {
        self.pending.push(edit);
    }

    pub fn pending(&self) -> &[SceneEdit] {
        &self.pending
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn toggle_grid(&mut self) {
        self.scene.grid.visible = !self.scene.grid.visible;
        info!("Spacetime grid {}", if self.scene.grid.visible { "shown" } else { "hidden" });
    }

    pub fn is_authoring(&self) -> bool {
        self.scene.bodies.last().map_or(false, Body::is_authoring)
    }

    pub fn apply_pending_edits(&mut self) {
        for edit in std::mem::take(&mut self.pending) {
            self.apply_edit(edit);
        }
    }

    fn apply_edit(&mut self, edit: SceneEdit) {
        match edit {
            SceneEdit::SpawnBegin { position } => {
                let body = Body::authoring(position, self.spawn.mass, self.spawn.density, self.spawn.material);
                info!("Spawned body {} at {:?}", self.scene.bodies.len(), position);
                self.scene.push(body);
            }
            SceneEdit::Grow { factor } => {
                if let Some(body) = self.scene.authoring_mut() {
                    body.grow(factor);
                    debug!("Authoring body mass {:e}, radius {:.3}", body.mass, body.radius());
                }
            }
            SceneEdit::Nudge { offset } => {
                if let Some(body) = self.scene.authoring_mut() {
                    body.position += offset * body.radius();
                }
            }
            SceneEdit::Release { velocity } => {
                if let Some(body) = self.scene.authoring_mut() {
                    body.release(velocity);
                    info!("Launched body with mass {:e}", body.mass);
                }
            }
            SceneEdit::DeleteLast => {
                if self.scene.delete_last().is_some() {
                    info!("Deleted body, {} remaining", self.scene.bodies.len());
                }
            }
        }
    }
}

/// Ray-traces `scene` from `camera` into a new RGB8 frame.
pub fn render(scene: &Scene, camera: &OrbitCamera, width: u32, height: u32) -> Frame {
    let width = width.max(1);
    let height = height.max(1);
    let basis = camera.basis();
    let grid = scene.grid.visible.then(|| scene.grid.lines(&scene.bodies));
    let mut pixels = vec![0u8; width as usize * height as usize * 3];

    for y in 0..height {
        for x in 0..width {
            let ray = camera.primary_ray_with(&basis, x, y, width, height);
            let (mut color, hit) = scene.trace_hit(&ray);
            if let Some(lines) = &grid {
                color = lines.overlay(&ray, hit.map_or(f64::INFINITY, |hit| hit.t), color);
            }
            let index = pixel_offset(x, y, width);
            pixels[index..index + 3].copy_from_slice(&to_rgb8(color));
        }
    }

    Frame { pixels, width, height }
}

pub fn to_rgb8(color: DVec3) -> [u8; 3] {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

#[derive(Debug, Default)]
pub struct FrameDriver {
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Advances the simulation by `dt` seconds and renders the post-step state.
    pub fn frame(&mut self, state: &mut SimulationState, dt: f64, width: u32, height: u32) -> Frame {
        state.apply_pending_edits();

        if !state.paused {
            state.integrator.step(&mut state.scene.bodies, dt);
        }

        let started = Instant::now();
        let frame = render(&state.scene, &state.camera, width, height);
        self.frames += 1;
        debug!(
            "Frame {}: {}x{}, {} bodies, traced in {:?}",
            self.frames,
            frame.width,
            frame.height,
            state.scene.bodies.len(),
            started.elapsed()
        );
        frame
    }

    pub fn run_frame<P: Presenter + ?Sized>(
        &mut self,
        state: &mut SimulationState,
        dt: f64,
        width: u32,
        height: u32,
        presenter: &mut P,
    ) {
        let frame = self.frame(state, dt, width, height);
        presenter.present(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgb8_clamps() {
        assert_eq!(to_rgb8(DVec3::new(-1.0, 0.5, 2.0)), [0, 127, 255]);
    }

    #[test]
    fn test_pixel_offset_past_u32_range() {
        assert_eq!(pixel_offset(69_999, 69_999, 70_000), 70_000usize * 70_000 * 3 - 3);
    }

    #[test]
    fn test_pixel_out_of_range() {
        let frame = Frame { pixels: vec![1, 2, 3, 4, 5, 6], width: 2, height: 1 };
        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.pixel(0, 1), None);
    }

    #[test]
    fn test_growth_factor() {
        let spawn = SpawnParams::default();
        assert!((spawn.growth_factor(0.1) - 1.5).abs() < 1e-12);
        assert_eq!(spawn.growth_factor(-1.0), 1.0);
    }
}
