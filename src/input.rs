//! Pointer state and camera gestures.
//!
//! Window events arrive as absolute cursor positions; [`PointerTracker`] turns
//! them into deltas and [`CameraController`] maps the deltas onto orbit, pan
//! and zoom. All state lives in these objects, so the first sample after a
//! button press is handled explicitly instead of through hidden statics.

use std::time::{Duration, Instant};

use crate::camera::OrbitCamera;

const MOVING_DIVISOR: u32 = 4;
const IDLE_DIVISOR: u32 = 2;
const MOTION_WINDOW: Duration = Duration::from_millis(200);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Left,
    Middle,
    Right,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// Converts absolute cursor positions into per-event deltas.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    last_sample: Option<(f64, f64)>,
}

impl PointerTracker {
    /// Delta since the previous sample; `None` for the first sample.
    pub fn sample(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let delta = self.last_sample.map(|(last_x, last_y)| (x - last_x, y - last_y));
        self.last_sample = Some((x, y));
        delta
    }

    pub fn reset(&mut self) {
        self.last_sample = None;
    }
}

/// Drives an [`OrbitCamera`] from drag and scroll gestures.
#[derive(Clone, Debug)]
pub struct CameraController {
    drag_button: Button,
    dragging: bool,
    last_motion: Option<Instant>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(Button::Middle)
    }
}

impl CameraController {
    pub fn new(drag_button: Button) -> Self {
        Self {
            drag_button,
            dragging: false,
            last_motion: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn button_pressed(&mut self, button: Button) {
        if button == self.drag_button {
            self.dragging = true;
            self.touch();
        }
    }

    pub fn button_released(&mut self, button: Button) {
        if button == self.drag_button {
            self.dragging = false;
        }
    }

    /// Orbits while dragging, pans while dragging with shift held.
    pub fn pointer_moved(&mut self, camera: &mut OrbitCamera, delta_x: f64, delta_y: f64, modifiers: Modifiers) {
        if !self.dragging {
            return;
        }
        if modifiers.shift {
            camera.pan(delta_x, delta_y);
        } else {
            camera.orbit(delta_x, delta_y);
        }
        self.touch();
    }

    pub fn scrolled(&mut self, camera: &mut OrbitCamera, delta: f64) {
        camera.zoom(delta);
        self.touch();
    }

    pub fn since_last_motion(&self, now: Instant) -> Option<Duration> {
        self.last_motion.map(|last| now.saturating_duration_since(last))
    }

    fn touch(&mut self) {
        self.last_motion = Some(Instant::now());
    }
}

/// Lowers the render resolution while the camera is moving.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolutionPolicy {
    pub width: u32,
    pub height: u32,
    pub moving_divisor: u32,
    pub idle_divisor: u32,
    pub motion_window: Duration,
}

impl ResolutionPolicy {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            moving_divisor: MOVING_DIVISOR,
            idle_divisor: IDLE_DIVISOR,
            motion_window: MOTION_WINDOW,
        }
    }

    pub fn is_moving(&self, since_last_motion: Option<Duration>) -> bool {
        since_last_motion.map_or(false, |elapsed| elapsed < self.motion_window)
    }

    pub fn render_size(&self, since_last_motion: Option<Duration>) -> (u32, u32) {
        let divisor = if self.is_moving(since_last_motion) {
            self.moving_divisor
        } else {
            self.idle_divisor
        }
        .max(1);
        ((self.width / divisor).max(1), (self.height / divisor).max(1))
    }
}
