//! Main entry point for the gravity tracer.
//!
//! This module handles:
//! - Command-line argument parsing
//! - Scenario selection (built-in preset or YAML file)
//! - Window creation and event loop
//! - User input handling (mouse, keyboard)
//! - Headless frame capture
//!
//! # Event Handling
//! - Middle drag: orbit camera (with shift: pan)
//! - Mouse wheel: zoom
//! - Left press / release: spawn a body at the camera target / launch it
//! - Right held: grow the body being spawned
//! - Arrow keys: nudge the body being spawned (shift + up/down: depth)
//! - X: delete the last body
//! - K: pause / resume
//! - G: show / hide the spacetime grid
//! - Q/Escape: exit

use anyhow::{Context, Result};
use clap::Parser;
use glam::DVec3;
use gravity_tracer::{
    config::{Preset, RenderConfig, ScenarioConfig},
    input::{Button, CameraController, Modifiers, PointerTracker, ResolutionPolicy},
    present::QuadPresenter,
    FrameDriver, SceneEdit, SimulationState,
};
use log::info;
use std::{path::PathBuf, sync::Arc, time::Instant};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

#[derive(Parser, Debug)]
#[command(name = "gravity_tracer")]
#[command(about = "Interactive N-body gravity sandbox with a CPU ray tracer")]
struct Args {
    /// Window width in pixels (overrides the scenario)
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels (overrides the scenario)
    #[arg(long)]
    height: Option<u32>,

    /// Built-in starting scene
    #[arg(long, value_enum, default_value_t = Preset::Spheres)]
    preset: Preset,

    /// YAML scenario file (takes precedence over --preset)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Render headless and save the last frame as a PNG
    #[arg(long)]
    save_frame: Option<PathBuf>,

    /// Number of frames to simulate before saving (headless mode)
    #[arg(long, default_value = "1")]
    frames: u32,

    /// Start with the simulation paused
    #[arg(long)]
    paused: bool,

    /// Show the spacetime grid
    #[arg(long)]
    grid: bool,
}

const HEADLESS_DT: f64 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (mut state, render) = load_state(&args)?;
    if args.paused {
        state.paused = true;
    }
    if args.grid {
        state.scene.grid.visible = true;
    }
    let width = args.width.unwrap_or(render.width).max(1);
    let height = args.height.unwrap_or(render.height).max(1);

    if let Some(output_path) = &args.save_frame {
        return run_headless(state, width, height, args.frames, output_path);
    }

    run_interactive(state, width, height)
}

fn load_state(args: &Args) -> Result<(SimulationState, RenderConfig)> {
    match &args.scenario {
        Some(path) => {
            let config = ScenarioConfig::load(path)?;
            let state = config
                .build()
                .with_context(|| format!("invalid scenario {}", path.display()))?;
            Ok((state, config.render))
        }
        None => {
            info!("Using {:?} preset", args.preset);
            Ok((args.preset.build(), RenderConfig::default()))
        }
    }
}

fn run_headless(
    mut state: SimulationState,
    width: u32,
    height: u32,
    frames: u32,
    output_path: &PathBuf,
) -> Result<()> {
    info!("Running headless, {} frames at {}x{}", frames.max(1), width, height);

    let mut driver = FrameDriver::new();
    let mut frame = driver.frame(&mut state, HEADLESS_DT, width, height);
    for _ in 1..frames {
        frame = driver.frame(&mut state, HEADLESS_DT, width, height);
    }

    image::save_buffer(output_path, &frame.pixels, frame.width, frame.height, image::ColorType::Rgb8)
        .with_context(|| format!("saving frame to {}", output_path.display()))?;
    info!("Frame saved to {}", output_path.display());
    Ok(())
}

struct ApplicationState {
    simulation: SimulationState,
    driver: FrameDriver,
    controller: CameraController,
    pointer: PointerTracker,
    resolution: ResolutionPolicy,
    modifiers: Modifiers,
    growing: bool,
    last_frame: Instant,
}

fn run_interactive(simulation: SimulationState, width: u32, height: u32) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Gravity Tracer")
            .with_inner_size(PhysicalSize::new(width, height))
            .build(&event_loop)?,
    );
    let mut presenter = pollster::block_on(QuadPresenter::new(window.clone()))?;

    let size = window.inner_size();
    let mut app_state = ApplicationState {
        simulation,
        driver: FrameDriver::new(),
        controller: CameraController::default(),
        pointer: PointerTracker::default(),
        resolution: ResolutionPolicy::new(size.width.max(1), size.height.max(1)),
        modifiers: Modifiers::NONE,
        growing: false,
        last_frame: Instant::now(),
    };

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::AboutToWait => presenter.window().request_redraw(),
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    handle_resize(&mut app_state, &mut presenter, physical_size);
                }
                WindowEvent::ModifiersChanged(modifiers) => {
                    app_state.modifiers = Modifiers {
                        shift: modifiers.state().shift_key(),
                    };
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    handle_mouse_input(&mut app_state, state, button);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    handle_cursor_moved(&mut app_state, position);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    handle_mouse_wheel(&mut app_state, delta);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => handle_key(&mut app_state, code, elwt),
                WindowEvent::RedrawRequested => {
                    handle_redraw(&mut app_state, &mut presenter, elwt);
                }
                _ => {}
            },
            _ => {}
        }
    })?;

    Ok(())
}

fn handle_resize(state: &mut ApplicationState, presenter: &mut QuadPresenter, size: PhysicalSize<u32>) {
    presenter.resize(size);
    if size.width > 0 && size.height > 0 {
        state.resolution.width = size.width;
        state.resolution.height = size.height;
    }
}

fn map_button(button: MouseButton) -> Option<Button> {
    match button {
        MouseButton::Left => Some(Button::Left),
        MouseButton::Middle => Some(Button::Middle),
        MouseButton::Right => Some(Button::Right),
        _ => None,
    }
}

fn handle_mouse_input(state: &mut ApplicationState, element_state: ElementState, button: MouseButton) {
    let Some(button) = map_button(button) else {
        return;
    };
    let pressed = element_state == ElementState::Pressed;

    if pressed {
        state.controller.button_pressed(button);
    } else {
        state.controller.button_released(button);
    }

    match button {
        Button::Left if pressed => {
            let position = state.simulation.camera.target();
            state.simulation.queue(SceneEdit::SpawnBegin { position });
        }
        Button::Left => state.simulation.queue(SceneEdit::Release { velocity: DVec3::ZERO }),
        Button::Right => state.growing = pressed,
        Button::Middle => state.pointer.reset(),
    }
}

fn handle_cursor_moved(state: &mut ApplicationState, position: PhysicalPosition<f64>) {
    let delta = state.pointer.sample(position.x, position.y);
    if !state.controller.is_dragging() {
        return;
    }
    if let Some((delta_x, delta_y)) = delta {
        state
            .controller
            .pointer_moved(&mut state.simulation.camera, delta_x, delta_y, state.modifiers);
    }
}

fn handle_mouse_wheel(state: &mut ApplicationState, delta: MouseScrollDelta) {
    let scroll_amount = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(pos) => pos.y / 50.0,
    };
    state.controller.scrolled(&mut state.simulation.camera, scroll_amount);
}

fn handle_key(state: &mut ApplicationState, code: KeyCode, elwt: &EventLoopWindowTarget<()>) {
    let shift = state.modifiers.shift;
    let nudge = |offset: DVec3| SceneEdit::Nudge { offset };

    match code {
        KeyCode::KeyQ | KeyCode::Escape => elwt.exit(),
        KeyCode::KeyK => state.simulation.toggle_pause(),
        KeyCode::KeyG => state.simulation.toggle_grid(),
        KeyCode::KeyX => state.simulation.queue(SceneEdit::DeleteLast),
        KeyCode::ArrowUp if shift => state.simulation.queue(nudge(DVec3::Z)),
        KeyCode::ArrowDown if shift => state.simulation.queue(nudge(DVec3::NEG_Z)),
        KeyCode::ArrowUp => state.simulation.queue(nudge(DVec3::Y)),
        KeyCode::ArrowDown => state.simulation.queue(nudge(DVec3::NEG_Y)),
        KeyCode::ArrowRight => state.simulation.queue(nudge(DVec3::X)),
        KeyCode::ArrowLeft => state.simulation.queue(nudge(DVec3::NEG_X)),
        _ => {}
    }
}

fn handle_redraw(state: &mut ApplicationState, presenter: &mut QuadPresenter, elwt: &EventLoopWindowTarget<()>) {
    let now = Instant::now();
    let dt = now.duration_since(state.last_frame).as_secs_f64();
    state.last_frame = now;

    if state.growing && state.simulation.is_authoring() {
        let factor = state.simulation.spawn.growth_factor(dt);
        state.simulation.queue(SceneEdit::Grow { factor });
    }

    let (width, height) = state.resolution.render_size(state.controller.since_last_motion(now));
    state
        .driver
        .run_frame(&mut state.simulation, dt, width, height, presenter);

    if presenter.out_of_memory() {
        elwt.exit();
    }
}
