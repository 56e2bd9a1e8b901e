//! The fullscreen winit + wgpu [`Frontend`].

use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowId},
};

use crate::color::{Rgb, Rgba};
use crate::error::SimulationError;
use crate::frontend::{Frontend, InputEvent};
use crate::gpu::{FrameCommands, GpuState};
use crate::input::Input;
use crate::time::Time;

/// How many times to pump the event loop while waiting for the window.
const STARTUP_PUMPS: u32 = 200;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);
const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Receives winit callbacks. Events are buffered into `input` and handed
/// out on the next poll.
struct Host {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    input: Input,
    point_capacity: usize,
    init_error: Option<SimulationError>,
}

impl Host {
    fn new(point_capacity: usize) -> Self {
        Self {
            window: None,
            gpu_state: None,
            input: Input::new(),
            point_capacity,
            init_error: None,
        }
    }

    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title("gravsaver")
            .with_fullscreen(Some(Fullscreen::Borderless(None)));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        window.set_cursor_visible(false);

        // The fullscreen Resized event may not have arrived yet.
        let size = initial_size(window.current_monitor().map(|m| m.size()), window.inner_size());
        log::debug!("Initial drawable size {}x{}", size.width, size.height);

        let gpu_state =
            pollster::block_on(GpuState::new(window.clone(), size, self.point_capacity))?;

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }
}

/// Size of a borderless fullscreen window: the monitor's, unless unknown.
fn initial_size(monitor: Option<PhysicalSize<u32>>, inner: PhysicalSize<u32>) -> PhysicalSize<u32> {
    match monitor {
        Some(size) if size.width > 0 && size.height > 0 => size,
        _ => inner,
    }
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create(event_loop) {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        if let WindowEvent::Resized(physical_size) = event {
            if let Some(gpu_state) = &mut self.gpu_state {
                gpu_state.resize(physical_size);
            }
        }
    }
}

/// Fullscreen window rendered with wgpu.
///
/// The event loop is pumped without blocking from [`Frontend::poll_events`],
/// so the simulation loop, not winit, decides the frame cadence. Dropping the
/// frontend closes the window.
pub struct WindowFrontend {
    event_loop: EventLoop<()>,
    host: Host,
    frame: FrameCommands,
    time: Time,
}

impl WindowFrontend {
    /// Open the window and bring up the GPU.
    ///
    /// `point_capacity` sizes the initial vertex buffer; it grows if needed.
    pub fn open(point_capacity: usize) -> Result<Self, SimulationError> {
        let mut event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut host = Host::new(point_capacity);

        // The window is created in `resumed`, which arrives on an early pump.
        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut host);
            if let Some(e) = host.init_error.take() {
                return Err(e);
            }
            if host.gpu_state.is_some() {
                break;
            }
            if let PumpStatus::Exit(_) = status {
                return Err(SimulationError::WindowClosed);
            }
        }
        if host.gpu_state.is_none() {
            return Err(SimulationError::StartupTimeout(STARTUP_PUMPS));
        }

        Ok(Self {
            event_loop,
            host,
            frame: FrameCommands::with_capacity(point_capacity),
            time: Time::with_fps_interval(FPS_LOG_INTERVAL),
        })
    }
}

impl Frontend for WindowFrontend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.host);
        if let PumpStatus::Exit(_) = status {
            self.host.input.push(InputEvent::Quit);
        }
        self.host.input.drain()
    }

    fn fill_overlay(&mut self, color: Rgba) {
        self.frame.overlay = Some(color);
    }

    /// Points from several calls in one frame share the last call's color.
    fn draw_points(&mut self, points: &[(i32, i32)], color: Rgb) {
        self.frame
            .points
            .extend(points.iter().map(|&(x, y)| [x as f32, y as f32]));
        self.frame.point_color = color;
    }

    fn present(&mut self) -> Result<(), SimulationError> {
        let gpu_state = self
            .host
            .gpu_state
            .as_mut()
            .ok_or(SimulationError::WindowClosed)?;

        gpu_state.render(&self.frame)?;
        self.frame.clear();

        if self.time.update() {
            log::debug!("{:.1} fps ({} frames)", self.time.fps(), self.time.frame());
        }
        Ok(())
    }

    fn display_size(&self) -> (u32, u32) {
        self.host
            .gpu_state
            .as_ref()
            .map(GpuState::size)
            .unwrap_or((0, 0))
    }

    fn now(&self) -> f64 {
        self.time.elapsed()
    }
}
