//! The display/input surface the simulation loop talks to.
//!
//! [`crate::window::WindowFrontend`] is the real implementation. Tests use a
//! recording stand-in so the loop can be exercised without a display.

use crate::color::{Rgb, Rgba};
use crate::error::SimulationError;

/// Input that can end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The window was asked to close.
    Quit,
    /// A key went down (auto-repeat excluded).
    KeyDown,
    /// A pointer button went down.
    PointerDown,
}

impl InputEvent {
    /// Every input event stops the screensaver.
    pub fn stops_simulation(self) -> bool {
        matches!(self, InputEvent::Quit | InputEvent::KeyDown | InputEvent::PointerDown)
    }
}

/// Rendering and input collaborator.
pub trait Frontend {
    /// Drain every pending input event without blocking.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Lay a translucent rectangle over the whole drawable surface.
    fn fill_overlay(&mut self, color: Rgba);

    /// Draw one pixel per point in `color`.
    fn draw_points(&mut self, points: &[(i32, i32)], color: Rgb);

    /// Commit the frame.
    fn present(&mut self) -> Result<(), SimulationError>;

    /// Drawable size in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Monotonic seconds since an arbitrary reference point.
    fn now(&self) -> f64;
}
