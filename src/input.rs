//! Translation of raw window events into [`InputEvent`]s.
//!
//! `Input` buffers the events that matter to the screensaver between polls.
//! Key auto-repeat is dropped so a held key counts once.

use winit::event::{ElementState, WindowEvent};

use crate::frontend::InputEvent;

/// Pending input, filled from window events and drained once per tick.
#[derive(Debug, Default)]
pub struct Input {
    pending: Vec<InputEvent>,
}

impl Input {
    /// Create an empty input queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an already-translated event.
    pub fn push(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Whether anything is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        if let Some(e) = translate(event) {
            self.push(e);
        }
    }
}

/// Map a window event to the input it represents, if any.
pub fn translate(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested => Some(InputEvent::Quit),
        WindowEvent::KeyboardInput { event, .. } => {
            (event.state == ElementState::Pressed && !event.repeat).then_some(InputEvent::KeyDown)
        }
        WindowEvent::MouseInput { state, .. } => {
            (*state == ElementState::Pressed).then_some(InputEvent::PointerDown)
        }
        _ => None,
    }
}
