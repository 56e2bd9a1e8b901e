//! # gravsaver
//!
//! A fullscreen screensaver: thousands of particles fall toward a few
//! drifting gravity sources and leave fading trails behind them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gravsaver::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let config = Config::load_default();
//!     let frontend = WindowFrontend::open(config.particles)?;
//!     Simulation::new(config, frontend).run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Configuration
//!
//! [`Config`] is read once from a `key=value` file. Bad lines are skipped,
//! never fatal; [`Config::parse`] hands them back for inspection.
//!
//! ### Physics
//!
//! [`physics::step`] is a pure function over [`SimulationState`]: sources
//! drift and bounce, particles are pulled, damped and integrated, and those
//! that get stuck on a source or leave the screen are respawned.
//!
//! ### Frontend
//!
//! The [`Frontend`] trait is everything the loop needs from the outside
//! world: input events, a translucent overlay, points, present, the display
//! size and a clock. [`WindowFrontend`] implements it with winit and wgpu;
//! tests implement it with a recorder.
//!
//! ### Randomness
//!
//! Anything random goes through [`RandomSource`], so a seeded RNG gives the
//! same trajectory every time.

pub mod color;
pub mod config;
pub mod entity;
pub mod error;
pub mod frontend;
mod gpu;
pub mod input;
pub mod physics;
pub mod random;
mod shader;
pub mod simulation;
pub mod time;
pub mod window;

pub use glam::Vec2;

pub use color::{frame_color, overlay_color, Rgb, Rgba};
pub use config::{Config, RejectReason, Rejected};
pub use entity::{Bounds, GravitySource, Particle, SimulationState};
pub use error::{GpuError, SimulationError};
pub use frontend::{Frontend, InputEvent};
pub use physics::StepReport;
pub use random::RandomSource;
pub use simulation::{LoopState, Simulation};
pub use window::WindowFrontend;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use gravsaver::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{Rgb, Rgba};
    pub use crate::config::Config;
    pub use crate::entity::{Bounds, GravitySource, Particle, SimulationState};
    pub use crate::error::SimulationError;
    pub use crate::frontend::{Frontend, InputEvent};
    pub use crate::random::RandomSource;
    pub use crate::simulation::{LoopState, Simulation};
    pub use crate::window::WindowFrontend;
    pub use crate::Vec2;
}
