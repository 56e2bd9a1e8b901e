//! Simulation driver.
//!
//! Owns the world state and the random source, and is the only code that
//! talks to the [`Frontend`]. Each tick:
//!
//! 1. drain input; any event stops the run
//! 2. advance physics once
//! 3. fade the previous frame with the trail overlay
//! 4. draw every particle in this frame's color
//! 5. present, then sleep out the rest of the 16 ms budget

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;

use crate::color::{frame_color, overlay_color};
use crate::config::Config;
use crate::entity::{Bounds, SimulationState};
use crate::error::SimulationError;
use crate::frontend::Frontend;
use crate::physics;
use crate::random::{entropy_rng, RandomSource};

/// Wall-clock budget per tick (~60 ticks per second).
pub const TICK: Duration = Duration::from_millis(16);

/// Run state of the loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// The screensaver: state, randomness and a frontend to draw on.
pub struct Simulation<F: Frontend, R: RandomSource = SmallRng> {
    config: Config,
    state: SimulationState,
    frontend: F,
    rng: R,
    loop_state: LoopState,
    points: Vec<(i32, i32)>,
}

impl<F: Frontend> Simulation<F, SmallRng> {
    /// Create a simulation seeded from OS entropy.
    pub fn new(config: Config, frontend: F) -> Self {
        Self::with_rng(config, frontend, entropy_rng())
    }
}

impl<F: Frontend, R: RandomSource> Simulation<F, R> {
    /// Create a simulation with an explicit random source.
    ///
    /// The display size is read from the frontend here and never again.
    pub fn with_rng(config: Config, frontend: F, mut rng: R) -> Self {
        let (width, height) = frontend.display_size();
        let bounds = Bounds::new(width, height);
        let state = SimulationState::spawn(&config, bounds, &mut rng);

        log::info!(
            "Simulating {} particles around {} gravity source(s) on {}x{}",
            state.particles.len(),
            state.sources.len(),
            width,
            height
        );

        Self {
            points: Vec::with_capacity(state.particles.len()),
            config,
            state,
            frontend,
            rng,
            loop_state: LoopState::Running,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mutable access to the world, for setting up scenarios.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Release the frontend once the run is over.
    pub fn into_frontend(self) -> F {
        self.frontend
    }

    /// Run one loop iteration. Does nothing once stopped.
    pub fn tick(&mut self) -> Result<LoopState, SimulationError> {
        if self.loop_state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }

        for event in self.frontend.poll_events() {
            if event.stops_simulation() {
                log::info!("Stopping on {:?}", event);
                self.loop_state = LoopState::Stopped;
            }
        }
        if self.loop_state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }

        let report = physics::step(&mut self.state, self.config.damp, &mut self.rng);
        if report.stuck_respawns + report.offscreen_respawns > 0 {
            log::trace!(
                "respawned {} stuck, {} offscreen",
                report.stuck_respawns,
                report.offscreen_respawns
            );
        }

        self.frontend.fill_overlay(overlay_color(&self.config));

        let color = frame_color(&self.config, self.frontend.now());
        self.points.clear();
        self.points.extend(
            self.state
                .particles
                .iter()
                .map(|p| (p.position.x as i32, p.position.y as i32)),
        );
        self.frontend.draw_points(&self.points, color);

        self.frontend.present()?;
        Ok(LoopState::Running)
    }

    /// Tick until an input event stops the run.
    ///
    /// Overrunning ticks are not caught up; the next one simply starts late.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        while self.loop_state == LoopState::Running {
            let started = Instant::now();
            if self.tick()? == LoopState::Stopped {
                break;
            }
            let spent = started.elapsed();
            if spent < TICK {
                thread::sleep(TICK - spent);
            }
        }
        Ok(())
    }
}
