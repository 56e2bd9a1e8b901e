//! Particle and gravity source records, plus the owned simulation state.

use glam::Vec2;

use crate::config::Config;
use crate::random::RandomSource;

/// Drawable area in pixels, queried once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A point mass pulled toward the gravity sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds spent within `NEAR_RADIUS` of a source, reset when clear of all of them.
    pub near_time: f32,
}

impl Particle {
    /// A fresh particle somewhere on screen with a small random drift.
    pub fn spawn(bounds: Bounds, rng: &mut impl RandomSource) -> Self {
        let mut particle = Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            near_time: 0.0,
        };
        particle.respawn(bounds, rng);
        particle
    }

    /// Re-sample position and velocity in place and clear `near_time`.
    pub fn respawn(&mut self, bounds: Bounds, rng: &mut impl RandomSource) {
        self.position = Vec2::new(rng.uniform(0.0, bounds.width), rng.uniform(0.0, bounds.height));
        self.velocity = Vec2::new(rng.uniform(-1.0, 1.0), rng.uniform(-1.0, 1.0));
        self.near_time = 0.0;
    }
}

/// A moving attractor. Strength `g` is fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySource {
    pub position: Vec2,
    pub velocity: Vec2,
    pub g: f32,
}

impl GravitySource {
    /// Starts at screen center. The velocity range is deliberately lopsided
    /// toward positive axes.
    pub fn spawn(bounds: Bounds, max_g: f32, rng: &mut impl RandomSource) -> Self {
        Self {
            position: bounds.center(),
            velocity: Vec2::new(rng.uniform(-1.0, 5.0), rng.uniform(-1.0, 5.0)),
            g: rng.uniform(0.0, max_g),
        }
    }
}

/// Everything the physics step mutates. Owned by the simulation loop.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub bounds: Bounds,
    pub particles: Vec<Particle>,
    pub sources: Vec<GravitySource>,
}

impl SimulationState {
    /// Populate particles and sources from the configured counts.
    pub fn spawn(config: &Config, bounds: Bounds, rng: &mut impl RandomSource) -> Self {
        let particles = (0..config.particles)
            .map(|_| Particle::spawn(bounds, rng))
            .collect();
        let sources = (0..config.gravity_points)
            .map(|_| GravitySource::spawn(bounds, config.g, rng))
            .collect();

        Self {
            bounds,
            particles,
            sources,
        }
    }

    /// Build a state from explicit entities. Mostly useful in tests.
    pub fn from_parts(bounds: Bounds, particles: Vec<Particle>, sources: Vec<GravitySource>) -> Self {
        Self {
            bounds,
            particles,
            sources,
        }
    }
}
