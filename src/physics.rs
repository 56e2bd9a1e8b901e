//! Per-frame physics update.
//!
//! One call to [`step`] advances the world by one tick:
//!
//! 1. Gravity sources drift and reflect off the screen margin.
//! 2. Each particle accumulates a softened pull from every source in range,
//!    plus a little jitter, and tracks how long it has hugged a source.
//! 3. Velocity is damped and integrated into position.
//! 4. Particles stuck on a source, or flung off screen, are respawned.
//!
//! The force law is `g * d / (|d|² + SOFTENING)^1.5`.

use glam::Vec2;

use crate::entity::{Bounds, GravitySource, Particle, SimulationState};
use crate::random::RandomSource;

/// Fixed simulated time per tick, in seconds.
pub const DELTA_TIME: f32 = 0.016;
/// Distance under which a particle counts as hugging a source.
pub const NEAR_RADIUS: f32 = 10.0;
/// Hugging a source for longer than this triggers a respawn.
pub const RESPAWN_TIME: f32 = 0.5;
/// Softened squared distance beyond which a source is ignored.
pub const MAX_GRAVITY_DISTANCE: f32 = 100_000.0;
/// Gravity sources bounce this far inside the screen edge.
pub const MARGIN: f32 = 5.0;
/// Added to the squared distance so the pull stays finite at zero separation.
pub const SOFTENING: f32 = 100.0;
/// Particles further than this outside the screen are respawned.
pub const OFFSCREEN_MARGIN: f32 = 10.0;
/// Half-width of the per-axis acceleration jitter.
pub const ACCEL_NOISE: f32 = 0.005;

/// What happened during a step, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub stuck_respawns: usize,
    pub offscreen_respawns: usize,
}

/// Advance the whole simulation by one tick.
///
/// `damp` is the per-tick velocity multiplier in `[0, 1]`.
pub fn step(state: &mut SimulationState, damp: f32, rng: &mut impl RandomSource) -> StepReport {
    let bounds = state.bounds;

    for source in &mut state.sources {
        move_source(source, bounds);
    }

    let mut report = StepReport::default();
    for particle in &mut state.particles {
        let accel = accumulate(particle, &state.sources, rng);

        particle.velocity = (particle.velocity + accel) * damp;
        particle.position += particle.velocity;

        if particle.near_time > RESPAWN_TIME {
            particle.respawn(bounds, rng);
            report.stuck_respawns += 1;
        }

        if is_offscreen(particle.position, bounds) {
            particle.respawn(bounds, rng);
            report.offscreen_respawns += 1;
        }
    }

    report
}

/// Integrate a source and reflect it off the margin box. No energy is lost.
pub fn move_source(source: &mut GravitySource, bounds: Bounds) {
    source.position += source.velocity;

    let max_x = bounds.width - MARGIN;
    let max_y = bounds.height - MARGIN;

    if source.position.x < MARGIN || source.position.x > max_x {
        source.velocity.x = -source.velocity.x;
        source.position.x = source.position.x.max(MARGIN).min(max_x);
    }
    if source.position.y < MARGIN || source.position.y > max_y {
        source.velocity.y = -source.velocity.y;
        source.position.y = source.position.y.max(MARGIN).min(max_y);
    }
}

/// Sum the pull of every source on `particle` and update its `near_time`.
///
/// `near_time` grows by `DELTA_TIME` once per source in range, so two
/// overlapping sources age a particle twice as fast.
fn accumulate(particle: &mut Particle, sources: &[GravitySource], rng: &mut impl RandomSource) -> Vec2 {
    let mut accel = Vec2::ZERO;
    let mut near_any = false;

    for source in sources {
        let d = source.position - particle.position;
        let r2 = d.length_squared();
        let dist2 = r2 + SOFTENING;
        if dist2 > MAX_GRAVITY_DISTANCE {
            continue;
        }

        let invd = 1.0 / dist2.sqrt();
        accel += source.g * d * invd / dist2;
        accel.x += rng.uniform(-ACCEL_NOISE, ACCEL_NOISE);
        accel.y += rng.uniform(-ACCEL_NOISE, ACCEL_NOISE);

        if r2 < NEAR_RADIUS * NEAR_RADIUS {
            particle.near_time += DELTA_TIME;
            near_any = true;
        }
    }

    if !near_any {
        particle.near_time = 0.0;
    }

    accel
}

/// Outside the screen plus `OFFSCREEN_MARGIN` on any side.
pub fn is_offscreen(position: Vec2, bounds: Bounds) -> bool {
    position.x < -OFFSCREEN_MARGIN
        || position.x > bounds.width + OFFSCREEN_MARGIN
        || position.y < -OFFSCREEN_MARGIN
        || position.y > bounds.height + OFFSCREEN_MARGIN
}
