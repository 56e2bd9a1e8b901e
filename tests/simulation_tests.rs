//! Integration tests for the simulation loop.
//!
//! A recording frontend stands in for the window so the loop can be driven
//! tick by tick and every draw call inspected.

use std::collections::VecDeque;

use gravsaver::physics::{self, MARGIN, OFFSCREEN_MARGIN};
use gravsaver::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

// ============================================================================
// Recording frontend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Overlay(Rgba),
    Points(usize, Rgb),
    Present,
}

struct Recorder {
    size: (u32, u32),
    clock: f64,
    /// Events delivered on successive polls; empty polls once exhausted.
    scripted: VecDeque<Vec<InputEvent>>,
    calls: Vec<Call>,
    last_points: Vec<(i32, i32)>,
    polls: usize,
}

impl Recorder {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            clock: 0.0,
            scripted: VecDeque::new(),
            calls: Vec::new(),
            last_points: Vec::new(),
            polls: 0,
        }
    }

    fn with_events(mut self, polls: Vec<Vec<InputEvent>>) -> Self {
        self.scripted = polls.into();
        self
    }

    fn presents(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Present).count()
    }
}

impl Frontend for Recorder {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.polls += 1;
        self.scripted.pop_front().unwrap_or_default()
    }

    fn fill_overlay(&mut self, color: Rgba) {
        self.calls.push(Call::Overlay(color));
    }

    fn draw_points(&mut self, points: &[(i32, i32)], color: Rgb) {
        self.last_points = points.to_vec();
        self.calls.push(Call::Points(points.len(), color));
    }

    fn present(&mut self) -> Result<(), SimulationError> {
        self.calls.push(Call::Present);
        self.clock += 0.016;
        Ok(())
    }

    fn display_size(&self) -> (u32, u32) {
        self.size
    }

    fn now(&self) -> f64 {
        self.clock
    }
}

fn small_config() -> Config {
    Config {
        particles: 500,
        gravity_points: 3,
        ..Config::default()
    }
}

fn seeded(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

// ============================================================================
// Loop behavior
// ============================================================================

#[test]
fn test_tick_draws_overlay_then_points_then_presents() {
    let config = Config {
        cycle_color: false,
        color: Rgb::new(9, 8, 7),
        trail_alpha: 33,
        ..small_config()
    };
    let mut sim = Simulation::with_rng(config, Recorder::new(640, 480), seeded(1));

    assert_eq!(sim.tick().unwrap(), LoopState::Running);

    assert_eq!(
        sim.frontend().calls,
        vec![
            Call::Overlay(Rgba::new(0, 0, 0, 33)),
            Call::Points(500, Rgb::new(9, 8, 7)),
            Call::Present,
        ]
    );
}

#[test]
fn test_points_are_truncated_positions() {
    let mut sim = Simulation::with_rng(small_config(), Recorder::new(640, 480), seeded(2));
    sim.tick().unwrap();

    let expected: Vec<(i32, i32)> = sim
        .state()
        .particles
        .iter()
        .map(|p| (p.position.x as i32, p.position.y as i32))
        .collect();
    assert_eq!(sim.frontend().last_points, expected);
}

#[test]
fn test_any_input_stops_before_physics() {
    for event in [InputEvent::Quit, InputEvent::KeyDown, InputEvent::PointerDown] {
        let frontend = Recorder::new(640, 480).with_events(vec![vec![], vec![event]]);
        let mut sim = Simulation::with_rng(small_config(), frontend, seeded(3));

        assert_eq!(sim.tick().unwrap(), LoopState::Running);
        let before: Vec<Particle> = sim.state().particles.clone();

        assert_eq!(sim.tick().unwrap(), LoopState::Stopped);
        assert_eq!(sim.loop_state(), LoopState::Stopped);
        assert_eq!(sim.state().particles, before, "physics ran after {:?}", event);
        assert_eq!(sim.frontend().presents(), 1);
    }
}

#[test]
fn test_stopped_is_terminal() {
    let frontend = Recorder::new(640, 480).with_events(vec![vec![InputEvent::Quit]]);
    let mut sim = Simulation::with_rng(small_config(), frontend, seeded(4));

    assert_eq!(sim.tick().unwrap(), LoopState::Stopped);
    assert_eq!(sim.tick().unwrap(), LoopState::Stopped);
    assert_eq!(sim.frontend().polls, 1);
    assert_eq!(sim.frontend().presents(), 0);
}

#[test]
fn test_run_exits_on_quit() {
    let frontend =
        Recorder::new(320, 240).with_events(vec![vec![], vec![], vec![InputEvent::KeyDown]]);
    let mut sim = Simulation::with_rng(small_config(), frontend, seeded(5));

    sim.run().unwrap();

    assert_eq!(sim.loop_state(), LoopState::Stopped);
    assert_eq!(sim.into_frontend().presents(), 2);
}

#[test]
fn test_cycling_color_follows_frontend_clock() {
    let mut sim = Simulation::with_rng(small_config(), Recorder::new(640, 480), seeded(6));
    for _ in 0..3 {
        sim.tick().unwrap();
    }

    let colors: Vec<Rgb> = sim
        .frontend()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Points(_, color) => Some(*color),
            _ => None,
        })
        .collect();
    let config = sim.config().clone();
    assert_eq!(colors[0], gravsaver::frame_color(&config, 0.0));
    assert_eq!(colors[2], gravsaver::frame_color(&config, 0.032));
}

// ============================================================================
// Long-run invariants
// ============================================================================

#[test]
fn test_invariants_hold_over_many_ticks() {
    let (width, height) = (800.0, 600.0);
    let config = Config {
        particles: 2000,
        gravity_points: 4,
        g: 2000.0,
        ..Config::default()
    };
    let mut sim = Simulation::with_rng(config, Recorder::new(800, 600), seeded(7));

    for tick in 0..600 {
        sim.tick().unwrap();
        let state = sim.state();

        for p in &state.particles {
            assert!(p.position.is_finite() && p.velocity.is_finite(), "tick {}", tick);
            assert!(p.near_time >= 0.0);
            assert!(p.near_time <= physics::RESPAWN_TIME);
            assert!(!physics::is_offscreen(p.position, state.bounds));
            assert!(p.position.x >= -OFFSCREEN_MARGIN && p.position.x <= width + OFFSCREEN_MARGIN);
        }
        for s in &state.sources {
            assert!(s.position.x >= MARGIN && s.position.x <= width - MARGIN);
            assert!(s.position.y >= MARGIN && s.position.y <= height - MARGIN);
        }
    }
}

#[test]
fn test_same_seed_same_trajectory() {
    let mut a = Simulation::with_rng(small_config(), Recorder::new(640, 480), seeded(42));
    let mut b = Simulation::with_rng(small_config(), Recorder::new(640, 480), seeded(42));

    for _ in 0..50 {
        a.tick().unwrap();
        b.tick().unwrap();
    }
    assert_eq!(a.state().particles, b.state().particles);
    assert_eq!(a.state().sources, b.state().sources);
}

#[test]
fn test_zero_sources_only_damps() {
    let config = Config {
        particles: 300,
        gravity_points: 0,
        damp: 0.9,
        ..Config::default()
    };
    let mut sim = Simulation::with_rng(config, Recorder::new(640, 480), seeded(9));
    let start_speed: f32 = sim.state().particles.iter().map(|p| p.velocity.length()).sum();

    for _ in 0..100 {
        sim.tick().unwrap();
        assert!(sim.state().particles.iter().all(|p| p.near_time == 0.0));
    }

    let end_speed: f32 = sim.state().particles.iter().map(|p| p.velocity.length()).sum();
    assert!(end_speed < start_speed * 0.01);
}

#[test]
fn test_particle_parked_on_source_respawns() {
    let mut sim = Simulation::with_rng(small_config(), Recorder::new(640, 480), seeded(10));
    {
        let state = sim.state_mut();
        state.sources.truncate(1);
        state.sources[0] = GravitySource {
            position: Vec2::new(320.0, 240.0),
            velocity: Vec2::ZERO,
            g: 0.0,
        };
        state.particles.truncate(1);
        state.particles[0] = Particle {
            position: Vec2::new(320.0, 240.0),
            velocity: Vec2::ZERO,
            near_time: 0.0,
        };
    }

    // 0.016 per tick: exceeds 0.5 on the 32nd tick. Only jitter moves it.
    let center = Vec2::new(320.0, 240.0);
    for tick in 1..=31 {
        sim.tick().unwrap();
        let p = sim.state().particles[0];
        assert!((p.position - center).length() < physics::NEAR_RADIUS);
        assert!((p.near_time - tick as f32 * physics::DELTA_TIME).abs() < 1e-4);
    }
    sim.tick().unwrap();
    let p = sim.state().particles[0];
    assert_eq!(p.near_time, 0.0);
    assert!(p.position.x >= 0.0 && p.position.x < 640.0);
    assert!(p.position.y >= 0.0 && p.position.y < 480.0);
}
