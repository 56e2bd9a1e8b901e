//! Frame color selection.

use crate::config::Config;

/// Per-channel frequency multipliers for the color cycle, in `(r, g, b)` order.
pub const CYCLE_FREQUENCIES: [f64; 3] = [0.5, 0.1, 0.9];

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized `[r, g, b, 1.0]` for GPU uniforms.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized `[r, g, b, a]` for GPU uniforms.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Color for this frame's particles.
///
/// With cycling on, each channel is `floor(128 + 127 * sin(t * f))`, which
/// always lands in `[1, 255]`. Otherwise the configured static color.
pub fn frame_color(config: &Config, t: f64) -> Rgb {
    if !config.cycle_color {
        return config.color;
    }

    let channel = |freq: f64| (128.0 + 127.0 * (t * freq).sin()).floor() as u8;
    Rgb::new(
        channel(CYCLE_FREQUENCIES[0]),
        channel(CYCLE_FREQUENCIES[1]),
        channel(CYCLE_FREQUENCIES[2]),
    )
}

/// Black veil laid over the previous frame; its alpha sets trail length.
pub fn overlay_color(config: &Config) -> Rgba {
    Rgba::new(0, 0, 0, config.trail_alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_channels_in_range() {
        let config = Config {
            cycle_color: true,
            ..Config::default()
        };
        let mut t = 0.0;
        while t < 200.0 {
            let c = frame_color(&config, t);
            for ch in [c.r, c.g, c.b] {
                assert!(ch >= 1, "channel {} at t={}", ch, t);
            }
            t += 0.037;
        }
    }

    #[test]
    fn test_cycle_at_zero_is_mid_gray() {
        let config = Config {
            cycle_color: true,
            ..Config::default()
        };
        assert_eq!(frame_color(&config, 0.0), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_cycle_peaks() {
        let config = Config {
            cycle_color: true,
            ..Config::default()
        };
        // sin(t * 0.5) == 1 at t = pi
        let c = frame_color(&config, std::f64::consts::PI);
        assert_eq!(c.r, 255);
        // sin(t * 0.5) == -1 at t = 3 pi
        let c = frame_color(&config, 3.0 * std::f64::consts::PI);
        assert_eq!(c.r, 1);
    }

    #[test]
    fn test_static_color_ignores_time() {
        let config = Config {
            cycle_color: false,
            color: Rgb::new(10, 200, 30),
            ..Config::default()
        };
        for t in [0.0, 1.5, 1e6] {
            assert_eq!(frame_color(&config, t), Rgb::new(10, 200, 30));
        }
    }

    #[test]
    fn test_overlay_uses_trail_alpha() {
        let config = Config {
            trail_alpha: 42,
            ..Config::default()
        };
        assert_eq!(overlay_color(&config), Rgba::new(0, 0, 0, 42));
        assert_eq!(overlay_color(&config).to_array()[3], 42.0 / 255.0);
    }
}
