//! Settings loaded from a `key=value` text file.
//!
//! Every value is an integer. Booleans are `0`/`1`, and damping is given in
//! percent. Anything that does not parse, is not a known key, or is out of
//! range is skipped and the default stays in place. A bad config file never
//! stops the screensaver from starting.
//!
//! ```text
//! # gravsaver.conf
//! gravity_points=3
//! particles=20000
//! cycle_color=0
//! color_r=255
//! color_g=120
//! color_b=0
//! trail_alpha=25
//! g=800
//! damp=98
//! ```
//!
//! | key | valid range | effect |
//! |-----|-------------|--------|
//! | `gravity_points` | > 0 | number of gravity sources |
//! | `particles` | > 0 | number of particles |
//! | `cycle_color` | 0 or 1 | time-based coloring |
//! | `color_r` / `color_g` / `color_b` | 0..=255 | static color |
//! | `trail_alpha` | 0..=255 | opacity of the per-frame fade |
//! | `g` | > 0 | upper bound for source strength |
//! | `damp` | 0..=100 | velocity damping, stored as `value / 100` |

use std::fmt;
use std::io;
use std::path::Path;

use crate::color::Rgb;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "GRAVSAVER_CONFIG";
/// Config file looked up in the working directory when `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "gravsaver.conf";

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gravity_points: usize,
    pub particles: usize,
    pub cycle_color: bool,
    pub color: Rgb,
    pub trail_alpha: u8,
    /// Upper bound (exclusive) for each source's strength.
    pub g: f32,
    /// Velocity multiplier applied every tick.
    pub damp: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravity_points: 1,
            particles: 10_000,
            cycle_color: true,
            color: Rgb::WHITE,
            trail_alpha: 20,
            g: 500.0,
            damp: 0.99,
        }
    }
}

/// Why a config line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No `=` on the line.
    MissingSeparator,
    /// The key is not one we know.
    UnknownKey,
    /// The value is not an integer.
    InvalidValue,
    /// The value is an integer but outside the key's range.
    OutOfRange,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingSeparator => write!(f, "expected key=value"),
            RejectReason::UnknownKey => write!(f, "unknown key"),
            RejectReason::InvalidValue => write!(f, "value is not an integer"),
            RejectReason::OutOfRange => write!(f, "value out of range"),
        }
    }
}

/// A config line that was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
    pub reason: RejectReason,
}

impl Config {
    /// Parse config text, returning the settings and every line that was skipped.
    pub fn parse(text: &str) -> (Config, Vec<Rejected>) {
        let mut config = Config::default();
        let mut rejected = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Err(reason) = config.apply_line(line) {
                rejected.push(Rejected {
                    line: idx + 1,
                    text: raw.to_string(),
                    reason,
                });
            }
        }

        (config, rejected)
    }

    /// Read and parse a config file. Never fails: problems are logged and
    /// defaults are used.
    pub fn load(path: impl AsRef<Path>) -> Config {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Config::default();
            }
            Err(e) => {
                log::warn!("Could not read config {}: {}; using defaults", path.display(), e);
                return Config::default();
            }
        };

        let (config, rejected) = Config::parse(&text);
        for r in &rejected {
            log::debug!("{}:{}: ignored {:?} ({})", path.display(), r.line, r.text, r.reason);
        }
        config
    }

    /// Load from `$GRAVSAVER_CONFIG`, or `gravsaver.conf` in the working directory.
    pub fn load_default() -> Config {
        let path = std::env::var_os(CONFIG_ENV)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
        Config::load(path)
    }

    fn apply_line(&mut self, line: &str) -> Result<(), RejectReason> {
        let (key, value) = line.split_once('=').ok_or(RejectReason::MissingSeparator)?;
        let key = key.trim();

        // Reject unknown keys before looking at the value.
        if !KEYS.contains(&key) {
            return Err(RejectReason::UnknownKey);
        }
        let value: i64 = value.trim().parse().map_err(|_| RejectReason::InvalidValue)?;

        match key {
            "gravity_points" => self.gravity_points = positive(value)? as usize,
            "particles" => self.particles = positive(value)? as usize,
            "cycle_color" => {
                self.cycle_color = match value {
                    0 => false,
                    1 => true,
                    _ => return Err(RejectReason::OutOfRange),
                }
            }
            "color_r" => self.color.r = byte(value)?,
            "color_g" => self.color.g = byte(value)?,
            "color_b" => self.color.b = byte(value)?,
            "trail_alpha" => self.trail_alpha = byte(value)?,
            "g" => self.g = positive(value)? as f32,
            "damp" => {
                if !(0..=100).contains(&value) {
                    return Err(RejectReason::OutOfRange);
                }
                self.damp = value as f32 / 100.0;
            }
            _ => return Err(RejectReason::UnknownKey),
        }
        Ok(())
    }
}

const KEYS: [&str; 9] = [
    "gravity_points",
    "particles",
    "cycle_color",
    "color_r",
    "color_g",
    "color_b",
    "trail_alpha",
    "g",
    "damp",
];

fn positive(value: i64) -> Result<i64, RejectReason> {
    if value > 0 && value <= u32::MAX as i64 {
        Ok(value)
    } else {
        Err(RejectReason::OutOfRange)
    }
}

fn byte(value: i64) -> Result<u8, RejectReason> {
    u8::try_from(value).map_err(|_| RejectReason::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_lines() {
        let (config, rejected) = Config::parse("particles=100\ndamp=50\nbad_line\ncycle_color=2");

        assert_eq!(config.particles, 100);
        assert_eq!(config.damp, 0.5);
        assert_eq!(config.cycle_color, Config::default().cycle_color);

        let reasons: Vec<_> = rejected.iter().map(|r| (r.line, r.reason.clone())).collect();
        assert_eq!(
            reasons,
            vec![(3, RejectReason::MissingSeparator), (4, RejectReason::OutOfRange)]
        );
    }

    #[test]
    fn test_all_keys() {
        let text = "gravity_points=3\nparticles=2000\ncycle_color=0\ncolor_r=1\ncolor_g=2\ncolor_b=3\ntrail_alpha=255\ng=800\ndamp=100";
        let (config, rejected) = Config::parse(text);

        assert!(rejected.is_empty());
        assert_eq!(
            config,
            Config {
                gravity_points: 3,
                particles: 2000,
                cycle_color: false,
                color: Rgb::new(1, 2, 3),
                trail_alpha: 255,
                g: 800.0,
                damp: 1.0,
            }
        );
    }

    #[test]
    fn test_out_of_range_keeps_defaults() {
        let text = "gravity_points=0\nparticles=-5\ncolor_r=256\ntrail_alpha=-1\ng=0\ndamp=101";
        let (config, rejected) = Config::parse(text);

        assert_eq!(config, Config::default());
        assert_eq!(rejected.len(), 6);
        assert!(rejected.iter().all(|r| r.reason == RejectReason::OutOfRange));
    }

    #[test]
    fn test_bad_values_and_keys() {
        let (config, rejected) = Config::parse("particles=lots\nspeed=3\ng=1.5\n=4");

        assert_eq!(config, Config::default());
        let reasons: Vec<_> = rejected.into_iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::InvalidValue,
                RejectReason::UnknownKey,
                RejectReason::InvalidValue,
                RejectReason::UnknownKey,
            ]
        );
    }

    #[test]
    fn test_split_on_first_equals() {
        let (config, rejected) = Config::parse("particles=10=20");
        assert_eq!(config.particles, Config::default().particles);
        assert_eq!(rejected[0].reason, RejectReason::InvalidValue);
    }

    #[test]
    fn test_whitespace_comments_and_overrides() {
        let text = "# comment\n\n  particles = 300 \nparticles=400\n";
        let (config, rejected) = Config::parse(text);

        assert!(rejected.is_empty());
        assert_eq!(config.particles, 400);
    }

    #[test]
    fn test_damp_zero_allowed() {
        let (config, _) = Config::parse("damp=0");
        assert_eq!(config.damp, 0.0);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load("/nonexistent/dir/gravsaver.conf");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!("gravsaver-test-{}.conf", std::process::id()));
        std::fs::write(&path, "particles=77\ntrail_alpha=9\n").unwrap();

        let config = Config::load(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(config.particles, 77);
        assert_eq!(config.trail_alpha, 9);
    }
}
