//! Finder configuration.
//!
//! `Settings` is an explicit value handed to `Pattern` and `Finder`
//! constructors; nothing in the crate reads ambient global state.

use std::path::PathBuf;
use std::time::Duration;

/// Default minimum similarity for find operations.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.8;
/// Default wait timeout for find operations, in seconds.
pub const DEFAULT_AUTO_WAIT_TIMEOUT: f64 = 3.0;
/// Default number of match attempts per second while waiting.
pub const DEFAULT_WAIT_SCAN_RATE: f64 = 3.0;

/// Configuration consumed by pattern loading, matching and polling.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    min_similarity: f64,
    /// Maximum waiting time, in seconds, for wait/vanish operations.
    pub auto_wait_timeout: f64,
    /// Match attempts per second while polling; `<= 0` disables pacing.
    pub wait_scan_rate: f64,
    /// Locale subdirectory searched before the locale-free directories.
    pub locale: String,
    /// Platform subdirectory name (`win`, `osx`, `linux`).
    pub platform: String,
    /// Directory holding the `<platform>/` and `common/` image trees.
    pub image_root: PathBuf,
    /// Persist annotated screenshots of every match attempt.
    pub debug_image: bool,
    /// Directory receiving debug screenshots.
    pub debug_image_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            auto_wait_timeout: DEFAULT_AUTO_WAIT_TIMEOUT,
            wait_scan_rate: DEFAULT_WAIT_SCAN_RATE,
            locale: String::new(),
            platform: current_platform().to_string(),
            image_root: PathBuf::from("images"),
            debug_image: false,
            debug_image_path: std::env::temp_dir().join("screenmatch-debug"),
        }
    }
}

impl Settings {
    /// Default similarity threshold for new patterns.
    pub fn min_similarity(&self) -> f64 {
        self.min_similarity
    }

    /// Sets the default similarity; values above 1 are clamped to 1 and
    /// non-finite values fall back to [`DEFAULT_MIN_SIMILARITY`].
    pub fn set_min_similarity(&mut self, value: f64) {
        self.min_similarity = if !value.is_finite() {
            DEFAULT_MIN_SIMILARITY
        } else if value > 1.0 {
            1.0
        } else {
            value
        };
    }

    pub fn with_min_similarity(mut self, value: f64) -> Self {
        self.set_min_similarity(value);
        self
    }

    pub fn with_auto_wait_timeout(mut self, seconds: f64) -> Self {
        self.auto_wait_timeout = seconds;
        self
    }

    pub fn with_wait_scan_rate(mut self, rate: f64) -> Self {
        self.wait_scan_rate = rate;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_image_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.image_root = root.into();
        self
    }

    pub fn with_debug_image(mut self, enabled: bool, path: impl Into<PathBuf>) -> Self {
        self.debug_image = enabled;
        self.debug_image_path = path.into();
        self
    }

    /// The auto-wait timeout as a `Duration`; negative or non-finite values
    /// collapse to zero.
    pub fn auto_wait_duration(&self) -> Duration {
        seconds_to_duration(self.auto_wait_timeout)
    }

    /// Minimum time between poll iteration starts, if pacing is enabled.
    pub fn scan_interval(&self) -> Option<Duration> {
        if self.wait_scan_rate > 0.0 && self.wait_scan_rate.is_finite() {
            Some(seconds_to_duration(1.0 / self.wait_scan_rate))
        } else {
            None
        }
    }
}

/// Converts fractional seconds to a `Duration`, saturating invalid input to zero.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}

/// Name of the image subdirectory for the running platform.
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win",
        "macos" => "osx",
        _ => "linux",
    }
}
