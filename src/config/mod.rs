pub mod loader;

use std::ops::RangeInclusive;
use std::time::Duration;

pub use loader::load;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Accepted range for `frame_rate` and `tick_rate`, per second.
pub const RATE_RANGE: RangeInclusive<f64> = 1.0..=240.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base_url: String,
    /// Personal access token. Falls back to `GITHUB_TOKEN` when unset.
    pub token: Option<String>,
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
            user_agent: concat!("soop/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Give up on a single fetch after this many seconds. Unlimited if unset.
    pub fetch_timeout_secs: Option<u64>,
}

impl NetworkConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub frame_rate: f64,
    pub tick_rate: f64,
    pub toast_duration_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            tick_rate: 8.0,
            toast_duration_secs: 2,
        }
    }
}

impl UiConfig {
    pub const fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }

    /// Bring both rates into [`RATE_RANGE`]. A rate that is not a number
    /// falls back to its default.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        self.frame_rate = sanitize_rate("frame_rate", self.frame_rate, defaults.frame_rate);
        self.tick_rate = sanitize_rate("tick_rate", self.tick_rate, defaults.tick_rate);
    }
}

fn sanitize_rate(key: &str, rate: f64, default: f64) -> f64 {
    if RATE_RANGE.contains(&rate) {
        return rate;
    }
    let fixed = if rate.is_nan() {
        default
    } else {
        rate.clamp(*RATE_RANGE.start(), *RATE_RANGE.end())
    };
    warn!("ui.{key} = {rate} is outside {RATE_RANGE:?}, using {fixed}");
    fixed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}
