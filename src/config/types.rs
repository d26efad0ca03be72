use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{BreakpointError, BreakpointPreset, BreakpointTable, Tier};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub breakpoints: BreakpointConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Delays and refresh periods used by the fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Quiet period before a search suggestion is emitted (default: 300).
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Quiet period before a resize is acted on (default: 250).
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Period of live-content refresh notifications (default: 30).
    #[serde(default = "default_live_refresh_secs")]
    pub live_refresh_secs: u64,
    /// Period for re-formatting recent relative-time labels (default: 60).
    #[serde(default = "default_label_refresh_secs")]
    pub label_refresh_secs: u64,
    /// Period of sidebar content refresh (default: 300).
    #[serde(default = "default_sidebar_refresh_secs")]
    pub sidebar_refresh_secs: u64,
    /// How long a feedback message stays up (default: 2000).
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u64,
    /// Delay before the first live updates are rendered (default: 2000).
    #[serde(default = "default_live_loading_delay_ms")]
    pub live_loading_delay_ms: u64,
    /// Idle time before video controls hide (default: 3000).
    #[serde(default = "default_controls_hide_ms")]
    pub controls_hide_ms: u64,
    /// Latency of simulated content fetches (default: 500).
    #[serde(default = "default_simulated_fetch_ms")]
    pub simulated_fetch_ms: u64,
    /// Period of sidebar weather updates (default: 900).
    #[serde(default = "default_weather_refresh_secs")]
    pub weather_refresh_secs: u64,
}

impl TimingConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn live_refresh(&self) -> Duration {
        Duration::from_secs(self.live_refresh_secs)
    }

    pub fn label_refresh(&self) -> Duration {
        Duration::from_secs(self.label_refresh_secs)
    }

    pub fn sidebar_refresh(&self) -> Duration {
        Duration::from_secs(self.sidebar_refresh_secs)
    }

    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    pub fn live_loading_delay(&self) -> Duration {
        Duration::from_millis(self.live_loading_delay_ms)
    }

    pub fn controls_hide(&self) -> Duration {
        Duration::from_millis(self.controls_hide_ms)
    }

    pub fn simulated_fetch(&self) -> Duration {
        Duration::from_millis(self.simulated_fetch_ms)
    }

    pub fn weather_refresh(&self) -> Duration {
        Duration::from_secs(self.weather_refresh_secs)
    }

    pub(crate) fn named_values(&self) -> [(&'static str, u64); 10] {
        [
            ("search_debounce_ms", self.search_debounce_ms),
            ("resize_debounce_ms", self.resize_debounce_ms),
            ("live_refresh_secs", self.live_refresh_secs),
            ("label_refresh_secs", self.label_refresh_secs),
            ("sidebar_refresh_secs", self.sidebar_refresh_secs),
            ("feedback_ms", self.feedback_ms),
            ("live_loading_delay_ms", self.live_loading_delay_ms),
            ("controls_hide_ms", self.controls_hide_ms),
            ("simulated_fetch_ms", self.simulated_fetch_ms),
            ("weather_refresh_secs", self.weather_refresh_secs),
        ]
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            live_refresh_secs: default_live_refresh_secs(),
            label_refresh_secs: default_label_refresh_secs(),
            sidebar_refresh_secs: default_sidebar_refresh_secs(),
            feedback_ms: default_feedback_ms(),
            live_loading_delay_ms: default_live_loading_delay_ms(),
            controls_hide_ms: default_controls_hide_ms(),
            simulated_fetch_ms: default_simulated_fetch_ms(),
            weather_refresh_secs: default_weather_refresh_secs(),
        }
    }
}

/// Page-level breakpoint table: a preset, or custom tiers when given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakpointConfig {
    #[serde(default)]
    pub preset: BreakpointPreset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<Tier>>,
}

impl BreakpointConfig {
    pub fn table(&self) -> Result<BreakpointTable, BreakpointError> {
        match &self.tiers {
            Some(tiers) => BreakpointTable::new("custom", tiers.clone()),
            None => Ok(BreakpointTable::preset(self.preset)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Forward and broadcast tracking events (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_resize_debounce_ms() -> u64 {
    250
}

fn default_live_refresh_secs() -> u64 {
    30
}

fn default_label_refresh_secs() -> u64 {
    60
}

fn default_sidebar_refresh_secs() -> u64 {
    300
}

fn default_feedback_ms() -> u64 {
    2000
}

fn default_live_loading_delay_ms() -> u64 {
    2000
}

fn default_controls_hide_ms() -> u64 {
    3000
}

fn default_simulated_fetch_ms() -> u64 {
    500
}

fn default_weather_refresh_secs() -> u64 {
    900
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}
