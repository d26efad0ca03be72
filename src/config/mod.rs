//! TOML configuration for the host and its fragments.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{AnalyticsConfig, BreakpointConfig, HostConfig, LoggingConfig, TimingConfig};
