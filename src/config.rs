//! Widget configuration parsed from environment variables.

use std::time::Duration;

use crate::bubble::StyleConfig;
use crate::surface::DEFAULT_CONTAINER_ID;

pub const DEFAULT_EVICTION_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Id of the bubble container on the display surface.
    pub container_id: String,
    /// How long a bubble stays up without an explicit delete.
    pub eviction_delay: Duration,
    /// Style applied before the host sends its own; `None` keeps the built-in defaults.
    pub initial_style: Option<StyleConfig>,
}

impl WidgetConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `BUBBLE_CONTAINER_ID`: default `chat`
    /// - `BUBBLE_EVICTION_SECS`: default 30
    /// - `BUBBLE_BACKGROUND` / `BUBBLE_FOREGROUND`: initial style; either one
    ///   being set enables it, the other falls back to its default color
    #[must_use]
    pub fn from_env() -> Self {
        let container_id = std::env::var("BUBBLE_CONTAINER_ID")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_owned());
        let eviction_delay = Duration::from_secs(env_parse("BUBBLE_EVICTION_SECS", DEFAULT_EVICTION_SECS));

        let background = std::env::var("BUBBLE_BACKGROUND").ok();
        let foreground = std::env::var("BUBBLE_FOREGROUND").ok();
        let initial_style = if background.is_some() || foreground.is_some() {
            Some(StyleConfig { background: background.unwrap_or_default(), foreground: foreground.unwrap_or_default() })
        } else {
            None
        };

        Self { container_id, eviction_delay, initial_style }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_owned(),
            eviction_delay: Duration::from_secs(DEFAULT_EVICTION_SECS),
            initial_style: None,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
