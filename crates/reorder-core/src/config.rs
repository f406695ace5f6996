//! Engine configuration.

use crate::geometry::Axis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay before re-arming an observer whose element is fully clipped.
pub const DEFAULT_CLIPPED_REARM_MS: u64 = 1000;

/// Default time a clickable handle shows the pointer cursor after a click.
pub const DEFAULT_CLICK_CURSOR_RESET_MS: u64 = 100;

/// Position observer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Throttle applied when the observed element is fully clipped.
    #[serde(with = "millis")]
    pub clipped_rearm: Duration,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            clipped_rearm: Duration::from_millis(DEFAULT_CLIPPED_REARM_MS),
        }
    }
}

/// Configuration for a reorder engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    pub observer: ObserverConfig,
    /// How long a clicked handle reports the `pointer` cursor.
    #[serde(with = "millis")]
    pub click_cursor_reset: Duration,
    /// Axis used by areas that don't set one.
    pub default_axis: Option<Axis>,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            observer: ObserverConfig::default(),
            click_cursor_reset: Duration::from_millis(DEFAULT_CLICK_CURSOR_RESET_MS),
            default_axis: None,
        }
    }
}

/// Durations as whole milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
