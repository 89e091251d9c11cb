//! Process-wide fallback settings.

use std::collections::HashMap;

/// Prefix applied to an option key to form the name of its process-wide setting.
pub const SETTING_PREFIX: &str = "GEOCODE_";

/// A source of process-wide settings, consulted when an option is not given
/// explicitly.
pub trait Settings {
    /// Look up a setting by its full (prefixed) name.
    fn get(&self, name: &str) -> Option<String>;
}

/// Settings read from environment variables, e.g. `GEOCODE_SERVICE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl Settings for EnvSettings {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    /// Create an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl Settings for MapSettings {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
