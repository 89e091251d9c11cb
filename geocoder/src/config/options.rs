//! Explicit per-session options.

use std::collections::HashMap;
use std::fmt;

/// Option keys recognised when creating a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    CacheFile,
    ReadCache,
    WriteCache,
    Service,
    Email,
    Application,
    Delay,
    QueryTemplate,
    ExtraQueryParameters,
}

impl OptionKey {
    /// All recognised keys.
    pub const ALL: [OptionKey; 9] = [
        OptionKey::CacheFile,
        OptionKey::ReadCache,
        OptionKey::WriteCache,
        OptionKey::Service,
        OptionKey::Email,
        OptionKey::Application,
        OptionKey::Delay,
        OptionKey::QueryTemplate,
        OptionKey::ExtraQueryParameters,
    ];

    /// The canonical (upper-case) option name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::CacheFile => "CACHE_FILE",
            OptionKey::ReadCache => "READ_CACHE",
            OptionKey::WriteCache => "WRITE_CACHE",
            OptionKey::Service => "SERVICE",
            OptionKey::Email => "EMAIL",
            OptionKey::Application => "APPLICATION",
            OptionKey::Delay => "DELAY",
            OptionKey::QueryTemplate => "QUERY_TEMPLATE",
            OptionKey::ExtraQueryParameters => "EXTRA_QUERY_PARAMETERS",
        }
    }

    /// Look up a key by name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit options for a session, keyed case-insensitively.
///
/// Unrecognised keys are kept but never consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    values: HashMap<String, String>,
}

impl SessionOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, builder style.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set an option, replacing any previous value for the same key.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(key.as_ref().to_ascii_uppercase(), value.into());
    }

    /// Get the value of an option, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Get the value of a recognised option, if set.
    pub fn get_key(&self, key: OptionKey) -> Option<&str> {
        self.values.get(key.as_str()).map(String::as_str)
    }

    /// Number of options set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no option is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for SessionOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.set(key, value);
        }
        options
    }
}
