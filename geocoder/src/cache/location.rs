//! Cache locations and the backends behind them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the collection holding cached responses.
pub const CACHE_LAYER_NAME: &str = "geocode_cache";

/// Default cache file.
pub const DEFAULT_CACHE_SQLITE: &str = "geocode_cache.sqlite";

/// Default cache file when SQLite cannot be used.
pub const DEFAULT_CACHE_CSV: &str = "geocode_cache.csv";

/// Prefix marking a PostgreSQL connection string.
const PG_PREFIX: &str = "PG:";

/// Prefix of in-memory fallback locations.
const MEMORY_PREFIX: &str = "memory:";

/// Storage engine of a cache location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Sqlite,
    Csv,
    Postgres,
}

impl Backend {
    /// File extension used by this backend.
    pub fn extension(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Csv => "csv",
            Backend::Postgres => "pg",
        }
    }

    /// Whether the backend was compiled into this build.
    pub fn is_available(&self) -> bool {
        match self {
            Backend::Sqlite => cfg!(feature = "sqlite"),
            Backend::Csv => true,
            Backend::Postgres => cfg!(feature = "postgres"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Sqlite => "SQLite",
            Backend::Csv => "CSV",
            Backend::Postgres => "PostgreSQL",
        })
    }
}

/// Where the response cache lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// SQLite database file.
    Sqlite(PathBuf),
    /// CSV file.
    Csv(PathBuf),
    /// PostgreSQL connection string (without the `PG:` prefix).
    Postgres(String),
    /// Process-local store, used when nothing can be created on disk.
    Memory(Backend),
}

impl CacheLocation {
    /// Parse a user-supplied cache location.
    ///
    /// Accepts `PG:<conninfo>` (prefix in any case) and paths ending in
    /// `.sqlite` or `.csv` (extension in any case). Returns `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(prefix) = s.get(..PG_PREFIX.len())
            && prefix.eq_ignore_ascii_case(PG_PREFIX)
        {
            return Some(CacheLocation::Postgres(s[PG_PREFIX.len()..].to_string()));
        }

        let extension = Path::new(s).extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("sqlite") {
            Some(CacheLocation::Sqlite(PathBuf::from(s)))
        } else if extension.eq_ignore_ascii_case("csv") {
            Some(CacheLocation::Csv(PathBuf::from(s)))
        } else {
            None
        }
    }

    /// The default location, an SQLite file in the working directory.
    pub fn default_sqlite() -> Self {
        CacheLocation::Sqlite(PathBuf::from(DEFAULT_CACHE_SQLITE))
    }

    /// The default CSV location, used when the default SQLite file is unusable.
    pub fn default_csv() -> Self {
        CacheLocation::Csv(PathBuf::from(DEFAULT_CACHE_CSV))
    }

    /// Whether this is exactly the default SQLite location.
    pub fn is_default_sqlite(&self) -> bool {
        *self == Self::default_sqlite()
    }

    /// Backend serving this location.
    pub fn backend(&self) -> Backend {
        match self {
            CacheLocation::Sqlite(_) => Backend::Sqlite,
            CacheLocation::Csv(_) => Backend::Csv,
            CacheLocation::Postgres(_) => Backend::Postgres,
            CacheLocation::Memory(backend) => *backend,
        }
    }

    /// In-memory location of the same backend, for file-based locations.
    pub fn memory_fallback(&self) -> Option<Self> {
        match self {
            CacheLocation::Sqlite(_) | CacheLocation::Csv(_) => {
                Some(CacheLocation::Memory(self.backend()))
            }
            CacheLocation::Postgres(_) | CacheLocation::Memory(_) => None,
        }
    }
}

impl fmt::Display for CacheLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheLocation::Sqlite(path) | CacheLocation::Csv(path) => {
                write!(f, "{}", path.display())
            }
            CacheLocation::Postgres(conninfo) => write!(f, "{PG_PREFIX}{conninfo}"),
            CacheLocation::Memory(backend) => write!(
                f,
                "{MEMORY_PREFIX}{CACHE_LAYER_NAME}.{}",
                backend.extension()
            ),
        }
    }
}
