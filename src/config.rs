//! Command line and environment configuration.
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use garde::Validate;

/// Which primary store to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Pg,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Bring the database schema up to date and exit.
    Migrate,

    /// Read a record through the cache.
    Show {
        /// One of producer, farm, crop, planted.
        resource: String,
        id:       uuid::Uuid,
    },

    /// Print all dashboard views.
    Dashboard,

    /// Remove every cache entry matching a glob pattern, e.g. "farm:*".
    Purge { pattern: String },
}

#[derive(Debug, Clone, Parser, Validate)]
#[clap(about, version, author, name = "agro")]
pub struct Config {
    #[command(subcommand)]
    #[garde(skip)]
    pub command: Command,

    /// Use SQLite as the primary store. This is the default when no database is selected.
    #[clap(long, env = "AGRO_SQLITE", default_value_t = false, conflicts_with = "pg")]
    #[garde(custom(Self::feature_enabled(cfg!(feature = "sqlite"), "sqlite")))]
    pub sqlite: bool,

    /// Path to the SQLite database file.
    #[clap(long, env = "AGRO_SQLITE_PATH", default_value = "agro.db")]
    #[garde(skip)]
    pub sqlite_path: PathBuf,

    /// Use PostgreSQL as the primary store.
    #[clap(long, env = "AGRO_PG", default_value_t = false)]
    #[garde(custom(Self::feature_enabled(cfg!(feature = "pg"), "pg")))]
    pub pg: bool,

    #[clap(long, env = "AGRO_PG_HOST", default_value = "localhost")]
    #[garde(length(min = 1))]
    pub pg_host: String,

    #[clap(long, env = "AGRO_PG_PORT", default_value_t = 5432)]
    #[garde(range(min = 1))]
    pub pg_port: u16,

    #[clap(long, env = "AGRO_PG_USER", default_value = "agro")]
    #[garde(length(min = 1))]
    pub pg_user: String,

    #[clap(long, env = "AGRO_PG_PASSWORD", hide_env_values = true, default_value = "agro")]
    #[garde(skip)]
    pub pg_password: String,

    #[clap(long, env = "AGRO_PG_DB", default_value = "agro")]
    #[garde(length(min = 1))]
    pub pg_db: String,

    /// Run migrations on startup.
    #[clap(long, env = "AGRO_MIGRATE", default_value_t = false)]
    #[garde(skip)]
    pub migrate: bool,

    #[clap(long, env = "REDIS_HOST", default_value = "localhost")]
    #[garde(length(min = 1))]
    pub redis_host: String,

    #[clap(long, env = "REDIS_PORT", default_value_t = 6379)]
    #[garde(range(min = 1))]
    pub redis_port: u16,

    /// Per-command timeout of the Redis backend, milliseconds.
    #[clap(long, env = "REDIS_TIMEOUT_MS", default_value_t = 500)]
    #[garde(range(min = 1))]
    pub redis_timeout_ms: u64,

    /// Use the in-process cache instead of Redis.
    #[clap(long, env = "AGRO_MEMORY_CACHE", default_value_t = false)]
    #[garde(skip)]
    pub memory_cache: bool,

    /// Maximum number of entries held by the in-process cache.
    #[clap(long, env = "AGRO_MEMORY_CAPACITY", default_value_t = 100_000)]
    #[garde(range(min = 1))]
    pub memory_capacity: u64,

    /// Lifetime of cached relation lists, seconds.
    #[clap(long, env = "AGRO_LIST_TTL", default_value_t = 3600)]
    #[garde(range(min = 1))]
    pub list_ttl: u64,

    /// Lifetime of cached dashboard views, seconds.
    #[clap(long, env = "AGRO_DASHBOARD_TTL", default_value_t = 600)]
    #[garde(range(min = 1))]
    pub dashboard_ttl: u64,
}

impl Config {
    /// Parse the process arguments, exiting with a usage message on bad input.
    pub fn load() -> Self {
        Self::checked(Self::parse())
    }

    pub fn load_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        if let Err(report) = config.validate() {
            return Err(Self::command().error(ErrorKind::InvalidValue, report));
        }
        Ok(config)
    }

    fn checked(config: Self) -> Self {
        if let Err(report) = config.validate() {
            Self::command().error(ErrorKind::InvalidValue, report).exit();
        }
        config
    }

    pub fn database(&self) -> DatabaseKind {
        if self.pg {
            DatabaseKind::Pg
        }
        else {
            DatabaseKind::Sqlite
        }
    }

    #[inline]
    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }

    #[inline]
    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl)
    }

    #[inline]
    pub fn dashboard_ttl(&self) -> Duration {
        Duration::from_secs(self.dashboard_ttl)
    }

    fn feature_enabled<'a>(enabled: bool, feature: &'static str) -> impl FnOnce(&'a bool, &()) -> garde::Result {
        move |value, _| {
            if !*value || enabled {
                Ok(())
            }
            else {
                Err(garde::Error::new(format!("Build feature '{feature}' must be enabled.")))
            }
        }
    }
}
