// ⚙️ Run configuration - source feed, target store, load options

use crate::db::{SqliteStore, Store};
use crate::loader::{LoadOptions, DEFAULT_BATCH_SIZE};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// CONNECTION DESCRIPTORS
// ============================================================================

/// Where the tables go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Sqlite(PathBuf),
    SqliteMemory,
    /// `postgres://` / `postgresql://` URL
    Postgres(String),
}

impl ConnectionTarget {
    /// Accepted forms:
    /// - `sqlite:<path>`, `sqlite://<path>`, `sqlite::memory:`
    /// - a bare path ending in `.db`, `.sqlite` or `.sqlite3`
    /// - `postgres://...`, `postgresql://...`
    ///
    /// A leading `jdbc:` is ignored so existing JDBC URLs keep working.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let trimmed = descriptor.trim();
        let target = trimmed.strip_prefix("jdbc:").unwrap_or(trimmed);

        if target.starts_with("postgres://") || target.starts_with("postgresql://") {
            return Ok(ConnectionTarget::Postgres(target.to_string()));
        }

        if let Some(rest) = target.strip_prefix("sqlite:") {
            let rest = rest.strip_prefix("//").unwrap_or(rest);
            return match rest {
                ":memory:" => Ok(ConnectionTarget::SqliteMemory),
                "" => bail!("Missing database path in '{}'", descriptor),
                path => Ok(ConnectionTarget::Sqlite(PathBuf::from(path))),
            };
        }

        let is_sqlite_file = [".db", ".sqlite", ".sqlite3"]
            .iter()
            .any(|ext| target.ends_with(ext));
        if is_sqlite_file {
            return Ok(ConnectionTarget::Sqlite(PathBuf::from(target)));
        }

        bail!(
            "Unsupported connection descriptor '{}' (expected sqlite:<path> or postgres://...)",
            descriptor
        )
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
            ConnectionTarget::SqliteMemory => write!(f, "sqlite::memory:"),
            // URL may embed a password
            ConnectionTarget::Postgres(url) => match url.split_once('@') {
                Some((_, host)) => write!(f, "postgres://***@{}", host),
                None => write!(f, "{}", url),
            },
        }
    }
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

// ============================================================================
// LOAD CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub gtfs_dir: PathBuf,
    pub connection: ConnectionTarget,
    pub credentials: Credentials,
    /// File names (`stops.txt`, ...) whose tables stay empty
    pub exclude: HashSet<String>,
    pub optimize: bool,
    pub batch_size: usize,
    pub report: Option<PathBuf>,
}

impl LoadConfig {
    pub fn new(gtfs_dir: impl Into<PathBuf>, connection: ConnectionTarget) -> Self {
        LoadConfig {
            gtfs_dir: gtfs_dir.into(),
            connection,
            credentials: Credentials::default(),
            exclude: HashSet::new(),
            optimize: false,
            batch_size: DEFAULT_BATCH_SIZE,
            report: None,
        }
    }

    /// Add exclusions; a bare table name means its `.txt` file
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.contains('.') {
                self.exclude.insert(name.to_string());
            } else {
                self.exclude.insert(format!("{}.txt", name));
            }
        }
        self
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            exclude: self.exclude.clone(),
            batch_size: self.batch_size,
        }
    }

    /// Open the target store. Failure here is fatal for the run.
    pub fn connect(&self) -> Result<Box<dyn Store>> {
        info!(connection = %self.connection, "Connecting");

        match &self.connection {
            ConnectionTarget::Sqlite(path) => Ok(Box::new(SqliteStore::open(path)?)),
            ConnectionTarget::SqliteMemory => Ok(Box::new(SqliteStore::open_in_memory()?)),
            #[cfg(feature = "pg")]
            ConnectionTarget::Postgres(url) => Ok(Box::new(crate::pg::PgStore::connect(
                url,
                self.credentials.username.as_deref(),
                self.credentials.password.as_deref(),
            )?)),
            #[cfg(not(feature = "pg"))]
            ConnectionTarget::Postgres(_) => {
                bail!("PostgreSQL support not compiled in (enable the `pg` feature)")
            }
        }
    }
}
