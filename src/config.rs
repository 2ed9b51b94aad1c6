//! Runtime configuration loaded from environment variables.
//!
//! - `SPECTREE_DB_PATH` - SQLite file (default: platform data dir)
//! - `SPECTREE_PORT` - HTTP port (default: 3000)
//! - `SPECTREE_HISTORY_LIMIT` - default page size for session history (default: 10)

use std::path::PathBuf;

use anyhow::Result;

use crate::db::Database;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` means the platform default location.
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            port: DEFAULT_PORT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = std::env::var("SPECTREE_DB_PATH").ok().map(PathBuf::from);

        let port = std::env::var("SPECTREE_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let history_limit = std::env::var("SPECTREE_HISTORY_LIMIT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);

        Self {
            db_path,
            port,
            history_limit,
        }
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> Result<Database> {
        let path = match &self.db_path {
            Some(path) => path.clone(),
            None => Database::default_path()?,
        };
        tracing::info!("Opening database at {}", path.display());

        let db = Database::open(path)?;
        db.migrate()?;
        Ok(db)
    }
}
