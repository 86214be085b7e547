//! CLI command implementations

pub mod admin;
pub mod init;
pub mod rankings;
pub mod status;

use std::path::Path;

use anyhow::Result;

use challenge_matrix::config::Config;
use challenge_matrix::store::{MatrixDb, SqliteStore};

/// Load config and open the store the commands work against
pub fn open_store(config_path: &Path) -> Result<(Config, SqliteStore)> {
    let config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    let db = MatrixDb::open(&config.database_path())?;
    Ok((config, SqliteStore::new(db)))
}
