//! Init command implementation

use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

/// Default configuration content for `challenge-matrix init`
pub const DEFAULT_CONFIG: &str = r#"# Challenge Matrix configuration
#
# All values are optional; the defaults below are what the application
# uses when a key (or this whole file) is absent.

[database]
# Contest database file. Defaults to the platform data dir.
# path = "/var/lib/challenge-matrix/matrix.db"

[storage]
# Root directory for locally-stored uploads (screenshots, avatars).
# root = "/var/lib/challenge-matrix/uploads"

[retry]
# Session role lookup on load: attempts and linear backoff base delay.
attempts = 3
base_delay_ms = 1000
"#;

/// Write a default config file
pub fn init_command(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "config file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;

    info!("wrote config to {}", config_path.display());
    println!("Created {}", config_path.display());
    Ok(())
}
