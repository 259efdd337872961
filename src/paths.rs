//! Application path management for portable and installed modes.
//!
//! ## Mode Detection
//!
//! - **Dev mode** (debug builds only): `config.yaml` in the current working
//!   directory is used directly, with state and logs next to it.
//! - **Portable mode**: a `.portable` marker file next to the executable keeps
//!   every file in the executable's directory.
//! - **Installed mode** (default): data lives in the platform data directory
//!   (`%APPDATA%\Touch Overlay`, `~/.local/share/Touch Overlay`, ...).

use std::path::PathBuf;
use tracing::debug;

/// Application name used for directories in installed mode
const APP_NAME: &str = "Touch Overlay";

/// Application paths for config, preference database and logs.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Path to the configuration file
    pub config: PathBuf,
    /// Directory holding the preference database
    pub state_dir: PathBuf,
    /// Path to the logs directory
    pub logs_dir: PathBuf,
    /// Whether files live next to the executable
    pub is_portable: bool,
}

impl AppPaths {
    /// Resolve paths for the current environment.
    ///
    /// Called before logging is initialized, so diagnostics go to stderr.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(debug_assertions)]
        {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if cwd.join("config.yaml").exists() {
                eprintln!("[paths] DEV mode (config.yaml found in {})", cwd.display());
                return Self::rooted_at(cwd, true);
            }
        }

        if exe_dir.join(".portable").exists() {
            #[cfg(debug_assertions)]
            eprintln!("[paths] PORTABLE mode (.portable marker found)");
            return Self::rooted_at(exe_dir, true);
        }

        let data_dir = dirs::data_dir().unwrap_or_else(|| {
            eprintln!("[paths] WARNING: no platform data directory, falling back to exe dir");
            exe_dir.clone()
        });

        #[cfg(debug_assertions)]
        eprintln!(
            "[paths] INSTALLED mode (data dir: {})",
            data_dir.join(APP_NAME).display()
        );

        let mut paths = Self::rooted_at(data_dir.join(APP_NAME), false);
        paths.state_dir = paths.base_dir().join("state");
        paths
    }

    /// Layout with every file under `base`
    pub fn rooted_at(base: PathBuf, is_portable: bool) -> Self {
        Self {
            config: base.join("config.yaml"),
            state_dir: base.join(".state"),
            logs_dir: base.join("logs"),
            is_portable,
        }
    }

    /// Get the base directory (for displaying in logs)
    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure state and log directories exist.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [&self.state_dir, &self.logs_dir] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    /// Get the sled preference database path (within state_dir)
    pub fn prefs_db_path(&self) -> PathBuf {
        self.state_dir.join("prefs.sled")
    }
}
