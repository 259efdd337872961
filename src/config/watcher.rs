//! Hot reload of the YAML config
//!
//! The parent directory is watched rather than the file, so editors that
//! save by renaming a fresh file over the old one are still picked up.
//! A burst of events for the file collapses into a single reload.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::AppConfig;
use crate::layout::PreferenceStore;

/// Quiet period after the last file event before the file is re-read
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Reloaded configs waiting to be picked up
const UPDATE_BACKLOG: usize = 4;

/// Watches one config file and hands out freshly parsed copies
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
    updates: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    ///
    /// Must be called from inside a tokio runtime. Fails if the file cannot
    /// be loaded now.
    pub async fn new(config_path: impl AsRef<Path>) -> Result<(Self, Arc<AppConfig>)> {
        let path = config_path.as_ref().to_path_buf();
        let initial = read_config(&path)
            .await
            .context("Failed to load initial config")?;

        let file_name = path
            .file_name()
            .map(OsStr::to_os_string)
            .with_context(|| format!("Config path has no file name: {}", path.display()))?;

        let (tx, updates) = mpsc::channel(UPDATE_BACKLOG);
        let reloader = Reloader {
            path: path.clone(),
            tx,
            latest: Arc::new(AtomicU64::new(0)),
            // notify callbacks run on their own OS thread
            runtime: Handle::current(),
        };

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) if touches_file(&event, &file_name) => {
                    trace!("Config event {:?} on {:?}", event.kind, event.paths);
                    reloader.schedule();
                }
                Ok(_) => {}
                Err(e) => error!("Watch error: {}", e),
            }
        })?;

        let dir = watched_dir(&path);
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        info!("👀 Watching {} for config changes", path.display());

        Ok((
            Self {
                _watcher: watcher,
                path,
                updates,
            },
            Arc::new(initial),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next reloaded config
    ///
    /// Returns None once the watcher has shut down.
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.updates.recv().await
    }

    /// Newest reloaded config, if any, without waiting
    ///
    /// Older pending updates are dropped.
    pub fn try_next_config(&mut self) -> Option<AppConfig> {
        std::iter::from_fn(|| self.updates.try_recv().ok()).last()
    }

    /// Write the preferences of the newest pending reload into `store`
    ///
    /// Returns that config so the caller can pick up the rest of it. A store
    /// failure is logged and the config is still returned.
    pub fn apply_pending(&mut self, store: &dyn PreferenceStore) -> Option<AppConfig> {
        let config = self.try_next_config()?;
        match config.apply_preferences(store) {
            Ok(count) => info!(
                "Applied {} preferences from {}",
                count,
                self.path.display()
            ),
            Err(e) => warn!("Failed to apply reloaded preferences: {:#}", e),
        }
        Some(config)
    }
}

/// Debounced re-reads of the config file
///
/// Every event bumps `latest`; a scheduled reload only runs if no newer
/// event arrived during its quiet period.
struct Reloader {
    path: PathBuf,
    tx: mpsc::Sender<AppConfig>,
    latest: Arc<AtomicU64>,
    runtime: Handle,
}

impl Reloader {
    fn schedule(&self) {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = self.latest.clone();
        let path = self.path.clone();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            tokio::time::sleep(RELOAD_DEBOUNCE).await;
            if latest.load(Ordering::SeqCst) != ticket {
                trace!("Reload {} superseded", ticket);
                return;
            }

            match read_config(&path).await {
                Ok(config) => {
                    info!("🔄 Configuration reloaded");
                    if tx.send(config).await.is_err() {
                        debug!("Config watcher dropped, discarding reload");
                    }
                }
                Err(e) => warn!("Failed to reload config (keeping old config): {:#}", e),
            }
        });
    }
}

async fn read_config(path: &Path) -> Result<AppConfig> {
    AppConfig::load(&path.to_string_lossy()).await
}

/// Whether `event` wrote or replaced the file called `file_name`
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn watched_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
