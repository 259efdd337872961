//! Touch Overlay - on-screen gamepad controls for touchscreens
//!
//! Preview window, touch script replay and layout maintenance.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use touch_overlay::config::{AppConfig, ConfigWatcher};
use touch_overlay::input::{InputSink, LoggingSink, RecordingSink, SinkEvent, TouchFrame};
use touch_overlay::layout::{LayoutSnapshot, PreferenceStore, SledStore};
use touch_overlay::overlay::InputOverlay;
use touch_overlay::paths::AppPaths;
use touch_overlay::visualizer::{run_visualizer, OverlayPreviewApp};

/// Touch Overlay - on-screen gamepad controls for touchscreens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to the app data directory)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to a daily file in the logs directory
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the preview window (default)
    Visualize,

    /// Feed a YAML list of touch frames through the overlay and print the events
    Replay {
        /// Script file
        script: PathBuf,

        /// Send events to the log instead of printing them
        #[arg(long)]
        log_events: bool,
    },

    /// Inspect or maintain the stored layout
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
}

#[derive(Subcommand, Debug)]
enum LayoutAction {
    /// Print stored preferences and the resulting control rectangles
    Show,
    /// Restore default control positions
    Reset,
    /// Write every stored preference to a JSON file
    Export { file: PathBuf },
    /// Load preferences from a JSON file written by `export`
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let paths = AppPaths::detect();
    paths.ensure_directories()?;

    let _log_guard = init_logging(&args.log_level, args.log_file.then_some(&paths.logs_dir))?;

    info!("Starting Touch Overlay v{}...", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| paths.config.to_string_lossy().to_string());
    info!("Configuration file: {}", config_path);

    let config = load_config(&config_path).await?;

    let store: Arc<dyn PreferenceStore> = Arc::new(open_store(&config, &paths)?);
    let applied = config.apply_preferences(&*store)?;
    if applied > 0 {
        info!("Applied {} preferences from config", applied);
    }

    let result = match args.command.unwrap_or(Command::Visualize) {
        Command::Visualize => visualize(&config, store.clone(), &config_path).await,
        Command::Replay { script, log_events } => {
            replay(&config, store.clone(), &script, log_events).await
        }
        Command::Layout { action } => run_layout(action, &config, store.clone()).await,
    };

    if let Err(e) = store.commit() {
        warn!("Failed to flush preferences on exit: {}", e);
    }

    info!("Touch Overlay shutdown complete");
    result
}

fn init_logging(level: &str, log_dir: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "touch-overlay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Load the config file, or defaults when it does not exist yet
async fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        return AppConfig::load(path).await;
    }
    warn!("Config file {} not found, using defaults", path);
    Ok(AppConfig::default())
}

fn open_store(config: &AppConfig, paths: &AppPaths) -> Result<SledStore> {
    let db_path = config
        .storage
        .as_ref()
        .and_then(|s| s.path.clone())
        .unwrap_or_else(|| paths.prefs_db_path());
    info!("Preference store: {}", db_path.display());
    SledStore::open(&db_path, Some(config.flush_every_ms()))
}

async fn visualize(
    config: &AppConfig,
    store: Arc<dyn PreferenceStore>,
    config_path: &str,
) -> Result<()> {
    let watcher = if Path::new(config_path).exists() {
        match ConfigWatcher::new(config_path).await {
            Ok((watcher, _)) => Some(watcher),
            Err(e) => {
                warn!("Config hot-reload disabled: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let events = RecordingSink::new();
    let mut overlay = InputOverlay::new(
        store.clone(),
        Arc::new(events.clone()),
        config.screen.metrics(),
    );
    overlay.set_device_id(config.device_id);

    let app = OverlayPreviewApp::new(overlay, events, store, watcher);

    // The window owns this thread until closed; keep the watcher's tasks running
    tokio::task::block_in_place(|| run_visualizer(app))
}

async fn replay(
    config: &AppConfig,
    store: Arc<dyn PreferenceStore>,
    script: &Path,
    log_events: bool,
) -> Result<()> {
    let contents = tokio::fs::read_to_string(script)
        .await
        .with_context(|| format!("Failed to read touch script: {}", script.display()))?;
    let frames: Vec<TouchFrame> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse touch script: {}", script.display()))?;

    let events = RecordingSink::new();
    let sink: Arc<dyn InputSink> = if log_events {
        Arc::new(LoggingSink::new())
    } else {
        Arc::new(events.clone())
    };
    let mut overlay = InputOverlay::new(store, sink, config.screen.metrics());
    overlay.set_device_id(config.device_id);
    // Seeding and the initial build report nothing worth showing
    events.drain();

    println!(
        "\n{}",
        format!("=== Replaying {} ===", script.display()).bold().cyan()
    );

    let mut total = 0;
    // With --log-events the recording sink stays empty
    for (i, frame) in frames.iter().enumerate() {
        let pointers: Vec<String> = frame
            .pointers
            .iter()
            .map(|p| format!("{}@({:.1}, {:.1})", p.id, p.x, p.y))
            .collect();
        println!(
            "\n{} {:?} [{}]",
            format!("#{:<3}", i + 1).bright_white(),
            frame.action,
            pointers.join(", ")
        );

        overlay.handle_touch_frame(frame);

        let emitted = events.drain();
        total += emitted.len();
        for event in &emitted {
            println!("    {}", colorize(event));
        }
    }

    println!(
        "\n{}",
        format!("✅ Replayed {} frames, {} events", frames.len(), total)
            .green()
            .bold()
    );
    Ok(())
}

fn colorize(event: &SinkEvent) -> ColoredString {
    let text = event.to_string();
    match event {
        SinkEvent::Button { pressed: true, .. } => text.green(),
        SinkEvent::Button { pressed: false, .. } => text.yellow(),
        SinkEvent::Axis { .. } => text.cyan(),
        SinkEvent::TouchPressed { .. }
        | SinkEvent::TouchMoved { .. }
        | SinkEvent::TouchReleased { .. } => text.magenta(),
    }
}

async fn run_layout(
    action: LayoutAction,
    config: &AppConfig,
    store: Arc<dyn PreferenceStore>,
) -> Result<()> {
    match action {
        LayoutAction::Show => {
            let overlay = InputOverlay::new(
                store.clone(),
                Arc::new(RecordingSink::new()),
                config.screen.metrics(),
            );

            println!("\n{}", "=== Stored Preferences ===".bold().cyan());
            for key in store.keys() {
                if let Some(value) = store.get(&key) {
                    println!("  {} = {}", key.yellow(), value.to_string().green());
                }
            }

            let screen = overlay.screen();
            println!(
                "\n{}",
                format!(
                    "=== Controls at {}x{} ({}) ===",
                    screen.width,
                    screen.height,
                    overlay.orientation()
                )
                .bold()
                .cyan()
            );
            for command in overlay.build_frame() {
                let r = command.rect();
                let name = command
                    .sprites()
                    .first()
                    .map(|s| s.asset.clone())
                    .unwrap_or_default();
                println!(
                    "  {:<20} [{}, {}, {}, {}]",
                    name.bright_white(),
                    r.left,
                    r.top,
                    r.right,
                    r.bottom
                );
            }
        }
        LayoutAction::Reset => {
            let mut overlay = InputOverlay::new(
                store,
                Arc::new(RecordingSink::new()),
                config.screen.metrics(),
            );
            overlay.reset_button_placement();
            println!("{}", "✅ Control placement reset to defaults".green().bold());
        }
        LayoutAction::Export { file } => {
            let snapshot = LayoutSnapshot::from_store(&*store);
            snapshot.save_to_file(&file).await?;
            println!(
                "{}",
                format!(
                    "✅ Exported {} preferences to {}",
                    snapshot.preferences.len(),
                    file.display()
                )
                .green()
                .bold()
            );
        }
        LayoutAction::Import { file } => {
            let snapshot = LayoutSnapshot::load_from_file(&file).await?;
            snapshot.apply_to(&*store)?;
            println!(
                "{}",
                format!(
                    "✅ Imported {} preferences from {}",
                    snapshot.preferences.len(),
                    file.display()
                )
                .green()
                .bold()
            );
        }
    }
    Ok(())
}
