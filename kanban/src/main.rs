//! Terminal kanban board.
//!
//! Runs the board against an in-memory store seeded with demo data or a
//! JSON seed file. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/kanban/config.toml`).
//!
//! ```bash
//! # Demo board, desktop drag and drop
//! cargo run --bin kanban
//!
//! # Touch semantics with edge auto-scroll and a custom seed
//! cargo run --bin kanban -- --drag-mode touch --seed board.json
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use kanban::app::{App, NotificationLevel};
use kanban::config::{CliArgs, ClientConfig};
use kanban::demo::{demo_document, load_seed, seed_store};
use kanban::persistence::MemoryStore;
use kanban::sync::{self, SyncCommand, SyncEvent};
use kanban::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(drag_mode = %config.drag_mode, "kanban starting");

    let mut app = App::new(&config);
    let store = Arc::new(MemoryStore::new());
    let document = match config.seed_file.as_deref() {
        Some(path) => load_seed(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "seed file unusable, falling back to demo data");
            app.notify(e.to_string(), NotificationLevel::Error);
            demo_document()
        }),
        None => demo_document(),
    };
    if let Err(e) = seed_store(store.as_ref(), &document, &config.board_path, &config.contacts_path).await {
        app.notify(format!("Could not seed the board: {e}"), NotificationLevel::Error);
    }

    let channels = match sync::spawn_sync(Arc::clone(&store), config.to_sync_config()).await {
        Ok(channels) => Some(channels),
        Err(e) => {
            tracing::error!(error = %e, "sync could not start");
            app.notify(format!("Live sync unavailable ({e})"), NotificationLevel::Error);
            None
        }
    };
    let (cmd_tx, evt_rx) = channels.map_or((None, None), |(tx, rx)| (Some(tx), Some(rx)));

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &mut app, cmd_tx, evt_rx, &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("kanban exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("kanban.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
///
/// Draws, records the frame geometry, applies pending sync events, ticks
/// timers and finally polls input. Runs on the main thread; the sync tasks
/// run on the tokio worker threads.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_tx: Option<mpsc::Sender<SyncCommand>>,
    mut evt_rx: Option<mpsc::Receiver<SyncEvent>>,
    config: &ClientConfig,
) -> io::Result<()> {
    loop {
        // Step 1: Draw the frame and keep its geometry for hit-testing.
        let mut layout = None;
        terminal.draw(|frame| layout = Some(ui::draw(frame, app)))?;
        if let Some(layout) = layout {
            app.set_layout(layout);
        }

        // Step 2: Drain all pending SyncEvents (non-blocking).
        if let Some(ref mut rx) = evt_rx {
            while let Ok(event) = rx.try_recv() {
                app.handle_sync_event(event);
            }
        }

        // Step 3: Auto-scroll and notification expiry.
        app.tick(Instant::now());

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                _ => None,
            };
            if let Some(command) = command {
                submit(app, cmd_tx.as_ref(), command);
            }
        }

        if app.should_quit {
            if let Some(ref tx) = cmd_tx {
                let _ = tx.try_send(SyncCommand::Shutdown);
            }
            return Ok(());
        }
    }
}

/// Hand a command to the sync coordinator without blocking the loop.
fn submit(app: &mut App, cmd_tx: Option<&mpsc::Sender<SyncCommand>>, command: SyncCommand) {
    let Some(tx) = cmd_tx else {
        app.notify("Live sync unavailable, change kept locally", NotificationLevel::Error);
        return;
    };
    match tx.try_send(command) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            app.notify("Sync busy, change not saved", NotificationLevel::Error);
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            app.notify("Sync stopped, change not saved", NotificationLevel::Error);
        }
    }
}
