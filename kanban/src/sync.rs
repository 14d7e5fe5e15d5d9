//! Sync coordinator between the UI loop and the persistence collaborator.
//!
//! The UI loop is synchronous: it draws, drains events and polls input.
//! Every suspension point lives here, on background tokio tasks that talk
//! to the loop through [`SyncCommand`] / [`SyncEvent`] channels.
//!
//! ```text
//! UI loop  ←── SyncEvent ───  snapshot forwarders / command handler
//!          ─── SyncCommand →
//! ```
//!
//! Snapshots are forwarded in the order the collaborator emits them.
//! Commands run one at a time in submission order; a failed write is
//! reported as [`SyncEvent::WriteFailed`] and never rolled back locally.

use std::sync::Arc;

use kanban_proto::snapshot::{BOARD_ROOT, CONTACTS_ROOT, Patch};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::persistence::{Persistence, PersistenceError, Subscription};

/// Commands sent from the UI loop to the background tasks.
#[derive(Debug)]
pub enum SyncCommand {
    /// Atomic multi-key update under a prefix.
    Patch {
        /// Path the update keys are relative to.
        prefix: String,
        /// Relative path → new value, `None` deletes.
        updates: Patch,
    },
    /// Whole-value write.
    Write {
        /// Absolute path.
        path: String,
        /// New value.
        value: Value,
    },
    /// Stop handling commands.
    Shutdown,
}

impl SyncCommand {
    fn target(&self) -> &str {
        match self {
            Self::Patch { prefix, .. } => prefix,
            Self::Write { path, .. } => path,
            Self::Shutdown => "",
        }
    }
}

/// Events sent from the background tasks to the UI loop.
#[derive(Debug)]
pub enum SyncEvent {
    /// A new board snapshot.
    BoardSnapshot(Option<Value>),
    /// A new contacts snapshot.
    ContactsSnapshot(Option<Value>),
    /// A command was rejected by the collaborator.
    WriteFailed {
        /// Path the failed command addressed.
        target: String,
        /// What went wrong.
        error: PersistenceError,
    },
}

/// Configuration for the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Path of the board subtree.
    pub board_path: String,
    /// Path of the contacts subtree.
    pub contacts_path: String,
    /// Capacity of the command and event channels.
    pub channel_capacity: usize,
}

/// Default channel capacity for commands and events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            board_path: BOARD_ROOT.to_string(),
            contacts_path: CONTACTS_ROOT.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Subscribes to the board and the contacts, then spawns:
///
/// 1. a **board forwarder** turning snapshots into [`SyncEvent::BoardSnapshot`],
/// 2. a **contacts forwarder** turning snapshots into [`SyncEvent::ContactsSnapshot`],
/// 3. a **command handler** executing [`SyncCommand`]s sequentially.
///
/// # Errors
///
/// Returns the collaborator's error if either subscription fails.
pub async fn spawn_sync<P>(
    store: Arc<P>,
    config: SyncConfig,
) -> Result<(mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>), PersistenceError>
where
    P: Persistence + 'static,
{
    let board = store.subscribe(&config.board_path).await?;
    let contacts = store.subscribe(&config.contacts_path).await?;

    let capacity = config.channel_capacity.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(capacity);

    tokio::spawn(forward_snapshots(board, evt_tx.clone(), SyncEvent::BoardSnapshot));
    tokio::spawn(forward_snapshots(contacts, evt_tx.clone(), SyncEvent::ContactsSnapshot));
    tokio::spawn(command_handler(store, cmd_rx, evt_tx));

    tracing::info!(board = %config.board_path, contacts = %config.contacts_path, "sync started");
    Ok((cmd_tx, evt_rx))
}

/// Background task: forward every snapshot of one subscription.
async fn forward_snapshots(
    mut subscription: Subscription,
    evt_tx: mpsc::Sender<SyncEvent>,
    wrap: fn(Option<Value>) -> SyncEvent,
) {
    while let Some(snapshot) = subscription.next().await {
        if evt_tx.send(wrap(snapshot)).await.is_err() {
            // UI loop dropped; exit.
            break;
        }
    }
    tracing::debug!(path = subscription.path(), "snapshot forwarder stopped");
}

/// Background task: execute commands from the UI loop.
async fn command_handler<P: Persistence>(
    store: Arc<P>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let target = cmd.target().to_string();
        let result = match cmd {
            SyncCommand::Patch { prefix, updates } => {
                let keys = updates.len();
                let result = store.patch(&prefix, updates).await;
                tracing::debug!(%prefix, keys, ok = result.is_ok(), "patch submitted");
                result
            }
            SyncCommand::Write { path, value } => {
                let result = store.write(&path, value).await;
                tracing::debug!(%path, ok = result.is_ok(), "write submitted");
                result
            }
            SyncCommand::Shutdown => {
                tracing::info!("sync command handler shutting down");
                break;
            }
        };

        if let Err(error) = result {
            tracing::warn!(%target, %error, "persistence write failed");
            if evt_tx
                .send(SyncEvent::WriteFailed { target, error })
                .await
                .is_err()
            {
                break;
            }
        }
    }
}
