//! App core for NoxX.
//!
//! Wires the shell to its persistent collaborators: settings on disk, global
//! history and stored site permissions in SQLite.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::database::connection::Database;
use crate::engine::{HeadlessEngine, RenderEngine};
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::managers::permission_manager::PermissionManager;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::shell::Shell;
use crate::types::intent::{Envelope, ShellEvent};

/// Central application struct holding the shell and its collaborators.
pub struct App<E: RenderEngine = HeadlessEngine> {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
    pub history_manager: HistoryManager,
    pub shell: Shell<E>,
    events: UnboundedReceiver<Envelope>,
}

impl<E: RenderEngine> App<E> {
    /// Opens the database, loads settings (falling back to defaults when the
    /// file is unreadable) and starts the shell with a Homepage tab.
    pub fn new(
        db_path: impl AsRef<Path>,
        settings_path: Option<String>,
        engine: E,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        Ok(Self::with_database(db, settings_path, engine))
    }

    /// Same as [`App::new`] over an already opened database.
    pub fn with_database(db: Arc<Database>, settings_path: Option<String>, engine: E) -> Self {
        let mut settings_engine = SettingsEngine::new(settings_path);
        let settings = match settings_engine.load() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, path = settings_engine.get_config_path(), "settings unreadable, using defaults");
                settings_engine.get_settings().clone()
            }
        };

        let history_manager = HistoryManager::new(db.clone());
        let mut shell = Shell::new(engine, settings);
        shell.set_permission_decider(Box::new(PermissionManager::new(db.clone())));
        let events = shell.subscribe();
        let home = shell.create_tab(None);
        info!(tab_id = %home, "shell started");

        Self {
            db,
            settings_engine,
            history_manager,
            shell,
            events,
        }
    }

    /// A fresh permission store handle over the shared database.
    pub fn permissions(&self) -> PermissionManager {
        PermissionManager::new(self.db.clone())
    }

    /// Takes every notification published since the last call. History items
    /// are persisted on the way through.
    pub fn pump(&mut self) -> Vec<Envelope> {
        let mut out = Vec::new();
        while let Ok(envelope) = self.events.try_recv() {
            if let ShellEvent::AddHistoryItem(item) = &envelope.event {
                match self.history_manager.record_item(item) {
                    Ok(Some(id)) => debug!(%id, url = %item.url, "history item stored"),
                    Ok(None) => {}
                    Err(e) => warn!(url = %item.url, error = %e, "history item not stored"),
                }
            }
            out.push(envelope);
        }
        out
    }

    /// Shuts the shell down. Settings are already on disk; every change
    /// through the settings engine saves immediately.
    pub fn shutdown(&mut self) {
        self.shell.shutdown();
    }
}

impl App<HeadlessEngine> {
    /// Headless app over an in-memory database, for tests and the console demo.
    pub fn in_memory(settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open_in_memory()?);
        Ok(Self::with_database(db, settings_path, HeadlessEngine::default()))
    }

    /// Delivers queued engine events to the shell, then drains notifications.
    pub fn settle(&mut self) -> Vec<Envelope> {
        self.shell.settle();
        self.pump()
    }
}
