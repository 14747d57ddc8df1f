//! Application state shared across routes

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::dashboard::Workspace;
use crate::session::{FileStorage, KeyValueStorage, SessionHolder};
use crate::shell::Shell;
use crate::store::{Gateway, SupabaseClient};

/// Mutable view state: the loaded workspace and the selected page
#[derive(Debug, Default)]
pub struct ViewState {
    pub shell: Shell,
    pub workspace: Option<Workspace>,
}

impl ViewState {
    /// Forget everything loaded for the previous session
    pub fn reset(&mut self) {
        self.workspace = None;
        self.shell = Shell::new();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<dyn Gateway>,
    pub sessions: SessionHolder,
    pub view: Arc<Mutex<ViewState>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = Arc::new(SupabaseClient::new(&config));
        let storage = Arc::new(FileStorage::new(config.session_file.clone()));
        Self::with_parts(config, gateway, storage)
    }

    pub fn with_parts(
        config: Config,
        gateway: Arc<dyn Gateway>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            sessions: SessionHolder::new(storage),
            view: Arc::new(Mutex::new(ViewState::default())),
        }
    }
}
