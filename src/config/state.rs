// Application state module
// Immutable per-process state shared by every connection

use std::sync::Arc;
use tokio_util::task::TaskTracker;

use super::types::Config;
use crate::contact::{notifier, Notifier, NotifyError};
use crate::handler::assets::{AssetStore, DirAssetStore};

/// Application state
///
/// Nothing in here is mutated after startup; requests only read it.
pub struct AppState {
    pub config: Config,
    pub assets: Arc<dyn AssetStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Background work (notifier deliveries) awaited during shutdown
    pub background: TaskTracker,
}

impl AppState {
    pub fn new(config: Config, assets: Arc<dyn AssetStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            assets,
            notifier,
            background: TaskTracker::new(),
        }
    }

    /// Build state with the directory asset store and the configured notifier
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let assets = Arc::new(DirAssetStore::new(&config.assets.root));
        let notifier = notifier::from_config(&config.notifier)?;
        Ok(Self::new(config.clone(), assets, notifier))
    }
}
