//! Device Registry - local device list synchronized with an account
//!
//! Keeps a per-client list of device keys, reconciles it with the devices
//! the signed-in account owns, and mirrors add/remove/rename to the account
//! endpoint.

pub mod badge;
pub mod command;
pub mod config;
pub mod device_set;
pub mod error;
pub mod io;
pub mod notifier;
pub mod ownership;
pub mod prompt;
pub mod registry;
pub mod store;
pub mod sync_client;

pub use config::{load_config, Config};
pub use error::{RegistryError, Result};
pub use registry::{DeviceRegistry, DeviceRow, MutationOutcome};

use std::sync::Arc;

use crate::io::ReqwestHttpClient;
use crate::notifier::Notifier;
use crate::ownership::OwnershipMap;
use crate::prompt::RemovalPrompt;
use crate::store::FileStore;
use crate::sync_client::HttpSyncClient;

/// Build a registry from configuration and run the load-time merge
pub fn open_registry(
    config: &Config,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn RemovalPrompt>,
) -> Result<DeviceRegistry> {
    config.validate()?;

    let store = Arc::new(FileStore::open(&config.storage.path));
    let mut builder = DeviceRegistry::builder(store)
        .with_notifier(notifier)
        .with_prompt(prompt);

    if config.sync.authenticated {
        let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new());
        builder = builder.with_remote(Arc::new(HttpSyncClient::new(
            config.sync.endpoint.clone(),
            http,
        )));
    }

    let registry = builder.build();

    // Ownership only exists for a signed-in account
    if config.sync.authenticated {
        if let Some(path) = &config.ownership.path {
            match OwnershipMap::load(path) {
                Ok(map) => {
                    registry.merge_on_load(map);
                }
                Err(e) => tracing::warn!("Skipping ownership merge: {}", e),
            }
        }
    }

    tracing::info!(
        "Device registry ready ({} devices, authenticated={})",
        registry.list().len(),
        registry.is_authenticated()
    );
    Ok(registry)
}
