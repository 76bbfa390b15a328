//! BDD test world for the device registry

use std::sync::{Arc, Mutex};

use cucumber::World;
use device_registry::notifier::MutationNotice;
use device_registry::ownership::OwnershipMap;
use device_registry::store::MemoryStore;
use device_registry::sync_client::{RemoteSync, SyncRequest};
use device_registry::{DeviceRegistry, RegistryError};

/// Remote that records every request and answers with a fixed verdict
#[derive(Debug, Default)]
pub struct ScriptedSync {
    pub requests: Mutex<Vec<SyncRequest>>,
    pub reject: bool,
}

#[async_trait::async_trait]
impl RemoteSync for ScriptedSync {
    async fn sync(&self, request: &SyncRequest) -> device_registry::Result<()> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        if self.reject {
            Err(RegistryError::Sync("server reported status 'fail'".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default, World)]
pub struct RegistryWorld {
    pub store: Arc<MemoryStore>,
    pub remote: Option<Arc<ScriptedSync>>,
    pub ownership: OwnershipMap,
    pub registry: Option<DeviceRegistry>,
    pub notices: Vec<MutationNotice>,
}

impl RegistryWorld {
    /// Registry built from the session set up so far
    pub fn registry(&mut self) -> &DeviceRegistry {
        let store = Arc::clone(&self.store);
        let remote = self.remote.clone();
        self.registry.get_or_insert_with(|| {
            let builder = DeviceRegistry::builder(store);
            match remote {
                Some(remote) => builder.with_remote(remote).build(),
                None => builder.build(),
            }
        })
    }

    pub fn sent_requests(&self) -> Vec<SyncRequest> {
        self.remote
            .as_ref()
            .map(|r| r.requests.lock().expect("request log poisoned").clone())
            .unwrap_or_default()
    }
}
