//! Device registry synchronizer
//!
//! Reconciles the locally cached device list with the account's ownership
//! map and mirrors local changes to the account endpoint. The local cache is
//! the source of truth: remote failures are reported through the notifier and
//! never roll back a local change.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::badge::BadgeCategory;
use crate::device_set::{DeviceSet, PipeCodec, SetCodec};
use crate::notifier::{LogNotifier, Mutation, MutationNotice, Notifier};
use crate::ownership::OwnershipMap;
use crate::prompt::{AcknowledgePrompt, RemovalPrompt};
use crate::store::{self, KeyValueStore};
use crate::sync_client::{RemoteSync, SyncAction, SyncRequest};

/// Ownership as known to this session
#[derive(Debug, Default)]
struct Ownership {
    map: OwnershipMap,
    claimed: HashSet<String>,
}

impl Ownership {
    fn owns(&self, key: &str) -> bool {
        self.map.contains(key) || self.claimed.contains(key)
    }

    fn display_name(&self, key: &str) -> Option<String> {
        self.map
            .get(key)
            .map(|entry| entry.display_name.clone())
            .filter(|name| !name.is_empty())
    }
}

type OwnershipHandle = Arc<RwLock<Ownership>>;

/// One rendered row of the device list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRow {
    pub public_key: String,
    pub label: String,
    pub category: BadgeCategory,
    pub owned: bool,
}

/// Remote sync running in the background
///
/// Dropping it leaves the sync running; awaiting [`PendingSync::wait`]
/// yields the notice that was sent to the notifier.
#[derive(Debug)]
pub struct PendingSync {
    handle: JoinHandle<MutationNotice>,
}

impl PendingSync {
    pub async fn wait(self) -> Option<MutationNotice> {
        match self.handle.await {
            Ok(notice) => Some(notice),
            Err(e) => {
                tracing::warn!("Sync task did not complete: {}", e);
                None
            }
        }
    }
}

/// Result of a mutating registry operation
#[derive(Debug)]
pub enum MutationOutcome {
    /// Nothing to do (already present, absent, or already owned)
    Unchanged,
    /// The removal prompt declined
    Declined,
    /// Local state was updated; `pending` is set when a remote sync was issued
    Applied { pending: Option<PendingSync> },
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }

    pub fn into_pending(self) -> Option<PendingSync> {
        match self {
            MutationOutcome::Applied { pending } => pending,
            _ => None,
        }
    }

    /// Wait for the remote sync, if any
    pub async fn settle(self) -> Option<MutationNotice> {
        match self.into_pending() {
            Some(pending) => pending.wait().await,
            None => None,
        }
    }
}

/// Builder for [`DeviceRegistry`]
pub struct DeviceRegistryBuilder {
    store: Arc<dyn KeyValueStore>,
    codec: Arc<dyn SetCodec>,
    remote: Option<Arc<dyn RemoteSync>>,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn RemovalPrompt>,
}

impl DeviceRegistryBuilder {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            codec: Arc::new(PipeCodec),
            remote: None,
            notifier: Arc::new(LogNotifier),
            prompt: Arc::new(AcknowledgePrompt),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn SetCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Marks the session authenticated; changes are mirrored through `remote`
    pub fn with_remote(mut self, remote: Arc<dyn RemoteSync>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn RemovalPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn build(self) -> DeviceRegistry {
        tracing::debug!(
            "Built device registry (authenticated={}, notifier={})",
            self.remote.is_some(),
            self.notifier.type_name()
        );
        DeviceRegistry {
            store: self.store,
            codec: self.codec,
            remote: self.remote,
            notifier: self.notifier,
            prompt: self.prompt,
            ownership: Arc::new(RwLock::new(Ownership::default())),
        }
    }
}

/// The device registry synchronizer
///
/// Methods that may mirror a change remotely spawn a tokio task and must be
/// called from within a tokio runtime.
pub struct DeviceRegistry {
    store: Arc<dyn KeyValueStore>,
    codec: Arc<dyn SetCodec>,
    remote: Option<Arc<dyn RemoteSync>>,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn RemovalPrompt>,
    ownership: OwnershipHandle,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("authenticated", &self.is_authenticated())
            .field("remote", &self.remote)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl DeviceRegistry {
    pub fn builder(store: Arc<dyn KeyValueStore>) -> DeviceRegistryBuilder {
        DeviceRegistryBuilder::new(store)
    }

    pub fn is_authenticated(&self) -> bool {
        self.remote.is_some()
    }

    /// Adopt the account's ownership map and append owned devices missing locally.
    ///
    /// Model labels of owned devices are refreshed in the info cache. Returns
    /// the number of keys appended.
    pub fn merge_on_load(&self, map: OwnershipMap) -> usize {
        let mut set = self.load_set();
        let mut appended = 0;

        for (key, entry) in map.iter() {
            if set.insert(key) {
                appended += 1;
            }
            let info_key = store::info_key(key);
            if self.read(&info_key).as_deref().unwrap_or_default() != entry.model_label {
                self.write(&info_key, &entry.model_label);
            }
        }

        if appended > 0 {
            self.save_set(&set);
        }

        tracing::debug!(
            "Merged {} owned devices, {} new locally",
            map.len(),
            appended
        );
        self.ownership_mut().map = map;
        appended
    }

    /// Snapshot of the device list, resolved lazily per row
    pub fn list(&self) -> DeviceListing<'_> {
        DeviceListing {
            registry: self,
            keys: self.load_set(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.load_set().contains(key)
    }

    /// Account name if set, else the local name override, else empty
    pub fn display_name(&self, key: &str) -> String {
        self.ownership()
            .display_name(key)
            .or_else(|| self.read(&store::name_key(key)))
            .unwrap_or_default()
    }

    pub fn is_owned(&self, key: &str) -> bool {
        self.ownership().owns(key)
    }

    pub fn add(&self, key: &str) -> MutationOutcome {
        if key.is_empty() {
            tracing::debug!("Ignoring add of empty device key");
            return MutationOutcome::Unchanged;
        }
        let mut set = self.load_set();
        if !set.insert(key) {
            tracing::debug!("Device {} already registered", key);
            return MutationOutcome::Unchanged;
        }
        self.save_set(&set);
        tracing::info!("Added device {}", key);

        let pending = self.spawn_sync(Mutation::Add, SyncAction::Add, key);
        MutationOutcome::Applied { pending }
    }

    /// [`DeviceRegistry::add`], also caching the device's model label
    pub fn add_with_info(&self, key: &str, info: &str) -> MutationOutcome {
        if key.is_empty() {
            return MutationOutcome::Unchanged;
        }
        if !info.is_empty() {
            self.write(&store::info_key(key), info);
        }
        self.add(key)
    }

    pub fn remove(&self, key: &str) -> MutationOutcome {
        let mut set = self.load_set();
        if !set.contains(key) {
            tracing::debug!("Device {} not registered, nothing to remove", key);
            return MutationOutcome::Unchanged;
        }
        if !self.prompt.confirm_removal(key) {
            tracing::debug!("Removal of {} declined", key);
            return MutationOutcome::Declined;
        }

        set.remove(key);
        self.save_set(&set);
        tracing::info!("Removed device {}", key);

        let pending = self.spawn_sync(Mutation::Remove, SyncAction::Remove, key);
        MutationOutcome::Applied { pending }
    }

    /// Attach a locally known device to the signed-in account.
    ///
    /// On success the key is treated as owned for the rest of the session.
    pub fn claim_for_account(&self, key: &str) -> MutationOutcome {
        if key.is_empty() || !self.is_authenticated() {
            return MutationOutcome::Unchanged;
        }
        if self.is_owned(key) || !self.contains(key) {
            tracing::debug!("Device {} cannot be claimed", key);
            return MutationOutcome::Unchanged;
        }
        let pending = self.spawn_sync(Mutation::Claim, SyncAction::Add, key);
        MutationOutcome::Applied { pending }
    }

    /// Store a local name override and push it to the account
    pub fn set_name(&self, key: &str, name: &str) -> MutationOutcome {
        if key.is_empty() {
            tracing::debug!("Ignoring name for empty device key");
            return MutationOutcome::Unchanged;
        }
        self.write(&store::name_key(key), name);
        tracing::info!("Named device {} '{}'", key, name);
        let pending = self.spawn_sync(Mutation::Rename, SyncAction::Add, key);
        MutationOutcome::Applied { pending }
    }

    fn spawn_sync(&self, mutation: Mutation, action: SyncAction, key: &str) -> Option<PendingSync> {
        let remote = Arc::clone(self.remote.as_ref()?);
        let notifier = Arc::clone(&self.notifier);
        let ownership = Arc::clone(&self.ownership);
        let name = self.read(&store::name_key(key)).unwrap_or_default();
        let request = SyncRequest::new(action, key, name);

        let handle = tokio::spawn(async move {
            let result = remote.sync(&request).await;
            if mutation == Mutation::Claim && result.is_ok() {
                ownership
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .claimed
                    .insert(request.public_key.clone());
            }

            let notice = MutationNotice::from_result(mutation, &request.public_key, &result);
            if let Err(e) = notifier.notify(&notice).await {
                tracing::warn!(
                    "Notifier '{}' failed for {} {}: {}",
                    notifier.type_name(),
                    mutation,
                    request.public_key,
                    e
                );
            }
            notice
        });

        Some(PendingSync { handle })
    }

    fn row(&self, key: &str) -> DeviceRow {
        let info = self.read(&store::info_key(key)).unwrap_or_default();
        DeviceRow {
            public_key: key.to_string(),
            label: self.display_name(key),
            category: BadgeCategory::classify(&info),
            owned: self.is_owned(key),
        }
    }

    fn load_set(&self) -> DeviceSet {
        self.read(store::DEVICES_KEY)
            .map(|raw| self.codec.decode(&raw))
            .unwrap_or_default()
    }

    fn save_set(&self, set: &DeviceSet) {
        self.write(store::DEVICES_KEY, &self.codec.encode(set));
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Store read of '{}' failed, treating as empty: {}", key, e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Store write of '{}' failed: {}", key, e);
        }
    }

    fn ownership(&self) -> std::sync::RwLockReadGuard<'_, Ownership> {
        self.ownership.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn ownership_mut(&self) -> std::sync::RwLockWriteGuard<'_, Ownership> {
        self.ownership.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Device list captured at one point in time
///
/// Iterating resolves labels and ownership row by row; iterate again for a
/// fresh resolution of the same keys.
pub struct DeviceListing<'a> {
    registry: &'a DeviceRegistry,
    keys: DeviceSet,
}

impl<'a> DeviceListing<'a> {
    pub fn iter(&self) -> DeviceRows<'_> {
        DeviceRows {
            registry: self.registry,
            keys: &self.keys,
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a, 'b> IntoIterator for &'b DeviceListing<'a> {
    type Item = DeviceRow;
    type IntoIter = DeviceRows<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the rows of a [`DeviceListing`]
pub struct DeviceRows<'a> {
    registry: &'a DeviceRegistry,
    keys: &'a DeviceSet,
    next: usize,
}

impl Iterator for DeviceRows<'_> {
    type Item = DeviceRow;

    fn next(&mut self) -> Option<DeviceRow> {
        let key = self.keys.get(self.next)?;
        self.next += 1;
        Some(self.registry.row(key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.keys.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
