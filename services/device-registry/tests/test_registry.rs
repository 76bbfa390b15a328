//! Registry behaviour against injected store, remote and notifier fakes

use std::sync::{Arc, Mutex};

use device_registry::badge::BadgeCategory;
use device_registry::notifier::{ChannelNotifier, Mutation};
use device_registry::ownership::{OwnershipEntry, OwnershipMap};
use device_registry::store::{FileStore, KeyValueStore, MemoryStore};
use device_registry::sync_client::{RemoteSync, SyncAction, SyncRequest};
use device_registry::{DeviceRegistry, DeviceRow, MutationOutcome, RegistryError};

#[derive(Debug, Default)]
struct RecordingSync {
    requests: Mutex<Vec<SyncRequest>>,
}

#[async_trait::async_trait]
impl RemoteSync for RecordingSync {
    async fn sync(&self, request: &SyncRequest) -> device_registry::Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Store whose every access fails
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> device_registry::Result<Option<String>> {
        Err(RegistryError::Storage("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> device_registry::Result<()> {
        Err(RegistryError::Storage("storage disabled".to_string()))
    }
}

fn keys(registry: &DeviceRegistry) -> Vec<String> {
    registry.list().iter().map(|row| row.public_key).collect()
}

#[tokio::test]
async fn list_pairs_rows_with_ownership() {
    let store = Arc::new(MemoryStore::new());
    store.set("devices", "A|B").unwrap();
    let registry = DeviceRegistry::builder(store).build();

    let map = OwnershipMap::from_json(r#"{"B": ["Kitchen"]}"#).unwrap();
    registry.merge_on_load(map);

    let rows: Vec<DeviceRow> = registry.list().iter().collect();
    let summary: Vec<(&str, &str, BadgeCategory, bool)> = rows
        .iter()
        .map(|r| (r.public_key.as_str(), r.label.as_str(), r.category, r.owned))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("A", "", BadgeCategory::Sensor, false),
            ("B", "Kitchen", BadgeCategory::Sensor, true),
        ]
    );
}

#[tokio::test]
async fn authenticated_add_issues_single_call() {
    let remote = Arc::new(RecordingSync::default());
    let registry = DeviceRegistry::builder(Arc::new(MemoryStore::new()))
        .with_remote(remote.clone())
        .build();

    registry.add("C").settle().await;

    assert_eq!(
        *remote.requests.lock().unwrap(),
        vec![SyncRequest::new(SyncAction::Add, "C", "")]
    );
}

#[tokio::test]
async fn unauthenticated_add_makes_no_call() {
    let store = Arc::new(MemoryStore::new());
    let registry = DeviceRegistry::builder(store.clone()).build();

    let outcome = registry.add("C");
    assert!(outcome.into_pending().is_none());
    assert_eq!(store.get("devices").unwrap().as_deref(), Some("C"));
}

#[tokio::test]
async fn duplicate_add_is_not_synced_twice() {
    let remote = Arc::new(RecordingSync::default());
    let registry = DeviceRegistry::builder(Arc::new(MemoryStore::new()))
        .with_remote(remote.clone())
        .build();

    registry.add("C").settle().await;
    assert!(matches!(registry.add("C"), MutationOutcome::Unchanged));
    assert_eq!(remote.requests.lock().unwrap().len(), 1);
    assert_eq!(keys(&registry), vec!["C"]);
}

#[tokio::test]
async fn notices_reach_the_notifier() {
    let (notifier, mut rx) = ChannelNotifier::new();
    let registry = DeviceRegistry::builder(Arc::new(MemoryStore::new()))
        .with_remote(Arc::new(RecordingSync::default()))
        .with_notifier(Arc::new(notifier))
        .build();

    registry.add("A").settle().await;
    registry.remove("A").settle().await;

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!((first.mutation, first.success), (Mutation::Add, true));
    assert_eq!((second.mutation, second.success), (Mutation::Remove, true));
}

#[tokio::test]
async fn broken_storage_degrades_to_empty() {
    let registry = DeviceRegistry::builder(Arc::new(BrokenStore)).build();

    assert!(registry.list().is_empty());
    assert!(registry.add("A").is_applied());
    assert!(!registry.contains("A"));
    assert_eq!(registry.display_name("A"), "");
    registry.merge_on_load(OwnershipMap::from_json(r#"{"A": ["Tank"]}"#).unwrap());
    assert!(registry.is_owned("A"));
}

#[tokio::test]
async fn merge_keeps_existing_order_and_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    store.set("devices", "X|Y").unwrap();
    let registry = DeviceRegistry::builder(store.clone()).build();

    let mut map = OwnershipMap::new();
    map.insert("Z", OwnershipEntry::new("Relay", "Pump Switch"));
    map.insert("X", OwnershipEntry::new("Tank", "Level Sensor"));

    registry.merge_on_load(map.clone());
    let devices = store.get("devices").unwrap();
    let info_z = store.get("info-Z").unwrap();
    let info_x = store.get("info-X").unwrap();

    registry.merge_on_load(map);
    assert_eq!(store.get("devices").unwrap(), devices);
    assert_eq!(store.get("info-Z").unwrap(), info_z);
    assert_eq!(store.get("info-X").unwrap(), info_x);
    assert_eq!(devices.as_deref(), Some("X|Y|Z"));
}

#[tokio::test]
async fn empty_merge_is_noop() {
    let store = Arc::new(MemoryStore::new());
    let registry = DeviceRegistry::builder(store.clone()).build();
    assert_eq!(registry.merge_on_load(OwnershipMap::new()), 0);
    assert_eq!(store.get("devices").unwrap(), None);
}

#[tokio::test]
async fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let registry = DeviceRegistry::builder(Arc::new(FileStore::open(&path))).build();
        registry.add_with_info("R1", "Smart Switch 3000");
        registry.add("S1");
        registry.set_name("S1", "Well");
    }

    let registry = DeviceRegistry::builder(Arc::new(FileStore::open(&path))).build();
    let rows: Vec<DeviceRow> = registry.list().iter().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].public_key, "R1");
    assert_eq!(rows[0].category, BadgeCategory::Switch);
    assert_eq!(rows[1].label, "Well");
}
