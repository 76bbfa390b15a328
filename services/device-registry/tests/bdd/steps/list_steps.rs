//! BDD step definitions for the device list feature

use cucumber::{given, then, when};

use device_registry::ownership::OwnershipEntry;
use device_registry::store::KeyValueStore;
use device_registry::DeviceRow;

use crate::world::RegistryWorld;

#[given("an empty device store")]
fn empty_store(_world: &mut RegistryWorld) {}

#[given(expr = "the device store contains {string}")]
fn store_contains(world: &mut RegistryWorld, devices: String) {
    world
        .store
        .set("devices", &devices)
        .expect("memory store write");
}

#[given(expr = "device {string} has the local name {string}")]
fn local_name(world: &mut RegistryWorld, key: String, name: String) {
    world
        .store
        .set(&format!("name-{}", key), &name)
        .expect("memory store write");
}

#[given(expr = "the account owns device {string} named {string}")]
fn account_owns(world: &mut RegistryWorld, key: String, name: String) {
    world.ownership.insert(key, OwnershipEntry::new(name, ""));
}

#[given(expr = "the account owns device {string} named {string} of model {string}")]
fn account_owns_model(world: &mut RegistryWorld, key: String, name: String, model: String) {
    world.ownership.insert(key, OwnershipEntry::new(name, model));
}

#[when("the ownership map is merged")]
fn merge(world: &mut RegistryWorld) {
    let map = world.ownership.clone();
    world.registry().merge_on_load(map);
}

#[when(expr = "device {string} is added with label {string}")]
async fn add_with_label(world: &mut RegistryWorld, key: String, label: String) {
    let notice = world.registry().add_with_info(&key, &label).settle().await;
    world.notices.extend(notice);
}

#[then(expr = "the device list is {string}")]
fn device_list_is(world: &mut RegistryWorld, expected: String) {
    let keys: Vec<String> = world
        .registry()
        .list()
        .iter()
        .map(|row| row.public_key)
        .collect();
    let expected: Vec<String> = expected
        .split(',')
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    assert_eq!(keys, expected);
}

fn row(world: &mut RegistryWorld, index: usize) -> DeviceRow {
    world
        .registry()
        .list()
        .iter()
        .nth(index - 1)
        .unwrap_or_else(|| panic!("no row {}", index))
}

#[then(expr = "row {int} shows device {string} labelled {string} as {word}")]
fn row_shows(world: &mut RegistryWorld, index: usize, key: String, label: String, category: String) {
    let row = row(world, index);
    assert_eq!(row.public_key, key);
    assert_eq!(row.label, label);
    assert_eq!(row.category.to_string(), category);
}

#[then(expr = "row {int} is owned")]
fn row_owned(world: &mut RegistryWorld, index: usize) {
    assert!(row(world, index).owned);
}

#[then(expr = "row {int} is not owned")]
fn row_not_owned(world: &mut RegistryWorld, index: usize) {
    assert!(!row(world, index).owned);
}

#[then(expr = "the cached info for {string} is {string}")]
fn cached_info(world: &mut RegistryWorld, key: String, info: String) {
    let cached = world
        .store
        .get(&format!("info-{}", key))
        .expect("memory store read")
        .unwrap_or_default();
    assert_eq!(cached, info);
}
