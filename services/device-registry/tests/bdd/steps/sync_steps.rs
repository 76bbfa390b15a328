//! BDD step definitions for the account sync feature

use std::sync::Arc;

use cucumber::{given, then, when};

use device_registry::sync_client::{SyncAction, SyncRequest};

use crate::world::{RegistryWorld, ScriptedSync};

#[given("an anonymous session")]
fn anonymous(world: &mut RegistryWorld) {
    world.remote = None;
}

#[given("a signed-in session")]
fn signed_in(world: &mut RegistryWorld) {
    world.remote = Some(Arc::new(ScriptedSync::default()));
}

#[given("a signed-in session whose server rejects changes")]
fn signed_in_rejecting(world: &mut RegistryWorld) {
    world.remote = Some(Arc::new(ScriptedSync {
        reject: true,
        ..Default::default()
    }));
}

#[when(expr = "device {string} is added")]
async fn add(world: &mut RegistryWorld, key: String) {
    let notice = world.registry().add(&key).settle().await;
    world.notices.extend(notice);
}

#[when(expr = "device {string} is removed")]
async fn remove(world: &mut RegistryWorld, key: String) {
    let notice = world.registry().remove(&key).settle().await;
    world.notices.extend(notice);
}

#[when(expr = "device {string} is claimed")]
async fn claim(world: &mut RegistryWorld, key: String) {
    let notice = world.registry().claim_for_account(&key).settle().await;
    world.notices.extend(notice);
}

#[when(expr = "device {string} is renamed to {string}")]
async fn rename(world: &mut RegistryWorld, key: String, name: String) {
    let notice = world.registry().set_name(&key, &name).settle().await;
    world.notices.extend(notice);
}

#[then(expr = "{int} sync request(s) was/were sent")]
fn request_count(world: &mut RegistryWorld, count: usize) {
    assert_eq!(world.sent_requests().len(), count);
}

#[then(expr = "sync request {int} is {string} for {string} named {string}")]
fn request_is(world: &mut RegistryWorld, index: usize, action: String, key: String, name: String) {
    let action = match action.as_str() {
        "add" => SyncAction::Add,
        "remove" => SyncAction::Remove,
        other => panic!("unknown action {}", other),
    };
    let requests = world.sent_requests();
    assert_eq!(requests[index - 1], SyncRequest::new(action, key, name));
}

#[then(expr = "the last notice reports a successful {string}")]
fn last_notice_success(world: &mut RegistryWorld, mutation: String) {
    let notice = world.notices.last().expect("no notice");
    assert_eq!(notice.mutation.to_string(), mutation);
    assert!(notice.success);
}

#[then(expr = "the last notice reports a failed {string}")]
fn last_notice_failure(world: &mut RegistryWorld, mutation: String) {
    let notice = world.notices.last().expect("no notice");
    assert_eq!(notice.mutation.to_string(), mutation);
    assert!(!notice.success);
    assert!(notice.error.is_some());
}
