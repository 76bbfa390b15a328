//! BDD test entry point for the device registry

#[path = "bdd/world.rs"]
mod world;

#[path = "bdd/steps/mod.rs"]
mod steps;

use cucumber::World as _;
use world::RegistryWorld;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    RegistryWorld::run("tests/features").await;
}
