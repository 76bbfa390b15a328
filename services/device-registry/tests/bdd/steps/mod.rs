//! BDD step definitions for the device registry

pub mod list_steps;
pub mod sync_steps;
