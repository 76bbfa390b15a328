//! Command interface for front ends driving the registry

use crate::notifier::MutationNotice;
use crate::ownership::OwnershipMap;
use crate::registry::{DeviceRegistry, DeviceRow, MutationOutcome};

/// User action forwarded by a front end
#[derive(Debug, Clone)]
pub enum Command {
    List,
    Add { key: String, info: Option<String> },
    Remove { key: String },
    Claim { key: String },
    SetName { key: String, name: String },
    Contains { key: String },
    Merge { ownership: OwnershipMap },
}

/// Result of [`execute`]
#[derive(Debug)]
pub enum CommandOutput {
    Rows(Vec<DeviceRow>),
    Outcome(MutationOutcome),
    Contains(bool),
    Merged(usize),
}

/// Dispatch a command to the registry
pub fn execute(registry: &DeviceRegistry, command: Command) -> CommandOutput {
    tracing::debug!("Executing {:?}", command);
    match command {
        Command::List => CommandOutput::Rows(registry.list().iter().collect()),
        Command::Add { key, info } => CommandOutput::Outcome(match info {
            Some(info) => registry.add_with_info(&key, &info),
            None => registry.add(&key),
        }),
        Command::Remove { key } => CommandOutput::Outcome(registry.remove(&key)),
        Command::Claim { key } => CommandOutput::Outcome(registry.claim_for_account(&key)),
        Command::SetName { key, name } => CommandOutput::Outcome(registry.set_name(&key, &name)),
        Command::Contains { key } => CommandOutput::Contains(registry.contains(&key)),
        Command::Merge { ownership } => CommandOutput::Merged(registry.merge_on_load(ownership)),
    }
}

impl CommandOutput {
    /// Wait for any remote sync the command started
    pub async fn settle(self) -> (Self, Option<MutationNotice>) {
        match self {
            CommandOutput::Outcome(MutationOutcome::Applied { pending }) => {
                let notice = match pending {
                    Some(pending) => pending.wait().await,
                    None => None,
                };
                (
                    CommandOutput::Outcome(MutationOutcome::Applied { pending: None }),
                    notice,
                )
            }
            other => (other, None),
        }
    }
}
