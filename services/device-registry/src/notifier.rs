//! Mutation notices for the toast/notification collaborator

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Registry change that was mirrored to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    Add,
    Remove,
    Claim,
    Rename,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Add => write!(f, "add"),
            Mutation::Remove => write!(f, "remove"),
            Mutation::Claim => write!(f, "claim"),
            Mutation::Rename => write!(f, "rename"),
        }
    }
}

/// Outcome of a remote sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationNotice {
    pub mutation: Mutation,
    pub public_key: String,
    pub success: bool,
    pub error: Option<String>,
}

impl MutationNotice {
    pub fn from_result(
        mutation: Mutation,
        public_key: impl Into<String>,
        result: &crate::Result<()>,
    ) -> Self {
        Self {
            mutation,
            public_key: public_key.into(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// Receives mutation notices
#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Get the notifier type name (e.g. "log")
    fn type_name(&self) -> &str;

    async fn notify(&self, notice: &MutationNotice) -> crate::Result<()>;
}

/// Writes notices to the tracing log
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn type_name(&self) -> &str {
        "log"
    }

    async fn notify(&self, notice: &MutationNotice) -> crate::Result<()> {
        if notice.success {
            tracing::info!("{} {} synced", notice.mutation, notice.public_key);
        } else {
            tracing::warn!(
                "{} {} failed to sync: {}",
                notice.mutation,
                notice.public_key,
                notice.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }
}

/// Forwards notices to a front end over a channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<MutationNotice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MutationNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    fn type_name(&self) -> &str {
        "channel"
    }

    async fn notify(&self, notice: &MutationNotice) -> crate::Result<()> {
        self.tx
            .send(notice.clone())
            .map_err(|_| crate::RegistryError::Sync("notice receiver dropped".to_string()))
    }
}
