//! Remote sync client for the account device endpoint

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::io::HttpClient;

/// Intent sent to the account device endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Add,
    Remove,
}

impl SyncAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncAction::Add => "add",
            SyncAction::Remove => "remove",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single add/remove request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub action: SyncAction,
    pub public_key: String,
    pub name: String,
}

impl SyncRequest {
    pub fn new(action: SyncAction, public_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            action,
            public_key: public_key.into(),
            name: name.into(),
        }
    }
}

/// Endpoint reply body
#[derive(Debug, Deserialize)]
struct SyncReply {
    #[serde(default)]
    status: String,
}

const SUCCESS_STATUS: &str = "success";

/// Mirrors local registry changes to the account
#[async_trait]
pub trait RemoteSync: Send + Sync + fmt::Debug {
    /// Send one request. `Ok` only when the server confirms success.
    async fn sync(&self, request: &SyncRequest) -> crate::Result<()>;
}

/// [`RemoteSync`] over a form-encoded POST
pub struct HttpSyncClient {
    endpoint: String,
    http: Arc<dyn HttpClient>,
}

impl fmt::Debug for HttpSyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSyncClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl HttpSyncClient {
    pub fn new(endpoint: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let endpoint = endpoint.into();
        tracing::debug!("Created HttpSyncClient for {}", endpoint);
        Self { endpoint, http }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSync for HttpSyncClient {
    async fn sync(&self, request: &SyncRequest) -> crate::Result<()> {
        let params = [
            ("action", request.action.as_str()),
            ("public_key", request.public_key.as_str()),
            ("name", request.name.as_str()),
        ];

        tracing::debug!(
            "Syncing '{}' for device {}",
            request.action,
            request.public_key
        );

        let response = self.http.post_form(&self.endpoint, &params).await?;

        if !response.is_success() {
            return Err(crate::RegistryError::Sync(format!(
                "endpoint returned status {}: {}",
                response.status, response.body
            )));
        }

        let reply: SyncReply = serde_json::from_str(&response.body).map_err(|e| {
            crate::RegistryError::Sync(format!("unreadable reply '{}': {}", response.body, e))
        })?;

        if reply.status != SUCCESS_STATUS {
            return Err(crate::RegistryError::Sync(format!(
                "server reported status '{}'",
                reply.status
            )));
        }

        tracing::debug!("Synced '{}' for device {}", request.action, request.public_key);
        Ok(())
    }
}
