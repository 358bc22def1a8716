//! Identity provider backed by a fixed token table.
//!
//! File format (camelCase):
//!
//! ```json
//! [{"token": "token-alice", "id": "alice", "displayName": "Alice"}]
//! ```

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{AuthError, AuthToken, DisplayName, Identity, IdentityProvider, ParticipantId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub token: String,
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Default)]
pub struct StaticTokenIdentityProvider {
    identities: HashMap<String, Identity>,
}

impl StaticTokenIdentityProvider {
    pub fn new(users: Vec<UserRecord>) -> Result<Self, AuthError> {
        let mut identities = HashMap::with_capacity(users.len());
        for user in users {
            let identity = Identity {
                id: ParticipantId::new(user.id)
                    .map_err(|e| AuthError::LoadFailed(e.to_string()))?,
                display_name: DisplayName::new(user.display_name)
                    .map_err(|e| AuthError::LoadFailed(e.to_string()))?,
            };
            if user.token.trim().is_empty() {
                return Err(AuthError::LoadFailed(format!(
                    "user '{}' has an empty token",
                    identity.id
                )));
            }
            identities.insert(user.token, identity);
        }
        Ok(Self { identities })
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let users: Vec<UserRecord> =
            serde_json::from_str(json).map_err(|e| AuthError::LoadFailed(e.to_string()))?;
        Self::new(users)
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AuthError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let provider = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} identities from {}",
            provider.identities.len(),
            path.display()
        );
        Ok(provider)
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentityProvider {
    async fn authenticate(&self, token: &AuthToken) -> Result<Identity, AuthError> {
        self.identities
            .get(token.as_str())
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
