//! Resolves bearer tokens to identities.

use async_trait::async_trait;

use super::{AuthError, AuthToken, Identity};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &AuthToken) -> Result<Identity, AuthError>;
}
