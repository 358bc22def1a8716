//! UseCase: resolve the `Authorization` header of a request to an identity.

use std::sync::Arc;

use crate::domain::{AuthError, AuthToken, Identity, IdentityProvider};

pub struct AuthenticateUseCase {
    identity_provider: Arc<dyn IdentityProvider>,
}

impl AuthenticateUseCase {
    pub fn new(identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self { identity_provider }
    }

    /// `authorization` is the raw header value, if the request carried one.
    pub async fn execute(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let header = authorization.ok_or(AuthError::MissingToken)?;
        let token = AuthToken::from_bearer_header(header).map_err(|_| AuthError::MissingToken)?;
        self.identity_provider.authenticate(&token).await
    }
}
