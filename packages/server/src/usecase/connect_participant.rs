//! UseCase: open a websocket session
//!
//! Authenticates the upgrade request before the handshake, then registers the
//! connection's outbound channel once the socket is open. Joining a room is a
//! separate command.

use std::sync::Arc;

use crate::domain::{Actor, ConnectionId, MessagePusher, PusherChannel};

use super::{authenticate::AuthenticateUseCase, error::ConnectError};

pub struct ConnectParticipantUseCase {
    authenticate: Arc<AuthenticateUseCase>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        authenticate: Arc<AuthenticateUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            authenticate,
            message_pusher,
        }
    }

    /// Authenticate an upgrade request and issue a connection id.
    ///
    /// Nothing is registered yet; see [`Self::attach`].
    ///
    /// # Returns
    ///
    /// * `Ok(Actor)` - identity plus the freshly issued connection id
    /// * `Err(ConnectError)` - the token was missing or unknown
    pub async fn execute(&self, authorization: Option<&str>) -> Result<Actor, ConnectError> {
        let identity = self.authenticate.execute(authorization).await?;
        Ok(Actor::new(identity, ConnectionId::generate()))
    }

    /// Register the outbound channel of an upgraded socket.
    pub async fn attach(&self, actor: &Actor, sender: PusherChannel) {
        self.message_pusher
            .register_client(actor.connection, sender)
            .await;

        tracing::info!(
            "Participant '{}' connected as {}",
            actor.identity.id,
            actor.connection
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{AuthError, DisplayName, Identity, ParticipantId, RoomEvent, identity::MockIdentityProvider},
        infrastructure::message_pusher::WebSocketMessagePusher,
    };
    use tokio::sync::mpsc;

    fn usecase_with(
        provider: MockIdentityProvider,
    ) -> (ConnectParticipantUseCase, Arc<WebSocketMessagePusher>) {
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let authenticate = Arc::new(AuthenticateUseCase::new(Arc::new(provider)));
        (
            ConnectParticipantUseCase::new(authenticate, pusher.clone()),
            pusher,
        )
    }

    #[tokio::test]
    async fn test_attach_registers_channel() {
        // given:
        let mut provider = MockIdentityProvider::new();
        provider.expect_authenticate().returning(|_| {
            Ok(Identity {
                id: ParticipantId::new("alice".to_string()).unwrap(),
                display_name: DisplayName::new("Alice".to_string()).unwrap(),
            })
        });
        let (usecase, pusher) = usecase_with(provider);
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when:
        let actor = usecase.execute(Some("Bearer token-alice")).await.unwrap();
        usecase.attach(&actor, tx).await;

        // then: the connection can be pushed to
        assert_eq!(actor.identity.id.as_str(), "alice");
        pusher
            .push_to(
                &actor.connection,
                &RoomEvent::Error {
                    message: "ping".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_connect_without_token_fails() {
        // given:
        let (usecase, _pusher) = usecase_with(MockIdentityProvider::new());

        // when:
        let result = usecase.execute(None).await;

        // then:
        assert_eq!(
            result,
            Err(ConnectError::Unauthorized(AuthError::MissingToken))
        );
    }

    #[tokio::test]
    async fn test_authenticated_connection_is_not_registered_before_attach() {
        // given:
        let mut provider = MockIdentityProvider::new();
        provider.expect_authenticate().returning(|_| {
            Ok(Identity {
                id: ParticipantId::new("alice".to_string()).unwrap(),
                display_name: DisplayName::new("Alice".to_string()).unwrap(),
            })
        });
        let (usecase, pusher) = usecase_with(provider);

        // when: the handshake never completes
        let actor = usecase.execute(Some("Bearer token-alice")).await.unwrap();

        // then:
        let result = pusher
            .push_to(
                &actor.connection,
                &RoomEvent::Error {
                    message: "ping".to_string(),
                },
            )
            .await;
        assert!(result.is_err());
    }
}
