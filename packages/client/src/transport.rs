//! Transport seam between the connection task and the network.
//!
//! A [`Dialer`] opens one typed duplex connection: a sink of client commands
//! and a stream of server events. [`WsDialer`] is the websocket implementation;
//! tests plug in channel-backed fakes.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use quizroom_server::infrastructure::dto::websocket::{ClientCommand, ServerEvent};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
        protocol::Message,
    },
};

use crate::error::ClientError;

pub type CommandSink = Pin<Box<dyn Sink<ClientCommand, Error = ClientError> + Send>>;
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ServerEvent, ClientError>> + Send>>;

/// One open connection, split into its two halves
pub struct Transport {
    pub sink: CommandSink,
    pub stream: EventStream,
}

#[async_trait]
pub trait Dialer: Send + Sync {
    /// Open a connection to `url`, authenticating with `token`.
    async fn dial(&self, url: &str, token: &str) -> Result<Transport, ClientError>;
}

/// Websocket dialer sending the token as an `Authorization: Bearer` header
#[derive(Debug, Default, Clone, Copy)]
pub struct WsDialer;

#[async_trait]
impl Dialer for WsDialer {
    async fn dial(&self, url: &str, token: &str) -> Result<Transport, ClientError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::Unauthorized)?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (ws_stream, _response) = connect_async(request).await.map_err(|e| match e {
            tungstenite::Error::Http(response) if response.status() == StatusCode::UNAUTHORIZED => {
                ClientError::Unauthorized
            }
            e => ClientError::ConnectionError(e.to_string()),
        })?;
        tracing::info!("Connected to {}", url);

        let (write, read) = ws_stream.split();

        let sink = write
            .sink_map_err(|e| ClientError::ConnectionError(e.to_string()))
            .with(|command: ClientCommand| async move {
                serde_json::to_string(&command)
                    .map(|frame| Message::Text(frame.into()))
                    .map_err(|e| ClientError::Encode(e.to_string()))
            });

        let stream = read.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(text.as_str()) {
                    Ok(event) => Some(Ok(event)),
                    Err(e) => {
                        tracing::warn!("Ignoring undecodable frame: {}", e);
                        None
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    Some(Err(ClientError::Closed))
                }
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::ConnectionError(e.to_string()))),
            }
        });

        Ok(Transport {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}
