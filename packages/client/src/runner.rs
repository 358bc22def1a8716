//! Client composition root.

use std::{sync::Arc, time::Duration};

use crate::{
    catalog::{HttpCatalogFetcher, QuizCatalogCache},
    connection::{ConnectOptions, ConnectionManager},
    error::ClientError,
    session::run_session,
    transport::WsDialer,
};

/// Everything the CLI needs to start
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: String,
    pub api_url: String,
    pub connect: ConnectOptions,
    pub grace_period: Duration,
}

/// Build the services, run one interactive session, then close the connection.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let manager = ConnectionManager::with_grace_period(Arc::new(WsDialer), config.grace_period);
    let catalog = QuizCatalogCache::new(Arc::new(HttpCatalogFetcher::new(config.api_url)));

    tracing::info!("Connecting to {}", config.connect.url);
    let result = run_session(&manager, &catalog, &config.token, config.connect).await;

    manager.teardown().await;
    match &result {
        Ok(()) => tracing::info!("Client session ended normally"),
        Err(e) => tracing::warn!("Client session ended: {}", e),
    }
    result
}
