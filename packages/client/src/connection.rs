//! Connection multiplexer.
//!
//! [`ConnectionManager`] owns at most one live connection to the room server
//! and hands out cheap [`ConnectionHandle`] clones to every consumer. Consumers
//! announce themselves with [`ConnectionManager::register_user`] and
//! [`ConnectionManager::unregister_user`]; when the last one leaves, the
//! connection is closed after a grace period unless someone comes back first.
//!
//! The network side runs in one task per handle. It dials, reconnects within
//! the configured budget, forwards queued commands while connected and fans
//! incoming events out to subscribers.

use std::{
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use quizroom_server::infrastructure::dto::websocket::{ClientCommand, ServerEvent};
use tokio::{
    sync::{Mutex, broadcast, mpsc, watch},
    task::JoinHandle,
};

use crate::{
    domain::{
        CONNECT_TIMEOUT, DEFAULT_GRACE_PERIOD, MAX_RECONNECT_ATTEMPTS, RECONNECT_INTERVAL,
        should_attempt_reconnect,
    },
    error::ClientError,
    transport::{Dialer, Transport},
};

const EVENT_BUFFER: usize = 256;

/// Observable state of a handle's transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Disconnected,
    Connecting,
    Connected,
}

/// Settings used when a new connection has to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub url: String,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: RECONNECT_INTERVAL,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

/// Shared handle to the multiplexed connection
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    token: String,
    commands: mpsc::UnboundedSender<ClientCommand>,
    // Taken on close so that every subscriber sees the end of the stream
    events: StdMutex<Option<broadcast::Sender<ServerEvent>>>,
    state: Arc<watch::Sender<TransportState>>,
    task: StdMutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ConnectionHandle {
    fn spawn(dialer: Arc<dyn Dialer>, options: ConnectOptions, token: String) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let state = Arc::new(watch::Sender::new(TransportState::Connecting));

        let task = tokio::spawn(run_connection(
            dialer,
            options,
            token.clone(),
            command_rx,
            events.clone(),
            state.clone(),
        ));

        Self {
            inner: Arc::new(HandleInner {
                token,
                commands,
                events: StdMutex::new(Some(events)),
                state,
                task: StdMutex::new(Some(task)),
            }),
        }
    }

    pub fn token(&self) -> &str {
        &self.inner.token
    }

    pub fn state(&self) -> TransportState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<TransportState> {
        self.inner.state.subscribe()
    }

    /// Connecting or connected
    pub fn is_live(&self) -> bool {
        self.state() != TransportState::Disconnected
    }

    /// Whether both handles refer to the same underlying connection
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Queue a command; it is written once the transport is connected.
    pub fn send(&self, command: ClientCommand) -> Result<(), ClientError> {
        if !self.is_live() {
            return Err(ClientError::Closed);
        }
        self.inner.commands.send(command).map_err(|_| ClientError::Closed)
    }

    /// Subscribe to server events received from now on.
    ///
    /// A closed handle yields a receiver that is already at its end.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        let sender = self
            .inner
            .events
            .lock()
            .ok()
            .and_then(|events| events.clone());
        match sender {
            Some(events) => events.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    fn close(&self) {
        if let Ok(mut task) = self.inner.task.lock()
            && let Some(task) = task.take()
        {
            task.abort();
        }
        if let Ok(mut events) = self.inner.events.lock() {
            events.take();
        }
        self.inner.state.send_replace(TransportState::Disconnected);
    }
}

enum SessionEnd {
    /// Every handle was dropped
    Released,
    Lost(ClientError),
}

async fn run_connection(
    dialer: Arc<dyn Dialer>,
    options: ConnectOptions,
    token: String,
    mut commands: mpsc::UnboundedReceiver<ClientCommand>,
    events: broadcast::Sender<ServerEvent>,
    state: Arc<watch::Sender<TransportState>>,
) {
    let mut reconnect_count = 0;

    loop {
        state.send_replace(TransportState::Connecting);
        tracing::info!(
            "Connecting to {} (attempt {}/{})",
            options.url,
            reconnect_count + 1,
            options.max_reconnect_attempts + 1
        );

        let error = match tokio::time::timeout(
            options.connect_timeout,
            dialer.dial(&options.url, &token),
        )
        .await
        {
            Ok(Ok(transport)) => {
                state.send_replace(TransportState::Connected);
                reconnect_count = 0;
                match pump(transport, &mut commands, &events).await {
                    SessionEnd::Released => {
                        tracing::info!("All handles dropped, closing connection");
                        break;
                    }
                    SessionEnd::Lost(e) => e,
                }
            }
            Ok(Err(e)) => e,
            Err(_) => ClientError::Timeout(options.connect_timeout),
        };

        tracing::warn!("Connection lost: {}", error);
        if !should_attempt_reconnect(&error, reconnect_count, options.max_reconnect_attempts) {
            tracing::error!(
                "Giving up on {} after {} reconnection attempts",
                options.url,
                reconnect_count
            );
            break;
        }

        reconnect_count += 1;
        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            options.reconnect_delay,
            reconnect_count + 1,
            options.max_reconnect_attempts + 1
        );
        tokio::time::sleep(options.reconnect_delay).await;
    }

    state.send_replace(TransportState::Disconnected);
}

/// Shuttle commands and events until the transport fails or every handle is gone.
async fn pump(
    transport: Transport,
    commands: &mut mpsc::UnboundedReceiver<ClientCommand>,
    events: &broadcast::Sender<ServerEvent>,
) -> SessionEnd {
    let Transport {
        mut sink,
        mut stream,
    } = transport;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => {
                    tracing::debug!("Sending {:?}", command);
                    if let Err(e) = sink.send(command).await {
                        tracing::warn!("Failed to send command: {}", e);
                        return SessionEnd::Lost(e);
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return SessionEnd::Released;
                }
            },
            event = stream.next() => match event {
                Some(Ok(event)) => {
                    // No subscribers is fine; the event is simply dropped.
                    let _ = events.send(event);
                }
                Some(Err(e)) => return SessionEnd::Lost(e),
                None => return SessionEnd::Lost(ClientError::Closed),
            },
        }
    }
}

struct ManagerState {
    handle: Option<ConnectionHandle>,
    reference_count: usize,
    // Bumped by every registration; a pending teardown only fires if unchanged
    epoch: u64,
    pending_teardown: Option<JoinHandle<()>>,
}

impl ManagerState {
    fn cancel_pending_teardown(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.pending_teardown.take() {
            timer.abort();
        }
    }

    fn close_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }
}

struct ManagerInner {
    dialer: Arc<dyn Dialer>,
    grace_period: Duration,
    state: Mutex<ManagerState>,
}

/// Process-wide owner of the room server connection.
///
/// Construct one in the composition root and clone it into consumers.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

impl ConnectionManager {
    pub fn new(dialer: Arc<dyn Dialer>) -> Self {
        Self::with_grace_period(dialer, DEFAULT_GRACE_PERIOD)
    }

    pub fn with_grace_period(dialer: Arc<dyn Dialer>, grace_period: Duration) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                dialer,
                grace_period,
                state: Mutex::new(ManagerState {
                    handle: None,
                    reference_count: 0,
                    epoch: 0,
                    pending_teardown: None,
                }),
            }),
        }
    }

    /// Return the live connection, creating one if needed.
    ///
    /// A live handle is shared as is, whatever token it was opened with.
    /// Returns `None` for an empty token.
    pub async fn acquire(&self, token: &str, options: ConnectOptions) -> Option<ConnectionHandle> {
        if token.is_empty() {
            tracing::debug!("No token, no connection available");
            return None;
        }

        let mut state = self.inner.state.lock().await;
        state.cancel_pending_teardown();

        if let Some(handle) = &state.handle
            && handle.is_live()
        {
            return Some(handle.clone());
        }

        // Stale handle: release its subscribers before building a new one
        state.close_handle();

        tracing::info!("Opening connection to {}", options.url);
        let handle = ConnectionHandle::spawn(self.inner.dialer.clone(), options, token.to_string());
        state.handle = Some(handle.clone());
        Some(handle)
    }

    pub async fn register_user(&self, component_id: &str) {
        let mut state = self.inner.state.lock().await;
        state.reference_count += 1;
        state.cancel_pending_teardown();
        tracing::debug!(
            "Registered '{}' ({} users)",
            component_id,
            state.reference_count
        );
    }

    /// Drop one reference; the last one schedules a teardown after the grace period.
    pub async fn unregister_user(&self, component_id: &str) {
        let mut state = self.inner.state.lock().await;
        state.reference_count = state.reference_count.saturating_sub(1);
        tracing::debug!(
            "Unregistered '{}' ({} users)",
            component_id,
            state.reference_count
        );

        if state.reference_count > 0 || state.handle.is_none() {
            return;
        }

        state.cancel_pending_teardown();
        let epoch = state.epoch;
        let inner = self.inner.clone();
        state.pending_teardown = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.grace_period).await;
            let mut state = inner.state.lock().await;
            if state.epoch == epoch && state.reference_count == 0 {
                tracing::info!("No users left after {:?}, closing connection", inner.grace_period);
                state.pending_teardown = None;
                state.close_handle();
            }
        }));
    }

    /// Close the connection now. No-op without a connection.
    pub async fn teardown(&self) {
        let mut state = self.inner.state.lock().await;
        state.cancel_pending_teardown();
        state.close_handle();
    }

    pub async fn reference_count(&self) -> usize {
        self.inner.state.lock().await.reference_count
    }

    pub async fn current_handle(&self) -> Option<ConnectionHandle> {
        self.inner.state.lock().await.handle.clone()
    }
}

#[cfg(test)]
pub(crate) mod test_transport {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures_util::{sink, stream};
    use tokio::sync::mpsc;

    use super::*;

    /// Remote end of a fake transport
    pub struct Remote {
        pub commands: mpsc::UnboundedReceiver<ClientCommand>,
        pub events: mpsc::UnboundedSender<Result<ServerEvent, ClientError>>,
    }

    /// Dialer backed by in-memory channels; optionally refuses every dial
    pub struct FakeDialer {
        pub dials: AtomicUsize,
        pub remotes: mpsc::UnboundedSender<Remote>,
        pub failure: Option<ClientError>,
    }

    impl FakeDialer {
        pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Remote>) {
            let (remotes, remote_rx) = mpsc::unbounded_channel();
            let dialer = Arc::new(Self {
                dials: AtomicUsize::new(0),
                remotes,
                failure: None,
            });
            (dialer, remote_rx)
        }

        pub fn failing(error: ClientError) -> Arc<Self> {
            let (remotes, _) = mpsc::unbounded_channel();
            Arc::new(Self {
                dials: AtomicUsize::new(0),
                remotes,
                failure: Some(error),
            })
        }

        pub fn dial_count(&self) -> usize {
            self.dials.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Dialer for FakeDialer {
        async fn dial(&self, _url: &str, _token: &str) -> Result<Transport, ClientError> {
            self.dials.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }

            let (command_tx, command_rx) = mpsc::unbounded_channel();
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            let _ = self.remotes.send(Remote {
                commands: command_rx,
                events: event_tx,
            });

            let sink = sink::unfold(command_tx, |tx, command: ClientCommand| async move {
                tx.send(command).map_err(|_| ClientError::Closed)?;
                Ok::<_, ClientError>(tx)
            });
            let stream = stream::unfold(event_rx, |mut rx| async move {
                rx.recv().await.map(|event| (event, rx))
            });

            Ok(Transport {
                sink: Box::pin(sink),
                stream: Box::pin(stream),
            })
        }
    }
}
