//! Event channel
//!
//! One long-lived connection to the live endpoint. A background task reads
//! frames, decodes them and pushes [`LiveEvent`]s into a bounded FIFO queue
//! that the session pops from.
//!
//! ```text
//! Connector ──connect──► Transport ──frames──► decode ──► mpsc ──► next_event()
//!                                                │
//!                                                └─ malformed: warn + drop
//! ```

pub mod transport;

pub use transport::{Connector, MemoryConnector, MemoryTransport, Transport, WsConnector, WsTransport};

use std::fmt;
use std::sync::Arc;

use shared::live::LiveEvent;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ChannelConfig;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    /// Stopped on request or closed by the peer
    Closed,
    /// Connection failed
    Error,
}

impl ChannelState {
    /// No more events will arrive in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Error)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Open => write!(f, "open"),
            ChannelState::Closed => write!(f, "closed"),
            ChannelState::Error => write!(f, "error"),
        }
    }
}

/// How one connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    ConsumerGone,
    ClosedByPeer,
    Failed,
}

/// Handle to the live event stream
#[derive(Debug)]
pub struct EventChannel {
    events: mpsc::Receiver<LiveEvent>,
    state: watch::Receiver<ChannelState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EventChannel {
    /// Open a WebSocket channel to `url`
    pub fn open(url: &str, config: ChannelConfig) -> Self {
        Self::with_connector(Arc::new(WsConnector::new(url)), config)
    }

    /// Open a channel over any connector
    pub fn with_connector(connector: Arc<dyn Connector>, config: ChannelConfig) -> Self {
        let (events_tx, events) = mpsc::channel(config.event_buffer.max(1));
        let (state_tx, state) = watch::channel(ChannelState::Connecting);
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(run_connection(
            connector,
            config,
            events_tx,
            state_tx,
            shutdown.clone(),
        ));

        Self {
            events,
            state,
            shutdown,
            task: Some(task),
        }
    }

    /// Next decoded event in transmission order, `None` once the channel is done
    pub async fn next_event(&mut self) -> Option<LiveEvent> {
        self.events.recv().await
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Stop the connection task; no event is delivered after this returns
    pub async fn close(&mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("Event channel task ended abnormally: {e}");
        }
        self.events.close();
        while self.events.try_recv().is_ok() {}
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.state().is_terminal()
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_connection(
    connector: Arc<dyn Connector>,
    config: ChannelConfig,
    events_tx: mpsc::Sender<LiveEvent>,
    state_tx: watch::Sender<ChannelState>,
    shutdown: CancellationToken,
) {
    let mut reconnect_delay = config.reconnect_delay;
    let mut attempts: u32 = 0;

    loop {
        state_tx.send_replace(ChannelState::Connecting);

        let connected = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = connector.connect() => result,
        };

        let end = match connected {
            Ok(mut transport) => {
                attempts = 0;
                reconnect_delay = config.reconnect_delay;
                state_tx.send_replace(ChannelState::Open);
                tracing::info!(state = %ChannelState::Open, "Event channel open");

                let end = pump(transport.as_mut(), &events_tx, &shutdown).await;
                if let Err(e) = transport.close().await {
                    tracing::debug!("Transport close failed: {e}");
                }
                end
            }
            Err(e) => {
                tracing::warn!(error = %e, "Event channel connection failed");
                SessionEnd::Failed
            }
        };

        let terminal = match end {
            SessionEnd::Cancelled | SessionEnd::ConsumerGone => break,
            SessionEnd::ClosedByPeer => ChannelState::Closed,
            SessionEnd::Failed => ChannelState::Error,
        };

        if !config.auto_reconnect {
            state_tx.send_replace(terminal);
            tracing::info!(state = %terminal, "Event channel stopped");
            return;
        }

        attempts += 1;
        if config.max_reconnect_attempts > 0 && attempts > config.max_reconnect_attempts {
            tracing::error!(attempts, "Event channel giving up after max reconnect attempts");
            state_tx.send_replace(ChannelState::Error);
            return;
        }

        tracing::info!(
            attempt = attempts,
            delay_ms = reconnect_delay.as_millis() as u64,
            "Reconnecting event channel"
        );
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
        reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay);
    }

    state_tx.send_replace(ChannelState::Closed);
    tracing::info!(state = %ChannelState::Closed, "Event channel closed");
}

/// Forward frames of one connection until it ends
async fn pump(
    transport: &mut dyn Transport,
    events_tx: &mpsc::Sender<LiveEvent>,
    shutdown: &CancellationToken,
) -> SessionEnd {
    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return SessionEnd::Cancelled,
            frame = transport.next_frame() => frame,
        };

        let text = match frame {
            Ok(Some(text)) => text,
            Ok(None) => return SessionEnd::ClosedByPeer,
            Err(e) => {
                tracing::warn!(error = %e, "Event channel read failed");
                return SessionEnd::Failed;
            }
        };

        let event = match LiveEvent::decode(&text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(code = %e.code(), "Dropping malformed event: {e}");
                continue;
            }
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return SessionEnd::Cancelled,
            sent = events_tx.send(event) => {
                if sent.is_err() {
                    return SessionEnd::ConsumerGone;
                }
            }
        }
    }
}
