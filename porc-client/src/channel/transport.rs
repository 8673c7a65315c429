use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{ClientError, ClientResult};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One open connection delivering text frames
#[async_trait]
pub trait Transport: Send + std::fmt::Debug {
    /// Next text frame, `None` once the peer has closed
    async fn next_frame(&mut self) -> ClientResult<Option<String>>;
    async fn close(&mut self) -> ClientResult<()>;
}

/// Opens transports, once per (re)connect attempt
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    async fn connect(&self) -> ClientResult<Box<dyn Transport>>;
}

/// WebSocket transport
#[derive(Debug)]
pub struct WsTransport {
    stream: WsStream,
}

impl WsTransport {
    pub async fn connect(url: &str) -> ClientResult<Self> {
        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ClientError::Connection(format!("{url}: {e}")))?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn next_frame(&mut self) -> ClientResult<Option<String>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => tracing::warn!(len = data.len(), "Ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "WebSocket closed by server");
                    return Ok(None);
                }
                // tungstenite queues the Pong reply itself
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) -> ClientResult<()> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            // Already closed by the peer
            Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Connects a [`WsTransport`] to a fixed URL
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> ClientResult<Box<dyn Transport>> {
        let transport = WsTransport::connect(&self.url).await?;
        tracing::info!(url = %self.url, "WebSocket connected");
        Ok(Box::new(transport))
    }
}

/// In-process transport fed through an mpsc channel
#[derive(Debug)]
pub struct MemoryTransport {
    rx: mpsc::Receiver<String>,
}

impl MemoryTransport {
    /// Create a transport and the sender that feeds it; dropping the sender closes it
    pub fn pair(buffer: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn next_frame(&mut self) -> ClientResult<Option<String>> {
        Ok(self.rx.recv().await)
    }

    async fn close(&mut self) -> ClientResult<()> {
        self.rx.close();
        Ok(())
    }
}

/// Hands out prepared memory transports in order, then refuses
#[derive(Debug, Default)]
pub struct MemoryConnector {
    pending: Mutex<VecDeque<MemoryTransport>>,
}

impl MemoryConnector {
    pub fn new(transports: impl IntoIterator<Item = MemoryTransport>) -> Self {
        Self {
            pending: Mutex::new(transports.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> ClientResult<Box<dyn Transport>> {
        let next = self
            .pending
            .lock()
            .map_err(|_| ClientError::Connection("memory connector poisoned".into()))?
            .pop_front();
        match next {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(ClientError::Connection("no memory transport available".into())),
        }
    }
}
