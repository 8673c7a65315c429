//! Client configuration

use std::time::Duration;

use shared::models::LatLon;

/// Default live endpoint
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";
/// Default dataset endpoint
pub const DEFAULT_HTTP_URL: &str = "http://localhost:8000";
/// Initial map view, also where trucks first seen in `TRUCKS_UPDATE` are placed
pub const DEFAULT_MAP_CENTER: LatLon = LatLon::new(41.703679, 0.636083);

/// Event channel configuration
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Reconnect after the connection closes or fails
    pub auto_reconnect: bool,
    /// First reconnect delay
    pub reconnect_delay: Duration,
    /// Upper bound of the exponential backoff
    pub max_reconnect_delay: Duration,
    /// Reconnect attempts before giving up (0 = unlimited)
    pub max_reconnect_attempts: u32,
    /// Decoded events buffered between the connection task and the consumer
    pub event_buffer: usize,
}

impl Default for ChannelConfig {
    /// A closed or failed connection stays down until reopened
    fn default() -> Self {
        Self {
            auto_reconnect: false,
            ..Self::lan()
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconnecting preset for a server on the local network
    ///
    /// - first retry after 500 ms, backoff capped at 10 s
    /// - gives up after 20 attempts
    pub fn lan() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay: Duration::from_millis(500),
            max_reconnect_delay: Duration::from_secs(10),
            max_reconnect_attempts: 20,
            event_buffer: 1024,
        }
    }

    /// Reconnecting preset for a remote server
    ///
    /// - first retry after 1 s, backoff capped at 60 s
    /// - retries forever
    pub fn wan() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(60),
            max_reconnect_attempts: 0,
            event_buffer: 1024,
        }
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn with_reconnect_delay(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_delay = initial;
        self.max_reconnect_delay = max.max(initial);
        self
    }

    /// 0 means unlimited
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }
}

/// Client configuration for connecting to the simulation server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Live event endpoint (e.g. "ws://localhost:8000/ws")
    pub ws_url: String,

    /// Static dataset base URL (e.g. "http://localhost:8000")
    pub http_url: String,

    /// HTTP request timeout
    pub http_timeout: Duration,

    /// Map center, fallback position for trucks without one
    pub map_center: LatLon,

    /// Slaughterhouse targeted by updates that carry no id
    pub fallback_slaughterhouse_id: Option<String>,

    /// Event channel behaviour
    pub channel: ChannelConfig,
}

impl ClientConfig {
    pub fn new(ws_url: impl Into<String>, http_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            http_url: http_url.into(),
            http_timeout: Duration::from_secs(30),
            map_center: DEFAULT_MAP_CENTER,
            fallback_slaughterhouse_id: None,
            channel: ChannelConfig::default(),
        }
    }

    /// Read `PORC_WS_URL`, `PORC_HTTP_URL` and `FALLBACK_SLAUGHTERHOUSE_ID`
    pub fn from_env() -> Self {
        let ws_url = std::env::var("PORC_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.into());
        let http_url = std::env::var("PORC_HTTP_URL").unwrap_or_else(|_| DEFAULT_HTTP_URL.into());
        let fallback = std::env::var("FALLBACK_SLAUGHTERHOUSE_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());

        let mut config = Self::new(ws_url, http_url);
        config.fallback_slaughterhouse_id = fallback;
        config
    }

    pub fn with_map_center(mut self, center: LatLon) -> Self {
        self.map_center = center;
        self
    }

    pub fn with_fallback_slaughterhouse(mut self, id: impl Into<String>) -> Self {
        self.fallback_slaughterhouse_id = Some(id.into());
        self
    }

    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WS_URL, DEFAULT_HTTP_URL)
    }
}
