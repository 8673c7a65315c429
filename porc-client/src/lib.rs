//! porc-client - live logistics map client
//!
//! Connects to the simulation server, keeps an entity cache of trucks,
//! farms and slaughterhouses in sync with the pushed events, and hands
//! markers to whatever surface renders the map.

pub mod cache;
pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod session;
pub mod view;

pub use cache::{EntityCache, EntityKind, Partition};
pub use channel::{ChannelState, EventChannel};
pub use config::{ChannelConfig, ClientConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher, RenderEffect};
pub use error::{ClientError, ClientResult};
pub use http::DatasetClient;
pub use session::LiveMapSession;
pub use view::{Marker, ViewHandle, ViewSurface};

// Re-export shared types for convenience
pub use shared::live::LiveEvent;
