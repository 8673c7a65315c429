//! Shared types for the porc live-map workspace
//!
//! Wire protocol, static dataset records, the readiness model and the
//! unified error type, used by both the simulation server and the client.

pub mod dataset;
pub mod error;
pub mod live;
pub mod models;
pub mod readiness;
pub mod serde_helpers;
pub mod util;

pub use dataset::{DatasetError, StaticDataset};
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use live::{EventDecodeError, LiveEvent};
