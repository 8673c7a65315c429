//! Data models
//!
//! Records of the static dataset, shared by the simulation server and the
//! live-map client.

pub mod farm;
pub mod geo;
pub mod slaughterhouse;
pub mod transport;

// Re-exports
pub use farm::*;
pub use geo::*;
pub use slaughterhouse::*;
pub use transport::*;
