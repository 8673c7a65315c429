//! porc-server: pig-logistics simulation streamed over WebSocket
//!
//! Loads the static dataset (farms, slaughterhouses, transports), runs a
//! day-by-day collection simulation and pushes every truck movement and
//! daily figure to connected map clients.

pub mod api;
pub mod config;
pub mod simulation;
pub mod state;
pub mod utils;

pub use config::{Config, SimulationConfig};
pub use simulation::{SimulationHub, SimulationRunner};
pub use state::AppState;
