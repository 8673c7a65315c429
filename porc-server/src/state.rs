//! Application state shared by all handlers

use std::sync::Arc;

use shared::StaticDataset;

use crate::config::Config;
use crate::simulation::SimulationHub;

#[derive(Clone)]
pub struct AppState {
    /// Static records served by the dataset endpoints
    pub dataset: Arc<StaticDataset>,
    /// Live event fan-out to WebSocket clients
    pub hub: SimulationHub,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, dataset: StaticDataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
            hub: SimulationHub::new(),
            config: Arc::new(config),
        }
    }
}
