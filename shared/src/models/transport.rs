//! Transport Model

use serde::{Deserialize, Serialize};

use crate::serde_helpers::flexible_id;

/// Truck type as listed in the transport fleet file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Normal,
    Refrigerated,
    #[serde(other)]
    Other,
}

/// Transport record from the static dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub transport_id: String,
    #[serde(rename = "type")]
    pub kind: TransportKind,
    pub capacity_tons: f64,
    pub cost_per_km: f64,
    pub weekly_fixed_cost: f64,
}

impl TransportRecord {
    pub fn capacity_kg(&self) -> f64 {
        self.capacity_tons * 1000.0
    }
}
