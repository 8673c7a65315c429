//! Live event payloads

use serde::{Deserialize, Serialize};

use crate::models::LatLon;
use crate::serde_helpers::{flexible_id, flexible_id_opt};

/// Truck movement phase reported with each position update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckStatus {
    MovingToFarm,
    Loaded,
    Returning,
    Arrived,
    #[serde(other)]
    Unknown,
}

impl TruckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MovingToFarm => "MOVING_TO_FARM",
            Self::Loaded => "LOADED",
            Self::Returning => "RETURNING",
            Self::Arrived => "ARRIVED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// `TRUCK_UPDATE`: one animation step of a truck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckUpdate {
    #[serde(deserialize_with = "flexible_id")]
    pub truck_id: String,
    pub position: LatLon,
    #[serde(default)]
    pub pigs_on_board: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TruckStatus>,
}

/// One entry of `TRUCKS_UPDATE`: end-of-day route metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckMetrics {
    #[serde(deserialize_with = "flexible_id")]
    pub truck_id: String,
    #[serde(default)]
    pub load_kg: f64,
    #[serde(default)]
    pub num_pigs: u32,
    #[serde(default)]
    pub avg_live_weight: f64,
    #[serde(default)]
    pub farms_visited: u32,
}

/// Daily throughput figures computed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaughterhouseMetrics {
    pub pigs_delivered: u32,
    pub live_weight_total: f64,
    pub carcass_weight_total: f64,
    pub avg_live_weight: f64,
    pub avg_carcass_weight: f64,
    pub capacity_utilization: f64,
}

/// `SLAUGHTERHOUSE_UPDATE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaughterhouseUpdate {
    #[serde(
        default,
        deserialize_with = "flexible_id_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub slaughterhouse_id: Option<String>,
    #[serde(default)]
    pub metrics: SlaughterhouseMetrics,
}

/// `FARM_UPDATE`: inventory after a pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmUpdate {
    #[serde(deserialize_with = "flexible_id")]
    pub farm_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub new_inventory: u32,
    #[serde(default)]
    pub num_pigs_loaded: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_weight: Option<f64>,
}

impl FarmUpdate {
    /// Inventory shown on the marker: stock left plus the pigs just loaded
    pub fn displayed_total(&self) -> u32 {
        self.new_inventory.saturating_add(self.num_pigs_loaded)
    }
}

/// Farm state broadcast at the start of each day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub inventory: u32,
    #[serde(default)]
    pub avg_weight: f64,
}

/// `INIT_FARMS`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitFarms {
    #[serde(default)]
    pub farms: Vec<FarmSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slaughterhouse: Option<LatLon>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripMetrics {
    pub revenue: f64,
    pub cost: f64,
}

/// `TRUCK_ARRIVED`: truck is back at the slaughterhouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckArrived {
    #[serde(deserialize_with = "flexible_id")]
    pub truck_id: String,
    #[serde(default)]
    pub pigs_delivered: u32,
    #[serde(default)]
    pub metrics_trip: TripMetrics,
}

/// One simulated day, aggregated
///
/// The aliases accept the Catalan keys of the legacy daily log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySummary {
    #[serde(alias = "Dia")]
    pub day: u32,
    #[serde(alias = "Porcs Processats")]
    pub pigs_processed: u32,
    #[serde(alias = "Camions Usats")]
    pub trucks_used: u32,
    #[serde(alias = "Ingressos Nets")]
    pub net_revenue: f64,
    #[serde(alias = "Costos Var. Transp")]
    pub variable_transport_cost: f64,
    #[serde(alias = "Costos Fixos")]
    pub fixed_cost: f64,
    #[serde(alias = "Benefici Net Diari")]
    pub net_profit: f64,
}

/// `DAILY_SUMMARY`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub summary: DaySummary,
    #[serde(default)]
    pub cumulative_profit: f64,
}
