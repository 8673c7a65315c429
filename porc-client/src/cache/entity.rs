use shared::live::{SlaughterhouseMetrics, TripMetrics, TruckStatus};
use shared::models::{FarmRecord, LatLon, SlaughterhouseRecord, UtilizationTier};
use shared::readiness;

use super::EntityKind;
use crate::view::{Marker, MarkerIcon};

/// Entity that can live in a cache partition and be drawn as a marker
pub trait MapEntity: Send + std::fmt::Debug {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn marker(&self) -> Marker;
}

/// Truck seen on the live stream
#[derive(Debug, Clone, PartialEq)]
pub struct TruckEntity {
    pub truck_id: String,
    pub position: LatLon,
    pub pigs_on_board: u32,
    pub status: Option<TruckStatus>,
    pub load_kg: f64,
    pub avg_live_weight: f64,
    pub farms_visited: u32,
    /// Pigs of the last completed route
    pub route_pigs: u32,
    pub pigs_delivered: u32,
    pub last_trip: Option<TripMetrics>,
}

impl TruckEntity {
    pub fn new(truck_id: impl Into<String>, position: LatLon) -> Self {
        Self {
            truck_id: truck_id.into(),
            position,
            pigs_on_board: 0,
            status: None,
            load_kg: 0.0,
            avg_live_weight: 0.0,
            farms_visited: 0,
            route_pigs: 0,
            pigs_delivered: 0,
            last_trip: None,
        }
    }
}

impl MapEntity for TruckEntity {
    const KIND: EntityKind = EntityKind::Truck;

    fn id(&self) -> &str {
        &self.truck_id
    }

    fn marker(&self) -> Marker {
        let status = self.status.map(|s| s.as_str()).unwrap_or("-");
        let mut popup = format!(
            "{} - {} <br> pigs on board: {}",
            self.truck_id, status, self.pigs_on_board
        );
        if self.farms_visited > 0 {
            popup.push_str(&format!(
                " <br> load: {:.0} kg, farms visited: {}",
                self.load_kg, self.farms_visited
            ));
        }
        if let Some(trip) = &self.last_trip {
            popup.push_str(&format!(
                " <br> revenue: {:.2} €, cost: {:.2} €",
                trip.revenue, trip.cost
            ));
        }
        Marker {
            position: self.position,
            icon: MarkerIcon::Truck,
            popup,
        }
    }
}

/// Farm from the static dataset, refreshed by live events
#[derive(Debug, Clone, PartialEq)]
pub struct FarmEntity {
    pub farm_id: String,
    pub name: String,
    pub location: LatLon,
    pub total_pigs: u32,
    pub mean_weight_kg: f64,
    pub std_weight_kg: f64,
    pub pigs_loaded_today: u32,
}

impl FarmEntity {
    pub fn ready_count(&self) -> u32 {
        readiness::ready_count(self.total_pigs, self.mean_weight_kg, self.std_weight_kg)
    }
}

impl From<&FarmRecord> for FarmEntity {
    fn from(record: &FarmRecord) -> Self {
        Self {
            farm_id: record.farm_id.clone(),
            name: record.name.clone(),
            location: record.location(),
            total_pigs: record.total_pigs,
            mean_weight_kg: record.mean_weight_kg,
            std_weight_kg: record.std_weight(),
            pigs_loaded_today: 0,
        }
    }
}

impl MapEntity for FarmEntity {
    const KIND: EntityKind = EntityKind::Farm;

    fn id(&self) -> &str {
        &self.farm_id
    }

    fn marker(&self) -> Marker {
        Marker {
            position: self.location,
            icon: MarkerIcon::Farm,
            popup: format!(
                "{} - {} pigs. <br> pigs ready to be sent: {}",
                self.name,
                self.total_pigs,
                self.ready_count()
            ),
        }
    }
}

/// Slaughterhouse from the static dataset, refreshed by daily metrics
#[derive(Debug, Clone, PartialEq)]
pub struct SlaughterhouseEntity {
    pub slaughterhouse_id: String,
    pub name: String,
    pub location: LatLon,
    pub target_daily: u32,
    pub utilization: f64,
    pub tier: UtilizationTier,
    pub metrics: Option<SlaughterhouseMetrics>,
}

impl SlaughterhouseEntity {
    /// Take over server-computed metrics
    pub fn apply_metrics(&mut self, metrics: &SlaughterhouseMetrics) {
        self.utilization = metrics.capacity_utilization;
        self.tier = UtilizationTier::from_utilization(metrics.capacity_utilization);
        self.metrics = Some(metrics.clone());
    }
}

impl From<&SlaughterhouseRecord> for SlaughterhouseEntity {
    fn from(record: &SlaughterhouseRecord) -> Self {
        let utilization = record.utilization();
        Self {
            slaughterhouse_id: record.slaughterhouse_id.clone(),
            name: record.name.clone(),
            location: record.location(),
            target_daily: record.target_daily,
            utilization,
            tier: UtilizationTier::from_utilization(utilization),
            metrics: None,
        }
    }
}

impl MapEntity for SlaughterhouseEntity {
    const KIND: EntityKind = EntityKind::Slaughterhouse;

    fn id(&self) -> &str {
        &self.slaughterhouse_id
    }

    fn marker(&self) -> Marker {
        let mut popup = format!(
            "{} - {} pigs <br> current_capacity: {:.0}%",
            self.name,
            self.target_daily,
            self.utilization * 100.0
        );
        if let Some(m) = &self.metrics {
            popup.push_str(&format!(
                " <br> pigs delivered: {} <br> live weight: {:.2} kg (avg {:.2}) \
                 <br> carcass weight: {:.2} kg (avg {:.2})",
                m.pigs_delivered,
                m.live_weight_total,
                m.avg_live_weight,
                m.carcass_weight_total,
                m.avg_carcass_weight
            ));
        }
        Marker {
            position: self.location,
            icon: MarkerIcon::Slaughterhouse(self.tier),
            popup,
        }
    }
}
