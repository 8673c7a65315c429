//! Daily route planning
//!
//! Farms are served heaviest-first. Each truck takes up to `max_stops`
//! farms until its load limit is reached, and trucks are added until the
//! slaughterhouse's daily capacity is met or no farm is left to visit.

use rand::Rng;
use shared::StaticDataset;
use shared::live::{DaySummary, SlaughterhouseMetrics, TripMetrics, TruckMetrics};
use shared::models::{LatLon, TransportRecord};

use super::economics::{self, PenaltyBands, Revenue, WORKING_DAYS_PER_WEEK};
use super::farm::FarmState;
use super::round2;
use crate::config::SimulationConfig;

/// Used when the dataset has no slaughterhouse
pub const DEFAULT_SLAUGHTERHOUSE_ID: &str = "default";
pub const DEFAULT_SLAUGHTERHOUSE_LOCATION: LatLon = LatLon::new(41.98, 2.80);
pub const DEFAULT_DAILY_CAPACITY: u32 = 1800;

/// Share of live weight left as carcass
pub const CARCASS_YIELD: f64 = 0.75;

/// The slaughterhouse every route starts and ends at
#[derive(Debug, Clone)]
pub struct Depot {
    pub slaughterhouse_id: String,
    pub location: LatLon,
    pub daily_capacity: u32,
    pub bands: PenaltyBands,
}

impl Depot {
    pub fn from_dataset(dataset: &StaticDataset) -> Self {
        match dataset.primary_slaughterhouse() {
            Some(record) => Self {
                slaughterhouse_id: record.slaughterhouse_id.clone(),
                location: record.location(),
                daily_capacity: match record.daily_capacity_max {
                    0 => DEFAULT_DAILY_CAPACITY,
                    max => max,
                },
                bands: PenaltyBands::from_record(record),
            },
            None => Self::default(),
        }
    }
}

impl Default for Depot {
    fn default() -> Self {
        Self {
            slaughterhouse_id: DEFAULT_SLAUGHTERHOUSE_ID.to_string(),
            location: DEFAULT_SLAUGHTERHOUSE_LOCATION,
            daily_capacity: DEFAULT_DAILY_CAPACITY,
            bands: PenaltyBands::default(),
        }
    }
}

/// One pickup of a planned route
#[derive(Debug, Clone)]
pub struct Stop {
    pub farm_id: String,
    pub farm_name: String,
    pub location: LatLon,
    pub pigs: u32,
    pub inventory_after: u32,
    pub avg_weight: f64,
}

#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub stops: Vec<Stop>,
    pub weights: Vec<f64>,
    pub load_kg: f64,
    pub distance_km: f64,
    pub transport: TransportRecord,
    pub variable_cost: f64,
    pub revenue: Revenue,
}

impl PlannedRoute {
    pub fn pigs(&self) -> u32 {
        self.weights.len() as u32
    }

    /// Display id of the `n`-th truck of the day (1-based)
    pub fn truck_id(&self, n: usize) -> String {
        format!("T{n}-{}", self.transport.transport_id)
    }

    pub fn trip_metrics(&self) -> TripMetrics {
        TripMetrics {
            revenue: round2(self.revenue.net()),
            cost: round2(self.variable_cost),
        }
    }

    pub fn truck_metrics(&self, n: usize) -> TruckMetrics {
        let pigs = self.pigs();
        TruckMetrics {
            truck_id: self.truck_id(n),
            load_kg: round2(self.load_kg),
            num_pigs: pigs,
            avg_live_weight: if pigs > 0 {
                round2(self.load_kg / f64::from(pigs))
            } else {
                0.0
            },
            farms_visited: self.stops.len() as u32,
        }
    }
}

/// Everything decided for one day before the trucks move
#[derive(Debug, Clone, Default)]
pub struct DayPlan {
    pub day: u32,
    pub routes: Vec<PlannedRoute>,
    pub pigs_processed: u32,
    pub net_revenue: f64,
    pub variable_cost: f64,
    pub fixed_cost: f64,
}

impl DayPlan {
    pub fn live_weight_total(&self) -> f64 {
        self.routes.iter().map(|r| r.load_kg).sum()
    }

    pub fn net_profit(&self) -> f64 {
        self.net_revenue - self.variable_cost - self.fixed_cost
    }

    pub fn summary(&self) -> DaySummary {
        DaySummary {
            day: self.day,
            pigs_processed: self.pigs_processed,
            trucks_used: self.routes.len() as u32,
            net_revenue: round2(self.net_revenue),
            variable_transport_cost: round2(self.variable_cost),
            fixed_cost: round2(self.fixed_cost),
            net_profit: round2(self.net_profit()),
        }
    }

    pub fn slaughterhouse_metrics(&self, daily_capacity: u32) -> SlaughterhouseMetrics {
        let delivered: u32 = self.routes.iter().map(PlannedRoute::pigs).sum();
        let live = self.live_weight_total();
        let carcass = live * CARCASS_YIELD;
        let per_pig = |total: f64| {
            if delivered > 0 {
                total / f64::from(delivered)
            } else {
                0.0
            }
        };
        let utilization = if daily_capacity > 0 {
            f64::from(delivered) / f64::from(daily_capacity)
        } else {
            0.0
        };

        SlaughterhouseMetrics {
            pigs_delivered: delivered,
            live_weight_total: round2(live),
            carcass_weight_total: round2(carcass),
            avg_live_weight: round2(per_pig(live)),
            avg_carcass_weight: round2(per_pig(carcass)),
            capacity_utilization: round2(utilization),
        }
    }

    pub fn truck_metrics(&self) -> Vec<TruckMetrics> {
        self.routes
            .iter()
            .enumerate()
            .map(|(i, route)| route.truck_metrics(i + 1))
            .collect()
    }
}

/// Plan one day and commit the pickups to the farms
pub fn plan_day<R: Rng + ?Sized>(
    day: u32,
    farms: &mut [FarmState],
    depot: &Depot,
    fleet: &[TransportRecord],
    config: &SimulationConfig,
    rng: &mut R,
) -> DayPlan {
    let today = i64::from(day);
    let mut available: Vec<usize> = (0..farms.len())
        .filter(|&i| farms[i].can_visit(today, config.revisit_days))
        .collect();
    // heaviest first; stable, so ties keep dataset order
    available.sort_by(|&a, &b| farms[b].mean_weight_kg.total_cmp(&farms[a].mean_weight_kg));
    let mut queue = available.into_iter();

    let mut plan = DayPlan {
        day,
        ..DayPlan::default()
    };

    while plan.pigs_processed < depot.daily_capacity {
        let mut stops = Vec::new();
        let mut weights = Vec::new();
        let mut load_kg = 0.0;

        while stops.len() < config.max_stops && load_kg < config.truck_capacity_kg {
            let Some(index) = queue.next() else {
                break;
            };
            let farm = &mut farms[index];
            // a farm without room for a single pig loses its turn today
            let Some(batch) = farm.batch_ready(config.truck_capacity_kg - load_kg, rng) else {
                continue;
            };
            farm.commit_sale(batch.len(), today);

            stops.push(Stop {
                farm_id: farm.farm_id.clone(),
                farm_name: farm.name.clone(),
                location: farm.location,
                pigs: batch.len(),
                inventory_after: farm.inventory,
                avg_weight: round2(batch.avg_weight()),
            });
            load_kg += batch.total_kg;
            weights.extend(batch.weights);
        }

        if stops.is_empty() {
            break;
        }

        let locations: Vec<LatLon> = stops.iter().map(|s| s.location).collect();
        let distance_km = economics::route_distance_km(depot.location, &locations);
        let transport = economics::select_transport(fleet, load_kg);
        let variable_cost = distance_km * transport.cost_per_km;
        let revenue = economics::revenue(&weights, config.price_per_kg, &depot.bands);

        plan.pigs_processed += weights.len() as u32;
        plan.net_revenue += revenue.net();
        plan.variable_cost += variable_cost;
        plan.fixed_cost += transport.weekly_fixed_cost / WORKING_DAYS_PER_WEEK;

        plan.routes.push(PlannedRoute {
            stops,
            weights,
            load_kg,
            distance_km,
            transport,
            variable_cost,
            revenue,
        });
    }

    plan
}
