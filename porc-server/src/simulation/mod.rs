//! Logistics simulation
//!
//! Replays a fleet of trucks collecting pigs from farms day by day and
//! streams every step through the [`SimulationHub`].

pub mod economics;
pub mod farm;
pub mod hub;
pub mod planner;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::live::{
    DailySummary, FarmUpdate, InitFarms, SlaughterhouseUpdate, TruckArrived, TruckStatus,
    TruckUpdate,
};
use shared::models::LatLon;
use shared::{LiveEvent, StaticDataset};
use tokio_util::sync::CancellationToken;

pub use farm::FarmState;
pub use hub::SimulationHub;
pub use planner::{DayPlan, Depot, PlannedRoute, plan_day};

use crate::config::SimulationConfig;
use economics::wave_size;

/// Round to cents, as every figure on the wire is
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Drives the simulation while clients are connected
pub struct SimulationRunner {
    dataset: Arc<StaticDataset>,
    hub: SimulationHub,
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(dataset: Arc<StaticDataset>, hub: SimulationHub, config: SimulationConfig) -> Self {
        Self {
            dataset,
            hub,
            config,
        }
    }

    /// Serve runs until `shutdown` is cancelled
    ///
    /// A run starts when the first client connects. After a completed run
    /// the next one starts from day 1 when another client joins.
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            farms = self.dataset.farms.len(),
            transports = self.dataset.transports.len(),
            days = self.config.days,
            "Simulation runner started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.hub.wait_for_subscriber() => {}
            }

            if self.dataset.farms.is_empty() {
                tracing::error!("No farms loaded, nothing to simulate");
                self.hub.publish(LiveEvent::Error {
                    msg: "No farms loaded".to_string(),
                });
            } else if self.run_once(&shutdown).await == RunOutcome::Cancelled {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.hub.wait_for_new_subscriber() => {}
            }
        }

        tracing::info!("Simulation runner stopped");
    }

    /// One full run from day 1 with fresh farm state
    pub async fn run_once(&self, shutdown: &CancellationToken) -> RunOutcome {
        let mut farms: Vec<FarmState> = self.dataset.farms.iter().map(FarmState::from).collect();
        let depot = Depot::from_dataset(&self.dataset);
        let mut rng = StdRng::from_entropy();
        let mut cumulative_profit = 0.0;

        tracing::info!(
            slaughterhouse_id = %depot.slaughterhouse_id,
            daily_capacity = depot.daily_capacity,
            "Simulation run started"
        );

        for day in 1..=self.config.days {
            if self.hub.subscriber_count() == 0 {
                tracing::info!(day, "No clients connected, simulation paused");
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return RunOutcome::Cancelled,
                    _ = self.hub.wait_for_subscriber() => {}
                }
            }

            for farm in &mut farms {
                farm.grow(self.config.daily_growth_kg);
            }
            self.hub.publish(LiveEvent::InitFarms(InitFarms {
                farms: farms.iter().map(FarmState::snapshot).collect(),
                slaughterhouse: Some(depot.location),
            }));

            let plan = plan_day(
                day,
                &mut farms,
                &depot,
                &self.dataset.transports,
                &self.config,
                &mut rng,
            );
            tracing::info!(day, routes = plan.routes.len(), pigs = plan.pigs_processed, "Day planned");

            if !self.animate_day(&plan, &depot, shutdown).await {
                return RunOutcome::Cancelled;
            }

            let summary = plan.summary();
            cumulative_profit = round2(cumulative_profit + summary.net_profit);
            tracing::info!(day, net_profit = summary.net_profit, cumulative_profit, "Day finished");

            self.hub
                .publish(LiveEvent::SlaughterhouseUpdate(SlaughterhouseUpdate {
                    slaughterhouse_id: Some(depot.slaughterhouse_id.clone()),
                    metrics: plan.slaughterhouse_metrics(depot.daily_capacity),
                }));
            self.hub.publish(LiveEvent::TrucksUpdate {
                trucks: plan.truck_metrics(),
            });
            self.hub.publish(LiveEvent::DailySummary(DailySummary {
                summary,
                cumulative_profit,
            }));

            if day < self.config.days {
                self.hub.publish(LiveEvent::EndOfSim {
                    msg: "Waiting for next day...".to_string(),
                });
                if !pause(self.config.day_pause, shutdown).await {
                    return RunOutcome::Cancelled;
                }
            }
        }

        self.hub.publish(LiveEvent::SimulationComplete {
            msg: "Simulation finished".to_string(),
        });
        tracing::info!(cumulative_profit, "Simulation run completed");
        RunOutcome::Completed
    }

    /// Animate the day's routes in waves of concurrent trucks
    async fn animate_day(&self, plan: &DayPlan, depot: &Depot, shutdown: &CancellationToken) -> bool {
        let size = wave_size(&self.dataset.transports);

        for (wave, routes) in plan.routes.chunks(size).enumerate() {
            tracing::debug!(day = plan.day, wave = wave + 1, trucks = routes.len(), "Launching wave");
            let first = wave * size + 1;
            let trucks = routes.iter().enumerate().map(|(i, route)| {
                self.animate_route(route, route.truck_id(first + i), depot.location, shutdown)
            });
            let finished = join_all(trucks).await;
            if finished.contains(&false) || !pause(self.config.wave_pause, shutdown).await {
                return false;
            }
        }
        true
    }

    async fn animate_route(
        &self,
        route: &PlannedRoute,
        truck_id: String,
        depot: LatLon,
        shutdown: &CancellationToken,
    ) -> bool {
        let mut here = depot;
        let mut on_board = 0;

        for stop in &route.stops {
            if !self
                .drive(&truck_id, here, stop.location, on_board, TruckStatus::MovingToFarm, shutdown)
                .await
            {
                return false;
            }

            on_board += stop.pigs;
            here = stop.location;
            self.publish_position(&truck_id, here, on_board, TruckStatus::Loaded);
            self.hub.publish(LiveEvent::FarmUpdate(FarmUpdate {
                farm_id: stop.farm_id.clone(),
                farm_name: Some(stop.farm_name.clone()),
                new_inventory: stop.inventory_after,
                num_pigs_loaded: stop.pigs,
                avg_weight: Some(stop.avg_weight),
            }));
            tracing::debug!(truck_id = %truck_id, farm_id = %stop.farm_id, pigs = stop.pigs, "Pigs loaded");

            if !pause(self.config.load_pause, shutdown).await {
                return false;
            }
        }

        if !self
            .drive(&truck_id, here, depot, on_board, TruckStatus::Returning, shutdown)
            .await
        {
            return false;
        }

        self.hub.publish(LiveEvent::TruckArrived(TruckArrived {
            truck_id,
            pigs_delivered: route.pigs(),
            metrics_trip: route.trip_metrics(),
        }));
        true
    }

    /// One leg, `steps_per_leg` positions from `from` to `to` inclusive
    async fn drive(
        &self,
        truck_id: &str,
        from: LatLon,
        to: LatLon,
        on_board: u32,
        status: TruckStatus,
        shutdown: &CancellationToken,
    ) -> bool {
        let steps = self.config.steps_per_leg.max(2);
        for i in 0..steps {
            let t = f64::from(i) / f64::from(steps - 1);
            self.publish_position(truck_id, from.lerp(&to, t), on_board, status);
            if !pause(self.config.step_delay, shutdown).await {
                return false;
            }
        }
        true
    }

    fn publish_position(&self, truck_id: &str, position: LatLon, on_board: u32, status: TruckStatus) {
        self.hub.publish(LiveEvent::TruckUpdate(TruckUpdate {
            truck_id: truck_id.to_string(),
            position,
            pigs_on_board: on_board,
            status: Some(status),
        }));
    }
}

/// Sleep unless cancelled; `false` once cancelled
async fn pause(duration: Duration, shutdown: &CancellationToken) -> bool {
    if duration.is_zero() {
        // let the socket forwarders keep up
        tokio::task::yield_now().await;
        return !shutdown.is_cancelled();
    }
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{FarmRecord, SlaughterhouseRecord};
    use tokio::sync::broadcast::error::TryRecvError;

    fn dataset() -> StaticDataset {
        let farms = vec![
            FarmRecord {
                farm_id: "F1".into(),
                name: "Cal Roig".into(),
                lat: 41.70,
                lon: 0.63,
                total_pigs: 60,
                mean_weight_kg: 108.0,
                std_weight_kg: Some(4.0),
            },
            FarmRecord {
                farm_id: "F2".into(),
                name: "Mas Nou".into(),
                lat: 41.72,
                lon: 0.66,
                total_pigs: 40,
                mean_weight_kg: 112.0,
                std_weight_kg: None,
            },
        ];
        let slaughterhouses = vec![SlaughterhouseRecord {
            slaughterhouse_id: "S1".into(),
            name: "Escorxador".into(),
            lat: 41.60,
            lon: 0.62,
            target_daily: 900,
            daily_capacity_min: 500,
            daily_capacity_max: 1500,
            penalty_15_range: None,
            penalty_20_below: None,
            penalty_20_above: None,
        }];
        StaticDataset::new(farms, slaughterhouses, Vec::new())
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<LiveEvent>) -> Vec<LiveEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(n)) => panic!("lagged {n}"),
            }
        }
        events
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-0.004), -0.0);
    }

    #[tokio::test]
    async fn test_single_day_event_sequence() {
        let hub = SimulationHub::new();
        let mut rx = hub.subscribe();
        let config = SimulationConfig {
            days: 1,
            steps_per_leg: 3,
            ..SimulationConfig::instant()
        };
        let runner = SimulationRunner::new(Arc::new(dataset()), hub, config);

        let outcome = runner.run_once(&CancellationToken::new()).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let events = drain(&mut rx);
        let types: Vec<&str> = events.iter().map(LiveEvent::event_type).collect();
        assert_eq!(types.first(), Some(&"INIT_FARMS"));
        assert_eq!(
            &types[types.len() - 4..],
            &["SLAUGHTERHOUSE_UPDATE", "TRUCKS_UPDATE", "DAILY_SUMMARY", "SIMULATION_COMPLETE"]
        );

        // one truck, two stops: heaviest farm first
        let farm_updates: Vec<&FarmUpdate> = events
            .iter()
            .filter_map(|e| match e {
                LiveEvent::FarmUpdate(u) => Some(u),
                _ => None,
            })
            .collect();
        assert_eq!(farm_updates.len(), 2);
        assert_eq!(farm_updates[0].farm_id, "F2");
        assert_eq!(farm_updates[0].new_inventory, 0);
        assert_eq!(farm_updates[0].num_pigs_loaded, 40);

        // 3 steps per leg over 3 legs and a LOADED per stop
        let positions = types.iter().filter(|t| **t == "TRUCK_UPDATE").count();
        assert_eq!(positions, 3 * 3 + 2);

        let Some(LiveEvent::TruckArrived(arrived)) =
            events.iter().find(|e| matches!(e, LiveEvent::TruckArrived(_)))
        else {
            panic!("no TRUCK_ARRIVED");
        };
        assert_eq!(arrived.truck_id, "T1-Generic");
        assert_eq!(arrived.pigs_delivered, 100);

        let Some(LiveEvent::SlaughterhouseUpdate(update)) = events
            .iter()
            .find(|e| matches!(e, LiveEvent::SlaughterhouseUpdate(_)))
        else {
            panic!("no SLAUGHTERHOUSE_UPDATE");
        };
        assert_eq!(update.slaughterhouse_id.as_deref(), Some("S1"));
        assert_eq!(update.metrics.pigs_delivered, 100);
        assert!((update.metrics.capacity_utilization - round2(100.0 / 1500.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_multi_day_run_sends_end_of_day() {
        let hub = SimulationHub::new();
        let mut rx = hub.subscribe();
        let config = SimulationConfig {
            days: 2,
            steps_per_leg: 2,
            ..SimulationConfig::instant()
        };
        let runner = SimulationRunner::new(Arc::new(dataset()), hub, config);
        runner.run_once(&CancellationToken::new()).await;

        let events = drain(&mut rx);
        let ends = events
            .iter()
            .filter(|e| matches!(e, LiveEvent::EndOfSim { .. }))
            .count();
        assert_eq!(ends, 1);

        let summaries: Vec<&DailySummary> = events
            .iter()
            .filter_map(|e| match e {
                LiveEvent::DailySummary(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(summaries.len(), 2);
        // both farms emptied on day 1, nothing left for day 2
        assert_eq!(summaries[1].summary.pigs_processed, 0);
        assert_eq!(
            summaries[1].cumulative_profit,
            round2(summaries[0].summary.net_profit + summaries[1].summary.net_profit)
        );
    }

    #[tokio::test]
    async fn test_no_farms_publishes_error() {
        let hub = SimulationHub::new();
        let mut rx = hub.subscribe();
        let runner = SimulationRunner::new(
            Arc::new(StaticDataset::default()),
            hub,
            SimulationConfig::instant(),
        );
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(runner.run(shutdown.clone()));

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, LiveEvent::Error { .. }));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_restarts_from_day_one_for_new_subscriber() {
        let hub = SimulationHub::new();
        let mut first = hub.subscribe();
        let config = SimulationConfig {
            days: 1,
            steps_per_leg: 2,
            ..SimulationConfig::instant()
        };
        let runner = SimulationRunner::new(Arc::new(dataset()), hub.clone(), config);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(runner.run(shutdown.clone()));

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match first.recv().await.unwrap() {
                    LiveEvent::SimulationComplete { .. } => break,
                    _ => continue,
                }
            }
        })
        .await
        .expect("first run did not complete");

        let mut second = hub.subscribe();
        let event = tokio::time::timeout(Duration::from_secs(2), second.recv())
            .await
            .expect("no restart after a new subscriber")
            .unwrap();
        let LiveEvent::InitFarms(init) = event else {
            panic!("expected INIT_FARMS, got {}", event.event_type());
        };
        // fresh farm state: day 1 inventory again
        let f1 = init.farms.iter().find(|f| f.id == "F1").unwrap();
        assert_eq!(f1.inventory, 60);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_stops_mid_run() {
        let hub = SimulationHub::new();
        let _rx = hub.subscribe();
        let config = SimulationConfig {
            step_delay: Duration::from_millis(50),
            ..SimulationConfig::default()
        };
        let runner = SimulationRunner::new(Arc::new(dataset()), hub, config);
        let shutdown = CancellationToken::new();

        let cancel = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
        let outcome = tokio::time::timeout(Duration::from_secs(2), runner.run_once(&shutdown))
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
    }
}
