//! Reconciliation dispatcher
//!
//! Routes each decoded event by type to the matching cache partition and
//! mutation rule, then refreshes the affected markers when a surface is
//! attached. Every rule is idempotent and tolerant of missing entities:
//! unknown ids and unknown event types are no-ops.

use shared::StaticDataset;
use shared::live::{
    DailySummary, FarmUpdate, InitFarms, LiveEvent, SlaughterhouseUpdate, TruckArrived,
    TruckMetrics, TruckStatus, TruckUpdate,
};
use shared::models::LatLon;

use crate::cache::{
    Change, EntityCache, EntityKind, FarmEntity, MapEntity, Partition, SlaughterhouseEntity,
    TruckEntity,
};
use crate::config::ClientConfig;
use crate::view::ViewSurface;

/// One entity touched by a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEffect {
    pub kind: EntityKind,
    pub id: String,
    pub change: Change,
    /// A view exists for the entity after this dispatch
    pub rendered: bool,
}

/// Why an event changed nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownType,
    UnknownEntity { kind: EntityKind, id: String },
    MissingSlaughterhouseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied(Vec<RenderEffect>),
    Ignored(IgnoreReason),
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn effects(&self) -> &[RenderEffect] {
        match self {
            Self::Applied(effects) => effects,
            Self::Ignored(_) => &[],
        }
    }

    /// Ids created by this dispatch
    pub fn created(&self) -> impl Iterator<Item = &str> {
        self.effects()
            .iter()
            .filter(|e| e.change == Change::Created)
            .map(|e| e.id.as_str())
    }
}

/// Simulation phase as seen by the client
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SimulationPhase {
    #[default]
    Waiting,
    Running,
    DayComplete,
    Complete,
    Failed(String),
}

/// Non-entity state carried by the stream
#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    pub phase: SimulationPhase,
    pub last_summary: Option<DailySummary>,
    pub slaughterhouse_location: Option<LatLon>,
    pub last_message: Option<String>,
}

impl SimulationProgress {
    pub fn cumulative_profit(&self) -> f64 {
        self.last_summary
            .as_ref()
            .map(|s| s.cumulative_profit)
            .unwrap_or_default()
    }
}

/// Owns the write path into the entity cache
#[derive(Debug)]
pub struct Dispatcher {
    cache: EntityCache,
    surface: Option<Box<dyn ViewSurface>>,
    progress: SimulationProgress,
    map_center: LatLon,
    fallback_slaughterhouse_id: Option<String>,
}

impl Dispatcher {
    pub fn new(cache: EntityCache, config: &ClientConfig) -> Self {
        Self {
            cache,
            surface: None,
            progress: SimulationProgress::default(),
            map_center: config.map_center,
            fallback_slaughterhouse_id: config.fallback_slaughterhouse_id.clone(),
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut EntityCache {
        &mut self.cache
    }

    pub fn progress(&self) -> &SimulationProgress {
        &self.progress
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Attach the rendering surface and draw everything cached so far
    ///
    /// Returns how many markers were created.
    pub fn attach_surface(&mut self, surface: Box<dyn ViewSurface>) -> usize {
        self.surface = Some(surface);

        let mut rendered = 0;
        rendered += render_pending(&mut self.surface, self.cache.farms_mut());
        rendered += render_pending(&mut self.surface, self.cache.slaughterhouses_mut());
        rendered += render_pending(&mut self.surface, self.cache.trucks_mut());

        tracing::info!(rendered, "View surface attached");
        rendered
    }

    /// Detach the surface; views stay with their entities
    pub fn detach_surface(&mut self) -> Option<Box<dyn ViewSurface>> {
        self.surface.take()
    }

    /// Bulk-load farms and slaughterhouses from the static dataset
    pub fn load_static(&mut self, dataset: &StaticDataset) -> Vec<RenderEffect> {
        let farm_ids = self
            .cache
            .farms_mut()
            .set_static_collection(dataset.farms.iter().map(FarmEntity::from));
        let slaughterhouse_ids = self
            .cache
            .slaughterhouses_mut()
            .set_static_collection(dataset.slaughterhouses.iter().map(SlaughterhouseEntity::from));

        tracing::info!(
            farms = farm_ids.len(),
            slaughterhouses = slaughterhouse_ids.len(),
            "Static collections loaded"
        );

        let mut effects = Vec::with_capacity(farm_ids.len() + slaughterhouse_ids.len());
        for id in farm_ids {
            effects.push(self.refresh(EntityKind::Farm, id, Change::Created));
        }
        for id in slaughterhouse_ids {
            effects.push(self.refresh(EntityKind::Slaughterhouse, id, Change::Created));
        }
        effects
    }

    /// Apply one event
    pub fn dispatch(&mut self, event: &LiveEvent) -> DispatchOutcome {
        let outcome = match event {
            LiveEvent::TruckUpdate(update) => self.on_truck_update(update),
            LiveEvent::TrucksUpdate { trucks } => self.on_trucks_update(trucks),
            LiveEvent::SlaughterhouseUpdate(update) => self.on_slaughterhouse_update(update),
            LiveEvent::FarmUpdate(update) => self.on_farm_update(update),
            LiveEvent::InitFarms(init) => self.on_init_farms(init),
            LiveEvent::TruckArrived(arrived) => self.on_truck_arrived(arrived),
            LiveEvent::DailySummary(summary) => {
                tracing::info!(
                    day = summary.summary.day,
                    pigs = summary.summary.pigs_processed,
                    net_profit = summary.summary.net_profit,
                    cumulative_profit = summary.cumulative_profit,
                    "Daily summary"
                );
                self.progress.last_summary = Some(summary.clone());
                DispatchOutcome::Applied(Vec::new())
            }
            LiveEvent::EndOfSim { msg } => {
                self.set_phase(SimulationPhase::DayComplete, msg);
                DispatchOutcome::Applied(Vec::new())
            }
            LiveEvent::SimulationComplete { msg } => {
                self.set_phase(SimulationPhase::Complete, msg);
                DispatchOutcome::Applied(Vec::new())
            }
            LiveEvent::Error { msg } => {
                tracing::warn!("Server reported an error: {msg}");
                self.set_phase(SimulationPhase::Failed(msg.clone()), msg);
                DispatchOutcome::Applied(Vec::new())
            }
            LiveEvent::Unknown => DispatchOutcome::Ignored(IgnoreReason::UnknownType),
        };

        if let DispatchOutcome::Ignored(reason) = &outcome {
            tracing::debug!(event_type = event.event_type(), ?reason, "Event ignored");
        }
        outcome
    }

    fn on_truck_update(&mut self, update: &TruckUpdate) -> DispatchOutcome {
        let change = self.cache.trucks_mut().upsert_with(
            &update.truck_id,
            || TruckEntity::new(update.truck_id.clone(), update.position),
            |truck| {
                truck.position = update.position;
                truck.pigs_on_board = update.pigs_on_board;
                truck.status = update.status;
            },
        );
        if change == Change::Created {
            tracing::debug!(truck_id = %update.truck_id, "New truck");
        }
        let effect = self.refresh(EntityKind::Truck, update.truck_id.clone(), change);
        DispatchOutcome::Applied(vec![effect])
    }

    fn on_trucks_update(&mut self, trucks: &[TruckMetrics]) -> DispatchOutcome {
        let center = self.map_center;
        let mut effects = Vec::with_capacity(trucks.len());
        for metrics in trucks {
            let change = self.cache.trucks_mut().upsert_with(
                &metrics.truck_id,
                || TruckEntity::new(metrics.truck_id.clone(), center),
                |truck| {
                    truck.load_kg = metrics.load_kg;
                    truck.route_pigs = metrics.num_pigs;
                    truck.avg_live_weight = metrics.avg_live_weight;
                    truck.farms_visited = metrics.farms_visited;
                },
            );
            effects.push(self.refresh(EntityKind::Truck, metrics.truck_id.clone(), change));
        }
        DispatchOutcome::Applied(effects)
    }

    fn on_slaughterhouse_update(&mut self, update: &SlaughterhouseUpdate) -> DispatchOutcome {
        let Some(id) = update
            .slaughterhouse_id
            .clone()
            .or_else(|| self.fallback_slaughterhouse_id.clone())
        else {
            tracing::warn!("SLAUGHTERHOUSE_UPDATE without id and no fallback configured, dropped");
            return DispatchOutcome::Ignored(IgnoreReason::MissingSlaughterhouseId);
        };

        let found = self
            .cache
            .slaughterhouses_mut()
            .update(&id, |s| s.apply_metrics(&update.metrics));
        if !found {
            return unknown(EntityKind::Slaughterhouse, id);
        }
        DispatchOutcome::Applied(vec![self.refresh(
            EntityKind::Slaughterhouse,
            id,
            Change::Updated,
        )])
    }

    fn on_farm_update(&mut self, update: &FarmUpdate) -> DispatchOutcome {
        let found = self.cache.farms_mut().update(&update.farm_id, |farm| {
            farm.total_pigs = update.displayed_total();
            farm.pigs_loaded_today = update.num_pigs_loaded;
            if let Some(name) = &update.farm_name {
                farm.name = name.clone();
            }
            if let Some(weight) = update.avg_weight {
                farm.mean_weight_kg = weight;
            }
        });
        if !found {
            return unknown(EntityKind::Farm, update.farm_id.clone());
        }
        DispatchOutcome::Applied(vec![self.refresh(
            EntityKind::Farm,
            update.farm_id.clone(),
            Change::Updated,
        )])
    }

    fn on_init_farms(&mut self, init: &InitFarms) -> DispatchOutcome {
        self.progress.phase = SimulationPhase::Running;
        if init.slaughterhouse.is_some() {
            self.progress.slaughterhouse_location = init.slaughterhouse;
        }

        let mut effects = Vec::new();
        for snapshot in &init.farms {
            let found = self.cache.farms_mut().update(&snapshot.id, |farm| {
                farm.total_pigs = snapshot.inventory;
                farm.mean_weight_kg = snapshot.avg_weight;
                farm.pigs_loaded_today = 0;
            });
            if found {
                effects.push(self.refresh(EntityKind::Farm, snapshot.id.clone(), Change::Updated));
            } else {
                tracing::debug!(farm_id = %snapshot.id, "INIT_FARMS entry for unknown farm");
            }
        }
        DispatchOutcome::Applied(effects)
    }

    fn on_truck_arrived(&mut self, arrived: &TruckArrived) -> DispatchOutcome {
        let found = self.cache.trucks_mut().update(&arrived.truck_id, |truck| {
            truck.status = Some(TruckStatus::Arrived);
            truck.pigs_delivered = arrived.pigs_delivered;
            truck.pigs_on_board = 0;
            truck.last_trip = Some(arrived.metrics_trip);
        });
        if !found {
            return unknown(EntityKind::Truck, arrived.truck_id.clone());
        }
        DispatchOutcome::Applied(vec![self.refresh(
            EntityKind::Truck,
            arrived.truck_id.clone(),
            Change::Updated,
        )])
    }

    fn set_phase(&mut self, phase: SimulationPhase, msg: &str) {
        tracing::info!(?phase, "{msg}");
        self.progress.phase = phase;
        self.progress.last_message = Some(msg.to_string());
    }

    /// Bring the view of one entity in line with its cached state
    fn refresh(&mut self, kind: EntityKind, id: String, change: Change) -> RenderEffect {
        let rendered = match kind {
            EntityKind::Truck => render_one(&mut self.surface, self.cache.trucks_mut(), &id),
            EntityKind::Farm => render_one(&mut self.surface, self.cache.farms_mut(), &id),
            EntityKind::Slaughterhouse => {
                render_one(&mut self.surface, self.cache.slaughterhouses_mut(), &id)
            }
        };
        RenderEffect {
            kind,
            id,
            change,
            rendered,
        }
    }
}

fn unknown(kind: EntityKind, id: String) -> DispatchOutcome {
    tracing::debug!(%kind, id = %id, "Update for unknown entity");
    DispatchOutcome::Ignored(IgnoreReason::UnknownEntity { kind, id })
}

/// Update the existing view or create one; `false` while no surface is attached
fn render_one<E: MapEntity>(
    surface: &mut Option<Box<dyn ViewSurface>>,
    partition: &mut Partition<E>,
    id: &str,
) -> bool {
    let Some(entry) = partition.entry_mut(id) else {
        return false;
    };
    let marker = entry.entity().marker();

    if let Some(view) = entry.view_mut() {
        view.update(&marker);
        return true;
    }
    match surface {
        Some(surface) => {
            let view = surface.create_marker(E::KIND, id, &marker);
            entry.set_view(view);
            true
        }
        None => false,
    }
}

fn render_pending<E: MapEntity>(
    surface: &mut Option<Box<dyn ViewSurface>>,
    partition: &mut Partition<E>,
) -> usize {
    let mut rendered = 0;
    for id in partition.unrendered_ids() {
        if render_one(surface, partition, &id) {
            rendered += 1;
        }
    }
    rendered
}
