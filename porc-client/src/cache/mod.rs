//! Entity cache
//!
//! Three independent id-keyed partitions (trucks, farms, slaughterhouses).
//! Each entry pairs the live entity with the view handle rendered for it,
//! if any. Entries are never evicted during a session.

mod entity;

pub use entity::{FarmEntity, MapEntity, SlaughterhouseEntity, TruckEntity};

use std::collections::HashMap;
use std::fmt;

use crate::view::ViewHandle;

/// Cache partition / marker category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Truck,
    Farm,
    Slaughterhouse,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Truck => "truck",
            Self::Farm => "farm",
            Self::Slaughterhouse => "slaughterhouse",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    Updated,
}

/// Cached entity plus its rendered view
#[derive(Debug)]
pub struct Entry<E> {
    entity: E,
    view: Option<Box<dyn ViewHandle>>,
}

impl<E> Entry<E> {
    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn view(&self) -> Option<&dyn ViewHandle> {
        self.view.as_deref()
    }

    pub fn view_mut(&mut self) -> Option<&mut (dyn ViewHandle + 'static)> {
        self.view.as_deref_mut()
    }

    pub fn is_rendered(&self) -> bool {
        self.view.is_some()
    }

    pub(crate) fn set_view(&mut self, view: Box<dyn ViewHandle>) {
        self.view = Some(view);
    }
}

/// One category of the cache
#[derive(Debug)]
pub struct Partition<E> {
    entries: HashMap<String, Entry<E>>,
}

impl<E> Default for Partition<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<E: MapEntity> Partition<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    /// Insert a new entity or replace the data of an existing one, keeping its view
    pub fn upsert(&mut self, entity: E) -> Change {
        match self.entries.get_mut(entity.id()) {
            Some(entry) => {
                entry.entity = entity;
                Change::Updated
            }
            None => {
                self.entries
                    .insert(entity.id().to_string(), Entry { entity, view: None });
                Change::Created
            }
        }
    }

    /// Apply `update` to the entity with `id`, creating it with `create` first if absent
    pub fn upsert_with(
        &mut self,
        id: &str,
        create: impl FnOnce() -> E,
        update: impl FnOnce(&mut E),
    ) -> Change {
        let change = if self.entries.contains_key(id) {
            Change::Updated
        } else {
            self.entries.insert(
                id.to_string(),
                Entry {
                    entity: create(),
                    view: None,
                },
            );
            Change::Created
        };
        if let Some(entry) = self.entries.get_mut(id) {
            update(&mut entry.entity);
        }
        change
    }

    /// Mutate an existing entity; `false` when the id is unknown
    pub fn update(&mut self, id: &str, update: impl FnOnce(&mut E)) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                update(&mut entry.entity);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.entries.get(id).map(|entry| &entry.entity)
    }

    pub fn entry(&self, id: &str) -> Option<&Entry<E>> {
        self.entries.get(id)
    }

    pub fn entry_mut(&mut self, id: &str) -> Option<&mut Entry<E>> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Replace the whole partition with a static collection
    ///
    /// Views of ids present in both the old and new collection are kept.
    pub fn set_static_collection(&mut self, entities: impl IntoIterator<Item = E>) -> Vec<String> {
        let mut previous = std::mem::take(&mut self.entries);
        for entity in entities {
            let id = entity.id().to_string();
            let view = previous.remove(&id).and_then(|old| old.view);
            self.entries.insert(id, Entry { entity, view });
        }
        self.entries.keys().cloned().collect()
    }

    /// Ids that have no view yet
    pub fn unrendered_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_rendered())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.values().map(|entry| &entry.entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Live entity store, injected into the dispatcher
#[derive(Debug, Default)]
pub struct EntityCache {
    trucks: Partition<TruckEntity>,
    farms: Partition<FarmEntity>,
    slaughterhouses: Partition<SlaughterhouseEntity>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trucks(&self) -> &Partition<TruckEntity> {
        &self.trucks
    }

    pub fn farms(&self) -> &Partition<FarmEntity> {
        &self.farms
    }

    pub fn slaughterhouses(&self) -> &Partition<SlaughterhouseEntity> {
        &self.slaughterhouses
    }

    pub fn trucks_mut(&mut self) -> &mut Partition<TruckEntity> {
        &mut self.trucks
    }

    pub fn farms_mut(&mut self) -> &mut Partition<FarmEntity> {
        &mut self.farms
    }

    pub fn slaughterhouses_mut(&mut self) -> &mut Partition<SlaughterhouseEntity> {
        &mut self.slaughterhouses
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Truck => self.trucks.len(),
            EntityKind::Farm => self.farms.len(),
            EntityKind::Slaughterhouse => self.slaughterhouses.len(),
        }
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Truck => self.trucks.contains(id),
            EntityKind::Farm => self.farms.contains(id),
            EntityKind::Slaughterhouse => self.slaughterhouses.contains(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{RecordingSurface, ViewSurface};
    use shared::models::LatLon;

    #[test]
    fn test_upsert_same_id_twice() {
        let mut trucks = Partition::new();
        let first = trucks.upsert(TruckEntity::new("T1", LatLon::new(41.71, 0.64)));
        let second = trucks.upsert(TruckEntity::new("T1", LatLon::new(41.72, 0.65)));

        assert_eq!(first, Change::Created);
        assert_eq!(second, Change::Updated);
        assert_eq!(trucks.len(), 1);
        assert_eq!(trucks.get("T1").unwrap().position, LatLon::new(41.72, 0.65));
        assert_eq!(trucks.kind(), EntityKind::Truck);
    }

    #[test]
    fn test_upsert_keeps_view() {
        let mut surface = RecordingSurface::new();
        let mut trucks = Partition::new();
        let truck = TruckEntity::new("T1", LatLon::new(41.71, 0.64));
        let marker = truck.marker();
        trucks.upsert(truck);

        let entry = trucks.entry_mut("T1").unwrap();
        let mut view = surface.create_marker(EntityKind::Truck, "T1", &marker);
        view.on_focus();
        entry.set_view(view);

        trucks.upsert(TruckEntity::new("T1", LatLon::new(41.8, 0.7)));
        let entry = trucks.entry("T1").unwrap();
        assert!(entry.view().unwrap().is_popup_open());
    }

    #[test]
    fn test_upsert_with_creates_then_updates() {
        let mut trucks = Partition::new();
        let change = trucks.upsert_with(
            "T2",
            || TruckEntity::new("T2", LatLon::new(0.0, 0.0)),
            |t| t.pigs_on_board = 12,
        );
        assert_eq!(change, Change::Created);
        assert_eq!(trucks.get("T2").unwrap().pigs_on_board, 12);

        let change = trucks.upsert_with(
            "T2",
            || unreachable!("already cached"),
            |t| t.pigs_on_board = 20,
        );
        assert_eq!(change, Change::Updated);
        assert_eq!(trucks.get("T2").unwrap().pigs_on_board, 20);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut farms: Partition<FarmEntity> = Partition::new();
        assert!(!farms.update("F404", |f| f.total_pigs = 1));
        assert!(farms.is_empty());
    }

    #[test]
    fn test_set_static_collection_replaces() {
        let mut trucks = Partition::new();
        trucks.upsert(TruckEntity::new("old", LatLon::new(0.0, 0.0)));
        let ids = trucks.set_static_collection(vec![
            TruckEntity::new("a", LatLon::new(1.0, 1.0)),
            TruckEntity::new("b", LatLon::new(2.0, 2.0)),
        ]);
        assert_eq!(ids.len(), 2);
        assert!(!trucks.contains("old"));
        assert_eq!(trucks.unrendered_ids().len(), 2);
    }
}
