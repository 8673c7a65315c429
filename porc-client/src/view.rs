//! View capability
//!
//! The dispatcher never knows how markers are drawn. A [`ViewSurface`]
//! creates one [`ViewHandle`] per entity; the handle receives content
//! updates and hover notifications and keeps its own popup state.

use std::sync::{Arc, Mutex};

use shared::models::{LatLon, UtilizationTier};

use crate::cache::EntityKind;

/// Marker glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Truck,
    Farm,
    Slaughterhouse(UtilizationTier),
}

/// Everything a surface needs to draw one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLon,
    pub icon: MarkerIcon,
    /// Popup body, `<br>` separates lines
    pub popup: String,
}

/// Rendered marker owned by the entity cache
pub trait ViewHandle: Send + std::fmt::Debug {
    /// Refresh position, icon and popup content; popup open state is kept
    fn update(&mut self, marker: &Marker);
    /// Pointer entered the marker
    fn on_focus(&mut self);
    /// Pointer left the marker
    fn on_blur(&mut self);
    fn is_popup_open(&self) -> bool;
}

/// Rendering backend (map widget, terminal, recorder)
pub trait ViewSurface: Send + std::fmt::Debug {
    fn create_marker(&mut self, kind: EntityKind, id: &str, marker: &Marker) -> Box<dyn ViewHandle>;
}

/// Operation seen by a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Created {
        kind: EntityKind,
        id: String,
        marker: Marker,
    },
    Updated {
        kind: EntityKind,
        id: String,
        marker: Marker,
        popup_open: bool,
    },
}

impl SurfaceOp {
    pub fn id(&self) -> &str {
        match self {
            Self::Created { id, .. } | Self::Updated { id, .. } => id,
        }
    }
}

/// Headless surface that records every operation
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<Vec<SurfaceOp>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn created_count(&self, kind: EntityKind) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Created { kind: k, .. } if *k == kind))
            .count()
    }

    fn push(&self, op: SurfaceOp) {
        if let Ok(mut log) = self.log.lock() {
            log.push(op);
        }
    }
}

impl ViewSurface for RecordingSurface {
    fn create_marker(&mut self, kind: EntityKind, id: &str, marker: &Marker) -> Box<dyn ViewHandle> {
        self.push(SurfaceOp::Created {
            kind,
            id: id.to_string(),
            marker: marker.clone(),
        });
        Box::new(RecordingHandle {
            surface: self.clone(),
            kind,
            id: id.to_string(),
            marker: marker.clone(),
            popup_open: false,
        })
    }
}

/// Handle produced by [`RecordingSurface`]
#[derive(Debug)]
pub struct RecordingHandle {
    surface: RecordingSurface,
    kind: EntityKind,
    id: String,
    marker: Marker,
    popup_open: bool,
}

impl RecordingHandle {
    pub fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl ViewHandle for RecordingHandle {
    fn update(&mut self, marker: &Marker) {
        self.marker = marker.clone();
        self.surface.push(SurfaceOp::Updated {
            kind: self.kind,
            id: self.id.clone(),
            marker: marker.clone(),
            popup_open: self.popup_open,
        });
    }

    fn on_focus(&mut self) {
        self.popup_open = true;
    }

    fn on_blur(&mut self) {
        self.popup_open = false;
    }

    fn is_popup_open(&self) -> bool {
        self.popup_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(lat: f64) -> Marker {
        Marker {
            position: LatLon::new(lat, 0.6),
            icon: MarkerIcon::Farm,
            popup: "Cal Roig - 10 pigs.".into(),
        }
    }

    #[test]
    fn test_hover_toggles_popup() {
        let mut surface = RecordingSurface::new();
        let mut handle = surface.create_marker(EntityKind::Farm, "F1", &marker(41.0));
        assert!(!handle.is_popup_open());
        handle.on_focus();
        assert!(handle.is_popup_open());
        handle.on_blur();
        assert!(!handle.is_popup_open());
    }

    #[test]
    fn test_update_keeps_popup_open() {
        let mut surface = RecordingSurface::new();
        let mut handle = surface.create_marker(EntityKind::Farm, "F1", &marker(41.0));
        handle.on_focus();
        handle.update(&marker(41.5));

        assert!(handle.is_popup_open());
        let ops = surface.ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[1], SurfaceOp::Updated { popup_open: true, .. }));
        assert_eq!(surface.created_count(EntityKind::Farm), 1);
    }
}
