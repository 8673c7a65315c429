//! Farm state during a simulation run

use rand::Rng;
use shared::live::FarmSnapshot;
use shared::models::{FarmRecord, LatLon};

use super::round2;

/// Sample `N(mean, stddev²)` with the Box-Muller transform
///
/// A non-positive or non-finite `stddev` returns `mean`.
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, stddev: f64) -> f64 {
    if !(stddev.is_finite() && stddev > 0.0) {
        return mean;
    }
    // u1 in (0, 1] keeps ln() finite
    let u1: f64 = 1.0 - rng.r#gen::<f64>();
    let u2: f64 = rng.r#gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + stddev * z
}

/// Pigs sampled for one pickup
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub weights: Vec<f64>,
    pub total_kg: f64,
}

impl Batch {
    pub fn len(&self) -> u32 {
        self.weights.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn avg_weight(&self) -> f64 {
        if self.weights.is_empty() {
            0.0
        } else {
            self.total_kg / self.weights.len() as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct FarmState {
    pub farm_id: String,
    pub name: String,
    pub location: LatLon,
    pub inventory: u32,
    pub mean_weight_kg: f64,
    pub std_weight_kg: f64,
    pub last_visit_day: i64,
}

impl FarmState {
    /// Never visited
    pub const NO_VISIT: i64 = -999;

    pub fn grow(&mut self, daily_gain_kg: f64) {
        if self.inventory > 0 {
            self.mean_weight_kg += daily_gain_kg;
        }
    }

    pub fn can_visit(&self, day: i64, revisit_days: i64) -> bool {
        self.inventory > 0 && day - self.last_visit_day >= revisit_days
    }

    /// As many pigs as fit in `max_kg` at the current mean weight, weights sampled
    pub fn batch_ready<R: Rng + ?Sized>(&self, max_kg: f64, rng: &mut R) -> Option<Batch> {
        if self.inventory == 0 || self.mean_weight_kg <= 0.0 {
            return None;
        }
        let space = (max_kg / self.mean_weight_kg).floor();
        if !(space >= 1.0) {
            return None;
        }
        let count = (self.inventory as f64).min(space) as usize;

        let weights: Vec<f64> = (0..count)
            .map(|_| sample_normal(rng, self.mean_weight_kg, self.std_weight_kg))
            .collect();
        let total_kg = weights.iter().sum();
        Some(Batch { weights, total_kg })
    }

    pub fn commit_sale(&mut self, pigs: u32, day: i64) {
        self.inventory = self.inventory.saturating_sub(pigs);
        self.last_visit_day = day;
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            id: self.farm_id.clone(),
            name: self.name.clone(),
            lat: self.location.lat,
            lon: self.location.lon,
            inventory: self.inventory,
            avg_weight: round2(self.mean_weight_kg),
        }
    }
}

impl From<&FarmRecord> for FarmState {
    fn from(record: &FarmRecord) -> Self {
        Self {
            farm_id: record.farm_id.clone(),
            name: record.name.clone(),
            location: record.location(),
            inventory: record.total_pigs,
            mean_weight_kg: record.mean_weight_kg,
            std_weight_kg: record.std_weight(),
            last_visit_day: Self::NO_VISIT,
        }
    }
}
