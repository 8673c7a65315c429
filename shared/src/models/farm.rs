//! Farm Model

use serde::{Deserialize, Serialize};

use super::LatLon;
use crate::readiness;
use crate::serde_helpers::{flexible_id, null_as_zero};

/// Default spread of live weight when a farm record has none (fraction of the mean)
pub const DEFAULT_STD_WEIGHT_RATIO: f64 = 0.05;

/// Farm record from the static dataset (granja)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub farm_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_pigs: u32,
    pub mean_weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_weight_kg: Option<f64>,
}

impl FarmRecord {
    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// Standard deviation of live weight, defaulting to 5% of the mean
    pub fn std_weight(&self) -> f64 {
        self.std_weight_kg
            .unwrap_or(self.mean_weight_kg * DEFAULT_STD_WEIGHT_RATIO)
    }

    /// Pigs inside the 105–115 kg window
    pub fn ready_count(&self) -> u32 {
        readiness::ready_count(self.total_pigs, self.mean_weight_kg, self.std_weight())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm(total: u32, mean: f64, std: Option<f64>) -> FarmRecord {
        FarmRecord {
            farm_id: "F1".into(),
            name: "Granja Test".into(),
            lat: 41.6,
            lon: 0.6,
            total_pigs: total,
            mean_weight_kg: mean,
            std_weight_kg: std,
        }
    }

    #[test]
    fn test_ready_count_uses_readiness_window() {
        let f = farm(1000, 110.0, Some(10.0));
        let expected =
            (1000.0 * readiness::readiness_fraction(105.0, 115.0, 110.0, 10.0)).round() as u32;
        assert_eq!(f.ready_count(), expected);
    }

    #[test]
    fn test_missing_std_defaults_to_five_percent() {
        let f = farm(10, 100.0, None);
        assert!((f.std_weight() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize_dataset_row() {
        let json = r#"{"farm_id": 3, "name": "Cal Pere", "lat": 41.7, "lon": 0.62,
                       "total_pigs": 850, "mean_weight_kg": 104.5, "std_weight_kg": 8.1}"#;
        let f: FarmRecord = serde_json::from_str(json).unwrap();
        assert_eq!(f.farm_id, "3");
        assert_eq!(f.total_pigs, 850);
        assert_eq!(f.location(), LatLon::new(41.7, 0.62));
    }
}
