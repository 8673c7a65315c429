//! Slaughterhouse Model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LatLon;
use crate::serde_helpers::{flexible_id, null_as_zero};

/// Utilization at or below this is `Low`
pub const LOW_UTILIZATION_MAX: f64 = 0.50;
/// Utilization at or above this is `High`
pub const HIGH_UTILIZATION_MIN: f64 = 0.90;

/// Three-tier capacity status shown on the slaughterhouse marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationTier {
    Low,
    Medium,
    High,
}

impl UtilizationTier {
    /// Classify a utilization fraction; both boundaries are inclusive
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization.is_nan() || utilization <= LOW_UTILIZATION_MAX {
            Self::Low
        } else if utilization >= HIGH_UTILIZATION_MIN {
            Self::High
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for UtilizationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slaughterhouse record from the static dataset (escorxador)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaughterhouseRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub slaughterhouse_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub target_daily: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub daily_capacity_min: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub daily_capacity_max: u32,
    /// `[a, b, c, d]`: 15% penalty for weights in `[a, b)` or `(c, d]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_15_range: Option<[f64; 4]>,
    /// 20% penalty below this weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_20_below: Option<f64>,
    /// 20% penalty above this weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_20_above: Option<f64>,
}

impl SlaughterhouseRecord {
    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// `(target - min) / (max - min)`
    ///
    /// An empty or inverted capacity range counts as saturated when the
    /// target reaches the maximum, idle otherwise.
    pub fn utilization(&self) -> f64 {
        let min = f64::from(self.daily_capacity_min);
        let max = f64::from(self.daily_capacity_max);
        let target = f64::from(self.target_daily);

        if max <= min {
            return if target >= max { 1.0 } else { 0.0 };
        }
        (target - min) / (max - min)
    }

    pub fn tier(&self) -> UtilizationTier {
        UtilizationTier::from_utilization(self.utilization())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(target: u32, min: u32, max: u32) -> SlaughterhouseRecord {
        SlaughterhouseRecord {
            slaughterhouse_id: "S1".into(),
            name: "Escorxador".into(),
            lat: 41.98,
            lon: 2.80,
            target_daily: target,
            daily_capacity_min: min,
            daily_capacity_max: max,
            penalty_15_range: None,
            penalty_20_below: None,
            penalty_20_above: None,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(UtilizationTier::from_utilization(0.3), UtilizationTier::Low);
        assert_eq!(UtilizationTier::from_utilization(0.5), UtilizationTier::Low);
        assert_eq!(UtilizationTier::from_utilization(0.51), UtilizationTier::Medium);
        assert_eq!(UtilizationTier::from_utilization(0.89), UtilizationTier::Medium);
        assert_eq!(UtilizationTier::from_utilization(0.9), UtilizationTier::High);
        assert_eq!(UtilizationTier::from_utilization(1.4), UtilizationTier::High);
    }

    #[test]
    fn test_utilization_from_capacity_range() {
        let s = record(1400, 1000, 1800);
        assert!((s.utilization() - 0.5).abs() < 1e-12);
        assert_eq!(s.tier(), UtilizationTier::Low);

        let s = record(1750, 1000, 1800);
        assert_eq!(s.tier(), UtilizationTier::High);
    }

    #[test]
    fn test_degenerate_capacity_range() {
        assert_eq!(record(1800, 1800, 1800).utilization(), 1.0);
        assert_eq!(record(100, 1800, 1800).utilization(), 0.0);
        assert!(!record(0, 0, 0).utilization().is_nan());
    }

    #[test]
    fn test_deserialize_with_penalties() {
        let json = r#"{"slaughterhouse_id":"S01","name":"Vic","lat":41.9,"lon":2.25,
            "target_daily":1500,"daily_capacity_min":1000,"daily_capacity_max":1800,
            "penalty_15_range":[100,105,115,120],"penalty_20_below":100,"penalty_20_above":120}"#;
        let s: SlaughterhouseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(s.penalty_15_range, Some([100.0, 105.0, 115.0, 120.0]));
        assert_eq!(s.penalty_20_above, Some(120.0));
    }
}
