//! Revenue, penalties and transport costs

use shared::models::{LatLon, SlaughterhouseRecord, TransportKind, TransportRecord};

/// Weight bands that reduce the sale price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyBands {
    /// `[a, b, c, d]`: 15% off for weights in `[a, b)` or `(c, d]`
    pub band_15: [f64; 4],
    /// 20% off below this weight
    pub below_20: f64,
    /// 20% off above this weight
    pub above_20: f64,
}

impl Default for PenaltyBands {
    fn default() -> Self {
        Self {
            band_15: [100.0, 105.0, 115.0, 120.0],
            below_20: 100.0,
            above_20: 120.0,
        }
    }
}

impl PenaltyBands {
    pub fn from_record(record: &SlaughterhouseRecord) -> Self {
        let defaults = Self::default();
        Self {
            band_15: record.penalty_15_range.unwrap_or(defaults.band_15),
            below_20: record.penalty_20_below.unwrap_or(defaults.below_20),
            above_20: record.penalty_20_above.unwrap_or(defaults.above_20),
        }
    }

    /// Fraction of the price lost for one pig
    pub fn penalty_rate(&self, weight_kg: f64) -> f64 {
        let [a, b, c, d] = self.band_15;
        if (a..b).contains(&weight_kg) || (weight_kg > c && weight_kg <= d) {
            0.15
        } else if weight_kg < self.below_20 || weight_kg > self.above_20 {
            0.20
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Revenue {
    pub gross: f64,
    pub penalties: f64,
}

impl Revenue {
    pub fn net(&self) -> f64 {
        self.gross - self.penalties
    }
}

/// Sale value of a load of pigs
pub fn revenue(weights: &[f64], price_per_kg: f64, bands: &PenaltyBands) -> Revenue {
    weights.iter().fold(Revenue::default(), |mut acc, &w| {
        let value = w * price_per_kg;
        acc.gross += value;
        acc.penalties += value * bands.penalty_rate(w);
        acc
    })
}

/// Round trip: slaughterhouse → stops → slaughterhouse
pub fn route_distance_km(depot: LatLon, stops: &[LatLon]) -> f64 {
    let mut distance = 0.0;
    let mut here = depot;
    for stop in stops {
        distance += here.distance_km(stop);
        here = *stop;
    }
    distance + here.distance_km(&depot)
}

/// Working days the weekly fixed cost is spread over
pub const WORKING_DAYS_PER_WEEK: f64 = 5.0;

/// Fallback when the fleet file is missing or empty
pub fn generic_transport() -> TransportRecord {
    TransportRecord {
        transport_id: "Generic".to_string(),
        kind: TransportKind::Normal,
        capacity_tons: 20.0,
        cost_per_km: 1.25,
        weekly_fixed_cost: 2000.0,
    }
}

/// Smallest truck that fits the load, else the largest one
pub fn select_transport(fleet: &[TransportRecord], load_kg: f64) -> TransportRecord {
    let fitting = fleet
        .iter()
        .filter(|t| t.capacity_kg() >= load_kg)
        .min_by(|a, b| a.capacity_kg().total_cmp(&b.capacity_kg()));
    let chosen = fitting.or_else(|| {
        fleet
            .iter()
            .max_by(|a, b| a.capacity_kg().total_cmp(&b.capacity_kg()))
    });
    chosen.cloned().unwrap_or_else(generic_transport)
}

/// Trucks animated at once
pub fn wave_size(fleet: &[TransportRecord]) -> usize {
    match fleet
        .iter()
        .filter(|t| t.kind == TransportKind::Normal)
        .count()
    {
        0 => 3,
        n => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truck(id: &str, kind: TransportKind, tons: f64) -> TransportRecord {
        TransportRecord {
            transport_id: id.into(),
            kind,
            capacity_tons: tons,
            cost_per_km: 1.0,
            weekly_fixed_cost: 1000.0,
        }
    }

    #[test]
    fn test_penalty_bands() {
        let bands = PenaltyBands::default();
        assert_eq!(bands.penalty_rate(110.0), 0.0);
        assert_eq!(bands.penalty_rate(105.0), 0.0);
        assert_eq!(bands.penalty_rate(115.0), 0.0);
        assert_eq!(bands.penalty_rate(100.0), 0.15);
        assert_eq!(bands.penalty_rate(104.9), 0.15);
        assert_eq!(bands.penalty_rate(120.0), 0.15);
        assert_eq!(bands.penalty_rate(99.0), 0.20);
        assert_eq!(bands.penalty_rate(121.0), 0.20);
    }

    #[test]
    fn test_revenue_with_penalties() {
        let r = revenue(&[110.0, 102.0, 125.0], 1.0, &PenaltyBands::default());
        assert!((r.gross - 337.0).abs() < 1e-9);
        assert!((r.penalties - (102.0 * 0.15 + 125.0 * 0.20)).abs() < 1e-9);
        assert!((r.net() - (r.gross - r.penalties)).abs() < 1e-12);
    }

    #[test]
    fn test_route_distance_round_trip() {
        let depot = LatLon::new(0.0, 0.0);
        let d = route_distance_km(depot, &[LatLon::new(0.0, 1.0), LatLon::new(1.0, 1.0)]);
        assert!((d - (111.0 + 111.0 + 2f64.sqrt() * 111.0)).abs() < 1e-9);
        assert_eq!(route_distance_km(depot, &[]), 0.0);
    }

    #[test]
    fn test_select_transport() {
        let fleet = vec![
            truck("big", TransportKind::Normal, 30.0),
            truck("small", TransportKind::Normal, 10.0),
            truck("cold", TransportKind::Refrigerated, 20.0),
        ];
        assert_eq!(select_transport(&fleet, 9_000.0).transport_id, "small");
        assert_eq!(select_transport(&fleet, 15_000.0).transport_id, "cold");
        assert_eq!(select_transport(&fleet, 40_000.0).transport_id, "big");
        assert_eq!(select_transport(&[], 1.0).transport_id, "Generic");
        assert_eq!(wave_size(&fleet), 2);
        assert_eq!(wave_size(&[]), 3);
    }
}
