//! Geolocation

use serde::{Deserialize, Serialize};

/// Kilometres per degree, flat-earth approximation used for route costing
pub const KM_PER_DEGREE: f64 = 111.0;

/// Latitude/longitude pair, `[lat, lon]` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance in km (degrees × 111)
    pub fn distance_km(&self, other: &LatLon) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lon = self.lon - other.lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt() * KM_PER_DEGREE
    }

    /// Linear interpolation, `t` in [0, 1]
    pub fn lerp(&self, other: &LatLon, t: f64) -> LatLon {
        LatLon {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl From<[f64; 2]> for LatLon {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for [f64; 2] {
    fn from(value: LatLon) -> Self {
        [value.lat, value.lon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_pair() {
        let p = LatLon::new(41.71, 0.64);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[41.71,0.64]");
        let back: LatLon = serde_json::from_str("[41.72,0.65]").unwrap();
        assert_eq!(back, LatLon::new(41.72, 0.65));
    }

    #[test]
    fn test_distance_and_lerp() {
        let a = LatLon::new(41.0, 1.0);
        let b = LatLon::new(42.0, 1.0);
        assert!((a.distance_km(&b) - 111.0).abs() < 1e-9);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert!((a.lerp(&b, 0.5).lat - 41.5).abs() < 1e-12);
    }
}
