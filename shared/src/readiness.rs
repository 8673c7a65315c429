//! Readiness model
//!
//! A farm's live weights are modelled as a normal distribution. The share of
//! the herd inside the slaughter window is the probability mass between the
//! window bounds.

/// Lower bound of the slaughter-weight window (kg)
pub const READY_WEIGHT_MIN_KG: f64 = 105.0;
/// Upper bound of the slaughter-weight window (kg)
pub const READY_WEIGHT_MAX_KG: f64 = 115.0;

// Abramowitz & Stegun 7.1.26, |error| <= 1.5e-7
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Error function approximation
pub fn erf(x: f64) -> f64 {
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Probability that a `N(mean, stddev²)` sample falls inside `[lower, upper]`.
///
/// A non-positive or non-finite `stddev` is a point mass at `mean`: the
/// result is 1 when the mean is inside the window and 0 otherwise.
pub fn readiness_fraction(lower: f64, upper: f64, mean: f64, stddev: f64) -> f64 {
    if !(stddev.is_finite() && stddev > 0.0) {
        return if (lower..=upper).contains(&mean) { 1.0 } else { 0.0 };
    }

    let upper_z = (upper - mean) / stddev;
    let lower_z = (lower - mean) / stddev;
    let fraction = standard_normal_cdf(upper_z) - standard_normal_cdf(lower_z);

    if fraction.is_nan() {
        return 0.0;
    }
    fraction.clamp(0.0, 1.0)
}

/// Pigs ready to ship: population times the mass inside the 105–115 kg window.
pub fn ready_count(total_population: u32, mean: f64, stddev: f64) -> u32 {
    let fraction = readiness_fraction(READY_WEIGHT_MIN_KG, READY_WEIGHT_MAX_KG, mean, stddev);
    (f64::from(total_population) * fraction).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 2e-7);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 2e-7);
        assert!((erf(3.0) - 0.999_977_91).abs() < 2e-7);
    }

    #[test]
    fn test_cdf_is_symmetric() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
        let z = 1.3;
        assert!((standard_normal_cdf(z) + standard_normal_cdf(-z) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_stddev_is_point_mass() {
        assert_eq!(readiness_fraction(105.0, 115.0, 110.0, 0.0), 1.0);
        assert_eq!(readiness_fraction(105.0, 115.0, 200.0, 0.0), 0.0);
        // window bounds are inclusive
        assert_eq!(readiness_fraction(105.0, 115.0, 105.0, 0.0), 1.0);
        assert_eq!(readiness_fraction(105.0, 115.0, 115.0, 0.0), 1.0);
    }

    #[test]
    fn test_degenerate_stddev_never_nan() {
        for s in [-1.0, f64::NAN, f64::INFINITY] {
            let f = readiness_fraction(105.0, 115.0, 110.0, s);
            assert!(!f.is_nan());
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_centered_window_one_sigma() {
        // ±0.5σ around the mean
        let f = readiness_fraction(105.0, 115.0, 110.0, 10.0);
        assert!((f - 0.382_924_92).abs() < 1e-6);
    }

    /// Absolute error bound of the erf approximation
    const ERF_TOLERANCE: f64 = 1.5e-7;

    #[test]
    fn test_monotonic_as_mean_moves_away() {
        for stddev in [0.5, 2.0, 5.0, 10.0, 25.0] {
            let mut previous = f64::INFINITY;
            for step in 0..200 {
                let offset = step as f64 * 0.5;
                let above = readiness_fraction(105.0, 115.0, 110.0 + offset, stddev);
                let below = readiness_fraction(105.0, 115.0, 110.0 - offset, stddev);

                assert!((0.0..=1.0).contains(&above));
                assert!((0.0..=1.0).contains(&below));
                // erf(0) is 1e-9 off, so exact symmetry only holds to the approximation error
                assert!((above - below).abs() < ERF_TOLERANCE, "stddev {stddev}, offset {offset}");
                assert!(above <= previous + ERF_TOLERANCE, "stddev {stddev}, offset {offset}");
                previous = above;
            }
        }
    }

    #[test]
    fn test_ready_count_matches_fraction() {
        let expected = (1000.0 * readiness_fraction(105.0, 115.0, 110.0, 10.0)).round() as u32;
        assert_eq!(ready_count(1000, 110.0, 10.0), expected);
        assert_eq!(ready_count(1000, 110.0, 10.0), 383);
    }

    #[test]
    fn test_ready_count_empty_farm() {
        assert_eq!(ready_count(0, 110.0, 10.0), 0);
        assert_eq!(ready_count(500, 110.0, 0.0), 500);
    }
}
