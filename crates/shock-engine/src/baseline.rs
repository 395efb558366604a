//! Deterministic baseline trend and periodic seasonality.

use series_core::SeriesSpec;
use std::f64::consts::PI;

/// Compound-growth baseline at step `t`:
/// `base_level * (1 + growth_rate)^t`. Growth is geometric, not a constant
/// per-step increment.
pub fn baseline(spec: &SeriesSpec, t: usize) -> f64 {
    spec.base_level * (1.0 + spec.growth_rate).powi(t as i32)
}

/// Sinusoidal seasonal modulation at step `t`, with the configured period,
/// amplitude and phase offset. Level units for additive series, a fraction of
/// the baseline for multiplicative ones.
pub fn seasonal(spec: &SeriesSpec, t: usize) -> f64 {
    let period = f64::from(spec.seasonal_period);
    let pos = (t % spec.seasonal_period as usize) as f64;
    spec.seasonal_amplitude * (2.0 * PI * pos / period + spec.seasonal_phase).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use series_core::{CombineRule, ValidRange};
    use std::collections::BTreeMap;

    fn spec(base: f64, growth: f64, amplitude: f64, period: u32, phase: f64) -> SeriesSpec {
        SeriesSpec {
            name: "s".to_string(),
            base_level: base,
            growth_rate: growth,
            seasonal_amplitude: amplitude,
            seasonal_period: period,
            seasonal_phase: phase,
            noise_stddev: 0.0,
            valid_range: ValidRange::new(f64::NEG_INFINITY, f64::INFINITY),
            sensitivity: BTreeMap::new(),
            combine: CombineRule::Additive { shock_scale: 1.0 },
        }
    }

    #[test]
    fn growth_is_compound_not_linear() {
        let s = spec(100.0, 0.05, 0.0, 12, 0.0);
        let d1 = baseline(&s, 1) - baseline(&s, 0);
        let d2 = baseline(&s, 2) - baseline(&s, 1);
        assert!(d2 > d1, "increments must grow, got {d1} then {d2}");
        assert_relative_eq!(baseline(&s, 2) / baseline(&s, 1), 1.05, max_relative = 1e-12);
        assert_relative_eq!(baseline(&s, 24), 100.0 * 1.05f64.powi(24));
    }

    #[test]
    fn zero_growth_is_flat() {
        let s = spec(42.0, 0.0, 0.0, 12, 0.0);
        for t in 0..36 {
            assert_relative_eq!(baseline(&s, t), 42.0);
        }
    }

    #[test]
    fn seasonal_repeats_with_period() {
        let s = spec(0.0, 0.0, 2.0, 12, 0.0);
        for t in 0..12 {
            assert_relative_eq!(seasonal(&s, t), seasonal(&s, t + 12), epsilon = 1e-12);
            assert!(seasonal(&s, t).abs() <= 2.0 + 1e-12);
        }
        assert_relative_eq!(seasonal(&s, 0), 0.0);
        assert_relative_eq!(seasonal(&s, 3), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn phase_offset_flips_the_cycle() {
        let plain = spec(0.0, 0.0, 1.0, 12, 0.0);
        let shifted = spec(0.0, 0.0, 1.0, 12, std::f64::consts::PI);
        for t in 0..12 {
            assert_relative_eq!(seasonal(&plain, t), -seasonal(&shifted, t), epsilon = 1e-12);
        }
    }
}
