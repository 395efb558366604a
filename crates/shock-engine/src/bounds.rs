//! Bounds enforcement and sibling-ratio normalization.

use series_core::{DomainError, SeriesSpec};
use std::collections::BTreeMap;

/// Saturate a composed value into the series' valid range.
pub fn clamp(spec: &SeriesSpec, value: f64) -> f64 {
    spec.valid_range.clamp(value)
}

/// Rescale a group of sibling ratios so they sum to 1, preserving relative
/// proportions. Fails with [`DomainError::ZeroShareGroup`] when the group sums
/// to zero (undefined proportions); the caller substitutes
/// [`uniform_shares`] in that case.
pub fn normalize_shares(
    shares: &BTreeMap<String, f64>,
    group: &str,
) -> Result<BTreeMap<String, f64>, DomainError> {
    let total: f64 = shares.values().sum();
    if total <= 0.0 {
        return Err(DomainError::ZeroShareGroup(group.to_string()));
    }
    Ok(shares
        .iter()
        .map(|(name, value)| (name.clone(), value / total))
        .collect())
}

/// Equal shares across the given names, summing to 1.
pub fn uniform_shares<'a, I>(names: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    let share = 1.0 / names.len().max(1) as f64;
    names
        .into_iter()
        .map(|name| (name.to_string(), share))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use series_core::{CombineRule, ValidRange};

    fn bounded_spec(min: f64, max: f64) -> SeriesSpec {
        SeriesSpec {
            name: "bounded".to_string(),
            base_level: 50.0,
            growth_rate: 0.0,
            seasonal_amplitude: 0.0,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 0.0,
            valid_range: ValidRange::new(min, max),
            sensitivity: BTreeMap::new(),
            combine: CombineRule::Additive { shock_scale: 1.0 },
        }
    }

    #[test]
    fn clamp_saturates_both_ends() {
        let spec = bounded_spec(0.0, 100.0);
        assert_eq!(clamp(&spec, -12.0), 0.0);
        assert_eq!(clamp(&spec, 150.0), 100.0);
        assert_eq!(clamp(&spec, 42.5), 42.5);
    }

    #[test]
    fn clamp_with_open_upper_bound() {
        let spec = bounded_spec(0.0, f64::INFINITY);
        assert_eq!(clamp(&spec, 1e12), 1e12);
        assert_eq!(clamp(&spec, -3.0), 0.0);
    }

    #[test]
    fn shares_rescale_preserving_proportions() {
        let shares = BTreeMap::from([
            ("pos".to_string(), 0.7),
            ("neg".to_string(), 0.5),
            ("neu".to_string(), 0.0),
        ]);
        let normalized = normalize_shares(&shares, "sentiment").unwrap();
        assert_relative_eq!(normalized["pos"], 0.7 / 1.2, max_relative = 1e-12);
        assert_relative_eq!(normalized["neg"], 0.5 / 1.2, max_relative = 1e-12);
        assert_relative_eq!(normalized["neu"], 0.0);
        let sum: f64 = normalized.values().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_sum_group_is_a_domain_error() {
        let shares = BTreeMap::from([("a".to_string(), 0.0), ("b".to_string(), 0.0)]);
        assert_eq!(
            normalize_shares(&shares, "sentiment"),
            Err(DomainError::ZeroShareGroup("sentiment".to_string()))
        );
    }

    #[test]
    fn uniform_fallback_sums_to_one() {
        let uniform = uniform_shares(["pos", "neg", "neu"]);
        assert_eq!(uniform.len(), 3);
        for value in uniform.values() {
            assert_relative_eq!(*value, 1.0 / 3.0);
        }
    }

    proptest! {
        #[test]
        fn normalized_shares_sum_to_one(
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
            c in 0.0f64..1.0,
        ) {
            prop_assume!(a + b + c > 1e-9);
            let shares = BTreeMap::from([
                ("a".to_string(), a),
                ("b".to_string(), b),
                ("c".to_string(), c),
            ]);
            let normalized = normalize_shares(&shares, "g").unwrap();
            let sum: f64 = normalized.values().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
