//! Per-step composition of baseline, seasonality, event shocks and noise.

use crate::baseline::{baseline, seasonal};
use crate::decay::impact;
use rand::Rng;
use rand_distr::StandardNormal;
use series_core::{CombineRule, EventRegistry, SeriesSpec, TimeGrid};

/// Breakdown of one composed sample. `value` is unclamped; bounds enforcement
/// is a separate stage. Transient: not retained beyond the output sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Composite {
    /// Trend component.
    pub baseline: f64,
    /// Seasonal component.
    pub seasonal: f64,
    /// Summed signed shock term across active events, before scaling.
    pub event_term: f64,
    /// Gaussian noise draw, already scaled by the series' stddev.
    pub noise: f64,
    /// Combined, unclamped value.
    pub value: f64,
}

/// Signed shock term for `spec` at step `t`: the sum over all events of
/// `direction * impact * sensitivity[category]`. Overlapping events add up
/// (cumulative stress); events sharing a trigger date both apply. Events whose
/// category the series is not sensitive to contribute nothing.
pub fn event_term(spec: &SeriesSpec, t: usize, grid: &TimeGrid, registry: &EventRegistry) -> f64 {
    registry
        .all_events()
        .iter()
        .map(|event| {
            let dt = t as f64 - grid.step_of(event.trigger);
            let envelope = impact(event, dt);
            if envelope == 0.0 {
                return 0.0;
            }
            let sensitivity = spec.sensitivity.get(&event.category).copied().unwrap_or(0.0);
            event.direction.sign() * envelope * sensitivity
        })
        .sum()
}

/// Compose one unclamped sample for `spec` at step `t`, drawing a single
/// noise sample from the supplied generator.
///
/// Additive series: `baseline + seasonal + shocks * shock_scale + noise`.
/// Multiplicative series: `baseline * (1 + seasonal) * (1 + shocks) * (1 + noise)`,
/// with seasonality and noise interpreted as fractions.
pub fn compose<R: Rng + ?Sized>(
    spec: &SeriesSpec,
    t: usize,
    grid: &TimeGrid,
    registry: &EventRegistry,
    rng: &mut R,
) -> Composite {
    let trend = baseline(spec, t);
    let season = seasonal(spec, t);
    let shocks = event_term(spec, t, grid, registry);
    let draw: f64 = rng.sample(StandardNormal);
    let noise = draw * spec.noise_stddev;
    let value = match spec.combine {
        CombineRule::Additive { shock_scale } => trend + season + shocks * shock_scale + noise,
        CombineRule::Multiplicative => trend * (1.0 + season) * (1.0 + shocks) * (1.0 + noise),
    };
    Composite {
        baseline: trend,
        seasonal: season,
        event_term: shocks,
        noise,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use series_core::{
        Cadence, DecayShape, Direction, Event, EventCategory, EventId, ValidRange,
    };
    use std::collections::BTreeMap;

    fn grid() -> TimeGrid {
        TimeGrid::new(
            NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            Cadence::Monthly,
            100,
        )
    }

    fn tariff_at_step_10(magnitude: f64) -> Event {
        let grid = grid();
        Event {
            id: EventId("tariff-round-1".to_string()),
            trigger: grid.date_at(10),
            category: EventCategory::Tariff,
            direction: Direction::Negative,
            base_magnitude: magnitude,
            shape: DecayShape::Exponential { half_life: 6.0 },
            lead_time: 0.0,
            influence_window: 60.0,
        }
    }

    fn flat_spec() -> SeriesSpec {
        SeriesSpec {
            name: "index".to_string(),
            base_level: 100.0,
            growth_rate: 0.0,
            seasonal_amplitude: 0.0,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 0.0,
            valid_range: ValidRange::new(0.0, 200.0),
            sensitivity: BTreeMap::from([(EventCategory::Tariff, 1.0)]),
            combine: CombineRule::Additive { shock_scale: 1.0 },
        }
    }

    #[test]
    fn shock_term_decays_through_half_lives() {
        let registry = EventRegistry::new(vec![tariff_at_step_10(0.15)]).unwrap();
        let spec = flat_spec();
        let g = grid();

        assert_relative_eq!(event_term(&spec, 10, &g, &registry), -0.15);
        assert_relative_eq!(
            event_term(&spec, 16, &g, &registry),
            -0.075,
            max_relative = 1e-12
        );
        assert!(event_term(&spec, 40, &g, &registry).abs() < 0.005);
        // Before the trigger there is no effect.
        assert_eq!(event_term(&spec, 9, &g, &registry), 0.0);
    }

    #[test]
    fn composed_value_includes_scaled_shock() {
        let registry = EventRegistry::new(vec![tariff_at_step_10(0.15)]).unwrap();
        let spec = flat_spec();
        let g = grid();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let c = compose(&spec, 10, &g, &registry, &mut rng);
        assert_relative_eq!(c.baseline, 100.0);
        assert_relative_eq!(c.seasonal, 0.0);
        assert_relative_eq!(c.event_term, -0.15);
        assert_relative_eq!(c.noise, 0.0);
        assert_relative_eq!(c.value, 99.85, max_relative = 1e-12);
    }

    #[test]
    fn overlapping_events_accumulate() {
        let mut second = tariff_at_step_10(0.1);
        second.id = EventId("tariff-round-2".to_string());
        let registry =
            EventRegistry::new(vec![tariff_at_step_10(0.15), second]).unwrap();
        let spec = flat_spec();
        // Same trigger date: both apply, impacts sum rather than max.
        assert_relative_eq!(
            event_term(&spec, 10, &grid(), &registry),
            -0.25,
            max_relative = 1e-12
        );
    }

    #[test]
    fn insensitive_series_ignores_the_event() {
        let registry = EventRegistry::new(vec![tariff_at_step_10(0.15)]).unwrap();
        let mut spec = flat_spec();
        spec.sensitivity = BTreeMap::from([(EventCategory::Pandemic, 2.0)]);
        assert_eq!(event_term(&spec, 10, &grid(), &registry), 0.0);
    }

    #[test]
    fn negative_sensitivity_inverts_the_shock() {
        let registry = EventRegistry::new(vec![tariff_at_step_10(0.2)]).unwrap();
        let mut spec = flat_spec();
        spec.sensitivity = BTreeMap::from([(EventCategory::Tariff, -1.5)]);
        // Suppressive event, inverted sensitivity: the series rises.
        assert_relative_eq!(
            event_term(&spec, 10, &grid(), &registry),
            0.3,
            max_relative = 1e-12
        );
    }

    #[test]
    fn multiplicative_combination() {
        let registry = EventRegistry::new(vec![tariff_at_step_10(0.1)]).unwrap();
        let mut spec = flat_spec();
        spec.base_level = 1000.0;
        spec.seasonal_amplitude = 0.05;
        spec.combine = CombineRule::Multiplicative;
        let g = grid();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let c = compose(&spec, 10, &g, &registry, &mut rng);
        let expected = 1000.0 * (1.0 + c.seasonal) * (1.0 - 0.1);
        assert_relative_eq!(c.value, expected, max_relative = 1e-12);
    }
}
