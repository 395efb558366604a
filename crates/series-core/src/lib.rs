#![deny(warnings)]

//! Core domain models and invariants for trade-pulse.
//!
//! This crate defines the configuration types shared across the workspace
//! (dated events, per-series synthesis specs, the time grid) with validation
//! helpers that reject malformed configuration before any series is
//! generated.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Unique identifier for an event, e.g. "tariff-round-1".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Semantic category of a dated event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventCategory {
    /// Tariff imposition or escalation.
    Tariff,
    /// Trade agreement or de-escalation.
    Agreement,
    /// Pandemic outbreak and its supply disruptions.
    Pandemic,
    /// Election or transition of government.
    Election,
    /// Other policy shift (export controls, memoranda).
    Policy,
}

/// Sign of an event's primary effect on a series with positive sensitivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Lifts affected series (agreements, rebounds).
    Positive,
    /// Suppresses affected series (tariffs, outbreaks).
    Negative,
}

impl Direction {
    /// +1.0 or -1.0 multiplier.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}

/// How an event's impact evolves with distance from the trigger step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecayShape {
    /// Peak at the trigger, halving every `half_life` steps afterwards.
    /// A half-life of zero means a single-step impulse.
    Exponential {
        /// Steps until the impact halves.
        half_life: f64,
    },
    /// Fades linearly toward a floor instead of zero; used for shocks whose
    /// effect settles at a new level rather than vanishing.
    LinearRecovery {
        /// Fraction of the peak recovered per step.
        recovery_rate: f64,
        /// Residual fraction of the peak that never recovers, in [0, 1].
        floor: f64,
    },
}

/// A discrete, dated occurrence that shifts series values for a bounded period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier, unique within a registry.
    pub id: EventId,
    /// Calendar date the event takes effect.
    pub trigger: NaiveDate,
    /// Semantic category, matched against series sensitivities.
    pub category: EventCategory,
    /// Sign of the primary effect.
    pub direction: Direction,
    /// Peak intensity in [0, 1].
    pub base_magnitude: f64,
    /// Post-trigger envelope.
    pub shape: DecayShape,
    /// Steps of pre-event anticipation ramp (0 = none).
    #[serde(default)]
    pub lead_time: f64,
    /// Steps after the trigger beyond which the impact is exactly zero.
    pub influence_window: f64,
}

/// Validation errors for configuration-level invariants. Fatal: raised at
/// setup, before any series generation starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Two events share an id.
    #[error("duplicate event id: {0}")]
    DuplicateEventId(String),
    /// Peak magnitude outside [0, 1].
    #[error("event {0}: base magnitude must be within [0, 1]")]
    MagnitudeOutOfRange(String),
    /// Exponential half-life below zero.
    #[error("event {0}: decay half-life must be >= 0")]
    NegativeHalfLife(String),
    /// Recovery rate below zero or floor outside [0, 1].
    #[error("event {0}: invalid recovery parameters")]
    InvalidRecovery(String),
    /// Lead time or influence window below zero.
    #[error("event {0}: influence window and lead time must be >= 0")]
    NegativeWindow(String),
    /// Empty event or series name.
    #[error("empty name")]
    EmptyName,
    /// Numeric field is NaN or infinite where a finite value is required.
    #[error("non-finite value in {0}")]
    NonFinite(String),
    /// Range with min above max.
    #[error("series {name}: valid range min {min} exceeds max {max}")]
    InvalidRange {
        /// Offending series name.
        name: String,
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },
    /// Seasonal period of zero samples.
    #[error("series {0}: seasonal period must be > 0")]
    ZeroSeasonalPeriod(String),
    /// Negative noise standard deviation.
    #[error("series {0}: noise stddev must be >= 0")]
    NegativeNoise(String),
}

/// Per-series recoverable failures. The caller may skip the series or
/// substitute a fallback; generation of other series continues.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    /// A share group summed to zero; proportions are undefined.
    #[error("share group {0} sums to zero")]
    ZeroShareGroup(String),
    /// The configured range can never contain the series' base level.
    #[error("series {name}: base level {base_level} outside valid range [{min}, {max}]")]
    BaseLevelOutOfRange {
        /// Offending series name.
        name: String,
        /// Configured base level.
        base_level: f64,
        /// Range lower bound.
        min: f64,
        /// Range upper bound.
        max: f64,
    },
}

/// Validate a single event's parameters.
pub fn validate_event(event: &Event) -> Result<(), ConfigError> {
    let id = &event.id.0;
    if id.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    if !event.base_magnitude.is_finite() {
        return Err(ConfigError::NonFinite(format!("event {id}")));
    }
    if !(0.0..=1.0).contains(&event.base_magnitude) {
        return Err(ConfigError::MagnitudeOutOfRange(id.clone()));
    }
    match event.shape {
        DecayShape::Exponential { half_life } => {
            if !half_life.is_finite() {
                return Err(ConfigError::NonFinite(format!("event {id}")));
            }
            if half_life < 0.0 {
                return Err(ConfigError::NegativeHalfLife(id.clone()));
            }
        }
        DecayShape::LinearRecovery {
            recovery_rate,
            floor,
        } => {
            if !(recovery_rate.is_finite() && floor.is_finite()) {
                return Err(ConfigError::NonFinite(format!("event {id}")));
            }
            if recovery_rate < 0.0 || !(0.0..=1.0).contains(&floor) {
                return Err(ConfigError::InvalidRecovery(id.clone()));
            }
        }
    }
    if !(event.lead_time.is_finite() && event.influence_window.is_finite()) {
        return Err(ConfigError::NonFinite(format!("event {id}")));
    }
    if event.lead_time < 0.0 || event.influence_window < 0.0 {
        return Err(ConfigError::NegativeWindow(id.clone()));
    }
    Ok(())
}

/// Ordered, validated collection of events. Pure lookup structure: events are
/// immutable once the registry is built. Deliberately not deserializable;
/// construction goes through [`EventRegistry::new`] so the invariants hold.
#[derive(Clone, Debug)]
pub struct EventRegistry {
    events: Vec<Event>,
}

impl EventRegistry {
    /// Build a registry, validating every event and rejecting duplicate ids.
    /// Events are kept sorted by trigger date.
    pub fn new(mut events: Vec<Event>) -> Result<Self, ConfigError> {
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        for event in &events {
            validate_event(event)?;
            if !ids.insert(event.id.0.as_str()) {
                return Err(ConfigError::DuplicateEventId(event.id.0.clone()));
            }
        }
        events.sort_by(|a, b| (a.trigger, &a.id).cmp(&(b.trigger, &b.id)));
        tracing::debug!(count = events.len(), "event registry built");
        Ok(Self { events })
    }

    /// All events, ascending by trigger date.
    pub fn all_events(&self) -> &[Event] {
        &self.events
    }

    /// Events within `max_days` of `date`, sorted by ascending distance.
    /// Ties are broken by id so the order is total.
    pub fn events_near(&self, date: NaiveDate, max_days: i64) -> Vec<&Event> {
        let mut near: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| (date - e.trigger).num_days().abs() <= max_days)
            .collect();
        near.sort_by(|a, b| {
            let da = (date - a.trigger).num_days().abs();
            let db = (date - b.trigger).num_days().abs();
            (da, &a.id).cmp(&(db, &b.id))
        });
        near
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the registry holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Inclusive bounds a generated value must stay within. Open-ended ranges use
/// infinities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValidRange {
    /// Range covering the given bounds.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Saturate `value` into the bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// How baseline, seasonality, shocks and noise combine into one value.
/// Declared per series rather than branched on in code.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CombineRule {
    /// Level-type series (trade values, indices): terms are added, with the
    /// dimensionless shock term scaled into level units.
    Additive {
        /// Level units per unit of shock term.
        shock_scale: f64,
    },
    /// Ratio/rate-type series: seasonality, shocks and noise act as fractional
    /// multipliers on the baseline.
    Multiplicative,
}

/// Configuration for one synthesized output metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Output metric name, e.g. "us_exports".
    pub name: String,
    /// Level at step 0 before seasonality, shocks and noise.
    pub base_level: f64,
    /// Per-step compound growth rate (0.004 = 0.4% per step).
    pub growth_rate: f64,
    /// Seasonal swing: level units for additive series, fraction of baseline
    /// for multiplicative ones.
    pub seasonal_amplitude: f64,
    /// Samples per seasonal cycle (12 for monthly data with a yearly season).
    pub seasonal_period: u32,
    /// Phase offset of the seasonal sinusoid, radians.
    #[serde(default)]
    pub seasonal_phase: f64,
    /// Standard deviation of the per-step Gaussian noise draw.
    pub noise_stddev: f64,
    /// Bounds enforced on every emitted value.
    pub valid_range: ValidRange,
    /// Per-category shock multiplier; absent categories do not affect the
    /// series. Negative entries invert an event's effect (e.g. unemployment
    /// rises on suppressive events).
    #[serde(default)]
    pub sensitivity: BTreeMap<EventCategory, f64>,
    /// Combination rule for this series.
    pub combine: CombineRule,
}

/// Validate a series spec.
pub fn validate_series_spec(spec: &SeriesSpec) -> Result<(), ConfigError> {
    if spec.name.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    let finite = spec.base_level.is_finite()
        && spec.growth_rate.is_finite()
        && spec.seasonal_amplitude.is_finite()
        && spec.seasonal_phase.is_finite()
        && spec.noise_stddev.is_finite();
    if !finite {
        return Err(ConfigError::NonFinite(format!("series {}", spec.name)));
    }
    if spec.valid_range.min.is_nan() || spec.valid_range.max.is_nan() {
        return Err(ConfigError::NonFinite(format!("series {}", spec.name)));
    }
    if spec.valid_range.min > spec.valid_range.max {
        return Err(ConfigError::InvalidRange {
            name: spec.name.clone(),
            min: spec.valid_range.min,
            max: spec.valid_range.max,
        });
    }
    if spec.seasonal_period == 0 {
        return Err(ConfigError::ZeroSeasonalPeriod(spec.name.clone()));
    }
    if spec.noise_stddev < 0.0 {
        return Err(ConfigError::NegativeNoise(spec.name.clone()));
    }
    for mult in spec.sensitivity.values() {
        if !mult.is_finite() {
            return Err(ConfigError::NonFinite(format!("series {}", spec.name)));
        }
    }
    Ok(())
}

/// Spacing of an evenly sampled time grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    /// Seven-day steps.
    Weekly,
    /// Calendar-month steps.
    Monthly,
    /// Calendar-year steps.
    Yearly,
}

/// Shift a date forward by whole calendar months, clamping the day into the
/// target month where needed.
fn add_months(start: NaiveDate, months: i32) -> NaiveDate {
    let zero_based = start.year() * 12 + start.month0() as i32 + months;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = start.day();
    (0..4)
        .filter_map(|back| NaiveDate::from_ymd_opt(year, month, day.saturating_sub(back)))
        .next()
        .unwrap_or(start)
}

/// Evenly spaced sequence of sample dates. Step `t` is an ordinal position;
/// `date_at` and `step_of` convert between ordinals and calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Date of step 0.
    pub start: NaiveDate,
    /// Step spacing.
    pub cadence: Cadence,
    /// Number of steps.
    pub len: usize,
}

impl TimeGrid {
    /// Grid starting at `start` with `len` steps at the given cadence.
    pub fn new(start: NaiveDate, cadence: Cadence, len: usize) -> Self {
        Self {
            start,
            cadence,
            len,
        }
    }

    /// Calendar date of step `t`.
    pub fn date_at(&self, t: usize) -> NaiveDate {
        let t = t as i32;
        match self.cadence {
            Cadence::Weekly => self.start + Duration::weeks(t as i64),
            Cadence::Monthly => add_months(self.start, t),
            Cadence::Yearly => add_months(self.start, 12 * t),
        }
    }

    /// Signed step position of a calendar date on this grid. May be negative
    /// or beyond `len` for dates outside the sampled range; monthly and
    /// yearly positions count whole calendar periods, weekly positions round
    /// to the nearest week.
    pub fn step_of(&self, date: NaiveDate) -> f64 {
        match self.cadence {
            Cadence::Weekly => {
                let days = (date - self.start).num_days() as f64;
                (days / 7.0).round()
            }
            Cadence::Monthly => {
                let months = (date.year() - self.start.year()) * 12
                    + (date.month() as i32 - self.start.month() as i32);
                months as f64
            }
            Cadence::Yearly => (date.year() - self.start.year()) as f64,
        }
    }

    /// All sample dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.len).map(|t| self.date_at(t)).collect()
    }
}

/// One emitted sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Sample date.
    pub date: NaiveDate,
    /// Clamped value.
    pub value: f64,
}

/// A named, time-indexed output sequence handed to the serialization layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Metric name.
    pub name: String,
    /// Samples in grid order.
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// Values without dates, in grid order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
