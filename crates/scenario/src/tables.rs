//! Built-in trade-dispute scenario: event timelines and series tables for a
//! 2017-2025 narrative between two large economies. Base levels, shock sizes
//! and seasonal swings are tuned to read like published monthly statistics.

use crate::{RegionSpec, Scenario, ShareGroup};
use chrono::NaiveDate;
use series_core::{
    Cadence, CombineRule, DecayShape, Direction, Event, EventCategory, EventId, SeriesSpec,
    TimeGrid, ValidRange,
};
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_3, PI};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn exponential(
    id: &str,
    trigger: NaiveDate,
    category: EventCategory,
    direction: Direction,
    magnitude: f64,
    half_life: f64,
    window: f64,
) -> Event {
    Event {
        id: EventId(id.to_string()),
        trigger,
        category,
        direction,
        base_magnitude: magnitude,
        shape: DecayShape::Exponential { half_life },
        lead_time: 0.0,
        influence_window: window,
    }
}

/// Dispute timeline with decay parameters in monthly steps.
fn monthly_events() -> Vec<Event> {
    use Direction::*;
    use EventCategory::*;
    let mut events = vec![
        exponential("memorandum", date(2018, 3, 22), Policy, Negative, 0.05, 3.0, 12.0),
        exponential("tariff-round-1", date(2018, 7, 6), Tariff, Negative, 0.15, 6.0, 36.0),
        exponential("tariff-round-2", date(2018, 8, 23), Tariff, Negative, 0.08, 5.0, 30.0),
        exponential("tariff-round-3", date(2018, 9, 24), Tariff, Negative, 0.12, 6.0, 36.0),
        exponential("tariff-escalation", date(2019, 5, 10), Tariff, Negative, 0.10, 6.0, 36.0),
        exponential("tariff-round-4", date(2019, 9, 1), Tariff, Negative, 0.07, 5.0, 30.0),
        exponential("covid-outbreak", date(2020, 3, 1), Pandemic, Negative, 0.25, 12.0, 48.0),
        exponential("post-covid-rebound", date(2021, 1, 20), Policy, Positive, 0.20, 9.0, 36.0),
        exponential("chip-export-controls", date(2022, 10, 7), Policy, Negative, 0.10, 8.0, 36.0),
        exponential("tariff-round-5", date(2024, 6, 15), Tariff, Negative, 0.09, 4.0, 24.0),
        exponential("inauguration", date(2025, 1, 20), Election, Positive, 0.08, 6.0, 24.0),
    ];
    // The phase-one deal settles into a lasting partial lift rather than
    // fading to zero.
    events.push(Event {
        id: EventId("phase-one-agreement".to_string()),
        trigger: date(2020, 1, 15),
        category: EventCategory::Agreement,
        direction: Direction::Positive,
        base_magnitude: 0.10,
        shape: DecayShape::LinearRecovery {
            recovery_rate: 0.04,
            floor: 0.3,
        },
        lead_time: 0.0,
        influence_window: 48.0,
    });
    // Election uncertainty builds ahead of the vote and clears quickly.
    events.push(Event {
        id: EventId("us-election".to_string()),
        trigger: date(2024, 11, 5),
        category: EventCategory::Election,
        direction: Direction::Negative,
        base_magnitude: 0.04,
        shape: DecayShape::Exponential { half_life: 2.0 },
        lead_time: 2.0,
        influence_window: 4.0,
    });
    events
}

/// Condensed timeline for yearly-cadence series, decay parameters in yearly
/// steps.
fn yearly_events() -> Vec<Event> {
    use Direction::*;
    use EventCategory::*;
    vec![
        exponential("trade-war-onset", date(2018, 7, 6), Tariff, Negative, 0.30, 2.0, 8.0),
        exponential("tariff-escalation", date(2019, 5, 10), Tariff, Negative, 0.25, 2.0, 7.0),
        exponential("phase-one-agreement", date(2020, 1, 15), Agreement, Positive, 0.20, 2.0, 6.0),
        exponential("covid-outbreak", date(2020, 3, 1), Pandemic, Negative, 0.30, 1.5, 5.0),
        exponential("chip-export-controls", date(2022, 10, 7), Policy, Negative, 0.20, 2.0, 4.0),
        exponential("tariff-round-5", date(2024, 6, 15), Tariff, Negative, 0.25, 2.0, 3.0),
    ]
}

fn sensitivity(entries: &[(EventCategory, f64)]) -> BTreeMap<EventCategory, f64> {
    entries.iter().copied().collect()
}

/// Monthly bilateral trade values in millions of dollars. Multiplicative:
/// shocks and seasonality act as fractions of the trend.
fn trade_specs() -> Vec<SeriesSpec> {
    use EventCategory::*;
    vec![
        SeriesSpec {
            name: "us_exports".to_string(),
            base_level: 10_833.0,
            growth_rate: 0.004,
            seasonal_amplitude: 0.12,
            seasonal_period: 12,
            seasonal_phase: -2.0 * FRAC_PI_3,
            noise_stddev: 0.03,
            valid_range: ValidRange::new(0.0, f64::INFINITY),
            sensitivity: sensitivity(&[
                (Tariff, 1.0),
                (Agreement, 0.8),
                (Pandemic, 1.4),
                (Policy, 0.6),
                (Election, 0.1),
            ]),
            combine: CombineRule::Multiplicative,
        },
        SeriesSpec {
            name: "us_imports".to_string(),
            base_level: 41_667.0,
            growth_rate: 0.004,
            seasonal_amplitude: 0.15,
            seasonal_period: 12,
            seasonal_phase: -2.0 * FRAC_PI_3,
            noise_stddev: 0.03,
            valid_range: ValidRange::new(0.0, f64::INFINITY),
            sensitivity: sensitivity(&[
                (Tariff, 0.8),
                (Agreement, 0.5),
                (Pandemic, 1.0),
                (Policy, 0.5),
                (Election, 0.1),
            ]),
            combine: CombineRule::Multiplicative,
        },
    ]
}

/// Monthly consumer confidence indices, additive around their long-run base.
fn confidence_specs() -> Vec<SeriesSpec> {
    use EventCategory::*;
    vec![
        SeriesSpec {
            name: "us_consumer_confidence".to_string(),
            base_level: 95.0,
            growth_rate: 0.0001,
            seasonal_amplitude: 2.0,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 2.0,
            valid_range: ValidRange::new(40.0, 140.0),
            sensitivity: sensitivity(&[
                (Tariff, 0.6),
                (Agreement, 0.5),
                (Pandemic, 1.3),
                (Election, 1.8),
                (Policy, 0.4),
            ]),
            combine: CombineRule::Additive { shock_scale: 55.0 },
        },
        SeriesSpec {
            name: "cn_consumer_confidence".to_string(),
            base_level: 120.0,
            growth_rate: 0.00015,
            seasonal_amplitude: 1.5,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 2.5,
            valid_range: ValidRange::new(40.0, 160.0),
            sensitivity: sensitivity(&[
                (Tariff, 1.0),
                (Agreement, 0.4),
                (Pandemic, 1.0),
                (Election, 0.2),
                (Policy, 0.7),
            ]),
            combine: CombineRule::Additive { shock_scale: 55.0 },
        },
    ]
}

/// Social-media sentiment shares. The positive and negative cycles run in
/// antiphase; neutral chatter is a thin, optional third sibling. Negative
/// sensitivities make a suppressive event raise the negative share.
fn sentiment_group() -> ShareGroup {
    use EventCategory::*;
    ShareGroup {
        name: "sentiment".to_string(),
        members: vec![
            SeriesSpec {
                name: "positive_share".to_string(),
                base_level: 0.5,
                growth_rate: 0.0,
                seasonal_amplitude: 0.1,
                seasonal_period: 12,
                seasonal_phase: 0.0,
                noise_stddev: 0.05,
                valid_range: ValidRange::new(0.0, 1.0),
                sensitivity: sensitivity(&[
                    (Tariff, 1.0),
                    (Agreement, 0.67),
                    (Pandemic, 0.8),
                    (Election, 0.3),
                    (Policy, 0.7),
                ]),
                combine: CombineRule::Additive { shock_scale: 1.0 },
            },
            SeriesSpec {
                name: "negative_share".to_string(),
                base_level: 0.3,
                growth_rate: 0.0,
                seasonal_amplitude: 0.1,
                seasonal_period: 12,
                seasonal_phase: PI,
                noise_stddev: 0.05,
                valid_range: ValidRange::new(0.0, 1.0),
                sensitivity: sensitivity(&[
                    (Tariff, -1.33),
                    (Agreement, -0.67),
                    (Pandemic, -1.0),
                    (Election, -0.4),
                    (Policy, -0.9),
                ]),
                combine: CombineRule::Additive { shock_scale: 1.0 },
            },
            SeriesSpec {
                name: "neutral_share".to_string(),
                base_level: 0.1,
                growth_rate: 0.0,
                seasonal_amplitude: 0.0,
                seasonal_period: 12,
                seasonal_phase: 0.0,
                noise_stddev: 0.02,
                valid_range: ValidRange::new(0.0, 1.0),
                sensitivity: sensitivity(&[
                    (Tariff, 0.33),
                    (Agreement, -0.5),
                    (Pandemic, 0.2),
                    (Election, 0.25),
                ]),
                combine: CombineRule::Additive { shock_scale: 1.0 },
            },
        ],
    }
}

/// Monthly strategic-resource series: supply tonnage, import dependency and a
/// bilateral conflict risk index.
fn strategic_specs() -> Vec<SeriesSpec> {
    use EventCategory::*;
    vec![
        SeriesSpec {
            name: "rare_earth_supply".to_string(),
            base_level: 15_000.0,
            growth_rate: 0.002,
            seasonal_amplitude: 0.0,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 0.033,
            valid_range: ValidRange::new(0.0, f64::INFINITY),
            sensitivity: sensitivity(&[
                (Tariff, 0.35),
                (Agreement, 0.25),
                (Pandemic, 0.3),
                (Policy, 0.5),
            ]),
            combine: CombineRule::Multiplicative,
        },
        SeriesSpec {
            name: "us_rare_earth_dependency".to_string(),
            base_level: 0.85,
            growth_rate: -0.0025,
            seasonal_amplitude: 0.0,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 0.02,
            valid_range: ValidRange::new(0.0, 1.0),
            sensitivity: sensitivity(&[
                (Tariff, 0.4),
                (Agreement, 0.3),
                (Pandemic, 0.1),
                (Policy, 0.5),
            ]),
            combine: CombineRule::Additive { shock_scale: 1.0 },
        },
        SeriesSpec {
            name: "conflict_risk".to_string(),
            base_level: 0.2,
            growth_rate: 0.0,
            seasonal_amplitude: 0.05,
            seasonal_period: 12,
            seasonal_phase: 0.0,
            noise_stddev: 0.05,
            valid_range: ValidRange::new(0.0, 1.0),
            sensitivity: sensitivity(&[
                (Tariff, -1.0),
                (Agreement, -1.0),
                (Pandemic, -0.4),
                (Election, -0.5),
                (Policy, -0.8),
            ]),
            combine: CombineRule::Additive { shock_scale: 1.0 },
        },
    ]
}

/// Regional table: coastal manufacturing belts carry the highest trade
/// exposure, interior regions the lowest.
fn region_specs() -> Vec<RegionSpec> {
    let rows: [(&str, f64, f64, f64, f64); 7] = [
        ("coastal-east", 7.6, 3.1, 45.0, 1.5),
        ("coastal-south", 8.0, 3.2, 48.0, 1.5),
        ("north", 6.6, 3.4, 32.0, 1.2),
        ("northeast", 5.3, 4.9, 28.0, 1.2),
        ("central", 7.9, 3.7, 25.0, 0.8),
        ("southwest", 8.6, 4.0, 22.0, 0.8),
        ("northwest", 8.1, 3.9, 20.0, 0.8),
    ];
    rows.iter()
        .map(|&(name, growth, unemployment, dependency, exposure)| RegionSpec {
            name: name.to_string(),
            base_gdp_growth: growth,
            base_unemployment: unemployment,
            base_trade_dependency: dependency,
            exposure,
        })
        .collect()
}

/// The built-in scenario: monthly data from 2017-01 through 2025-04, yearly
/// regional data from 2017 through 2025.
pub fn trade_dispute() -> Scenario {
    Scenario {
        monthly: TimeGrid::new(date(2017, 1, 1), Cadence::Monthly, 100),
        yearly: TimeGrid::new(date(2017, 1, 1), Cadence::Yearly, 9),
        monthly_events: monthly_events(),
        yearly_events: yearly_events(),
        trade: trade_specs(),
        confidence: confidence_specs(),
        sentiment: sentiment_group(),
        strategic: strategic_specs(),
        regions: region_specs(),
    }
}
