#![deny(warnings)]

//! Scenario layer for trade-pulse: the concrete event timelines and series
//! tables describing a two-economy trade dispute, plus a YAML loader for
//! custom scenarios and the driver that turns a scenario into generated
//! datasets.

use serde::{Deserialize, Serialize};
use series_core::{
    ConfigError, DomainError, Event, EventRegistry, Series, SeriesSpec, TimeGrid,
    validate_series_spec,
};
use shock_engine::{generate, generate_shares, mix_seed};
use std::collections::BTreeMap;
use thiserror::Error;

mod tables;

pub use tables::trade_dispute;

/// Errors raised while loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Malformed events or series specs; fatal, caught before generation.
    #[error("invalid scenario configuration: {0}")]
    Config(#[from] ConfigError),
    /// Per-series generation failure.
    #[error("series generation failed: {0}")]
    Domain(#[from] DomainError),
    /// Unparseable scenario file.
    #[error("failed to parse scenario: {0}")]
    Parse(String),
}

/// A group of sibling ratio series renormalized to sum to 1 at every step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShareGroup {
    /// Group name, used in logs and errors.
    pub name: String,
    /// Member specs; each must be bounded to [0, 1].
    pub members: Vec<SeriesSpec>,
}

/// Per-region parameters for the yearly regional dataset. The exposure factor
/// scales how strongly the region's series react to events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Region name, e.g. "coastal-east".
    pub name: String,
    /// GDP growth in percent at the base year.
    pub base_gdp_growth: f64,
    /// Unemployment rate in percent at the base year.
    pub base_unemployment: f64,
    /// External trade dependency in percent at the base year.
    pub base_trade_dependency: f64,
    /// Trade-exposure multiplier applied to event sensitivities.
    pub exposure: f64,
}

impl RegionSpec {
    fn sensitivity(
        &self,
        multipliers: &[(series_core::EventCategory, f64)],
    ) -> BTreeMap<series_core::EventCategory, f64> {
        multipliers
            .iter()
            .map(|&(category, mult)| (category, mult * self.exposure))
            .collect()
    }

    /// Yearly GDP growth series: compound slowdown plus event drag.
    pub fn gdp_growth_spec(&self) -> SeriesSpec {
        use series_core::EventCategory::*;
        SeriesSpec {
            name: format!("{}_gdp_growth", self.name),
            base_level: self.base_gdp_growth,
            growth_rate: -0.05,
            seasonal_amplitude: 0.0,
            seasonal_period: 1,
            seasonal_phase: 0.0,
            noise_stddev: 0.3,
            valid_range: series_core::ValidRange::new(0.0, 15.0),
            sensitivity: self.sensitivity(&[
                (Tariff, 1.2),
                (Agreement, 0.8),
                (Pandemic, 1.0),
                (Policy, 0.8),
            ]),
            combine: series_core::CombineRule::Additive { shock_scale: 4.0 },
        }
    }

    /// Yearly unemployment series; rises when suppressive events hit, hence
    /// the inverted sensitivities.
    pub fn unemployment_spec(&self) -> SeriesSpec {
        use series_core::EventCategory::*;
        SeriesSpec {
            name: format!("{}_unemployment", self.name),
            base_level: self.base_unemployment,
            growth_rate: 0.0,
            seasonal_amplitude: 0.0,
            seasonal_period: 1,
            seasonal_phase: 0.0,
            noise_stddev: 0.2,
            valid_range: series_core::ValidRange::new(0.0, 15.0),
            sensitivity: self.sensitivity(&[
                (Tariff, -1.0),
                (Agreement, -0.6),
                (Pandemic, -0.9),
                (Policy, -0.5),
            ]),
            combine: series_core::CombineRule::Additive { shock_scale: 2.0 },
        }
    }

    /// Yearly external trade dependency in percent; erodes as the dispute
    /// drags on.
    pub fn trade_dependency_spec(&self) -> SeriesSpec {
        use series_core::EventCategory::*;
        SeriesSpec {
            name: format!("{}_trade_dependency", self.name),
            base_level: self.base_trade_dependency,
            growth_rate: -0.01,
            seasonal_amplitude: 0.0,
            seasonal_period: 1,
            seasonal_phase: 0.0,
            noise_stddev: 1.0,
            valid_range: series_core::ValidRange::new(0.0, 100.0),
            sensitivity: self.sensitivity(&[
                (Tariff, 1.0),
                (Agreement, 0.5),
                (Policy, 0.8),
            ]),
            combine: series_core::CombineRule::Additive { shock_scale: 8.0 },
        }
    }
}

/// A complete, serde round-trippable scenario: time grids, event timelines
/// and every series table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Grid for the monthly datasets.
    pub monthly: TimeGrid,
    /// Grid for the yearly regional dataset.
    pub yearly: TimeGrid,
    /// Events with decay parameters in monthly steps.
    pub monthly_events: Vec<Event>,
    /// Condensed events with decay parameters in yearly steps.
    pub yearly_events: Vec<Event>,
    /// Bilateral trade value series (monthly).
    pub trade: Vec<SeriesSpec>,
    /// Consumer confidence indices (monthly).
    pub confidence: Vec<SeriesSpec>,
    /// Sentiment share triple (monthly ratio group).
    pub sentiment: ShareGroup,
    /// Strategic resource series (monthly).
    pub strategic: Vec<SeriesSpec>,
    /// Regional parameters (yearly).
    pub regions: Vec<RegionSpec>,
}

impl Scenario {
    /// Parse a scenario from YAML and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario =
            serde_yaml::from_str(text).map_err(|e| ScenarioError::Parse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check every event table and series spec; returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EventRegistry::new(self.monthly_events.clone())?;
        EventRegistry::new(self.yearly_events.clone())?;
        for spec in self.all_specs() {
            validate_series_spec(&spec)?;
        }
        Ok(())
    }

    fn all_specs(&self) -> Vec<SeriesSpec> {
        let mut specs: Vec<SeriesSpec> = Vec::new();
        specs.extend(self.trade.iter().cloned());
        specs.extend(self.confidence.iter().cloned());
        specs.extend(self.sentiment.members.iter().cloned());
        specs.extend(self.strategic.iter().cloned());
        for region in &self.regions {
            specs.push(region.gdp_growth_spec());
            specs.push(region.unemployment_spec());
            specs.push(region.trade_dependency_spec());
        }
        specs
    }

    /// Generate every dataset of the scenario from one master seed. Each
    /// series draws from its own derived sub-seed, so adding a series leaves
    /// earlier streams untouched within its dataset ordering.
    pub fn generate(&self, seed: u64) -> Result<Bundle, ScenarioError> {
        self.validate()?;
        let monthly_registry = EventRegistry::new(self.monthly_events.clone())?;
        let yearly_registry = EventRegistry::new(self.yearly_events.clone())?;

        let mut stream = 0u64;
        let mut next_seed = || {
            let s = mix_seed(seed, stream);
            stream += 1;
            s
        };

        let mut trade = Vec::with_capacity(self.trade.len());
        for spec in &self.trade {
            trade.push(generate(spec, &self.monthly, &monthly_registry, next_seed())?);
        }
        let mut confidence = Vec::with_capacity(self.confidence.len());
        for spec in &self.confidence {
            confidence.push(generate(spec, &self.monthly, &monthly_registry, next_seed())?);
        }
        let sentiment = generate_shares(
            &self.sentiment.members,
            &self.sentiment.name,
            &self.monthly,
            &monthly_registry,
            next_seed(),
        )?;
        let mut strategic = Vec::with_capacity(self.strategic.len());
        for spec in &self.strategic {
            strategic.push(generate(spec, &self.monthly, &monthly_registry, next_seed())?);
        }

        let years: Vec<i32> = self
            .yearly
            .dates()
            .iter()
            .map(|d| chrono::Datelike::year(d))
            .collect();
        let mut regional = RegionalData {
            regions: self.regions.iter().map(|r| r.name.clone()).collect(),
            years,
            gdp_growth: BTreeMap::new(),
            unemployment: BTreeMap::new(),
            trade_dependency: BTreeMap::new(),
        };
        for region in &self.regions {
            let growth = generate(
                &region.gdp_growth_spec(),
                &self.yearly,
                &yearly_registry,
                next_seed(),
            )?;
            let unemployment = generate(
                &region.unemployment_spec(),
                &self.yearly,
                &yearly_registry,
                next_seed(),
            )?;
            let dependency = generate(
                &region.trade_dependency_spec(),
                &self.yearly,
                &yearly_registry,
                next_seed(),
            )?;
            regional
                .gdp_growth
                .insert(region.name.clone(), growth.values());
            regional
                .unemployment
                .insert(region.name.clone(), unemployment.values());
            regional
                .trade_dependency
                .insert(region.name.clone(), dependency.values());
        }

        tracing::info!(
            monthly_series = trade.len() + confidence.len() + sentiment.len() + strategic.len(),
            regions = self.regions.len(),
            "scenario generated"
        );
        Ok(Bundle {
            trade,
            confidence,
            sentiment,
            strategic,
            regional,
        })
    }
}

/// All generated datasets of one scenario run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bundle {
    /// Bilateral trade values (monthly).
    pub trade: Vec<Series>,
    /// Consumer confidence indices (monthly).
    pub confidence: Vec<Series>,
    /// Normalized sentiment shares (monthly), summing to 1 per step.
    pub sentiment: Vec<Series>,
    /// Strategic resource series (monthly).
    pub strategic: Vec<Series>,
    /// Regional metrics keyed by region (yearly).
    pub regional: RegionalData,
}

/// Regional dataset laid out for JSON output: parallel year axis plus one
/// value vector per region and metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionalData {
    /// Region names in table order.
    pub regions: Vec<String>,
    /// Calendar years of the yearly grid.
    pub years: Vec<i32>,
    /// GDP growth percent per region.
    pub gdp_growth: BTreeMap<String, Vec<f64>>,
    /// Unemployment percent per region.
    pub unemployment: BTreeMap<String, Vec<f64>>,
    /// Trade dependency percent per region.
    pub trade_dependency: BTreeMap<String, Vec<f64>>,
}
