#![deny(warnings)]

//! Headless CLI: generates every dataset of a scenario and writes them as
//! CSV/JSON flat files.

use anyhow::{Context, Result};
use scenario::{trade_dispute, Bundle, Scenario};
use series_core::{EventRegistry, Series};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (PathBuf, u64, Option<PathBuf>) {
    let mut out = PathBuf::from("data");
    let mut seed: u64 = 42;
    let mut scenario_path: Option<PathBuf> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--out" => {
                if let Some(dir) = it.next() {
                    out = PathBuf::from(dir);
                }
            }
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()).unwrap_or(seed),
            "--scenario" => scenario_path = it.next().map(PathBuf::from),
            _ => {}
        }
    }
    (out, seed, scenario_path)
}

fn series<'a>(list: &'a [Series], name: &str) -> Result<&'a Series> {
    list.iter()
        .find(|s| s.name == name)
        .with_context(|| format!("series {name} missing from bundle"))
}

/// Nearest event id within `max_days` of `date`, for the annotation column.
fn nearest_event(registry: &EventRegistry, date: chrono::NaiveDate, max_days: i64) -> String {
    registry
        .events_near(date, max_days)
        .first()
        .map(|e| e.id.0.clone())
        .unwrap_or_default()
}

fn write_trade_csv(path: &Path, bundle: &Bundle, registry: &EventRegistry) -> Result<()> {
    let exports = series(&bundle.trade, "us_exports")?;
    let imports = series(&bundle.trade, "us_imports")?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "us_exports", "us_imports", "trade_balance", "event"])?;
    for (e, i) in exports.points.iter().zip(&imports.points) {
        writer.write_record([
            e.date.to_string(),
            format!("{:.1}", e.value),
            format!("{:.1}", i.value),
            format!("{:.1}", e.value - i.value),
            nearest_event(registry, e.date, 15),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_sentiment_csv(path: &Path, bundle: &Bundle) -> Result<()> {
    let us = series(&bundle.confidence, "us_consumer_confidence")?;
    let cn = series(&bundle.confidence, "cn_consumer_confidence")?;
    let pos = series(&bundle.sentiment, "positive_share")?;
    let neg = series(&bundle.sentiment, "negative_share")?;
    let neu = series(&bundle.sentiment, "neutral_share")?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "us_consumer_confidence",
        "cn_consumer_confidence",
        "positive_share",
        "negative_share",
        "neutral_share",
    ])?;
    for t in 0..us.points.len() {
        writer.write_record([
            us.points[t].date.to_string(),
            format!("{:.1}", us.points[t].value),
            format!("{:.1}", cn.points[t].value),
            format!("{:.3}", pos.points[t].value),
            format!("{:.3}", neg.points[t].value),
            format!("{:.3}", neu.points[t].value),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_strategic_csv(path: &Path, bundle: &Bundle) -> Result<()> {
    let supply = series(&bundle.strategic, "rare_earth_supply")?;
    let dependency = series(&bundle.strategic, "us_rare_earth_dependency")?;
    let risk = series(&bundle.strategic, "conflict_risk")?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "rare_earth_supply", "us_dependency", "conflict_risk"])?;
    for t in 0..supply.points.len() {
        writer.write_record([
            supply.points[t].date.to_string(),
            format!("{:.1}", supply.points[t].value),
            format!("{:.3}", dependency.points[t].value),
            format!("{:.3}", risk.points[t].value),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_regional_json(path: &Path, bundle: &Bundle) -> Result<()> {
    let json = serde_json::to_string_pretty(&bundle.regional)?;
    fs::write(path, json)?;
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (out, seed, scenario_path) = parse_args();
    info!(?out, seed, ?scenario_path, "starting generator");

    let scenario = match &scenario_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            Scenario::from_yaml_str(&text)?
        }
        None => trade_dispute(),
    };
    let registry = EventRegistry::new(scenario.monthly_events.clone())?;
    let bundle = scenario.generate(seed)?;

    fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
    write_trade_csv(&out.join("trade_data.csv"), &bundle, &registry)?;
    write_sentiment_csv(&out.join("sentiment_data.csv"), &bundle)?;
    write_strategic_csv(&out.join("strategic_resources.csv"), &bundle)?;
    write_regional_json(&out.join("regional_data.json"), &bundle)?;

    println!(
        "Scenario OK | events: {} | monthly steps: {} | regions: {} | out: {}",
        registry.len(),
        scenario.monthly.len,
        bundle.regional.regions.len(),
        out.display()
    );

    Ok(())
}
