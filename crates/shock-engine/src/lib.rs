#![deny(warnings)]

//! Shock composition engine for trade-pulse.
//!
//! Turns a validated [`series_core::SeriesSpec`], an event registry and a time
//! grid into a bounded, deterministic output series: compound-growth baseline,
//! sinusoidal seasonality, event shocks with configurable decay envelopes, and
//! seeded Gaussian noise, composed per step and clamped into the series'
//! valid range.
//!
//! The engine performs no I/O and keeps no state; the random stream is an
//! explicit seed split per step, so the parallel generation path produces
//! bit-identical output to the sequential one.

pub mod baseline;
pub mod bounds;
pub mod compose;
pub mod decay;
pub mod generate;

pub use compose::{compose, event_term, Composite};
pub use generate::{generate, generate_par, generate_shares, mix_seed};
