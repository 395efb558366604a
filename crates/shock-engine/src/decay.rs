//! Decay/recovery envelopes: elapsed steps since an event mapped to the
//! event's current impact magnitude.

use series_core::{DecayShape, Event};
use std::f64::consts::LN_2;

/// Unsigned impact envelope of `event` at `dt` steps from its trigger
/// (negative `dt` = before the trigger). Returns a value in [0, 1]:
/// `base_magnitude` at the peak, exactly zero outside
/// `[-lead_time, influence_window]`.
///
/// Before the trigger the envelope is a linear anticipation ramp over
/// `lead_time` steps. After it, the configured shape applies: exponential
/// halving every `half_life` steps, or linear recovery toward a floor. A
/// half-life of zero degenerates to a single-step impulse.
pub fn impact(event: &Event, dt: f64) -> f64 {
    if dt < -event.lead_time || dt > event.influence_window {
        return 0.0;
    }
    if dt < 0.0 {
        return event.base_magnitude * (1.0 + dt / event.lead_time);
    }
    let envelope = match event.shape {
        DecayShape::Exponential { half_life } => {
            if half_life == 0.0 {
                if dt == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                (-LN_2 * dt / half_life).exp()
            }
        }
        DecayShape::LinearRecovery {
            recovery_rate,
            floor,
        } => (1.0 - recovery_rate * dt).max(floor),
    };
    event.base_magnitude * envelope
}
