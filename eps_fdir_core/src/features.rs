//! Feature vector extraction (§4.2).
//!
//! Pure functions over a [`LagBuffer`]; field order is part of the ABI
//! with the external [`eps_common::Predictor`] and must never change.

use eps_common::consts::{POWER_N_FEATURES, VOLTAGE_N_FEATURES};

use crate::lag_buffer::LagBuffer;

/// Build the 10-element power feature vector (§3 "FeatureVector (Power)").
///
/// Returns `false` (leaving `out` untouched) when `buf.ready()` is false.
pub fn build_power(buf: &LagBuffer, out: &mut [f64; POWER_N_FEATURES]) -> bool {
    if !buf.ready() {
        return false;
    }

    // `lag_power(13)` reaches one step past the documented [0, RING-1]
    // window; see the capacity note in lag_buffer.rs. Before sample_count
    // reaches 14 it has no genuine sample behind it, so the term is
    // bootstrap zero-filled instead of read.
    let p_lag13 = if buf.has_lag13() { buf.lag_power(13) } else { 0.0 };

    out[0] = buf.lag_power(1);
    out[1] = buf.lag_power(2);
    out[2] = buf.lag_power(3);
    out[3] = buf.lag_power(6);
    out[4] = buf.lag_power(12);
    out[5] = buf.lag_power(1) - buf.lag_power(2);
    out[6] = buf.lag_power(2) - buf.lag_power(3);
    out[7] = buf.lag_power(3) - buf.lag_power(4);
    out[8] = buf.lag_power(6) - buf.lag_power(7);
    out[9] = buf.lag_power(12) - p_lag13;
    true
}

/// Build the 5-element voltage feature vector (§3 "FeatureVector (Voltage)").
///
/// Returns `false` (leaving `out` untouched) when `buf.ready()` is false.
pub fn build_voltage(buf: &LagBuffer, out: &mut [f64; VOLTAGE_N_FEATURES]) -> bool {
    if !buf.ready() {
        return false;
    }

    out[0] = buf.lag_voltage(1);
    out[1] = buf.lag_voltage(2);
    out[2] = buf.lag_voltage(3);
    out[3] = buf.lag_voltage(6);
    out[4] = buf.lag_voltage(12);
    true
}
