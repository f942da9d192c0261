//! Predictor boundary (§6, §9 "Function-pointer predictor ABI").
//!
//! The opaque `predict_power`/`predict_voltage` pair is behind a trait so
//! mock implementations can drive tests without an offline-trained model.
//! A `Predictor` is stateless and has no panel identity: the same
//! instance is shared across all panels' [`crate::config::PanelConfig`]s,
//! which is precisely why [`crate::error::FdirError`] has no
//! `Predictor`-specific variant — prediction failures are not modeled,
//! matching the "pure, deterministic" contract in §6.

use crate::consts::{POWER_N_FEATURES, VOLTAGE_N_FEATURES};

/// Pure, stateless predictor consuming fixed-length feature slices (§6).
pub trait Predictor {
    /// Predict one-step-ahead power [W] from the 10-element power feature
    /// vector (field order fixed by §3, an ABI contract with this trait).
    fn predict_power(&self, features: &[f64; POWER_N_FEATURES]) -> f64;

    /// Predict one-step-ahead voltage [V] from the 5-element voltage
    /// feature vector.
    fn predict_voltage(&self, features: &[f64; VOLTAGE_N_FEATURES]) -> f64;
}
