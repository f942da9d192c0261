//! Multi-condition anomaly detector (§4.5).
//!
//! A pure function: four independent boolean conditions plus their
//! count. No state of its own — `P_prev`/`V_prev` live in the caller's
//! FSM state and are threaded in.

use bitflags::bitflags;

use eps_common::config::ThresholdConfig;

bitflags! {
    /// Which of the four anomaly conditions fired on a given tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnomalyFlags: u8 {
        const POWER_SPIKE    = 0b0001;
        const VOLTAGE_DROP   = 0b0010;
        const HIGH_DYNAMICS  = 0b0100;
        const LARGE_RESIDUAL = 0b1000;
    }
}

/// Result of one [`detect`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyResult {
    pub flags: AnomalyFlags,
    pub count: u8,
}

impl AnomalyResult {
    /// Two or more conditions firing is an anomaly (§4.5 `count >= 2`).
    #[inline]
    pub const fn is_anomaly(&self) -> bool {
        self.count >= 2
    }
}

/// Evaluate the four anomaly conditions for one panel's tick.
///
/// Any NaN in `p_meas` or `v_meas` short-circuits to an empty,
/// zero-count result — a corrupt reading must never itself count toward
/// a trip (§4.5 `[FULL]`).
#[allow(clippy::too_many_arguments)]
pub fn detect(
    thresholds: &ThresholdConfig,
    p_nominal: f32,
    p_meas: f32,
    v_meas: f32,
    p_pred: f32,
    v_pred: f32,
    p_prev: f32,
    v_prev: f32,
    dt: f32,
) -> AnomalyResult {
    if p_meas.is_nan() || v_meas.is_nan() {
        return AnomalyResult {
            flags: AnomalyFlags::empty(),
            count: 0,
        };
    }

    let d_p = (p_meas - p_prev) / dt;
    let d_v = (v_meas - v_prev) / dt;
    let residual = p_meas - p_pred;

    let mut flags = AnomalyFlags::empty();
    if p_pred > p_nominal * thresholds.m_spike {
        flags |= AnomalyFlags::POWER_SPIKE;
    }
    if v_meas < v_pred - thresholds.t_v_drop {
        flags |= AnomalyFlags::VOLTAGE_DROP;
    }
    if d_p.abs() > thresholds.t_dp && d_v.abs() > thresholds.t_dv {
        flags |= AnomalyFlags::HIGH_DYNAMICS;
    }
    if residual.abs() > thresholds.k_sigma * thresholds.sigma_power {
        flags |= AnomalyFlags::LARGE_RESIDUAL;
    }

    AnomalyResult {
        count: flags.bits().count_ones() as u8,
        flags,
    }
}
