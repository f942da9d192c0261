//! System-wide constants for the EPS FDIR workspace.
//!
//! Single source of truth for all numeric limits. Imported by both
//! crates — no duplication permitted.

/// Reference panel count (13 solar panels, §1).
pub const N_PANELS_REFERENCE: usize = 13;

/// Lag-buffer capacity: `max_lag + 1`.
pub const RING_BUFFER_SIZE: usize = 13;

/// Maximum lag index a power feature legitimately needs (`dP_lag12` reads
/// `P_lag13`).
pub const MAX_POWER_LAG: usize = 13;

/// Sample count at which the feature builder becomes usable (`ready()`).
pub const FEATURE_READY_SAMPLES: u32 = 12;

/// Sample count at which `dP_lag12` stops bootstrap-zeroing `P_lag13`.
pub const DP_LAG12_BOOTSTRAP_SAMPLES: u32 = 14;

/// Power feature vector length (§3).
pub const POWER_N_FEATURES: usize = 10;

/// Voltage feature vector length (§3).
pub const VOLTAGE_N_FEATURES: usize = 5;

/// Default EWMA decay factor for `BiasCorrector`.
pub const DEFAULT_BIAS_ALPHA: f32 = 0.01;

/// Default warmup sample count for `BiasCorrector`.
pub const DEFAULT_BIAS_WARMUP: u32 = 50;

/// Default P² target quantile.
pub const DEFAULT_QUANTILE_P: f32 = 0.99;

/// Default sampling period between ticks [s].
pub const DEFAULT_SAMPLE_PERIOD_S: f32 = 5.0;

/// Power-spike multiplier on `P_nominal` (§4.5).
pub const DEFAULT_M_SPIKE: f32 = 1.2;

/// Voltage-drop threshold [V] (§4.5).
pub const DEFAULT_T_V_DROP: f32 = 0.5;

/// Power-dynamics threshold [W/s] (§4.5).
pub const DEFAULT_T_DP: f32 = 0.5;

/// Voltage-dynamics threshold [V/s] (§4.5).
pub const DEFAULT_T_DV: f32 = 0.3;

/// Residual sigma multiplier (§4.5).
pub const DEFAULT_K_SIGMA: f32 = 3.0;

/// Fixed residual scale used by `large_residual` (§4.5, §9 Open Question).
pub const DEFAULT_SIGMA_POWER: f32 = 0.5;

/// Stable-tick count required to auto-clear a false alarm (6 × 5s = 30s).
pub const DEFAULT_STABLE_REQUIRED: u8 = 6;

/// Stable-tick count required to exit RECOVERY (24 × 5s = 2min).
pub const DEFAULT_RECOVERY_STABLE_REQUIRED: u8 = 24;

/// ENABLED state timeout before auto-disable [ms].
pub const DEFAULT_ENABLE_TIMEOUT_MS: u32 = 300_000;

/// Periodic RECOVERY telemetry interval [ms].
pub const DEFAULT_RECOVERY_TELEMETRY_INTERVAL_MS: u32 = 60_000;

/// Minimum persistence save cadence [ms] (≥10 min, §3 "Lifecycles").
pub const MIN_PERSISTENCE_INTERVAL_MS: u32 = 600_000;
