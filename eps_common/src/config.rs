//! TOML-loaded runtime configuration (§3 "Configuration data [FULL]",
//! §10 "Configuration").
//!
//! Compile-time constants (`RING_BUFFER_SIZE`, feature-vector lengths)
//! stay in [`crate::consts`]; everything a ground operator might tune
//! without a firmware rebuild — bias/quantile parameters, detector
//! thresholds, FSM timers, and per-panel nominals — lives here and is
//! loaded once at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::ConfigError;

/// Bias corrector tuning (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasConfig {
    /// EWMA decay factor, `0 < alpha <= 1`.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Warmup sample count, `warmup >= 1`.
    #[serde(default = "default_warmup")]
    pub warmup: u32,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            warmup: default_warmup(),
        }
    }
}

fn default_alpha() -> f32 {
    consts::DEFAULT_BIAS_ALPHA
}

fn default_warmup() -> u32 {
    consts::DEFAULT_BIAS_WARMUP
}

/// Anomaly-detector thresholds (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Power-spike multiplier on `P_nominal`.
    #[serde(default = "default_m_spike")]
    pub m_spike: f32,
    /// Voltage-drop threshold [V].
    #[serde(default = "default_t_v_drop")]
    pub t_v_drop: f32,
    /// Power-dynamics threshold [W/s].
    #[serde(default = "default_t_dp")]
    pub t_dp: f32,
    /// Voltage-dynamics threshold [V/s].
    #[serde(default = "default_t_dv")]
    pub t_dv: f32,
    /// Residual sigma multiplier `K`.
    #[serde(default = "default_k_sigma")]
    pub k_sigma: f32,
    /// Fixed residual scale `sigma_P` (§9 Open Question).
    #[serde(default = "default_sigma_power")]
    pub sigma_power: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            m_spike: default_m_spike(),
            t_v_drop: default_t_v_drop(),
            t_dp: default_t_dp(),
            t_dv: default_t_dv(),
            k_sigma: default_k_sigma(),
            sigma_power: default_sigma_power(),
        }
    }
}

fn default_m_spike() -> f32 {
    consts::DEFAULT_M_SPIKE
}
fn default_t_v_drop() -> f32 {
    consts::DEFAULT_T_V_DROP
}
fn default_t_dp() -> f32 {
    consts::DEFAULT_T_DP
}
fn default_t_dv() -> f32 {
    consts::DEFAULT_T_DV
}
fn default_k_sigma() -> f32 {
    consts::DEFAULT_K_SIGMA
}
fn default_sigma_power() -> f32 {
    consts::DEFAULT_SIGMA_POWER
}

/// Protection FSM timers (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Stable ticks required to auto-clear a false alarm.
    #[serde(default = "default_stable_required")]
    pub stable_required: u8,
    /// Stable ticks required to exit RECOVERY.
    #[serde(default = "default_recovery_stable_required")]
    pub recovery_stable_required: u8,
    /// ENABLED-state timeout before auto-disable [ms].
    #[serde(default = "default_enable_timeout_ms")]
    pub enable_timeout_ms: u32,
    /// Periodic RECOVERY telemetry interval [ms].
    #[serde(default = "default_recovery_telemetry_interval_ms")]
    pub recovery_telemetry_interval_ms: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            stable_required: default_stable_required(),
            recovery_stable_required: default_recovery_stable_required(),
            enable_timeout_ms: default_enable_timeout_ms(),
            recovery_telemetry_interval_ms: default_recovery_telemetry_interval_ms(),
        }
    }
}

fn default_stable_required() -> u8 {
    consts::DEFAULT_STABLE_REQUIRED
}
fn default_recovery_stable_required() -> u8 {
    consts::DEFAULT_RECOVERY_STABLE_REQUIRED
}
fn default_enable_timeout_ms() -> u32 {
    consts::DEFAULT_ENABLE_TIMEOUT_MS
}
fn default_recovery_telemetry_interval_ms() -> u32 {
    consts::DEFAULT_RECOVERY_TELEMETRY_INTERVAL_MS
}

/// Per-panel nominal operating point (§4.5 `power_spike`/`voltage_drop`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Panel id, must equal its index in `SystemConfig::panels`.
    pub id: u8,
    /// Nominal power output [W].
    pub p_nominal: f32,
    /// Nominal voltage output [V].
    pub v_nominal: f32,
}

/// Full system configuration, loaded once at startup (§3 [FULL]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Sampling period between ticks [s] (`Δt` in §4.5).
    #[serde(default = "default_sample_period_s")]
    pub sample_period_s: f32,
    /// Bias corrector tuning.
    #[serde(default)]
    pub bias: BiasConfig,
    /// P² target quantile.
    #[serde(default = "default_quantile_p")]
    pub quantile_p: f32,
    /// Anomaly-detector thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Protection FSM timers.
    #[serde(default)]
    pub timers: TimerConfig,
    /// Per-panel nominals, one entry per panel, ordered by id.
    pub panels: Vec<PanelConfig>,
}

fn default_sample_period_s() -> f32 {
    consts::DEFAULT_SAMPLE_PERIOD_S
}

fn default_quantile_p() -> f32 {
    consts::DEFAULT_QUANTILE_P
}

impl SystemConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    /// [`ConfigError::FileNotFound`] if `path` does not exist,
    /// [`ConfigError::ParseError`] on invalid TOML, or any of the
    /// semantic [`ConfigError`] variants from [`Self::validate`].
    pub fn load(path: &Path, expected_panels: usize) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.display().to_string())
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;
        Self::load_from_str(&content, expected_panels)
    }

    /// Parse and validate configuration from an in-memory TOML string.
    pub fn load_from_str(content: &str, expected_panels: usize) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate(expected_panels)?;
        Ok(config)
    }

    /// Validate semantic constraints not expressible in TOML's type
    /// system (§3 "Validation").
    pub fn validate(&self, expected_panels: usize) -> Result<(), ConfigError> {
        if !(self.bias.alpha > 0.0 && self.bias.alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha(self.bias.alpha));
        }
        if self.bias.warmup == 0 {
            return Err(ConfigError::InvalidWarmup);
        }
        if !(self.quantile_p > 0.0 && self.quantile_p < 1.0) {
            return Err(ConfigError::InvalidQuantileP(self.quantile_p));
        }
        for (field, value) in [
            ("thresholds.m_spike", self.thresholds.m_spike),
            ("thresholds.t_v_drop", self.thresholds.t_v_drop),
            ("thresholds.t_dp", self.thresholds.t_dp),
            ("thresholds.t_dv", self.thresholds.t_dv),
            ("thresholds.k_sigma", self.thresholds.k_sigma),
            ("thresholds.sigma_power", self.thresholds.sigma_power),
            ("sample_period_s", self.sample_period_s),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositiveThreshold { field, value });
            }
        }

        if self.panels.len() != expected_panels {
            return Err(ConfigError::PanelCountMismatch {
                expected: expected_panels,
                found: self.panels.len(),
            });
        }

        let mut seen = vec![false; expected_panels];
        for panel in &self.panels {
            let idx = panel.id as usize;
            if idx >= expected_panels {
                return Err(ConfigError::PanelIdOutOfRange {
                    id: panel.id,
                    n: expected_panels,
                });
            }
            if seen[idx] {
                return Err(ConfigError::DuplicatePanelId(panel.id));
            }
            seen[idx] = true;
        }

        Ok(())
    }
}
