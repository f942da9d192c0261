//! Per-panel, per-tick orchestration (§4.7).
//!
//! Sequence: read sensors → push lag buffer → build features → predict →
//! bias-correct → FSM step → bias-update with the raw prediction. Owns
//! every piece of per-panel state and is the unit [`eps_common::Snapshot`]
//! is implemented on.

use eps_common::config::{PanelConfig, SystemConfig};
use eps_common::error::FdirError;
use eps_common::ground::GroundCommand;
use eps_common::hardware::Hardware;
use eps_common::persistence::{PanelSnapshot, Snapshot};
use eps_common::predictor::Predictor;
use eps_common::telemetry::TelemetrySink;

use eps_common::consts::{POWER_N_FEATURES, VOLTAGE_N_FEATURES};

use crate::bias::BiasCorrector;
use crate::features;
use crate::fsm::ProtectionFsm;
use crate::lag_buffer::LagBuffer;
use crate::quantile::P2Quantile;

/// Why a tick produced no new observation (§9 "Exception-like early-outs").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `LagBuffer`/feature builder not yet warmed up.
    NotReady,
    /// A NaN sensor reading was rejected before reaching the lag buffer.
    NanReading,
    /// `read_voltage`/`read_current` returned `HardwareTimeout`.
    HardwareTimeout,
}

/// What was observed and predicted on a tick that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub power: f32,
    pub voltage: f32,
    pub predicted_power: f32,
    pub predicted_voltage: f32,
}

/// Result of one [`PanelRuntime::tick`] call (§9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Stepped(Observation),
}

/// All per-panel runtime state (§3 "Lifecycles").
pub struct PanelRuntime {
    panel: u8,
    lag: LagBuffer,
    bias: BiasCorrector,
    quantile_power: P2Quantile,
    quantile_voltage: P2Quantile,
    fsm: ProtectionFsm,
}

impl PanelRuntime {
    /// Construct runtime state for one panel from its configuration
    /// slice. Panics if `panel.id as usize != panel` — a config-layer bug
    /// (validated out by [`SystemConfig::validate`] before this is ever
    /// called).
    pub fn new(panel: &PanelConfig, cfg: &SystemConfig) -> Self {
        Self {
            panel: panel.id,
            lag: LagBuffer::new(),
            bias: BiasCorrector::new(cfg.bias.alpha, cfg.bias.warmup),
            quantile_power: P2Quantile::new(cfg.quantile_p as f64),
            quantile_voltage: P2Quantile::new(cfg.quantile_p as f64),
            fsm: ProtectionFsm::new(panel.id, panel.p_nominal, panel.v_nominal),
        }
    }

    #[inline]
    pub const fn panel(&self) -> u8 {
        self.panel
    }

    #[inline]
    pub const fn fsm(&self) -> &ProtectionFsm {
        &self.fsm
    }

    /// Run one tick for this panel (§4.7).
    pub fn tick<H: Hardware, P: Predictor, T: TelemetrySink>(
        &mut self,
        hw: &mut H,
        predictor: &P,
        telemetry: &mut T,
        cfg: &SystemConfig,
        ground_cmd: GroundCommand,
        now: u32,
    ) -> Result<TickOutcome, FdirError> {
        let read = (|| -> Result<(f32, f32), FdirError> {
            let voltage = hw.read_voltage(self.panel)?;
            let current = hw.read_current(self.panel)?;
            Ok((voltage, current))
        })();

        let (voltage, current) = match read {
            Ok(vi) => vi,
            Err(FdirError::HardwareTimeout { panel }) => {
                telemetry.log_event(
                    Some(panel),
                    "hardware timeout reading sensors; tick skipped for this panel",
                );
                return Ok(TickOutcome::Skipped(SkipReason::HardwareTimeout));
            }
            Err(other) => return Err(other),
        };

        if voltage.is_nan() || current.is_nan() {
            telemetry.log_event(
                Some(self.panel),
                "NaN sensor reading rejected; tick skipped for this panel",
            );
            return Ok(TickOutcome::Skipped(SkipReason::NanReading));
        }

        let power = voltage * current;

        self.lag.push(power as f64, voltage as f64);
        if !self.lag.ready() {
            return Ok(TickOutcome::Skipped(SkipReason::NotReady));
        }

        let mut power_features = [0.0; POWER_N_FEATURES];
        let mut voltage_features = [0.0; VOLTAGE_N_FEATURES];
        if !features::build_power(&self.lag, &mut power_features)
            || !features::build_voltage(&self.lag, &mut voltage_features)
        {
            return Ok(TickOutcome::Skipped(SkipReason::NotReady));
        }

        let p_pred_raw = predictor.predict_power(&power_features) as f32;
        let v_pred_raw = predictor.predict_voltage(&voltage_features) as f32;

        let (p_pred, v_pred) = self.bias.correct(p_pred_raw, v_pred_raw);

        self.fsm.step(
            hw,
            telemetry,
            &cfg.thresholds,
            &cfg.timers,
            cfg.sample_period_s,
            ground_cmd,
            power,
            voltage,
            current,
            p_pred,
            v_pred,
            now,
        )?;

        // Bias tracking must use the raw, uncorrected predictions (§4.3).
        self.bias
            .update(power - p_pred_raw, voltage - v_pred_raw);

        self.quantile_power.update((power - p_pred_raw) as f64);
        self.quantile_voltage.update((voltage - v_pred_raw) as f64);

        Ok(TickOutcome::Stepped(Observation {
            power,
            voltage,
            predicted_power: p_pred,
            predicted_voltage: v_pred,
        }))
    }
}

impl Snapshot for PanelRuntime {
    fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            panel: self.panel,
            bias: self.bias.snapshot(),
            quantile_power: self.quantile_power.snapshot(),
            quantile_voltage: self.quantile_voltage.snapshot(),
            fsm: self.fsm.snapshot(),
        }
    }

    fn restore(&mut self, snapshot: &PanelSnapshot) {
        self.bias.restore(&snapshot.bias);
        self.quantile_power.restore(&snapshot.quantile_power);
        self.quantile_voltage.restore(&snapshot.quantile_voltage);
        self.fsm.restore(&snapshot.fsm);
    }
}
