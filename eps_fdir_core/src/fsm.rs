//! Per-panel protection state machine (§4.6, §3 "PanelProtection").
//!
//! DISABLED → ENABLED → {TRIPPED, DISABLED} with a ground-approved
//! RECOVERY path back out of TRIPPED. No tick performs more than one
//! state transition. `GroundCommand::PermanentDisable`/`ResetStats` are
//! handled ahead of the anomaly-driven transitions in every state.

use eps_common::config::{ThresholdConfig, TimerConfig};
use eps_common::error::FdirError;
use eps_common::ground::GroundCommand;
use eps_common::hardware::Hardware;
use eps_common::persistence::FsmSnapshot;
use eps_common::telemetry::TelemetrySink;

use crate::anomaly::{self, AnomalyResult};

/// Protection state (§3 "PanelProtection.state").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    Disabled,
    Enabled,
    Tripped,
    Recovery,
}

/// Per-panel protection state machine state (§3 "PanelProtection").
#[derive(Debug, Clone, Copy)]
pub struct ProtectionFsm {
    panel: u8,
    p_nominal: f32,
    v_nominal: f32,
    state: ProtectionState,
    last_enable_time: u32,
    trip_time: u32,
    last_log_time: u32,
    stable_count: u8,
    p_prev: f32,
    v_prev: f32,
    hardware_tripped: bool,
    ground_approved: bool,
    enable_count: u32,
    trip_count: u32,
    false_alarm_count: u32,
}

impl ProtectionFsm {
    /// Create a new FSM in `DISABLED`, for `panel` with the given
    /// per-panel nominals.
    pub const fn new(panel: u8, p_nominal: f32, v_nominal: f32) -> Self {
        Self {
            panel,
            p_nominal,
            v_nominal,
            state: ProtectionState::Disabled,
            last_enable_time: 0,
            trip_time: 0,
            last_log_time: 0,
            stable_count: 0,
            p_prev: 0.0,
            v_prev: 0.0,
            hardware_tripped: false,
            ground_approved: false,
            enable_count: 0,
            trip_count: 0,
            false_alarm_count: 0,
        }
    }

    #[inline]
    pub const fn state(&self) -> ProtectionState {
        self.state
    }

    #[inline]
    pub const fn p_nominal(&self) -> f32 {
        self.p_nominal
    }

    #[inline]
    pub const fn v_nominal(&self) -> f32 {
        self.v_nominal
    }

    #[inline]
    pub const fn enable_count(&self) -> u32 {
        self.enable_count
    }

    #[inline]
    pub const fn trip_count(&self) -> u32 {
        self.trip_count
    }

    #[inline]
    pub const fn false_alarm_count(&self) -> u32 {
        self.false_alarm_count
    }

    /// Advance the state machine by one tick.
    ///
    /// `p_meas`/`v_meas`/`i_meas` are the raw sensor readings (`i_meas` is
    /// carried only for the routine telemetry line); `p_pred`/`v_pred` the
    /// bias-corrected predictions. `now` is the hardware tick clock in ms.
    /// Updates `p_prev`/`v_prev` for the next call's derivative computation
    /// regardless of which branch runs.
    #[allow(clippy::too_many_arguments)]
    pub fn step<H: Hardware, T: TelemetrySink>(
        &mut self,
        hw: &mut H,
        telemetry: &mut T,
        thresholds: &ThresholdConfig,
        timers: &TimerConfig,
        dt: f32,
        ground_cmd: GroundCommand,
        p_meas: f32,
        v_meas: f32,
        i_meas: f32,
        p_pred: f32,
        v_pred: f32,
        now: u32,
    ) -> Result<(), FdirError> {
        if ground_cmd == GroundCommand::ResetStats {
            self.enable_count = 0;
            self.trip_count = 0;
            self.false_alarm_count = 0;
        }

        if ground_cmd == GroundCommand::PermanentDisable && self.state != ProtectionState::Disabled
        {
            self.force_disable(hw);
            telemetry.log_event(Some(self.panel), "permanent disable by ground command");
            self.p_prev = p_meas;
            self.v_prev = v_meas;
            return Ok(());
        }

        let anomaly = anomaly::detect(
            thresholds,
            self.p_nominal,
            p_meas,
            v_meas,
            p_pred,
            v_pred,
            self.p_prev,
            self.v_prev,
            dt,
        );

        match self.state {
            ProtectionState::Disabled => self.step_disabled(hw, &anomaly, now),
            ProtectionState::Enabled => {
                self.step_enabled(hw, telemetry, timers, &anomaly, now)?;
            }
            ProtectionState::Tripped => {
                self.step_tripped(hw, telemetry, timers, ground_cmd, now);
            }
            ProtectionState::Recovery => {
                self.step_recovery(hw, telemetry, timers, &anomaly, now);
            }
        }

        self.p_prev = p_meas;
        self.v_prev = v_meas;
        telemetry.send_telemetry(self.panel, v_meas, i_meas, p_meas);
        Ok(())
    }

    fn step_disabled<H: Hardware>(&mut self, hw: &mut H, anomaly: &AnomalyResult, now: u32) {
        if anomaly.is_anomaly() {
            hw.enable_layer2(self.panel);
            self.state = ProtectionState::Enabled;
            self.last_enable_time = now;
            self.stable_count = 0;
            self.enable_count += 1;
        }
    }

    fn step_enabled<H: Hardware, T: TelemetrySink>(
        &mut self,
        hw: &mut H,
        telemetry: &mut T,
        timers: &TimerConfig,
        anomaly: &AnomalyResult,
        now: u32,
    ) -> Result<(), FdirError> {
        if hw.check_mosfet_status(self.panel) {
            self.hardware_tripped = true;
            self.trip_time = now;
            self.trip_count += 1;
            self.state = ProtectionState::Tripped;
            telemetry.send_telemetry_alert(self.panel, self.p_prev, self.v_prev);
            return Ok(());
        }

        if now.saturating_sub(self.last_enable_time) > timers.enable_timeout_ms
            && !self.hardware_tripped
        {
            hw.disable_layer2(self.panel);
            self.false_alarm_count += 1;
            self.state = ProtectionState::Disabled;
            self.stable_count = 0;
            return Ok(());
        }

        if anomaly.is_anomaly() {
            self.stable_count = 0;
        } else {
            self.stable_count = self.stable_count.saturating_add(1);
            if self.stable_count >= timers.stable_required {
                hw.disable_layer2(self.panel);
                self.false_alarm_count += 1;
                self.state = ProtectionState::Disabled;
                self.stable_count = 0;
            }
        }
        Ok(())
    }

    fn step_tripped<H: Hardware, T: TelemetrySink>(
        &mut self,
        hw: &mut H,
        telemetry: &mut T,
        _timers: &TimerConfig,
        ground_cmd: GroundCommand,
        now: u32,
    ) {
        if ground_cmd == GroundCommand::Reenable {
            self.ground_approved = true;
            self.stable_count = 0;
            hw.attempt_reenable_mosfet(self.panel);
            self.state = ProtectionState::Recovery;
            self.last_log_time = now;
            telemetry.log_event(Some(self.panel), "recovery attempt started");
        }
    }

    fn step_recovery<H: Hardware, T: TelemetrySink>(
        &mut self,
        hw: &mut H,
        telemetry: &mut T,
        timers: &TimerConfig,
        anomaly: &AnomalyResult,
        now: u32,
    ) {
        if anomaly.is_anomaly() {
            hw.disable_mosfet(self.panel);
            self.trip_time = now;
            self.stable_count = 0;
            self.trip_count += 1;
            self.state = ProtectionState::Tripped;
            telemetry.send_telemetry_alert(self.panel, self.p_prev, self.v_prev);
            return;
        }

        self.stable_count = self.stable_count.saturating_add(1);
        if self.stable_count >= timers.recovery_stable_required {
            hw.disable_layer2(self.panel);
            self.ground_approved = false;
            self.state = ProtectionState::Disabled;
            self.stable_count = 0;
            telemetry.send_telemetry_success(self.panel);
            return;
        }

        if now.saturating_sub(self.last_log_time) >= timers.recovery_telemetry_interval_ms {
            self.last_log_time = now;
            telemetry.log_event(Some(self.panel), "recovery in progress");
        }
    }

    fn force_disable<H: Hardware>(&mut self, hw: &mut H) {
        match self.state {
            ProtectionState::Enabled => hw.disable_layer2(self.panel),
            ProtectionState::Tripped | ProtectionState::Recovery => hw.disable_mosfet(self.panel),
            ProtectionState::Disabled => {}
        }
        self.state = ProtectionState::Disabled;
        self.ground_approved = false;
        self.stable_count = 0;
    }

    pub(crate) fn snapshot(&self) -> FsmSnapshot {
        FsmSnapshot {
            state: match self.state {
                ProtectionState::Disabled => 0,
                ProtectionState::Enabled => 1,
                ProtectionState::Tripped => 2,
                ProtectionState::Recovery => 3,
            },
            last_enable_time: self.last_enable_time,
            trip_time: self.trip_time,
            last_log_time: self.last_log_time,
            stable_count: self.stable_count,
            p_prev: self.p_prev,
            v_prev: self.v_prev,
            hardware_tripped: self.hardware_tripped,
            ground_approved: self.ground_approved,
            enable_count: self.enable_count,
            trip_count: self.trip_count,
            false_alarm_count: self.false_alarm_count,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: &FsmSnapshot) {
        self.state = match snapshot.state {
            1 => ProtectionState::Enabled,
            2 => ProtectionState::Tripped,
            3 => ProtectionState::Recovery,
            _ => ProtectionState::Disabled,
        };
        self.last_enable_time = snapshot.last_enable_time;
        self.trip_time = snapshot.trip_time;
        self.last_log_time = snapshot.last_log_time;
        self.stable_count = snapshot.stable_count;
        self.p_prev = snapshot.p_prev;
        self.v_prev = snapshot.v_prev;
        self.hardware_tripped = snapshot.hardware_tripped;
        self.ground_approved = snapshot.ground_approved;
        self.enable_count = snapshot.enable_count;
        self.trip_count = snapshot.trip_count;
        self.false_alarm_count = snapshot.false_alarm_count;
    }
}
