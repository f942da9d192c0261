//! `eps-sim` — ground-side demo/replay binary (§4.8, §10 "CLI").
//!
//! Drives a [`System`] with [`eps_fdir_core::testkit::SimulatedHardware`], a
//! [`eps_fdir_core::testkit::LinearPredictor`], and a tracing-backed
//! telemetry sink through a scripted fault scenario, printing each panel's
//! protection state transitions to stdout. Not part of the flight image —
//! a ground operator's bench tool for exercising the FSM against the same
//! fault scenarios §8 describes.

#![deny(warnings)]

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use eps_common::config::{PanelConfig, SystemConfig};
use eps_common::telemetry::TelemetrySink;
use eps_fdir_core::system::System;
use eps_fdir_core::testkit::{FaultInjector, FaultSchedule, FaultScenario, LinearPredictor, SimulatedHardware};

const N_PANELS: usize = 13;

/// Scenario selector mirroring §4.8/§8's literal end-to-end scenarios.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    Clean,
    Shade,
    OpenCircuit,
    ShortCircuit,
    SensorNoise,
}

impl From<ScenarioArg> for Option<FaultScenario> {
    fn from(value: ScenarioArg) -> Self {
        match value {
            ScenarioArg::Clean => None,
            ScenarioArg::Shade => Some(FaultScenario::Shade),
            ScenarioArg::OpenCircuit => Some(FaultScenario::OpenCircuit),
            ScenarioArg::ShortCircuit => Some(FaultScenario::ShortCircuit),
            ScenarioArg::SensorNoise => Some(FaultScenario::SensorNoise),
        }
    }
}

/// Bench-side replay tool for the predictive EPS FDIR core.
#[derive(Parser, Debug)]
#[command(name = "eps-sim")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Replay a scripted fault scenario against the FDIR core")]
struct Args {
    /// Fault scenario to inject on panel 0.
    #[arg(short, long, value_enum, default_value_t = ScenarioArg::Shade)]
    scenario: ScenarioArg,

    /// Total ticks to simulate.
    #[arg(short, long, default_value_t = 200)]
    ticks: u32,

    /// Tick the fault begins on panel 0.
    #[arg(long, default_value_t = 20)]
    start_step: u32,

    /// Fault duration in ticks, 0 = persistent once active.
    #[arg(long, default_value_t = 10)]
    duration: u32,

    /// Fault severity in `[0, 1]`.
    #[arg(long, default_value_t = 0.8)]
    severity: f32,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Routes telemetry through `tracing`, matching the trait's documented
/// default and the production binding's expected behavior.
#[derive(Default)]
struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn send_telemetry(&mut self, panel: u8, voltage: f32, current: f32, power: f32) {
        tracing::debug!(panel, voltage, current, power, "telemetry");
    }

    fn send_telemetry_alert(&mut self, panel: u8, power: f32, voltage: f32) {
        tracing::warn!(panel, power, voltage, "ALERT: panel tripped");
    }

    fn send_telemetry_success(&mut self, panel: u8) {
        tracing::info!(panel, "SUCCESS: recovery completed");
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    let config = SystemConfig {
        panels: (0..N_PANELS as u8)
            .map(|id| PanelConfig {
                id,
                p_nominal: 8.4,
                v_nominal: 17.5,
            })
            .collect(),
        ..default_config()
    };

    let hw: SimulatedHardware<N_PANELS> = SimulatedHardware::new(17.5, 0.48, 5_000);
    let mut system: System<SimulatedHardware<N_PANELS>, LinearPredictor, TracingTelemetry, N_PANELS> =
        System::new(hw, LinearPredictor, TracingTelemetry, config);

    let schedule: Option<FaultSchedule> = Option::<FaultScenario>::from(args.scenario).map(|scenario| FaultSchedule {
        scenario,
        start_step: args.start_step,
        duration: args.duration,
        severity: args.severity,
    });
    let mut injector = FaultInjector::default();

    info!(ticks = args.ticks, scenario = ?args.scenario, "starting eps-sim run");

    for step in 0..args.ticks {
        if let Some(schedule) = &schedule {
            let (p, v, i) = injector.apply(schedule, step, 8.4, 17.5, 0.48);
            let i = if v > 0.0 { p / v } else { i };
            system.hardware_mut().set_reading(0, v, i);
        }
        system.tick_all();
    }

    info!(state = ?system.hardware().layer2_enabled(0), "run complete, panel 0 layer-2 armed");
}

fn default_config() -> SystemConfig {
    SystemConfig {
        sample_period_s: 5.0,
        bias: Default::default(),
        quantile_p: 0.99,
        thresholds: Default::default(),
        timers: Default::default(),
        panels: Vec::new(),
    }
}
