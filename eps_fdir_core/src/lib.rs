//! Predictive FDIR core for a satellite electrical power system.
//!
//! This crate implements the algorithm side of the system: lag-feature
//! extraction, online bias correction, P² online quantiles, anomaly
//! detection and the per-panel protection state machine, wired together
//! by [`system::System`]. It depends on `eps_common` for the
//! hardware/predictor/telemetry trait boundary and configuration types,
//! and has no knowledge of any particular bus or radio.
//!
//! `testkit` is public so both this crate's integration tests and the
//! `eps-sim` binary can share one simulated `Hardware`/`Predictor`/fault
//! model; none of it is compiled into a flight image.

pub mod anomaly;
pub mod bias;
pub mod features;
pub mod fsm;
pub mod lag_buffer;
pub mod panel;
pub mod quantile;
pub mod system;
pub mod testkit;

pub use anomaly::{AnomalyFlags, AnomalyResult};
pub use bias::BiasCorrector;
pub use fsm::{ProtectionFsm, ProtectionState};
pub use lag_buffer::LagBuffer;
pub use panel::{Observation, PanelRuntime, SkipReason, TickOutcome};
pub use quantile::P2Quantile;
pub use system::System;
