//! Shared types for the EPS predictive FDIR workspace.
//!
//! This crate holds everything both the FDIR core and any binding to real
//! satellite hardware need to agree on: compile-time constants, the
//! `Hardware`/`Predictor`/`TelemetrySink` trait boundaries, the
//! ground-command and ground-command-slot types, persistence snapshots,
//! and TOML-loaded runtime configuration. No FDIR algorithm lives here.

pub mod config;
pub mod consts;
pub mod error;
pub mod ground;
pub mod hardware;
pub mod persistence;
pub mod predictor;
pub mod telemetry;

pub use config::{PanelConfig, SystemConfig};
pub use error::FdirError;
pub use ground::GroundCommand;
pub use hardware::Hardware;
pub use persistence::{PersistedSnapshots, Snapshot, SnapshotStore};
pub use predictor::Predictor;
pub use telemetry::TelemetrySink;
