//! Persistence boundary (§3 "Lifecycles", §6 "Persistence").
//!
//! Opaque byte-serializable snapshots of `BiasCorrector`, the two
//! `P2Quantile`s, and FSM state, one per panel. Saves occur at ≥10 min
//! cadence (`MIN_PERSISTENCE_INTERVAL_MS`); loads occur once at startup
//! after `init`. The snapshot *shapes* live here (so both crates can
//! agree on the wire format without `eps_common` depending on
//! `eps_fdir_core`); the conversions to/from live state live with the
//! live types in `eps_fdir_core`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FdirError;

/// Snapshot of a single panel's bias corrector (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasSnapshot {
    /// Current power bias estimate.
    pub bias_power: f32,
    /// Current voltage bias estimate.
    pub bias_voltage: f32,
    /// Samples processed so far.
    pub n_samples: u32,
}

/// Snapshot of a single panel's P² quantile tracker (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileSnapshot {
    /// Marker heights `q[0..4]`.
    pub q: [f64; 5],
    /// Ideal marker positions `n'[0..4]`.
    pub n_ideal: [f64; 5],
    /// Actual marker positions `n[0..4]`.
    pub n_actual: [u32; 5],
    /// Total samples observed.
    pub count: u32,
    /// Whether the 5-sample initialization phase has completed.
    pub initialized: bool,
}

/// Snapshot of a single panel's protection state machine (§3 "PanelProtection").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FsmSnapshot {
    /// Encoded `ProtectionState` (0=Disabled, 1=Enabled, 2=Tripped, 3=Recovery).
    pub state: u8,
    /// Tick-ms of the last ENABLED transition.
    pub last_enable_time: u32,
    /// Tick-ms of the last trip.
    pub trip_time: u32,
    /// Tick-ms of the last periodic log line.
    pub last_log_time: u32,
    /// Consecutive stable/clean ticks observed in the current state.
    pub stable_count: u8,
    /// Previous measured power, for derivative computation.
    pub p_prev: f32,
    /// Previous measured voltage, for derivative computation.
    pub v_prev: f32,
    /// Whether the hardware has reported the MOSFET open.
    pub hardware_tripped: bool,
    /// Whether ground has approved the current recovery attempt.
    pub ground_approved: bool,
    /// Lifetime count of ENABLED entries.
    pub enable_count: u32,
    /// Lifetime count of TRIPPED entries.
    pub trip_count: u32,
    /// Lifetime count of auto-cleared false alarms.
    pub false_alarm_count: u32,
}

/// Full per-panel snapshot bundle persisted together (§6 "Persistence").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    /// Panel identifier this snapshot belongs to.
    pub panel: u8,
    /// Bias corrector state.
    pub bias: BiasSnapshot,
    /// Power residual quantile tracker state.
    pub quantile_power: QuantileSnapshot,
    /// Voltage residual quantile tracker state.
    pub quantile_voltage: QuantileSnapshot,
    /// Protection state machine state.
    pub fsm: FsmSnapshot,
}

/// Byte-serializable snapshot/restore boundary for one panel's runtime
/// state. Implemented by `eps_fdir_core::panel::PanelRuntime`.
pub trait Snapshot {
    /// Capture the current state as an opaque, serializable snapshot.
    fn snapshot(&self) -> PanelSnapshot;

    /// Restore state from a previously captured snapshot. Snapshots are
    /// trusted input (produced by this same crate version); malformed
    /// snapshots are a caller bug, not a runtime fault.
    fn restore(&mut self, snapshot: &PanelSnapshot);
}

/// On-disk envelope for a full system's worth of [`PanelSnapshot`]s (§6
/// "Persistence"). `version` guards against loading a snapshot written by
/// an incompatible build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshots {
    /// Snapshot format version, bumped whenever a snapshot type's shape
    /// changes incompatibly.
    pub version: u32,
    /// One entry per panel, in panel-id order.
    pub panels: Vec<PanelSnapshot>,
}

impl PersistedSnapshots {
    /// Current on-disk format version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Wrap a set of panel snapshots for persistence.
    pub fn new(panels: Vec<PanelSnapshot>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            panels,
        }
    }
}

/// File-backed store for [`PersistedSnapshots`] (§6 "Persistence", §3
/// "Lifecycles" — saves at >=10 min cadence, one load at startup).
///
/// A save/load failure is reported as [`FdirError::PersistenceError`] and
/// never panics: per §7, persistence failures do not stop the FSM, and the
/// caller keeps running on its in-RAM state.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Point a store at a snapshot file path. The file and its parent
    /// directories are created lazily on first [`Self::save`].
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Persist `snapshots` to disk, overwriting any prior contents.
    pub fn save(&self, snapshots: &PersistedSnapshots) -> Result<(), FdirError> {
        debug!(path = ?self.path, "saving FDIR snapshot");

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| FdirError::PersistenceError(format!("create dir: {e}")))?;
        }

        let file = File::create(&self.path)
            .map_err(|e| FdirError::PersistenceError(format!("create file: {e}")))?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, snapshots)
            .map_err(|e| FdirError::PersistenceError(format!("serialize: {e}")))?;

        info!(panels = snapshots.panels.len(), "saved FDIR snapshot");
        Ok(())
    }

    /// Load a previously saved snapshot set, if the file exists and is
    /// compatible. Returns `Ok(None)` (not an error) when there is nothing
    /// to load yet, matching the "first boot, no prior state" case.
    pub fn load(&self) -> Result<Option<PersistedSnapshots>, FdirError> {
        if !self.path.exists() {
            debug!(path = ?self.path, "no snapshot file present, starting fresh");
            return Ok(None);
        }

        let file = File::open(&self.path)
            .map_err(|e| FdirError::PersistenceError(format!("open file: {e}")))?;
        let reader = BufReader::new(file);
        let snapshots: PersistedSnapshots = bincode::deserialize_from(reader)
            .map_err(|e| FdirError::PersistenceError(format!("deserialize: {e}")))?;

        if snapshots.version != PersistedSnapshots::CURRENT_VERSION {
            warn!(
                found = snapshots.version,
                expected = PersistedSnapshots::CURRENT_VERSION,
                "snapshot version mismatch, starting fresh"
            );
            return Ok(None);
        }

        Ok(Some(snapshots))
    }
}
