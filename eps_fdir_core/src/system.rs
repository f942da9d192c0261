//! Top-level owner of all per-panel state (§5, §9 "Global mutable state").
//!
//! `System` replaces the reference implementation's process-wide array of
//! panel structs and global ADC handle with an explicitly owned value:
//! `[PanelRuntime; N]` plus the hardware, predictor and telemetry
//! collaborators, generic and statically dispatched rather than behind
//! `dyn Trait` (§5 "[FULL]").

use eps_common::config::SystemConfig;
use eps_common::error::FdirError;
use eps_common::ground::GroundCommandTable;
use eps_common::hardware::Hardware;
use eps_common::persistence::{PanelSnapshot, PersistedSnapshots, Snapshot, SnapshotStore};
use eps_common::predictor::Predictor;
use eps_common::telemetry::TelemetrySink;

use crate::panel::{PanelRuntime, SkipReason, TickOutcome};

/// Owns `N` panels' runtime state and the collaborators they share within
/// one tick: one [`Hardware`] binding, one [`Predictor`], one
/// [`TelemetrySink`].
pub struct System<H: Hardware, P: Predictor, T: TelemetrySink, const N: usize> {
    hw: H,
    predictor: P,
    telemetry: T,
    config: SystemConfig,
    panels: [PanelRuntime; N],
    ground_commands: GroundCommandTable<N>,
}

impl<H: Hardware, P: Predictor, T: TelemetrySink, const N: usize> System<H, P, T, N> {
    /// Build a system for `N` panels from validated configuration
    /// (`config.panels.len() == N` is the caller's responsibility, enforced
    /// by [`SystemConfig::validate`] upstream).
    pub fn new(hw: H, predictor: P, telemetry: T, config: SystemConfig) -> Self {
        assert_eq!(
            config.panels.len(),
            N,
            "SystemConfig must be validated against N before constructing System"
        );
        let panels = core::array::from_fn(|i| PanelRuntime::new(&config.panels[i], &config));
        Self {
            hw,
            predictor,
            telemetry,
            config,
            panels,
            ground_commands: GroundCommandTable::new(),
        }
    }

    /// Post a ground command for a panel, to be consumed on its next tick.
    pub fn post_ground_command(&mut self, panel: u8, command: eps_common::GroundCommand) {
        self.ground_commands.post(panel, command);
    }

    /// Sweep all panels once, sequentially, in id order (§5 "Scheduling model").
    ///
    /// A single panel's `FdirError` does not abort the sweep for the
    /// others (§5/§7 fault-domain isolation); it is collected and
    /// returned once every panel has had a chance to tick.
    pub fn tick_all(&mut self) -> [Result<TickOutcome, FdirError>; N] {
        let now = self.hw.now_ms();
        let mut results: [Result<TickOutcome, FdirError>; N] =
            core::array::from_fn(|_| Ok(TickOutcome::Skipped(SkipReason::NotReady)));
        for i in 0..N {
            let panel = &mut self.panels[i];
            let cmd = self.ground_commands.take(panel.panel());
            let span = tracing::info_span!("panel_tick", panel = panel.panel());
            let _guard = span.enter();
            results[i] = panel.tick(
                &mut self.hw,
                &self.predictor,
                &mut self.telemetry,
                &self.config,
                cmd,
                now,
            );
        }
        results
    }

    /// Snapshot every panel's persistable state, in id order.
    pub fn snapshot_all(&self) -> [PanelSnapshot; N] {
        core::array::from_fn(|i| self.panels[i].snapshot())
    }

    /// Restore every panel's persistable state from a prior snapshot set.
    /// Snapshots are matched by array position, not by `panel` field.
    pub fn restore_all(&mut self, snapshots: &[PanelSnapshot; N]) {
        for (panel, snapshot) in self.panels.iter_mut().zip(snapshots.iter()) {
            panel.restore(snapshot);
        }
    }

    /// Save every panel's state to `store` (§6 "Persistence", called at
    /// the >=10 min cadence [`eps_common::consts::MIN_PERSISTENCE_INTERVAL_MS`]
    /// bounds). A failure is surfaced but never undoes in-RAM FSM state
    /// (§7).
    pub fn save_snapshots(&self, store: &SnapshotStore) -> Result<(), FdirError> {
        let snapshots = PersistedSnapshots::new(self.snapshot_all().to_vec());
        store.save(&snapshots)
    }

    /// Load and restore state from `store`, once at startup after
    /// [`Self::new`]. A missing or incompatible file is not an error: the
    /// system simply starts cold.
    pub fn load_snapshots(&mut self, store: &SnapshotStore) -> Result<bool, FdirError> {
        let Some(persisted) = store.load()? else {
            return Ok(false);
        };
        if persisted.panels.len() != N {
            return Err(FdirError::PersistenceError(format!(
                "snapshot has {} panels, expected {N}",
                persisted.panels.len()
            )));
        }
        for (panel, snapshot) in self.panels.iter_mut().zip(persisted.panels.iter()) {
            panel.restore(snapshot);
        }
        Ok(true)
    }

    #[inline]
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    #[inline]
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    #[inline]
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}
