//! Error types shared across the FDIR workspace (§7).
//!
//! `FdirError` is the single error currency for both the FDIR core and
//! any hardware/persistence binding. `ConfigError` is kept distinct
//! (config loading happens once, well before any panel's RT path) but
//! embeds into `FdirError` so callers that thread one error type through
//! `init` and through `panel_tick` can still do so.

use thiserror::Error;

/// Errors raised while loading or validating `SystemConfig` (§3 "Validation").
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at the given path.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// `bias.alpha` outside `(0, 1]`.
    #[error("bias.alpha must be in (0, 1], got {0}")]
    InvalidAlpha(f32),

    /// `bias.warmup` is zero.
    #[error("bias.warmup must be >= 1")]
    InvalidWarmup,

    /// `quantile_p` outside `(0, 1)`.
    #[error("quantile_p must be in (0, 1), got {0}")]
    InvalidQuantileP(f32),

    /// A threshold that must be positive was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositiveThreshold {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// `panels.len()` did not match the compile-time panel count.
    #[error("expected {expected} panels, found {found}")]
    PanelCountMismatch {
        /// Compile-time `N`.
        expected: usize,
        /// Number of `[[panels]]` entries actually read.
        found: usize,
    },

    /// Two panel entries declared the same id.
    #[error("duplicate panel id: {0}")]
    DuplicatePanelId(u8),

    /// A panel id fell outside `[0, N)`.
    #[error("panel id {id} out of range for N={n}")]
    PanelIdOutOfRange {
        /// The offending id.
        id: u8,
        /// Compile-time panel count.
        n: usize,
    },
}

/// Unified error type for the FDIR core and its collaborators (§7).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FdirError {
    /// Buffer, bias corrector, or quantile tracker has not warmed up yet.
    /// Callers should treat this as a silent skip, not a failure.
    #[error("panel {0} not ready")]
    NotReady(u8),

    /// Caller passed a panel id outside `[0, N)`. Indicates a caller bug;
    /// the FDIR core no-ops rather than panicking.
    #[error("bad panel id: {0}")]
    BadPanelId(u8),

    /// A hardware read did not complete; surfaced to telemetry, the tick
    /// is aborted for that panel only.
    #[error("hardware timeout on panel {panel}")]
    HardwareTimeout {
        /// The panel whose sensor read timed out.
        panel: u8,
    },

    /// Snapshot save/load failed; does not stop the FSM, RAM state is kept.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A division that would be zero was guarded and the step skipped
    /// (P² update numerical edge case, §4.4).
    #[error("arithmetic guard triggered")]
    Arithmetic,

    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
