//! Hardware abstraction boundary (§6, §9 "Hardware side effects").
//!
//! Replaces direct ADC/GPIO calls with a single trait. A production
//! binding wires these methods to vendor peripheral APIs (ADC driver,
//! GPIO driver, the Layer-2 comparator, the series MOSFET); a test
//! binding (`eps_fdir_core::testkit::SimulatedHardware`) records calls
//! and returns scripted values.
//!
//! # Timing contracts (§5 "Suspension points")
//!
//! | Method | Max duration | Notes |
//! |---|---|---|
//! | `read_voltage` / `read_current` | one tick budget | may block; ADC is shared across panels — callers serialize these |
//! | `enable_layer2` | ≤ 1 ms | may suspend briefly |
//! | `attempt_reenable_mosfet` | ≤ 10 ms | may suspend briefly |
//! | all other methods | effectively immediate | never block |

use crate::error::FdirError;

/// Abstract satellite EPS hardware: Layer-2 comparator, series MOSFET,
/// and the shared ADC (§6).
pub trait Hardware {
    /// Read the panel's measured voltage [V].
    ///
    /// # Errors
    /// Returns [`FdirError::HardwareTimeout`] if the ADC read does not
    /// complete within the tick budget.
    fn read_voltage(&mut self, panel: u8) -> Result<f32, FdirError>;

    /// Read the panel's measured current [A].
    ///
    /// # Errors
    /// Returns [`FdirError::HardwareTimeout`] if the ADC read does not
    /// complete within the tick budget.
    fn read_current(&mut self, panel: u8) -> Result<f32, FdirError>;

    /// Arm the Layer-2 (AI-gated) over-current comparator for `panel`.
    fn enable_layer2(&mut self, panel: u8);

    /// Disarm the Layer-2 comparator for `panel`.
    fn disable_layer2(&mut self, panel: u8);

    /// Returns `true` if the panel's series MOSFET reports open (tripped).
    fn check_mosfet_status(&mut self, panel: u8) -> bool;

    /// Attempt to close the series MOSFET after ground approval. May
    /// suspend briefly (≤10 ms) while the relay settles.
    fn attempt_reenable_mosfet(&mut self, panel: u8);

    /// Force the series MOSFET open, isolating the panel.
    fn disable_mosfet(&mut self, panel: u8);

    /// Monotonic tick source, in milliseconds.
    fn now_ms(&self) -> u32;
}
