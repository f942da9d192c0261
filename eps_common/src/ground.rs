//! Ground-command interface (§3, §6).
//!
//! Single-producer (comms layer) / single-consumer (FSM) per-panel slot.
//! The producer posts with simple store semantics; the FSM polls and
//! clears after consumption (§5 "Shared resources").

use serde::{Deserialize, Serialize};

/// Ground-approved command directed at a single panel's [`crate::persistence`]/FSM
/// state (§3 "GroundCommand").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroundCommand {
    /// No pending command (slot empty).
    #[default]
    None,
    /// Ground has approved re-enabling a tripped panel (§4.6 TRIPPED → RECOVERY).
    Reenable,
    /// Ground has ordered the panel permanently disabled (§4.6 [FULL]).
    PermanentDisable,
    /// Ground has ordered the panel's lifetime counters reset to zero.
    ResetStats,
}

/// A fixed-size array of per-panel command slots.
///
/// `post` overwrites any unconsumed command (the newest ground directive
/// wins); `take` clears the slot on read, matching the FSM's
/// consume-and-clear contract.
#[derive(Debug, Clone)]
pub struct GroundCommandTable<const N: usize> {
    slots: [GroundCommand; N],
}

impl<const N: usize> Default for GroundCommandTable<N> {
    fn default() -> Self {
        Self {
            slots: [GroundCommand::None; N],
        }
    }
}

impl<const N: usize> GroundCommandTable<N> {
    /// Create an empty command table.
    pub const fn new() -> Self {
        Self {
            slots: [GroundCommand::None; N],
        }
    }

    /// Post a command for `panel`. Out-of-range ids are ignored
    /// (`BadPanelId` is a caller bug per §7, not a panic).
    pub fn post(&mut self, panel: u8, command: GroundCommand) {
        if let Some(slot) = self.slots.get_mut(panel as usize) {
            *slot = command;
        }
    }

    /// Consume and clear the command posted for `panel`, if any.
    pub fn take(&mut self, panel: u8) -> GroundCommand {
        match self.slots.get_mut(panel as usize) {
            Some(slot) => core::mem::replace(slot, GroundCommand::None),
            None => GroundCommand::None,
        }
    }
}
