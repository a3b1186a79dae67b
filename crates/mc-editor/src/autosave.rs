//! Debounced autosave, as a clock-driven state machine.
//!
//! The host owns the network: it feeds the machine timestamps, asks `poll`
//! whether a save is due, performs the PUT, and reports back. Keeping time
//! explicit makes the debounce testable without timers.
//!
//! Rules:
//! - Until the initial load attempt finishes (either way), nothing is saved
//!   and mutations are not remembered.
//! - Every mutation pushes the deadline out to `now + quiet_ms`.
//! - At most one save is in flight; a mutation during a save schedules the
//!   next one.

use serde::Serialize;

/// Save state shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Saved,
    Saving,
    Error,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveStatus::Saved => "saved",
            SaveStatus::Saving => "saving",
            SaveStatus::Error => "error",
        }
    }
}

#[derive(Debug)]
pub struct Autosave {
    quiet_ms: u64,
    load_finished: bool,
    deadline: Option<u64>,
    in_flight: bool,
    status: SaveStatus,
}

impl Autosave {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            load_finished: false,
            deadline: None,
            in_flight: false,
            status: SaveStatus::Saved,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn is_load_finished(&self) -> bool {
        self.load_finished
    }

    /// Whether a save is scheduled but not yet issued.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Release the initial-load gate.
    pub fn finish_load(&mut self) {
        if !self.load_finished {
            log::info!("autosave: initial load finished, saving enabled");
        }
        self.load_finished = true;
    }

    /// Record a mutation at `now_ms`; (re)schedules the save. Ignored while
    /// the load gate is engaged. Returns whether a save was scheduled.
    pub fn note_mutation(&mut self, now_ms: u64) -> bool {
        if !self.load_finished {
            log::debug!("autosave: mutation before initial load, not scheduling");
            return false;
        }
        self.deadline = Some(now_ms.saturating_add(self.quiet_ms));
        true
    }

    /// `true` when a save should be issued now. The caller must follow up
    /// with `save_started` and, later, `save_finished`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.load_finished || self.in_flight {
            return false;
        }
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn save_started(&mut self) {
        self.in_flight = true;
        self.status = SaveStatus::Saving;
    }

    pub fn save_finished(&mut self, ok: bool) {
        self.in_flight = false;
        self.status = if ok {
            SaveStatus::Saved
        } else {
            log::warn!("autosave: save failed, will retry on next change");
            SaveStatus::Error
        };
    }
}
