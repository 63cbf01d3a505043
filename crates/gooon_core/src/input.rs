//! Touch input normalisation.
//!
//! Hosts report touches with arbitrary pointer ids. The tracker maps every
//! pointer that goes down onto the lowest free **touch slot**, so slot 0 is
//! always the first finger of a gesture (the primary touch) and further
//! simultaneous fingers get 1, 2, ...
//!
//! - **Press / Move** are forwarded on the pointer's slot.
//! - **Release** frees the slot and is forwarded. This is the only phase the
//!   countdown reacts to.
//! - **Cancel** frees the slot but emits nothing: a gesture the OS took away
//!   is not a tap.

use std::collections::HashMap;

/// Slot reserved for the primary touch point.
pub const PRIMARY_SLOT: u32 = 0;

/// Pointer id the desktop host uses for the left mouse button.
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Press,
    Move,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub slot: u32,
    pub phase: TouchPhase,
}

impl TouchEvent {
    pub fn new(slot: u32, phase: TouchPhase) -> Self {
        Self { slot, phase }
    }

    /// True for the release edge of the primary touch point.
    pub fn is_primary_release(&self) -> bool {
        self.slot == PRIMARY_SLOT && self.phase == TouchPhase::Release
    }
}

#[derive(Debug, Default)]
pub struct TouchTracker {
    slots: HashMap<u64, u32>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    pub fn pointer_down(&mut self, pointer_id: u64) -> Option<TouchEvent> {
        if let Some(&slot) = self.slots.get(&pointer_id) {
            // Repeated press without release; hosts do this after focus loss.
            log::trace!("pointer {pointer_id} pressed twice, keeping slot {slot}");
            return None;
        }
        let slot = self.lowest_free_slot();
        self.slots.insert(pointer_id, slot);
        Some(TouchEvent::new(slot, TouchPhase::Press))
    }

    pub fn pointer_moved(&self, pointer_id: u64) -> Option<TouchEvent> {
        self.slots
            .get(&pointer_id)
            .map(|&slot| TouchEvent::new(slot, TouchPhase::Move))
    }

    pub fn pointer_up(&mut self, pointer_id: u64) -> Option<TouchEvent> {
        self.slots
            .remove(&pointer_id)
            .map(|slot| TouchEvent::new(slot, TouchPhase::Release))
    }

    pub fn pointer_cancelled(&mut self, pointer_id: u64) {
        if let Some(slot) = self.slots.remove(&pointer_id) {
            log::debug!("touch slot {slot} cancelled");
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    fn lowest_free_slot(&self) -> u32 {
        let mut slot = 0;
        while self.slots.values().any(|&s| s == slot) {
            slot += 1;
        }
        slot
    }
}
