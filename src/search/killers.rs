//! Killer moves: quiet moves that caused a cutoff at the same ply.

use crate::types::{Move, Ply, MAX_PLY};

/// Two slots per ply, most recent first.
#[derive(Clone)]
pub struct KillerTable {
    slots: Vec<[Option<Move>; 2]>,
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: vec![[None; 2]; MAX_PLY as usize],
        }
    }

    /// Remember a cutoff move; the older killer is pushed to the second slot.
    #[inline]
    pub fn store(&mut self, ply: Ply, m: Move) {
        if let Some(slot) = self.slots.get_mut(ply.as_index()) {
            if slot[0] != Some(m) {
                slot[1] = slot[0];
                slot[0] = Some(m);
            }
        }
    }

    #[inline]
    pub fn get(&self, ply: Ply) -> [Option<Move>; 2] {
        self.slots.get(ply.as_index()).copied().unwrap_or([None; 2])
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = [None; 2];
        }
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}
