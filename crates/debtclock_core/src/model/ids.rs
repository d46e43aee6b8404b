//! Identifiers for refresh cycles
//!
//! Every refresh cycle gets a fresh [`CycleId`]. A cycle's result is only
//! rendered when its id is still the most recent one handed out.

use serde::{Deserialize, Serialize};

/// Identifier of one refresh cycle, increasing with every cycle started
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub u64);

/// Hands out cycle ids and remembers the latest one.
#[derive(Debug, Default)]
pub struct CycleTracker {
    latest: u64,
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle, superseding every earlier one.
    pub fn begin(&mut self) -> CycleId {
        self.latest += 1;
        CycleId(self.latest)
    }

    pub fn latest(&self) -> Option<CycleId> {
        (self.latest > 0).then_some(CycleId(self.latest))
    }

    pub fn is_current(&self, id: CycleId) -> bool {
        id.0 == self.latest
    }
}
