mod ids;
mod record;

pub use ids::{CycleId, CycleTracker};
pub use record::{DebtRecord, Provenance, SourceKind, is_valid_amount};
