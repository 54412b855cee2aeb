//! Application use cases.

mod effects;
mod rolls;

pub use effects::{EffectSync, PendingChoice, SyncReport};
pub use rolls::{CheckOutcome, RollError, RollService};
