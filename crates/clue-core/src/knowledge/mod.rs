//! Knowledge tracking: the belief lattice, the per-player table, and the
//! guess-event inference protocol that feeds it.

mod belief;
pub mod inference;
mod table;

pub use belief::{Belief, UnknownBelief};
pub use inference::{
    BeliefUpdate, GuessError, InferenceReport, apply_updates, plan_updates, record_guess_event,
    validate_event,
};
pub use table::{BeliefChange, Conflict, KnowledgeTable, TableError};
