//! Guess evaluation: feedback simulation and entropy-driven selection.

pub mod entropy;
pub mod feedback;
mod search;

pub use feedback::{Feedback, ShownMask, simulate_feedback};
pub use search::{
    EvalError, EvalLimits, EvaluationOutcome, ScoredGuess, candidate_guesses, evaluate_guesses,
    feedback_partition,
};
