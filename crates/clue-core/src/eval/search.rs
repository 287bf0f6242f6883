//! Expected-entropy search over candidate guesses.

use super::entropy::{expected_remaining_entropy, partition_entropy};
use super::feedback::{Feedback, simulate_feedback};
use crate::knowledge::KnowledgeTable;
use crate::model::card::CardId;
use crate::model::category::Category;
use crate::model::guess::{Guess, Solution};
use crate::model::player::PlayerId;
use crate::model::registry::Registry;
use crate::solution::{BestGuess, SolutionSpace};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{Level, event};

const TIE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Max surviving solutions the search will enumerate.
    pub max_solutions: usize,
    /// Max candidate guesses the search will score.
    pub max_candidates: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_solutions: 10_000,
            max_candidates: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("search space too large: {count} surviving solutions exceeds {limit}")]
    TooManySolutions { count: usize, limit: usize },
    #[error("search space too large: {count} candidate guesses exceeds {limit}")]
    TooManyCandidates { count: usize, limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredGuess {
    pub best: BestGuess,
    /// Entropy of the feedback partition in bits (higher reveals more).
    pub entropy_bits: f64,
    /// Expected bits of uncertainty left afterwards (lower is better).
    pub expected_remaining_bits: f64,
    /// Number of distinct feedback signatures.
    pub outcomes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvaluationOutcome {
    Selected(ScoredGuess),
    /// Nothing to ask about, e.g. no reachable rooms.
    NoGuessesAvailable,
    /// The recorded data admits no envelope at all.
    NoPossibleSolutions,
}

impl EvaluationOutcome {
    pub fn best_guess(&self) -> Option<BestGuess> {
        match self {
            EvaluationOutcome::Selected(scored) => Some(scored.best),
            _ => None,
        }
    }
}

/// Candidate suspects and weapons × the accessible rooms, in canonical order.
pub fn candidate_guesses(
    registry: &Registry,
    space: &SolutionSpace,
    accessible_rooms: &[CardId],
) -> Vec<Guess> {
    let rooms: Vec<CardId> = registry
        .canonical(Category::Room)
        .iter()
        .copied()
        .filter(|room| accessible_rooms.contains(room))
        .collect();
    let mut guesses =
        Vec::with_capacity(space.suspects().len() * space.weapons().len() * rooms.len());
    for &suspect in space.suspects() {
        for &weapon in space.weapons() {
            for &room in &rooms {
                guesses.push(Guess::new(suspect, weapon, room));
            }
        }
    }
    guesses
}

/// Groups `solutions` by the feedback `guess` would produce and returns the group sizes.
pub fn feedback_partition(
    table: &KnowledgeTable,
    guess: &Guess,
    solutions: &[Solution],
    asked_order: &[PlayerId],
) -> Vec<usize> {
    let mut groups: BTreeMap<Feedback, usize> = BTreeMap::new();
    for solution in solutions {
        *groups
            .entry(simulate_feedback(table, guess, solution, asked_order))
            .or_default() += 1;
    }
    groups.into_values().collect()
}

/// Picks the guess minimizing expected remaining entropy; first candidate wins ties.
pub fn evaluate_guesses(
    registry: &Registry,
    table: &KnowledgeTable,
    space: &SolutionSpace,
    asked_order: &[PlayerId],
    accessible_rooms: &[CardId],
    limits: &EvalLimits,
) -> Result<EvaluationOutcome, EvalError> {
    let solution_count = space.len();
    if solution_count == 0 {
        return Ok(EvaluationOutcome::NoPossibleSolutions);
    }
    if solution_count > limits.max_solutions {
        return Err(EvalError::TooManySolutions {
            count: solution_count,
            limit: limits.max_solutions,
        });
    }

    let candidates = candidate_guesses(registry, space, accessible_rooms);
    if candidates.is_empty() {
        return Ok(EvaluationOutcome::NoGuessesAvailable);
    }
    if candidates.len() > limits.max_candidates {
        return Err(EvalError::TooManyCandidates {
            count: candidates.len(),
            limit: limits.max_candidates,
        });
    }

    let solutions: Vec<Solution> = space.solutions().collect();
    let mut best: Option<(Guess, Vec<usize>, f64)> = None;
    for guess in &candidates {
        let groups = feedback_partition(table, guess, &solutions, asked_order);
        let remaining = expected_remaining_entropy(&groups);
        let better = match &best {
            Some((_, _, best_remaining)) => remaining < best_remaining - TIE_EPSILON,
            None => true,
        };
        if better {
            best = Some((*guess, groups, remaining));
        }
    }

    let Some((guess, groups, remaining)) = best else {
        return Ok(EvaluationOutcome::NoGuessesAvailable);
    };
    let scored = ScoredGuess {
        best: BestGuess::classify(guess, space),
        entropy_bits: partition_entropy(&groups),
        expected_remaining_bits: remaining,
        outcomes: groups.len(),
    };

    if tracing::enabled!(Level::INFO) {
        let [suspect, weapon, room] = guess.names(registry);
        event!(
            target: "clue_core::eval",
            Level::INFO,
            candidates = candidates.len(),
            solutions = solutions.len(),
            asked = asked_order.len(),
            suspect = %suspect,
            weapon = %weapon,
            room = %room,
            tag = ?scored.best.tag,
            entropy_bits = scored.entropy_bits,
            remaining_bits = scored.expected_remaining_bits,
            "best guess selected"
        );
    }

    Ok(EvaluationOutcome::Selected(scored))
}
