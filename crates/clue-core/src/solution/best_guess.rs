use super::space::SolutionSpace;
use crate::model::guess::Guess;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessTag {
    /// Every card in the guess could still be in the envelope.
    SolutionSeeking,
    /// The guess names a room already proven held; it can only gather information.
    InformationOnly,
}

/// Cached recommendation. Re-validated after each belief change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestGuess {
    pub guess: Guess,
    pub tag: GuessTag,
}

impl BestGuess {
    pub fn classify(guess: Guess, space: &SolutionSpace) -> Self {
        let tag = if guess.cards().iter().all(|card| space.contains(*card)) {
            GuessTag::SolutionSeeking
        } else {
            GuessTag::InformationOnly
        };
        Self { guess, tag }
    }

    /// Suspect and weapon must still be candidates; the room too for a solution-seeking guess.
    pub fn is_valid(&self, space: &SolutionSpace) -> bool {
        let core_live = space.contains(self.guess.suspect) && space.contains(self.guess.weapon);
        match self.tag {
            GuessTag::SolutionSeeking => core_live && space.contains(self.guess.room),
            GuessTag::InformationOnly => core_live,
        }
    }
}
