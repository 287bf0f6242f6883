//! Belief-update protocol for one observed guess.
//!
//! Updates are planned in full before any is applied, so a rejected event never
//! leaves the table half-updated.

use super::belief::Belief;
use super::table::{BeliefChange, Conflict, KnowledgeTable};
use crate::model::card::CardId;
use crate::model::category::Category;
use crate::model::guess::GuessEvent;
use crate::model::player::PlayerId;
use crate::model::registry::Registry;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("{shower} showed a card to the user but the card is missing; the guesser must see any card shown to them")]
    ShownCardUnseen { shower: String },
    #[error("guessed {expected} '{name}' is a {actual}")]
    WrongCategory {
        name: String,
        expected: Category,
        actual: Category,
    },
    #[error("guesser {0} cannot be in the asked order")]
    GuesserAsked(String),
    #[error("player {0} appears more than once in the asked order")]
    DuplicateAsked(String),
    #[error("player {0} who showed a card was not asked")]
    ShowerNotAsked(String),
    #[error("shown card '{0}' is not one of the guessed cards")]
    ShownCardNotInGuess(String),
    #[error("a shown card was given without the player who showed it")]
    ShownWithoutShower,
    #[error("user_is_guesser does not match guesser {0}")]
    GuesserMismatch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeliefUpdate {
    pub player: PlayerId,
    pub card: CardId,
    pub belief: Belief,
}

impl BeliefUpdate {
    const fn new(player: PlayerId, card: CardId, belief: Belief) -> Self {
        Self {
            player,
            card,
            belief,
        }
    }
}

/// Tally of what applying a plan did to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceReport {
    pub applied: Vec<BeliefUpdate>,
    pub unchanged: usize,
    pub conflicts: Vec<(BeliefUpdate, Conflict)>,
}

impl InferenceReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Checks the event's shape against the registry.
pub fn validate_event(registry: &Registry, event: &GuessEvent) -> Result<(), GuessError> {
    let name = |player: PlayerId| registry.player(player).name.clone();

    for category in Category::ALL {
        let card = registry.card(event.guess.card(category));
        if card.category != category {
            return Err(GuessError::WrongCategory {
                name: card.name.clone(),
                expected: category,
                actual: card.category,
            });
        }
    }

    if event.user_is_guesser != (event.guesser == registry.user()) {
        return Err(GuessError::GuesserMismatch(name(event.guesser)));
    }

    for (position, player) in event.asked_order.iter().enumerate() {
        if *player == event.guesser {
            return Err(GuessError::GuesserAsked(name(*player)));
        }
        if event.asked_order[..position].contains(player) {
            return Err(GuessError::DuplicateAsked(name(*player)));
        }
    }

    match (event.showed_by, event.card_shown) {
        (Some(shower), card) => {
            if !event.asked_order.contains(&shower) {
                return Err(GuessError::ShowerNotAsked(name(shower)));
            }
            if let Some(card) = card {
                if !event.guess.contains(card) {
                    return Err(GuessError::ShownCardNotInGuess(registry.card(card).name.clone()));
                }
            } else if event.user_is_guesser {
                return Err(GuessError::ShownCardUnseen {
                    shower: name(shower),
                });
            }
        }
        (None, Some(_)) => return Err(GuessError::ShownWithoutShower),
        (None, None) => {}
    }

    Ok(())
}

/// Builds the ordered list of upgrades implied by `event`.
pub fn plan_updates(registry: &Registry, event: &GuessEvent) -> Result<Vec<BeliefUpdate>, GuessError> {
    validate_event(registry, event)?;

    let guess = event.guess.cards();
    let mut plan = Vec::new();

    if event.user_is_guesser {
        if event.showed_by.is_none() {
            for card in guess {
                let belief = if registry.user_holds(card) {
                    Belief::MightHave
                } else {
                    Belief::IsSolution
                };
                plan.push(BeliefUpdate::new(event.guesser, card, belief));
            }
        }
        for &player in &event.asked_order {
            if Some(player) == event.showed_by {
                let card = event.card_shown.ok_or_else(|| GuessError::ShownCardUnseen {
                    shower: registry.player(player).name.clone(),
                })?;
                plan.push(BeliefUpdate::new(player, card, Belief::Has));
            } else {
                plan.extend(guess.map(|card| BeliefUpdate::new(player, card, Belief::NotHas)));
            }
        }
    } else {
        if event.showed_by.is_none() {
            plan.extend(guess.map(|card| BeliefUpdate::new(event.guesser, card, Belief::MightHave)));
        }
        let user = registry.user();
        for &player in event.asked_order.iter().filter(|p| **p != user) {
            let belief = if Some(player) == event.showed_by {
                Belief::MightHave
            } else {
                Belief::NotHas
            };
            plan.extend(guess.map(|card| BeliefUpdate::new(player, card, belief)));
        }
    }

    Ok(plan)
}

pub fn apply_updates(table: &mut KnowledgeTable, plan: &[BeliefUpdate]) -> InferenceReport {
    let mut report = InferenceReport::default();
    for update in plan {
        match table.set_belief(update.player, update.card, update.belief) {
            BeliefChange::Applied { .. } => report.applied.push(*update),
            BeliefChange::Unchanged => report.unchanged += 1,
            BeliefChange::Conflict(conflict) => report.conflicts.push((*update, conflict)),
        }
    }
    report
}

/// Validates, plans and applies one guess event.
pub fn record_guess_event(
    registry: &Registry,
    table: &mut KnowledgeTable,
    guess_event: &GuessEvent,
) -> Result<InferenceReport, GuessError> {
    let plan = plan_updates(registry, guess_event)?;
    let report = apply_updates(table, &plan);
    event!(
        target: "clue_core::inference",
        Level::INFO,
        guesser = %registry.player(guess_event.guesser),
        user_is_guesser = guess_event.user_is_guesser,
        asked = guess_event.asked_order.len(),
        showed = guess_event.showed_by.is_some(),
        planned = plan.len(),
        applied = report.applied.len(),
        conflicts = report.conflicts.len(),
        "guess event recorded"
    );
    Ok(report)
}
