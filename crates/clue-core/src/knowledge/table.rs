//! Per-player, per-card belief storage with sticky upgrade rules.

use super::belief::Belief;
use crate::model::card::CardId;
use crate::model::category::Category;
use crate::model::player::PlayerId;
use crate::model::registry::Registry;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::{debug, warn};

/// Result of a single [`KnowledgeTable::set_belief`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeliefChange {
    Applied { from: Belief, to: Belief },
    /// Sticky or no-op upgrade; silently ignored.
    Unchanged,
    /// The upgrade would break a table-wide conservation rule; ignored.
    Conflict(Conflict),
}

impl BeliefChange {
    pub fn is_applied(self) -> bool {
        matches!(self, BeliefChange::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// Another player is already known to hold the card.
    AlreadyHeld { holder: PlayerId },
    /// Another card of the same category is already marked as the solution.
    SolutionTaken { card: CardId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("card {card:?} is held by both {first:?} and {second:?}")]
    DoubleHolder {
        card: CardId,
        first: PlayerId,
        second: PlayerId,
    },
    #[error("{category} has more than one solution card")]
    DoubleSolution { category: Category },
    #[error("the user's hand card {0:?} is not marked as held")]
    HandNotHeld(CardId),
    #[error("table shape mismatch: expected {expected} entries, found {found}")]
    Shape { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeTable {
    players: usize,
    cards: usize,
    categories: Vec<Category>,
    beliefs: Vec<Belief>,
    revision: u64,
}

impl KnowledgeTable {
    /// All `Unknown`, except the user's own hand which starts as `Has`.
    pub fn new(registry: &Registry) -> Self {
        let mut table = Self::blank(registry);
        let user = registry.user();
        for &card in registry.user_hand() {
            let slot = table.slot(user, card);
            table.beliefs[slot] = Belief::Has;
        }
        table
    }

    /// Rebuilds a table from stored rows (`rows[player][card]`), checking conservation.
    pub fn from_rows(registry: &Registry, rows: Vec<Vec<Belief>>) -> Result<Self, TableError> {
        let mut table = Self::blank(registry);
        let expected = table.beliefs.len();
        let found: usize = rows.iter().map(Vec::len).sum();
        if rows.len() != table.players || found != expected {
            return Err(TableError::Shape { expected, found });
        }
        table.beliefs = rows.into_iter().flatten().collect();
        table.check_conservation()?;
        let user = registry.user();
        for &card in registry.user_hand() {
            if table.get(user, card) != Belief::Has {
                return Err(TableError::HandNotHeld(card));
            }
        }
        Ok(table)
    }

    fn blank(registry: &Registry) -> Self {
        let players = registry.player_count();
        let cards = registry.card_count();
        Self {
            players,
            cards,
            categories: registry
                .card_ids()
                .map(|id| registry.card(id).category)
                .collect(),
            beliefs: vec![Belief::Unknown; players * cards],
            revision: 0,
        }
    }

    fn slot(&self, player: PlayerId, card: CardId) -> usize {
        player.index() * self.cards + card.index()
    }

    pub fn get(&self, player: PlayerId, card: CardId) -> Belief {
        self.beliefs[self.slot(player, card)]
    }

    /// Beliefs of one player, indexed by card.
    pub fn row(&self, player: PlayerId) -> &[Belief] {
        let start = player.index() * self.cards;
        &self.beliefs[start..start + self.cards]
    }

    /// Applies the upgrade lattice. Rejected upgrades leave the table untouched.
    pub fn set_belief(&mut self, player: PlayerId, card: CardId, proposed: Belief) -> BeliefChange {
        let current = self.get(player, card);
        if !current.accepts(proposed) {
            return BeliefChange::Unchanged;
        }
        if let Some(conflict) = self.conflict_for(player, card, proposed) {
            warn!(
                target: "clue_core::knowledge",
                player = player.index(),
                card = card.index(),
                proposed = %proposed,
                conflict = ?conflict,
                "ignoring belief upgrade that breaks conservation"
            );
            return BeliefChange::Conflict(conflict);
        }
        let slot = self.slot(player, card);
        self.beliefs[slot] = proposed;
        self.revision += 1;
        debug!(
            target: "clue_core::knowledge",
            player = player.index(),
            card = card.index(),
            from = %current,
            to = %proposed,
            revision = self.revision,
            "belief upgraded"
        );
        BeliefChange::Applied {
            from: current,
            to: proposed,
        }
    }

    fn conflict_for(&self, player: PlayerId, card: CardId, proposed: Belief) -> Option<Conflict> {
        match proposed {
            Belief::Has => self
                .holder(card)
                .filter(|holder| *holder != player)
                .map(|holder| Conflict::AlreadyHeld { holder }),
            Belief::IsSolution => {
                let category = self.categories[card.index()];
                self.solution_card(category)
                    .filter(|existing| *existing != card)
                    .map(|existing| Conflict::SolutionTaken { card: existing })
            }
            _ => None,
        }
    }

    /// The player known to hold `card`, if any.
    pub fn holder(&self, card: CardId) -> Option<PlayerId> {
        (0..self.players)
            .map(|index| PlayerId(index as u8))
            .find(|player| self.get(*player, card) == Belief::Has)
    }

    pub fn is_held(&self, card: CardId) -> bool {
        self.holder(card).is_some()
    }

    /// The card of `category` marked `IsSolution` in any player's row.
    pub fn solution_card(&self, category: Category) -> Option<CardId> {
        (0..self.cards)
            .map(|index| CardId(index as u16))
            .filter(|card| self.categories[card.index()] == category)
            .find(|card| {
                (0..self.players).any(|p| self.get(PlayerId(p as u8), *card) == Belief::IsSolution)
            })
    }

    /// Monotonic counter bumped on every applied change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn count(&self, belief: Belief) -> usize {
        self.beliefs.iter().filter(|b| **b == belief).count()
    }

    /// Hash of the full table contents, used as a cache key.
    pub fn summary_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.players.hash(&mut hasher);
        self.cards.hash(&mut hasher);
        self.beliefs.hash(&mut hasher);
        hasher.finish()
    }

    fn check_conservation(&self) -> Result<(), TableError> {
        for index in 0..self.cards {
            let card = CardId(index as u16);
            let mut holders = (0..self.players)
                .map(|p| PlayerId(p as u8))
                .filter(|p| self.get(*p, card) == Belief::Has);
            if let (Some(first), Some(second)) = (holders.next(), holders.next()) {
                return Err(TableError::DoubleHolder {
                    card,
                    first,
                    second,
                });
            }
        }
        for category in Category::ALL {
            let solutions = (0..self.cards)
                .filter(|index| self.categories[*index] == category)
                .filter(|index| {
                    (0..self.players)
                        .any(|p| self.get(PlayerId(p as u8), CardId(*index as u16)) == Belief::IsSolution)
                })
                .count();
            if solutions > 1 {
                return Err(TableError::DoubleSolution { category });
            }
        }
        Ok(())
    }
}
