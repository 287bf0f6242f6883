use crate::knowledge::{Belief, KnowledgeTable, TableError};
use crate::model::card::{Card, CardId};
use crate::model::category::Category;
use crate::model::guess::Triple;
use crate::model::registry::{LookupError, Registry};
use crate::solution::{BestGuess, SolutionSpace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot names unknown player '{0}'")]
    UnknownPlayer(String),
    #[error("snapshot has no entry for player '{0}'")]
    MissingPlayer(String),
    #[error("snapshot key '{0}' does not name a card of this game")]
    UnknownCard(String),
    #[error("snapshot has no belief about '{card}' for '{player}'")]
    MissingEntry { player: String, card: String },
    #[error("snapshot table is inconsistent: {0}")]
    Table(#[from] TableError),
    #[error("snapshot lists possible {category}s that do not match its table")]
    Inconsistent { category: Category },
    #[error("snapshot best guess: {0}")]
    BestGuess(LookupError),
    #[error("snapshot best guess names a card that is no longer possible")]
    StaleBestGuess,
}

/// Logical on-disk form of the knowledge state.
///
/// Beliefs are keyed by player name, then by `"<card name> (<category>)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub players: BTreeMap<String, BTreeMap<String, Belief>>,
    pub possible_suspects: Vec<String>,
    pub possible_weapons: Vec<String>,
    pub possible_rooms: Vec<String>,
    #[serde(default)]
    pub best_guess: Option<[String; 3]>,
}

/// Result of [`KnowledgeSnapshot::restore`].
#[derive(Debug, Clone)]
pub struct RestoredKnowledge {
    pub table: KnowledgeTable,
    pub best_guess: Option<BestGuess>,
}

impl KnowledgeSnapshot {
    pub fn capture(
        registry: &Registry,
        table: &KnowledgeTable,
        best_guess: Option<&BestGuess>,
    ) -> Self {
        let players = registry
            .player_ids()
            .map(|player| {
                let beliefs = registry
                    .card_ids()
                    .map(|card| (registry.card(card).key(), table.get(player, card)))
                    .collect();
                (registry.player(player).name.clone(), beliefs)
            })
            .collect();
        let space = SolutionSpace::derive(registry, table);
        Self {
            players,
            possible_suspects: registry.card_names(space.suspects()),
            possible_weapons: registry.card_names(space.weapons()),
            possible_rooms: registry.card_names(space.rooms()),
            best_guess: best_guess.map(|best| best.guess.names(registry)),
        }
    }

    /// Rebuilds the table and best guess, rejecting snapshots whose lists
    /// disagree with what the table implies.
    pub fn restore(&self, registry: &Registry) -> Result<RestoredKnowledge, SnapshotError> {
        for name in self.players.keys() {
            registry
                .find_player(name)
                .map_err(|_| SnapshotError::UnknownPlayer(name.clone()))?;
        }

        let mut rows = Vec::with_capacity(registry.player_count());
        for player in registry.player_ids() {
            let name = &registry.player(player).name;
            let stored = self
                .players
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, beliefs)| beliefs)
                .ok_or_else(|| SnapshotError::MissingPlayer(name.clone()))?;

            let mut row = vec![None; registry.card_count()];
            for (key, belief) in stored {
                let card = lookup_key(registry, key)?;
                row[card.index()] = Some(*belief);
            }
            let row = row
                .into_iter()
                .enumerate()
                .map(|(index, belief)| {
                    belief.ok_or_else(|| SnapshotError::MissingEntry {
                        player: name.clone(),
                        card: registry
                            .card_ids()
                            .nth(index)
                            .map(|id| registry.card(id).key())
                            .unwrap_or_default(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let table = KnowledgeTable::from_rows(registry, rows)?;
        let space = SolutionSpace::derive(registry, &table);
        for category in Category::ALL {
            let derived = registry.card_names(space.candidates(category));
            if !same_names(&derived, self.possible(category)) {
                return Err(SnapshotError::Inconsistent { category });
            }
        }

        let best_guess = match &self.best_guess {
            Some([suspect, weapon, room]) => {
                let guess = Triple::resolve(registry, suspect, weapon, room)
                    .map_err(SnapshotError::BestGuess)?;
                let best = BestGuess::classify(guess, &space);
                if !best.is_valid(&space) {
                    return Err(SnapshotError::StaleBestGuess);
                }
                Some(best)
            }
            None => None,
        };

        Ok(RestoredKnowledge { table, best_guess })
    }

    pub fn possible(&self, category: Category) -> &[String] {
        match category {
            Category::Suspect => &self.possible_suspects,
            Category::Weapon => &self.possible_weapons,
            Category::Room => &self.possible_rooms,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn lookup_key(registry: &Registry, key: &str) -> Result<CardId, SnapshotError> {
    let unknown = || SnapshotError::UnknownCard(key.to_string());
    let (name, category) = Card::parse_key(key).ok_or_else(unknown)?;
    registry.find_card_in(category, name).map_err(|_| unknown())
}

fn same_names(derived: &[String], stored: &[String]) -> bool {
    let mut derived: Vec<String> = derived.iter().map(|n| n.to_lowercase()).collect();
    let mut stored: Vec<String> = stored.iter().map(|n| n.trim().to_lowercase()).collect();
    derived.sort();
    stored.sort();
    derived == stored
}
