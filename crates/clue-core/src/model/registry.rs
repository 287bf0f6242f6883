//! Immutable card and player identities established at game setup.

use crate::model::card::{Card, CardId};
use crate::model::category::Category;
use crate::model::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const CLASSIC_SUSPECTS: [&str; 6] = [
    "Miss Scarlet",
    "Colonel Mustard",
    "Mrs. White",
    "Mr. Green",
    "Mrs. Peacock",
    "Professor Plum",
];

pub const CLASSIC_WEAPONS: [&str; 6] = [
    "Candlestick",
    "Dagger",
    "Lead Pipe",
    "Revolver",
    "Rope",
    "Wrench",
];

pub const CLASSIC_ROOMS: [&str; 9] = [
    "Kitchen",
    "Ballroom",
    "Conservatory",
    "Dining Room",
    "Billiard Room",
    "Library",
    "Lounge",
    "Hall",
    "Study",
];

/// Raw setup input: names only, validated by [`Registry::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Player names in turn order.
    pub players: Vec<String>,
    pub user: String,
    #[serde(default)]
    pub hand: Vec<String>,
    pub suspects: Vec<String>,
    pub weapons: Vec<String>,
    pub rooms: Vec<String>,
}

impl GameSetup {
    /// Setup using the classic six suspects, six weapons and nine rooms.
    pub fn classic(players: &[&str], user: &str, hand: &[&str]) -> Self {
        Self {
            players: players.iter().map(|p| p.to_string()).collect(),
            user: user.to_string(),
            hand: hand.iter().map(|c| c.to_string()).collect(),
            suspects: CLASSIC_SUSPECTS.iter().map(|s| s.to_string()).collect(),
            weapons: CLASSIC_WEAPONS.iter().map(|s| s.to_string()).collect(),
            rooms: CLASSIC_ROOMS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn names(&self, category: Category) -> &[String] {
        match category {
            Category::Suspect => &self.suspects,
            Category::Weapon => &self.weapons,
            Category::Room => &self.rooms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("at least one {0} is required")]
    EmptyCategory(Category),
    #[error("at least two players are required")]
    TooFewPlayers,
    #[error("too many {what}: {count} exceeds {limit}")]
    TooMany {
        what: &'static str,
        count: usize,
        limit: usize,
    },
    #[error("{what} names must not be empty")]
    EmptyName { what: &'static str },
    #[error("card name '{0}' is defined more than once")]
    DuplicateCard(String),
    #[error("player name '{0}' must not contain a comma")]
    CommaInPlayerName(String),
    #[error("player name '{0}' is defined more than once")]
    DuplicatePlayer(String),
    #[error("user '{0}' is not among the players")]
    UnknownUser(String),
    #[error("hand card '{0}' is not a card in this game")]
    UnknownHandCard(String),
    #[error("hand card '{0}' is listed more than once")]
    DuplicateHandCard(String),
    #[error("board room '{0}' is not a room card")]
    UnknownBoardRoom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown card '{0}'")]
    UnknownCard(String),
    #[error("unknown player '{0}'")]
    UnknownPlayer(String),
    #[error("card '{name}' is a {actual}, expected a {expected}")]
    WrongCategory {
        name: String,
        expected: Category,
        actual: Category,
    },
}

#[derive(Debug, Clone)]
pub struct Registry {
    cards: Vec<Card>,
    by_category: [Vec<CardId>; 3],
    canonical: [Vec<CardId>; 3],
    players: Vec<Player>,
    user: PlayerId,
    user_hand: Vec<CardId>,
}

impl Registry {
    pub fn new(setup: &GameSetup) -> Result<Self, SetupError> {
        let mut cards = Vec::new();
        let mut by_category: [Vec<CardId>; 3] = Default::default();
        let mut seen = HashSet::new();

        for category in Category::ALL {
            let names = setup.names(category);
            if names.is_empty() {
                return Err(SetupError::EmptyCategory(category));
            }
            for raw in names {
                let name = raw.trim();
                if name.is_empty() {
                    return Err(SetupError::EmptyName { what: "card" });
                }
                if !seen.insert(name.to_lowercase()) {
                    return Err(SetupError::DuplicateCard(name.to_string()));
                }
                if cards.len() >= u16::MAX as usize {
                    return Err(SetupError::TooMany {
                        what: "cards",
                        count: cards.len() + 1,
                        limit: u16::MAX as usize,
                    });
                }
                by_category[category.index()].push(CardId(cards.len() as u16));
                cards.push(Card::new(name, category));
            }
        }

        let canonical = by_category.clone().map(|mut ids| {
            ids.sort_by_cached_key(|id| {
                let name = &cards[id.index()].name;
                (name.to_lowercase(), name.clone())
            });
            ids
        });

        if setup.players.len() < 2 {
            return Err(SetupError::TooFewPlayers);
        }
        if setup.players.len() > u8::MAX as usize {
            return Err(SetupError::TooMany {
                what: "players",
                count: setup.players.len(),
                limit: u8::MAX as usize,
            });
        }

        let user_name = setup.user.trim();
        let mut players = Vec::with_capacity(setup.players.len());
        let mut seen_players = HashSet::new();
        let mut user = None;
        for raw in &setup.players {
            let name = raw.trim();
            if name.is_empty() {
                return Err(SetupError::EmptyName { what: "player" });
            }
            if name.contains(',') {
                return Err(SetupError::CommaInPlayerName(name.to_string()));
            }
            if !seen_players.insert(name.to_lowercase()) {
                return Err(SetupError::DuplicatePlayer(name.to_string()));
            }
            let is_user = name.eq_ignore_ascii_case(user_name);
            if is_user {
                user = Some(PlayerId(players.len() as u8));
            }
            players.push(Player::new(name, is_user));
        }
        let user = user.ok_or_else(|| SetupError::UnknownUser(user_name.to_string()))?;

        let mut registry = Self {
            cards,
            by_category,
            canonical,
            players,
            user,
            user_hand: Vec::new(),
        };

        let mut hand = Vec::with_capacity(setup.hand.len());
        for raw in &setup.hand {
            let id = registry
                .find_card(raw)
                .map_err(|_| SetupError::UnknownHandCard(raw.trim().to_string()))?;
            if hand.contains(&id) {
                return Err(SetupError::DuplicateHandCard(raw.trim().to_string()));
            }
            hand.push(id);
        }
        registry.user_hand = hand;
        Ok(registry)
    }

    pub fn card(&self, id: CardId) -> &Card {
        &self.cards[id.index()]
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        (0..self.cards.len()).map(|index| CardId(index as u16))
    }

    /// Cards of `category` in declaration order.
    pub fn cards_in(&self, category: Category) -> &[CardId] {
        &self.by_category[category.index()]
    }

    /// Cards of `category` sorted by name; the order every tie-break uses.
    pub fn canonical(&self, category: Category) -> &[CardId] {
        &self.canonical[category.index()]
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.players.len()).map(|index| PlayerId(index as u8))
    }

    pub fn user(&self) -> PlayerId {
        self.user
    }

    pub fn user_hand(&self) -> &[CardId] {
        &self.user_hand
    }

    pub fn user_holds(&self, card: CardId) -> bool {
        self.user_hand.contains(&card)
    }

    /// Resolves a bare card name or a `"<name> (<category>)"` key, ignoring case.
    pub fn find_card(&self, query: &str) -> Result<CardId, LookupError> {
        let trimmed = query.trim();
        let (name, category) = match Card::parse_key(trimmed) {
            Some((name, category)) => (name, Some(category)),
            None => (trimmed, None),
        };
        self.card_ids()
            .find(|id| {
                let card = self.card(*id);
                card.name.eq_ignore_ascii_case(name)
                    && category.is_none_or(|expected| expected == card.category)
            })
            .ok_or_else(|| LookupError::UnknownCard(trimmed.to_string()))
    }

    pub fn find_card_in(&self, category: Category, query: &str) -> Result<CardId, LookupError> {
        let id = self.find_card(query)?;
        let card = self.card(id);
        if card.category != category {
            return Err(LookupError::WrongCategory {
                name: card.name.clone(),
                expected: category,
                actual: card.category,
            });
        }
        Ok(id)
    }

    pub fn find_player(&self, query: &str) -> Result<PlayerId, LookupError> {
        let trimmed = query.trim();
        self.player_ids()
            .find(|id| self.player(*id).name.eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LookupError::UnknownPlayer(trimmed.to_string()))
    }

    pub fn card_names(&self, ids: &[CardId]) -> Vec<String> {
        ids.iter().map(|id| self.card(*id).name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_setup() -> GameSetup {
        GameSetup {
            players: vec!["Me".into(), "Alice".into()],
            user: "Me".into(),
            hand: vec!["Rope".into()],
            suspects: vec!["Plum".into(), "Green".into()],
            weapons: vec!["Rope".into(), "Dagger".into()],
            rooms: vec!["Study".into(), "Hall".into()],
        }
    }

    #[test]
    fn builds_cards_in_declaration_and_canonical_order() {
        let registry = Registry::new(&small_setup()).expect("valid setup");
        assert_eq!(registry.card_count(), 6);
        let declared = registry.card_names(registry.cards_in(Category::Suspect));
        let canonical = registry.card_names(registry.canonical(Category::Suspect));
        assert_eq!(declared, vec!["Plum", "Green"]);
        assert_eq!(canonical, vec!["Green", "Plum"]);
    }

    #[test]
    fn user_hand_is_resolved() {
        let registry = Registry::new(&small_setup()).expect("valid setup");
        let rope = registry.find_card("rope").unwrap();
        assert!(registry.user_holds(rope));
        assert!(registry.player(registry.user()).is_user);
        assert_eq!(registry.player(registry.user()).name, "Me");
    }

    #[test]
    fn rejects_duplicate_card_names_across_categories() {
        let mut setup = small_setup();
        setup.rooms.push("Plum".into());
        assert_eq!(
            Registry::new(&setup).unwrap_err(),
            SetupError::DuplicateCard("Plum".into())
        );
    }

    #[test]
    fn rejects_unknown_user_and_hand_cards() {
        let mut setup = small_setup();
        setup.user = "Bob".into();
        assert_eq!(
            Registry::new(&setup).unwrap_err(),
            SetupError::UnknownUser("Bob".into())
        );

        let mut setup = small_setup();
        setup.hand = vec!["Wrench".into()];
        assert_eq!(
            Registry::new(&setup).unwrap_err(),
            SetupError::UnknownHandCard("Wrench".into())
        );
    }

    #[test]
    fn rejects_duplicate_players() {
        let mut setup = small_setup();
        setup.players.push("Alice".into());
        assert_eq!(
            Registry::new(&setup).unwrap_err(),
            SetupError::DuplicatePlayer("Alice".into())
        );
    }

    #[test]
    fn rejects_commas_in_player_names() {
        let mut setup = small_setup();
        setup.players.push("Smith, Jo".into());
        assert_eq!(
            Registry::new(&setup).unwrap_err(),
            SetupError::CommaInPlayerName("Smith, Jo".into())
        );
    }

    #[test]
    fn lookups_accept_keys_and_check_categories() {
        let registry = Registry::new(&small_setup()).unwrap();
        let hall = registry.find_card("Hall (room)").unwrap();
        assert_eq!(registry.card(hall).name, "Hall");
        assert!(registry.find_card("Hall (weapon)").is_err());
        assert!(matches!(
            registry.find_card_in(Category::Weapon, "Hall"),
            Err(LookupError::WrongCategory { .. })
        ));
        assert_eq!(
            registry.find_player("nobody").unwrap_err(),
            LookupError::UnknownPlayer("nobody".into())
        );
    }

    #[test]
    fn classic_setup_has_twenty_one_cards() {
        let setup = GameSetup::classic(&["Me", "Alice", "Bob"], "Me", &["Study"]);
        let registry = Registry::new(&setup).unwrap();
        assert_eq!(registry.card_count(), 21);
        assert_eq!(registry.cards_in(Category::Room).len(), 9);
    }

    #[test]
    fn player_names_differing_only_in_case_are_duplicates() {
        let mut setup = small_setup();
        setup.players = vec!["Me".into(), "Bob".into(), "bob".into()];
        assert_eq!(
            Registry::new(&setup).unwrap_err(),
            SetupError::DuplicatePlayer("bob".into())
        );
    }

    #[test]
    fn user_is_matched_ignoring_case() {
        let mut setup = small_setup();
        setup.players = vec!["me".into(), "Alice".into()];
        let registry = Registry::new(&setup).expect("user matches ignoring case");
        assert_eq!(registry.player(registry.user()).name, "me");
        assert_eq!(registry.find_player("ME").unwrap(), registry.user());
    }

    #[test]
    fn canonical_order_ignores_case() {
        let mut setup = small_setup();
        setup.suspects = vec!["Plum".into(), "green".into(), "Azure".into()];
        let registry = Registry::new(&setup).unwrap();
        let canonical = registry.card_names(registry.canonical(Category::Suspect));
        assert_eq!(canonical, vec!["Azure", "green", "Plum"]);
    }
}
