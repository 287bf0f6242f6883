use crate::model::card::CardId;
use crate::model::category::Category;
use crate::model::player::PlayerId;
use crate::model::registry::{LookupError, Registry};
use serde::{Deserialize, Serialize};

/// One card per category. Used both for guesses and for envelope solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub suspect: CardId,
    pub weapon: CardId,
    pub room: CardId,
}

pub type Guess = Triple;
pub type Solution = Triple;

impl Triple {
    pub const fn new(suspect: CardId, weapon: CardId, room: CardId) -> Self {
        Self {
            suspect,
            weapon,
            room,
        }
    }

    pub const fn cards(&self) -> [CardId; 3] {
        [self.suspect, self.weapon, self.room]
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.cards().contains(&card)
    }

    pub fn card(&self, category: Category) -> CardId {
        match category {
            Category::Suspect => self.suspect,
            Category::Weapon => self.weapon,
            Category::Room => self.room,
        }
    }

    /// Resolves three names, checking each against its category.
    pub fn resolve(
        registry: &Registry,
        suspect: &str,
        weapon: &str,
        room: &str,
    ) -> Result<Self, LookupError> {
        Ok(Self::new(
            registry.find_card_in(Category::Suspect, suspect)?,
            registry.find_card_in(Category::Weapon, weapon)?,
            registry.find_card_in(Category::Room, room)?,
        ))
    }

    pub fn names(&self, registry: &Registry) -> [String; 3] {
        self.cards().map(|id| registry.card(id).name.clone())
    }
}

/// Observed outcome of one guess round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessEvent {
    pub guess: Guess,
    pub guesser: PlayerId,
    /// Players asked, in the order they were asked.
    pub asked_order: Vec<PlayerId>,
    pub showed_by: Option<PlayerId>,
    pub card_shown: Option<CardId>,
    pub user_is_guesser: bool,
}

/// Name-based form of a [`GuessEvent`] as supplied by a front end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuessInput {
    pub guesser: String,
    pub suspect: String,
    pub weapon: String,
    pub room: String,
    pub asked_order: Vec<String>,
    #[serde(default)]
    pub showed_by: Option<String>,
    #[serde(default)]
    pub card_shown: Option<String>,
}

impl GuessEvent {
    pub fn resolve(registry: &Registry, input: &GuessInput) -> Result<Self, LookupError> {
        let guesser = registry.find_player(&input.guesser)?;
        let guess = Triple::resolve(registry, &input.suspect, &input.weapon, &input.room)?;
        let asked_order = input
            .asked_order
            .iter()
            .map(|name| registry.find_player(name))
            .collect::<Result<Vec<_>, _>>()?;
        let showed_by = blank_to_none(input.showed_by.as_deref())
            .map(|name| registry.find_player(name))
            .transpose()?;
        let card_shown = blank_to_none(input.card_shown.as_deref())
            .map(|name| registry.find_card(name))
            .transpose()?;
        Ok(Self {
            guess,
            guesser,
            asked_order,
            showed_by,
            card_shown,
            user_is_guesser: guesser == registry.user(),
        })
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
