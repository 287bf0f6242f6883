//! Predicts who would refute a guess if a given triple were the envelope.

use crate::knowledge::{Belief, KnowledgeTable};
use crate::model::card::CardId;
use crate::model::guess::{Guess, Solution};
use crate::model::player::PlayerId;

/// Subset of a guess's three cards, bit `i` standing for `guess.cards()[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShownMask(u8);

impl ShownMask {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, position: usize) -> bool {
        self.0 & (1 << position) != 0
    }

    pub fn with(mut self, position: usize) -> Self {
        self.0 |= 1 << position;
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Expands the mask into the cards of `guess` it names.
    pub fn cards(self, guess: &Guess) -> Vec<CardId> {
        guess
            .cards()
            .into_iter()
            .enumerate()
            .filter(|(position, _)| self.contains(*position))
            .map(|(_, card)| card)
            .collect()
    }
}

/// Outcome signature used to partition candidate solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feedback {
    Refuted { player: PlayerId, shown: ShownMask },
    NoOne,
}

/// The first asked player who could show a non-solution card from `guess`.
///
/// A player counts as a possible refuter for a card unless their belief for it is
/// exactly `NotHas`.
pub fn simulate_feedback(
    table: &KnowledgeTable,
    guess: &Guess,
    solution: &Solution,
    asked_order: &[PlayerId],
) -> Feedback {
    let cards = guess.cards();
    for &player in asked_order {
        let mut shown = ShownMask::EMPTY;
        for (position, card) in cards.iter().enumerate() {
            if solution.contains(*card) {
                continue;
            }
            if table.get(player, *card) != Belief::NotHas {
                shown = shown.with(position);
            }
        }
        if !shown.is_empty() {
            return Feedback::Refuted { player, shown };
        }
    }
    Feedback::NoOne
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::guess::Triple;
    use crate::model::registry::{GameSetup, Registry};

    fn registry() -> Registry {
        Registry::new(&GameSetup {
            players: vec!["Me".into(), "Alice".into(), "Bob".into()],
            user: "Me".into(),
            hand: vec![],
            suspects: vec!["Green".into(), "Plum".into()],
            weapons: vec!["Rope".into()],
            rooms: vec!["Hall".into(), "Study".into()],
        })
        .unwrap()
    }

    #[test]
    fn exact_solution_guess_gets_no_refuter() {
        let registry = registry();
        let table = KnowledgeTable::new(&registry);
        let guess = Triple::resolve(&registry, "Green", "Rope", "Hall").unwrap();
        let asked = [registry.find_player("Alice").unwrap()];
        assert_eq!(simulate_feedback(&table, &guess, &guess, &asked), Feedback::NoOne);
    }

    #[test]
    fn first_possible_refuter_wins_and_reports_cards() {
        let registry = registry();
        let mut table = KnowledgeTable::new(&registry);
        let alice = registry.find_player("Alice").unwrap();
        let bob = registry.find_player("Bob").unwrap();
        let guess = Triple::resolve(&registry, "Green", "Rope", "Hall").unwrap();
        let solution = Triple::resolve(&registry, "Plum", "Rope", "Study").unwrap();

        table.set_belief(alice, guess.suspect, Belief::NotHas);
        table.set_belief(alice, guess.room, Belief::NotHas);

        let feedback = simulate_feedback(&table, &guess, &solution, &[alice, bob]);
        let Feedback::Refuted { player, shown } = feedback else {
            panic!("expected a refuter, got {feedback:?}");
        };
        assert_eq!(player, bob);
        assert_eq!(shown.cards(&guess), vec![guess.suspect, guess.room]);
    }

    #[test]
    fn might_have_counts_as_possible() {
        let registry = registry();
        let mut table = KnowledgeTable::new(&registry);
        let alice = registry.find_player("Alice").unwrap();
        let guess = Triple::resolve(&registry, "Green", "Rope", "Hall").unwrap();
        let solution = Triple::resolve(&registry, "Plum", "Rope", "Hall").unwrap();
        table.set_belief(alice, guess.suspect, Belief::MightHave);
        assert_eq!(
            simulate_feedback(&table, &guess, &solution, &[alice]),
            Feedback::Refuted {
                player: alice,
                shown: ShownMask::EMPTY.with(0)
            }
        );
    }
}
