//! Surviving envelope candidates, derived from the knowledge table.

use crate::knowledge::KnowledgeTable;
use crate::model::card::CardId;
use crate::model::category::Category;
use crate::model::guess::Solution;
use crate::model::registry::Registry;

/// Per-category candidates in canonical (name) order.
///
/// Never stored independently of the table: rebuild it with [`SolutionSpace::derive`]
/// after any belief change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionSpace {
    candidates: [Vec<CardId>; 3],
}

impl SolutionSpace {
    /// Removes every card some player is known to hold.
    pub fn derive(registry: &Registry, table: &KnowledgeTable) -> Self {
        let candidates = Category::ALL.map(|category| {
            registry
                .canonical(category)
                .iter()
                .copied()
                .filter(|card| !table.is_held(*card))
                .collect()
        });
        Self { candidates }
    }

    pub fn candidates(&self, category: Category) -> &[CardId] {
        &self.candidates[category.index()]
    }

    pub fn suspects(&self) -> &[CardId] {
        self.candidates(Category::Suspect)
    }

    pub fn weapons(&self) -> &[CardId] {
        self.candidates(Category::Weapon)
    }

    pub fn rooms(&self) -> &[CardId] {
        self.candidates(Category::Room)
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.candidates.iter().any(|ids| ids.contains(&card))
    }

    /// Size of the cross product.
    pub fn len(&self) -> usize {
        self.candidates
            .iter()
            .fold(1usize, |acc, ids| acc.saturating_mul(ids.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every surviving `(suspect, weapon, room)` triple.
    pub fn solutions(&self) -> impl Iterator<Item = Solution> + '_ {
        self.suspects().iter().flat_map(move |&suspect| {
            self.weapons().iter().flat_map(move |&weapon| {
                self.rooms()
                    .iter()
                    .map(move |&room| Solution::new(suspect, weapon, room))
            })
        })
    }

    /// Per-category mode across surviving triples; ties go to the first card seen.
    pub fn most_likely(&self) -> Option<Solution> {
        let mut tallies: [Vec<(CardId, usize)>; 3] = Default::default();
        for solution in self.solutions() {
            for category in Category::ALL {
                let card = solution.card(category);
                let tally = &mut tallies[category.index()];
                match tally.iter_mut().find(|(id, _)| *id == card) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((card, 1)),
                }
            }
        }
        let [suspect, weapon, room] = tallies.map(|tally| {
            tally
                .into_iter()
                .fold(None, |best: Option<(CardId, usize)>, (card, count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((card, count)),
                })
                .map(|(card, _)| card)
        });
        Some(Solution::new(suspect?, weapon?, room?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Belief;
    use crate::model::registry::GameSetup;

    fn registry(hand: &[&str]) -> Registry {
        Registry::new(&GameSetup {
            players: vec!["Me".into(), "Alice".into()],
            user: "Me".into(),
            hand: hand.iter().map(|c| c.to_string()).collect(),
            suspects: vec!["Plum".into(), "Green".into()],
            weapons: vec!["Rope".into(), "Dagger".into()],
            rooms: vec!["Study".into(), "Hall".into()],
        })
        .unwrap()
    }

    #[test]
    fn full_space_is_the_cross_product() {
        let registry = registry(&[]);
        let table = KnowledgeTable::new(&registry);
        let space = SolutionSpace::derive(&registry, &table);
        assert_eq!(space.len(), 8);
        assert_eq!(space.solutions().count(), 8);
        assert_eq!(registry.card_names(space.suspects()), vec!["Green", "Plum"]);
    }

    #[test]
    fn held_cards_leave_the_space() {
        let registry = registry(&["Rope"]);
        let mut table = KnowledgeTable::new(&registry);
        let alice = registry.find_player("Alice").unwrap();
        let hall = registry.find_card("Hall").unwrap();
        table.set_belief(alice, hall, Belief::Has);

        let space = SolutionSpace::derive(&registry, &table);
        assert_eq!(space.len(), 2);
        assert!(!space.contains(hall));
        assert!(!space.contains(registry.find_card("Rope").unwrap()));
    }

    #[test]
    fn non_has_beliefs_do_not_shrink_the_space() {
        let registry = registry(&[]);
        let mut table = KnowledgeTable::new(&registry);
        let me = registry.user();
        let plum = registry.find_card("Plum").unwrap();
        table.set_belief(me, plum, Belief::IsSolution);
        let alice = registry.find_player("Alice").unwrap();
        table.set_belief(alice, plum, Belief::NotHas);
        assert_eq!(SolutionSpace::derive(&registry, &table).len(), 8);
    }

    #[test]
    fn most_likely_breaks_ties_by_canonical_order() {
        let registry = registry(&[]);
        let table = KnowledgeTable::new(&registry);
        let space = SolutionSpace::derive(&registry, &table);
        let best = space.most_likely().unwrap();
        assert_eq!(best.names(&registry), ["Green", "Dagger", "Hall"]);
    }

    #[test]
    fn empty_category_means_no_solutions() {
        let registry = registry(&[]);
        let mut table = KnowledgeTable::new(&registry);
        let alice = registry.find_player("Alice").unwrap();
        for name in ["Study", "Hall"] {
            table.set_belief(alice, registry.find_card(name).unwrap(), Belief::Has);
        }
        let space = SolutionSpace::derive(&registry, &table);
        assert!(space.is_empty());
        assert_eq!(space.solutions().count(), 0);
        assert_eq!(space.most_likely(), None);
    }
}
