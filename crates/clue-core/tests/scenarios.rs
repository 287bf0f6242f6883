use clue_core::board::{BoardLayout, Position};
use clue_core::game::{GameSession, MemoryStore, SessionError, SessionOptions};
use clue_core::knowledge::{Belief, GuessError};
use clue_core::model::category::Category;
use clue_core::model::guess::GuessInput;
use clue_core::model::registry::GameSetup;

fn guess(
    guesser: &str,
    cards: [&str; 3],
    asked: &[&str],
    shower: Option<&str>,
    shown: Option<&str>,
) -> GuessInput {
    GuessInput {
        guesser: guesser.into(),
        suspect: cards[0].into(),
        weapon: cards[1].into(),
        room: cards[2].into(),
        asked_order: asked.iter().map(|name| name.to_string()).collect(),
        showed_by: shower.map(str::to_string),
        card_shown: shown.map(str::to_string),
    }
}

fn tiny_setup() -> GameSetup {
    GameSetup {
        players: vec!["Me".into(), "Alice".into()],
        user: "Me".into(),
        hand: vec![],
        suspects: vec!["Green".into(), "Plum".into()],
        weapons: vec!["Rope".into(), "Dagger".into()],
        rooms: vec!["Hall".into(), "Study".into()],
    }
}

#[test]
fn shown_card_is_removed_from_its_category() {
    let mut session = GameSession::new(&tiny_setup(), None, SessionOptions::default()).unwrap();
    assert_eq!(session.possible_solutions().len(), 8);

    let record = session
        .record_guess(
            &guess("Me", ["Green", "Rope", "Hall"], &["Alice"], Some("Alice"), Some("Rope")),
            &mut MemoryStore::new(),
        )
        .unwrap();

    let registry = session.registry();
    let alice = registry.find_player("Alice").unwrap();
    let rope = registry.find_card("Rope").unwrap();
    assert_eq!(session.table().get(alice, rope), Belief::Has);

    let space = session.solution_space();
    assert_eq!(space.suspects().len(), 2);
    assert_eq!(space.weapons().len(), 1);
    assert_eq!(space.rooms().len(), 2);
    assert_eq!(record.solutions_before, 8);
    assert_eq!(record.solutions_after, 4);
    assert_eq!(session.possible_solutions().len(), 4);
}

#[test]
fn unrefuted_user_guess_marks_envelope_cards() {
    let setup = GameSetup::classic(&["Me", "Alice", "Bob"], "Me", &["Rope"]);
    let mut session = GameSession::new(&setup, None, SessionOptions::default()).unwrap();
    let rooms = session.registry().cards_in(Category::Room).to_vec();
    let asked = session.default_asked_order(session.registry().user());
    let before = session.evaluate(&asked, &rooms).unwrap().best_guess().unwrap();

    let record = session
        .record_guess(
            &guess("Me", ["Professor Plum", "Rope", "Study"], &["Alice", "Bob"], None, None),
            &mut MemoryStore::new(),
        )
        .unwrap();

    let registry = session.registry();
    let me = registry.user();
    let table = session.table();
    assert_eq!(table.get(me, registry.find_card("Professor Plum").unwrap()), Belief::IsSolution);
    assert_eq!(table.get(me, registry.find_card("Study").unwrap()), Belief::IsSolution);
    assert_eq!(table.get(me, registry.find_card("Rope").unwrap()), Belief::Has);
    for name in ["Alice", "Bob"] {
        let player = registry.find_player(name).unwrap();
        assert_eq!(table.get(player, registry.find_card("Study").unwrap()), Belief::NotHas);
    }

    // Nothing became held, so the previous recommendation is still live.
    assert!(!record.best_guess_cleared);
    assert_eq!(session.best_guess(), Some(before));
}

#[test]
fn passage_reaches_study_with_no_movement() {
    let setup = GameSetup::classic(&["Me", "Alice"], "Me", &[]);
    let session =
        GameSession::new(&setup, Some(BoardLayout::classic()), SessionOptions::default()).unwrap();
    let rooms = session
        .accessible_rooms(0, &Position::Room("Kitchen".into()))
        .unwrap();
    let names = session.registry().card_names(&rooms);
    assert_eq!(names, vec!["Kitchen".to_string(), "Study".to_string()]);
}

#[test]
fn unseen_shown_card_is_rejected_without_side_effects() {
    let mut session = GameSession::new(&tiny_setup(), None, SessionOptions::default()).unwrap();
    let mut store = MemoryStore::new();
    session
        .record_guess(
            &guess("Alice", ["Plum", "Dagger", "Study"], &["Me"], None, None),
            &mut store,
        )
        .unwrap();
    let before = session.table().clone();
    let snapshot = session.snapshot();

    let err = session
        .record_guess(
            &guess("Me", ["Green", "Rope", "Hall"], &["Alice"], Some("Alice"), None),
            &mut store,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Guess(GuessError::ShownCardUnseen { ref shower }) if shower == "Alice"
    ));
    assert_eq!(session.table(), &before);
    assert_eq!(session.snapshot(), snapshot);
    assert_eq!(store.log_text().lines().count(), 2);
}
