//! One game: registry, knowledge table, best guess and optional board.

use super::cache::{CacheSettings, EvalCacheKey, EvaluationCache};
use super::guess_log::{self, GuessLogRow};
use super::persist::{PersistError, PersistenceAdapter};
use super::serialization::{KnowledgeSnapshot, SnapshotError};
use crate::board::{Board, BoardError, BoardLayout, Position};
use crate::eval::{EvalError, EvalLimits, EvaluationOutcome, evaluate_guesses};
use crate::knowledge::{GuessError, InferenceReport, KnowledgeTable, record_guess_event};
use crate::model::card::CardId;
use crate::model::category::Category;
use crate::model::guess::{GuessEvent, GuessInput, Solution};
use crate::model::player::PlayerId;
use crate::model::registry::{GameSetup, LookupError, Registry, SetupError};
use crate::solution::{BestGuess, SolutionSpace};
use thiserror::Error;
use tracing::{Level, debug, event};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Guess(#[from] GuessError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("failed to persist game state: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub limits: EvalLimits,
    pub cache: CacheSettings,
    /// Largest movement budget accepted by [`GameSession::accessible_rooms`].
    pub max_movement: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            limits: EvalLimits::default(),
            cache: CacheSettings::default(),
            max_movement: 24,
        }
    }
}

/// What a recorded guess did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub report: InferenceReport,
    pub solutions_before: usize,
    pub solutions_after: usize,
    /// The stored best guess no longer fit the solution space and was dropped.
    pub best_guess_cleared: bool,
}

#[derive(Debug)]
pub struct GameSession {
    registry: Registry,
    table: KnowledgeTable,
    best_guess: Option<BestGuess>,
    board: Option<Board>,
    options: SessionOptions,
    cache: EvaluationCache,
}

impl GameSession {
    /// Validates the setup and board; nothing is built if either is rejected.
    pub fn new(
        setup: &GameSetup,
        board: Option<BoardLayout>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let registry = Registry::new(setup)?;
        let board = board.map(Board::new).transpose()?;
        if let Some(board) = &board {
            for room in board.rooms() {
                registry
                    .find_card_in(Category::Room, room)
                    .map_err(|_| SetupError::UnknownBoardRoom(room.to_string()))?;
            }
        }
        let table = KnowledgeTable::new(&registry);
        event!(
            target: "clue_core::session",
            Level::INFO,
            players = registry.player_count(),
            cards = registry.card_count(),
            board = board.is_some(),
            "game session created"
        );
        Ok(Self {
            registry,
            table,
            best_guess: None,
            board,
            options,
            cache: EvaluationCache::new(options.cache),
        })
    }

    /// Rebuilds a session from its setup and a stored snapshot.
    pub fn restore(
        setup: &GameSetup,
        board: Option<BoardLayout>,
        options: SessionOptions,
        snapshot: &KnowledgeSnapshot,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(setup, board, options)?;
        let restored = snapshot.restore(&session.registry)?;
        session.table = restored.table;
        session.best_guess = restored.best_guess;
        Ok(session)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn table(&self) -> &KnowledgeTable {
        &self.table
    }

    pub fn best_guess(&self) -> Option<BestGuess> {
        self.best_guess
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn solution_space(&self) -> SolutionSpace {
        SolutionSpace::derive(&self.registry, &self.table)
    }

    pub fn possible_solutions(&self) -> Vec<Solution> {
        self.solution_space().solutions().collect()
    }

    pub fn most_likely_solution(&self) -> Option<Solution> {
        self.solution_space().most_likely()
    }

    pub fn snapshot(&self) -> KnowledgeSnapshot {
        KnowledgeSnapshot::capture(&self.registry, &self.table, self.best_guess.as_ref())
    }

    pub fn log_header(&self) -> Vec<String> {
        guess_log::header(&self.registry)
    }

    /// Players after `guesser` in turn order, wrapping around.
    pub fn default_asked_order(&self, guesser: PlayerId) -> Vec<PlayerId> {
        let count = self.registry.player_count();
        (1..count)
            .map(|offset| PlayerId(((guesser.index() + offset) % count) as u8))
            .collect()
    }

    pub fn record_guess(
        &mut self,
        input: &GuessInput,
        store: &mut dyn PersistenceAdapter,
    ) -> Result<GuessRecord, SessionError> {
        let guess_event = GuessEvent::resolve(&self.registry, input)?;
        self.record_event(&guess_event, store)
    }

    /// Applies the event, refreshes derived state, then persists.
    ///
    /// A rejected event leaves the table untouched. A persistence failure is
    /// reported after the table has already changed.
    pub fn record_event(
        &mut self,
        guess_event: &GuessEvent,
        store: &mut dyn PersistenceAdapter,
    ) -> Result<GuessRecord, SessionError> {
        let solutions_before = self.solution_space().len();
        let report = record_guess_event(&self.registry, &mut self.table, guess_event)?;
        self.cache.sync_revision(self.table.revision());

        let space = self.solution_space();
        let best_guess_cleared = match self.best_guess {
            Some(best) if !best.is_valid(&space) => {
                debug!(target: "clue_core::session", "best guess invalidated by new knowledge");
                self.best_guess = None;
                true
            }
            _ => false,
        };
        let solutions_after = space.len();

        let row = GuessLogRow::capture(&self.registry, guess_event, &self.table);
        store.append_log(&self.log_header(), &row)?;
        store.save_snapshot(&self.snapshot())?;

        event!(
            target: "clue_core::session",
            Level::INFO,
            solutions_before,
            solutions_after,
            applied = report.applied.len(),
            best_guess_cleared,
            "guess recorded"
        );
        Ok(GuessRecord {
            report,
            solutions_before,
            solutions_after,
            best_guess_cleared,
        })
    }

    /// Room cards reachable from `position`. Without a board every room is reachable.
    pub fn accessible_rooms(
        &self,
        budget: u32,
        position: &Position,
    ) -> Result<Vec<CardId>, SessionError> {
        if budget > self.options.max_movement {
            return Err(BoardError::BudgetTooLarge {
                budget,
                max: self.options.max_movement,
            }
            .into());
        }
        let Some(board) = &self.board else {
            return Ok(self.registry.cards_in(Category::Room).to_vec());
        };
        board
            .accessible_rooms(budget, position)?
            .iter()
            .map(|room| {
                self.registry
                    .find_card_in(Category::Room, room)
                    .map_err(SessionError::from)
            })
            .collect()
    }

    /// Scores candidate guesses and stores the winner as the best guess.
    ///
    /// Degenerate outcomes clear the best guess.
    pub fn evaluate(
        &mut self,
        asked_order: &[PlayerId],
        accessible_rooms: &[CardId],
    ) -> Result<EvaluationOutcome, SessionError> {
        self.cache.sync_revision(self.table.revision());
        let key = EvalCacheKey::new(self.table.summary_hash(), asked_order, accessible_rooms);
        let outcome = match self.cache.get(&key) {
            Some(outcome) => {
                debug!(target: "clue_core::session", "evaluation served from cache");
                outcome
            }
            None => {
                let space = self.solution_space();
                let outcome = evaluate_guesses(
                    &self.registry,
                    &self.table,
                    &space,
                    asked_order,
                    accessible_rooms,
                    &self.options.limits,
                )?;
                self.cache.insert(key, outcome);
                outcome
            }
        };
        self.best_guess = outcome.best_guess();
        Ok(outcome)
    }

    /// Evaluates from the user's point of view at `position` with `budget` moves.
    pub fn suggest(
        &mut self,
        position: &Position,
        budget: u32,
    ) -> Result<EvaluationOutcome, SessionError> {
        let rooms = self.accessible_rooms(budget, position)?;
        let asked = self.default_asked_order(self.registry.user());
        self.evaluate(&asked, &rooms)
    }

    pub fn cached_evaluations(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::persist::MemoryStore;
    use crate::knowledge::Belief;
    use crate::solution::GuessTag;

    fn setup() -> GameSetup {
        GameSetup::classic(&["Me", "Alice", "Bob"], "Me", &["Rope", "Hall"])
    }

    fn session() -> GameSession {
        GameSession::new(&setup(), Some(BoardLayout::classic()), SessionOptions::default())
            .unwrap()
    }

    fn input(guesser: &str, cards: [&str; 3], asked: &[&str], shower: Option<&str>, shown: Option<&str>) -> GuessInput {
        GuessInput {
            guesser: guesser.into(),
            suspect: cards[0].into(),
            weapon: cards[1].into(),
            room: cards[2].into(),
            asked_order: asked.iter().map(|s| s.to_string()).collect(),
            showed_by: shower.map(str::to_string),
            card_shown: shown.map(str::to_string),
        }
    }

    #[test]
    fn board_rooms_must_be_room_cards() {
        let mut setup = setup();
        setup.rooms.retain(|room| room != "Study");
        let err = GameSession::new(&setup, Some(BoardLayout::classic()), SessionOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Setup(SetupError::UnknownBoardRoom(room)) if room == "Study"
        ));
    }

    #[test]
    fn default_asked_order_wraps_around() {
        let session = session();
        let bob = session.registry().find_player("Bob").unwrap();
        let names: Vec<_> = session
            .default_asked_order(bob)
            .into_iter()
            .map(|p| session.registry().player(p).name.clone())
            .collect();
        assert_eq!(names, vec!["Me", "Alice"]);
    }

    #[test]
    fn recorded_guess_shrinks_space_and_persists() {
        let mut session = session();
        let mut store = MemoryStore::new();
        let record = session
            .record_guess(
                &input("Me", ["Mr. Green", "Dagger", "Study"], &["Alice", "Bob"], Some("Alice"), Some("Dagger")),
                &mut store,
            )
            .unwrap();
        assert_eq!(record.solutions_before, 6 * 5 * 8);
        assert_eq!(record.solutions_after, 6 * 4 * 8);
        assert!(store.snapshot_json().unwrap().contains("\"Dagger (weapon)\": \"HAS\""));
        assert_eq!(store.log_text().lines().count(), 2);
    }

    #[test]
    fn rejected_guess_changes_nothing_and_writes_nothing() {
        let mut session = session();
        let mut store = MemoryStore::new();
        let before = session.table().clone();
        let err = session
            .record_guess(
                &input("Me", ["Mr. Green", "Dagger", "Study"], &["Alice"], Some("Alice"), None),
                &mut store,
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Guess(GuessError::ShownCardUnseen { .. })));
        assert_eq!(session.table(), &before);
        assert!(store.snapshot_json().is_none());
        assert!(store.log_text().is_empty());
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut session = session();
        let err = session
            .record_guess(&input("Zed", ["Mr. Green", "Dagger", "Study"], &[], None, None), &mut MemoryStore::new())
            .unwrap_err();
        assert!(matches!(err, SessionError::Lookup(LookupError::UnknownPlayer(_))));
    }

    #[test]
    fn best_guess_is_cleared_when_its_cards_are_ruled_out() {
        let mut session = session();
        let mut store = MemoryStore::new();
        let rooms = session.registry().cards_in(Category::Room).to_vec();
        let asked = session.default_asked_order(session.registry().user());
        let outcome = session.evaluate(&asked, &rooms).unwrap();
        let best = outcome.best_guess().unwrap();
        assert_eq!(session.best_guess(), Some(best));

        let [suspect, _, _] = best.guess.names(session.registry());
        let record = session
            .record_guess(
                &input(
                    "Me",
                    [suspect.as_str(), "Dagger", "Study"],
                    &["Alice"],
                    Some("Alice"),
                    Some(suspect.as_str()),
                ),
                &mut store,
            )
            .unwrap();
        assert!(record.best_guess_cleared);
        assert!(session.best_guess().is_none());
    }

    #[test]
    fn evaluation_is_cached_until_the_table_changes() {
        let mut options = SessionOptions::default();
        options.limits.max_solutions = 1_000;
        let mut session = GameSession::new(&setup(), None, options).unwrap();
        let rooms = session.accessible_rooms(0, &Position::Room("Hall".into())).unwrap();
        assert_eq!(rooms.len(), 9);
        let asked = session.default_asked_order(session.registry().user());

        let first = session.evaluate(&asked, &rooms).unwrap();
        assert_eq!(session.cached_evaluations(), 1);
        let second = session.evaluate(&asked, &rooms).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.cached_evaluations(), 1);

        session
            .record_guess(
                &input("Alice", ["Mr. Green", "Dagger", "Study"], &["Bob"], None, None),
                &mut MemoryStore::new(),
            )
            .unwrap();
        assert_eq!(session.cached_evaluations(), 0);
    }

    #[test]
    fn suggest_limits_rooms_to_reachable_ones() {
        let mut session = session();
        let outcome = session.suggest(&Position::Room("Kitchen".into()), 0).unwrap();
        let best = outcome.best_guess().unwrap();
        let room = session.registry().card(best.guess.room).name.clone();
        assert!(room == "Kitchen" || room == "Study", "{room}");
        assert_eq!(best.tag, GuessTag::SolutionSeeking);
    }

    #[test]
    fn suggest_rejects_oversized_budgets() {
        let mut session = session();
        let err = session.suggest(&Position::Room("Kitchen".into()), 25).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Board(BoardError::BudgetTooLarge { budget: 25, max: 24 })
        ));
    }

    #[test]
    fn restore_reproduces_the_snapshot() {
        let mut session = session();
        let mut store = MemoryStore::new();
        session
            .record_guess(
                &input("Alice", ["Miss Scarlet", "Wrench", "Lounge"], &["Bob", "Me"], Some("Bob"), None),
                &mut store,
            )
            .unwrap();
        let snapshot = session.snapshot();
        let restored =
            GameSession::restore(&setup(), Some(BoardLayout::classic()), SessionOptions::default(), &snapshot)
                .unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        let bob = restored.registry().find_player("Bob").unwrap();
        let wrench = restored.registry().find_card("Wrench").unwrap();
        assert_eq!(restored.table().get(bob, wrench), Belief::MightHave);
    }
}
