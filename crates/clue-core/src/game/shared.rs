use super::persist::PersistenceAdapter;
use super::serialization::KnowledgeSnapshot;
use super::session::{GameSession, GuessRecord, SessionError};
use crate::board::Position;
use crate::eval::EvaluationOutcome;
use crate::model::guess::GuessInput;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle that serializes every call on one session.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<GameSession>>,
}

impl SharedSession {
    pub fn new(session: GameSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn record_guess(
        &self,
        input: &GuessInput,
        store: &mut dyn PersistenceAdapter,
    ) -> Result<GuessRecord, SessionError> {
        self.inner.lock().record_guess(input, store)
    }

    pub fn suggest(&self, position: &Position, budget: u32) -> Result<EvaluationOutcome, SessionError> {
        self.inner.lock().suggest(position, budget)
    }

    pub fn snapshot(&self) -> KnowledgeSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn possible_solution_count(&self) -> usize {
        self.inner.lock().solution_space().len()
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameSession) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
