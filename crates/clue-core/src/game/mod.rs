pub mod cache;
pub mod guess_log;
pub mod persist;
pub mod serialization;
pub mod session;
pub mod shared;

pub use cache::{CacheSettings, EvalCacheKey, EvaluationCache};
pub use guess_log::{GuessLogError, GuessLogRow};
pub use persist::{MemoryStore, PersistError, PersistenceAdapter};
pub use serialization::{KnowledgeSnapshot, RestoredKnowledge, SnapshotError};
pub use session::{GameSession, GuessRecord, SessionError, SessionOptions};
pub use shared::SharedSession;
