//! Read-through cache for guess evaluations keyed by knowledge-table contents.

use crate::eval::EvaluationOutcome;
use crate::model::card::CardId;
use crate::model::player::PlayerId;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 32,
            ttl: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvalCacheKey {
    table_hash: u64,
    asked_order: Vec<PlayerId>,
    rooms: Vec<CardId>,
}

impl EvalCacheKey {
    /// Rooms are sorted so the key ignores the order they were supplied in.
    pub fn new(table_hash: u64, asked_order: &[PlayerId], rooms: &[CardId]) -> Self {
        let mut rooms = rooms.to_vec();
        rooms.sort_unstable();
        rooms.dedup();
        Self {
            table_hash,
            asked_order: asked_order.to_vec(),
            rooms,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedOutcome {
    outcome: EvaluationOutcome,
    stored_at: Instant,
}

/// LRU with a time-to-live, cleared whenever the table revision moves.
#[derive(Debug)]
pub struct EvaluationCache {
    settings: CacheSettings,
    entries: HashMap<EvalCacheKey, CachedOutcome>,
    order: VecDeque<EvalCacheKey>,
    revision: u64,
}

impl EvaluationCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            settings,
            entries: HashMap::new(),
            order: VecDeque::new(),
            revision: 0,
        }
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops everything if the table has changed since the last call.
    pub fn sync_revision(&mut self, revision: u64) {
        if revision != self.revision {
            self.clear();
            self.revision = revision;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn get(&mut self, key: &EvalCacheKey) -> Option<EvaluationOutcome> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&mut self, key: EvalCacheKey, outcome: EvaluationOutcome) {
        self.insert_at(key, outcome, Instant::now());
    }

    fn get_at(&mut self, key: &EvalCacheKey, now: Instant) -> Option<EvaluationOutcome> {
        if !self.settings.enabled {
            return None;
        }
        let CachedOutcome { outcome, stored_at } = self.entries.get(key)?.clone();
        if now.saturating_duration_since(stored_at) > self.settings.ttl {
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            return None;
        }
        self.touch(key);
        Some(outcome)
    }

    fn insert_at(&mut self, key: EvalCacheKey, outcome: EvaluationOutcome, now: Instant) {
        if !self.settings.enabled || self.settings.capacity == 0 {
            return;
        }
        let previous = self.entries.insert(
            key.clone(),
            CachedOutcome {
                outcome,
                stored_at: now,
            },
        );
        if previous.is_some() {
            self.touch(&key);
        } else {
            self.order.push_back(key);
        }
        self.evict_if_needed();
    }

    fn touch(&mut self, key: &EvalCacheKey) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(position) {
                self.order.push_back(k);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        while self.order.len() > self.settings.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}
