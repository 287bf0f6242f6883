use clue_core::board::BoardLayout;
use clue_core::eval::EvalLimits;
use clue_core::game::{CacheSettings, SessionOptions};
use clue_core::model::registry::{
    CLASSIC_ROOMS, CLASSIC_SUSPECTS, CLASSIC_WEAPONS, GameSetup, Registry,
};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

const DEFAULT_MAX_SOLUTIONS: usize = 10_000;
const DEFAULT_MAX_CANDIDATES: usize = 1_000;
const DEFAULT_MAX_MOVEMENT: u32 = 24;
const DEFAULT_CACHE_TTL_SECS: u64 = 120;
const DEFAULT_CACHE_CAPACITY: usize = 32;
const GAME_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";
const DATA_PREFIX: &str = "data";

/// Root game configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GameConfig {
    pub game_id: String,
    /// Turn order.
    pub players: Vec<String>,
    pub user: String,
    #[serde(default)]
    pub hand: Vec<String>,
    #[serde(default)]
    pub cards: CardsConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file, apply environment overrides and validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: GameConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.apply_overrides(|key| std::env::var(key).ok())
            .and_then(|()| cfg.validate())
            .map_err(|source| ConfigError::Invalid {
                path: path_buf,
                source,
            })?;
        Ok(cfg)
    }

    /// `CLUE_DATA_DIR`, `CLUE_MAX_MOVEMENT_POINTS` and `CLUE_ENABLE_CACHE`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ValidationError> {
        if let Some(dir) = lookup("CLUE_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            self.storage.knowledge = replace_data_prefix(&self.storage.knowledge, &dir);
            self.storage.guess_log = replace_data_prefix(&self.storage.guess_log, &dir);
        }
        if let Some(raw) = lookup("CLUE_MAX_MOVEMENT_POINTS") {
            self.limits.max_movement =
                raw.trim()
                    .parse()
                    .map_err(|_| ValidationError::InvalidField {
                        field: "CLUE_MAX_MOVEMENT_POINTS".to_string(),
                        message: format!("'{raw}' is not a non-negative integer"),
                    })?;
        }
        if let Some(raw) = lookup("CLUE_ENABLE_CACHE") {
            self.limits.enable_cache = parse_flag(&raw).ok_or_else(|| {
                ValidationError::InvalidField {
                    field: "CLUE_ENABLE_CACHE".to_string(),
                    message: format!("'{raw}' is not a boolean"),
                }
            })?;
        }
        Ok(())
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_game_id(&self.game_id)?;
        self.limits.validate()?;
        self.storage.validate(&self.game_id)?;
        self.logging.normalize();
        self.logging.validate()?;
        self.cards.validate()?;
        self.board.validate(&self.cards)?;
        Registry::new(&self.setup()).map_err(|err| ValidationError::InvalidField {
            field: "players".to_string(),
            message: err.to_string(),
        })?;
        Ok(())
    }

    pub fn setup(&self) -> GameSetup {
        GameSetup {
            players: self.players.clone(),
            user: self.user.clone(),
            hand: self.hand.clone(),
            suspects: self.cards.suspects.clone(),
            weapons: self.cards.weapons.clone(),
            rooms: self.cards.rooms.clone(),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        self.limits.session_options()
    }

    /// Resolve storage templates (`{game_id}` placeholders) into concrete paths.
    pub fn resolved_storage(&self) -> ResolvedStorage {
        ResolvedStorage {
            knowledge: resolve_template(&self.game_id, &self.storage.knowledge),
            guess_log: resolve_template(&self.game_id, &self.storage.guess_log),
        }
    }
}

/// Card lists; each defaults to the classic set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CardsConfig {
    #[serde(default = "classic_suspects")]
    pub suspects: Vec<String>,
    #[serde(default = "classic_weapons")]
    pub weapons: Vec<String>,
    #[serde(default = "classic_rooms")]
    pub rooms: Vec<String>,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            suspects: classic_suspects(),
            weapons: classic_weapons(),
            rooms: classic_rooms(),
        }
    }
}

impl CardsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, names) in [
            ("cards.suspects", &self.suspects),
            ("cards.weapons", &self.weapons),
            ("cards.rooms", &self.rooms),
        ] {
            if names.is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "at least one card must be listed".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn classic_suspects() -> Vec<String> {
    CLASSIC_SUSPECTS.iter().map(|s| s.to_string()).collect()
}

fn classic_weapons() -> Vec<String> {
    CLASSIC_WEAPONS.iter().map(|s| s.to_string()).collect()
}

fn classic_rooms() -> Vec<String> {
    CLASSIC_ROOMS.iter().map(|s| s.to_string()).collect()
}

/// Board block. Without a layout the built-in classic board is used.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BoardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub layout: Option<BoardLayout>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            layout: None,
        }
    }
}

impl BoardConfig {
    /// `None` when reachability is disabled.
    pub fn layout(&self) -> Option<BoardLayout> {
        if !self.enabled {
            return None;
        }
        Some(self.layout.clone().unwrap_or_else(BoardLayout::classic))
    }

    fn validate(&self, cards: &CardsConfig) -> Result<(), ValidationError> {
        let Some(layout) = self.layout() else {
            return Ok(());
        };
        for entry in &layout.rooms {
            let known = cards
                .rooms
                .iter()
                .any(|room| room.trim().eq_ignore_ascii_case(entry.room.trim()));
            if !known {
                return Err(ValidationError::InvalidField {
                    field: "board.layout.rooms".to_string(),
                    message: format!("board room '{}' is not listed in cards.rooms", entry.room),
                });
            }
        }
        Ok(())
    }
}

/// Search and movement limits plus evaluation cache tuning.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_max_solutions")]
    pub max_solutions: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_max_movement")]
    pub max_movement: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_true")]
    pub enable_cache: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_solutions: DEFAULT_MAX_SOLUTIONS,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_movement: DEFAULT_MAX_MOVEMENT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            enable_cache: true,
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_solutions == 0 {
            return Err(ValidationError::InvalidField {
                field: "limits.max_solutions".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_candidates == 0 {
            return Err(ValidationError::InvalidField {
                field: "limits.max_candidates".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.enable_cache && self.cache_capacity == 0 {
            return Err(ValidationError::InvalidField {
                field: "limits.cache_capacity".to_string(),
                message: "an enabled cache needs room for at least one entry".to_string(),
            });
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            limits: EvalLimits {
                max_solutions: self.max_solutions,
                max_candidates: self.max_candidates,
            },
            cache: CacheSettings {
                enabled: self.enable_cache,
                capacity: self.cache_capacity,
                ttl: Duration::from_secs(self.cache_ttl_secs),
            },
            max_movement: self.max_movement,
        }
    }
}

fn default_max_solutions() -> usize {
    DEFAULT_MAX_SOLUTIONS
}

fn default_max_candidates() -> usize {
    DEFAULT_MAX_CANDIDATES
}

fn default_max_movement() -> u32 {
    DEFAULT_MAX_MOVEMENT
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

/// Where the knowledge snapshot and guess log live.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_knowledge_path")]
    pub knowledge: String,
    #[serde(default = "default_guess_log_path")]
    pub guess_log: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            knowledge: default_knowledge_path(),
            guess_log: default_guess_log_path(),
        }
    }
}

impl StorageConfig {
    fn validate(&self, game_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("storage.knowledge", &self.knowledge),
            ("storage.guess_log", &self.guess_log),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
            let resolved = resolve_template(game_id, value);
            if resolved.file_name().is_none() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path does not name a file".to_string(),
                });
            }
        }
        if self.knowledge == self.guess_log {
            return Err(ValidationError::InvalidField {
                field: "storage.guess_log".to_string(),
                message: "guess log and knowledge snapshot must be different files".to_string(),
            });
        }
        Ok(())
    }
}

fn default_knowledge_path() -> String {
    "data/{game_id}/knowledge_state.json".to_string()
}

fn default_guess_log_path() -> String {
    "data/{game_id}/game_log.csv".to_string()
}

/// Logging configuration defaults to human-readable logs on stderr.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!("unknown level '{}'", self.tracing_level),
            });
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

fn validate_game_id(game_id: &str) -> Result<(), ValidationError> {
    if game_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "game_id".to_string(),
            message: "game_id must not be empty".to_string(),
        });
    }

    if !game_id.chars().all(|c| GAME_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "game_id".to_string(),
            message: "game_id may only contain alphanumeric characters, '.', '_' or '-'"
                .to_string(),
        });
    }

    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn replace_data_prefix(template: &str, dir: &str) -> String {
    let dir = dir.trim_end_matches(['/', '\\']);
    match template.strip_prefix(DATA_PREFIX) {
        Some(rest) if rest.starts_with(['/', '\\']) => format!("{dir}{rest}"),
        _ => template.to_string(),
    }
}

fn resolve_template(game_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{game_id}", game_id))
}

/// Fully resolved storage paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStorage {
    pub knowledge: PathBuf,
    pub guess_log: PathBuf,
}

impl ResolvedStorage {
    /// Directory holding the snapshot; telemetry is written next to it.
    pub fn data_dir(&self) -> PathBuf {
        self.knowledge
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
