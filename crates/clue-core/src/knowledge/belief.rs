use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// What the tracker currently knows about one player holding one card.
///
/// `Has`, `NotHas` and `IsSolution` are terminal: once recorded they are never
/// replaced. `MightHave` may only move to a terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Belief {
    Unknown,
    MightHave,
    NotHas,
    Has,
    IsSolution,
}

impl Belief {
    pub const ALL: [Belief; 5] = [
        Belief::Unknown,
        Belief::MightHave,
        Belief::NotHas,
        Belief::Has,
        Belief::IsSolution,
    ];

    pub const fn is_terminal(self) -> bool {
        matches!(self, Belief::Has | Belief::NotHas | Belief::IsSolution)
    }

    /// Whether replacing `self` with `next` moves toward more information.
    pub const fn accepts(self, next: Belief) -> bool {
        match (self, next) {
            (Belief::Has | Belief::NotHas | Belief::IsSolution, _) => false,
            (_, Belief::Unknown) => false,
            (Belief::MightHave, Belief::MightHave) => false,
            _ => true,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Belief::Unknown => "UNKNOWN",
            Belief::MightHave => "MIGHT_HAVE",
            Belief::NotHas => "NOT_HAS",
            Belief::Has => "HAS",
            Belief::IsSolution => "IS_SOLUTION",
        }
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Belief {
    type Err = UnknownBelief;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Belief::ALL
            .into_iter()
            .find(|belief| belief.as_str() == normalized)
            .ok_or_else(|| UnknownBelief(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown belief '{0}'")]
pub struct UnknownBelief(pub String);
