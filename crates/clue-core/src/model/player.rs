use core::fmt;
use serde::{Deserialize, Serialize};

/// Dense index of a player in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub(crate) u8);

impl PlayerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub is_user: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, is_user: bool) -> Self {
        Self {
            name: name.into(),
            is_user,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
