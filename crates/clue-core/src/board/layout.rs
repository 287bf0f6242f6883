//! Static board description: tile grid, room entrances and secret passages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Hallway,
    Entrance,
    Room,
}

impl Tile {
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'W' | 'w' | '#' => Some(Tile::Wall),
            'H' | 'h' | '.' => Some(Tile::Hallway),
            'E' | 'e' => Some(Tile::Entrance),
            'R' | 'r' => Some(Tile::Room),
            _ => None,
        }
    }

    /// Hallway and entrance tiles are the only ones a token can stand on.
    pub const fn is_walkable(self) -> bool {
        matches!(self, Tile::Hallway | Tile::Entrance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEntrances {
    pub room: String,
    /// `(row, col)` cells from which the room can be entered.
    #[serde(default)]
    pub cells: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// One string per row: `W` wall, `H` hallway, `E` entrance, `R` room interior.
    pub rows: Vec<String>,
    pub rooms: Vec<RoomEntrances>,
    #[serde(default)]
    pub passages: Vec<Passage>,
}

const CLASSIC_ROWS: [&str; 10] = [
    // 0123456789AB
    "RRWEHHHHEWRR", // 0
    "RRWHWRRWHWRR", // 1
    "WWWHWEEWHWWW", // 2
    "EHHHHHHHHHHE", // 3
    "HWWWWHHWWWWH", // 4
    "EHHHHHHHHHHE", // 5
    "HWWWWHHWWWWH", // 6
    "EHHHHHHHHHHE", // 7
    "WWWHWEEWHWWW", // 8
    "RRWEHHHHEWRR", // 9
];

const CLASSIC_ENTRANCES: [(&str, &[(usize, usize)]); 9] = [
    ("Kitchen", &[(0, 3)]),
    ("Ballroom", &[(2, 5), (2, 6)]),
    ("Conservatory", &[(0, 8)]),
    ("Dining Room", &[(3, 0), (5, 0)]),
    ("Billiard Room", &[(5, 11), (7, 11)]),
    ("Library", &[(3, 11)]),
    ("Lounge", &[(7, 0), (9, 3)]),
    ("Hall", &[(8, 5), (8, 6)]),
    ("Study", &[(9, 8)]),
];

const CLASSIC_PASSAGES: [(&str, &str); 3] = [
    ("Lounge", "Kitchen"),
    ("Kitchen", "Study"),
    ("Study", "Lounge"),
];

impl BoardLayout {
    /// The built-in 10×12 board with nine rooms and three one-way passages.
    pub fn classic() -> Self {
        Self {
            rows: CLASSIC_ROWS.iter().map(|row| row.to_string()).collect(),
            rooms: CLASSIC_ENTRANCES
                .iter()
                .map(|(room, cells)| RoomEntrances {
                    room: room.to_string(),
                    cells: cells.to_vec(),
                })
                .collect(),
            passages: CLASSIC_PASSAGES
                .iter()
                .map(|(from, to)| Passage {
                    from: from.to_string(),
                    to: to.to_string(),
                    bidirectional: false,
                })
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.chars().count())
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        self.rows
            .get(row)
            .and_then(|line| line.chars().nth(col))
            .and_then(Tile::from_char)
    }
}
