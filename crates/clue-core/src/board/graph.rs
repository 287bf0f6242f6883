//! Board graph built once from a [`BoardLayout`].

use super::layout::{BoardLayout, Tile};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Cell { row: usize, col: usize },
    /// Index into [`Board::rooms`].
    Room(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Orthogonal move between walkable cells; costs one movement point.
    Step,
    /// Entrance cell into its room; free.
    Enter,
    /// Room out to one of its entrance cells; only taken from the starting room.
    Exit,
    /// Secret passage between rooms; free, only taken from the starting room.
    Passage,
}

impl Link {
    pub const fn cost(self) -> u32 {
        match self {
            Link::Step => 1,
            Link::Enter | Link::Exit | Link::Passage => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board layout has no rows")]
    Empty,
    #[error("board row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown tile '{ch}' at ({row}, {col})")]
    InvalidTile { row: usize, col: usize, ch: char },
    #[error("room '{0}' is declared more than once")]
    DuplicateRoom(String),
    #[error("unknown room '{0}'")]
    UnknownRoom(String),
    #[error("entrance ({row}, {col}) of '{room}' is not a walkable cell")]
    InvalidEntrance { room: String, row: usize, col: usize },
    #[error("position ({row}, {col}) is off the board")]
    OffBoard { row: usize, col: usize },
    #[error("position ({row}, {col}) is not a hallway or entrance cell")]
    NotWalkable { row: usize, col: usize },
    #[error("movement budget {budget} exceeds the maximum of {max}")]
    BudgetTooLarge { budget: u32, max: u32 },
}

/// Static, immutable movement graph.
#[derive(Debug, Clone)]
pub struct Board {
    layout: BoardLayout,
    graph: DiGraph<Node, Link>,
    cells: HashMap<(usize, usize), NodeIndex>,
    rooms: Vec<(String, NodeIndex)>,
}

impl Board {
    pub fn new(layout: BoardLayout) -> Result<Self, BoardError> {
        let height = layout.height();
        if height == 0 {
            return Err(BoardError::Empty);
        }
        let width = layout.width();

        let mut graph = DiGraph::new();
        let mut cells = HashMap::new();
        for (row, line) in layout.rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(BoardError::Ragged {
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = Tile::from_char(ch).ok_or(BoardError::InvalidTile { row, col, ch })?;
                if tile.is_walkable() {
                    cells.insert((row, col), graph.add_node(Node::Cell { row, col }));
                }
            }
        }

        let mut steps = Vec::new();
        for (&(row, col), &from) in &cells {
            for (dr, dc) in [(1usize, 0usize), (0, 1)] {
                if let Some(&to) = cells.get(&(row + dr, col + dc)) {
                    steps.push((from, to));
                }
            }
        }
        for (from, to) in steps {
            graph.add_edge(from, to, Link::Step);
            graph.add_edge(to, from, Link::Step);
        }

        let mut rooms: Vec<(String, NodeIndex)> = Vec::with_capacity(layout.rooms.len());
        for entry in &layout.rooms {
            let name = entry.room.trim();
            if rooms.iter().any(|(existing, _)| existing.eq_ignore_ascii_case(name)) {
                return Err(BoardError::DuplicateRoom(name.to_string()));
            }
            let node = graph.add_node(Node::Room(rooms.len()));
            for &(row, col) in &entry.cells {
                let &cell = cells.get(&(row, col)).ok_or_else(|| BoardError::InvalidEntrance {
                    room: name.to_string(),
                    row,
                    col,
                })?;
                graph.add_edge(cell, node, Link::Enter);
                graph.add_edge(node, cell, Link::Exit);
            }
            rooms.push((name.to_string(), node));
        }

        let find = |name: &str| {
            rooms
                .iter()
                .find(|(room, _)| room.eq_ignore_ascii_case(name.trim()))
                .map(|(_, node)| *node)
                .ok_or_else(|| BoardError::UnknownRoom(name.trim().to_string()))
        };
        let mut passages = Vec::with_capacity(layout.passages.len());
        for passage in &layout.passages {
            let from = find(&passage.from)?;
            let to = find(&passage.to)?;
            passages.push((from, to));
            if passage.bidirectional {
                passages.push((to, from));
            }
        }
        for (from, to) in passages {
            graph.add_edge(from, to, Link::Passage);
        }

        Ok(Self {
            layout,
            graph,
            cells,
            rooms,
        })
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn graph(&self) -> &DiGraph<Node, Link> {
        &self.graph
    }

    /// Room names in declaration order.
    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(|(name, _)| name.as_str())
    }

    pub fn room_name(&self, index: usize) -> Option<&str> {
        self.rooms.get(index).map(|(name, _)| name.as_str())
    }

    pub(crate) fn room_nodes(&self) -> impl Iterator<Item = (&str, NodeIndex)> {
        self.rooms.iter().map(|(name, node)| (name.as_str(), *node))
    }

    pub(crate) fn room_node(&self, name: &str) -> Result<NodeIndex, BoardError> {
        self.rooms
            .iter()
            .find(|(room, _)| room.eq_ignore_ascii_case(name.trim()))
            .map(|(_, node)| *node)
            .ok_or_else(|| BoardError::UnknownRoom(name.trim().to_string()))
    }

    pub(crate) fn cell_node(&self, row: usize, col: usize) -> Result<NodeIndex, BoardError> {
        if row >= self.layout.height() || col >= self.layout.width() {
            return Err(BoardError::OffBoard { row, col });
        }
        self.cells
            .get(&(row, col))
            .copied()
            .ok_or(BoardError::NotWalkable { row, col })
    }
}
