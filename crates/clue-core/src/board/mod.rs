pub mod graph;
pub mod layout;
mod reach;

pub use graph::{Board, BoardError, Link, Node};
pub use layout::{BoardLayout, Passage, RoomEntrances, Tile};
pub use reach::Position;
