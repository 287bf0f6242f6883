use super::graph::{Board, BoardError, Link, Node};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{Level, event};

/// Where a token currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Room(String),
    Cell { row: usize, col: usize },
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Room(name) => write!(f, "{name}"),
            Position::Cell { row, col } => write!(f, "({row}, {col})"),
        }
    }
}

impl Board {
    /// Rooms reachable from `position` spending at most `budget` movement points,
    /// in declaration order. The starting room is always included.
    ///
    /// Rooms other than the starting one end a move: their exits and passages
    /// are never followed.
    pub fn accessible_rooms(
        &self,
        budget: u32,
        position: &Position,
    ) -> Result<Vec<String>, BoardError> {
        let start = match position {
            Position::Room(name) => self.room_node(name)?,
            Position::Cell { row, col } => self.cell_node(*row, *col)?,
        };

        let distances = self.shortest_costs(start, budget);
        let rooms: Vec<String> = self
            .room_nodes()
            .filter(|(_, node)| distances[node.index()].is_some())
            .map(|(name, _)| name.to_string())
            .collect();

        event!(
            target: "clue_core::board",
            Level::DEBUG,
            position = %position,
            budget,
            reachable = rooms.len(),
            "computed accessible rooms"
        );
        Ok(rooms)
    }

    /// 0-1 breadth-first search; `None` means out of budget.
    fn shortest_costs(&self, start: NodeIndex, budget: u32) -> Vec<Option<u32>> {
        let graph = self.graph();
        let mut best: Vec<Option<u32>> = vec![None; graph.node_count()];
        let mut queue = VecDeque::new();
        best[start.index()] = Some(0);
        queue.push_back((start, 0u32));

        while let Some((node, cost)) = queue.pop_front() {
            if best[node.index()].is_some_and(|known| known < cost) {
                continue;
            }
            if node != start && matches!(graph[node], Node::Room(_)) {
                continue;
            }
            for edge in graph.edges(node) {
                let link = *edge.weight();
                if matches!(link, Link::Exit | Link::Passage) && node != start {
                    continue;
                }
                let next = cost + link.cost();
                if next > budget {
                    continue;
                }
                let target = edge.target();
                if best[target.index()].is_some_and(|known| known <= next) {
                    continue;
                }
                best[target.index()] = Some(next);
                if link.cost() == 0 {
                    queue.push_front((target, next));
                } else {
                    queue.push_back((target, next));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::layout::{BoardLayout, Passage, RoomEntrances};

    fn classic() -> Board {
        Board::new(BoardLayout::classic()).expect("classic board")
    }

    fn room(name: &str) -> Position {
        Position::Room(name.to_string())
    }

    #[test]
    fn passage_is_free_from_the_starting_room() {
        let rooms = classic().accessible_rooms(0, &room("Kitchen")).unwrap();
        assert_eq!(rooms, vec!["Kitchen".to_string(), "Study".to_string()]);
    }

    #[test]
    fn passages_are_one_way() {
        let rooms = classic().accessible_rooms(0, &room("Study")).unwrap();
        assert_eq!(rooms, vec!["Lounge".to_string(), "Study".to_string()]);
    }

    #[test]
    fn passage_chains_are_not_followed() {
        // Lounge -> Kitchen is allowed, Kitchen -> Study would be a second hop.
        let rooms = classic().accessible_rooms(0, &room("Lounge")).unwrap();
        assert_eq!(rooms, vec!["Kitchen".to_string(), "Lounge".to_string()]);
    }

    #[test]
    fn budget_growth_only_adds_rooms() {
        let board = classic();
        let mut previous: Vec<String> = Vec::new();
        for budget in 0..=12 {
            let rooms = board.accessible_rooms(budget, &room("Hall")).unwrap();
            assert!(previous.iter().all(|name| rooms.contains(name)), "budget {budget}");
            previous = rooms;
        }
        assert_eq!(previous.len(), 9);
    }

    #[test]
    fn entering_from_an_entrance_costs_nothing() {
        let rooms = classic()
            .accessible_rooms(0, &Position::Cell { row: 0, col: 3 })
            .unwrap();
        assert_eq!(rooms, vec!["Kitchen".to_string()]);
    }

    #[test]
    fn hallway_steps_consume_budget() {
        let board = classic();
        // (0, 3) -> (0, 4) .. (0, 7) -> (0, 8) is five steps to the Conservatory entrance.
        let start = Position::Cell { row: 0, col: 3 };
        let short = board.accessible_rooms(4, &start).unwrap();
        assert!(!short.contains(&"Conservatory".to_string()));
        let long = board.accessible_rooms(5, &start).unwrap();
        assert!(long.contains(&"Conservatory".to_string()));
    }

    #[test]
    fn bidirectional_passage_works_both_ways() {
        let layout = BoardLayout {
            rows: vec!["EHE".into()],
            rooms: vec![
                RoomEntrances {
                    room: "North".into(),
                    cells: vec![(0, 0)],
                },
                RoomEntrances {
                    room: "South".into(),
                    cells: vec![(0, 2)],
                },
            ],
            passages: vec![Passage {
                from: "North".into(),
                to: "South".into(),
                bidirectional: true,
            }],
        };
        let board = Board::new(layout).unwrap();
        assert_eq!(board.accessible_rooms(0, &room("South")).unwrap().len(), 2);
        assert_eq!(board.accessible_rooms(0, &room("North")).unwrap().len(), 2);
    }

    #[test]
    fn rejects_bad_start_positions() {
        let board = classic();
        assert_eq!(
            board.accessible_rooms(3, &room("Cellar")).unwrap_err(),
            BoardError::UnknownRoom("Cellar".into())
        );
        assert_eq!(
            board
                .accessible_rooms(3, &Position::Cell { row: 40, col: 0 })
                .unwrap_err(),
            BoardError::OffBoard { row: 40, col: 0 }
        );
        assert_eq!(
            board
                .accessible_rooms(3, &Position::Cell { row: 1, col: 4 })
                .unwrap_err(),
            BoardError::NotWalkable { row: 1, col: 4 }
        );
    }

    #[test]
    fn room_lookup_is_case_insensitive() {
        let rooms = classic().accessible_rooms(0, &room("kitchen")).unwrap();
        assert!(rooms.contains(&"Kitchen".to_string()));
    }
}
