//! Append-only CSV log: one row per recorded guess, followed by the full
//! belief table as it stood right after that guess.

use crate::knowledge::{Belief, KnowledgeTable};
use crate::model::guess::GuessEvent;
use crate::model::registry::Registry;
use thiserror::Error;

const FIXED_COLUMNS: [&str; 7] = [
    "guesser",
    "suspect",
    "weapon",
    "room",
    "asked_order",
    "showed_by",
    "card_shown",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessLogError {
    #[error("guess log is empty")]
    MissingHeader,
    #[error("guess log header does not match this game (column {column}: expected '{expected}', found '{found}')")]
    HeaderMismatch {
        column: usize,
        expected: String,
        found: String,
    },
    #[error("guess log record {record} has {found} fields, expected {expected}")]
    Width {
        record: usize,
        expected: usize,
        found: usize,
    },
    #[error("guess log record {record} has an unterminated quoted field")]
    UnterminatedQuote { record: usize },
    #[error("guess log record {record}: unknown belief '{value}'")]
    UnknownBelief { record: usize, value: String },
    #[error("guess log diverges from the knowledge table at '{column}'")]
    Diverged { column: String },
}

/// One logged guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessLogRow {
    pub guesser: String,
    pub suspect: String,
    pub weapon: String,
    pub room: String,
    pub asked_order: Vec<String>,
    pub showed_by: Option<String>,
    pub card_shown: Option<String>,
    /// Player-major, card-minor; same order as [`header`].
    pub beliefs: Vec<Belief>,
}

/// Column names: the fixed guess fields, then `"<player>: <card key>"` per pair.
pub fn header(registry: &Registry) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for player in registry.player_ids() {
        for card in registry.card_ids() {
            columns.push(format!(
                "{}: {}",
                registry.player(player).name,
                registry.card(card).key()
            ));
        }
    }
    columns
}

impl GuessLogRow {
    pub fn capture(registry: &Registry, event: &GuessEvent, table: &KnowledgeTable) -> Self {
        let [suspect, weapon, room] = event.guess.names(registry);
        Self {
            guesser: registry.player(event.guesser).name.clone(),
            suspect,
            weapon,
            room,
            asked_order: event
                .asked_order
                .iter()
                .map(|p| registry.player(*p).name.clone())
                .collect(),
            showed_by: event.showed_by.map(|p| registry.player(p).name.clone()),
            card_shown: event.card_shown.map(|c| registry.card(c).name.clone()),
            beliefs: registry
                .player_ids()
                .flat_map(|p| table.row(p).iter().copied())
                .collect(),
        }
    }

    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.guesser.clone(),
            self.suspect.clone(),
            self.weapon.clone(),
            self.room.clone(),
            self.asked_order.join(","),
            self.showed_by.clone().unwrap_or_default(),
            self.card_shown.clone().unwrap_or_default(),
        ];
        fields.extend(self.beliefs.iter().map(|b| b.as_str().to_string()));
        fields
    }

    pub fn to_csv_line(&self) -> String {
        format_record(&self.fields())
    }

    fn from_fields(record: usize, fields: Vec<String>) -> Result<Self, GuessLogError> {
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        let guesser = next();
        let suspect = next();
        let weapon = next();
        let room = next();
        let asked_order = next()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        let showed_by = non_empty(next());
        let card_shown = non_empty(next());
        let beliefs = fields
            .map(|value| {
                value
                    .parse::<Belief>()
                    .map_err(|_| GuessLogError::UnknownBelief { record, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            guesser,
            suspect,
            weapon,
            room,
            asked_order,
            showed_by,
            card_shown,
            beliefs,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Joins fields into one CSV line (no trailing newline), quoting as needed.
pub fn format_record(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| quote(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits CSV text into records. Quoted fields may contain commas, quotes and newlines.
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>, GuessLogError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err(GuessLogError::UnterminatedQuote {
            record: records.len(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Parses a whole log, checking its header against this game.
pub fn parse_log(registry: &Registry, text: &str) -> Result<Vec<GuessLogRow>, GuessLogError> {
    let mut records = parse_records(text)?.into_iter();
    let found_header = records.next().ok_or(GuessLogError::MissingHeader)?;
    let expected_header = header(registry);
    for (column, expected) in expected_header.iter().enumerate() {
        let found = found_header.get(column).cloned().unwrap_or_default();
        if &found != expected {
            return Err(GuessLogError::HeaderMismatch {
                column,
                expected: expected.clone(),
                found,
            });
        }
    }
    if found_header.len() != expected_header.len() {
        return Err(GuessLogError::Width {
            record: 0,
            expected: expected_header.len(),
            found: found_header.len(),
        });
    }

    records
        .enumerate()
        .map(|(index, fields)| {
            let record = index + 1;
            if fields.len() != expected_header.len() {
                return Err(GuessLogError::Width {
                    record,
                    expected: expected_header.len(),
                    found: fields.len(),
                });
            }
            GuessLogRow::from_fields(record, fields)
        })
        .collect()
}

/// The last logged table must equal the live one.
pub fn verify_replay(
    registry: &Registry,
    rows: &[GuessLogRow],
    table: &KnowledgeTable,
) -> Result<(), GuessLogError> {
    let Some(last) = rows.last() else {
        return Ok(());
    };
    let columns = header(registry);
    let live = registry.player_ids().flat_map(|p| table.row(p).iter().copied());
    for (index, (logged, current)) in last.beliefs.iter().zip(live).enumerate() {
        if *logged != current {
            return Err(GuessLogError::Diverged {
                column: columns[FIXED_COLUMNS.len() + index].clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::record_guess_event;
    use crate::model::guess::GuessInput;
    use crate::model::registry::GameSetup;

    fn registry() -> Registry {
        Registry::new(&GameSetup {
            players: vec!["Me".into(), "Al \"Ace\" Lee".into()],
            user: "Me".into(),
            hand: vec!["Rope".into()],
            suspects: vec!["Green".into()],
            weapons: vec!["Rope".into(), "Dagger".into()],
            rooms: vec!["Hall".into()],
        })
        .unwrap()
    }

    #[test]
    fn header_lists_every_player_card_pair() {
        let columns = header(&registry());
        assert_eq!(columns.len(), 7 + 2 * 4);
        assert_eq!(columns[7], "Me: Green (suspect)");
        assert_eq!(columns[14], "Al \"Ace\" Lee: Hall (room)");
    }

    #[test]
    fn quoting_escapes_commas_and_quotes() {
        let line = format_record(&["a,b".into(), "say \"hi\"".into(), "plain".into()]);
        assert_eq!(line, "\"a,b\",\"say \"\"hi\"\"\",plain");
        let parsed = parse_records(&format!("{line}\n")).unwrap();
        assert_eq!(parsed, vec![vec!["a,b", "say \"hi\"", "plain"]]);
    }

    #[test]
    fn parse_reports_unterminated_quotes() {
        assert_eq!(
            parse_records("a,\"b\n"),
            Err(GuessLogError::UnterminatedQuote { record: 0 })
        );
    }

    #[test]
    fn logged_rows_parse_back_and_match_table() {
        let registry = registry();
        let mut table = KnowledgeTable::new(&registry);
        let event = GuessEvent::resolve(
            &registry,
            &GuessInput {
                guesser: "Me".into(),
                suspect: "Green".into(),
                weapon: "Dagger".into(),
                room: "Hall".into(),
                asked_order: vec!["Al \"Ace\" Lee".into()],
                showed_by: Some("Al \"Ace\" Lee".into()),
                card_shown: Some("Dagger".into()),
            },
        )
        .unwrap();
        record_guess_event(&registry, &mut table, &event).unwrap();
        let row = GuessLogRow::capture(&registry, &event, &table);

        let text = format!(
            "{}\n{}\n",
            format_record(&header(&registry)),
            row.to_csv_line()
        );
        let rows = parse_log(&registry, &text).unwrap();
        assert_eq!(rows, vec![row]);
        assert!(verify_replay(&registry, &rows, &table).is_ok());
    }

    #[test]
    fn replay_detects_divergence() {
        let registry = registry();
        let table = KnowledgeTable::new(&registry);
        let mut beliefs: Vec<Belief> = registry
            .player_ids()
            .flat_map(|p| table.row(p).iter().copied())
            .collect();
        beliefs[5] = Belief::NotHas;
        let row = GuessLogRow {
            guesser: "Me".into(),
            suspect: "Green".into(),
            weapon: "Rope".into(),
            room: "Hall".into(),
            asked_order: vec![],
            showed_by: None,
            card_shown: None,
            beliefs,
        };
        assert_eq!(
            verify_replay(&registry, &[row], &table),
            Err(GuessLogError::Diverged {
                column: "Al \"Ace\" Lee: Rope (weapon)".into()
            })
        );
    }

    #[test]
    fn parse_rejects_foreign_header() {
        let registry = registry();
        let err = parse_log(&registry, "who,what\n").unwrap_err();
        assert!(matches!(err, GuessLogError::HeaderMismatch { column: 0, .. }));
    }
}
