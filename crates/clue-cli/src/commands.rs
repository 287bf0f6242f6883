//! Subcommand implementations. Each one loads the game from disk, acts, and
//! writes a short human-readable report to `out`.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clue_core::board::Position;
use clue_core::eval::EvaluationOutcome;
use clue_core::game::guess_log::{parse_log, verify_replay};
use clue_core::game::{GameSession, PersistenceAdapter};
use clue_core::knowledge::Belief;
use clue_core::model::category::Category;
use clue_core::model::guess::{GuessInput, Solution};
use clue_core::model::registry::Registry;
use clue_core::solution::{BestGuess, GuessTag};

use crate::config::GameConfig;
use crate::store::FileStore;

/// A guess as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct RecordArgs {
    pub guesser: String,
    pub suspect: String,
    pub weapon: String,
    pub room: String,
    pub asked: Vec<String>,
    pub shown_by: Option<String>,
    pub card: Option<String>,
}

impl RecordArgs {
    fn to_input(&self) -> GuessInput {
        GuessInput {
            guesser: self.guesser.clone(),
            suspect: self.suspect.clone(),
            weapon: self.weapon.clone(),
            room: self.room.clone(),
            asked_order: self.asked.clone(),
            showed_by: self.shown_by.clone(),
            card_shown: self.card.clone(),
        }
    }
}

/// `--room NAME` or `--cell ROW,COL`.
pub fn parse_position(room: Option<&str>, cell: Option<&str>) -> Result<Position> {
    match (room, cell) {
        (Some(room), None) => Ok(Position::Room(room.trim().to_string())),
        (None, Some(cell)) => {
            let (row, col) = cell
                .split_once(',')
                .with_context(|| format!("cell '{cell}' must look like ROW,COL"))?;
            let row = row
                .trim()
                .parse()
                .with_context(|| format!("invalid row in '{cell}'"))?;
            let col = col
                .trim()
                .parse()
                .with_context(|| format!("invalid column in '{cell}'"))?;
            Ok(Position::Cell { row, col })
        }
        (Some(_), Some(_)) => bail!("give either --room or --cell, not both"),
        (None, None) => bail!("a position is required: --room NAME or --cell ROW,COL"),
    }
}

fn fresh_session(config: &GameConfig) -> Result<GameSession> {
    GameSession::new(
        &config.setup(),
        config.board.layout(),
        config.session_options(),
    )
    .context("building game session")
}

/// Restores the stored game; `clue init` must have run first.
pub fn open_session(config: &GameConfig) -> Result<(GameSession, FileStore)> {
    let store = FileStore::new(&config.resolved_storage());
    let snapshot = store
        .load_snapshot()
        .with_context(|| format!("reading {}", store.knowledge_path().display()))?
        .with_context(|| {
            format!(
                "no game state at {}; run `clue init` first",
                store.knowledge_path().display()
            )
        })?;
    let session = GameSession::restore(
        &config.setup(),
        config.board.layout(),
        config.session_options(),
        &snapshot,
    )
    .with_context(|| format!("restoring {}", store.knowledge_path().display()))?;
    Ok((session, store))
}

pub fn validate(config: &GameConfig, out: &mut dyn Write) -> Result<()> {
    let session = fresh_session(config)?;
    let registry = session.registry();
    let board = match (&config.board.layout, session.board()) {
        (_, None) => "disabled",
        (Some(_), Some(_)) => "custom",
        (None, Some(_)) => "classic",
    };
    writeln!(
        out,
        "Configuration '{}' is valid: {} players, {} suspects, {} weapons, {} rooms (board: {board})",
        config.game_id,
        registry.player_count(),
        registry.cards_in(Category::Suspect).len(),
        registry.cards_in(Category::Weapon).len(),
        registry.cards_in(Category::Room).len(),
    )?;
    Ok(())
}

pub fn init(config: &GameConfig, force: bool, out: &mut dyn Write) -> Result<()> {
    let mut store = FileStore::new(&config.resolved_storage());
    if store.is_initialized() && !force {
        bail!(
            "game '{}' already exists at {}; pass --force to start over",
            config.game_id,
            store.knowledge_path().display()
        );
    }
    let session = fresh_session(config)?;
    store.reset().context("clearing previous game files")?;
    store
        .save_snapshot(&session.snapshot())
        .with_context(|| format!("writing {}", store.knowledge_path().display()))?;
    writeln!(
        out,
        "Initialized game '{}' with {} possible solutions at {}",
        config.game_id,
        session.solution_space().len(),
        store.knowledge_path().display()
    )?;
    Ok(())
}

pub fn record(config: &GameConfig, args: &RecordArgs, out: &mut dyn Write) -> Result<()> {
    let (mut session, mut store) = open_session(config)?;
    let record = session
        .record_guess(&args.to_input(), &mut store)
        .context("recording guess")?;
    writeln!(
        out,
        "Recorded guess by {}: {} -> {} possible solutions ({} beliefs updated)",
        args.guesser.trim(),
        record.solutions_before,
        record.solutions_after,
        record.report.applied.len()
    )?;
    if !record.report.conflicts.is_empty() {
        writeln!(
            out,
            "Ignored {} update(s) that contradicted earlier knowledge",
            record.report.conflicts.len()
        )?;
    }
    if record.best_guess_cleared {
        writeln!(out, "Previous best guess is no longer useful and was cleared")?;
    }
    if record.solutions_after == 0 {
        writeln!(
            out,
            "Warning: no possible solutions remain; check the recorded guesses for a data-entry mistake"
        )?;
    }
    Ok(())
}

pub fn suggest(
    config: &GameConfig,
    position: &Position,
    moves: u32,
    asked: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let (mut session, mut store) = open_session(config)?;
    let rooms = session.accessible_rooms(moves, position)?;
    let asked_order = if asked.is_empty() {
        session.default_asked_order(session.registry().user())
    } else {
        asked
            .iter()
            .map(|name| session.registry().find_player(name))
            .collect::<Result<Vec<_>, _>>()?
    };
    let outcome = session.evaluate(&asked_order, &rooms)?;
    store
        .save_snapshot(&session.snapshot())
        .with_context(|| format!("writing {}", store.knowledge_path().display()))?;

    match outcome {
        EvaluationOutcome::Selected(scored) => {
            writeln!(
                out,
                "Best guess: {} ({})",
                describe_guess(session.registry(), &scored.best),
                tag_label(scored.best.tag)
            )?;
            writeln!(
                out,
                "Outcome entropy {:.3} bits over {} outcome(s); expected {:.3} bits left",
                scored.entropy_bits, scored.outcomes, scored.expected_remaining_bits
            )?;
        }
        EvaluationOutcome::NoGuessesAvailable => {
            writeln!(out, "No guesses available from {position} with {moves} move(s)")?;
        }
        EvaluationOutcome::NoPossibleSolutions => {
            writeln!(
                out,
                "No possible solutions remain; check the recorded guesses for a data-entry mistake"
            )?;
        }
    }
    Ok(())
}

pub fn reach(config: &GameConfig, position: &Position, moves: u32, out: &mut dyn Write) -> Result<()> {
    let session = fresh_session(config)?;
    let rooms = session.accessible_rooms(moves, position)?;
    let names = session.registry().card_names(&rooms);
    writeln!(
        out,
        "Reachable from {position} with {moves} move(s): {}",
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    )?;
    Ok(())
}

pub fn status(config: &GameConfig, show_table: bool, out: &mut dyn Write) -> Result<()> {
    let (session, _) = open_session(config)?;
    let registry = session.registry();
    let space = session.solution_space();

    writeln!(out, "Game '{}': {} possible solutions", config.game_id, space.len())?;
    for category in Category::ALL {
        writeln!(
            out,
            "  {}: {}",
            category,
            registry.card_names(space.candidates(category)).join(", ")
        )?;
    }
    match session.most_likely_solution() {
        Some(solution) => writeln!(out, "Most likely: {}", describe_solution(registry, &solution))?,
        None => writeln!(
            out,
            "No possible solutions remain; check the recorded guesses for a data-entry mistake"
        )?,
    }
    if let Some(best) = session.best_guess() {
        writeln!(
            out,
            "Best guess: {} ({})",
            describe_guess(registry, &best),
            tag_label(best.tag)
        )?;
    }
    if show_table {
        write_table(registry, &session, out)?;
    }
    Ok(())
}

pub fn log(config: &GameConfig, out: &mut dyn Write) -> Result<()> {
    let (session, store) = open_session(config)?;
    let Some(text) = store
        .read_log()
        .with_context(|| format!("reading {}", store.guess_log_path().display()))?
    else {
        writeln!(out, "No guesses recorded yet")?;
        return Ok(());
    };
    let rows = parse_log(session.registry(), &text)
        .with_context(|| format!("parsing {}", store.guess_log_path().display()))?;
    for (index, row) in rows.iter().enumerate() {
        let shown = match (&row.showed_by, &row.card_shown) {
            (Some(player), Some(card)) => format!("{player} showed {card}"),
            (Some(player), None) => format!("{player} showed a card"),
            _ => "no one showed".to_string(),
        };
        writeln!(
            out,
            "{:>3}. {} asked {} / {} / {} -> {}",
            index + 1,
            row.guesser,
            row.suspect,
            row.weapon,
            row.room,
            shown
        )?;
    }
    verify_replay(session.registry(), &rows, session.table())
        .context("guess log does not match the stored knowledge")?;
    writeln!(
        out,
        "Guess log consistent with knowledge state ({} guesses)",
        rows.len()
    )?;
    Ok(())
}

fn describe_solution(registry: &Registry, solution: &Solution) -> String {
    solution.names(registry).join(" / ")
}

fn describe_guess(registry: &Registry, best: &BestGuess) -> String {
    describe_solution(registry, &best.guess)
}

fn tag_label(tag: GuessTag) -> &'static str {
    match tag {
        GuessTag::SolutionSeeking => "solution-seeking",
        GuessTag::InformationOnly => "information only",
    }
}

fn belief_symbol(belief: Belief) -> char {
    match belief {
        Belief::Unknown => '.',
        Belief::MightHave => '?',
        Belief::NotHas => '-',
        Belief::Has => 'H',
        Belief::IsSolution => 'S',
    }
}

fn write_table(registry: &Registry, session: &GameSession, out: &mut dyn Write) -> Result<()> {
    let width = registry
        .card_ids()
        .map(|card| registry.card(card).name.len())
        .max()
        .unwrap_or(0);
    let players: Vec<_> = registry.player_ids().collect();
    write!(out, "{:width$}", "")?;
    for player in &players {
        write!(out, " {}", registry.player(*player).name)?;
    }
    writeln!(out)?;
    for card in registry.card_ids() {
        write!(out, "{:width$}", registry.card(card).name)?;
        for player in &players {
            let column = registry.player(*player).name.len();
            let symbol = belief_symbol(session.table().get(*player, card));
            write!(out, " {symbol:^column$}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
