use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clue_cli::commands::{self, RecordArgs};
use clue_cli::config::GameConfig;
use clue_cli::logging::init_logging;

/// Deduction assistant for suspect/weapon/room mystery games.
#[derive(Debug, Parser)]
#[command(
    name = "clue",
    author,
    version,
    about = "Tracks card knowledge and suggests the most informative next guess"
)]
struct Cli {
    /// Path to the YAML game configuration.
    #[arg(short, long, value_name = "FILE", default_value = "game.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the configuration and exit.
    Validate,
    /// Create a fresh knowledge state for the configured game.
    Init {
        /// Overwrite an existing game.
        #[arg(long)]
        force: bool,
    },
    /// Record the outcome of one guess.
    Record {
        #[arg(long)]
        guesser: String,
        #[arg(long)]
        suspect: String,
        #[arg(long)]
        weapon: String,
        #[arg(long)]
        room: String,
        /// Players asked, in order (comma-separated).
        #[arg(long, value_delimiter = ',')]
        asked: Vec<String>,
        /// Player who showed a card, if any.
        #[arg(long)]
        shown_by: Option<String>,
        /// Card that was shown, when the user saw it.
        #[arg(long)]
        card: Option<String>,
    },
    /// Recommend the next guess from a position.
    Suggest {
        #[arg(long, conflicts_with = "cell")]
        room: Option<String>,
        /// Hallway cell as ROW,COL.
        #[arg(long)]
        cell: Option<String>,
        /// Movement points available this turn.
        #[arg(long, default_value_t = 0)]
        moves: u32,
        /// Override the asked order (comma-separated); defaults to turn order.
        #[arg(long, value_delimiter = ',')]
        asked: Vec<String>,
    },
    /// List rooms reachable from a position.
    Reach {
        #[arg(long, conflicts_with = "cell")]
        room: Option<String>,
        #[arg(long)]
        cell: Option<String>,
        #[arg(long, default_value_t = 0)]
        moves: u32,
    },
    /// Show the remaining solutions and current recommendation.
    Status {
        /// Also print the full belief table.
        #[arg(long)]
        table: bool,
    },
    /// Print the guess log and check it against the stored knowledge.
    Log,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GameConfig::from_path(&cli.config)?;
    let _logging_guard = init_logging(&config.logging, &config.resolved_storage().data_dir())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Validate => commands::validate(&config, &mut out),
        Command::Init { force } => commands::init(&config, force, &mut out),
        Command::Record {
            guesser,
            suspect,
            weapon,
            room,
            asked,
            shown_by,
            card,
        } => {
            let args = RecordArgs {
                guesser,
                suspect,
                weapon,
                room,
                asked,
                shown_by,
                card,
            };
            commands::record(&config, &args, &mut out)
        }
        Command::Suggest {
            room,
            cell,
            moves,
            asked,
        } => {
            let position = commands::parse_position(room.as_deref(), cell.as_deref())?;
            commands::suggest(&config, &position, moves, &asked, &mut out)
        }
        Command::Reach { room, cell, moves } => {
            let position = commands::parse_position(room.as_deref(), cell.as_deref())?;
            commands::reach(&config, &position, moves, &mut out)
        }
        Command::Status { table } => commands::status(&config, table, &mut out),
        Command::Log => commands::log(&config, &mut out),
    }
}
