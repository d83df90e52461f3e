//! Command-line front end: argument definitions and rendering.

pub mod handlers;

use clap::{Parser, Subcommand};

use crate::domain::Priority;

pub use handlers::execute;

/// Personal kanban board tracker
#[derive(Debug, Parser)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create, inspect and delete boards
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },

    /// Inspect a board column
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },

    /// Create cards and move them through a board
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum BoardCommand {
    /// Create a board with its initial, pending, final and cancel columns
    Create {
        /// Board name
        name: String,

        /// Name of the entry column
        #[arg(long)]
        initial: String,

        /// Intermediate columns, in order (repeatable)
        #[arg(long = "pending")]
        pending: Vec<String>,

        /// Name of the column for finished cards
        #[arg(long = "final")]
        final_column: String,

        /// Name of the column for cancelled cards
        #[arg(long)]
        cancel: String,
    },

    /// List all boards
    List,

    /// Show a board's columns and how many cards each holds
    Show { board_id: i64 },

    /// Delete a board with all its columns and cards
    Delete { board_id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum ColumnCommand {
    /// List the cards in a column, one page at a time
    Show {
        board_id: i64,
        column_id: i64,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum CardCommand {
    /// Create a card in the board's initial column
    Create {
        board_id: i64,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// low, medium, high or critical (default: medium)
        #[arg(long)]
        priority: Option<Priority>,

        /// Due date as "yyyy-MM-dd HH:mm"
        #[arg(long)]
        due: Option<String>,
    },

    /// Move a card to the next column
    Move { board_id: i64, card_id: i64 },

    /// Block a card
    Block {
        board_id: i64,
        card_id: i64,

        #[arg(long)]
        reason: String,
    },

    /// Unblock a card
    Unblock {
        card_id: i64,

        #[arg(long)]
        reason: String,
    },

    /// Move a card to the board's cancel column
    Cancel { board_id: i64, card_id: i64 },

    /// Show a card
    Show {
        card_id: i64,

        /// Include every block and unblock event
        #[arg(long)]
        history: bool,
    },

    /// Delete a card
    Delete { card_id: i64 },
}
