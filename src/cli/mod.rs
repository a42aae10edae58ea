//! Command-line interface for the board
//!
//! This module defines the CLI structure using clap derive macros. The
//! handlers live in submodules; every mutating command goes through the
//! same controller the library exposes to rendering layers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod board;
mod comment;

/// board - Task Board CLI
///
/// Shows a project as Kanban columns or Gantt lanes, moves cards,
/// reschedules bars, and manages comments and assignees against a JSON
/// board file.
#[derive(Parser, Debug)]
#[command(name = "board")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the board data (defaults to current directory)
    #[arg(long, global = true, env = "BOARD_DIR")]
    pub dir: Option<PathBuf>,

    /// Acting user id, for "mine" filtering and comment ownership
    #[arg(long, global = true, env = "BOARD_USER")]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit JSONL events to a file, or "-" for stdout
    #[arg(long, global = true)]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a demo board file in the data directory
    Init {
        /// Overwrite an existing board file
        #[arg(long)]
        force: bool,
    },

    /// Show the board as Kanban columns (or Gantt lanes with --gantt)
    Show {
        /// Case-insensitive text search over name and description
        #[arg(long)]
        text: Option<String>,

        /// Only these priorities (low, medium, high, urgent); repeatable
        #[arg(long = "priority")]
        priorities: Vec<String>,

        /// Only tasks assigned to these member ids; repeatable
        #[arg(long = "assignee")]
        assignees: Vec<String>,

        /// Only tasks assigned to the acting user
        #[arg(long)]
        mine: bool,

        /// Lower bound (inclusive) of the due date range, YYYY-MM-DD
        #[arg(long)]
        due_from: Option<String>,

        /// Upper bound (inclusive) of the due date range, YYYY-MM-DD
        #[arg(long)]
        due_to: Option<String>,

        /// Group as Gantt lanes with date spans
        #[arg(long)]
        gantt: bool,
    },

    /// Move a card to another column
    Move {
        /// Task id
        task: String,

        /// Target status (todo, in_progress, review, done, completed)
        status: String,
    },

    /// Set a task's start and due dates
    Schedule {
        /// Task id
        task: String,

        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
    },

    /// Slide a task's bar by whole days, keeping its span
    Shift {
        /// Task id
        task: String,

        /// Days to shift (negative moves earlier)
        #[arg(long, allow_hyphen_values = true)]
        days: i64,
    },

    /// Replace a task's assignee set
    Assign {
        /// Task id
        task: String,

        /// Member ids; an empty list clears the set
        members: Vec<String>,
    },

    /// List project members
    Members,

    /// Delete a task
    Rm {
        /// Task id
        task: String,
    },

    /// Comment management
    #[command(subcommand)]
    Comment(CommentCommand),
}

/// Comment subcommands
#[derive(Subcommand, Debug)]
pub enum CommentCommand {
    /// List a task's comments
    List {
        /// Task id
        task: String,
    },

    /// Add a comment to a task
    Add {
        /// Task id
        task: String,

        /// Comment text
        text: String,
    },

    /// Edit your own comment
    Edit {
        /// Task id
        task: String,

        /// Comment id
        comment: String,

        /// Replacement text
        text: String,
    },

    /// Delete your own comment
    Rm {
        /// Task id
        task: String,

        /// Comment id
        comment: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.dispatch())
    }

    async fn dispatch(self) -> Result<()> {
        let globals = board::Globals::from_cli(&self)?;
        match self.command {
            Commands::Init { force } => board::init(&globals, force),
            Commands::Show {
                text,
                priorities,
                assignees,
                mine,
                due_from,
                due_to,
                gantt,
            } => {
                board::show(
                    &globals,
                    board::ShowOptions {
                        text,
                        priorities,
                        assignees,
                        mine,
                        due_from,
                        due_to,
                        gantt,
                    },
                )
                .await
            }
            Commands::Move { task, status } => board::move_card(&globals, &task, &status).await,
            Commands::Schedule { task, start, due } => {
                board::schedule(&globals, &task, &start, &due).await
            }
            Commands::Shift { task, days } => board::shift(&globals, &task, days).await,
            Commands::Assign { task, members } => board::assign(&globals, &task, members).await,
            Commands::Members => board::members(&globals).await,
            Commands::Rm { task } => board::remove_task(&globals, &task).await,
            Commands::Comment(command) => comment::dispatch(&globals, command).await,
        }
    }
}
