use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tasklists", about = "Lists of tasks with undo, archive and crash-safe autosave", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// State file to use (default: .tasklists/state.json, local or in the home directory)
    #[arg(long, global = true, env = "TASKLISTS_FILE")]
    pub file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tasklists=trace"
    #[arg(long, global = true, env = "TASKLISTS_LOG", default_value = "warn")]
    pub log_level: String,
}

/// One line of a batch script, parsed without a binary name
#[derive(Parser)]
#[command(no_binary_name = true, name = "batch")]
pub struct BatchLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Initialize a local .tasklists directory in the current directory
    Init,
    /// Show all lists in order
    Lists,
    /// Create, rename, remove or reorder a list
    #[command(subcommand)]
    List(ListCmd),
    /// Show tasks of one list, or of every list
    Tasks {
        /// List id (default: all lists)
        list: Option<String>,
    },
    /// Create, edit, remove, complete, prioritize or reorder a task
    #[command(subcommand)]
    Task(TaskCmd),
    /// Show tasks matching the current filter and search query
    Show,
    /// Move the done tasks of a list to the archive
    ClearDone(ListRef),
    /// Move every task of a list to the archive
    ArchiveAll(ListRef),
    /// Permanently delete every task of a list
    DeleteAll(ListRef),
    /// Show archived tasks, newest first
    History {
        /// Only entries archived from this list
        list: Option<String>,
    },
    /// Set the status filter (all, todo, done)
    Filter { value: String },
    /// Set the search query; no words clears it
    Search { query: Vec<String> },
    /// Remember the active list and focused pane
    Session(SessionArgs),
    /// Revert the previous change made in this session
    Undo,
    /// Run commands read from stdin, one per line, in a single session
    Batch,
}

#[derive(Args, Debug, PartialEq)]
pub struct ListRef {
    /// List id
    pub list: String,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ListCmd {
    /// Create a list
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long, default_value = "")]
        color: String,
    },
    /// Rename a list and set its color
    Rename {
        id: String,
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long, default_value = "")]
        color: String,
    },
    /// Delete a list and all of its tasks
    Rm { id: String },
    /// Move a list one place up
    Up { id: String },
    /// Move a list one place down
    Down { id: String },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum TaskCmd {
    /// Add a task to a list
    Add {
        list: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Replace a task's text
    Edit {
        id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Delete a task
    Rm { id: String },
    /// Toggle a task between open and done
    Toggle { id: String },
    /// Set priority: 0 none, 1 low, 2 medium, 3 high
    Priority {
        id: String,
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
    /// Move a task one place up in its list
    Up { id: String },
    /// Move a task one place down in its list
    Down { id: String },
}

#[derive(Args, Debug, PartialEq)]
pub struct SessionArgs {
    /// Active list id; unknown ids are cleared
    #[arg(default_value = "")]
    pub list: String,
    /// Focused pane (lists, tasks); empty keeps the current one
    #[arg(long, default_value = "")]
    pub focus: String,
    /// Mark the first-run onboarding as seen
    #[arg(long)]
    pub onboarded: bool,
}

impl Commands {
    /// Whether running this command can change the stored state
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Commands::Lists | Commands::Tasks { .. } | Commands::Show | Commands::History { .. }
        )
    }
}
