use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::completion::TaskSortKey;

pub mod commands;

#[derive(Parser)]
#[command(name = "workload-desk")]
#[command(about = "Back-office desk for reassigning workload and closing out tasks")]
#[command(long_about = "Workload Desk previews what depends on an employee record, transfers or \
                       deletes that workload, and completes tasks with a short undo window. \
                       Start with 'workload-desk impact <ENTITY>' before deleting anything.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter workload-desk.toml in the current directory
    Init {
        /// Entity id of the operator running the desk
        #[arg(long)]
        operator: Option<String>,
        /// Snapshot file the desk reads and writes
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Overwrite an existing workload-desk.toml
        #[arg(long)]
        force: bool,
    },
    /// Show how many tasks and events reference an entity
    Impact {
        /// Entity to inspect
        entity: String,
    },
    /// List entities that can receive another entity's workload
    Candidates {
        /// Entity being deleted (excluded from the list)
        entity: String,
        /// Case-insensitive filter on name or category
        #[arg(long, help = "Only show candidates whose name or category contains TEXT")]
        filter: Option<String>,
    },
    /// Delete an entity, transferring or deleting its dependent records
    Delete {
        /// Entity to delete
        entity: String,
        /// Reassign dependent records to this entity
        #[arg(
            long,
            conflicts_with = "purge",
            required_unless_present = "purge",
            help = "Entity that receives the reassigned tasks and events"
        )]
        transfer_to: Option<String>,
        /// Delete dependent records along with the entity
        #[arg(long, help = "Delete assigned tasks and owned events as well")]
        purge: bool,
    },
    /// List open tasks
    Tasks {
        /// Case-insensitive search over title, id and status
        #[arg(long)]
        search: Option<String>,
        /// Page to show, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,
        /// Tasks per page
        #[arg(long, default_value = "25")]
        page_size: usize,
        /// Sort order
        #[arg(long, value_enum, default_value = "due")]
        sort: TaskSort,
    },
    /// Complete a task, keeping it restorable until the undo window closes
    Complete {
        /// Task to complete
        task: String,
        /// Undo after this many seconds instead of letting the window lapse
        #[arg(long, help = "Restore the task after SECONDS (demonstrates undo)")]
        undo_after: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskSort {
    Title,
    Due,
    Status,
}

impl From<TaskSort> for TaskSortKey {
    fn from(sort: TaskSort) -> Self {
        match sort {
            TaskSort::Title => TaskSortKey::Title,
            TaskSort::Due => TaskSortKey::DueDate,
            TaskSort::Status => TaskSortKey::Status,
        }
    }
}
