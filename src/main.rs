use anyhow::Result;
use clap::Parser;

use workload_desk::cli::commands::candidates::CandidatesCommand;
use workload_desk::cli::commands::complete::CompleteCommand;
use workload_desk::cli::commands::delete::DeleteCommand;
use workload_desk::cli::commands::impact::ImpactCommand;
use workload_desk::cli::commands::init::InitCommand;
use workload_desk::cli::commands::tasks::TasksCommand;
use workload_desk::cli::commands::{show_how_to_get_started, Command};
use workload_desk::cli::{Cli, Commands};
use workload_desk::{config, init_config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_telemetry(&config()?.observability)?;
    init_config()?;

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            // Default behavior: no subcommand, explain the workflow
            None => show_how_to_get_started().await,
            Some(Commands::Init {
                operator,
                snapshot,
                force,
            }) => {
                InitCommand {
                    operator,
                    snapshot,
                    force,
                }
                .execute()
                .await
            }
            Some(Commands::Impact { entity }) => ImpactCommand::new(entity).execute().await,
            Some(Commands::Candidates { entity, filter }) => {
                CandidatesCommand::new(entity)
                    .with_filter(filter)
                    .execute()
                    .await
            }
            Some(Commands::Delete {
                entity,
                transfer_to,
                purge: _,
            }) => {
                let command = match transfer_to {
                    Some(target) => DeleteCommand::transfer(entity, target),
                    None => DeleteCommand::purge(entity),
                };
                command.execute().await
            }
            Some(Commands::Tasks {
                search,
                page,
                page_size,
                sort,
            }) => {
                TasksCommand {
                    search,
                    page,
                    page_size,
                    sort,
                }
                .execute()
                .await
            }
            Some(Commands::Complete { task, undo_after }) => {
                CompleteCommand {
                    task_id: task,
                    undo_after,
                }
                .execute()
                .await
            }
        }
    })
}
