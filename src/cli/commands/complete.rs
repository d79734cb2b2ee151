use anyhow::Result;
use std::time::Duration;

use crate::cli::commands::{with_desk, Command};
use crate::completion::TaskBoard;
use crate::records::{TaskId, TaskStatus};

pub struct CompleteCommand {
    pub task_id: String,
    pub undo_after: Option<u64>,
}

impl Command for CompleteCommand {
    async fn execute(&self) -> Result<()> {
        let task_id = TaskId::try_new(self.task_id.clone())?;

        with_desk(|desk| async move {
            let snapshot = desk.store.snapshot().await;
            let mut board = TaskBoard::new(desk.auth.clone(), snapshot.tasks, desk.config.undo_window());

            let countdown = board.complete(&task_id)?;
            println!(
                "✅ \"{}\" completed. Undo available for {}s",
                countdown.title, countdown.seconds_remaining
            );

            let undo_at = self.undo_after.map(Duration::from_secs);
            let started = tokio::time::Instant::now();
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let undo_due = undo_at.is_some_and(|after| started.elapsed() >= after);
                if undo_due && board.undo().is_some() {
                    println!("↩️  \"{}\" restored", countdown.title);
                    return Ok(());
                }
                match board.tick() {
                    Some(remaining) => println!("   ⏳ {}s left to undo", remaining.seconds_remaining),
                    None => break,
                }
            }

            desk.store
                .record_task_status(&desk.auth, &task_id, TaskStatus::Completed)
                .await?;
            desk.persist().await?;
            println!("📌 Completion of \"{}\" is final", countdown.title);
            Ok(())
        })
        .await
    }
}
