use anyhow::Result;

use crate::cli::commands::{with_desk, Command};
use crate::cli::TaskSort;
use crate::completion::TaskBoard;
use crate::listing::{ListQuery, SortDirection};

pub struct TasksCommand {
    pub search: Option<String>,
    pub page: usize,
    pub page_size: usize,
    pub sort: TaskSort,
}

impl Command for TasksCommand {
    async fn execute(&self) -> Result<()> {
        with_desk(|desk| async move {
            let snapshot = desk.store.snapshot().await;
            let board = TaskBoard::new(desk.auth.clone(), snapshot.tasks, desk.config.undo_window());

            let mut query = ListQuery::default()
                .sorted(self.sort.into(), SortDirection::Ascending)
                .page(self.page, self.page_size);
            if let Some(search) = &self.search {
                query = query.search(search.clone());
            }
            let page = board.view(&query);

            if page.is_empty() {
                println!("📋 No open tasks match");
                return Ok(());
            }

            println!(
                "📋 Open tasks, page {} of {} ({} matching):",
                page.page, page.total_pages, page.total_matches
            );
            for task in &page.items {
                let due = task
                    .due_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "no due date".to_string());
                let assignee = task
                    .assignee_id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "unassigned".to_string());
                println!(
                    "   • [{}] {} ({}, {}, {})",
                    task.id,
                    task.title,
                    task.status.as_str(),
                    due,
                    assignee
                );
            }
            Ok(())
        })
        .await
    }
}
