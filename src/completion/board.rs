use std::cmp::Ordering;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::auth::{AuthContext, Permission};
use crate::listing::{self, ListQuery, Listable, Page};
use crate::records::{Task, TaskId, TaskStatus};

use super::undo_buffer::{BufferedCompletion, UndoBuffer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Task {0} is not on the board")]
    TaskNotFound(TaskId),
    #[error("Task {0} is already completed")]
    AlreadyCompleted(TaskId),
    #[error("Operator {0} may not change task status")]
    PermissionDenied(String),
}

/// What the undo banner shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub task_id: TaskId,
    pub title: String,
    pub seconds_remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    Title,
    DueDate,
    Status,
}

impl Listable for Task {
    type SortKey = TaskSortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.id.as_str(), self.status.as_str()]
    }

    fn compare_by(&self, other: &Self, key: TaskSortKey) -> Ordering {
        match key {
            TaskSortKey::Title => self.title.cmp(&other.title),
            // undated tasks sort last
            TaskSortKey::DueDate => match (self.due_date, other.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            TaskSortKey::Status => self.status.as_str().cmp(other.status.as_str()),
        }
    }
}

/// Visible task list with optimistic completion and a single undo slot
#[derive(Debug, Clone)]
pub struct TaskBoard {
    auth: AuthContext,
    visible: Vec<Task>,
    buffer: UndoBuffer,
}

impl TaskBoard {
    pub fn new(auth: AuthContext, tasks: Vec<Task>, undo_window: Duration) -> Self {
        let visible = tasks
            .into_iter()
            .filter(|task| task.status != TaskStatus::Completed)
            .collect();
        Self {
            auth,
            visible,
            buffer: UndoBuffer::new(undo_window),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn view(&self, query: &ListQuery<TaskSortKey>) -> Page<Task> {
        listing::apply(&self.visible, query)
    }

    /// Remove the task immediately and open its undo window.
    ///
    /// Only one completion is held: completing another task while a window is
    /// open discards the earlier task's undo.
    pub fn complete(&mut self, task_id: &TaskId) -> Result<Countdown, CompletionError> {
        if !self.auth.can(Permission::ManageTasks) {
            return Err(CompletionError::PermissionDenied(self.auth.operator_id.to_string()));
        }

        let now = Instant::now();
        self.buffer.expire(now);

        let position = self
            .visible
            .iter()
            .position(|task| &task.id == task_id)
            .ok_or_else(|| CompletionError::TaskNotFound(task_id.clone()))?;
        if self.visible[position].status == TaskStatus::Completed {
            return Err(CompletionError::AlreadyCompleted(task_id.clone()));
        }

        let mut task = self.visible.remove(position);
        let previous_status = task.status;
        task.status = TaskStatus::Completed;

        let countdown = Countdown {
            task_id: task.id.clone(),
            title: task.title.clone(),
            seconds_remaining: self.buffer.window().as_secs(),
        };

        let completion =
            BufferedCompletion::new(task, previous_status, position, self.buffer.window(), now);
        if let Some(evicted) = self.buffer.hold(completion) {
            warn!(
                task_id = %evicted.task.id,
                replaced_by = %task_id,
                "Undo for earlier completion discarded"
            );
        }

        info!(
            %task_id,
            previous_status = previous_status.as_str(),
            operator = %self.auth.operator_id,
            "Task completed"
        );
        Ok(countdown)
    }

    /// Put the buffered task back where it was, with its previous status.
    /// No-op once the window has elapsed or nothing is held.
    pub fn undo(&mut self) -> Option<TaskId> {
        let now = Instant::now();
        let Some(completion) = self.buffer.take_live(now) else {
            debug!("Undo requested with nothing to restore");
            return None;
        };

        let mut task = completion.task;
        task.status = completion.previous_status;
        let task_id = task.id.clone();
        let position = completion.position.min(self.visible.len());
        self.visible.insert(position, task);

        info!(%task_id, "Task completion undone");
        Some(task_id)
    }

    /// Recompute the countdown from the deadline, clearing it once elapsed
    pub fn tick(&mut self) -> Option<Countdown> {
        let now = Instant::now();
        if let Some(expired) = self.buffer.expire(now) {
            debug!(task_id = %expired.task.id, "Undo window closed");
            return None;
        }
        self.countdown_at(now)
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown_at(Instant::now())
    }

    fn countdown_at(&self, now: Instant) -> Option<Countdown> {
        let entry = self.buffer.peek(now)?;
        Some(Countdown {
            task_id: entry.task.id.clone(),
            title: entry.task.title.clone(),
            seconds_remaining: self.buffer.seconds_remaining(now)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SortDirection;
    use crate::records::EntityId;
    use chrono::NaiveDate;

    fn manager() -> AuthContext {
        AuthContext::new(EntityId::from("op"), "Duty Officer", [Permission::ManageTasks])
    }

    fn board() -> TaskBoard {
        TaskBoard::new(
            manager(),
            vec![
                Task::new("t-1", "Close ledger", TaskStatus::Pending),
                Task::new("t-2", "Audit travel claims", TaskStatus::InProgress),
                Task::new("t-3", "Archive 2025 files", TaskStatus::Pending),
                Task::new("t-4", "Already done", TaskStatus::Completed),
            ],
            Duration::from_secs(10),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_then_undo_restores_position_and_status() {
        let mut board = board();
        assert_eq!(board.len(), 3);

        let countdown = board.complete(&TaskId::from("t-2")).unwrap();
        assert_eq!(countdown.seconds_remaining, 10);
        assert_eq!(board.len(), 2);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(board.tick().map(|c| c.seconds_remaining), Some(6));

        assert_eq!(board.undo(), Some(TaskId::from("t-2")));
        assert_eq!(board.len(), 3);
        assert_eq!(board.tasks()[1].id, TaskId::from("t-2"));
        assert_eq!(board.tasks()[1].status, TaskStatus::InProgress);
        assert!(board.countdown().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_window_makes_removal_final() {
        let mut board = board();
        board.complete(&TaskId::from("t-1")).unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(board.tick().is_none());
        assert_eq!(board.undo(), None);
        assert_eq!(board.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_completion_overwrites_undo_slot() {
        let mut board = board();
        board.complete(&TaskId::from("t-1")).unwrap();
        board.complete(&TaskId::from("t-3")).unwrap();
        assert_eq!(board.len(), 1);

        assert_eq!(board.undo(), Some(TaskId::from("t-3")));
        assert_eq!(board.undo(), None);
        assert_eq!(board.len(), 2);
        assert!(board.tasks().iter().all(|task| task.id != TaskId::from("t-1")));
    }

    #[test]
    fn test_unknown_task_and_missing_permission() {
        let mut board = board();
        assert_eq!(
            board.complete(&TaskId::from("t-9")),
            Err(CompletionError::TaskNotFound(TaskId::from("t-9")))
        );

        let mut read_only = TaskBoard::new(
            AuthContext::new(EntityId::from("viewer"), "Viewer", [Permission::ViewWorkload]),
            vec![Task::new("t-1", "Close ledger", TaskStatus::Pending)],
            Duration::from_secs(10),
        );
        assert!(matches!(
            read_only.complete(&TaskId::from("t-1")),
            Err(CompletionError::PermissionDenied(_))
        ));
        assert_eq!(read_only.len(), 1);
    }

    #[test]
    fn test_view_sorts_by_due_date_with_undated_last() {
        let board = TaskBoard::new(
            manager(),
            vec![
                Task::new("t-1", "Undated", TaskStatus::Pending),
                Task::new("t-2", "Later", TaskStatus::Pending)
                    .due(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()),
                Task::new("t-3", "Sooner", TaskStatus::Pending)
                    .due(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()),
            ],
            Duration::from_secs(10),
        );

        let query = ListQuery::default().sorted(TaskSortKey::DueDate, SortDirection::Ascending);
        let page = board.view(&query);
        let titles: Vec<_> = page.items.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["Sooner", "Later", "Undated"]);
    }
}
