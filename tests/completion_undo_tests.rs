//! Optimistic completion with paused tokio time
//!
//! The undo deadline is a tokio Instant, so advancing the paused clock moves
//! the countdown without real waits.

use std::time::Duration;
use tokio::time::advance;

use workload_desk::completion::{CompletionError, TaskBoard, TaskSortKey};
use workload_desk::{
    AuthContext, EntityId, ListQuery, Permission, Snapshot, SortDirection, TaskId, TaskStatus,
};

const FIXTURE: &str = include_str!("desk_fixtures/desk_snapshot.json");
const WINDOW: Duration = Duration::from_secs(10);

fn board() -> TaskBoard {
    let snapshot = Snapshot::from_json_str(FIXTURE).unwrap();
    let auth = AuthContext::new(
        EntityId::from("op-1"),
        "Duty Officer",
        [Permission::ViewWorkload, Permission::ManageTasks],
    );
    TaskBoard::new(auth, snapshot.tasks, WINDOW)
}

fn ids(board: &TaskBoard) -> Vec<&str> {
    board.tasks().iter().map(|task| task.id.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_completed_tasks_are_hidden_from_the_board() {
    let board = board();
    assert_eq!(ids(&board), vec!["t-1", "t-2", "t-3", "t-5"]);
}

#[tokio::test(start_paused = true)]
async fn test_undo_inside_window_restores_position_and_status() {
    let mut board = board();
    let before = board.tasks().to_vec();

    let countdown = board.complete(&TaskId::from("t-2")).unwrap();
    assert_eq!(countdown.seconds_remaining, 10);
    assert_eq!(board.len(), before.len() - 1);

    advance(Duration::from_millis(9_500)).await;
    assert_eq!(board.tick().unwrap().seconds_remaining, 1);

    assert_eq!(board.undo(), Some(TaskId::from("t-2")));
    assert_eq!(board.tasks(), before.as_slice());
    assert_eq!(board.tasks()[1].status, TaskStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_decreases_every_second() {
    let mut board = board();
    board.complete(&TaskId::from("t-1")).unwrap();

    let mut seen = Vec::new();
    for _ in 0..10 {
        advance(Duration::from_secs(1)).await;
        if let Some(countdown) = board.tick() {
            seen.push(countdown.seconds_remaining);
        }
    }
    assert_eq!(seen, vec![9, 8, 7, 6, 5, 4, 3, 2, 1]);
    assert!(board.countdown().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_is_final() {
    let mut board = board();
    board.complete(&TaskId::from("t-3")).unwrap();

    advance(WINDOW).await;
    assert!(board.tick().is_none());
    assert_eq!(board.undo(), None);
    assert_eq!(ids(&board), vec!["t-1", "t-2", "t-5"]);

    advance(Duration::from_secs(60)).await;
    assert_eq!(board.undo(), None);
    assert_eq!(board.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_new_completion_restarts_the_window() {
    let mut board = board();
    board.complete(&TaskId::from("t-1")).unwrap();
    advance(Duration::from_secs(8)).await;

    board.complete(&TaskId::from("t-5")).unwrap();
    advance(Duration::from_secs(8)).await;

    let countdown = board.tick().unwrap();
    assert_eq!(countdown.task_id, TaskId::from("t-5"));
    assert_eq!(countdown.seconds_remaining, 2);

    assert_eq!(board.undo(), Some(TaskId::from("t-5")));
    assert_eq!(ids(&board), vec!["t-2", "t-3", "t-5"]);
}

#[tokio::test(start_paused = true)]
async fn test_last_task_restores_to_list_end() {
    let mut board = board();
    board.complete(&TaskId::from("t-5")).unwrap();
    assert_eq!(board.undo(), Some(TaskId::from("t-5")));
    assert_eq!(ids(&board).last(), Some(&"t-5"));
}

#[tokio::test(start_paused = true)]
async fn test_completing_a_hidden_task_fails() {
    let mut board = board();
    assert_eq!(
        board.complete(&TaskId::from("t-4")),
        Err(CompletionError::TaskNotFound(TaskId::from("t-4")))
    );
    assert_eq!(board.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_search_and_sort_over_remaining_tasks() {
    let mut board = board();
    board.complete(&TaskId::from("t-2")).unwrap();

    let query = ListQuery::default()
        .search("PENDING")
        .sorted(TaskSortKey::Title, SortDirection::Descending);
    let page = board.view(&query);

    let titles: Vec<_> = page.items.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Update org chart", "Renew vendor contract", "Close Q3 ledger"]
    );
    assert_eq!(page.total_pages, 1);
}
