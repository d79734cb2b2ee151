// Optimistic task completion with a time-boxed undo
//
// Completing a task removes it from the visible list right away. The task is
// held in a single undo slot until its window elapses.

pub mod board;
pub mod undo_buffer;

pub use board::{CompletionError, Countdown, TaskBoard, TaskSortKey};
pub use undo_buffer::{BufferedCompletion, UndoBuffer};
