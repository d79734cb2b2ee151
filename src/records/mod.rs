// Typed records for the workload data store
//
// Rows coming back from the store are loosely shaped JSON objects. They are
// validated into these types once, at the data-access boundary.

pub mod types;
pub mod validation;

pub use types::{CalendarEvent, Entity, EntityId, EventId, RecordKind, Task, TaskId, TaskStatus};
pub use validation::RecordError;
