// Data-access boundary for the workload store
//
// The hosted database is opaque to the workflows: everything goes through the
// `DataStore` trait so tests can inject doubles and the CLI can run against a
// JSON snapshot.

pub mod errors;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use errors::StoreError;
pub use memory::InMemoryStore;
pub use snapshot::{Snapshot, SnapshotError};
pub use traits::DataStore;

#[cfg(any(test, feature = "testing"))]
pub use traits::MockDataStore;
