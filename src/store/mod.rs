//! Sample history persistence
//!
//! The analytics only need two primitives from storage: load the full history
//! as an ordered snapshot, and append one sample. Both surface failures as
//! errors; an unreadable store must never look like an empty history.

mod memory;
mod sqlite;

pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

use anyhow::Result;

use crate::queue::{QueueSample, SampleHistory};

pub trait HistoryStore: Send + Sync {
    /// Full history, sorted ascending by timestamp.
    fn load(&self) -> Result<SampleHistory>;

    /// Insert a sample; an existing sample with the same timestamp is replaced.
    fn append(&self, sample: &QueueSample) -> Result<()>;

    fn len(&self) -> Result<usize>;
}
