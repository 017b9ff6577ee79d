use anyhow::Result;
use parking_lot::RwLock;

use super::HistoryStore;
use crate::queue::{QueueSample, SampleHistory};

/// Volatile store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    history: RwLock<SampleHistory>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: SampleHistory) -> Self {
        Self {
            history: RwLock::new(history),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<SampleHistory> {
        Ok(self.history.read().clone())
    }

    fn append(&self, sample: &QueueSample) -> Result<()> {
        self.history.write().append(sample.clone());
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.history.read().len())
    }
}
