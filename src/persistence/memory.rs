//! In-memory stats store

use std::cell::RefCell;
use std::rc::Rc;

use super::StatsStore;
use crate::error::StoreError;
use crate::stats::LocalStats;

/// Stats kept for the lifetime of the process; clones share one slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<LocalStats>>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses writes, for exercising save failures
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Last saved stats, if any
    pub fn saved(&self) -> Option<LocalStats> {
        self.slot.borrow().clone()
    }
}

impl StatsStore for MemoryStore {
    fn load(&self) -> LocalStats {
        self.slot.borrow().clone().unwrap_or_default()
    }

    fn save(&mut self, stats: &LocalStats) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Unavailable);
        }
        *self.slot.borrow_mut() = Some(stats.clone());
        Ok(())
    }
}
