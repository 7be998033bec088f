//! Statistics service

use std::{sync::Arc, time::Duration};

use super::bounded;
use crate::{
    error::AppResult,
    models::LibraryStats,
    repository::{LibraryStore, StatsStore},
};

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn LibraryStore>,
    limit: Duration,
}

impl StatsService {
    pub fn new(store: Arc<dyn LibraryStore>, limit: Duration) -> Self {
        Self { store, limit }
    }

    /// Get library statistics
    pub async fn library_stats(&self) -> AppResult<LibraryStats> {
        bounded(self.limit, "library_stats", self.store.library_stats()).await
    }
}
