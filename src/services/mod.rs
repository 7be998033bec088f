//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod favorites;
pub mod stats;
pub mod students;

use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    clock::Clock,
    config::DatabaseConfig,
    error::{AppError, AppResult},
    repository::LibraryStore,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub students: students::StudentsService,
    pub circulation: circulation::CirculationService,
    pub favorites: favorites::FavoritesService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services over one store
    pub fn new(store: Arc<dyn LibraryStore>, clock: Arc<dyn Clock>, config: &DatabaseConfig) -> Self {
        let limit = config.transaction_timeout();
        Self {
            catalog: catalog::CatalogService::new(store.clone(), limit),
            students: students::StudentsService::new(store.clone(), limit),
            circulation: circulation::CirculationService::new(store.clone(), clock, limit),
            favorites: favorites::FavoritesService::new(store.clone(), limit),
            stats: stats::StatsService::new(store, limit),
        }
    }
}

/// Run one store operation under the outer deadline
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?limit, "operation timed out");
            Err(AppError::Timeout(format!("{} did not complete within {:?}", operation, limit)))
        }
    }
}
