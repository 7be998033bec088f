//! Libraria library back-office server
//!
//! REST JSON API for managing a library catalog, its physical copies, the
//! students who borrow them and their favorite genres, books and authors.

use std::sync::Arc;

pub mod api;
pub mod circulation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
