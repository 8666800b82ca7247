pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::repository::PostingRepository;
use crate::services::posting_service::PostingService;

#[derive(Clone)]
pub struct AppState {
    pub posting_service: PostingService,
}

impl AppState {
    pub fn new(repository: Arc<dyn PostingRepository>, config: &Config) -> Self {
        let posting_service = PostingService::new(repository, config.listing_policy());

        Self { posting_service }
    }
}
