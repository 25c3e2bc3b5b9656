use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::AppConfig;
use db::store::Store;
use services::image_service::ImageService;
use services::payment::interface::PaymentGateway;

/// Shared per-process state handed to every handler through `web::Data`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// `None` when no payment provider is configured; checkout then confirms directly.
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub images: Option<ImageService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        payments: Option<Arc<dyn PaymentGateway>>,
        images: Option<ImageService>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            payments,
            images,
            config,
        }
    }
}
