use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tourbook_api::config::AppConfig;
use tourbook_api::db::memory::MemoryStore;
use tourbook_api::db::mongo::{create_mongo_client, MongoStore};
use tourbook_api::db::store::Store;
use tourbook_api::routes;
use tourbook_api::services::image_service::{GcsImageStorage, ImageService};
use tourbook_api::services::payment::interface::PaymentGateway;
use tourbook_api::services::stripe::provider::StripeProvider;
use tourbook_api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let store: Arc<dyn Store> = match &config.mongo_uri {
        Some(uri) => {
            let client = create_mongo_client(uri)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            log::info!("Using MongoDB database {}", config.mongo_database);
            let store = MongoStore::new(&client, &config.mongo_database);
            if let Err(e) = store.ensure_indexes().await {
                log::error!("Failed to create MongoDB indexes: {}", e);
            }
            Arc::new(store)
        }
        None => {
            log::warn!("MONGODB_URI not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let payments: Option<Arc<dyn PaymentGateway>> = match &config.stripe_secret_key {
        Some(key) => Some(Arc::new(StripeProvider::new(key.clone()))),
        None => {
            log::warn!("STRIPE_SECRET_KEY not set, orders are confirmed without payment");
            None
        }
    };

    let images = match &config.upload_bucket {
        Some(bucket) => {
            match GcsImageStorage::new(bucket.clone(), config.storage_base_url.clone()).await {
                Ok(storage) => Some(ImageService::new(
                    Arc::new(storage),
                    config.max_upload_bytes,
                )),
                Err(e) => {
                    log::error!("Image uploads disabled: {}", e);
                    None
                }
            }
        }
        None => {
            log::warn!("UPLOAD_BUCKET not set, image uploads are disabled");
            None
        }
    };

    let host = config.host.clone();
    let port = config.port;
    let state = web::Data::new(AppState::new(store, payments, images, config));

    log::info!("Starting HTTP server on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
