use actix_web::{error::JsonPayloadError, web};

use crate::error::ApiError;

pub mod admin;
pub mod attractions;
pub mod availability;
pub mod booking;
pub mod checkout;
pub mod discounts;
pub mod health;
pub mod tours;
pub mod upload;

/// JSON bodies that fail to parse still answer with the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let api_error = match err {
            JsonPayloadError::OverflowKnownLength { length, limit } => ApiError::PayloadTooLarge(
                format!("Request body is {} bytes, the limit is {}", length, limit),
            ),
            JsonPayloadError::Overflow { limit } => {
                ApiError::PayloadTooLarge(format!("Request body exceeds {} bytes", limit))
            }
            JsonPayloadError::ContentType => {
                ApiError::BadRequest("Content type must be application/json".to_string())
            }
            err => ApiError::BadRequest(format!("Invalid JSON body: {}", err)),
        };
        api_error.into()
    })
}

/// Full route table. `main` and the HTTP tests both mount this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.route("/health", web::get().to(health::liveness)).service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/tours", web::get().to(tours::list_tours))
            .route("/tours/{id}", web::get().to(tours::get_tour))
            .route(
                "/availability/{tour_id}",
                web::get().to(availability::get_calendar),
            )
            .route(
                "/availability/{tour_id}/check",
                web::post().to(availability::check_availability),
            )
            .route("/quote", web::post().to(booking::quote))
            .route("/cart/items", web::post().to(booking::create_cart_item))
            .route("/discounts/verify", web::post().to(discounts::verify))
            .route("/checkout", web::post().to(checkout::submit))
            .route("/orders/{id}", web::get().to(checkout::get_order))
            .route(
                "/attractions/{slug}",
                web::get().to(attractions::get_by_slug),
            )
            .route("/upload", web::post().to(upload::upload_multipart))
            .route("/upload/base64", web::post().to(upload::upload_base64))
            .configure(admin::config),
    );
}
