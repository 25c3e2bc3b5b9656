use actix_web::web;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::ApiError;

pub mod attraction_pages;
pub mod destinations;
pub mod discounts;
pub mod stop_sales;
pub mod tours;

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug pattern"));

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::scope("/tours")
                    .route("", web::get().to(tours::list))
                    .route("", web::post().to(tours::create))
                    .route("/{id}", web::get().to(tours::get))
                    .route("/{id}", web::put().to(tours::update))
                    .route("/{id}", web::delete().to(tours::delete)),
            )
            .service(
                web::scope("/destinations")
                    .route("", web::get().to(destinations::list))
                    .route("", web::post().to(destinations::create))
                    .route("/{id}", web::get().to(destinations::get))
                    .route("/{id}", web::put().to(destinations::update))
                    .route("/{id}", web::delete().to(destinations::delete)),
            )
            .service(
                web::scope("/attraction-pages")
                    .route("", web::get().to(attraction_pages::list))
                    .route("", web::post().to(attraction_pages::create))
                    .route("/{id}", web::get().to(attraction_pages::get))
                    .route("/{id}", web::put().to(attraction_pages::update))
                    .route("/{id}", web::delete().to(attraction_pages::delete))
                    .route(
                        "/{id}/publish",
                        web::post().to(attraction_pages::publish),
                    )
                    .route(
                        "/{id}/unpublish",
                        web::post().to(attraction_pages::unpublish),
                    ),
            )
            .service(
                web::scope("/stop-sales")
                    .route("", web::get().to(stop_sales::list))
                    .route("", web::post().to(stop_sales::create))
                    .route("/{id}", web::delete().to(stop_sales::delete)),
            )
            .service(
                web::scope("/discounts")
                    .route("", web::get().to(discounts::list))
                    .route("", web::post().to(discounts::create)),
            ),
    );
}

/// Lower-case kebab case: `cliffs-of-moher`.
pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if SLUG.is_match(slug) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Slug must be lower-case words separated by hyphens: {}",
            slug
        )))
    }
}

pub fn validate_image_url(value: &str) -> Result<(), ApiError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(ApiError::BadRequest(format!("Invalid image URL: {}", value))),
    }
}

pub fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
