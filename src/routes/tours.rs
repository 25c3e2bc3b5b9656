use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::db::store::TourQuery;
use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::tour::Tour;
use crate::AppState;

const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct TourListParams {
    pub search: Option<String>,
    /// Destination id or slug.
    pub destination: Option<String>,
    pub limit: Option<u32>,
}

pub async fn list_tours(
    state: web::Data<AppState>,
    tenant: Tenant,
    params: web::Query<TourListParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();

    let destination_id = match params.destination.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let by_slug = state
                .store
                .find_destination_by_slug(tenant.as_str(), key)
                .await?;
            Some(by_slug.map(|d| d.id).unwrap_or_else(|| key.to_string()))
        }
        _ => None,
    };

    let query = TourQuery {
        search: params.search,
        destination_id,
        published_only: true,
        limit: Some(params.limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT)),
    };
    let tours = state.store.list_tours(tenant.as_str(), &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(tours)))
}

/// Unpublished tours are invisible outside the admin API.
pub(crate) async fn load_published(
    state: &AppState,
    tenant: &Tenant,
    id: &str,
) -> Result<Tour, ApiError> {
    state
        .store
        .get_tour(tenant.as_str(), id)
        .await?
        .filter(|tour| tour.is_published)
        .ok_or_else(|| ApiError::not_found("Tour", id))
}

pub async fn get_tour(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tour = load_published(&state, &tenant, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tour)))
}
