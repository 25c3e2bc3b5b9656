use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::AppState;

pub async fn get_by_slug(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let slug = path.into_inner();
    let page = state
        .store
        .find_attraction_page_by_slug(tenant.as_str(), &slug)
        .await?
        .filter(|page| page.is_published())
        .ok_or_else(|| ApiError::not_found("Attraction page", &slug))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}
