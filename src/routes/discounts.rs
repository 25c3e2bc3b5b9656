use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::discount::VerifyDiscountRequest;
use crate::services::discount_service;
use crate::AppState;

pub async fn verify(
    state: web::Data<AppState>,
    tenant: Tenant,
    request: web::Json<VerifyDiscountRequest>,
) -> Result<HttpResponse, ApiError> {
    if request.code.trim().is_empty() {
        return Err(ApiError::BadRequest("Discount code is required".to_string()));
    }

    let (_, quote) = discount_service::verify(
        state.store.as_ref(),
        tenant.as_str(),
        &request.code,
        request.subtotal,
        &request.tour_ids,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(quote)))
}
