use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::order::CheckoutRequest;
use crate::services::checkout_service::CheckoutService;
use crate::AppState;

pub async fn submit(
    state: web::Data<AppState>,
    tenant: Tenant,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let service = CheckoutService::new(
        state.store.as_ref(),
        state.payments.as_deref(),
        &state.config.currency,
        state.config.availability_window_days,
    );
    let confirmation = service
        .submit(tenant.as_str(), request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(confirmation)))
}

pub async fn get_order(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let order = state
        .store
        .get_order(tenant.as_str(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(order)))
}
