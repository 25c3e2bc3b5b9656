use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::booking::BookingData;
use crate::routes::tours::load_published;
use crate::services::booking_flow::FlowError;
use crate::services::cart_service;
use crate::services::discount_service;
use crate::services::pricing_service::PricingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub selection: BookingData,
    #[serde(default)]
    pub discount_code: Option<String>,
}

/// Price a selection as it stands, complete or not. The sidebar calls this on every change.
pub async fn quote(
    state: web::Data<AppState>,
    tenant: Tenant,
    request: web::Json<QuoteRequest>,
) -> Result<HttpResponse, ApiError> {
    let QuoteRequest {
        selection,
        discount_code,
    } = request.into_inner();
    let tour = load_published(&state, &tenant, &selection.tour_id).await?;
    selection
        .guests
        .validate(tour.max_group_size)
        .map_err(FlowError::from)?;

    let mut breakdown = PricingService::quote(&tour, &selection)?;
    if let Some(code) = discount_code.as_deref().filter(|c| !c.trim().is_empty()) {
        let (_, discount) = discount_service::verify(
            state.store.as_ref(),
            tenant.as_str(),
            code,
            breakdown.total,
            &[tour.id.clone()],
            Utc::now(),
        )
        .await?;
        breakdown = PricingService::apply_discount(breakdown, discount.discount_amount);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(breakdown)))
}

pub async fn create_cart_item(
    state: web::Data<AppState>,
    tenant: Tenant,
    selection: web::Json<BookingData>,
) -> Result<HttpResponse, ApiError> {
    let selection = selection.into_inner();
    let tour = load_published(&state, &tenant, &selection.tour_id).await?;
    let item = cart_service::build_item(&tour, &selection)?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(item)))
}
