use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::routes::tours::load_published;
use crate::services::availability_service::{self, AvailabilityCheckRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarParams {
    pub option_id: Option<String>,
    pub days: Option<i64>,
}

pub async fn get_calendar(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
    params: web::Query<CalendarParams>,
) -> Result<HttpResponse, ApiError> {
    let tour = load_published(&state, &tenant, &path.into_inner()).await?;
    let stop_sales = state
        .store
        .list_stop_sales(tenant.as_str(), Some(&tour.id))
        .await?;

    let max_days = state.config.availability_window_days;
    let days = params.days.unwrap_or(max_days).clamp(1, max_days.max(1));
    let calendar = availability_service::resolve_calendar(
        &tour,
        params.option_id.as_deref(),
        &stop_sales,
        Utc::now().date_naive(),
        days,
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(calendar)))
}

pub async fn check_availability(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
    request: web::Json<AvailabilityCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let tour = load_published(&state, &tenant, &path.into_inner()).await?;
    let stop_sales = state
        .store
        .list_stop_sales(tenant.as_str(), Some(&tour.id))
        .await?;

    let result = availability_service::check(
        &tour,
        &request,
        &stop_sales,
        Utc::now().date_naive(),
        state.config.availability_window_days,
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(result)))
}
