use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::stop_sale::{StopSale, StopSaleInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSaleParams {
    pub tour_id: Option<String>,
}

pub async fn list(
    state: web::Data<AppState>,
    tenant: Tenant,
    params: web::Query<StopSaleParams>,
) -> Result<HttpResponse, ApiError> {
    let stop_sales = state
        .store
        .list_stop_sales(tenant.as_str(), params.tour_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stop_sales)))
}

pub async fn create(
    state: web::Data<AppState>,
    tenant: Tenant,
    input: web::Json<StopSaleInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    if input.end_date.is_some_and(|end| end < input.date) {
        return Err(ApiError::BadRequest(
            "End date must not be before the start date".to_string(),
        ));
    }

    let tour = state
        .store
        .get_tour(tenant.as_str(), &input.tour_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tour", &input.tour_id))?;
    if let Some(option_id) = input.option_id.as_deref() {
        if tour.option(option_id).is_none() {
            return Err(ApiError::BadRequest(format!(
                "Tour {} has no booking option {}",
                tour.id, option_id
            )));
        }
    }

    let stop_sale = StopSale {
        id: ObjectId::new().to_hex(),
        tenant_id: tenant.0,
        tour_id: input.tour_id,
        option_id: input.option_id,
        date: input.date,
        end_date: input.end_date,
        reason: input.reason,
        created_at: Some(Utc::now()),
    };
    state.store.insert_stop_sale(&stop_sale).await?;
    log::info!(
        "Stopped sales for tour {} from {}",
        stop_sale.tour_id,
        stop_sale.date
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok(stop_sale)))
}

pub async fn delete(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.store.delete_stop_sale(tenant.as_str(), &id).await? {
        return Err(ApiError::not_found("Stop-sale", &id));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "id": id }))))
}
