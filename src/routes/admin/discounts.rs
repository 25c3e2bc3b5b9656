use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::discount::{normalize_code, Discount, DiscountInput, DiscountKind};
use crate::AppState;

fn validate(input: &DiscountInput) -> Result<(), ApiError> {
    let code = normalize_code(&input.code);
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ApiError::BadRequest(format!(
            "Discount code must be letters, digits, '-' or '_': {}",
            input.code
        )));
    }
    if input.value <= 0.0 {
        return Err(ApiError::BadRequest(
            "Discount value must be positive".to_string(),
        ));
    }
    if input.kind == DiscountKind::Percentage && input.value > 100.0 {
        return Err(ApiError::BadRequest(
            "Percentage discounts cannot exceed 100".to_string(),
        ));
    }
    if let (Some(from), Some(until)) = (input.valid_from, input.valid_until) {
        if until < from {
            return Err(ApiError::BadRequest(
                "Discount expires before it starts".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn list(
    state: web::Data<AppState>,
    tenant: Tenant,
) -> Result<HttpResponse, ApiError> {
    let discounts = state.store.list_discounts(tenant.as_str()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(discounts)))
}

pub async fn create(
    state: web::Data<AppState>,
    tenant: Tenant,
    input: web::Json<DiscountInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    validate(&input)?;

    let code = normalize_code(&input.code);
    if state
        .store
        .find_discount_by_code(tenant.as_str(), &code)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Discount code already exists: {}",
            code
        )));
    }

    let discount = Discount {
        id: ObjectId::new().to_hex(),
        tenant_id: tenant.0,
        code,
        kind: input.kind,
        value: input.value,
        min_subtotal: input.min_subtotal,
        max_uses: input.max_uses,
        used_count: 0,
        valid_from: input.valid_from,
        valid_until: input.valid_until,
        tour_ids: input.tour_ids,
        active: input.active,
        created_at: Some(Utc::now()),
    };
    state.store.insert_discount(&discount).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(discount)))
}
