use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;

use crate::db::store::TourQuery;
use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::tour::{Tour, TourInput};
use crate::routes::admin::{require_text, validate_slug};
use crate::AppState;

fn validate(input: &TourInput) -> Result<(), ApiError> {
    require_text("Title", &input.title)?;
    validate_slug(&input.slug)?;
    if input.max_group_size == 0 {
        return Err(ApiError::BadRequest(
            "Max group size must be at least 1".to_string(),
        ));
    }
    if input.pricing.base_price < 0.0 {
        return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
    }
    for option in &input.booking_options {
        require_text("Booking option id", &option.id)?;
        if option.price < 0.0 {
            return Err(ApiError::BadRequest(format!(
                "Option {} has a negative price",
                option.id
            )));
        }
    }
    for add_on in &input.add_ons {
        require_text("Add-on id", &add_on.id)?;
    }
    Ok(())
}

pub async fn list(
    state: web::Data<AppState>,
    tenant: Tenant,
) -> Result<HttpResponse, ApiError> {
    let tours = state
        .store
        .list_tours(tenant.as_str(), &TourQuery::default())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tours)))
}

pub async fn get(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let tour = state
        .store
        .get_tour(tenant.as_str(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tour", &id))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tour)))
}

pub async fn create(
    state: web::Data<AppState>,
    tenant: Tenant,
    input: web::Json<TourInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    validate(&input)?;

    let now = Utc::now();
    let tour = Tour {
        id: ObjectId::new().to_hex(),
        tenant_id: tenant.0,
        title: input.title,
        slug: input.slug,
        description: input.description,
        pricing: input.pricing,
        duration: input.duration,
        max_group_size: input.max_group_size,
        availability: input.availability,
        booking_options: input.booking_options,
        add_ons: input.add_ons,
        destination: None,
        is_published: input.is_published,
        created_at: Some(now),
        updated_at: Some(now),
    };
    state.store.insert_tour(&tour).await?;
    log::info!("Created tour {} for {}", tour.id, tour.tenant_id);

    Ok(HttpResponse::Created().json(ApiResponse::ok(tour)))
}

/// Replaces the editable fields. The destination link is owned by destination sync.
pub async fn update(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
    input: web::Json<TourInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let input = input.into_inner();
    validate(&input)?;

    let existing = state
        .store
        .get_tour(tenant.as_str(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tour", &id))?;

    let tour = Tour {
        title: input.title,
        slug: input.slug,
        description: input.description,
        pricing: input.pricing,
        duration: input.duration,
        max_group_size: input.max_group_size,
        availability: input.availability,
        booking_options: input.booking_options,
        add_ons: input.add_ons,
        is_published: input.is_published,
        updated_at: Some(Utc::now()),
        ..existing
    };
    if !state.store.replace_tour(&tour).await? {
        return Err(ApiError::not_found("Tour", &id));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(tour)))
}

pub async fn delete(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.store.delete_tour(tenant.as_str(), &id).await? {
        return Err(ApiError::not_found("Tour", &id));
    }
    log::info!("Deleted tour {} for {}", id, tenant.as_str());

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "id": id }))))
}
