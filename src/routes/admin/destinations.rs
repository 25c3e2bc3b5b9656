use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::destination::{Destination, DestinationInput};
use crate::routes::admin::{require_text, validate_image_url, validate_slug};
use crate::services::destination_sync;
use crate::AppState;

async fn validate(
    state: &AppState,
    tenant: &Tenant,
    input: &DestinationInput,
    current_id: Option<&str>,
) -> Result<(), ApiError> {
    require_text("Name", &input.name)?;
    validate_slug(&input.slug)?;
    if let Some(image) = &input.hero_image {
        validate_image_url(image)?;
    }

    let clash = state
        .store
        .find_destination_by_slug(tenant.as_str(), &input.slug)
        .await?;
    if clash.is_some_and(|other| Some(other.id.as_str()) != current_id) {
        return Err(ApiError::Conflict(format!(
            "Destination slug already in use: {}",
            input.slug
        )));
    }
    Ok(())
}

fn dedup(mut ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| !id.trim().is_empty() && seen.insert(id.clone()));
    ids
}

pub async fn list(
    state: web::Data<AppState>,
    tenant: Tenant,
) -> Result<HttpResponse, ApiError> {
    let destinations = state.store.list_destinations(tenant.as_str()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(destinations)))
}

pub async fn get(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let destination = state
        .store
        .get_destination(tenant.as_str(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Destination", &id))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(destination)))
}

pub async fn create(
    state: web::Data<AppState>,
    tenant: Tenant,
    input: web::Json<DestinationInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    validate(&state, &tenant, &input, None).await?;

    let now = Utc::now();
    let destination = Destination {
        id: ObjectId::new().to_hex(),
        tenant_id: tenant.as_str().to_string(),
        name: input.name,
        slug: input.slug,
        country: input.country,
        description: input.description,
        hero_image: input.hero_image,
        tour_ids: dedup(input.tour_ids),
        is_featured: input.is_featured,
        created_at: Some(now),
        updated_at: Some(now),
    };
    state.store.insert_destination(&destination).await?;

    destination_sync::spawn_tour_sync(
        state.store.clone(),
        tenant.0,
        destination.clone(),
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok(destination)))
}

pub async fn update(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
    input: web::Json<DestinationInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let input = input.into_inner();
    validate(&state, &tenant, &input, Some(&id)).await?;

    let existing = state
        .store
        .get_destination(tenant.as_str(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Destination", &id))?;

    let destination = Destination {
        name: input.name,
        slug: input.slug,
        country: input.country,
        description: input.description,
        hero_image: input.hero_image,
        tour_ids: dedup(input.tour_ids),
        is_featured: input.is_featured,
        updated_at: Some(Utc::now()),
        ..existing
    };
    if !state.store.replace_destination(&destination).await? {
        return Err(ApiError::not_found("Destination", &id));
    }

    destination_sync::spawn_tour_sync(
        state.store.clone(),
        tenant.0,
        destination.clone(),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::ok(destination)))
}

pub async fn delete(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.store.delete_destination(tenant.as_str(), &id).await? {
        return Err(ApiError::not_found("Destination", &id));
    }

    destination_sync::spawn_detach(state.store.clone(), tenant.0, id.clone());

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "id": id }))))
}
