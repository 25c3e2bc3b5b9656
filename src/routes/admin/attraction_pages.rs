use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::models::attraction_page::{AttractionPage, AttractionPageInput, PageStatus};
use crate::routes::admin::{require_text, validate_image_url, validate_slug};
use crate::AppState;

async fn validate(
    state: &AppState,
    tenant: &Tenant,
    page: &AttractionPage,
) -> Result<(), ApiError> {
    require_text("Title", &page.title)?;
    require_text("Hero title", &page.hero.title)?;
    validate_slug(&page.slug)?;
    for url in page.image_urls() {
        validate_image_url(url)?;
    }
    for faq in &page.faqs {
        require_text("FAQ question", &faq.question)?;
    }

    let clash = state
        .store
        .find_attraction_page_by_slug(tenant.as_str(), &page.slug)
        .await?;
    if clash.is_some_and(|other| other.id != page.id) {
        return Err(ApiError::Conflict(format!(
            "Attraction page slug already in use: {}",
            page.slug
        )));
    }
    Ok(())
}

async fn load(state: &AppState, tenant: &Tenant, id: &str) -> Result<AttractionPage, ApiError> {
    state
        .store
        .get_attraction_page(tenant.as_str(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Attraction page", id))
}

pub async fn list(
    state: web::Data<AppState>,
    tenant: Tenant,
) -> Result<HttpResponse, ApiError> {
    let pages = state
        .store
        .list_attraction_pages(tenant.as_str(), false)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(pages)))
}

pub async fn get(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let page = load(&state, &tenant, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

pub async fn create(
    state: web::Data<AppState>,
    tenant: Tenant,
    input: web::Json<AttractionPageInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let now = Utc::now();
    let page = AttractionPage {
        id: ObjectId::new().to_hex(),
        tenant_id: tenant.as_str().to_string(),
        slug: input.slug,
        title: input.title,
        destination_id: input.destination_id,
        hero: input.hero,
        sections: input.sections,
        faqs: input.faqs,
        tour_ids: input.tour_ids,
        seo: input.seo,
        status: input.status,
        created_at: Some(now),
        updated_at: Some(now),
    };
    validate(&state, &tenant, &page).await?;
    state.store.insert_attraction_page(&page).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(page)))
}

pub async fn update(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
    input: web::Json<AttractionPageInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let existing = load(&state, &tenant, &path.into_inner()).await?;

    let page = AttractionPage {
        slug: input.slug,
        title: input.title,
        destination_id: input.destination_id,
        hero: input.hero,
        sections: input.sections,
        faqs: input.faqs,
        tour_ids: input.tour_ids,
        seo: input.seo,
        status: input.status,
        updated_at: Some(Utc::now()),
        ..existing
    };
    validate(&state, &tenant, &page).await?;
    if !state.store.replace_attraction_page(&page).await? {
        return Err(ApiError::not_found("Attraction page", &page.id));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

async fn set_status(
    state: &AppState,
    tenant: &Tenant,
    id: &str,
    status: PageStatus,
) -> Result<AttractionPage, ApiError> {
    let mut page = load(state, tenant, id).await?;
    page.status = status;
    page.updated_at = Some(Utc::now());
    if !state.store.replace_attraction_page(&page).await? {
        return Err(ApiError::not_found("Attraction page", id));
    }
    log::info!("Attraction page {} is now {:?}", page.slug, status);
    Ok(page)
}

pub async fn publish(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let page = set_status(&state, &tenant, &path.into_inner(), PageStatus::Published).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

pub async fn unpublish(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let page = set_status(&state, &tenant, &path.into_inner(), PageStatus::Draft).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

pub async fn delete(
    state: web::Data<AppState>,
    tenant: Tenant,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state
        .store
        .delete_attraction_page(tenant.as_str(), &id)
        .await?
    {
        return Err(ApiError::not_found("Attraction page", &id));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "id": id }))))
}
