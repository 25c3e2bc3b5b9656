use std::future::{ready, Ready};
use std::sync::LazyLock;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use regex::Regex;

use crate::error::ApiError;
use crate::AppState;

pub const TENANT_HEADER: &str = "X-Tenant-Id";

static TENANT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,62}$").expect("valid tenant pattern"));

/// Tenant the request operates on, from `X-Tenant-Id` or the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(pub String);

impl Tenant {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn resolve(req: &HttpRequest) -> Result<Tenant, ApiError> {
    let header = req
        .headers()
        .get(TENANT_HEADER)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::BadRequest("Tenant header is not valid text".to_string()))
        })
        .transpose()?
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let tenant = match header {
        Some(value) => value.to_string(),
        None => req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.config.default_tenant.clone())
            .ok_or_else(|| ApiError::Unavailable("Application state missing".to_string()))?,
    };

    if !TENANT_ID.is_match(&tenant) {
        return Err(ApiError::BadRequest(format!("Invalid tenant id: {}", tenant)));
    }
    Ok(Tenant(tenant))
}

impl FromRequest for Tenant {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
