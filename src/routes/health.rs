use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;

use crate::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: BTreeMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details.into()),
        }
    }

    fn error(details: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details.into()),
        }
    }

    fn disabled(details: impl Into<String>) -> Self {
        Self {
            status: "disabled".to_string(),
            details: Some(details.into()),
        }
    }
}

pub async fn liveness() -> impl Responder {
    "OK"
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: BTreeMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let store = match state.store.ping().await {
        Ok(()) => ServiceStatus::ok("Store reachable"),
        Err(e) => {
            log::error!("Store health check failed: {}", e);
            ServiceStatus::error(format!("Failed to reach store: {}", e))
        }
    };
    health.services.insert("store".to_string(), store);

    // Optional integrations report "disabled" rather than degrading the service.
    let payments = match (&state.payments, &state.config.stripe_secret_key) {
        (Some(_), Some(key)) => ServiceStatus::ok(format!(
            "Stripe API key configured ({})",
            mask_secret(key)
        )),
        (Some(_), None) => ServiceStatus::ok("Payment gateway configured"),
        (None, _) => ServiceStatus::disabled("STRIPE_SECRET_KEY not configured"),
    };
    health.services.insert("payments".to_string(), payments);

    let storage = match (&state.images, &state.config.upload_bucket) {
        (Some(_), Some(bucket)) => ServiceStatus::ok(format!("Uploading to bucket '{}'", bucket)),
        (Some(_), None) => ServiceStatus::ok("Image storage configured"),
        (None, _) => ServiceStatus::disabled("UPLOAD_BUCKET not configured"),
    };
    health.services.insert("storage".to_string(), storage);

    if health.services.values().any(|s| s.status == "error") {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn mask_secret(key: &str) -> String {
    if key.len() > 8 {
        format!("{}***{}", &key[0..4], &key[key.len() - 4..])
    } else {
        "***".to_string()
    }
}
