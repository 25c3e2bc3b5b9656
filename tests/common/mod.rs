#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use tourbook_api::config::AppConfig;
use bson::oid::ObjectId;
use tourbook_api::db::memory::MemoryStore;
use tourbook_api::db::store::Store;
use tourbook_api::models::tour::{Tour, TourInput};
use tourbook_api::routes;
use tourbook_api::services::image_service::{ImageService, ImageStorage, ImageUploadError};
use tourbook_api::services::payment::interface::{
    PaymentError, PaymentGateway, PaymentIntentHandle, PaymentIntentRequest,
};
use tourbook_api::AppState;

#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<PaymentIntentRequest>>,
    pub decline: bool,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentHandle, PaymentError> {
        if self.decline {
            return Err(PaymentError::Declined("card declined".to_string()));
        }
        let id = format!("pi_test_{}", self.requests.lock().await.len() + 1);
        self.requests.lock().await.push(request);
        Ok(PaymentIntentHandle {
            client_secret: Some(format!("{}_secret", id)),
            id,
        })
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<Vec<(String, Vec<u8>, String)>>,
}

#[async_trait]
impl ImageStorage for FakeStorage {
    async fn put(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ImageUploadError> {
        self.objects.lock().await.push((
            object_name.to_string(),
            bytes,
            content_type.to_string(),
        ));
        Ok(format!("https://storage.test/tourbook/{}", object_name))
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<FakeGateway>,
    pub storage: Arc<FakeStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(FakeGateway::default())
    }

    pub fn with_gateway(gateway: FakeGateway) -> Self {
        Self::build(gateway, 1024)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        Self::build(FakeGateway::default(), max_upload_bytes)
    }

    fn build(gateway: FakeGateway, max_upload_bytes: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(gateway);
        let storage = Arc::new(FakeStorage::default());
        let config = AppConfig {
            max_upload_bytes,
            ..AppConfig::default()
        };
        let images = ImageService::new(storage.clone(), config.max_upload_bytes);
        let state = web::Data::new(AppState::new(
            store.clone(),
            Some(gateway.clone()),
            Some(images),
            config,
        ));

        Self {
            state,
            store,
            gateway,
            storage,
        }
    }

    /// No payment gateway and no image storage.
    pub fn bare() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = web::Data::new(AppState::new(
            store.clone(),
            None,
            None,
            AppConfig::default(),
        ));

        Self {
            state,
            store,
            gateway: Arc::new(FakeGateway::default()),
            storage: Arc::new(FakeStorage::default()),
        }
    }

    pub async fn seed_tour(&self, tenant: &str, slug: &str) -> Tour {
        let input: TourInput =
            serde_json::from_value(tour_payload(slug)).expect("valid tour payload");
        let tour = Tour {
            id: ObjectId::new().to_hex(),
            tenant_id: tenant.to_string(),
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
            created_at: None,
            updated_at: None,
        };
        self.store.insert_tour(&tour).await.expect("insert tour");
        tour
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure)
    }
}

pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

/// Published tour, every day offered, two slots, one option and two add-ons.
pub fn tour_payload(slug: &str) -> Value {
    json!({
        "title": "Cliffs of Moher Day Trip",
        "slug": slug,
        "description": "Coach tour along the Atlantic coast.",
        "pricing": { "basePrice": 50.0, "currency": "EUR" },
        "duration": "10 hours",
        "maxGroupSize": 6,
        "availability": {
            "type": "date_range",
            "slots": [
                { "time": "08:00", "available": 6, "isPopular": true },
                { "time": "13:00", "available": 0 }
            ]
        },
        "bookingOptions": [
            {
                "id": "premium",
                "title": "Premium with lunch",
                "price": 80.0,
                "originalPrice": 95.0,
                "timeSlots": [{ "time": "09:00", "available": 4 }]
            }
        ],
        "addOns": [
            { "id": "photos", "name": "Photo pack", "price": 15.0, "pricingType": "per_group" },
            { "id": "lunch", "name": "Packed lunch", "price": 10.0, "pricingType": "per_guest" }
        ],
        "isPublished": true
    })
}

pub fn customer() -> Value {
    json!({
        "firstName": "Siobhan",
        "lastName": "Kelly",
        "email": "siobhan@example.com",
        "country": "IE"
    })
}
