use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::db::store::StoreError;
use crate::models::api::ApiResponse;
use crate::services::availability_service::AvailabilityError;
use crate::services::booking_flow::FlowError;
use crate::services::cart_service::CartError;
use crate::services::checkout_service::CheckoutError;
use crate::services::discount_service::{DiscountError, VerifyError};
use crate::services::image_service::ImageUploadError;
use crate::services::payment::interface::PaymentError;
use crate::services::pricing_service::PricingError;

/// Error returned by every handler. Renders the `{ success: false, error }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Upload(#[from] ImageUploadError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn not_found(what: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} not found: {}", what, id))
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Flow(err) => ApiError::Flow(err),
            CartError::Pricing(err) => ApiError::Pricing(err),
        }
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Discount(err) => ApiError::Discount(err),
            VerifyError::Store(err) => ApiError::Store(err),
        }
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::TourNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::Unavailable { .. } => StatusCode::CONFLICT,
        CheckoutError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
        CheckoutError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CheckoutError::Payment(PaymentError::Declined(_)) => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::Payment(_) => StatusCode::BAD_GATEWAY,
        CheckoutError::InvalidCustomer(_)
        | CheckoutError::EmptyCart
        | CheckoutError::MixedCurrencies(..)
        | CheckoutError::Cart(_)
        | CheckoutError::Availability(_)
        | CheckoutError::Discount(_) => StatusCode::BAD_REQUEST,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Pricing(_)
            | ApiError::Flow(_)
            | ApiError::Availability(_)
            | ApiError::Discount(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PayloadTooLarge(_) | ApiError::Upload(ImageUploadError::TooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Upload(ImageUploadError::Storage(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::Payment(PaymentError::Declined(_)) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Payment(_) => StatusCode::BAD_GATEWAY,
            ApiError::Checkout(err) => checkout_status(err),
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        HttpResponse::build(status).json(ApiResponse::<()>::failure(self.to_string()))
    }
}
