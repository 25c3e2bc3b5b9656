use async_trait::async_trait;
use std::str::FromStr;
use stripe::{CreatePaymentIntent, Currency, ErrorType, StripeError};

use crate::services::payment::interface::{
    PaymentError, PaymentGateway, PaymentIntentHandle, PaymentIntentRequest,
};

pub struct StripeProvider {
    pub client: stripe::Client,
}

impl StripeProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: stripe::Client::new(api_key.into()),
        }
    }
}

impl From<StripeError> for PaymentError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Stripe(request_error) if request_error.error_type == ErrorType::Card => {
                PaymentError::Declined(
                    request_error
                        .message
                        .unwrap_or_else(|| "card declined".to_string()),
                )
            }
            other => PaymentError::Provider(other.to_string()),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeProvider {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentHandle, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "amount must be positive, got {}",
                request.amount
            )));
        }
        let currency = Currency::from_str(&request.currency.to_lowercase()).map_err(|_| {
            PaymentError::InvalidRequest(format!("unsupported currency {}", request.currency))
        })?;

        let mut create_intent = CreatePaymentIntent::new(request.amount, currency);
        create_intent.description = Some(request.description.as_str());
        create_intent.receipt_email = request.receipt_email.as_deref();
        create_intent.metadata = Some(request.metadata.clone());

        log::info!(
            "Creating payment intent for {} {}",
            request.amount,
            request.currency
        );
        let intent = stripe::PaymentIntent::create(&self.client, create_intent).await?;

        Ok(PaymentIntentHandle {
            id: intent.id.to_string(),
            client_secret: intent.client_secret,
        })
    }
}
