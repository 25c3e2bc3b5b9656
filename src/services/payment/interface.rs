use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone)]
pub struct PaymentIntentRequest {
    /// Smallest currency unit (cents).
    pub amount: i64,
    pub currency: String,
    pub receipt_email: Option<String>,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PaymentIntentHandle {
    pub id: String,
    /// Handed to the browser's payment element to confirm the card.
    pub client_secret: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentHandle, PaymentError>;
}
