use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::booking::CartItem;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Confirmed,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub reference: String,
    pub customer: CustomerDetails,
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    pub currency: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload posted by the checkout page.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: CustomerDetails,
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub discount_code: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfirmation {
    pub order_id: String,
    pub reference: String,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub currency: String,
    pub client_secret: Option<String>,
}
