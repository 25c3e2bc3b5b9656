use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::db::store::{Store, StoreError};
use crate::models::order::{
    CheckoutConfirmation, CheckoutRequest, CustomerDetails, Order, OrderStatus,
};
use crate::services::availability_service::{self, AvailabilityCheckRequest, AvailabilityError};
use crate::services::booking_flow::FlowError;
use crate::services::cart_service::{self, Cart, CartError};
use crate::services::discount_service::{self, DiscountError, VerifyError};
use crate::services::payment::interface::{PaymentError, PaymentGateway, PaymentIntentRequest};
use crate::services::pricing_service::PricingService;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
});

const REFERENCE_PREFIX: &str = "TB-";
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const REFERENCE_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Invalid customer details: {0}")]
    InvalidCustomer(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Tour not found: {0}")]
    TourNotFound(String),

    #[error("{tour} is not available on {date}: {reason}")]
    Unavailable {
        tour: String,
        date: String,
        reason: String,
    },

    #[error("Cart mixes currencies {0} and {1}")]
    MixedCurrencies(String, String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl From<VerifyError> for CheckoutError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Discount(err) => CheckoutError::Discount(err),
            VerifyError::Store(err) => CheckoutError::Store(err),
        }
    }
}

pub fn validate_customer(customer: &CustomerDetails) -> Result<(), CheckoutError> {
    if customer.first_name.trim().is_empty() {
        return Err(CheckoutError::InvalidCustomer(
            "first name is required".to_string(),
        ));
    }
    if customer.last_name.trim().is_empty() {
        return Err(CheckoutError::InvalidCustomer(
            "last name is required".to_string(),
        ));
    }
    if !EMAIL.is_match(customer.email.trim()) {
        return Err(CheckoutError::InvalidCustomer(format!(
            "invalid email address: {}",
            customer.email
        )));
    }
    Ok(())
}

pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..REFERENCE_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", REFERENCE_PREFIX, code)
}

pub struct CheckoutService<'a> {
    store: &'a dyn Store,
    payments: Option<&'a dyn PaymentGateway>,
    default_currency: &'a str,
    window_days: i64,
}

impl<'a> CheckoutService<'a> {
    pub fn new(
        store: &'a dyn Store,
        payments: Option<&'a dyn PaymentGateway>,
        default_currency: &'a str,
        window_days: i64,
    ) -> Self {
        Self {
            store,
            payments,
            default_currency,
            window_days,
        }
    }

    /// Rebuild every line from the stored catalogue. Client-sent prices are ignored.
    async fn reprice(
        &self,
        tenant: &str,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<Cart, CheckoutError> {
        let today = now.date_naive();
        let mut cart = Cart::new();

        for item in &request.items {
            let tour_id = &item.selection.tour_id;
            let tour = self
                .store
                .get_tour(tenant, tour_id)
                .await?
                .filter(|tour| tour.is_published)
                .ok_or_else(|| CheckoutError::TourNotFound(tour_id.clone()))?;

            let fresh = cart_service::build_item(&tour, &item.selection)?;
            let date = fresh
                .selection
                .date
                .ok_or(CartError::Flow(FlowError::DateRequired))?;

            let stop_sales = self.store.list_stop_sales(tenant, Some(tour_id)).await?;
            let result = availability_service::check(
                &tour,
                &AvailabilityCheckRequest {
                    date,
                    option_id: fresh.selection.option_id.clone(),
                    time_slot: fresh.selection.time_slot.clone(),
                    guests: fresh.selection.guests,
                },
                &stop_sales,
                today,
                self.window_days,
            )?;
            if let Some(reason) = result.reason.filter(|_| !result.available) {
                return Err(CheckoutError::Unavailable {
                    tour: tour.title.clone(),
                    date: date.to_string(),
                    reason: reason.to_string(),
                });
            }

            if fresh.price.total != item.price.total {
                log::warn!(
                    "Repriced {} from {:.2} to {:.2}",
                    fresh.unique_id,
                    item.price.total,
                    fresh.price.total
                );
            }
            cart.add(fresh);
        }

        Ok(cart)
    }

    fn currency(&self, cart: &Cart) -> Result<String, CheckoutError> {
        let mut currency: Option<&str> = None;
        for item in cart.items() {
            match currency {
                Some(existing) if !existing.eq_ignore_ascii_case(&item.currency) => {
                    return Err(CheckoutError::MixedCurrencies(
                        existing.to_string(),
                        item.currency.clone(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(&item.currency),
            }
        }
        Ok(currency
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_currency)
            .to_uppercase())
    }

    /// Creates the payment intent when one is due, then stores the order.
    async fn charge_and_store(
        &self,
        tenant: &str,
        order: &mut Order,
    ) -> Result<Option<String>, CheckoutError> {
        let mut client_secret = None;
        if let Some(gateway) = self.payments {
            if order.total > 0.0 {
                let mut metadata = HashMap::new();
                metadata.insert("order_id".to_string(), order.id.clone());
                metadata.insert("reference".to_string(), order.reference.clone());
                metadata.insert("tenant".to_string(), tenant.to_string());

                let intent = gateway
                    .create_payment_intent(PaymentIntentRequest {
                        amount: PricingService::to_minor_units(order.total),
                        currency: order.currency.clone(),
                        receipt_email: Some(order.customer.email.trim().to_string()),
                        description: format!("Booking {}", order.reference),
                        metadata,
                    })
                    .await?;
                order.payment_intent_id = Some(intent.id);
                order.status = OrderStatus::PendingPayment;
                client_secret = intent.client_secret;
            }
        }

        self.store.insert_order(order).await?;
        Ok(client_secret)
    }

    /// Nothing is stored if any step fails.
    pub async fn submit(
        &self,
        tenant: &str,
        request: CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckoutConfirmation, CheckoutError> {
        validate_customer(&request.customer)?;
        if request.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let cart = self.reprice(tenant, &request, now).await?;
        let currency = self.currency(&cart)?;
        let subtotal = cart.subtotal();

        let code = request
            .discount_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        let applied = match code {
            Some(code) => Some(
                discount_service::verify(
                    self.store,
                    tenant,
                    code,
                    subtotal,
                    &cart.tour_ids(),
                    now,
                )
                .await?,
            ),
            None => None,
        };
        let discount = applied
            .as_ref()
            .map(|(_, quote)| quote.discount_amount)
            .unwrap_or(0.0);
        let total = PricingService::round_money(subtotal - discount);

        // Claimed before charging, released again if a later step fails.
        if let Some((used, _)) = &applied {
            if !self.store.record_discount_use(tenant, &used.id).await? {
                return Err(DiscountError::UsageLimitReached.into());
            }
        }

        let mut order = Order {
            id: ObjectId::new().to_hex(),
            tenant_id: tenant.to_string(),
            reference: generate_reference(),
            customer: request.customer,
            items: cart.items().to_vec(),
            subtotal,
            discount_code: applied.as_ref().map(|(d, _)| d.code.clone()),
            discount,
            total,
            currency,
            status: OrderStatus::Confirmed,
            payment_intent_id: None,
            created_at: now,
        };

        let client_secret = match self.charge_and_store(tenant, &mut order).await {
            Ok(client_secret) => client_secret,
            Err(e) => {
                if let Some((used, _)) = &applied {
                    if let Err(release) = self.store.release_discount_use(tenant, &used.id).await {
                        log::error!("Failed to release discount {}: {}", used.code, release);
                    }
                }
                return Err(e);
            }
        };

        let Order {
            id: order_id,
            reference,
            status,
            currency,
            ..
        } = order;

        log::info!(
            "Order {} ({}) placed for {:.2} {}",
            reference,
            order_id,
            total,
            currency
        );

        Ok(CheckoutConfirmation {
            order_id,
            reference,
            status,
            subtotal,
            discount,
            total,
            currency,
            client_secret,
        })
    }
}
