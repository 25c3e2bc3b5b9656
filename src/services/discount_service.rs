use chrono::{DateTime, Utc};

use crate::db::store::{Store, StoreError};
use crate::models::discount::{Discount, DiscountKind, DiscountQuote};
use crate::services::pricing_service::PricingService;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DiscountError {
    #[error("Discount code not found: {0}")]
    UnknownCode(String),

    #[error("Discount code is no longer active")]
    Inactive,

    #[error("Discount code is not valid yet")]
    NotYetValid,

    #[error("Discount code has expired")]
    Expired,

    #[error("Discount code has reached its usage limit")]
    UsageLimitReached,

    #[error("Order subtotal must be at least {0:.2} to use this code")]
    BelowMinimum(f64),

    #[error("Discount code does not apply to the selected tours")]
    NotApplicable,
}

/// Check a discount against an order and work out how much it takes off.
pub fn evaluate(
    discount: &Discount,
    subtotal: f64,
    tour_ids: &[String],
    now: DateTime<Utc>,
) -> Result<DiscountQuote, DiscountError> {
    if !discount.active {
        return Err(DiscountError::Inactive);
    }
    if discount.valid_from.is_some_and(|from| now < from) {
        return Err(DiscountError::NotYetValid);
    }
    if discount.valid_until.is_some_and(|until| now > until) {
        return Err(DiscountError::Expired);
    }
    if discount
        .max_uses
        .is_some_and(|max_uses| discount.used_count >= max_uses)
    {
        return Err(DiscountError::UsageLimitReached);
    }
    if let Some(minimum) = discount.min_subtotal {
        if subtotal < minimum {
            return Err(DiscountError::BelowMinimum(minimum));
        }
    }
    if !discount.tour_ids.is_empty()
        && !tour_ids.iter().any(|id| discount.tour_ids.contains(id))
    {
        return Err(DiscountError::NotApplicable);
    }

    let subtotal = subtotal.max(0.0);
    let raw = match discount.kind {
        DiscountKind::Percentage => subtotal * discount.value.clamp(0.0, 100.0) / 100.0,
        DiscountKind::Fixed => discount.value.max(0.0),
    };
    let discount_amount = PricingService::round_money(raw.min(subtotal));

    Ok(DiscountQuote {
        code: discount.code.clone(),
        kind: discount.kind,
        value: discount.value,
        discount_amount,
        new_total: PricingService::round_money(subtotal - discount_amount),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Look the code up for the tenant, then evaluate it.
pub async fn verify(
    store: &dyn Store,
    tenant: &str,
    code: &str,
    subtotal: f64,
    tour_ids: &[String],
    now: DateTime<Utc>,
) -> Result<(Discount, DiscountQuote), VerifyError> {
    let discount = store
        .find_discount_by_code(tenant, code)
        .await?
        .ok_or_else(|| DiscountError::UnknownCode(code.trim().to_string()))?;
    let quote = evaluate(&discount, subtotal, tour_ids, now)?;
    Ok((discount, quote))
}
