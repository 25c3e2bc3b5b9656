use serde::{Deserialize, Serialize};

use crate::models::booking::{BookingData, CartItem};
use crate::models::tour::Tour;
use crate::services::booking_flow::{BookingFlow, FlowError};
use crate::services::pricing_service::{PricingError, PricingService};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// `tourId|date|time|addOn:qty,...` with add-ons in id order.
pub fn unique_id(selection: &BookingData) -> String {
    let date = selection
        .date
        .map(|date| date.to_string())
        .unwrap_or_default();
    let add_ons = selection
        .selected_add_ons()
        .map(|(id, quantity)| format!("{}:{}", id, quantity))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{}|{}|{}|{}",
        selection.tour_id,
        date,
        selection.time_slot.as_deref().unwrap_or_default(),
        add_ons
    )
}

/// Turn a finalized selection into a priced cart line.
pub fn build_item(tour: &Tour, selection: &BookingData) -> Result<CartItem, CartError> {
    let flow = BookingFlow::replay(tour, selection)?;
    let selection = flow.into_data();
    let price = PricingService::quote(tour, &selection)?;
    let option_title = selection
        .option_id
        .as_deref()
        .and_then(|id| tour.option(id))
        .map(|option| option.title.clone());

    Ok(CartItem {
        unique_id: unique_id(&selection),
        tour_title: tour.title.clone(),
        option_title,
        currency: tour.pricing.currency.clone(),
        selection,
        price,
    })
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Re-adding the same selection replaces the earlier line.
    pub fn add(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.unique_id == item.unique_id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, unique_id: &str) -> Option<CartItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.unique_id == unique_id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn subtotal(&self) -> f64 {
        PricingService::round_money(self.items.iter().map(|item| item.price.total).sum())
    }

    pub fn tour_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .items
            .iter()
            .map(|item| item.selection.tour_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
