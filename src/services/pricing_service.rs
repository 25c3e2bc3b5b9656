use crate::models::booking::{AddOnLine, BookingData, GuestCounts, PriceBreakdown};
use crate::models::tour::{AddOn, AddOnPricing, Tour};

/// Children pay half the adult unit price. Infants travel free.
pub const CHILD_PRICE_RATIO: f64 = 0.5;
pub const INFANT_PRICE_RATIO: f64 = 0.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unknown booking option: {0}")]
    UnknownOption(String),

    #[error("Unknown time slot: {0}")]
    UnknownTimeSlot(String),

    #[error("Unknown add-on: {0}")]
    UnknownAddOn(String),
}

pub struct PricingService;

impl PricingService {
    /// Round to whole cents.
    pub fn round_money(amount: f64) -> f64 {
        (amount * 100.0).round() / 100.0
    }

    /// Amount in the smallest currency unit, as payment providers expect.
    pub fn to_minor_units(amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }

    /// Per-group add-ons are bought once; per-guest add-ons once per traveller.
    pub fn add_on_quantity(add_on: &AddOn, guests: &GuestCounts) -> u32 {
        match add_on.pricing_type {
            AddOnPricing::PerGroup => 1,
            AddOnPricing::PerGuest => guests.total(),
        }
    }

    pub fn add_on_line(add_on: &AddOn, guests: &GuestCounts) -> AddOnLine {
        let quantity = Self::add_on_quantity(add_on, guests);
        let total = add_on.price * quantity as f64;
        let savings = add_on
            .original_price
            .filter(|original| *original > add_on.price)
            .map(|original| (original - add_on.price) * quantity as f64)
            .unwrap_or(0.0);

        AddOnLine {
            add_on_id: add_on.id.clone(),
            name: add_on.name.clone(),
            unit_price: Self::round_money(add_on.price),
            quantity,
            total: Self::round_money(total),
            savings: Self::round_money(savings),
        }
    }

    /// Totals for a selection. Pure: no lookups, no side effects.
    pub fn compute_totals(
        unit_price: f64,
        original_unit_price: Option<f64>,
        guests: &GuestCounts,
        add_ons: &[&AddOn],
    ) -> PriceBreakdown {
        let adult_total = unit_price * guests.adults as f64;
        let child_total = unit_price * CHILD_PRICE_RATIO * guests.children as f64;
        let infant_total = unit_price * INFANT_PRICE_RATIO * guests.infants as f64;
        let subtotal = adult_total + child_total + infant_total;

        let lines: Vec<AddOnLine> = add_ons
            .iter()
            .map(|add_on| Self::add_on_line(add_on, guests))
            .collect();
        let add_on_total: f64 = lines.iter().map(|line| line.total).sum();

        let paying_units = guests.adults as f64 + CHILD_PRICE_RATIO * guests.children as f64;
        let tour_savings = original_unit_price
            .filter(|original| *original > unit_price)
            .map(|original| (original - unit_price) * paying_units)
            .unwrap_or(0.0);
        let savings = tour_savings + lines.iter().map(|line| line.savings).sum::<f64>();

        PriceBreakdown {
            unit_price: Self::round_money(unit_price),
            adult_total: Self::round_money(adult_total),
            child_total: Self::round_money(child_total),
            infant_total: Self::round_money(infant_total),
            subtotal: Self::round_money(subtotal),
            add_ons: lines,
            add_on_total: Self::round_money(add_on_total),
            savings: Self::round_money(savings),
            discount: 0.0,
            total: Self::round_money(subtotal + add_on_total),
        }
    }

    /// Resolve option, slot and add-ons from the tour, then price the selection.
    pub fn quote(tour: &Tour, selection: &BookingData) -> Result<PriceBreakdown, PricingError> {
        let option = match selection.option_id.as_deref() {
            Some(option_id) => Some(
                tour.option(option_id)
                    .ok_or_else(|| PricingError::UnknownOption(option_id.to_string()))?,
            ),
            None => None,
        };

        let slot = match selection.time_slot.as_deref() {
            Some(time) => Some(
                tour.slots_for(option)
                    .iter()
                    .find(|slot| slot.time == time)
                    .ok_or_else(|| PricingError::UnknownTimeSlot(time.to_string()))?,
            ),
            None => None,
        };

        let (unit_price, original_unit_price) = match (slot.and_then(|s| s.price), option) {
            (Some(price), _) if price > 0.0 => (price, option.and_then(|o| o.original_price)),
            (_, Some(option)) => (option.price, option.original_price),
            _ => (tour.pricing.effective_price(), tour.pricing.reference_price()),
        };

        let add_ons = selection
            .selected_add_ons()
            .map(|(id, _)| {
                tour.add_on(id)
                    .ok_or_else(|| PricingError::UnknownAddOn(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::compute_totals(
            unit_price,
            original_unit_price,
            &selection.guests,
            &add_ons,
        ))
    }

    /// Apply an already-verified discount amount, never taking the total below zero.
    pub fn apply_discount(mut breakdown: PriceBreakdown, amount: f64) -> PriceBreakdown {
        let gross = breakdown.subtotal + breakdown.add_on_total;
        let discount = Self::round_money(amount.clamp(0.0, gross));
        breakdown.discount = discount;
        breakdown.total = Self::round_money(gross - discount);
        breakdown
    }
}
