use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuestCounts {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

impl Default for GuestCounts {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuestError {
    #[error("At least one adult is required")]
    NoAdult,

    #[error("Group of {total} exceeds the maximum group size of {max}")]
    GroupTooLarge { total: u32, max: u32 },
}

impl GuestCounts {
    /// Infants count toward the group size. Saturates so an oversized
    /// request still fails the group-size check.
    pub fn total(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }

    pub fn validate(&self, max_group_size: u32) -> Result<(), GuestError> {
        if self.adults == 0 {
            return Err(GuestError::NoAdult);
        }
        let total = self.total();
        if total > max_group_size {
            return Err(GuestError::GroupTooLarge {
                total,
                max: max_group_size,
            });
        }
        Ok(())
    }
}

/// Selection being built while the booking sidebar is open.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    pub tour_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub option_id: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub guests: GuestCounts,
    /// Add-on id to quantity. A zero quantity means not selected.
    #[serde(default)]
    pub add_ons: BTreeMap<String, u32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl BookingData {
    pub fn new(tour_id: impl Into<String>) -> Self {
        Self {
            tour_id: tour_id.into(),
            ..Default::default()
        }
    }

    pub fn selected_add_ons(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.add_ons.iter().filter(|(_, quantity)| **quantity > 0)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddOnLine {
    pub add_on_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub total: f64,
    pub savings: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub unit_price: f64,
    pub adult_total: f64,
    pub child_total: f64,
    pub infant_total: f64,
    pub subtotal: f64,
    pub add_ons: Vec<AddOnLine>,
    pub add_on_total: f64,
    pub savings: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub unique_id: String,
    pub tour_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_title: Option<String>,
    pub currency: String,
    pub selection: BookingData,
    pub price: PriceBreakdown,
}
