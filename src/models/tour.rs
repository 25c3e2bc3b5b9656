use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityKind {
    SpecificDates,
    DateRange,
}

impl Default for AvailabilityKind {
    fn default() -> Self {
        AvailabilityKind::DateRange
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: String,
    #[serde(deserialize_with = "deserialize_rounded_u32", default)]
    pub available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_popular: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRules {
    #[serde(rename = "type", default)]
    pub kind: AvailabilityKind,
    /// Weekday numbers, 0 = Sunday. Empty means every day.
    #[serde(default)]
    pub available_days: Vec<u8>,
    #[serde(default)]
    pub blocked_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub specific_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TourPricing {
    pub base_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl TourPricing {
    /// Adult price actually charged: the discount price when one is set.
    pub fn effective_price(&self) -> f64 {
        match self.discount_price {
            Some(price) if price > 0.0 => price,
            _ => self.base_price,
        }
    }

    /// Reference price shown struck through, if higher than what is charged.
    pub fn reference_price(&self) -> Option<f64> {
        let charged = self.effective_price();
        self.original_price
            .or(Some(self.base_price))
            .filter(|price| *price > charged)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingOption {
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AddOnPricing {
    PerGroup,
    PerGuest,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub pricing_type: AddOnPricing,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRef {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub pricing: TourPricing,
    #[serde(default)]
    pub duration: String,
    #[serde(deserialize_with = "deserialize_rounded_u32")]
    pub max_group_size: u32,
    #[serde(default)]
    pub availability: AvailabilityRules,
    #[serde(default)]
    pub booking_options: Vec<BookingOption>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<DestinationRef>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tour {
    pub fn option(&self, option_id: &str) -> Option<&BookingOption> {
        self.booking_options.iter().find(|option| option.id == option_id)
    }

    pub fn add_on(&self, add_on_id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|add_on| add_on.id == add_on_id)
    }

    /// Slots offered for a date: the option's own slots when it defines any.
    pub fn slots_for<'a>(&'a self, option: Option<&'a BookingOption>) -> &'a [TimeSlot] {
        match option {
            Some(option) if !option.time_slots.is_empty() => &option.time_slots,
            _ => &self.availability.slots,
        }
    }
}

/// Admin payload for creating or replacing a tour.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TourInput {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub pricing: TourPricing,
    #[serde(default)]
    pub duration: String,
    #[serde(deserialize_with = "deserialize_rounded_u32")]
    pub max_group_size: u32,
    #[serde(default)]
    pub availability: AvailabilityRules,
    #[serde(default)]
    pub booking_options: Vec<BookingOption>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    #[serde(default)]
    pub is_published: bool,
}

// Admin forms post numeric inputs as floats; round up like the capacity fields.
fn deserialize_rounded_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                Ok(i.min(u32::MAX as u64) as u32)
            } else if let Some(f) = n.as_f64() {
                Ok(f.max(0.0).ceil() as u32)
            } else {
                Ok(0)
            }
        }
        _ => Ok(0),
    }
}
