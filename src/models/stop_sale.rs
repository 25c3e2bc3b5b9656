use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Admin block preventing sale of a tour, or one of its options, on a date span.
#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StopSale {
    #[serde(rename = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub tour_id: String,
    #[serde(default)]
    pub option_id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl StopSale {
    /// A stop-sale without an option blocks every option of the tour.
    pub fn covers(&self, date: NaiveDate, option_id: Option<&str>) -> bool {
        let last = self.end_date.unwrap_or(self.date);
        if date < self.date || date > last {
            return false;
        }
        match (&self.option_id, option_id) {
            (None, _) => true,
            (Some(blocked), Some(selected)) => blocked == selected,
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StopSaleInput {
    pub tour_id: String,
    #[serde(default)]
    pub option_id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    #[test]
    fn covers_span_and_option() {
        let stop = StopSale {
            id: "s1".into(),
            tenant_id: "default".into(),
            tour_id: "t1".into(),
            option_id: Some("sunset".into()),
            date: day(3),
            end_date: Some(day(5)),
            reason: None,
            created_at: None,
        };
        assert!(stop.covers(day(4), Some("sunset")));
        assert!(!stop.covers(day(4), Some("morning")));
        assert!(!stop.covers(day(4), None));
        assert!(!stop.covers(day(6), Some("sunset")));
    }

    #[test]
    fn tour_wide_stop_sale_covers_single_day() {
        let stop = StopSale {
            id: "s2".into(),
            tenant_id: "default".into(),
            tour_id: "t1".into(),
            option_id: None,
            date: day(10),
            end_date: None,
            reason: Some("Festival".into()),
            created_at: None,
        };
        assert!(stop.covers(day(10), Some("anything")));
        assert!(stop.covers(day(10), None));
        assert!(!stop.covers(day(11), None));
    }
}
