use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::booking::{GuestCounts, GuestError};
use crate::models::stop_sale::StopSale;
use crate::models::tour::{AvailabilityKind, AvailabilityRules, BookingOption, TimeSlot, Tour};

/// Rolling window the booking calendar shows: six months.
pub const AVAILABILITY_WINDOW_DAYS: i64 = 180;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error(transparent)]
    Guests(#[from] GuestError),

    #[error("Unknown booking option: {0}")]
    UnknownOption(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    Full,
    Unavailable,
}

/// Only `High` exists until bookings are counted per day.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityLevel {
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<AvailabilityLevel>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCalendar {
    pub tour_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheckRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub option_id: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub guests: GuestCounts,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    OutsideWindow,
    NotOffered,
    StopSale,
    SoldOut,
    InsufficientCapacity,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::OutsideWindow => "outside the booking window",
            UnavailableReason::NotOffered => "not offered",
            UnavailableReason::StopSale => "sales stopped",
            UnavailableReason::SoldOut => "sold out",
            UnavailableReason::InsufficientCapacity => "not enough places left",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheckResult {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
    pub slots: Vec<TimeSlot>,
}

impl AvailabilityCheckResult {
    fn blocked(reason: UnavailableReason, slots: Vec<TimeSlot>) -> Self {
        Self {
            available: false,
            reason: Some(reason),
            slots,
        }
    }
}

/// Whether the tour's rules offer the date at all, ignoring capacity and stop-sales.
pub fn is_date_offered(rules: &AvailabilityRules, date: NaiveDate) -> bool {
    if rules.blocked_dates.contains(&date) {
        return false;
    }

    match rules.kind {
        AvailabilityKind::DateRange => {
            if rules.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if rules.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }
        AvailabilityKind::SpecificDates => {
            if !rules.specific_dates.contains(&date) {
                return false;
            }
        }
    }

    let weekday = date.weekday().num_days_from_sunday() as u8;
    rules.available_days.is_empty() || rules.available_days.contains(&weekday)
}

fn is_sold_out(slots: &[TimeSlot]) -> bool {
    !slots.is_empty() && slots.iter().all(|slot| slot.available == 0)
}

fn resolve_option<'a>(
    tour: &'a Tour,
    option_id: Option<&str>,
) -> Result<Option<&'a BookingOption>, AvailabilityError> {
    match option_id {
        Some(id) => tour
            .option(id)
            .map(Some)
            .ok_or_else(|| AvailabilityError::UnknownOption(id.to_string())),
        None => Ok(None),
    }
}

pub fn classify_day(
    tour: &Tour,
    option: Option<&BookingOption>,
    stop_sales: &[StopSale],
    date: NaiveDate,
) -> DayStatus {
    let option_id = option.map(|o| o.id.as_str());
    if !is_date_offered(&tour.availability, date)
        || stop_sales.iter().any(|stop| stop.covers(date, option_id))
    {
        return DayStatus::Unavailable;
    }
    if is_sold_out(tour.slots_for(option)) {
        DayStatus::Full
    } else {
        DayStatus::Available
    }
}

/// Classify every date in `[today, today + window_days)`.
pub fn resolve_calendar(
    tour: &Tour,
    option_id: Option<&str>,
    stop_sales: &[StopSale],
    today: NaiveDate,
    window_days: i64,
) -> Result<AvailabilityCalendar, AvailabilityError> {
    let option = resolve_option(tour, option_id)?;
    let window_days = window_days.max(1);

    let days = (0..window_days)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let status = classify_day(tour, option, stop_sales, date);
            CalendarDay {
                date,
                status,
                level: (status == DayStatus::Available).then_some(AvailabilityLevel::High),
            }
        })
        .collect();

    Ok(AvailabilityCalendar {
        tour_id: tour.id.clone(),
        option_id: option.map(|o| o.id.clone()),
        from: today,
        to: today + Duration::days(window_days - 1),
        days,
    })
}

/// Validate guests first; an invalid group never reaches the date checks.
pub fn check(
    tour: &Tour,
    request: &AvailabilityCheckRequest,
    stop_sales: &[StopSale],
    today: NaiveDate,
    window_days: i64,
) -> Result<AvailabilityCheckResult, AvailabilityError> {
    request.guests.validate(tour.max_group_size)?;
    let option = resolve_option(tour, request.option_id.as_deref())?;
    let slots = tour.slots_for(option).to_vec();

    if request.date < today || request.date >= today + Duration::days(window_days) {
        return Ok(AvailabilityCheckResult::blocked(
            UnavailableReason::OutsideWindow,
            slots,
        ));
    }

    match classify_day(tour, option, stop_sales, request.date) {
        DayStatus::Unavailable => {
            let option_id = option.map(|o| o.id.as_str());
            let reason = if stop_sales
                .iter()
                .any(|stop| stop.covers(request.date, option_id))
                && is_date_offered(&tour.availability, request.date)
            {
                UnavailableReason::StopSale
            } else {
                UnavailableReason::NotOffered
            };
            return Ok(AvailabilityCheckResult::blocked(reason, slots));
        }
        DayStatus::Full => {
            return Ok(AvailabilityCheckResult::blocked(
                UnavailableReason::SoldOut,
                slots,
            ));
        }
        DayStatus::Available => {}
    }

    if let Some(time) = request.time_slot.as_deref() {
        let party = request.guests.total();
        match slots.iter().find(|slot| slot.time == time) {
            Some(slot) if slot.available == 0 => {
                return Ok(AvailabilityCheckResult::blocked(
                    UnavailableReason::SoldOut,
                    slots,
                ));
            }
            Some(slot) if slot.available < party => {
                return Ok(AvailabilityCheckResult::blocked(
                    UnavailableReason::InsufficientCapacity,
                    slots,
                ));
            }
            Some(_) => {}
            None => {
                return Ok(AvailabilityCheckResult::blocked(
                    UnavailableReason::NotOffered,
                    slots,
                ));
            }
        }
    }

    Ok(AvailabilityCheckResult {
        available: true,
        reason: None,
        slots,
    })
}
