use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::booking::{BookingData, GuestCounts, GuestError};
use crate::models::tour::Tour;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    DateAndGuests = 1,
    TourOption = 2,
    AddOns = 3,
    Review = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    fn next(self) -> Option<Step> {
        match self {
            Step::DateAndGuests => Some(Step::TourOption),
            Step::TourOption => Some(Step::AddOns),
            Step::AddOns => Some(Step::Review),
            Step::Review => None,
        }
    }

    fn previous(self) -> Option<Step> {
        match self {
            Step::DateAndGuests => None,
            Step::TourOption => Some(Step::DateAndGuests),
            Step::AddOns => Some(Step::TourOption),
            Step::Review => Some(Step::AddOns),
        }
    }
}

/// Sub-panel of step 1 opened when editing from the review step.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Date,
    Guests,
    Option,
    AddOns,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Select a date before continuing")]
    DateRequired,

    #[error(transparent)]
    Guests(#[from] GuestError),

    #[error("Select a time slot before continuing")]
    TimeSlotRequired,

    #[error("Booking is already on the review step")]
    AlreadyAtReview,

    #[error("Step {0} has not been reached yet")]
    StepLocked(u8),

    #[error("Selection belongs to tour {found}, expected {expected}")]
    TourMismatch { expected: String, found: String },
}

/// Four-step booking wizard: date & guests, tour option, add-ons, review.
#[derive(Debug, Clone)]
pub struct BookingFlow {
    max_group_size: u32,
    current: Step,
    furthest: Step,
    expanded: Option<Panel>,
    data: BookingData,
}

impl BookingFlow {
    pub fn new(tour_id: impl Into<String>, max_group_size: u32) -> Self {
        Self {
            max_group_size,
            current: Step::DateAndGuests,
            furthest: Step::DateAndGuests,
            expanded: None,
            data: BookingData::new(tour_id),
        }
    }

    pub fn for_tour(tour: &Tour) -> Self {
        Self::new(tour.id.clone(), tour.max_group_size)
    }

    pub fn current_step(&self) -> Step {
        self.current
    }

    pub fn expanded_panel(&self) -> Option<Panel> {
        self.expanded
    }

    pub fn data(&self) -> &BookingData {
        &self.data
    }

    pub fn into_data(self) -> BookingData {
        self.data
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.data.date = Some(date);
    }

    pub fn set_guests(&mut self, guests: GuestCounts) {
        self.data.guests = guests;
    }

    /// Changing the option invalidates the chosen slot.
    pub fn select_option(&mut self, option_id: Option<String>) {
        if self.data.option_id != option_id {
            self.data.time_slot = None;
        }
        self.data.option_id = option_id;
    }

    pub fn select_time_slot(&mut self, time: impl Into<String>) {
        self.data.time_slot = Some(time.into());
    }

    pub fn set_add_on(&mut self, add_on_id: impl Into<String>, quantity: u32) {
        let add_on_id = add_on_id.into();
        if quantity == 0 {
            self.data.add_ons.remove(&add_on_id);
        } else {
            self.data.add_ons.insert(add_on_id, quantity);
        }
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.data.language = language;
    }

    pub fn set_special_requests(&mut self, requests: Option<String>) {
        self.data.special_requests = requests;
    }

    /// Gate for leaving the current step forward.
    pub fn can_advance(&self) -> Result<(), FlowError> {
        match self.current {
            Step::DateAndGuests => {
                if self.data.date.is_none() {
                    return Err(FlowError::DateRequired);
                }
                self.data.guests.validate(self.max_group_size)?;
                Ok(())
            }
            Step::TourOption => match self.data.time_slot {
                Some(_) => Ok(()),
                None => Err(FlowError::TimeSlotRequired),
            },
            Step::AddOns => Ok(()),
            Step::Review => Err(FlowError::AlreadyAtReview),
        }
    }

    pub fn next(&mut self) -> Result<Step, FlowError> {
        self.can_advance()?;
        if let Some(next) = self.current.next() {
            self.current = next;
            self.furthest = self.furthest.max(next);
            self.expanded = None;
        }
        Ok(self.current)
    }

    pub fn back(&mut self) -> Step {
        if let Some(previous) = self.current.previous() {
            self.current = previous;
        }
        self.current
    }

    /// Step 1 is always reachable; later steps only once they have been reached.
    pub fn go_to(&mut self, step: Step) -> Result<Step, FlowError> {
        if step != Step::DateAndGuests && step > self.furthest {
            return Err(FlowError::StepLocked(step.number()));
        }
        self.current = step;
        Ok(self.current)
    }

    /// Editing from the review step goes back to step 1 with one panel open.
    pub fn edit_from_review(&mut self, panel: Panel) -> Step {
        self.current = Step::DateAndGuests;
        self.expanded = Some(panel);
        self.current
    }

    pub fn reset(&mut self) {
        let tour_id = std::mem::take(&mut self.data.tour_id);
        self.data = BookingData::new(tour_id);
        self.current = Step::DateAndGuests;
        self.furthest = Step::DateAndGuests;
        self.expanded = None;
    }

    pub fn is_complete(&self) -> bool {
        self.current == Step::Review
    }

    /// Drive a fresh flow through every step with a finalized selection.
    pub fn replay(tour: &Tour, selection: &BookingData) -> Result<BookingFlow, FlowError> {
        if selection.tour_id != tour.id {
            return Err(FlowError::TourMismatch {
                expected: tour.id.clone(),
                found: selection.tour_id.clone(),
            });
        }

        let mut flow = BookingFlow::for_tour(tour);
        if let Some(date) = selection.date {
            flow.select_date(date);
        }
        flow.set_guests(selection.guests);
        flow.next()?;

        flow.select_option(selection.option_id.clone());
        if let Some(time) = &selection.time_slot {
            flow.select_time_slot(time.clone());
        }
        flow.next()?;

        let add_ons: BTreeMap<String, u32> = selection
            .selected_add_ons()
            .map(|(id, quantity)| (id.clone(), *quantity))
            .collect();
        for (id, quantity) in add_ons {
            flow.set_add_on(id, quantity);
        }
        flow.set_language(selection.language.clone());
        flow.set_special_requests(selection.special_requests.clone());
        flow.next()?;

        Ok(flow)
    }
}
