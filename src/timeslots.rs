use crate::error::FormError;
use crate::types::Booking;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeSet;

const CREATE_FIRST_HOUR: u32 = 9;
const CREATE_END_HOUR: u32 = 18;
const EDIT_FIRST_HOUR: u32 = 8;
const EDIT_LAST_HOUR: u32 = 18;
const EDIT_STEP_MINUTES: u32 = 30;

/// Minimum distance between now and the collection instant of an edited booking.
pub fn min_lead_time() -> Duration {
    Duration::hours(1)
}

/// The two booking flows differ in grid granularity and earliest date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFlow {
    /// New bookings: on the hour, 09:00 up to and excluding 18:00, from tomorrow.
    Create,
    /// Edits: on the half hour, 08:00 through 18:30, from today.
    Edit,
}

impl BookingFlow {
    pub fn grid(&self) -> Vec<NaiveTime> {
        match self {
            BookingFlow::Create => (CREATE_FIRST_HOUR..CREATE_END_HOUR)
                .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
                .collect(),
            BookingFlow::Edit => (EDIT_FIRST_HOUR..=EDIT_LAST_HOUR)
                .flat_map(|hour| {
                    (0..60)
                        .step_by(EDIT_STEP_MINUTES as usize)
                        .filter_map(move |minute| NaiveTime::from_hms_opt(hour, minute, 0))
                })
                .collect(),
        }
    }

    /// Grid key a booked instant occupies.
    pub fn slot_of(&self, time: NaiveTime) -> NaiveTime {
        let minute = match self {
            BookingFlow::Create => 0,
            BookingFlow::Edit => time.minute(),
        };
        NaiveTime::from_hms_opt(time.hour(), minute, 0).unwrap_or(time)
    }

    pub fn earliest_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            BookingFlow::Create => today.succ_opt().unwrap_or(today),
            BookingFlow::Edit => today,
        }
    }
}

pub fn occupied_slots(
    bookings: &[Booking],
    date: NaiveDate,
    flow: BookingFlow,
    exclude_token: Option<&str>,
) -> BTreeSet<NaiveTime> {
    bookings
        .iter()
        .filter(|booking| booking.time_slot.date() == date)
        .filter(|booking| exclude_token != Some(booking.token.as_str()))
        .map(|booking| flow.slot_of(booking.time_slot.time()))
        .collect()
}

pub fn ensure_bookable_date(
    flow: BookingFlow,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), FormError> {
    let earliest = flow.earliest_date(today);
    if date < earliest {
        return Err(FormError::DateTooEarly { earliest });
    }
    Ok(())
}

pub fn ensure_lead_time(slot: NaiveDateTime, now: NaiveDateTime) -> Result<(), FormError> {
    if slot < now + min_lead_time() {
        return Err(FormError::TimeSlotTooSoon);
    }
    Ok(())
}

pub fn parse_slot(value: &str) -> Result<NaiveTime, FormError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| FormError::UnknownSlot(value.trim().to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub time: NaiveTime,
    pub booked: bool,
}

impl Slot {
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// Slot grid of one day with at most one selected slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBoard {
    date: NaiveDate,
    slots: Vec<Slot>,
    selected: Option<NaiveTime>,
}

impl SlotBoard {
    pub fn build(
        bookings: &[Booking],
        date: NaiveDate,
        flow: BookingFlow,
        exclude_token: Option<&str>,
    ) -> Self {
        let occupied = occupied_slots(bookings, date, flow, exclude_token);
        let slots = flow
            .grid()
            .into_iter()
            .map(|time| Slot {
                time,
                booked: occupied.contains(&time),
            })
            .collect();

        Self {
            date,
            slots,
            selected: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn available(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| !slot.booked)
    }

    pub fn selected(&self) -> Option<NaiveTime> {
        self.selected
    }

    pub fn selected_datetime(&self) -> Option<NaiveDateTime> {
        self.selected.map(|time| self.date.and_time(time))
    }

    pub fn select(&mut self, time: NaiveTime) -> Result<(), FormError> {
        match self.slots.iter().find(|slot| slot.time == time) {
            Some(slot) if slot.booked => Err(FormError::SlotUnavailable),
            Some(_) => {
                self.selected = Some(time);
                Ok(())
            }
            None => Err(FormError::UnknownSlot(time.format("%H:%M").to_string())),
        }
    }

    /// Frees and selects `time` even if another booking holds it.
    pub fn hold(&mut self, time: NaiveTime) -> Result<(), FormError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.time == time)
            .ok_or_else(|| FormError::UnknownSlot(time.format("%H:%M").to_string()))?;
        slot.booked = false;
        self.selected = Some(time);
        Ok(())
    }
}
