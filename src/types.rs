use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    Received,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingState {
    pub const ALL: [BookingState; 5] = [
        BookingState::Received,
        BookingState::Assigned,
        BookingState::InProgress,
        BookingState::Completed,
        BookingState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingState::Received => "RECEIVED",
            BookingState::Assigned => "ASSIGNED",
            BookingState::InProgress => "IN_PROGRESS",
            BookingState::Completed => "COMPLETED",
            BookingState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase().replace('-', "_");
        BookingState::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| format!("Unknown request state: {value}"))
    }
}

/// A collection request as the Booking API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub token: String,
    pub municipality: String,
    pub address: String,
    #[serde(with = "local_datetime")]
    pub time_slot: NaiveDateTime,
    pub item_description: String,
    pub state: BookingState,
    #[serde(with = "local_datetime")]
    pub date: NaiveDateTime,
}

/// Payload of `POST /bookings`. The server assigns token, state and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[validate(length(min = 1, message = "Please select a municipality"))]
    pub municipality: String,
    #[validate(length(min = 1, message = "Please enter the collection address"))]
    pub address: String,
    #[serde(with = "local_datetime")]
    pub time_slot: NaiveDateTime,
    #[validate(length(min = 1, message = "Please describe the items to collect"))]
    pub item_description: String,
}

/// What the front end shows besides its data: loading indicator or banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PortalStatus {
    #[default]
    Idle,
    Loading,
    Succeeded(String),
    Failed(String),
}

/// Zone-less date-times as exchanged with the Booking API.
pub mod local_datetime {
    use chrono::{DateTime, Local, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const ACCEPTED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        ACCEPTED_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|datetime| datetime.with_timezone(&Local).naive_local())
            })
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(WIRE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).ok_or_else(|| de::Error::custom(format!("invalid date-time: {value}")))
    }
}
