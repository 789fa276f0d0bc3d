use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Booking API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Booking not found. Please check your token and try again.")]
    NotFound,

    #[error("Invalid Booking API base url: {0}")]
    InvalidBaseUrl(String),
}

/// Rejections raised before any request reaches the Booking API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please select a municipality first")]
    MunicipalityRequired,

    #[error("Unknown municipality: {0}")]
    UnknownMunicipality(String),

    #[error("Please select a date on or after {earliest}")]
    DateTooEarly { earliest: NaiveDate },

    #[error("Please select a date first")]
    DateRequired,

    #[error("Please select a time slot")]
    TimeSlotRequired,

    #[error("This time slot is already booked")]
    SlotUnavailable,

    #[error("{0} is not an offered time slot")]
    UnknownSlot(String),

    #[error("Time slot must be at least 1 hour from now.")]
    TimeSlotTooSoon,

    #[error("Please enter a booking token")]
    TokenRequired,

    #[error("No booking loaded. Look up a booking by its token first")]
    NoBookingLoaded,

    #[error("No edit in progress")]
    NoEditSession,

    #[error("Request {0} is not part of the loaded requests")]
    UnknownRequest(String),

    #[error("{0}")]
    InvalidForm(String),
}

impl From<validator::ValidationErrors> for FormError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flatten()
            .map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => error.code.to_string(),
            })
            .collect();
        messages.sort();
        FormError::InvalidForm(messages.join(". "))
    }
}

#[derive(Error, Debug)]
pub enum PortalError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl PortalError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortalError::Api(ApiError::NotFound))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::NewBooking;
    use chrono::NaiveDate;
    use validator::Validate;

    #[test]
    fn test_validation_messages() {
        let new_booking = NewBooking {
            municipality: "Aveiro".into(),
            address: String::new(),
            time_slot: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            item_description: String::new(),
        };

        let error = FormError::from(new_booking.validate().unwrap_err());
        assert_eq!(
            error.to_string(),
            "Please describe the items to collect. Please enter the collection address"
        );
    }

    #[test]
    fn test_not_found_message() {
        let error = PortalError::from(ApiError::NotFound);
        assert!(error.is_not_found());
        assert_eq!(
            error.to_string(),
            "Booking not found. Please check your token and try again."
        );
    }
}
