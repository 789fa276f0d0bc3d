use crate::backend::BookingBackend;
use crate::error::ApiError;
use crate::types::{Booking, NewBooking};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Booking API reached over HTTP.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|err| ApiError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turns a non-2xx response into an error carrying the response body,
    /// or `fallback` when the body is empty.
    async fn check_status(response: Response, fallback: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match body.trim() {
            "" => fallback.to_string(),
            body => body.to_string(),
        };
        warn!(status = status.as_u16(), %message, "Booking API rejected request");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl BookingBackend for ApiClient {
    async fn municipalities(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["municipalities"])?;
        debug!(%url, "Loading municipalities");

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, "Failed to load municipalities").await?;
        let municipalities: Vec<String> = response.json().await?;

        info!(count = municipalities.len(), "Municipalities loaded");
        Ok(municipalities)
    }

    async fn bookings(&self) -> Result<Vec<Booking>, ApiError> {
        let url = self.endpoint(&["bookings"])?;
        debug!(%url, "Loading all requests");

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, "Failed to load requests").await?;
        let bookings: Vec<Booking> = response.json().await?;

        info!(count = bookings.len(), "Requests loaded");
        Ok(bookings)
    }

    async fn bookings_by_municipality(&self, municipality: &str) -> Result<Vec<Booking>, ApiError> {
        let url = self.endpoint(&["bookings", "municipality", municipality])?;
        debug!(%url, municipality, "Loading bookings of municipality");

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, "Failed to load booked slots").await?;
        let bookings: Vec<Booking> = response.json().await?;

        info!(count = bookings.len(), municipality, "Booked slots loaded");
        Ok(bookings)
    }

    async fn booking(&self, token: &str) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings", token])?;
        debug!(%url, "Looking up booking");

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(token, "Booking not found");
            return Err(ApiError::NotFound);
        }
        let response = Self::check_status(response, "Error retrieving booking").await?;
        let booking: Booking = response.json().await?;

        info!(token, state = %booking.state, "Booking found");
        Ok(booking)
    }

    async fn create_booking(&self, booking: &NewBooking) -> Result<String, ApiError> {
        let url = self.endpoint(&["bookings"])?;
        info!(municipality = %booking.municipality, time_slot = %booking.time_slot, "Submitting request");

        let response = self.client.post(url).json(booking).send().await?;
        let response = Self::check_status(response, "Failed to submit request").await?;
        let token = response.text().await?.trim().to_string();

        info!(%token, "Request submitted");
        Ok(token)
    }

    async fn update_booking(&self, token: &str, booking: &Booking) -> Result<(), ApiError> {
        let url = self.endpoint(&["bookings", token])?;
        info!(token, state = %booking.state, time_slot = %booking.time_slot, "Updating request");

        let response = self.client.put(url).json(booking).send().await?;
        Self::check_status(response, "Failed to update request").await?;

        info!(token, "Request updated");
        Ok(())
    }

    async fn delete_booking(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["bookings", token])?;
        info!(token, "Deleting request");

        let response = self.client.delete(url).send().await?;
        Self::check_status(response, "Failed to delete request").await?;

        info!(token, "Request deleted");
        Ok(())
    }
}
