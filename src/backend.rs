use crate::error::ApiError;
use crate::types::{Booking, NewBooking};
use std::future::Future;

pub trait BookingBackend: Clone + Send + Sync + 'static {
    fn municipalities(&self) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;
    fn bookings(&self) -> impl Future<Output = Result<Vec<Booking>, ApiError>> + Send;
    fn bookings_by_municipality(
        &self,
        municipality: &str,
    ) -> impl Future<Output = Result<Vec<Booking>, ApiError>> + Send;
    fn booking(&self, token: &str) -> impl Future<Output = Result<Booking, ApiError>> + Send;
    fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
    fn update_booking(
        &self,
        token: &str,
        booking: &Booking,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
    fn delete_booking(&self, token: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}
