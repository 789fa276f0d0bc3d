//! # Collection Booking
//!
//! Client of the municipal waste-collection Booking API.
//!
//! - Citizens pick a municipality, a day and a free slot, submit a request and
//!   later look it up, edit or delete it with the token they received.
//! - Staff list all requests with filters and statistics, update their state
//!   and delete them.
//!
//! Slot availability is computed on the client from the bookings the API
//! returns (see [`timeslots`]). The check is advisory: the API remains the
//! authority on double bookings.

pub mod api_client;
pub mod backend;
pub mod citizen;
pub mod cli;
pub mod configuration;
pub mod configuration_handler;
pub mod error;
pub mod staff;
#[cfg(test)]
mod testutils;
pub mod timeslots;
pub mod types;
pub mod view;
