use crate::backend::BookingBackend;
use crate::error::{ApiError, FormError, PortalError};
use crate::timeslots::{ensure_bookable_date, ensure_lead_time, BookingFlow, SlotBoard};
use crate::types::{Booking, NewBooking, PortalStatus};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{error, info, warn};
use validator::Validate;

const LOAD_MUNICIPALITIES_FAILED: &str = "Failed to load municipalities. Please refresh the page.";
const LOOKUP_FAILED: &str = "Error retrieving booking. Please try again.";

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Edit of a looked-up booking: the booking as loaded plus the day being browsed.
#[derive(Debug, Clone)]
pub struct EditSession {
    booking: Booking,
    board: SlotBoard,
}

impl EditSession {
    pub fn booking(&self) -> &Booking {
        &self.booking
    }

    pub fn board(&self) -> &SlotBoard {
        &self.board
    }
}

/// State of the citizen booking page, from municipality choice to edit and delete.
pub struct CitizenPortal<B: BookingBackend> {
    backend: B,
    clock: fn() -> NaiveDateTime,
    status: PortalStatus,
    municipalities: Vec<String>,
    municipality: Option<String>,
    date: Option<NaiveDate>,
    board: Option<SlotBoard>,
    current_booking: Option<Booking>,
    edit: Option<EditSession>,
}

impl<B: BookingBackend> CitizenPortal<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, local_now)
    }

    pub fn with_clock(backend: B, clock: fn() -> NaiveDateTime) -> Self {
        Self {
            backend,
            clock,
            status: PortalStatus::Idle,
            municipalities: Vec::new(),
            municipality: None,
            date: None,
            board: None,
            current_booking: None,
            edit: None,
        }
    }

    pub fn status(&self) -> &PortalStatus {
        &self.status
    }

    pub fn municipalities(&self) -> &[String] {
        &self.municipalities
    }

    pub fn municipality(&self) -> Option<&str> {
        self.municipality.as_deref()
    }

    pub fn board(&self) -> Option<&SlotBoard> {
        self.board.as_ref()
    }

    pub fn current_booking(&self) -> Option<&Booking> {
        self.current_booking.as_ref()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date()
    }

    fn fail<T>(&mut self, err: impl Into<PortalError>) -> Result<T, PortalError> {
        let err = err.into();
        self.status = PortalStatus::Failed(err.to_string());
        Err(err)
    }

    pub async fn load_municipalities(&mut self) -> Result<&[String], PortalError> {
        info!("Loading municipalities");
        match self.backend.municipalities().await {
            Ok(municipalities) => {
                self.municipalities = municipalities;
                Ok(self.municipalities.as_slice())
            }
            Err(err) => {
                error!(?err, "Failed to load municipalities");
                self.municipalities.clear();
                self.status = PortalStatus::Failed(LOAD_MUNICIPALITIES_FAILED.into());
                Err(err.into())
            }
        }
    }

    /// Chooses the service area. Reloads the slots when a date is already picked.
    pub async fn select_municipality(&mut self, municipality: &str) -> Result<(), PortalError> {
        let municipality = municipality.trim();
        if municipality.is_empty() {
            return self.fail(FormError::MunicipalityRequired);
        }
        if !self.municipalities.is_empty() && !self.municipalities.iter().any(|m| m == municipality) {
            return self.fail(FormError::UnknownMunicipality(municipality.into()));
        }

        self.municipality = Some(municipality.into());
        self.board = None;
        match self.date {
            Some(date) => self.load_available_slots(date).await,
            None => Ok(()),
        }
    }

    pub async fn select_date(&mut self, date: NaiveDate) -> Result<&SlotBoard, PortalError> {
        if self.municipality.is_none() {
            self.date = None;
            return self.fail(FormError::MunicipalityRequired);
        }
        if let Err(err) = ensure_bookable_date(BookingFlow::Create, date, self.today()) {
            return self.fail(err);
        }

        self.date = Some(date);
        self.load_available_slots(date).await?;
        self.board.as_ref().ok_or(PortalError::Form(FormError::DateRequired))
    }

    async fn load_available_slots(&mut self, date: NaiveDate) -> Result<(), PortalError> {
        let Some(municipality) = self.municipality.clone() else {
            return self.fail(FormError::MunicipalityRequired);
        };
        info!(%date, %municipality, "Loading available time slots");

        self.board = None;
        match self.backend.bookings_by_municipality(&municipality).await {
            Ok(bookings) => {
                let board = SlotBoard::build(&bookings, date, BookingFlow::Create, None);
                info!(
                    total = board.slots().len(),
                    booked = board.slots().len() - board.available().count(),
                    "Time slots ready"
                );
                self.board = Some(board);
                Ok(())
            }
            Err(err) => {
                error!(?err, "Failed to load booked slots");
                self.fail(err)
            }
        }
    }

    pub fn select_slot(&mut self, time: NaiveTime) -> Result<(), PortalError> {
        let result = match self.board.as_mut() {
            Some(board) => board.select(time),
            None => Err(FormError::DateRequired),
        };
        match result {
            Ok(()) => {
                info!(%time, "Time slot selected");
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Submits the new collection request. Returns the token assigned by the server.
    pub async fn submit(&mut self, address: &str, item_description: &str) -> Result<String, PortalError> {
        let Some(time_slot) = self.board.as_ref().and_then(SlotBoard::selected_datetime) else {
            error!("No time slot selected");
            return self.fail(FormError::TimeSlotRequired);
        };
        let Some(municipality) = self.municipality.clone() else {
            return self.fail(FormError::MunicipalityRequired);
        };

        let new_booking = NewBooking {
            municipality,
            address: address.trim().into(),
            time_slot,
            item_description: item_description.trim().into(),
        };
        if let Err(err) = new_booking.validate() {
            return self.fail(FormError::from(err));
        }

        self.status = PortalStatus::Loading;
        match self.backend.create_booking(&new_booking).await {
            Ok(token) => {
                info!(%token, "Request submitted successfully");
                self.status = PortalStatus::Succeeded(token.clone());
                self.reset_form();
                Ok(token)
            }
            Err(err) => {
                error!(?err, "Error submitting request");
                self.fail(err)
            }
        }
    }

    fn reset_form(&mut self) {
        self.municipality = None;
        self.date = None;
        self.board = None;
    }

    pub async fn lookup(&mut self, token: &str) -> Result<&Booking, PortalError> {
        let token = token.trim();
        if token.is_empty() {
            error!("Empty token provided");
            return self.fail(FormError::TokenRequired);
        }

        info!(token, "Looking up token");
        self.status = PortalStatus::Loading;
        match self.backend.booking(token).await {
            Ok(booking) => {
                self.status = PortalStatus::Idle;
                Ok(&*self.current_booking.insert(booking))
            }
            Err(ApiError::NotFound) => {
                warn!(token, "Token not found");
                self.current_booking = None;
                self.fail(ApiError::NotFound)
            }
            Err(err) => {
                error!(?err, "Error looking up token");
                self.current_booking = None;
                self.status = PortalStatus::Failed(LOOKUP_FAILED.into());
                Err(err.into())
            }
        }
    }

    pub fn close_booking(&mut self) {
        self.current_booking = None;
        self.edit = None;
    }

    pub async fn open_edit(&mut self) -> Result<&EditSession, PortalError> {
        let Some(booking) = self.current_booking.clone() else {
            error!("No booking to edit");
            return self.fail(FormError::NoBookingLoaded);
        };
        info!(token = %booking.token, "Opening edit");

        let date = booking.time_slot.date();
        let board = self.edit_board(&booking, date).await;
        Ok(&*self.edit.insert(EditSession { booking, board }))
    }

    pub async fn edit_select_date(&mut self, date: NaiveDate) -> Result<&SlotBoard, PortalError> {
        let Some(booking) = self.edit.as_ref().map(|edit| edit.booking.clone()) else {
            return self.fail(FormError::NoEditSession);
        };
        if let Err(err) = ensure_bookable_date(BookingFlow::Edit, date, self.today()) {
            return self.fail(err);
        }

        let board = self.edit_board(&booking, date).await;
        let edit = self.edit.insert(EditSession { booking, board });
        Ok(&edit.board)
    }

    /// Half-hour board that ignores the edited booking itself. The booking's
    /// time of day stays free and preselected on every date. A failed fetch
    /// still yields a board, with every slot free.
    async fn edit_board(&self, booking: &Booking, date: NaiveDate) -> SlotBoard {
        let bookings = match self.backend.bookings_by_municipality(&booking.municipality).await {
            Ok(bookings) => bookings,
            Err(err) => {
                error!(?err, "Failed to load booked slots, showing all slots");
                Vec::new()
            }
        };

        let mut board = SlotBoard::build(&bookings, date, BookingFlow::Edit, Some(&booking.token));
        let current = BookingFlow::Edit.slot_of(booking.time_slot.time());
        if board.hold(current).is_err() {
            warn!(%current, "Current time slot is not offered for edits");
        }
        board
    }

    pub fn edit_select_slot(&mut self, time: NaiveTime) -> Result<(), PortalError> {
        let result = match self.edit.as_mut() {
            Some(edit) => edit.board.select(time),
            None => Err(FormError::NoEditSession),
        };
        match result {
            Ok(()) => {
                info!(%time, "Time slot selected for edit");
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Stores the edited booking and reloads it. Municipality, state and
    /// submission date are kept from the loaded booking.
    pub async fn submit_edit(&mut self, address: &str, item_description: &str) -> Result<&Booking, PortalError> {
        let Some(edit) = self.edit.as_ref() else {
            return self.fail(FormError::NoEditSession);
        };
        let Some(time_slot) = edit.board.selected_datetime() else {
            return self.fail(FormError::TimeSlotRequired);
        };
        if let Err(err) = ensure_lead_time(time_slot, (self.clock)()) {
            error!(%time_slot, "Invalid time slot, less than 1 hour from now");
            return self.fail(err);
        }

        let updated = Booking {
            address: address.trim().into(),
            time_slot,
            item_description: item_description.trim().into(),
            ..edit.booking.clone()
        };
        let token = updated.token.clone();

        info!(%token, "Updating request");
        self.status = PortalStatus::Loading;
        if let Err(err) = self.backend.update_booking(&token, &updated).await {
            error!(?err, "Error updating request");
            return self.fail(err);
        }

        self.edit = None;
        self.lookup(&token).await?;
        self.status = PortalStatus::Succeeded("Request updated successfully!".into());
        self.current_booking
            .as_ref()
            .ok_or(PortalError::Form(FormError::NoBookingLoaded))
    }

    pub async fn delete(&mut self) -> Result<(), PortalError> {
        let Some(token) = self.current_booking.as_ref().map(|booking| booking.token.clone()) else {
            error!("No booking to delete");
            return self.fail(FormError::NoBookingLoaded);
        };

        info!(%token, "Deleting request");
        self.status = PortalStatus::Loading;
        if let Err(err) = self.backend.delete_booking(&token).await {
            error!(?err, "Error deleting request");
            return self.fail(err);
        }

        self.close_booking();
        self.status = PortalStatus::Succeeded("Request deleted successfully!".into());
        Ok(())
    }
}
