use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    backend::BookingBackend,
    error::ApiError,
    types::{local_datetime, Booking, BookingState, NewBooking},
};

pub fn datetime(value: &str) -> NaiveDateTime {
    local_datetime::parse(value).unwrap()
}

pub fn booking(token: &str, municipality: &str, time_slot: &str) -> Booking {
    Booking {
        token: token.into(),
        municipality: municipality.into(),
        address: "Rua Direita 12".into(),
        time_slot: datetime(time_slot),
        item_description: "Old sofa".into(),
        state: BookingState::Received,
        date: NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap(),
    }
}

pub fn booking_with_state(token: &str, municipality: &str, state: BookingState) -> Booking {
    Booking {
        state,
        ..booking(token, municipality, "2025-06-01T09:00")
    }
}

pub struct MockBookingBackendInner {
    pub success: AtomicBool,
    pub failing_operations: Mutex<Vec<&'static str>>,
    pub calls_to_municipalities: AtomicU64,
    pub calls_to_bookings: AtomicU64,
    pub calls_to_bookings_by_municipality: AtomicU64,
    pub calls_to_booking: AtomicU64,
    pub calls_to_create_booking: AtomicU64,
    pub calls_to_update_booking: AtomicU64,
    pub calls_to_delete_booking: AtomicU64,
    pub municipalities: Mutex<Vec<String>>,
    pub bookings: Mutex<Vec<Booking>>,
    pub created: Mutex<Vec<NewBooking>>,
}

#[derive(Clone)]
pub struct MockBookingBackend(pub Arc<MockBookingBackendInner>);

impl MockBookingBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            failing_operations: Mutex::default(),
            calls_to_municipalities: AtomicU64::default(),
            calls_to_bookings: AtomicU64::default(),
            calls_to_bookings_by_municipality: AtomicU64::default(),
            calls_to_booking: AtomicU64::default(),
            calls_to_create_booking: AtomicU64::default(),
            calls_to_update_booking: AtomicU64::default(),
            calls_to_delete_booking: AtomicU64::default(),
            municipalities: Mutex::default(),
            bookings: Mutex::default(),
            created: Mutex::default(),
        }
    }
}

impl MockBookingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBookingBackendInner::new()))
    }

    pub fn with_data(municipalities: &[&str], bookings: Vec<Booking>) -> Self {
        let backend = Self::new();
        *backend.0.municipalities.lock().unwrap() =
            municipalities.iter().map(|name| name.to_string()).collect();
        *backend.0.bookings.lock().unwrap() = bookings;
        backend
    }

    pub fn fail(&self) {
        self.0.success.store(false, Ordering::SeqCst);
    }

    /// Fails only the named trait method, e.g. `"municipalities"`.
    pub fn fail_operation(&self, operation: &'static str) {
        self.0.failing_operations.lock().unwrap().push(operation);
    }

    pub fn calls(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::SeqCst)
    }

    pub fn stored(&self, token: &str) -> Option<Booking> {
        self.0
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|booking| booking.token == token)
            .cloned()
    }

    fn result(&self, operation: &str) -> Result<(), ApiError> {
        let failing = self
            .0
            .failing_operations
            .lock()
            .unwrap()
            .iter()
            .any(|failing| *failing == operation);
        match self.0.success.load(Ordering::SeqCst) && !failing {
            true => Ok(()),
            false => Err(ApiError::Status {
                status: 500,
                message: "Supposed to fail".into(),
            }),
        }
    }
}

impl BookingBackend for MockBookingBackend {
    async fn municipalities(&self) -> Result<Vec<String>, ApiError> {
        self.0.calls_to_municipalities.fetch_add(1, Ordering::SeqCst);
        self.result("municipalities")?;
        Ok(self.0.municipalities.lock().unwrap().clone())
    }

    async fn bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.0.calls_to_bookings.fetch_add(1, Ordering::SeqCst);
        self.result("bookings")?;
        Ok(self.0.bookings.lock().unwrap().clone())
    }

    async fn bookings_by_municipality(&self, municipality: &str) -> Result<Vec<Booking>, ApiError> {
        self.0
            .calls_to_bookings_by_municipality
            .fetch_add(1, Ordering::SeqCst);
        self.result("bookings_by_municipality")?;
        Ok(self
            .0
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|booking| booking.municipality == municipality)
            .cloned()
            .collect())
    }

    async fn booking(&self, token: &str) -> Result<Booking, ApiError> {
        self.0.calls_to_booking.fetch_add(1, Ordering::SeqCst);
        self.result("booking")?;
        self.stored(token).ok_or(ApiError::NotFound)
    }

    async fn create_booking(&self, booking: &NewBooking) -> Result<String, ApiError> {
        self.0.calls_to_create_booking.fetch_add(1, Ordering::SeqCst);
        self.result("create_booking")?;

        let token = Uuid::new_v4().to_string();
        self.0.created.lock().unwrap().push(booking.clone());
        self.0.bookings.lock().unwrap().push(Booking {
            token: token.clone(),
            municipality: booking.municipality.clone(),
            address: booking.address.clone(),
            time_slot: booking.time_slot,
            item_description: booking.item_description.clone(),
            state: BookingState::Received,
            date: datetime("2025-05-20T14:00"),
        });
        Ok(token)
    }

    async fn update_booking(&self, token: &str, booking: &Booking) -> Result<(), ApiError> {
        self.0.calls_to_update_booking.fetch_add(1, Ordering::SeqCst);
        self.result("update_booking")?;

        let mut bookings = self.0.bookings.lock().unwrap();
        match bookings.iter_mut().find(|stored| stored.token == token) {
            Some(stored) => {
                *stored = Booking {
                    token: token.into(),
                    ..booking.clone()
                };
                Ok(())
            }
            None => Err(ApiError::Status {
                status: 400,
                message: format!("Service request with token {token} not found."),
            }),
        }
    }

    async fn delete_booking(&self, token: &str) -> Result<(), ApiError> {
        self.0.calls_to_delete_booking.fetch_add(1, Ordering::SeqCst);
        self.result("delete_booking")?;

        let mut bookings = self.0.bookings.lock().unwrap();
        let count = bookings.len();
        bookings.retain(|booking| booking.token != token);
        if bookings.len() == count {
            return Err(ApiError::Status {
                status: 404,
                message: "Failed to delete request".into(),
            });
        }
        Ok(())
    }
}
