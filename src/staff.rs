use crate::backend::BookingBackend;
use crate::error::{FormError, PortalError};
use crate::types::{Booking, BookingState, PortalStatus};
use tracing::{error, info};

const LOAD_REQUESTS_FAILED: &str = "Failed to load requests";

/// Municipality and state filters of the dashboard. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub municipality: Option<String>,
    pub state: Option<BookingState>,
}

impl RequestFilter {
    pub fn matches(&self, request: &Booking) -> bool {
        let municipality = self
            .municipality
            .as_ref()
            .map_or(true, |municipality| &request.municipality == municipality);
        let state = self.state.map_or(true, |state| request.state == state);
        municipality && state
    }

    pub fn apply<'a>(&self, requests: &'a [Booking]) -> Vec<&'a Booking> {
        requests.iter().filter(|request| self.matches(request)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStatistics {
    pub total: usize,
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl RequestStatistics {
    pub fn tally(requests: &[Booking]) -> Self {
        requests.iter().fold(
            Self {
                total: requests.len(),
                ..Self::default()
            },
            |mut statistics, request| {
                match request.state {
                    BookingState::Assigned => statistics.assigned += 1,
                    BookingState::InProgress => statistics.in_progress += 1,
                    BookingState::Completed => statistics.completed += 1,
                    BookingState::Received | BookingState::Cancelled => {}
                }
                statistics
            },
        )
    }
}

pub struct StaffDashboard<B: BookingBackend> {
    backend: B,
    status: PortalStatus,
    municipalities: Vec<String>,
    requests: Vec<Booking>,
    filter: RequestFilter,
}

impl<B: BookingBackend> StaffDashboard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            status: PortalStatus::Idle,
            municipalities: Vec::new(),
            requests: Vec::new(),
            filter: RequestFilter::default(),
        }
    }

    pub fn status(&self) -> &PortalStatus {
        &self.status
    }

    pub fn municipalities(&self) -> &[String] {
        &self.municipalities
    }

    pub fn requests(&self) -> &[Booking] {
        &self.requests
    }

    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: RequestFilter) {
        info!(?filter, "Applying filters");
        self.filter = filter;
    }

    pub fn filtered(&self) -> Vec<&Booking> {
        self.filter.apply(&self.requests)
    }

    pub fn statistics(&self) -> RequestStatistics {
        RequestStatistics::tally(&self.requests)
    }

    pub fn request(&self, token: &str) -> Option<&Booking> {
        self.requests.iter().find(|request| request.token == token)
    }

    /// Loads the municipality options and all requests. Only a failure of the
    /// request list is reported.
    pub async fn load(&mut self) -> Result<(), PortalError> {
        info!("Loading dashboard");
        self.status = PortalStatus::Loading;

        let (municipalities, requests) =
            tokio::join!(self.backend.municipalities(), self.backend.bookings());

        match municipalities {
            Ok(municipalities) => self.municipalities = municipalities,
            Err(err) => error!(?err, "Failed to load municipalities for filter"),
        }

        match requests {
            Ok(requests) => {
                info!(count = requests.len(), "All requests loaded");
                self.requests = requests;
                self.status = PortalStatus::Idle;
                Ok(())
            }
            Err(err) => {
                error!(?err, "Failed to load requests");
                self.requests.clear();
                self.status = PortalStatus::Failed(LOAD_REQUESTS_FAILED.into());
                Err(err.into())
            }
        }
    }

    async fn reload(&mut self) -> Result<(), PortalError> {
        let status = self.status.clone();
        self.load().await?;
        self.status = status;
        Ok(())
    }

    pub async fn update_status(&mut self, token: &str, state: BookingState) -> Result<(), PortalError> {
        let Some(request) = self.request(token).cloned() else {
            error!(token, "Request not found");
            let err = PortalError::from(FormError::UnknownRequest(token.into()));
            self.status = PortalStatus::Failed(err.to_string());
            return Err(err);
        };

        info!(token, %state, "Updating request status");
        let updated = Booking { state, ..request };
        if let Err(err) = self.backend.update_booking(token, &updated).await {
            error!(?err, "Failed to update status");
            self.status = PortalStatus::Failed(format!("Failed to update status: {err}"));
            return Err(err.into());
        }

        self.status = PortalStatus::Succeeded(format!("Request {token} is now {state}"));
        self.reload().await
    }

    pub async fn delete(&mut self, token: &str) -> Result<(), PortalError> {
        info!(token, "Staff deleting request");
        if let Err(err) = self.backend.delete_booking(token).await {
            error!(?err, "Error deleting request");
            self.status = PortalStatus::Failed(format!("Failed to delete request: {err}"));
            return Err(err.into());
        }

        self.status = PortalStatus::Succeeded(format!("Request {token} deleted"));
        self.reload().await
    }
}
