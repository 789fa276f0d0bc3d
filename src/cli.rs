use crate::backend::BookingBackend;
use crate::citizen::CitizenPortal;
use crate::error::{FormError, PortalError};
use crate::staff::{RequestFilter, StaffDashboard};
use crate::timeslots::parse_slot;
use crate::types::{BookingState, PortalStatus};
use crate::view::{
    render_booking, render_request_table, render_slot_board, render_statistics, render_status,
};
use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;
use tracing::{error, warn};

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    parse_slot(value).map_err(|err| err.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Citizen(CitizenCommand),
    /// Request management for staff
    #[command(subcommand)]
    Staff(StaffCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CitizenCommand {
    /// List the municipalities served
    Municipalities,
    /// Show the collection slots of a day
    Slots {
        #[arg(long)]
        municipality: String,
        /// Collection day, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
    /// Book a collection
    Book {
        #[arg(long)]
        municipality: String,
        #[arg(long)]
        date: NaiveDate,
        /// Slot start, HH:MM
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        #[arg(long)]
        address: String,
        /// Items to collect
        #[arg(long)]
        description: String,
    },
    /// Show a booking by its token
    Lookup { token: String },
    /// Change address, description or time slot of a booking
    Edit {
        token: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a booking
    Delete { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum StaffCommand {
    /// List requests with statistics
    List {
        #[arg(long)]
        municipality: Option<String>,
        #[arg(long)]
        state: Option<BookingState>,
    },
    /// Show all details of a request
    Show { token: String },
    /// Set the state of a request
    Update { token: String, state: BookingState },
    /// Delete a request
    Delete { token: String },
}

/// Runs one command against a freshly loaded portal. The error is the banner to show.
pub async fn run<B: BookingBackend>(backend: B, command: Command) -> Result<String, String> {
    match command {
        Command::Staff(command) => {
            let mut dashboard = StaffDashboard::new(backend);
            let result = run_staff(&mut dashboard, command).await;
            result.map_err(|err| banner(dashboard.status(), err))
        }
        Command::Citizen(command) => {
            let mut portal = CitizenPortal::new(backend);
            let result = run_citizen(&mut portal, command).await;
            result.map_err(|err| banner(portal.status(), err))
        }
    }
}

fn banner(status: &PortalStatus, err: PortalError) -> String {
    if err.is_not_found() {
        warn!("Command failed, booking not found");
    } else {
        error!(?err, "Command failed");
    }
    match status {
        PortalStatus::Failed(message) => message.clone(),
        _ => err.to_string(),
    }
}

async fn run_citizen<B: BookingBackend>(
    portal: &mut CitizenPortal<B>,
    command: CitizenCommand,
) -> Result<String, PortalError> {
    match command {
        CitizenCommand::Municipalities => {
            portal.load_municipalities().await?;
            Ok(portal.municipalities().join("\n"))
        }
        CitizenCommand::Slots { municipality, date } => {
            portal.load_municipalities().await?;
            portal.select_municipality(&municipality).await?;
            Ok(render_slot_board(portal.select_date(date).await?))
        }
        CitizenCommand::Book {
            municipality,
            date,
            time,
            address,
            description,
        } => {
            portal.load_municipalities().await?;
            portal.select_municipality(&municipality).await?;
            portal.select_date(date).await?;
            portal.select_slot(time)?;
            let token = portal.submit(&address, &description).await?;
            Ok(format!(
                "Booking confirmed. Your token: {token}\nKeep it to look up, edit or delete the request."
            ))
        }
        CitizenCommand::Lookup { token } => Ok(render_booking(portal.lookup(&token).await?)),
        CitizenCommand::Edit {
            token,
            date,
            time,
            address,
            description,
        } => {
            portal.lookup(&token).await?;
            let booking = portal.open_edit().await?.booking().clone();
            if let Some(date) = date {
                portal.edit_select_date(date).await?;
            }
            if let Some(time) = time {
                portal.edit_select_slot(time)?;
            }
            let address = address.unwrap_or(booking.address);
            let description = description.unwrap_or(booking.item_description);
            let updated = portal.submit_edit(&address, &description).await?;
            Ok(format!(
                "Request updated successfully!\n{}",
                render_booking(updated)
            ))
        }
        CitizenCommand::Delete { token } => {
            portal.lookup(&token).await?;
            portal.delete().await?;
            Ok(render_status(portal.status()).unwrap_or_default())
        }
    }
}

async fn run_staff<B: BookingBackend>(
    dashboard: &mut StaffDashboard<B>,
    command: StaffCommand,
) -> Result<String, PortalError> {
    dashboard.load().await?;

    match command {
        StaffCommand::List {
            municipality,
            state,
        } => {
            if let Some(municipality) = &municipality {
                if !dashboard.municipalities().is_empty()
                    && !dashboard.municipalities().contains(municipality)
                {
                    return Err(FormError::UnknownMunicipality(municipality.clone()).into());
                }
            }
            dashboard.set_filter(RequestFilter {
                municipality,
                state,
            });
            Ok(format!(
                "{}\n\n{}",
                render_statistics(&dashboard.statistics()),
                render_request_table(&dashboard.filtered())
            ))
        }
        StaffCommand::Show { token } => dashboard
            .request(&token)
            .map(render_booking)
            .ok_or_else(|| FormError::UnknownRequest(token).into()),
        StaffCommand::Update { token, state } => {
            dashboard.update_status(&token, state).await?;
            Ok(render_status(dashboard.status()).unwrap_or_default())
        }
        StaffCommand::Delete { token } => {
            dashboard.delete(&token).await?;
            Ok(render_status(dashboard.status()).unwrap_or_default())
        }
    }
}
