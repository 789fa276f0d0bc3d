//! Text rendering of the citizen and staff views.
//!
//! Everything here is a pure function of controller state, so the same
//! view-models can back any front end.

use crate::staff::RequestStatistics;
use crate::timeslots::SlotBoard;
use crate::types::{Booking, BookingState, PortalStatus};
use chrono::NaiveDateTime;
use std::fmt::Write;

const SHORT_TOKEN_LENGTH: usize = 8;
const SLOTS_PER_ROW: usize = 3;

pub fn state_label(state: BookingState) -> &'static str {
    match state {
        BookingState::Received => "Received",
        BookingState::Assigned => "Assigned",
        BookingState::InProgress => "In Progress",
        BookingState::Completed => "Completed",
        BookingState::Cancelled => "Cancelled",
    }
}

pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%d/%m/%Y, %H:%M").to_string()
}

pub fn short_token(token: &str) -> String {
    match token.char_indices().nth(SHORT_TOKEN_LENGTH) {
        Some((end, _)) => format!("{}...", &token[..end]),
        None => token.to_string(),
    }
}

pub fn render_status(status: &PortalStatus) -> Option<String> {
    match status {
        PortalStatus::Idle => None,
        PortalStatus::Loading => Some("Loading...".into()),
        PortalStatus::Succeeded(message) => Some(format!("Success: {message}")),
        PortalStatus::Failed(message) => Some(format!("Error: {message}")),
    }
}

/// One cell per slot: `[ 10:00 ]` free, `[*10:00*]` selected, `[ ----- ]` booked.
pub fn render_slot_board(board: &SlotBoard) -> String {
    let mut output = format!("Time slots for {}\n", board.date().format("%d/%m/%Y"));
    for row in board.slots().chunks(SLOTS_PER_ROW) {
        let cells: Vec<String> = row
            .iter()
            .map(|slot| {
                if slot.booked {
                    "[ ----- ]".to_string()
                } else if board.selected() == Some(slot.time) {
                    format!("[*{}*]", slot.label())
                } else {
                    format!("[ {} ]", slot.label())
                }
            })
            .collect();
        let _ = writeln!(output, "{}", cells.join(" "));
    }
    let _ = write!(
        output,
        "{} of {} slots available",
        board.available().count(),
        board.slots().len()
    );
    output
}

pub fn render_booking(booking: &Booking) -> String {
    let rows = [
        ("Token", booking.token.clone()),
        ("Status", state_label(booking.state).to_string()),
        ("Municipality", booking.municipality.clone()),
        ("Address", booking.address.clone()),
        ("Collection Time Slot", format_datetime(&booking.time_slot)),
        ("Item Description", booking.item_description.clone()),
        ("Request Submitted", format_datetime(&booking.date)),
    ];

    rows.iter()
        .map(|(label, value)| format!("{label:<22}{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_request_table(requests: &[&Booking]) -> String {
    if requests.is_empty() {
        return "No requests found".into();
    }

    let mut output = format!(
        "{:<12} {:<20} {:<30} {:<18} {}\n",
        "TOKEN", "MUNICIPALITY", "ADDRESS", "TIME SLOT", "STATUS"
    );
    for request in requests {
        let _ = writeln!(
            output,
            "{:<12} {:<20} {:<30} {:<18} {}",
            short_token(&request.token),
            request.municipality,
            request.address,
            format_datetime(&request.time_slot),
            state_label(request.state)
        );
    }
    output.pop();
    output
}

pub fn render_statistics(statistics: &RequestStatistics) -> String {
    format!(
        "Total: {}  Assigned: {}  In Progress: {}  Completed: {}",
        statistics.total, statistics.assigned, statistics.in_progress, statistics.completed
    )
}
