use crate::api_client::DEFAULT_API_BASE_URL;
use crate::cli::Command;
use crate::configuration::Configuration;
use clap::Parser;
use tracing::debug;

/// Citizen bookings and staff request management for municipal waste collection
#[derive(Debug, Clone, Parser)]
#[command(name = "collection-booking", version)]
pub struct ConfigurationHandler {
    /// Base url of the Booking API
    #[arg(long, env = "BOOKING_API_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            debug!(?err, "No .env file loaded");
        }
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn api_base_url(&self) -> String {
        self.api_url.clone()
    }

    fn command(&self) -> Command {
        self.command.clone()
    }
}
