use collection_booking::{
    api_client::ApiClient, cli, configuration::Configuration,
    configuration_handler::ConfigurationHandler,
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let backend = match ApiClient::new(&configuration.api_base_url()) {
        Ok(backend) => backend,
        Err(err) => {
            error!(?err, "Failed to configure Booking API client");
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(api = %backend.base_url(), "Using Booking API");

    match cli::run(backend, configuration.command()).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
