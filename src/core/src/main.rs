use log::{error, info};
use serialsniff::configuration::Config;
use serialsniff::controller::Controller;

#[tokio::main]
async fn main() {
    // Capture dumps go to stdout; diagnostics go to stderr through env_logger.
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    let config = Config::from_args();

    let controller = Controller::new(config).unwrap_or_else(|e| {
        error!("Unable to load configuration: {}, exiting...", e);
        std::process::exit(1);
    });

    info!("Configuration loaded successfully");

    match controller.run().await {
        Ok(summary) => info!(
            "Session {} finished after {}",
            summary.session_id, summary.duration
        ),
        Err(e) => {
            error!("Error occured while sniffing: {}, exiting...", e);
            std::process::exit(1);
        }
    }
}
