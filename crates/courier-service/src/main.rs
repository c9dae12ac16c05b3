//! Main entry point for the courier backend service.
//!
//! Loads configuration, wires the configured storage backend and payment
//! provider into the core handlers, and serves the rider API.

use clap::Parser;
use courier_config::Config;
use courier_service::{factories, server};
use std::path::PathBuf;

/// Command-line arguments for the courier service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path)?;
	tracing::info!("Loaded configuration from {}", config_path);

	let state = factories::build_state(&config)?;
	server::start_server(&config.server, state).await?;

	tracing::info!("Stopped courier service");
	Ok(())
}
