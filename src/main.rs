use std::env;
use std::time::Duration;

use clap::Parser;
use config::Config;
use dotenvy::dotenv;

use civic_booking::api::HttpBookingApi;
use civic_booking::cli::{self, Cli};
use civic_booking::models::config::ClientConfig;
use civic_booking::storage::DieselLocalStorage;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Cli::parse();

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        // Add `./config/default.yaml`
        .add_source(config::File::with_name("config/default"))
        // Add environment-specific overrides
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        // Add settings from the environment (with a prefix of APP)
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let client_config = match settings.try_deserialize::<ClientConfig>() {
        Ok(client_config) => client_config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let timeout = client_config.request_timeout_secs.map(Duration::from_secs);
    let api = match HttpBookingApi::new(&client_config.api_url, timeout) {
        Ok(api) => api,
        Err(e) => {
            log::error!("Failed to create API client: {e}");
            std::process::exit(1);
        }
    };

    let storage = match DieselLocalStorage::open(&client_config.storage_url) {
        Ok(storage) => storage,
        Err(e) => {
            log::error!("Failed to open local storage: {e}");
            std::process::exit(1);
        }
    };

    match cli::run(args.command, api, storage, &client_config) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            log::error!("Command failed: {e}");
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
