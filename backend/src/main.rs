//! Registration service entry-point: loads settings, wires adapters, and
//! serves the REST API with OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use registration::inbound::http::health::HealthState;
use registration::settings::RegistrationSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = RegistrationSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load registration settings")?;
    let config = settings
        .validate()
        .wrap_err("invalid registration settings")?;
    let server_config = ServerConfig::new(config);
    info!(bind_addr = %server_config.bind_addr(), "starting registration service");

    let health_state = web::Data::new(HealthState::new());
    let server =
        create_server(health_state, server_config).wrap_err("failed to start HTTP server")?;
    server.await.wrap_err("HTTP server terminated")
}
