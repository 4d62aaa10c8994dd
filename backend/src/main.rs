//! Entry-point: loads configuration, installs logging and serves the
//! contacts resource with OpenAPI docs in debug builds.

mod server;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use api_protocol::config::{ProtocolConfig, ProtocolSettings};
use ortho_config::OrthoConfig;

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

    let settings = ProtocolSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let config =
        ProtocolConfig::try_from(&settings).wrap_err("invalid protocol configuration")?;
    info!(
        production_mode = config.production_mode(),
        strict_validation = config.strict_validation(),
        bind_addr = %config.bind_addr(),
        "starting server"
    );

    let server = server::create_server(&config).wrap_err("failed to start server")?;
    server.await.wrap_err("server terminated with an error")
}
