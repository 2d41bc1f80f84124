use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ecofy_weather::{EcofyConfig, WeatherApiClient, WeatherService, telemetry, web};

/// Weather forecast service for the Ecofy platform
#[derive(Debug, Parser)]
#[command(name = "ecofy-weather", version, about)]
struct Cli {
    /// Configuration file; defaults to <config dir>/ecofy/weather.toml
    #[arg(long, env = "ECOFY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EcofyConfig::load_from_path(cli.config)?;

    let _telemetry = telemetry::init(&config.logging)?;
    tracing::info!(
        "Starting ecofy-weather {} against {}",
        ecofy_weather::VERSION,
        config.weather.base_url
    );

    let client = WeatherApiClient::new(&config)?;
    let service = WeatherService::new(Arc::new(client));

    web::run(&config.server, service).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag() {
        let cli = Cli::try_parse_from(["ecofy-weather", "--config", "/etc/ecofy/weather.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ecofy/weather.toml")));
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["ecofy-weather", "--port", "9000"]).is_err());
    }
}
