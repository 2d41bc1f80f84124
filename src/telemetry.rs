//! Logging and trace export setup

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "ecofy-weather";

/// Flushes exported spans when dropped
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down trace exporter: {e}");
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let tracer_provider = config
        .otlp_endpoint
        .as_deref()
        .map(tracer_provider)
        .transpose()?;

    let otel_layer = tracer_provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    let registry = tracing_subscriber::registry().with(filter).with(otel_layer);

    if config.format == "json" {
        registry
            .with(fmt::layer().json())
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        registry
            .with(fmt::layer().pretty())
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!("Exporting traces to {}", endpoint);
    }

    Ok(TelemetryGuard { tracer_provider })
}

fn tracer_provider(endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build())
}
