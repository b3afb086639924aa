//! Logging initialization, with an optional OpenTelemetry bridge.

use campusconnect_error::{ServerError, ServerErrorKind};
use campusconnect_server::LoggingSettings;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps telemetry providers alive; flushes spans when dropped.
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    #[cfg(feature = "observability")]
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "observability")]
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush telemetry: {}", e);
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level; `verbose` raises the
/// configured level to `debug`. With the `observability` feature, spans are
/// also exported through OpenTelemetry to stdout.
///
/// # Errors
///
/// Returns a telemetry error if the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(settings: &LoggingSettings, verbose: bool) -> Result<TelemetryGuard, ServerError> {
    let level = if verbose { "debug" } else { settings.level.as_str() };

    // Setup environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| telemetry_error(format!("invalid log filter {:?}: {}", level, e)))?;

    // Create fmt layer based on configuration
    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    #[cfg(feature = "observability")]
    let (otel_layer, provider) = {
        use opentelemetry::{KeyValue, global, trace::TracerProvider};
        use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};

        let resource = Resource::builder()
            .with_service_name("campusconnect")
            .with_attributes(vec![KeyValue::new(
                "service.version",
                env!("CARGO_PKG_VERSION"),
            )])
            .build();

        // Stdout exporter for development
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .with_resource(resource)
            .build();
        global::set_tracer_provider(provider.clone());

        let layer = tracing_opentelemetry::layer().with_tracer(provider.tracer("campusconnect"));
        (Some(layer), Some(provider))
    };

    #[cfg(not(feature = "observability"))]
    let otel_layer: Option<tracing_subscriber::layer::Identity> = None;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| telemetry_error(e.to_string()))?;

    Ok(TelemetryGuard {
        #[cfg(feature = "observability")]
        provider,
    })
}

#[track_caller]
fn telemetry_error(message: String) -> ServerError {
    ServerError::new(ServerErrorKind::Telemetry(message))
}
