//! Logging for the spendctl binary
//!
//! One subscriber stack: `EnvFilter` → compact console output → (optional)
//! OTLP span export. Export needs the `telemetry` cargo feature plus `--otel`.
//!
//! Environment:
//!   RUST_LOG                      filter directives; wins over `--debug`
//!   OTEL_EXPORTER_OTLP_ENDPOINT   collector address (default http://localhost:4317)
//!   OTEL_SERVICE_NAME             reported service name (default spendctl)

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Flags from the command line that shape logging
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    pub debug: bool,
    pub otel: bool,
}

impl TracingConfig {
    fn default_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_level()))
    }
}

/// Keeps span export alive; dropping it flushes anything still buffered.
#[must_use = "dropping the guard stops span export"]
pub struct TracingGuard {
    #[cfg_attr(not(feature = "telemetry"), allow(dead_code))]
    exporting: bool,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        #[cfg(feature = "telemetry")]
        if self.exporting {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Install the global subscriber. Call once, before any command runs.
pub fn init(config: &TracingConfig) -> Result<TracingGuard> {
    let registry = tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt::layer().with_target(config.debug).compact());

    #[cfg(feature = "telemetry")]
    let (registry, exporting) = {
        let layer = if config.otel {
            Some(otlp::layer()?)
        } else {
            None
        };
        let exporting = layer.is_some();
        (registry.with(layer), exporting)
    };

    #[cfg(not(feature = "telemetry"))]
    let exporting = {
        if config.otel {
            eprintln!("--otel ignored: spendctl was built without the `telemetry` feature");
        }
        false
    };

    registry.try_init().map_err(|err| anyhow!(err))?;

    #[cfg(feature = "telemetry")]
    if exporting {
        tracing::info!(
            endpoint = %otlp::endpoint(),
            service = %otlp::service_name(),
            "exporting spans over OTLP"
        );
    }

    Ok(TracingGuard { exporting })
}

#[cfg(feature = "telemetry")]
mod otlp {
    use anyhow::{Context, Result};
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{Tracer, TracerProvider};
    use opentelemetry_sdk::{runtime, Resource};
    use tracing::Subscriber;
    use tracing_opentelemetry::OpenTelemetryLayer;
    use tracing_subscriber::registry::LookupSpan;

    pub fn endpoint() -> String {
        std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4317".to_owned())
    }

    pub fn service_name() -> String {
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "spendctl".to_owned())
    }

    /// Batch-exporting layer; the provider is registered globally so the
    /// guard can shut it down.
    pub fn layer<S>() -> Result<OpenTelemetryLayer<S, Tracer>>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint())
            .build()
            .context("Failed to create OTLP exporter")?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                service_name(),
            )]))
            .build();

        let tracer = provider.tracer("spendctl");
        let _ = opentelemetry::global::set_tracer_provider(provider);

        Ok(tracing_opentelemetry::layer().with_tracer(tracer))
    }
}
