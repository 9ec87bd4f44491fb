//! Headless performance monitor.
//!
//! Samples host metrics and logs every state change. Reads
//! `<config_dir>/perfmon/config.json`; `PERFMON_SAMPLE_INTERVAL_MS` overrides
//! the interval and `RUST_LOG` the log filter.

mod host;
mod probes;

use anyhow::Context;
use perfmon_application::{Collaborators, MonitorConfig, PerformanceMonitor};
use perfmon_events::TracingEventBus;
use perfmon_metrics::CompositeSource;
use perfmon_platform::NullPlatform;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,perfmon=debug")),
        )
        .init();

    let config = MonitorConfig::load_default().context("failed to load perfmon config")?;
    tracing::info!(platform = %config.platform, "Starting perfmon headless");

    let null = Arc::new(NullPlatform);
    let collaborators = Collaborators {
        overlay: Some(null.clone()),
        monitor: Some(null.clone()),
        system_settings: Some(null),
        notifications: Some(Arc::new(host::LogNotifications)),
    };

    let source = CompositeSource::new(probes::host_probes());
    let monitor = PerformanceMonitor::builder(config, Arc::new(source))
        .collaborators(collaborators)
        .event_bus(Arc::new(TracingEventBus))
        .build()
        .context("failed to build performance monitor")?;

    monitor.initialize().await;
    let overlay = monitor.request_overlay_permission().await;
    let usage = monitor.request_usage_stats_permission().await;
    tracing::info!(overlay = overlay.label(), usage_stats = usage.label(), "permissions");

    monitor
        .start_monitoring()
        .await
        .context("failed to start monitoring")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    if let Some(frame) = monitor.overlay_frame() {
        for row in &frame.rows {
            tracing::info!(metric = row.label, value = row.value, "last reading");
        }
    }
    monitor.shutdown().await;
    Ok(())
}
