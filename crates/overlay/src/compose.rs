//! Read-side overlay composition.

use perfmon_metrics::{MetricKind, MetricSnapshot};
use perfmon_settings::OverlaySettings;
use serde::Serialize;

/// A single labelled metric line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRow {
    pub kind: MetricKind,
    pub label: &'static str,
    pub value: f64,
}

/// Everything an overlay renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub rows: Vec<OverlayRow>,
    pub opacity: f64,
    pub dark: bool,
    pub landscape: bool,
    pub pinned: bool,
}

impl OverlayFrame {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn display_label(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Fps => "FPS",
        MetricKind::Cpu => "CPU %",
        MetricKind::Gpu => "GPU %",
        MetricKind::Temp => "TEMP °C",
        MetricKind::Ram => "RAM %",
    }
}

fn is_shown(settings: &OverlaySettings, kind: MetricKind) -> bool {
    match kind {
        MetricKind::Fps => settings.show_fps,
        MetricKind::Cpu => settings.show_cpu,
        MetricKind::Gpu => settings.show_gpu,
        MetricKind::Temp => settings.show_temp,
        MetricKind::Ram => settings.show_ram,
    }
}

/// Build the overlay frame for `snapshot` under `settings`.
///
/// Rows follow [`MetricKind::ALL`] order and only include enabled metrics.
/// A hidden overlay has no rows.
pub fn compose_overlay(settings: &OverlaySettings, snapshot: &MetricSnapshot) -> OverlayFrame {
    let rows = if settings.is_visible {
        MetricKind::ALL
            .into_iter()
            .filter(|kind| is_shown(settings, *kind))
            .map(|kind| OverlayRow {
                kind,
                label: display_label(kind),
                value: snapshot.get(kind),
            })
            .collect()
    } else {
        Vec::new()
    };

    OverlayFrame {
        rows,
        opacity: settings.transparency,
        dark: settings.is_dark_mode,
        landscape: settings.is_landscape,
        pinned: settings.is_pinned,
    }
}
