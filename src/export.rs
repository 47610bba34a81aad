//! JSON export of the current dashboard state.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::ActionError;
use crate::source::StaticInfo;
use crate::tracker::MetricsView;

/// Default file name for in-app exports.
pub const DEFAULT_EXPORT_PATH: &str = "sysdash_export.json";

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    /// Unix seconds.
    exported_at: u64,
    source: &'a str,
    #[serde(flatten)]
    view: &'a MetricsView,
    static_info: Option<&'a StaticInfo>,
}

/// Render the view and static info as pretty JSON.
pub fn to_json(
    view: &MetricsView,
    static_info: Option<&StaticInfo>,
    source: &str,
) -> Result<String, ActionError> {
    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let document = ExportDocument {
        exported_at,
        source,
        view,
        static_info,
    };

    serde_json::to_string_pretty(&document).map_err(|e| ActionError::Export(e.to_string()))
}

/// Write the export document to `path`, replacing any existing file.
pub fn write_export(
    path: &Path,
    view: &MetricsView,
    static_info: Option<&StaticInfo>,
    source: &str,
) -> Result<(), ActionError> {
    let json = to_json(view, static_info, source)?;
    std::fs::write(path, json)
        .map_err(|e| ActionError::Export(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::source::{CounterSnapshot, Gauges, ScriptedSource};
    use crate::tracker::{Sampler, SamplerConfig};

    fn sampled_view() -> MetricsView {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(12.0, 34.0), CounterSnapshot::network(0, 0))
            .push_reading(Gauges::new(56.0, 78.0), CounterSnapshot::network(1_048_576, 0));
        let mut sampler = Sampler::new(Box::new(source), SamplerConfig::default());
        let start = Instant::now();
        sampler.sample_at(start);
        sampler.sample_at(start + std::time::Duration::from_secs(1))
    }

    #[test]
    fn export_contains_values_and_histories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        write_export(&path, &sampled_view(), None, "scripted").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["source"], "scripted");
        assert_eq!(json["seq"], 2);
        assert_eq!(json["current"]["cpu_percent"], 56.0);
        assert_eq!(json["current"]["throughput"]["net_sent"], 1.0);
        assert_eq!(json["history"]["cpu"], serde_json::json!([12.0, 56.0]));
        assert_eq!(json["health"]["degraded"], false);
        assert!(json["static_info"].is_null());
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let err = write_export(
            Path::new("/nonexistent/dir/export.json"),
            &sampled_view(),
            None,
            "scripted",
        )
        .unwrap_err();
        assert!(matches!(err, ActionError::Export(_)));
    }
}
