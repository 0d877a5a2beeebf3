//! JSON download of the processed table.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::countries::Indicator;
use crate::error::ExportError;
use crate::series::{ChangeMode, TableRow, YearWindow};
use crate::state::DashboardState;

pub const EXPORT_FILE_NAME: &str = "asean-indicator-data.json";

#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub indicator: Indicator,
    pub window: YearWindow,
    pub change: ChangeMode,
    pub filters: DashboardState,
    pub rows: Vec<TableRow>,
}

impl ExportDocument {
    pub fn new(indicator: Indicator, change: ChangeMode, filters: &DashboardState, rows: Vec<TableRow>) -> Self {
        Self {
            generated_at: Utc::now(),
            indicator,
            window: filters.year_range,
            change,
            filters: filters.clone(),
            rows,
        }
    }
}

/// Writes `doc` as pretty-printed JSON, replacing any previous export.
pub fn write_json(path: &Path, doc: &ExportDocument) -> Result<(), ExportError> {
    let text = serde_json::to_string_pretty(doc)?;
    fs::write(path, text).map_err(|source| ExportError::Io { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), rows = doc.rows.len(), "exported table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::series::{Summary, YearValues};
    use serde_json::Value;
    use tempfile::{NamedTempFile, TempDir};

    fn doc() -> ExportDocument {
        let mut values = YearValues::new();
        values.insert(2020, Some(1.5));
        values.insert(2021, None);
        let row = TableRow {
            code: "MY".into(),
            country: "Malaysia".into(),
            values,
            summary: Summary { average: Some(1.5), minimum: Some(1.5), maximum: Some(1.5), change: None },
        };
        let config = Config::default();
        ExportDocument::new(
            Indicator::new("NE.EXP.GNFS.ZS", "Exports"),
            ChangeMode::Absolute,
            &DashboardState::new(&config),
            vec![row],
        )
    }

    #[test]
    fn test_absent_values_export_as_null() {
        let json: Value = serde_json::to_value(doc()).unwrap();
        let row = &json["rows"][0];
        assert_eq!(row["values"]["2020"], 1.5);
        assert!(row["values"]["2021"].is_null());
        assert!(row["summary"]["change"].is_null());
        assert_eq!(json["change"], "absolute");
        assert_eq!(json["window"]["start"], 2011);
    }

    #[test]
    fn test_write_json_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(EXPORT_FILE_NAME);
        write_json(&path, &doc()).unwrap();
        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["rows"][0]["country"], "Malaysia");
    }

    #[test]
    fn test_export_replaces_previous_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "stale").unwrap();
        write_json(file.path(), &doc()).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with('{'));
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let err = write_json(Path::new("/nonexistent/dir/out.json"), &doc()).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
