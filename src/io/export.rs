//! Export the combined history + forecast series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per period, header included, no index column. Only the export view is
//! accepted here; the display view repeats a period and would corrupt readers.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{ExportView, Provenance};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Period")]
    period: i32,
    #[serde(rename = "Value")]
    value: f64,
    #[serde(rename = "ProvenanceTag")]
    provenance: Provenance,
}

/// Write the export view to `path` (overwrites).
pub fn write_export_csv(path: &Path, view: &ExportView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_export(file, view)
}

/// Write the export view to any writer.
pub fn write_export<W: std::io::Write>(writer: W, view: &ExportView) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in &view.rows {
        wtr.serialize(ExportRow {
            period: row.point.period,
            value: row.point.value,
            provenance: row.provenance,
        })
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SeriesPoint, TaggedPoint};

    #[test]
    fn csv_has_header_and_one_row_per_entry() {
        let view = ExportView {
            rows: vec![
                TaggedPoint::new(SeriesPoint { period: 2020, value: 1.5 }, Provenance::Source),
                TaggedPoint::new(SeriesPoint { period: 2021, value: 2.25 }, Provenance::Forecast),
            ],
        };
        let mut buf = Vec::new();
        write_export(&mut buf, &view).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Period,Value,ProvenanceTag\n2020,1.5,source\n2021,2.25,forecast\n"
        );
    }

    #[test]
    fn file_export_round_trips_through_csv_reader() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path();
        let view = ExportView {
            rows: vec![TaggedPoint::new(SeriesPoint { period: 1999, value: 10.0 }, Provenance::Source)],
        };
        write_export_csv(path, &view).unwrap();

        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Period", "Value", "ProvenanceTag"]);
        assert_eq!(rdr.records().count(), 1);
    }
}
