//! CSV export of frame records.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::tracker::FrameRecord;

#[derive(Debug, Serialize)]
struct CsvRow {
    frame_index: u64,
    x_centroid: String,
    y_centroid: String,
    visibility_flag: u8,
}

impl From<&FrameRecord> for CsvRow {
    fn from(record: &FrameRecord) -> Self {
        let (x_centroid, y_centroid) = match record.position {
            Some(p) => (format!("{:.1}", p.x), format!("{:.1}", p.y)),
            None => ("-1".to_string(), "-1".to_string()),
        };
        Self {
            frame_index: record.frame_index,
            x_centroid,
            y_centroid,
            visibility_flag: u8::from(record.visible()),
        }
    }
}

/// Write `records` with a header row: frame_index, x_centroid, y_centroid,
/// visibility_flag. Unknown coordinates are written as `-1`.
pub fn write_csv<W: Write>(records: &[FrameRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["frame_index", "x_centroid", "y_centroid", "visibility_flag"])?;
    }
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_path(records: &[FrameRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(records, std::fs::File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn render(records: &[FrameRecord]) -> String {
        let mut buf = Vec::new();
        write_csv(records, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_schema_and_sentinel() {
        let records = [
            FrameRecord::detected(0, Point2::new(15.0, 15.0)),
            FrameRecord::interpolated(1, Point2::new(20.04, 0.0)),
            FrameRecord::lost(2),
        ];

        assert_eq!(
            render(&records),
            "frame_index,x_centroid,y_centroid,visibility_flag\n\
             0,15.0,15.0,1\n\
             1,20.0,0.0,0\n\
             2,-1,-1,0\n"
        );
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(
            render(&[]),
            "frame_index,x_centroid,y_centroid,visibility_flag\n"
        );
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations").join("clip.csv");
        write_csv_path(&[FrameRecord::lost(0)], &path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.ends_with("0,-1,-1,0\n"));
    }
}
