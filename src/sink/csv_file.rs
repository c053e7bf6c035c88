//! Local CSV store.
//!
//! Each append loads the existing rows, adds the new one and rewrites the
//! whole file. There is no locking: two processes appending at the same time
//! can lose a row.

use crate::sink::{Sink, SinkError};
use crate::types::record::{Row, COLUMNS};
use std::fs;
use std::path::{Path, PathBuf};

const BOM: &str = "\u{feff}";

#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored row. A missing or empty file yields no rows.
    pub fn read_rows(&self) -> Result<Vec<Row>, SinkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let body = raw.strip_prefix(BOM).unwrap_or(&raw);
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());
        let headers = reader.headers()?.clone();
        if !headers.iter().eq(COLUMNS.iter().copied()) {
            return Err(SinkError::SchemaMismatch {
                path: self.path.clone(),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        let mut rows = Vec::new();
        for record in reader.deserialize::<Row>() {
            rows.push(record?);
        }
        Ok(rows)
    }

    /// Last `count` rows in file order.
    pub fn tail(&self, count: usize) -> Result<Vec<Row>, SinkError> {
        let mut rows = self.read_rows()?;
        let skip = rows.len().saturating_sub(count);
        Ok(rows.split_off(skip))
    }

    fn write_rows(&self, rows: &[Row]) -> Result<(), SinkError> {
        let mut buffer = BOM.as_bytes().to_vec();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buffer);
            writer.write_record(COLUMNS)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush().map_err(|source| self.io_error(source))?;
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        fs::write(&self.path, buffer).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Sink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn append(&self, row: &Row) -> Result<(), SinkError> {
        let mut rows = self.read_rows()?;
        let created = rows.is_empty() && !self.path.exists();
        rows.push(row.clone());
        self.write_rows(&rows)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = rows.len(),
            created,
            "csv store rewritten"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::questionnaire::Letter;
    use tempfile::TempDir;

    fn sample_row(email: &str, tier: u8, label: &str) -> Row {
        Row {
            timestamp: "2026-05-01T10:00:00".to_string(),
            email: email.to_string(),
            name: "María, \"la jefa\"".to_string(),
            company: "Café Ñandú".to_string(),
            employee_size: "Entre 51 y 250".to_string(),
            sector: "Educación".to_string(),
            q1: Letter::A,
            q2: Letter::B,
            q3: Letter::C,
            q4: Letter::D,
            q5: Letter::C,
            q6: Letter::C,
            q7: Letter::D,
            tier,
            label: label.to_string(),
        }
    }

    #[test]
    fn first_append_creates_file_with_bom_and_header() {
        let dir = TempDir::new().expect("temp dir should be created");
        let sink = CsvSink::new(dir.path().join("nested/out.csv"));
        sink.append(&sample_row("a@example.com", 4, "Sistemático"))
            .expect("append should succeed");

        let raw = fs::read_to_string(sink.path()).expect("file should exist");
        assert!(raw.starts_with(BOM));
        let first_line = raw
            .trim_start_matches(BOM)
            .lines()
            .next()
            .expect("header line");
        assert_eq!(first_line, COLUMNS.join(","));
    }

    #[test]
    fn appended_row_round_trips() {
        let dir = TempDir::new().expect("temp dir should be created");
        let sink = CsvSink::new(dir.path().join("out.csv"));
        let row = sample_row("a@example.com", 4, "Sistemático");
        sink.append(&row).expect("append should succeed");

        let rows = sink.read_rows().expect("rows should read");
        assert_eq!(rows, vec![row]);
    }

    #[test]
    fn header_is_written_once_across_appends() {
        let dir = TempDir::new().expect("temp dir should be created");
        let sink = CsvSink::new(dir.path().join("out.csv"));
        for idx in 0..3 {
            sink.append(&sample_row(&format!("{idx}@example.com"), 3, "Operacional"))
                .expect("append should succeed");
        }

        let raw = fs::read_to_string(sink.path()).expect("file should exist");
        let header_count = raw.lines().filter(|line| line.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        assert_eq!(sink.read_rows().expect("rows should read").len(), 3);
    }

    #[test]
    fn tail_returns_last_rows_in_order() {
        let dir = TempDir::new().expect("temp dir should be created");
        let sink = CsvSink::new(dir.path().join("out.csv"));
        for idx in 0..5 {
            sink.append(&sample_row(&format!("{idx}@example.com"), 1, "Conciencia"))
                .expect("append should succeed");
        }

        let tail = sink.tail(2).expect("tail should read");
        let emails = tail.iter().map(|row| row.email.as_str()).collect::<Vec<_>>();
        assert_eq!(emails, vec!["3@example.com", "4@example.com"]);
        assert_eq!(sink.tail(50).expect("tail should read").len(), 5);
    }

    #[test]
    fn foreign_header_is_rejected_and_left_untouched() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("out.csv");
        fs::write(&path, "id,score\n1,2\n").expect("fixture should write");

        let sink = CsvSink::new(&path);
        let err = sink
            .append(&sample_row("a@example.com", 2, "Activo"))
            .expect_err("mismatched header should fail");
        assert!(matches!(err, SinkError::SchemaMismatch { .. }));
        assert_eq!(
            fs::read_to_string(&path).expect("file should read"),
            "id,score\n1,2\n"
        );
    }

    #[test]
    fn empty_existing_file_gets_a_header() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("out.csv");
        fs::write(&path, "").expect("fixture should write");

        let sink = CsvSink::new(&path);
        sink.append(&sample_row("a@example.com", 5, "Transformacional"))
            .expect("append should succeed");
        assert_eq!(sink.read_rows().expect("rows should read").len(), 1);
    }
}
