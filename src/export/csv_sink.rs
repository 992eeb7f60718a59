use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::models::{ExportRow, EXPORT_COLUMNS};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create {path}: {error}")]
    Create { path: String, error: io::Error },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush output: {0}")]
    Flush(io::Error),

    #[error("Output already closed")]
    Closed,
}

/// CSV writer for export rows.
///
/// Rows are buffered. `finish` flushes and hands the underlying writer back;
/// a sink dropped without `finish` (an aborted run) still flushes whatever
/// was written so far, so the file stays valid CSV.
pub struct TradeCsvSink<W: Write> {
    writer: Option<csv::Writer<W>>,
    rows_written: usize,
}

impl TradeCsvSink<File> {
    /// Create (or truncate) the output file
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|error| SinkError::Create {
            path: path.display().to_string(),
            error,
        })?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> TradeCsvSink<W> {
    pub fn from_writer(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);

        Self {
            writer: Some(writer),
            rows_written: 0,
        }
    }

    pub fn write_header(&mut self) -> Result<(), SinkError> {
        self.writer_mut()?.write_record(EXPORT_COLUMNS)?;
        Ok(())
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<(), SinkError> {
        self.writer_mut()?.serialize(row)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush buffered rows and release the writer
    pub fn finish(mut self) -> Result<W, SinkError> {
        let writer = self.writer.take().ok_or(SinkError::Closed)?;
        writer
            .into_inner()
            .map_err(|e| SinkError::Flush(e.into_error()))
    }

    fn writer_mut(&mut self) -> Result<&mut csv::Writer<W>, SinkError> {
        self.writer.as_mut().ok_or(SinkError::Closed)
    }
}

impl<W: Write> Drop for TradeCsvSink<W> {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                log::warn!("Failed to flush partial export: {}", e);
            }
        }
    }
}
