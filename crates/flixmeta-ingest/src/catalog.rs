//! Catalog file loading and enriched CSV output

use crate::error::Result;
use flixmeta_common::{EnrichedRecord, SourceRecord};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Load catalog records from `path`.
///
/// The file is ISO-8859-1 encoded, one `catalog_id,year,title` record per
/// line. Blank lines are skipped. With `limit` set, only the first `limit`
/// lines are read.
pub fn load_catalog(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<SourceRecord>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let text = decode_latin1(&bytes);

    let records = parse_catalog(&text, limit)?;
    info!(path = %path.display(), records = records.len(), "Loaded catalog");

    Ok(records)
}

/// Parse catalog text already decoded to UTF-8.
pub fn parse_catalog(text: &str, limit: Option<usize>) -> Result<Vec<SourceRecord>> {
    let lines = text.lines().take(limit.unwrap_or(usize::MAX));

    let mut records = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        records.push(SourceRecord::parse_line(line, index + 1)?);
    }

    Ok(records)
}

/// Every ISO-8859-1 byte maps to the Unicode code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Streams enriched rows to a CSV destination, flushing after each row
pub struct CatalogWriter<W: Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl CatalogWriter<File> {
    /// Create (or truncate) the output file at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> CatalogWriter<W> {
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new().has_headers(false).from_writer(inner);
        Self { writer, written: 0 }
    }

    /// Write one row and flush it to the destination.
    pub fn write(&mut self, record: &EnrichedRecord) -> Result<()> {
        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.to_string()).into())
    }
}

/// Write all `records` to `path`.
pub fn store_catalog(path: impl AsRef<Path>, records: &[EnrichedRecord]) -> Result<()> {
    let mut writer = CatalogWriter::create(path.as_ref())?;
    for record in records {
        writer.write(record)?;
    }
    info!(path = %path.as_ref().display(), rows = writer.written(), "Wrote enriched catalog");
    Ok(())
}
