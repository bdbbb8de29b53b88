//! CSV loading into untyped tables.
//!
//! Cells are kept as strings; typing happens once in [`crate::schema`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use multiomix_common::{MultiomixError, RawTable, Result};

/// Read a CSV stream with a header row.
///
/// Header names are trimmed (and a UTF-8 BOM stripped). Short rows are padded
/// with empty cells and long rows truncated to the header width.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(MultiomixError::Other(anyhow::anyhow!("CSV input has no header row")));
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().take(width).map(String::from).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    debug!(columns = width, rows = rows.len(), "CSV table loaded");
    Ok(RawTable { headers, rows })
}

/// Read a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        MultiomixError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
    })?;
    read_csv(file)
}
