//! Threshold filtering of measurement tables.

use tracing::{debug, instrument};

use multiomix_common::entities::coerce_numeric;
use multiomix_common::{FilteredTable, MeasurementTable, MultiomixError, Result, ThresholdConfig};

/// Keep the rows whose `numeric_column` holds a number `>= threshold`.
///
/// The source's own measurement column is read from the typed
/// `MeasurementRow::value`; any other column is parsed from its cells.
/// Rows keep every column and their original order. Missing or
/// unparseable values never pass; they are counted in `coerced_missing`.
#[instrument(skip(table), fields(table = %table.source, rows = table.len()))]
pub fn filter(table: &MeasurementTable, numeric_column: &str, threshold: f64) -> Result<FilteredTable> {
    if !threshold.is_finite() {
        return Err(MultiomixError::Config(format!(
            "{numeric_column} threshold must be finite, got {threshold}"
        )));
    }

    let cell_idx = if numeric_column == table.source.numeric_column() {
        None
    } else {
        let idx = table
            .column_index(numeric_column)
            .ok_or_else(|| MultiomixError::schema(table.source.as_str(), numeric_column))?;
        Some(idx)
    };

    let mut coerced_missing = 0usize;
    let rows = table
        .rows
        .iter()
        .filter(|row| {
            let value = match cell_idx {
                None => row.value,
                Some(idx) => row.cells.get(idx).and_then(|c| coerce_numeric(c)),
            };
            match value {
                Some(v) => v >= threshold,
                None => {
                    coerced_missing += 1;
                    false
                }
            }
        })
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        kept = rows.len(),
        dropped = table.len() - rows.len(),
        coerced_missing,
        threshold,
        "Threshold filter applied"
    );

    Ok(FilteredTable {
        source: table.source,
        column: numeric_column.to_string(),
        threshold,
        headers: table.headers.clone(),
        rows,
        coerced_missing,
        total_rows: table.len(),
    })
}

/// Filter a table on its source's measurement column with the configured threshold.
pub fn filter_source(table: &MeasurementTable, thresholds: &ThresholdConfig) -> Result<FilteredTable> {
    filter(table, table.source.numeric_column(), thresholds.for_source(table.source))
}
