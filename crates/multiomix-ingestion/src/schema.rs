//! Schema validation: raw CSV tables into typed measurement tables.

use tracing::warn;

use multiomix_common::entities::{coerce_numeric, GENE_COLUMN, PROTEIN_COLUMN};
use multiomix_common::{MeasurementRow, MeasurementTable, MultiomixError, OmicsSource, RawTable, Result};

/// Check the required columns of `source` and type every row.
///
/// A missing column is a `Schema` error for this table only. Gene and
/// protein ids are trimmed; a blank protein is `None`. Numeric cells that
/// do not parse become `None`, never an error.
pub fn validate_table(source: OmicsSource, raw: &RawTable) -> Result<MeasurementTable> {
    for column in source.required_columns() {
        if raw.column_index(column).is_none() {
            warn!(table = %source, column, "Required column missing");
            return Err(MultiomixError::schema(source.as_str(), *column));
        }
    }

    let gene_idx = raw.column_index(GENE_COLUMN).ok_or_else(|| MultiomixError::schema(source.as_str(), GENE_COLUMN))?;
    let value_idx = raw
        .column_index(source.numeric_column())
        .ok_or_else(|| MultiomixError::schema(source.as_str(), source.numeric_column()))?;
    let protein_idx = match source {
        OmicsSource::Proteomics => raw.column_index(PROTEIN_COLUMN),
        _ => None,
    };

    let rows: Vec<MeasurementRow> = raw
        .rows
        .iter()
        .map(|cells| MeasurementRow {
            gene: cell(cells, gene_idx).unwrap_or_default().to_string(),
            protein: protein_idx
                .and_then(|i| cell(cells, i))
                .filter(|p| !p.is_empty())
                .map(String::from),
            value: cell(cells, value_idx).and_then(coerce_numeric),
            cells: cells.clone(),
        })
        .collect();

    Ok(MeasurementTable {
        source,
        headers: raw.headers.clone(),
        rows,
    })
}

fn cell(cells: &[String], idx: usize) -> Option<&str> {
    cells.get(idx).map(|c| c.trim())
}
