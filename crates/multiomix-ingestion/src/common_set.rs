//! Genes shared by all three filtered omics tables.

use tracing::info;

use multiomix_common::{FilteredTable, GeneSet};

/// `genes(genomics) ∩ genes(transcriptomics) ∩ genes(proteomics)`.
///
/// Duplicates inside a table collapse. An empty result is a valid outcome.
pub fn resolve(
    genomics: &FilteredTable,
    transcriptomics: &FilteredTable,
    proteomics: &FilteredTable,
) -> GeneSet {
    let common = genomics
        .genes()
        .intersection(&transcriptomics.genes())
        .intersection(&proteomics.genes());

    info!(
        genomics = genomics.len(),
        transcriptomics = transcriptomics.len(),
        proteomics = proteomics.len(),
        common = common.len(),
        "Common gene set resolved"
    );
    common
}
