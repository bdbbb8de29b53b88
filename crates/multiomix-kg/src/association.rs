//! Per-gene association rollup.
//!
//! Every common gene gets exactly one row, even with no hits. Each category
//! is a sorted set rendered as a `"; "`-joined string.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use multiomix_common::{EnrichmentTable, FilteredTable, GeneSet, TermCategory};

pub const ASSOCIATION_SEPARATOR: &str = "; ";

/// Column headers of the rendered association table.
pub const ASSOCIATION_HEADERS: [&str; 5] = ["Gene", "Proteins", "Pathways", "Metabolites", "Diseases"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRow {
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "Proteins")]
    pub proteins: String,
    #[serde(rename = "Pathways")]
    pub pathways: String,
    #[serde(rename = "Metabolites")]
    pub metabolites: String,
    #[serde(rename = "Diseases")]
    pub diseases: String,
}

impl AssociationRow {
    /// Rendered value of a category column.
    pub fn category(&self, category: TermCategory) -> &str {
        match category {
            TermCategory::Pathway    => &self.pathways,
            TermCategory::Metabolite => &self.metabolites,
            TermCategory::Disease    => &self.diseases,
        }
    }

    pub fn has_hits(&self) -> bool {
        !(self.proteins.is_empty()
            && self.pathways.is_empty()
            && self.metabolites.is_empty()
            && self.diseases.is_empty())
    }
}

#[derive(Debug, Default)]
struct GeneAssociations {
    proteins: BTreeSet<String>,
    pathways: BTreeSet<String>,
    metabolites: BTreeSet<String>,
    diseases: BTreeSet<String>,
}

impl GeneAssociations {
    fn terms_mut(&mut self, category: TermCategory) -> &mut BTreeSet<String> {
        match category {
            TermCategory::Pathway    => &mut self.pathways,
            TermCategory::Metabolite => &mut self.metabolites,
            TermCategory::Disease    => &mut self.diseases,
        }
    }

    fn render(self, gene: &str) -> AssociationRow {
        AssociationRow {
            gene: gene.to_string(),
            proteins: join(self.proteins),
            pathways: join(self.pathways),
            metabolites: join(self.metabolites),
            diseases: join(self.diseases),
        }
    }
}

fn join(set: BTreeSet<String>) -> String {
    set.into_iter().collect::<Vec<_>>().join(ASSOCIATION_SEPARATOR)
}

/// Roll up proteins and enrichment terms per common gene, sorted by gene.
pub fn aggregate(
    genes: &GeneSet,
    proteomics: &FilteredTable,
    enrichment: &[EnrichmentTable],
) -> Vec<AssociationRow> {
    let mut grouped: BTreeMap<&str, GeneAssociations> =
        genes.iter().map(|g| (g.as_str(), GeneAssociations::default())).collect();

    for row in &proteomics.rows {
        let Some(entry) = grouped.get_mut(row.gene.as_str()) else {
            continue;
        };
        if let Some(protein) = row.protein.as_deref().filter(|p| !p.is_empty()) {
            entry.proteins.insert(protein.to_string());
        }
    }

    for table in enrichment {
        let category = table.library.category;
        for record in &table.records {
            for member in &record.member_genes {
                if let Some(entry) = grouped.get_mut(member.as_str()) {
                    entry.terms_mut(category).insert(record.term.clone());
                }
            }
        }
    }

    let rows: Vec<AssociationRow> = grouped
        .into_iter()
        .map(|(gene, associations)| associations.render(gene))
        .collect();

    info!(
        rows = rows.len(),
        with_hits = rows.iter().filter(|r| r.has_hits()).count(),
        "Associations aggregated"
    );
    rows
}
