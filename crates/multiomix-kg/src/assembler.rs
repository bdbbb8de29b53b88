//! Build the gene / protein / term network for one run.

use tracing::{debug, info};

use multiomix_common::{EnrichmentTable, FilteredTable, GeneSet};

use crate::graph::{Graph, NodeId, NodeKind};

/// Knobs for [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    /// Take at most this many top-ranked terms from each library.
    /// `None` keeps every term.
    pub max_terms_per_library: Option<usize>,
}

impl AssemblyOptions {
    pub fn with_max_terms(max: usize) -> Self {
        Self { max_terms_per_library: Some(max) }
    }
}

/// Assemble the network.
///
/// * one Gene node per common gene;
/// * one Protein node per proteomics protein whose gene is common, linked to it;
/// * one term node per enrichment record, linked to each member gene that is
///   common (members outside the set add no edge);
/// * one legend node per kind, always.
///
/// An empty gene set yields a legend-only graph.
pub fn assemble(
    genes: &GeneSet,
    proteomics: &FilteredTable,
    enrichment: &[EnrichmentTable],
    options: &AssemblyOptions,
) -> Graph {
    let mut graph = Graph::new();

    if !genes.is_empty() {
        for gene in genes {
            graph.add_node(NodeKind::Gene, gene);
        }

        for row in &proteomics.rows {
            if !genes.contains(&row.gene) {
                continue;
            }
            let Some(protein) = row.protein.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            let protein_id = graph.add_node(NodeKind::Protein, protein);
            graph.add_edge(&NodeId::gene(row.gene.as_str()), &protein_id);
        }

        for table in enrichment {
            let kind = NodeKind::from(table.library.category);
            let records = match options.max_terms_per_library {
                Some(n) => table.top(n),
                None => &table.records[..],
            };
            debug!(library = %table.library.name, terms = records.len(), "Adding enrichment terms");

            for record in records {
                let term_id = graph.add_node(kind, &record.term);
                for member in &record.member_genes {
                    if genes.contains(member) {
                        graph.add_edge(&NodeId::gene(member.as_str()), &term_id);
                    }
                }
            }
        }
    }

    for kind in NodeKind::ALL {
        graph.add_legend(kind);
    }

    info!(
        genes = genes.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Network assembled"
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiomix_common::{EnrichmentRecord, LibrarySpec, MeasurementRow, OmicsSource, TermCategory};

    fn proteomics(rows: &[(&str, &str)]) -> FilteredTable {
        FilteredTable {
            source: OmicsSource::Proteomics,
            column: "Intensity".to_string(),
            threshold: 1000.0,
            headers: vec!["Gene".into(), "Protein".into(), "Intensity".into()],
            rows: rows
                .iter()
                .map(|(g, p)| MeasurementRow {
                    gene: g.to_string(),
                    protein: Some(p.to_string()),
                    value: Some(2000.0),
                    cells: vec![g.to_string(), p.to_string(), "2000".into()],
                })
                .collect(),
            coerced_missing: 0,
            total_rows: rows.len(),
        }
    }

    fn pathways(records: Vec<EnrichmentRecord>) -> EnrichmentTable {
        EnrichmentTable {
            library: LibrarySpec::new("Reactome Pathways", "Reactome_2016", TermCategory::Pathway),
            records,
        }
    }

    #[test]
    fn test_gene_protein_edge() {
        let genes: GeneSet = ["TP53"].into_iter().collect();
        let graph = assemble(&genes, &proteomics(&[("TP53", "P53_HUMAN")]), &[], &AssemblyOptions::default());

        let gene = NodeId::gene("TP53");
        let protein = NodeId::entity(NodeKind::Protein, "P53_HUMAN");
        assert!(graph.contains(&gene));
        assert!(graph.contains(&protein));
        assert!(graph.has_edge(&gene, &protein));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.legend().count(), 5);
    }

    #[test]
    fn test_proteins_of_non_common_genes_are_skipped() {
        let genes: GeneSet = ["TP53"].into_iter().collect();
        let graph = assemble(
            &genes,
            &proteomics(&[("TP53", "P53_HUMAN"), ("MYC", "MYC_HUMAN")]),
            &[],
            &AssemblyOptions::default(),
        );
        assert_eq!(graph.nodes_of_kind(NodeKind::Protein).count(), 1);
    }

    #[test]
    fn test_term_links_only_common_members() {
        let genes: GeneSet = ["TP53"].into_iter().collect();
        let tables = vec![pathways(vec![EnrichmentRecord::from_delimited("Apoptosis", "TP53;BAX", 12.5)])];
        let graph = assemble(&genes, &proteomics(&[]), &tables, &AssemblyOptions::default());

        let term = NodeId::entity(NodeKind::Pathway, "Apoptosis");
        assert!(graph.contains(&term));
        assert!(graph.has_edge(&NodeId::gene("TP53"), &term));
        assert!(!graph.contains(&NodeId::gene("BAX")));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_repeated_term_creates_one_node() {
        let genes: GeneSet = ["TP53", "ATM"].into_iter().collect();
        let tables = vec![
            pathways(vec![EnrichmentRecord::from_delimited("DNA Repair", "TP53", 9.0)]),
            pathways(vec![EnrichmentRecord::from_delimited("DNA Repair", "TP53;ATM", 8.0)]),
        ];
        let graph = assemble(&genes, &proteomics(&[]), &tables, &AssemblyOptions::default());
        assert_eq!(graph.nodes_of_kind(NodeKind::Pathway).count(), 1);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_max_terms_caps_each_library() {
        let genes: GeneSet = ["TP53"].into_iter().collect();
        let tables = vec![pathways(vec![
            EnrichmentRecord::from_delimited("A", "TP53", 3.0),
            EnrichmentRecord::from_delimited("B", "TP53", 2.0),
            EnrichmentRecord::from_delimited("C", "TP53", 1.0),
        ])];
        let graph = assemble(&genes, &proteomics(&[]), &tables, &AssemblyOptions::with_max_terms(2));
        let mut terms: Vec<&str> = graph.nodes_of_kind(NodeKind::Pathway).map(|n| n.label.as_str()).collect();
        terms.sort();
        assert_eq!(terms, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_gene_set_yields_legend_only() {
        let tables = vec![pathways(vec![EnrichmentRecord::from_delimited("Apoptosis", "TP53", 1.0)])];
        let graph = assemble(&GeneSet::new(), &proteomics(&[("TP53", "P53_HUMAN")]), &tables, &AssemblyOptions::default());
        assert_eq!(graph.node_count(), 5);
        assert!(graph.nodes().iter().all(|n| n.is_legend()));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let genes: GeneSet = ["TP53", "ATM", "BRCA1"].into_iter().collect();
        let rows = proteomics(&[("BRCA1", "BRCA1_HUMAN"), ("TP53", "P53_HUMAN"), ("ATM", "ATM_HUMAN")]);
        let tables = vec![pathways(vec![
            EnrichmentRecord::from_delimited("DNA Repair", "BRCA1;ATM;TP53", 9.0),
            EnrichmentRecord::from_delimited("Apoptosis", "TP53", 4.0),
        ])];
        let options = AssemblyOptions::default();

        let first = assemble(&genes, &rows, &tables, &options);
        let second = assemble(&genes, &rows, &tables, &options);

        let ids = |g: &Graph| g.nodes().iter().map(|n| n.id.to_string()).collect::<Vec<_>>();
        let labels = |g: &Graph| g.nodes().iter().map(|n| n.label.clone()).collect::<std::collections::BTreeSet<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(labels(&first), labels(&second));
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());
        assert_eq!(first.edge_count(), 7);
    }
}
