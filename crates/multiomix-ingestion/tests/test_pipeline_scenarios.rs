//! End-to-end integration pipeline scenarios with a mock enrichment client.

use std::time::Duration;

use multiomix_common::{PipelineConfig, TermCategory};
use multiomix_enrichment::{LibraryOutcome, MockEnrichmentClient};
use multiomix_ingestion::{run_integration, OmicsInputs, PipelineNotice};
use multiomix_kg::{NodeId, NodeKind};
use multiomix_test_utils::{
    disjoint_scenario, genomics_raw, library, proteomics_raw, raw_table, scenario_client, tp53_scenario,
    transcriptomics_raw, ScenarioTables,
};
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

fn inputs(tables: ScenarioTables) -> OmicsInputs {
    OmicsInputs {
        genomics: tables.genomics,
        transcriptomics: tables.transcriptomics,
        proteomics: tables.proteomics,
    }
}

#[tokio::test]
async fn test_tp53_scenario_without_enrichment_data() {
    let config = PipelineConfig::default();
    let report = run_integration(&inputs(tp53_scenario()), &config, &MockEnrichmentClient::new(), None).await;

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    let common = report.common_genes.as_ref().unwrap();
    assert_eq!(common.to_vec(), vec!["TP53".to_string()]);

    let graph = report.graph.as_ref().unwrap();
    let gene = NodeId::gene("TP53");
    let protein = NodeId::entity(NodeKind::Protein, "P53_HUMAN");
    assert!(graph.contains(&gene));
    assert!(graph.contains(&protein));
    assert!(graph.has_edge(&gene, &protein));

    let rows = report.associations.as_ref().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].proteins, "P53_HUMAN");
    assert_eq!(rows[0].pathways, "");
    assert_eq!(rows[0].metabolites, "");
    assert_eq!(rows[0].diseases, "");

    // Every library answered with an empty table.
    assert_eq!(
        report.notices.iter().filter(|n| matches!(n, PipelineNotice::LibraryEmpty { .. })).count(),
        config.enrichment.libraries.len()
    );
}

#[tokio::test]
async fn test_tp53_scenario_with_enrichment() {
    let report = run_integration(&inputs(tp53_scenario()), &PipelineConfig::default(), &scenario_client(), None).await;

    let graph = report.graph.as_ref().unwrap();
    let apoptosis = NodeId::entity(NodeKind::Pathway, "Apoptosis");
    assert!(graph.has_edge(&NodeId::gene("TP53"), &apoptosis));
    assert!(!graph.contains(&NodeId::gene("BRCA1")));
    assert_eq!(graph.degree(&apoptosis), 1);

    let row = &report.associations.as_ref().unwrap()[0];
    assert_eq!(row.pathways, "Apoptosis");
    assert_eq!(row.diseases, "Li-Fraumeni syndrome");
    assert_eq!(row.metabolites, "NADH");

    let enrichment = report.enrichment.as_ref().unwrap();
    assert!(enrichment.has_results());
    assert!(enrichment.failures().is_empty());
}

#[tokio::test]
async fn test_disjoint_tables_degrade_to_empty_outputs() {
    let client = scenario_client();
    let report = run_integration(&inputs(disjoint_scenario()), &PipelineConfig::default(), &client, None).await;

    assert!(report.common_genes.as_ref().unwrap().is_empty());
    assert!(report.has_notice(&PipelineNotice::EmptyIntersection));
    assert!(report.enrichment.is_none());
    assert!(client.calls().is_empty());

    let graph = report.graph.as_ref().unwrap();
    assert_eq!(graph.node_count(), NodeKind::ALL.len());
    assert!(graph.nodes().iter().all(|n| n.is_legend()));
    assert_eq!(graph.edge_count(), 0);
    assert!(report.associations.as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn test_schema_error_keeps_valid_previews() {
    let tables = ScenarioTables {
        proteomics: raw_table(&["Gene", "Intensity"], &[&["TP53", "2000"]]),
        ..tp53_scenario()
    };
    let report = run_integration(&inputs(tables), &PipelineConfig::default(), &scenario_client(), None).await;

    assert!(report.has_notice(&PipelineNotice::SchemaError {
        table: "proteomics".into(),
        column: "Protein".into(),
    }));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.previews.len(), 2);
    assert!(report.common_genes.is_none());
    assert!(report.graph.is_none());
    assert!(report.associations.is_none());
}

#[tokio::test]
async fn test_failed_library_is_isolated() {
    let pathway = library(TermCategory::Pathway);
    let disease = library(TermCategory::Disease);
    let client = MockEnrichmentClient::new()
        .with_records(&pathway.library_id, vec![multiomix_test_utils::apoptosis_record()])
        .with_failure(&disease.library_id, "HTTP 503");

    let report = run_integration(&inputs(tp53_scenario()), &PipelineConfig::default(), &client, None).await;

    let enrichment = report.enrichment.as_ref().unwrap();
    assert!(matches!(enrichment.get(&disease.name), Some(LibraryOutcome::Failed { .. })));
    assert!(enrichment.get(&pathway.name).and_then(|o| o.table()).is_some());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains(&disease.name));

    let row = &report.associations.as_ref().unwrap()[0];
    assert_eq!(row.pathways, "Apoptosis");
    assert_eq!(row.diseases, "");
}

#[tokio::test]
async fn test_slow_library_times_out() {
    let pathway = library(TermCategory::Pathway);
    let client = scenario_client().with_delay(&pathway.library_id, Duration::from_secs(5));
    let mut config = PipelineConfig::default();
    config.enrichment.timeout_secs = 1;

    let report = run_integration(&inputs(tp53_scenario()), &config, &client, None).await;

    match report.enrichment.as_ref().unwrap().get(&pathway.name) {
        Some(LibraryOutcome::Failed { reason }) => assert!(reason.contains("timed out")),
        other => panic!("expected timeout failure, got {other:?}"),
    }
    assert_eq!(report.associations.as_ref().unwrap()[0].diseases, "Li-Fraumeni syndrome");
}

#[tokio::test]
async fn test_disabled_enrichment_still_builds_outputs() {
    let client = scenario_client();
    let mut config = PipelineConfig::default();
    config.display.run_enrichment = false;

    let report = run_integration(&inputs(tp53_scenario()), &config, &client, None).await;

    assert!(report.has_notice(&PipelineNotice::EnrichmentDisabled));
    assert!(report.enrichment.is_none());
    assert!(client.calls().is_empty());
    assert_eq!(report.graph.as_ref().unwrap().nodes_of_kind(NodeKind::Protein).count(), 1);
    assert_eq!(report.associations.as_ref().unwrap()[0].pathways, "");
}

#[tokio::test]
async fn test_display_flags_skip_outputs() {
    let mut config = PipelineConfig::default();
    config.display.show_network = false;
    config.display.show_association_table = false;

    let report = run_integration(&inputs(tp53_scenario()), &config, &scenario_client(), None).await;

    assert!(report.graph.is_none());
    assert!(report.associations.is_none());
    assert!(report.common_genes.is_some());
}

#[tokio::test]
async fn test_coerced_values_are_reported_and_excluded() {
    let tables = ScenarioTables {
        genomics: genomics_raw(&[("TP53", "25"), ("KRAS", "n/a"), ("EGFR", "")]),
        transcriptomics: transcriptomics_raw(&[("TP53", "5"), ("KRAS", "9")]),
        proteomics: proteomics_raw(&[("TP53", "P53_HUMAN", "2000"), ("KRAS", "RASK_HUMAN", "3000")]),
    };
    let report = run_integration(&inputs(tables), &PipelineConfig::default(), &MockEnrichmentClient::new(), None).await;

    assert!(report.notices.iter().any(|n| matches!(
        n,
        PipelineNotice::CoercedValues { rows: 2, .. }
    )));
    assert_eq!(report.common_genes.as_ref().unwrap().to_vec(), vec!["TP53".to_string()]);
}

#[tokio::test]
async fn test_padded_ids_join_across_tables() {
    let tables = ScenarioTables {
        genomics: genomics_raw(&[("TP53 ", "25")]),
        transcriptomics: transcriptomics_raw(&[(" TP53", "5")]),
        proteomics: proteomics_raw(&[("TP53", " P53_HUMAN ", "2000")]),
    };
    let report = run_integration(&inputs(tables), &PipelineConfig::default(), &MockEnrichmentClient::new(), None).await;

    assert_eq!(report.common_genes.as_ref().unwrap().to_vec(), vec!["TP53".to_string()]);
    let graph = report.graph.as_ref().unwrap();
    assert!(graph.has_edge(&NodeId::gene("TP53"), &NodeId::entity(NodeKind::Protein, "P53_HUMAN")));
    assert_eq!(report.associations.as_ref().unwrap()[0].proteins, "P53_HUMAN");
}

#[tokio::test]
async fn test_previews_respect_row_count() {
    let rows: Vec<(String, String)> = (0..30).map(|i| (format!("G{i}"), "50".to_string())).collect();
    let borrowed: Vec<(&str, &str)> = rows.iter().map(|(g, v)| (g.as_str(), v.as_str())).collect();
    let tables = ScenarioTables { genomics: genomics_raw(&borrowed), ..tp53_scenario() };
    let mut config = PipelineConfig::default();
    config.display.preview_row_count = 5;

    let report = run_integration(&inputs(tables), &config, &MockEnrichmentClient::new(), None).await;

    let preview = report.preview(multiomix_common::OmicsSource::Genomics).unwrap();
    assert_eq!(preview.rows.len(), 5);
    assert_eq!(preview.kept_rows, 30);
    assert_eq!(preview.headers, vec!["Gene", "CADD"]);
}

#[tokio::test]
async fn test_progress_events_are_broadcast() {
    let (tx, mut rx) = broadcast::channel(32);
    let report = run_integration(&inputs(tp53_scenario()), &PipelineConfig::default(), &scenario_client(), Some(tx)).await;

    let mut stages = Vec::new();
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.run_id, report.run_id);
        stages.push(event.stage);
    }
    assert_eq!(stages.first().map(String::as_str), Some("filter"));
    assert_eq!(stages.last().map(String::as_str), Some("complete"));
    assert!(stages.iter().any(|s| s == "enrich"));
}
