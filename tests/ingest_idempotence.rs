mod common;

use common::{memory_pool, BAKKEN_REPORT, HEADER_ONLY_REPORT, TWO_STAGE_REPORT};
use well_report_ingest::db;
use std::path::Path;
use well_report_ingest::ingest::{ingest_document, ingest_text, DocumentOutcome};
use well_report_ingest::parser::parse_report;
use well_report_ingest::pdf_extractor::PDFExtractor;

async fn count(pool: &db::DbPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count rows")
}

#[tokio::test]
async fn single_stage_report_is_stored() {
    let pool = memory_pool().await;

    let outcome = ingest_text(&pool, BAKKEN_REPORT, "bakken.pdf").await.expect("ingest");
    assert!(matches!(outcome, DocumentOutcome::Stored { stimulations: 1, .. }));

    let well = db::find_well_by_api(&pool, "42-001-12345")
        .await
        .expect("find well")
        .expect("well exists");
    assert_eq!(well.well.shl.as_deref(), Some("NE NE SEC 12"));
    assert!(well.mappable);
    assert_eq!(well.stimulations.len(), 1);

    let stage = &well.stimulations[0];
    assert_eq!(stage.top_ft, Some(3500.0));
    assert_eq!(stage.bottom_ft, Some(3800.0));
    assert_eq!(stage.volume, Some(12500.0));
    assert_eq!(stage.volume_units.as_deref(), Some("bbl"));
    assert_eq!(stage.stimulation_stages, Some(30));
}

#[tokio::test]
async fn reingesting_is_idempotent() {
    let pool = memory_pool().await;

    ingest_text(&pool, TWO_STAGE_REPORT, "kline.pdf").await.expect("first run");
    let first = db::list_wells_with_stimulations(&pool).await.expect("list");

    ingest_text(&pool, TWO_STAGE_REPORT, "kline.pdf").await.expect("second run");
    let second = db::list_wells_with_stimulations(&pool).await.expect("list");

    assert_eq!(count(&pool, "wells").await, 1);
    assert_eq!(count(&pool, "stimulation_data").await, 2);
    assert_eq!(first[0].well, second[0].well);

    let strip_ids = |wells: &[well_report_ingest::models::WellDetail]| {
        wells[0]
            .stimulations
            .iter()
            .map(|s| (s.stimulated_formation.clone(), s.date_stimulated, s.top_ft, s.bottom_ft))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip_ids(&first), strip_ids(&second));
}

#[tokio::test]
async fn report_without_stages_has_empty_stimulations() {
    let pool = memory_pool().await;

    let outcome = ingest_text(&pool, HEADER_ONLY_REPORT, "tarpon.pdf").await.expect("ingest");
    assert!(matches!(outcome, DocumentOutcome::Stored { stimulations: 0, .. }));

    let well = db::find_well_by_api(&pool, "33-105-01234")
        .await
        .expect("find well")
        .expect("well exists");
    assert!(well.stimulations.is_empty());
    assert!(!well.mappable);
}

#[tokio::test]
async fn later_report_fills_but_never_erases() {
    let pool = memory_pool().await;

    ingest_text(&pool, TWO_STAGE_REPORT, "kline.pdf").await.expect("first");
    let amended = "API: 33-053-02102\nDatum: NAD83\nDate Stimulated: 06/01/2021\nTop (ft): 9000\n";
    ingest_text(&pool, amended, "kline-amended.pdf").await.expect("second");

    let well = db::find_well_by_api(&pool, "33-053-02102")
        .await
        .expect("find well")
        .expect("well exists");
    assert_eq!(well.well.operator.as_deref(), Some("Oasis Petroleum"));
    assert_eq!(well.well.datum.as_deref(), Some("NAD83"));
    assert_eq!(well.well.latitude, Some(48.0612));

    // Stimulations are replaced wholesale.
    assert_eq!(well.stimulations.len(), 1);
    assert_eq!(well.stimulations[0].top_ft, Some(9000.0));
}

#[tokio::test]
async fn documents_without_text_or_api_are_skipped() {
    let pool = memory_pool().await;

    let blank = ingest_text(&pool, "  \n\n ", "scan.pdf").await.expect("blank");
    assert_eq!(blank, DocumentOutcome::SkippedNoText);

    let no_api = ingest_text(&pool, "Operator: Acme\nWell Name: Nowhere 1", "memo.pdf")
        .await
        .expect("no api");
    assert_eq!(no_api, DocumentOutcome::SkippedNoApi);

    assert_eq!(count(&pool, "wells").await, 0);
}

#[tokio::test]
async fn failed_document_is_rolled_back() {
    let pool = memory_pool().await;
    sqlx::query("DROP TABLE stimulation_data")
        .execute(&pool)
        .await
        .expect("drop table");

    let report = parse_report(BAKKEN_REPORT);
    let result = db::store_report(&pool, &report).await;

    assert!(result.is_err());
    assert_eq!(count(&pool, "wells").await, 0);
}

#[tokio::test]
async fn text_layer_pdf_is_ingested_end_to_end() {
    let pool = memory_pool().await;
    let extractor = PDFExtractor::new(20, None);
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/text_layer_report.pdf");

    let outcome = ingest_document(&pool, &extractor, &fixture).await.expect("ingest pdf");
    assert!(matches!(outcome, DocumentOutcome::Stored { stimulations: 0, .. }));

    let well = db::find_well_by_api(&pool, "33-053-02102")
        .await
        .expect("find well")
        .expect("well exists");
    assert_eq!(well.well.latitude, Some(48.109444));
    assert_eq!(well.well.longitude, Some(-103.730556));
    assert!(well.mappable);
}
