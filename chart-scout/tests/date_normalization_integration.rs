//! Date detection on uploaded CSV text columns.

use chart_scout::analyzers::{DateFormat, DateNormalizer, NormalizerConfig};
use chart_scout::prelude::*;
use chart_scout::table::is_temporal_type;
use serde_json::json;

async fn load(csv: &str, date_format: Option<&str>) -> TableStore {
    let store = TableStore::new();
    store
        .upload("dates.csv", csv.as_bytes().to_vec(), date_format)
        .await
        .unwrap();
    store
}

async fn is_datetime(store: &TableStore, column: &str) -> bool {
    let loaded = store.current().await.unwrap();
    let index = loaded.table.column_index(column).unwrap();
    is_temporal_type(loaded.table.schema().field(index).data_type())
}

#[tokio::test]
async fn test_inferred_iso_and_slash_dates() {
    let store = load(
        "iso,us,label\n2024-03-01,03/15/2024,a\n2024-03-02,12/31/2023,b\n",
        None,
    )
    .await;

    assert!(is_datetime(&store, "iso").await);
    assert!(is_datetime(&store, "us").await);
    assert!(!is_datetime(&store, "label").await);

    let loaded = store.current().await.unwrap();
    assert!(loaded.normalization.was_converted("iso"));
    assert_eq!(loaded.normalization.unchanged, vec!["label".to_string()]);
}

#[tokio::test]
async fn test_one_bad_value_keeps_column_as_text() {
    let store = load("when,v\n2024-01-01,1\nsoon,2\n2024-01-03,3\n", None).await;

    assert!(!is_datetime(&store, "when").await);
    let profile = store.profile().await.unwrap();
    assert_eq!(profile.get("when").unwrap().column_type, ColumnType::Categorical);
}

#[tokio::test]
async fn test_mixed_formats_do_not_partially_convert() {
    // First value picks %Y-%m-%d; the second row only fits another format.
    let store = load("when\n2024-01-01\n01/02/2024\n", None).await;
    assert!(!is_datetime(&store, "when").await);
}

#[tokio::test]
async fn test_missing_cells_stay_missing_after_conversion() {
    let store = load("when,v\n2024-01-01,1\n,2\n2024-01-03,3\n", None).await;

    assert!(is_datetime(&store, "when").await);
    let profile = store.profile().await.unwrap();
    let when = profile.get("when").unwrap();
    assert_eq!(when.column_type, ColumnType::Datetime);
    assert_eq!(when.missing_percentage, 33.33);
    assert_eq!(when.unique_count, 2);
}

#[tokio::test]
async fn test_strict_format_applies_to_every_text_column() {
    let csv = "eu,us\n31/12/2023,12/31/2023\n01/02/2024,02/01/2024\n";

    let strict = load(csv, Some("%d/%m/%Y")).await;
    assert!(is_datetime(&strict, "eu").await);
    assert!(!is_datetime(&strict, "us").await);

    let loaded = strict.current().await.unwrap();
    assert_eq!(loaded.normalization.converted[0].format, "%d/%m/%Y");
}

#[tokio::test]
async fn test_strict_format_skips_inference() {
    // Would be inferred as ISO, but the caller asked for another format.
    let store = load("when\n2024-01-01\n2024-01-02\n", Some("%d.%m.%Y")).await;
    assert!(!is_datetime(&store, "when").await);
}

#[tokio::test]
async fn test_numeric_columns_are_never_dates() {
    let store = load("year,v\n2020,1\n2021,2\n", None).await;
    let profile = store.profile().await.unwrap();
    assert_eq!(profile.get("year").unwrap().column_type, ColumnType::Numeric);
}

#[tokio::test]
async fn test_converted_dates_render_on_line_chart() {
    let store = load("day,v\n2024-01-01,1\n2024-01-02,4\n", None).await;
    let figure = store
        .generate_chart_json(json!({"chart_type": "line", "x": "day", "y": "v"}))
        .await
        .unwrap();

    let xs = figure.data[0]["x"].as_array().unwrap();
    assert_eq!(xs.len(), 2);
    assert!(xs[0].as_str().unwrap().starts_with("2024-01-01"));
    assert_eq!(figure.data[0]["y"], json!([1, 4]));
}

#[tokio::test]
async fn test_custom_catalogue() {
    let config = ScoutConfig::builder()
        .normalizer(NormalizerConfig {
            formats: vec![DateFormat::pattern("%Y%m%d %H%M")],
        })
        .build();
    let store = TableStore::with_config(config);
    store
        .upload(
            "compact.csv",
            b"stamp,iso\n20240101 0930,2024-01-01\n20240102 1015,2024-01-02\n".to_vec(),
            None,
        )
        .await
        .unwrap();

    assert!(is_datetime(&store, "stamp").await);
    assert!(!is_datetime(&store, "iso").await);
}

#[test]
fn test_detect_format_prefers_catalogue_order() {
    let normalizer = DateNormalizer::new();
    assert_eq!(
        normalizer.detect_format("2024-05-06"),
        Some(&DateFormat::pattern("%Y-%m-%d"))
    );
    // Ambiguous day/month resolves to the US reading first.
    assert_eq!(
        normalizer.detect_format("05/06/2024"),
        Some(&DateFormat::pattern("%m/%d/%Y"))
    );
    assert_eq!(normalizer.detect_format("hello"), None);
}
