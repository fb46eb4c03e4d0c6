//! Chart requests resolved against a live table.

use chart_scout::charts::{aggregate_bar, BarRoles, ChartResolver, RenderConfig};
use chart_scout::prelude::*;
use serde_json::{json, Value};

const ORDERS_CSV: &str = "\
region,channel,units,price
east,web,1,2.5
east,store,3,4.0
west,web,5,1.0
west,web,7,
north,,2,3.0
";

async fn orders() -> TableStore {
    let store = TableStore::new();
    store
        .upload("orders.csv", ORDERS_CSV.as_bytes().to_vec(), None)
        .await
        .unwrap();
    store
}

async fn chart(store: &TableStore, request: Value) -> ChartDocument {
    store.generate_chart_json(request).await.unwrap()
}

#[tokio::test]
async fn test_bar_aggregations() {
    let store = orders().await;

    let sum = chart(&store, json!({"chart_type": "bar", "x": "region", "y": "units"})).await;
    assert_eq!(sum.data[0]["x"], json!(["east", "north", "west"]));
    assert_eq!(sum.data[0]["y"], json!([4, 2, 12]));

    let mean = chart(
        &store,
        json!({"chart_type": "bar", "x": "region", "y": "units", "aggregation": "mean"}),
    )
    .await;
    assert_eq!(mean.data[0]["y"], json!([2.0, 2.0, 6.0]));

    let count = chart(
        &store,
        json!({"chart_type": "bar", "x": "region", "y": "price", "aggregation": "count"}),
    )
    .await;
    assert_eq!(count.data[0]["y"], json!([2, 1, 1]));

    let max = chart(
        &store,
        json!({"chart_type": "bar", "x": "region", "y": "units", "aggregation": "max"}),
    )
    .await;
    assert_eq!(max.data[0]["y"], json!([3, 2, 7]));
}

#[tokio::test]
async fn test_bar_first_and_last_follow_row_order() {
    let store = orders().await;

    let first = chart(
        &store,
        json!({"chart_type": "bar", "x": "region", "y": "units", "aggregation": "first"}),
    )
    .await;
    assert_eq!(first.data[0]["y"], json!([1, 2, 5]));

    let last = chart(
        &store,
        json!({"chart_type": "bar", "x": "region", "y": "units", "aggregation": "last"}),
    )
    .await;
    assert_eq!(last.data[0]["y"], json!([3, 2, 7]));
}

#[tokio::test]
async fn test_bar_color_groups_into_traces() {
    let store = orders().await;
    let figure = chart(
        &store,
        json!({"chart_type": "bar", "x": "region", "y": "units", "color": "channel"}),
    )
    .await;

    // north has no channel and drops out of the grouping.
    let names: Vec<&str> = figure
        .data
        .iter()
        .map(|trace| trace["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["store", "web"]);
    assert_eq!(figure.data[0]["x"], json!(["east"]));
    assert_eq!(figure.data[1]["x"], json!(["east", "west"]));
    assert_eq!(figure.data[1]["y"], json!([1, 12]));
    assert_eq!(figure.layout["legend"]["title"]["text"], "channel");
}

#[tokio::test]
async fn test_aggregate_bar_returns_grouped_table() {
    let table = CsvSource::parse(ORDERS_CSV.as_bytes(), &CsvOptions::default()).unwrap();
    let roles = BarRoles {
        x: "region".to_string(),
        y: "units".to_string(),
        color: None,
        aggregation: Some(Aggregation::Sum),
        title: None,
    };

    let grouped = aggregate_bar(&table, &roles).await.unwrap();
    assert_eq!(grouped.column_names(), vec!["region", "units"]);
    assert_eq!(grouped.num_rows(), 3);
}

#[tokio::test]
async fn test_scatter_color_traces_in_first_appearance_order() {
    let store = orders().await;
    let figure = chart(
        &store,
        json!({"chart_type": "scatter", "x": "units", "y": "price", "color": "region", "title": "Units vs price"}),
    )
    .await;

    assert_eq!(figure.trace_count(), 3);
    assert_eq!(figure.data[0]["name"], "east");
    assert_eq!(figure.data[1]["name"], "west");
    assert_eq!(figure.data[2]["name"], "north");
    assert_eq!(figure.data[1]["y"], json!([1.0, null]));
    assert_eq!(figure.title(), Some("Units vs price"));
    assert_eq!(figure.layout["template"], "plotly_dark");
}

#[tokio::test]
async fn test_pie_counts_occurrences() {
    let store = orders().await;
    let figure = chart(&store, json!({"chart_type": "pie", "names": "region"})).await;

    assert_eq!(figure.data[0]["type"], "pie");
    assert_eq!(figure.data[0]["labels"], json!(["east", "west", "north"]));
    assert_eq!(figure.data[0]["values"], json!([2, 2, 1]));
}

#[tokio::test]
async fn test_histogram_and_box() {
    let store = orders().await;

    let histogram = chart(&store, json!({"chart_type": "histogram", "x": "units"})).await;
    assert_eq!(histogram.data[0]["type"], "histogram");
    assert_eq!(histogram.data[0]["x"], json!([1, 3, 5, 7, 2]));

    let boxes = chart(&store, json!({"chart_type": "box", "x": "region", "y": "units"})).await;
    assert_eq!(boxes.data[0]["type"], "box");
    assert_eq!(boxes.data[0]["y"], json!([1, 3, 5, 7, 2]));
}

#[tokio::test]
async fn test_heatmap_correlates_numeric_columns() {
    let store = orders().await;
    let figure = chart(&store, json!({"chart_type": "heatmap"})).await;

    let trace = &figure.data[0];
    assert_eq!(trace["type"], "heatmap");
    assert_eq!(trace["x"], json!(["units", "price"]));
    assert_eq!(trace["y"], json!(["units", "price"]));
    assert_eq!(trace["z"][0][0], json!(1.0));
    assert_eq!(trace["text"][0][0], "1.00");
    assert_eq!(trace["zmin"], json!(-1.0));
    assert_eq!(trace["zmax"], json!(1.0));
}

#[tokio::test]
async fn test_heatmap_with_single_numeric_column() {
    let store = TableStore::new();
    store
        .upload("one.csv", b"label,v\na,1\nb,2\n".to_vec(), None)
        .await
        .unwrap();

    let figure = chart(&store, json!({"chart_type": "heatmap"})).await;
    assert_eq!(figure.data[0]["x"], json!(["v"]));
    assert_eq!(figure.data[0]["z"], json!([[1.0]]));
}

#[tokio::test]
async fn test_missing_column_is_named() {
    let store = orders().await;
    let err = store
        .generate_chart_json(json!({"chart_type": "line", "x": "region", "y": "revenue"}))
        .await
        .unwrap_err();

    assert!(matches!(err, ScoutError::ColumnNotFound { ref column } if column == "revenue"));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("revenue"));
}

#[tokio::test]
async fn test_first_missing_column_wins() {
    let store = orders().await;
    let err = store
        .generate_chart_json(json!({"chart_type": "scatter", "x": "nope", "y": "also_nope"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::ColumnNotFound { ref column } if column == "nope"));
}

#[tokio::test]
async fn test_invalid_requests() {
    let store = orders().await;

    for request in [
        json!({"chart_type": "radar", "x": "units"}),
        json!({"chart_type": "scatter", "x": "units"}),
        json!({"chart_type": "pie"}),
        json!({"chart_type": "bar", "x": "region", "y": "units", "aggregation": "mode"}),
        json!({"x": "units"}),
    ] {
        let err = store.generate_chart_json(request.clone()).await.unwrap_err();
        assert!(
            matches!(err, ScoutError::InvalidChartConfig(_)),
            "{request} gave {err:?}"
        );
        assert!(err.is_client_error());
    }
}

#[tokio::test]
async fn test_extra_request_keys_are_ignored() {
    let store = orders().await;
    let figure = chart(
        &store,
        json!({"chart_type": "histogram", "x": "units", "bins": 10, "opacity": 0.5}),
    )
    .await;
    assert_eq!(figure.trace_count(), 1);
}

#[tokio::test]
async fn test_resolver_config_and_default_title() {
    let table = CsvSource::parse(ORDERS_CSV.as_bytes(), &CsvOptions::default()).unwrap();
    let resolver = ChartResolver::plotly(RenderConfig {
        template: "plotly_white".to_string(),
        ..RenderConfig::default()
    })
    .with_default_title("Untitled");

    let spec = ChartSpec::from_json_value(json!({"chart_type": "pie", "names": "channel"})).unwrap();
    let figure = resolver.resolve(&spec, &table).await.unwrap();

    assert_eq!(figure.title(), Some("Untitled"));
    assert_eq!(figure.layout["template"], "plotly_white");
    assert_eq!(figure.data[0]["labels"], json!(["web", "store"]));
}
