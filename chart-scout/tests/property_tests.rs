//! Property-based tests for profiling, date normalization and suggestions.
//!
//! Each property generates small random tables or profiles and checks an
//! invariant that must hold for every input:
//! - the low/high cardinality split sits exactly at the threshold
//! - missing percentages stay within 0..=100
//! - strict date conversion is all or nothing
//! - scatter suggestions cover each unordered numeric pair exactly once
//! - suggestions are a pure function of the profile

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::DataType;
use chart_scout::analyzers::{
    Cardinality, ColumnProfile, ColumnProfiler, ColumnType, DateNormalizer, SuggestionEngine,
    TableProfile,
};
use chart_scout::charts::ChartType;
use chart_scout::table::{is_temporal_type, Table};
use proptest::prelude::*;

fn column_type() -> impl Strategy<Value = ColumnType> {
    prop_oneof![
        Just(ColumnType::Numeric),
        Just(ColumnType::Categorical),
        Just(ColumnType::Datetime),
    ]
}

fn profile_strategy() -> impl Strategy<Value = TableProfile> {
    prop::collection::vec((column_type(), 0u64..40), 0..8).prop_map(|columns| {
        TableProfile::new(
            columns
                .into_iter()
                .enumerate()
                .map(|(i, (column_type, unique_count))| ColumnProfile {
                    column_name: format!("c{i}"),
                    column_type,
                    missing_percentage: 0.0,
                    unique_count,
                    cardinality: if unique_count <= 15 {
                        Cardinality::Low
                    } else {
                        Cardinality::High
                    },
                })
                .collect(),
        )
    })
}

/// Either a valid `%Y-%m-%d` date, junk text, or a missing cell.
fn date_cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => (2000i32..2030, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| Some(format!("{y:04}-{m:02}-{d:02}"))),
        1 => "[a-z]{3,8}".prop_map(Some),
        1 => Just(None),
    ]
}

proptest! {
    #[test]
    fn prop_cardinality_boundary(distinct in 0usize..30, threshold in 0u64..30) {
        let values: Vec<String> = (0..distinct).map(|i| format!("v{i}")).collect();
        let array = Arc::new(StringArray::from(values)) as ArrayRef;

        let profiler = ColumnProfiler::builder()
            .low_cardinality_threshold(threshold)
            .build();
        let profile = profiler.profile_column("c", &array);

        prop_assert_eq!(profile.unique_count, distinct as u64);
        let expected = if distinct as u64 <= threshold {
            Cardinality::Low
        } else {
            Cardinality::High
        };
        prop_assert_eq!(profile.cardinality, expected);
    }

    #[test]
    fn prop_missing_percentage_in_range(values in prop::collection::vec(prop::option::of(-50i64..50), 0..60)) {
        let nulls = values.iter().filter(|v| v.is_none()).count();
        let array = Arc::new(Int64Array::from(values.clone())) as ArrayRef;
        let profile = ColumnProfiler::new().profile_column("c", &array);

        prop_assert!((0.0..=100.0).contains(&profile.missing_percentage));
        if values.is_empty() || nulls == 0 {
            prop_assert_eq!(profile.missing_percentage, 0.0);
        }
        if !values.is_empty() && nulls == values.len() {
            prop_assert_eq!(profile.missing_percentage, 100.0);
        }
        prop_assert_eq!(profile.column_type, ColumnType::Numeric);
    }

    #[test]
    fn prop_strict_dates_are_all_or_nothing(cells in prop::collection::vec(date_cell(), 1..30)) {
        let array = Arc::new(StringArray::from(cells.clone())) as ArrayRef;
        let mut table = Table::from_columns(vec![("d", array)]).unwrap();

        let report = DateNormalizer::new().normalize(&mut table, Some("%Y-%m-%d"));

        let has_junk = cells
            .iter()
            .flatten()
            .any(|cell| cell.chars().all(|c| c.is_ascii_lowercase()));
        let converted = table.column(0);
        let nulls = cells.iter().filter(|c| c.is_none()).count();

        if has_junk {
            prop_assert!(!report.was_converted("d"));
            prop_assert_eq!(converted.data_type(), &DataType::Utf8);
        } else {
            prop_assert!(report.was_converted("d"));
            prop_assert!(is_temporal_type(converted.data_type()));
        }
        prop_assert_eq!(converted.null_count(), nulls);
        prop_assert_eq!(converted.len(), cells.len());
    }

    #[test]
    fn prop_scatter_covers_each_pair_once(profile in profile_strategy()) {
        let suggestions = SuggestionEngine::standard().suggest(&profile);
        let numeric: Vec<&str> = profile
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.column_name.as_str())
            .collect();

        let pairs: Vec<(String, String)> = suggestions
            .iter()
            .filter(|s| s.chart_type == ChartType::Scatter)
            .map(|s| (s.x.clone().unwrap(), s.y.clone().unwrap()))
            .collect();

        let n = numeric.len();
        prop_assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);

        let mut seen = HashSet::new();
        for (x, y) in &pairs {
            prop_assert_ne!(x, y);
            let key = if x < y { (x.clone(), y.clone()) } else { (y.clone(), x.clone()) };
            prop_assert!(seen.insert(key));
            // x comes before y in table order
            let xi = numeric.iter().position(|c| c == x).unwrap();
            let yi = numeric.iter().position(|c| c == y).unwrap();
            prop_assert!(xi < yi);
        }
    }

    #[test]
    fn prop_suggestions_are_deterministic(profile in profile_strategy()) {
        let engine = SuggestionEngine::standard();
        prop_assert_eq!(engine.suggest(&profile), engine.suggest(&profile.clone()));
    }

    #[test]
    fn prop_suggestion_counts(profile in profile_strategy()) {
        let suggestions = SuggestionEngine::standard().suggest(&profile);
        let count = |t: ChartType| suggestions.iter().filter(|s| s.chart_type == t).count();

        let numeric = profile.iter().filter(|c| c.is_numeric()).count();
        let datetime = profile.iter().filter(|c| c.is_datetime()).count();
        let low = profile.iter().filter(|c| c.is_low_cardinality_categorical()).count();

        prop_assert_eq!(count(ChartType::Line), datetime * numeric);
        prop_assert_eq!(count(ChartType::Bar), low * numeric);
        prop_assert_eq!(count(ChartType::Histogram), numeric);
        prop_assert_eq!(count(ChartType::Box), low * numeric);
        prop_assert_eq!(count(ChartType::Pie), low);
        prop_assert_eq!(count(ChartType::Heatmap), usize::from(numeric >= 2));
    }
}
