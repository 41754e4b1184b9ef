mod common;

use common::{column_texts, dataset, numeric_dataset, passengers};
use csv_explorer::{
    data::Dataset,
    filter::{FilterState, SortDirection, apply, apply_indexed},
    view::build_working_view,
};

fn names(rows: Vec<csv_explorer::data::Row>, columns: &[String]) -> Vec<String> {
    let snapshot = Dataset::new(
        columns.to_vec(),
        rows.into_iter().map(|row| row.into_cells()).collect(),
    );
    column_texts(&snapshot, "name")
}

#[test]
fn search_matches_any_cell_case_insensitively() {
    let data = passengers();
    let state = FilterState::default().with_search("FEMALE");
    let kept = names(apply(&data, &state), data.columns());
    assert_eq!(kept, ["Cumings", "Heikkinen", "Futrelle"]);
}

#[test]
fn numeric_cells_are_searched_by_their_text() {
    let data = numeric_dataset(&["value"], &[&[1.5], &[10.0], &[2.25]]);
    let state = FilterState::default().with_search("1");
    assert_eq!(apply_indexed(&data, &state), [0, 1]);
    let state = FilterState::default().with_search(".2");
    assert_eq!(apply_indexed(&data, &state), [2]);
}

#[test]
fn column_filters_are_and_composed() {
    let data = passengers();
    let state = FilterState::default()
        .with_column_filter("sex", "male")
        .with_column_filter("embarked", "s");
    // "female" contains "male", so the substring filter keeps both sexes.
    let kept = names(apply(&data, &state), data.columns());
    assert_eq!(
        kept,
        ["Braund", "Heikkinen", "Futrelle", "Allen", "McCarthy", "Palsson"]
    );
}

#[test]
fn empty_column_filter_text_is_ignored() {
    let data = passengers();
    let state = FilterState::default().with_column_filter("sex", "");
    assert_eq!(apply(&data, &state).len(), data.len());
}

#[test]
fn unknown_filter_column_reads_as_empty_text() {
    let data = passengers();
    let state = FilterState::default().with_column_filter("cabin", "c");
    assert!(apply(&data, &state).is_empty());
}

#[test]
fn cross_filter_requires_whole_value_equality() {
    let data = passengers();
    let state = FilterState::default().with_cross_filter("sex", "MALE");
    let kept = names(apply(&data, &state), data.columns());
    assert_eq!(kept, ["Braund", "Allen", "Moran", "McCarthy", "Palsson"]);
}

#[test]
fn numeric_sort_orders_by_value_not_text() {
    let data = passengers();
    let state = FilterState::default().with_sort("fare", SortDirection::Asc);
    let kept = names(apply(&data, &state), data.columns());
    assert_eq!(
        kept,
        ["Braund", "Heikkinen", "Allen", "Moran", "Palsson", "McCarthy", "Futrelle", "Cumings"]
    );
}

#[test]
fn text_sort_ignores_case_and_reverses_for_desc() {
    let data = dataset(
        &["name"],
        &[&[Some("bob")], &[Some("Alice")], &[Some("carol")], &[Some("alice")]],
    );
    let asc = FilterState::default().with_sort("name", SortDirection::Asc);
    let sorted = column_texts(
        &Dataset::new(
            data.columns().to_vec(),
            apply(&data, &asc).into_iter().map(|r| r.into_cells()).collect(),
        ),
        "name",
    );
    assert_eq!(sorted, ["Alice", "alice", "bob", "carol"]);

    let desc = FilterState::default().with_sort("name", SortDirection::Desc);
    let positions = apply_indexed(&data, &desc);
    assert_eq!(positions, [2, 0, 3, 1]);
}

#[test]
fn mixed_sort_column_orders_numbers_by_value() {
    let data = dataset(
        &["age"],
        &[&[Some("10")], &[Some("2")], &[Some("")], &[Some("35")], &[Some("4")]],
    );
    let state = FilterState::default().with_sort("age", SortDirection::Asc);
    let sorted = Dataset::new(
        data.columns().to_vec(),
        apply(&data, &state).into_iter().map(|r| r.into_cells()).collect(),
    );
    assert_eq!(column_texts(&sorted, "age"), ["", "2", "4", "10", "35"]);

    let passengers = passengers();
    let by_age = FilterState::default().with_sort("age", SortDirection::Desc);
    let kept = names(apply(&passengers, &by_age), passengers.columns());
    assert_eq!(
        kept,
        ["McCarthy", "Cumings", "Futrelle", "Allen", "Heikkinen", "Braund", "Palsson", "Moran"]
    );
}

#[test]
fn stages_compose_in_fixed_order() {
    let data = passengers();
    let state = FilterState::default()
        .with_search("s")
        .with_column_filter("sex", "male")
        .with_cross_filter("embarked", "s")
        .with_sort("age", SortDirection::Desc);
    let kept = names(apply(&data, &state), data.columns());
    assert_eq!(
        kept,
        ["McCarthy", "Futrelle", "Allen", "Heikkinen", "Braund", "Palsson"]
    );
}

#[test]
fn pipeline_is_idempotent_and_leaves_source_untouched() {
    let data = passengers();
    let before = data.clone();
    let state = FilterState::default()
        .with_search("a")
        .with_sort("fare", SortDirection::Desc);
    let first = apply(&data, &state);
    let second = apply(&data, &state);
    assert_eq!(first, second);
    assert_eq!(data, before);
}

#[test]
fn working_view_reports_sort_and_outliers() {
    let data = passengers();
    let state = FilterState::default().with_sort("fare", SortDirection::Desc);
    let view = build_working_view(&data, &state);
    assert_eq!(view.columns, data.columns());
    assert_eq!(view.sort.as_ref().map(|s| s.column.as_str()), Some("fare"));
    // fare quartiles: Q1 = 8.05, Q3 = 53.1, upper bound 120.675; nothing flagged.
    assert!(view.outlier_rows.is_empty());
    assert_eq!(view.to_dataset().len(), data.len());
}
