//! Sorting tests
//!
//! Tests for the sort toggle, typed comparisons, placement of missing
//! values and re-sorting after the view is recomputed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use dyngrid::render::SortIndicator;
use dyngrid::{Column, ColumnType, FieldKey, FilterInput};
use serde_json::{json, Value};

fn abc() -> Vec<Value> {
    vec![json!({"a": 3}), json!({"a": 1}), json!({"a": 2})]
}

fn a_column() -> Vec<Column> {
    vec![Column::new("a", "A").with_type(ColumnType::Number)]
}

fn header_sort(grid: &dyngrid::Grid<RecordingBackend>, col: usize) -> Option<SortIndicator> {
    grid.backend()
        .header
        .as_ref()
        .unwrap()
        .cells
        .iter()
        .find(|cell| cell.col == col)
        .and_then(|cell| cell.sort)
}

mod toggle {
    use super::*;

    #[test]
    fn test_first_sort_is_ascending() {
        let mut grid = grid(abc(), a_column());
        grid.sort_by(0);
        assert_eq!(column_values(&grid, "a"), vec![json!(1), json!(2), json!(3)]);
        assert!(!grid.sort_state().descending);
    }

    #[test]
    fn test_second_sort_on_same_column_is_descending() {
        let mut grid = grid(abc(), a_column());
        grid.sort_by(0);
        grid.sort_by(0);
        assert_eq!(column_values(&grid, "a"), vec![json!(3), json!(2), json!(1)]);
        assert!(grid.sort_state().descending);
    }

    #[test]
    fn test_sorting_twice_alternates() {
        let mut grid = grid(people(), people_columns());
        for round in 0..5 {
            grid.sort_by(0);
            assert_eq!(grid.sort_state().descending, round % 2 == 1);
        }
    }

    #[test]
    fn test_other_column_starts_ascending() {
        let mut grid = grid(people(), people_columns());
        grid.sort_by(0);
        grid.sort_by(0);
        grid.sort_by(2);
        assert_eq!(
            grid.sort_state().field,
            Some(FieldKey::Name("age".to_string()))
        );
        assert!(!grid.sort_state().descending);
    }

    #[test]
    fn test_header_shows_the_direction() {
        let mut grid = grid(abc(), a_column());
        assert_eq!(header_sort(&grid, 0), None);
        grid.sort_by(0);
        assert_eq!(header_sort(&grid, 0), Some(SortIndicator::Down));
        grid.sort_by(0);
        assert_eq!(header_sort(&grid, 0), Some(SortIndicator::Up));
    }

    #[test]
    fn test_unknown_column_is_ignored() {
        let mut grid = grid(abc(), a_column());
        grid.sort_by(7);
        assert_eq!(grid.sort_state().field, None);
        assert_eq!(column_values(&grid, "a"), vec![json!(3), json!(1), json!(2)]);
    }

    #[test]
    fn test_sort_rebuilds_pages() {
        let mut grid = grid(abc(), a_column());
        grid.backend_mut().take_calls();
        grid.sort_by(0);
        let calls = &grid.backend().calls;
        assert!(calls.iter().any(|c| matches!(c, Call::Reset(_))));
        let batch = grid.backend().batches()[0];
        let texts: Vec<&str> = batch
            .pages()
            .flat_map(|p| p.rows.iter())
            .map(|r| r.cells[0].text.as_str())
            .collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_missing_values_sort_last_ascending() {
        let mut grid = grid(people(), people_columns());
        grid.sort_by(2);
        assert_eq!(
            column_values(&grid, "age"),
            vec![json!(27), json!(31), json!(34), json!(45), Value::Null]
        );
    }

    #[test]
    fn test_descending_negates_missing_placement() {
        let mut grid = grid(people(), people_columns());
        grid.sort_by(2);
        grid.sort_by(2);
        assert_eq!(
            column_values(&grid, "age"),
            vec![Value::Null, json!(45), json!(34), json!(31), json!(27)]
        );
    }

    #[test]
    fn test_dates_compare_by_timestamp() {
        let mut grid = grid(people(), people_columns());
        grid.sort_by(3);
        let names: Vec<Value> = column_values(&grid, "name");
        assert_eq!(
            names,
            vec![json!("Bob"), json!("Erin"), json!("Alice"), json!("Dave"), json!("Carol")]
        );
    }

    #[test]
    fn test_text_ignores_case() {
        let rows = vec![json!({"t": "banana"}), json!({"t": "Apple"}), json!({"t": "cherry"})];
        let mut grid = grid(rows, vec![Column::new("t", "T")]);
        grid.sort_by(0);
        assert_eq!(
            column_values(&grid, "t"),
            vec![json!("Apple"), json!("banana"), json!("cherry")]
        );
    }

    #[test]
    fn test_numeric_strings_compare_numerically() {
        let rows = vec![json!({"n": "10"}), json!({"n": "9"}), json!({"n": 100})];
        let mut grid = grid(rows, vec![Column::new("n", "N").with_type(ColumnType::Number)]);
        grid.sort_by(0);
        assert_eq!(column_values(&grid, "n"), vec![json!("9"), json!("10"), json!(100)]);
    }

    #[test]
    fn test_ties_keep_load_order() {
        let rows = vec![
            json!({"k": 1, "id": "a"}),
            json!({"k": 0, "id": "b"}),
            json!({"k": 1, "id": "c"}),
            json!({"k": 0, "id": "d"}),
        ];
        let mut grid = grid(rows, vec![Column::new("k", "K").with_type(ColumnType::Number)]);
        grid.sort_by(0);
        assert_eq!(
            column_values(&grid, "id"),
            vec![json!("b"), json!("d"), json!("a"), json!("c")]
        );
    }

    #[test]
    fn test_positional_rows_sort_by_index() {
        let rows = vec![json!([3, "c"]), json!([1, "a"]), json!([2, "b"])];
        let columns = vec![
            Column::positional("Num").with_type(ColumnType::Number),
            Column::positional("Letter"),
        ];
        let mut grid = grid(rows, columns);
        grid.sort_by(1);
        let letters: Vec<&Value> = grid.data().into_iter().map(|row| &row[1]).collect();
        assert_eq!(letters, vec![&json!("a"), &json!("b"), &json!("c")]);
    }

    #[test]
    fn test_sorting_never_touches_loaded_rows() {
        let mut grid = grid(abc(), a_column());
        grid.sort_by(0);
        assert_eq!(grid.original_rows(), abc().as_slice());
        assert_eq!(grid.view(), &[1, 2, 0]);
    }
}

mod resort {
    use super::*;

    #[test]
    fn test_filter_reapplies_sort_ascending() {
        let mut grid = grid(people(), people_columns());
        grid.sort_by(2);
        grid.sort_by(2);
        grid.filter_by(
            1,
            FilterInput::List {
                values: vec!["A".to_string(), "B".to_string()],
                include_blanks: false,
                show_all: false,
            },
        );
        assert!(!grid.sort_state().descending);
        assert_eq!(column_values(&grid, "age"), vec![json!(27), json!(31), json!(34)]);
    }

    #[test]
    fn test_new_data_is_sorted_on_load() {
        let mut grid = grid(abc(), a_column());
        grid.sort_by(0);
        grid.set_data(
            vec![json!({"a": 9}), json!({"a": -1}), json!({"a": 4})],
            None,
            false,
        );
        assert_eq!(column_values(&grid, "a"), vec![json!(-1), json!(4), json!(9)]);
    }

    #[test]
    fn test_empty_dataset_sorts_without_effect() {
        let mut grid = grid(Vec::new(), a_column());
        grid.sort_by(0);
        assert!(grid.data().is_empty());
        assert_eq!(grid.sort_state().field, Some(FieldKey::Name("a".to_string())));
    }
}
