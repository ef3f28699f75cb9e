//! Selection and keyboard navigation tests
//!
//! Tests for row selection, scroll-into-view, arrow keys, type-ahead,
//! check boxes and the row events they emit.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use dyngrid::{Column, GridEvent, GridOptions, Key, Location};
use serde_json::{json, Value};

/// Grid whose row container is 100px tall (under a 35px header).
fn short_grid(count: usize) -> dyngrid::Grid<RecordingBackend> {
    let mut grid = grid(numbered_rows(count), numbered_columns());
    grid.resize(800.0, 135.0);
    grid.backend_mut().take_calls();
    grid
}

fn scroll_calls(grid: &dyngrid::Grid<RecordingBackend>) -> Vec<f64> {
    grid.backend()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::ScrollTop(top) => Some(*top),
            _ => None,
        })
        .collect()
}

mod scroll_into_view {
    use super::*;

    #[test]
    fn test_row_below_scrolls_down_by_the_overflow() {
        let mut grid = short_grid(20);
        grid.select_row(Location::new(3, 1));
        // Row 3 spans 105..140, visible bottom is 100
        assert_eq!(scroll_calls(&grid), vec![40.0]);
        assert_eq!(grid.viewport().scroll_top, 40.0);
    }

    #[test]
    fn test_row_above_scrolls_up_to_its_top() {
        let mut grid = short_grid(20);
        grid.select_row(Location::new(10, 1));
        grid.backend_mut().take_calls();
        grid.select_row(Location::new(2, 1));
        assert_eq!(scroll_calls(&grid), vec![70.0]);
    }

    #[test]
    fn test_visible_row_does_not_scroll() {
        let mut grid = short_grid(20);
        grid.select_row(Location::new(1, 1));
        assert!(scroll_calls(&grid).is_empty());
        assert_eq!(grid.backend().selected, Some(1));
    }

    #[test]
    fn test_far_row_renders_its_page() {
        let mut grid = short_grid(1000);
        grid.select_row(Location::new(500, 1));
        assert!(grid.pages().is_rendered(10));
        assert!(grid.backend().rendered.contains(&10));
    }

    #[test]
    fn test_out_of_range_location_is_clamped() {
        let mut grid = short_grid(20);
        grid.select_row(Location::new(99, 9));
        assert_eq!(grid.location(), Some(Location::new(19, 1)));
    }
}

mod keys {
    use super::*;

    #[test]
    fn test_key_names_from_the_dom() {
        assert_eq!(Key::from_dom("ArrowUp"), Key::Up);
        assert_eq!(Key::from_dom("ArrowDown"), Key::Down);
        assert_eq!(Key::from_dom("a"), Key::Char('a'));
        assert_eq!(Key::from_dom("Enter"), Key::Other);
        assert_eq!(Key::from_dom("Shift"), Key::Other);
    }

    #[test]
    fn test_first_key_starts_from_the_default_location() {
        let mut grid = short_grid(20);
        assert!(grid.handle_key(Key::Down, 0.0));
        assert_eq!(grid.location(), Some(Location::new(1, 1)));
    }

    #[test]
    fn test_arrows_move_one_row_and_clamp() {
        let mut grid = short_grid(3);
        grid.select_row(Location::new(0, 0));
        assert!(grid.handle_key(Key::Up, 0.0));
        assert_eq!(grid.location().unwrap().row, 0);
        grid.handle_key(Key::Down, 0.0);
        grid.handle_key(Key::Down, 0.0);
        grid.handle_key(Key::Down, 0.0);
        assert_eq!(grid.location(), Some(Location::new(2, 0)));
    }

    #[test]
    fn test_keys_on_an_empty_view_do_nothing() {
        let mut grid = grid(Vec::new(), numbered_columns());
        assert!(!grid.handle_key(Key::Down, 0.0));
        assert!(!grid.handle_key(Key::Char('a'), 0.0));
        assert_eq!(grid.location(), None);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut grid = short_grid(3);
        assert!(!grid.handle_key(Key::Other, 0.0));
        assert_eq!(grid.location(), None);
    }
}

mod typeahead {
    use super::*;

    fn fruit() -> dyngrid::Grid<RecordingBackend> {
        let rows = ["banana", "apple", "cherry", "apricot", "blueberry"]
            .iter()
            .map(|name| json!([name]))
            .collect();
        grid(rows, vec![Column::positional("Fruit")])
    }

    #[test]
    fn test_jumps_to_the_earliest_match_position() {
        let mut grid = fruit();
        // "banana" contains "A" too, but "apple" starts with it
        assert!(grid.handle_key(Key::Char('a'), 0.0));
        assert_eq!(grid.location().unwrap().row, 1);
    }

    #[test]
    fn test_buffer_accumulates_within_the_reset_period() {
        let mut grid = fruit();
        grid.handle_key(Key::Char('a'), 0.0);
        grid.handle_key(Key::Char('p'), 100.0);
        assert_eq!(grid.location().unwrap().row, 1);
        grid.handle_key(Key::Char('r'), 200.0);
        assert_eq!(grid.location().unwrap().row, 3);
    }

    #[test]
    fn test_search_wraps_past_the_last_row() {
        let mut grid = fruit();
        grid.select_row(Location::new(4, 0));
        assert!(grid.handle_key(Key::Char('c'), 5000.0));
        assert_eq!(grid.location().unwrap().row, 2);
    }

    #[test]
    fn test_buffer_resets_after_inactivity() {
        let mut grid = fruit();
        grid.handle_key(Key::Char('c'), 0.0);
        assert_eq!(grid.location().unwrap().row, 2);
        // "ch" would stay on cherry; a fresh "b" finds blueberry from row 2
        grid.handle_key(Key::Char('b'), 1500.0);
        assert_eq!(grid.location().unwrap().row, 4);
    }

    #[test]
    fn test_no_match_keeps_the_selection() {
        let mut grid = fruit();
        grid.select_row(Location::new(2, 0));
        assert!(!grid.handle_key(Key::Char('z'), 0.0));
        assert_eq!(grid.location().unwrap().row, 2);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let mut grid = fruit();
        grid.handle_key(Key::Char('B'), 0.0);
        grid.handle_key(Key::Char('L'), 10.0);
        assert_eq!(grid.location().unwrap().row, 4);
    }
}

mod events {
    use super::*;

    #[test]
    fn test_load_emits_one_data_change() {
        let mut grid = grid(people(), people_columns());
        assert_eq!(grid.drain_events(), vec![GridEvent::DataChange { filtered: 5 }]);
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_select_emits_row_select_with_the_record() {
        let mut grid = grid(people(), people_columns());
        grid.drain_events();
        grid.click_cell(1, 2);
        assert_eq!(
            grid.drain_events(),
            vec![GridEvent::RowSelect {
                row_index: 1,
                row: people()[1].clone(),
            }]
        );
        assert_eq!(grid.location(), Some(Location::new(1, 2)));
    }

    #[test]
    fn test_double_click_emits_row_double_click() {
        let mut grid = grid(people(), people_columns());
        grid.drain_events();
        grid.double_click(3);
        grid.double_click(30);
        assert_eq!(
            grid.drain_events(),
            vec![GridEvent::RowDoubleClick {
                row_index: 3,
                row: people()[3].clone(),
            }]
        );
    }

    #[test]
    fn test_counter_click_selects_column_zero() {
        let mut grid = grid(people(), people_columns());
        grid.click_counter(2);
        assert_eq!(grid.location(), Some(Location::new(2, 0)));
    }

    #[test]
    fn test_events_serialize_for_listeners() {
        let event = GridEvent::RowSelect {
            row_index: 2,
            row: json!({"a": 1}),
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"type": "rowSelect", "rowIndex": 2, "row": {"a": 1}}));
    }
}

mod checks {
    use super::*;

    fn checked_grid() -> dyngrid::Grid<RecordingBackend> {
        let options = GridOptions {
            show_counter: true,
            show_check: true,
            ..options()
        };
        grid_with(people(), people_columns(), options)
    }

    #[test]
    fn test_toggle_check_marks_and_selects_the_row() {
        let mut grid = checked_grid();
        grid.backend_mut().take_calls();
        grid.toggle_check(2, true);
        assert!(grid.is_checked(2));
        assert!(grid.backend().calls.contains(&Call::Checked(2, true)));
        assert_eq!(grid.location(), Some(Location::new(2, 1)));
    }

    #[test]
    fn test_checked_rows_come_back_in_load_order() {
        let mut grid = checked_grid();
        grid.toggle_check(4, true);
        grid.toggle_check(0, true);
        grid.toggle_check(2, true);
        grid.toggle_check(2, false);
        let names: Vec<&Value> = grid.checked_rows().into_iter().map(|r| &r["name"]).collect();
        assert_eq!(names, vec![&json!("Alice"), &json!("Erin")]);
    }

    #[test]
    fn test_checks_follow_the_record_through_a_sort() {
        let mut grid = checked_grid();
        grid.toggle_check(0, true);
        grid.sort_by(0);
        grid.sort_by(0);
        // Descending by name puts Alice last
        assert!(grid.is_checked(4));
        assert!(!grid.is_checked(0));
        let batch = grid.backend().batches().last().copied().unwrap();
        let counter = batch.pages().next().unwrap().rows[4].counter.clone().unwrap();
        assert_eq!(counter.check, Some(true));
    }

    #[test]
    fn test_reload_clears_checks() {
        let mut grid = checked_grid();
        grid.toggle_check(1, true);
        grid.set_data(people(), None, false);
        assert!(grid.checked_rows().is_empty());
    }
}

mod default_location {
    use super::*;
    use std::rc::Rc;

    struct NoopEditor;

    impl dyngrid::editor::CellEditor for NoopEditor {
        fn activate(&self, _activation: &dyngrid::editor::Activation<'_>) {}
        fn hide(&self) {}
        fn subscribe(&self, _callback: dyngrid::editor::EditorCallback) {}
    }

    #[test]
    fn test_prefers_the_first_editable_column() {
        let mut columns = people_columns();
        columns[3] = columns[3].clone().with_editor(Rc::new(NoopEditor));
        let grid = grid(people(), columns);
        assert_eq!(grid.default_location(), Location::new(0, 3));
    }

    #[test]
    fn test_falls_back_to_column_one() {
        let grid = grid(people(), people_columns());
        assert_eq!(grid.default_location(), Location::new(0, 1));
    }

    #[test]
    fn test_single_column_grid_uses_column_zero() {
        let grid = grid(people(), vec![Column::new("name", "Name")]);
        assert_eq!(grid.default_location(), Location::new(0, 0));
    }
}
