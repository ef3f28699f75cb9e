//! Column settings tests
//!
//! Tests for column resizing, visibility changes and the persistence of
//! both through the settings stores.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use common::*;
use dyngrid::settings::{
    CallbackSettings, ColumnSettings, ColumnSettingsStore, KeyValueStore, MemoryStorage,
    StorageSettings,
};
use dyngrid::{Column, Grid, GridOptions, SettingsMode};
use serde_json::json;

type Saved = Rc<RefCell<HashMap<String, ColumnSettings>>>;

/// Grid whose settings go to (and come from) a shared map keyed by settings id.
fn recorded_grid(saved: &Saved) -> Grid<RecordingBackend> {
    let on_save = Rc::clone(saved);
    let on_update = Rc::clone(saved);
    let settings = CallbackSettings::new(
        move |column: &Column| {
            if let Some(id) = column.settings_id() {
                on_save
                    .borrow_mut()
                    .insert(id.to_string(), ColumnSettings::from_column(column));
            }
        },
        move |column: &mut Column| {
            let stored = column
                .settings_id()
                .and_then(|id| on_update.borrow().get(id).copied());
            if let Some(settings) = stored {
                settings.apply(column);
            }
        },
    );
    let mut grid = Grid::new(RecordingBackend::default(), options())
        .unwrap()
        .with_settings(Box::new(settings));
    grid.set_data(people(), Some(people_columns()), false);
    grid
}

mod resize {
    use super::*;

    #[test]
    fn test_width_is_floored_and_keeps_a_border_pixel() {
        let mut grid = grid(people(), people_columns());
        grid.resize_column(0, 30.0);
        assert_eq!(grid.columns()[0].width, 41);
        grid.resize_column(0, 120.4);
        assert_eq!(grid.columns()[0].width, 121);
    }

    #[test]
    fn test_materialized_cells_follow_the_drag() {
        let mut grid = grid(people(), people_columns());
        grid.backend_mut().take_calls();
        grid.resize_column(2, 150.0);
        let calls = &grid.backend().calls;
        assert_eq!(calls[0], Call::ColumnWidth(2, 150.0));
        let header = grid.backend().header.as_ref().unwrap();
        assert_eq!(header.cells[2].width, 150.0);
    }

    #[test]
    fn test_unusable_drag_falls_back_to_the_minimum() {
        let mut grid = grid(people(), people_columns());
        grid.resize_column(1, f64::NAN);
        assert_eq!(grid.columns()[1].width, 41);
    }

    #[test]
    fn test_unknown_column_is_ignored() {
        let mut grid = grid(people(), people_columns());
        grid.backend_mut().take_calls();
        grid.resize_column(9, 200.0);
        assert!(grid.backend().calls.is_empty());
    }

    #[test]
    fn test_resize_is_saved() {
        let saved = Saved::default();
        let mut grid = recorded_grid(&saved);
        grid.resize_column(0, 180.0);
        assert_eq!(
            saved.borrow().get("name"),
            Some(&ColumnSettings {
                width: 181,
                visible: true
            })
        );
    }
}

mod visibility {
    use super::*;

    #[test]
    fn test_hiding_rebuilds_header_and_pages() {
        let mut grid = grid(people(), people_columns());
        grid.backend_mut().take_calls();
        grid.set_column_visible(1, false);

        let header = grid.backend().header.as_ref().unwrap();
        assert!(header.cells.iter().all(|cell| cell.col != 1));
        let placeholders = grid
            .backend()
            .calls
            .iter()
            .find_map(|c| match c {
                Call::Reset(nodes) => Some(nodes.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(placeholders[0].width, 400.0);
        let batch = grid.backend().batches()[0];
        assert_eq!(batch.pages().next().unwrap().rows[0].cells.len(), 4);
    }

    #[test]
    fn test_unchanged_visibility_does_nothing() {
        let mut grid = grid(people(), people_columns());
        grid.backend_mut().take_calls();
        grid.set_column_visible(1, true);
        assert!(grid.backend().calls.is_empty());
    }

    #[test]
    fn test_visibility_is_saved() {
        let saved = Saved::default();
        let mut grid = recorded_grid(&saved);
        grid.set_column_visible(3, false);
        assert_eq!(
            saved.borrow().get("joined"),
            Some(&ColumnSettings {
                width: 100,
                visible: false
            })
        );
    }
}

mod hydration {
    use super::*;

    #[test]
    fn test_columns_are_hydrated_on_load() {
        let saved = Saved::default();
        saved.borrow_mut().insert(
            "age".to_string(),
            ColumnSettings {
                width: 250,
                visible: false,
            },
        );
        let grid = recorded_grid(&saved);
        let age = &grid.columns()[2];
        assert_eq!(age.width, 250);
        assert!(!age.visible);
        assert_eq!(grid.columns()[0].width, 100);
    }

    #[test]
    fn test_local_settings_survive_a_reload() {
        let options = GridOptions {
            settings: SettingsMode::Local,
            ..options()
        };
        let mut grid = grid_with(people(), people_columns(), options);
        grid.resize_column(0, 222.0);
        grid.set_column_visible(4, false);

        grid.set_data(people(), Some(people_columns()), false);
        assert_eq!(grid.columns()[0].width, 223);
        assert!(!grid.columns()[4].visible);
    }

    #[test]
    fn test_disabled_settings_forget_changes() {
        let mut grid = grid(people(), people_columns());
        grid.resize_column(0, 222.0);
        grid.set_data(people(), Some(people_columns()), false);
        assert_eq!(grid.columns()[0].width, 100);
    }
}

mod storage {
    use super::*;

    fn column(name: &str) -> Column {
        Column::new(name, name.to_uppercase())
    }

    #[test]
    fn test_saved_as_json_under_the_prefix() {
        let mut store = StorageSettings::new(MemoryStorage::new(), "grid.");
        let mut wide = column("name");
        wide.width = 180;
        store.save_column(&wide);
        let raw = store.storage().get_item("grid.name").unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!({"width": 180, "visible": true}));
    }

    #[test]
    fn test_update_reads_back_what_was_saved() {
        let mut store = StorageSettings::new(MemoryStorage::new(), "grid.");
        let mut hidden = column("team");
        hidden.visible = false;
        store.save_column(&hidden);

        let mut fresh = column("team");
        store.update_column(&mut fresh);
        assert!(!fresh.visible);
    }

    #[test]
    fn test_stored_width_is_clamped() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item("grid.age", r#"{"width": 10, "visible": true}"#)
            .unwrap();
        let mut store = StorageSettings::new(storage, "grid.");
        let mut age = column("age");
        store.update_column(&mut age);
        assert_eq!(age.width, 40);
    }

    #[test]
    fn test_malformed_entries_are_ignored() {
        let mut storage = MemoryStorage::new();
        storage.set_item("grid.age", "not json").unwrap();
        let mut store = StorageSettings::new(storage, "grid.");
        let mut age = column("age").with_width(120);
        store.update_column(&mut age);
        assert_eq!(age.width, 120);
        assert!(age.visible);
    }

    #[test]
    fn test_settings_id_prefers_id_then_field_then_name() {
        let mut column = Column::new("field", "Name");
        assert_eq!(column.settings_id(), Some("field"));
        column.id = Some("id".to_string());
        assert_eq!(column.settings_id(), Some("id"));
        assert_eq!(Column::positional("Only").settings_id(), Some("Only"));
    }

    #[test]
    fn test_column_without_identity_is_not_persisted() {
        let mut store = StorageSettings::new(MemoryStorage::new(), "grid.");
        let anonymous = Column::positional("");
        store.save_column(&anonymous);
        assert_eq!(store.storage().get_item("grid.").unwrap(), None);
    }
}
