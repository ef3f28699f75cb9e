//! Browser tests for the DOM backend
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use dyngrid::render::DomRenderer;
use dyngrid::{Column, ColumnType, Grid, GridOptions, Location, SettingsMode};
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

fn host() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let el = document
        .create_element("div")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    document.body().unwrap().append_child(&el).unwrap();
    el
}

fn options() -> GridOptions {
    GridOptions {
        settings: SettingsMode::None,
        ..GridOptions::default()
    }
}

fn loaded(count: usize, options: GridOptions) -> (Grid<DomRenderer>, HtmlElement) {
    let el = host();
    let renderer = DomRenderer::new(el.clone()).unwrap();
    let mut grid = Grid::new(renderer, options).unwrap();
    let rows = (0..count)
        .map(|i| json!({"id": i, "name": format!("row {i}")}))
        .collect();
    let columns = vec![
        Column::new("id", "Id").with_type(ColumnType::Number),
        Column::new("name", "Name"),
    ];
    grid.set_data(rows, Some(columns), false);
    (grid, el)
}

fn count(el: &HtmlElement, selector: &str) -> u32 {
    el.query_selector_all(selector).unwrap().length()
}

#[wasm_bindgen_test]
fn test_builds_header_and_row_container() {
    let (_grid, el) = loaded(10, options());
    assert!(el.class_list().contains("dyngrid"));
    assert_eq!(count(&el, ".dyngrid-header"), 1);
    assert_eq!(count(&el, ".dyngrid-rows"), 1);
    assert_eq!(count(&el, ".dyngrid-header-cell[data-col]"), 2);
}

#[wasm_bindgen_test]
fn test_materializes_visible_pages_over_placeholders() {
    let (grid, el) = loaded(1000, options());
    let rendered = grid.pages().rendered_count();
    let pages = grid.pages().page_count();
    assert_eq!(count(&el, ".dyngrid-page"), u32::try_from(rendered).unwrap());
    assert_eq!(
        count(&el, ".dyngrid-placeholder"),
        u32::try_from(pages - rendered).unwrap()
    );
    let first = el
        .query_selector(".dyngrid-cell[data-row=\"0\"][data-col=\"1\"]")
        .unwrap()
        .unwrap();
    assert_eq!(first.text_content().as_deref(), Some("row 0"));
}

#[wasm_bindgen_test]
fn test_update_row_patches_the_cell_in_place() {
    let (mut grid, el) = loaded(10, options());
    grid.update_row(3, json!({"id": 3, "name": "patched"}))
        .unwrap();
    let cell = el
        .query_selector(".dyngrid-cell[data-row=\"3\"][data-col=\"1\"]")
        .unwrap()
        .unwrap();
    assert_eq!(cell.text_content().as_deref(), Some("patched"));
}

#[wasm_bindgen_test]
fn test_selection_moves_the_selected_class() {
    let (mut grid, el) = loaded(10, options());
    grid.select_row(Location::new(2, 1));
    grid.select_row(Location::new(4, 1));
    assert_eq!(count(&el, ".dyngrid-row.dyngrid-selected"), 1);
    assert_eq!(count(&el, ".dyngrid-row.dyngrid-selected[data-row=\"4\"]"), 1);
}

#[wasm_bindgen_test]
fn test_check_boxes_follow_the_model() {
    let options = GridOptions {
        show_counter: true,
        show_check: true,
        ..options()
    };
    let (mut grid, el) = loaded(10, options);
    grid.toggle_check(1, true);
    let input = el
        .query_selector(".dyngrid-check[data-row=\"1\"]")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlInputElement>()
        .unwrap();
    assert!(input.checked());
}

#[wasm_bindgen_test]
fn test_reload_replaces_every_page() {
    let (mut grid, el) = loaded(1000, options());
    grid.set_data(vec![json!({"id": 1, "name": "only"})], None, false);
    assert_eq!(count(&el, ".dyngrid-page"), 1);
    assert_eq!(count(&el, ".dyngrid-placeholder"), 0);
    assert_eq!(count(&el, ".dyngrid-row"), 1);
}
