//! `web-sys` DOM backend.
//!
//! Layout inside the host element:
//!
//! ```text
//! div.dyngrid (focusable)
//! ├── div.dyngrid-header        fixed, scrolled horizontally with the rows
//! │   └── div.dyngrid-header-row
//! └── div.dyngrid-rows          the scrolling row container
//!     ├── div.dyngrid-page      materialized page (div.dyngrid-row > div.dyngrid-cell)
//!     └── div.dyngrid-placeholder
//! ```
//!
//! Cells and rows carry `data-row` / `data-col` attributes; the viewer reads
//! them back from event targets.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use super::backend::{
    CellNode, CellRect, CounterNode, GridBackend, HeaderNode, PageBatch, PageNode,
    PlaceholderNode, RowNode, SortIndicator,
};
use super::builder::{CELL_CLASS, COUNTER_CLASS, PAGE_CLASS, PLACEHOLDER_CLASS, SELECTED_CLASS};
use crate::error::{GridError, Result};

pub const GRID_CLASS: &str = "dyngrid";
pub const HEADER_CLASS: &str = "dyngrid-header";
pub const HEADER_CELL_CLASS: &str = "dyngrid-header-cell";
pub const ROWS_CLASS: &str = "dyngrid-rows";
pub const ROW_CLASS: &str = "dyngrid-row";
pub const CHECK_CLASS: &str = "dyngrid-check";
pub const SORT_BUTTON_CLASS: &str = "dyngrid-sort";
pub const FILTER_BUTTON_CLASS: &str = "dyngrid-filter-button";
pub const RESIZE_CLASS: &str = "dyngrid-resize";
pub const SETTINGS_BUTTON_CLASS: &str = "dyngrid-settings-button";
pub const SORTED_CLASS: &str = "dyngrid-sorted";
pub const FILTERED_CLASS: &str = "dyngrid-filtered";

pub(crate) fn create(document: &Document, tag: &str, class: &str) -> Option<HtmlElement> {
    let el = document.create_element(tag).ok()?;
    el.set_class_name(class);
    el.dyn_into::<HtmlElement>().ok()
}

fn set_px(el: &HtmlElement, property: &str, value: f64) {
    let _ = el.style().set_property(property, &format!("{value}px"));
}

/// Read a `data-*` index attribute.
pub fn data_index(el: &Element, name: &str) -> Option<usize> {
    el.get_attribute(name)?.parse().ok()
}

/// Renders the grid into a host element with plain DOM nodes.
pub struct DomRenderer {
    document: Document,
    container: HtmlElement,
    header: HtmlElement,
    header_row: HtmlElement,
    rows: HtmlElement,
    placeholders: HashMap<usize, HtmlElement>,
    pages: HashMap<usize, HtmlElement>,
}

impl DomRenderer {
    /// Build the header and row container inside `container`.
    pub fn new(container: HtmlElement) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| GridError::Dom("no document".into()))?;
        let missing = || GridError::Dom("element creation failed".into());

        container.set_inner_html("");
        let _ = container.class_list().add_1(GRID_CLASS);
        container.set_tab_index(0);
        let style = container.style();
        let _ = style.set_property("overflow", "hidden");
        let _ = style.set_property("position", "relative");
        let _ = style.set_property("outline", "none");

        let header = create(&document, "div", HEADER_CLASS).ok_or_else(missing)?;
        let _ = header.style().set_property("overflow", "hidden");
        let _ = header.style().set_property("white-space", "nowrap");
        let header_row = create(&document, "div", "dyngrid-header-row").ok_or_else(missing)?;
        let _ = header_row.style().set_property("display", "flex");
        let rows = create(&document, "div", ROWS_CLASS).ok_or_else(missing)?;
        let _ = rows.style().set_property("overflow", "auto");
        let _ = rows.style().set_property("position", "relative");

        header
            .append_child(&header_row)
            .map_err(|e| GridError::Dom(format!("{e:?}")))?;
        container
            .append_child(&header)
            .map_err(|e| GridError::Dom(format!("{e:?}")))?;
        container
            .append_child(&rows)
            .map_err(|e| GridError::Dom(format!("{e:?}")))?;

        Ok(Self {
            document,
            container,
            header,
            header_row,
            rows,
            placeholders: HashMap::new(),
            pages: HashMap::new(),
        })
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    pub fn header(&self) -> &HtmlElement {
        &self.header
    }

    /// The scrolling row container.
    pub fn rows(&self) -> &HtmlElement {
        &self.rows
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Size the whole grid; the row container gets what the header leaves.
    pub fn set_size(&self, width: f64, height: f64, header_height: f64) {
        set_px(&self.container, "width", width);
        set_px(&self.container, "height", height);
        set_px(&self.header, "width", width);
        set_px(&self.header, "height", header_height);
        set_px(&self.rows, "width", width);
        set_px(&self.rows, "height", (height - header_height).max(0.0));
    }

    fn placeholder_element(&self, node: &PlaceholderNode) -> Option<HtmlElement> {
        let el = create(&self.document, "div", PLACEHOLDER_CLASS)?;
        let _ = el.set_attribute("data-page", &node.page.to_string());
        set_px(&el, "height", node.height);
        set_px(&el, "width", node.width);
        let _ = el.style().set_property("margin", "0");
        Some(el)
    }

    fn apply_cell(el: &HtmlElement, cell: &CellNode) {
        el.set_class_name(&cell.classes.join(" "));
        el.set_text_content(Some(&cell.text));
        set_px(el, "width", cell.width);
    }

    fn cell_element(&self, cell: &CellNode) -> Option<HtmlElement> {
        let el = create(&self.document, "div", CELL_CLASS)?;
        let _ = el.set_attribute("data-row", &cell.row.to_string());
        let _ = el.set_attribute("data-col", &cell.col.to_string());
        Self::apply_cell(&el, cell);
        set_px(&el, "height", cell.height);
        set_px(&el, "line-height", cell.height);
        let style = el.style();
        let _ = style.set_property("overflow", "hidden");
        let _ = style.set_property("white-space", "nowrap");
        let _ = style.set_property("flex", "none");
        Some(el)
    }

    fn counter_element(&self, counter: &CounterNode) -> Option<HtmlElement> {
        let el = create(
            &self.document,
            "div",
            &format!("{CELL_CLASS} {COUNTER_CLASS}"),
        )?;
        let _ = el.set_attribute("data-row", &counter.row.to_string());
        set_px(&el, "width", counter.width);
        set_px(&el, "height", counter.height);
        set_px(&el, "line-height", counter.height);
        let _ = el.style().set_property("flex", "none");
        if let Some(checked) = counter.check {
            let input = self
                .document
                .create_element("input")
                .ok()?
                .dyn_into::<HtmlInputElement>()
                .ok()?;
            input.set_type("checkbox");
            input.set_class_name(CHECK_CLASS);
            input.set_checked(checked);
            let _ = input.set_attribute("data-row", &counter.row.to_string());
            let _ = input.style().set_property("float", "left");
            let _ = el.append_child(&input);
        }
        let number = self.document.create_text_node(&counter.number.to_string());
        let _ = el.append_child(&number);
        Some(el)
    }

    fn row_element(&self, row: &RowNode) -> Option<HtmlElement> {
        let class = if row.selected {
            format!("{ROW_CLASS} {SELECTED_CLASS}")
        } else {
            ROW_CLASS.to_string()
        };
        let el = create(&self.document, "div", &class)?;
        let _ = el.set_attribute("data-row", &row.row.to_string());
        let _ = el.style().set_property("display", "flex");
        if let Some(counter) = row.counter.as_ref().and_then(|c| self.counter_element(c)) {
            let _ = el.append_child(&counter);
        }
        for cell in row.cells.iter().filter_map(|c| self.cell_element(c)) {
            let _ = el.append_child(&cell);
        }
        Some(el)
    }

    fn page_element(&self, page: &PageNode) -> Option<HtmlElement> {
        let el = create(&self.document, "div", PAGE_CLASS)?;
        let _ = el.set_attribute("data-page", &page.page.to_string());
        for row in page.rows.iter().filter_map(|r| self.row_element(r)) {
            let _ = el.append_child(&row);
        }
        Some(el)
    }

    fn find(&self, selector: &str) -> Option<HtmlElement> {
        self.rows
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn find_all(&self, root: &HtmlElement, selector: &str) -> Vec<HtmlElement> {
        let Ok(list) = root.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }
}

impl GridBackend for DomRenderer {
    fn reset_pages(&mut self, placeholders: &[PlaceholderNode]) {
        self.rows.set_inner_html("");
        self.pages.clear();
        self.placeholders.clear();
        let fragment = self.document.create_document_fragment();
        for node in placeholders {
            if let Some(el) = self.placeholder_element(node) {
                let _ = fragment.append_child(&el);
                self.placeholders.insert(node.page, el);
            }
        }
        let _ = self.rows.append_child(&fragment);
    }

    fn materialize(&mut self, batch: &PageBatch) {
        for run in &batch.runs {
            let Some(anchor) = run
                .first_page()
                .and_then(|page| self.placeholders.get(&page))
                .cloned()
            else {
                continue;
            };
            let fragment = self.document.create_document_fragment();
            for page in &run.pages {
                if let Some(el) = self.page_element(page) {
                    let _ = fragment.append_child(&el);
                    self.pages.insert(page.page, el);
                }
            }
            let _ = self.rows.insert_before(&fragment, Some(&anchor));
            for page in &run.pages {
                if let Some(placeholder) = self.placeholders.remove(&page.page) {
                    placeholder.remove();
                }
            }
        }
    }

    fn evict(&mut self, placeholders: &[PlaceholderNode]) {
        for node in placeholders {
            let Some(page) = self.pages.remove(&node.page) else {
                continue;
            };
            if let Some(el) = self.placeholder_element(node) {
                let _ = self.rows.replace_child(&el, &page);
                self.placeholders.insert(node.page, el);
            }
        }
    }

    fn render_header(&mut self, header: &HeaderNode) {
        self.header_row.set_inner_html("");
        set_px(&self.header, "height", header.height);

        if let Some(width) = header.counter_width {
            if let Some(el) = create(&self.document, "div", &format!("{HEADER_CELL_CLASS} counter")) {
                set_px(&el, "width", width);
                set_px(&el, "height", header.height);
                let _ = el.style().set_property("flex", "none");
                let _ = self.header_row.append_child(&el);
            }
        }

        for cell in &header.cells {
            let mut class = HEADER_CELL_CLASS.to_string();
            if let Some(sort) = cell.sort {
                class.push(' ');
                class.push_str(SORTED_CLASS);
                class.push_str(match sort {
                    SortIndicator::Down => " down",
                    SortIndicator::Up => " up",
                });
            }
            if cell.filtered {
                class.push(' ');
                class.push_str(FILTERED_CLASS);
            }
            let Some(el) = create(&self.document, "div", &class) else {
                continue;
            };
            let _ = el.set_attribute("data-col", &cell.col.to_string());
            set_px(&el, "width", cell.width);
            set_px(&el, "height", header.height);
            set_px(&el, "line-height", header.height);
            let style = el.style();
            let _ = style.set_property("position", "relative");
            let _ = style.set_property("flex", "none");
            let _ = style.set_property("overflow", "hidden");

            if let Some(sort) = create(&self.document, "a", SORT_BUTTON_CLASS) {
                let _ = sort.set_attribute("data-col", &cell.col.to_string());
                sort.set_text_content(Some(&cell.name));
                let _ = el.append_child(&sort);
            }
            if cell.filterable {
                if let Some(filter) = create(&self.document, "a", FILTER_BUTTON_CLASS) {
                    let _ = filter.set_attribute("data-col", &cell.col.to_string());
                    filter.set_text_content(Some("\u{25be}"));
                    let _ = el.append_child(&filter);
                }
            }
            if let Some(resize) = create(&self.document, "div", RESIZE_CLASS) {
                let _ = resize.set_attribute("data-col", &cell.col.to_string());
                let style = resize.style();
                let _ = style.set_property("position", "absolute");
                let _ = style.set_property("right", "0");
                let _ = style.set_property("top", "0");
                let _ = style.set_property("width", "5px");
                let _ = style.set_property("height", "100%");
                let _ = style.set_property("cursor", "col-resize");
                let _ = el.append_child(&resize);
            }
            let _ = self.header_row.append_child(&el);
        }

        if header.settings_button {
            if let Some(el) = create(&self.document, "div", &format!("{HEADER_CELL_CLASS} settings")) {
                set_px(&el, "width", 17.0);
                set_px(&el, "height", header.height);
                let _ = el.style().set_property("flex", "none");
                if let Some(button) = create(&self.document, "a", SETTINGS_BUTTON_CLASS) {
                    button.set_text_content(Some("+/-"));
                    let _ = el.append_child(&button);
                }
                let _ = self.header_row.append_child(&el);
            }
        }
    }

    fn update_cell(&mut self, cell: &CellNode) {
        let selector = format!(
            ".{CELL_CLASS}[data-row=\"{}\"][data-col=\"{}\"]",
            cell.row, cell.col
        );
        if let Some(el) = self.find(&selector) {
            Self::apply_cell(&el, cell);
        }
    }

    fn set_selected_row(&mut self, row: Option<usize>) {
        for el in self.find_all(&self.rows, &format!(".{ROW_CLASS}.{SELECTED_CLASS}")) {
            let _ = el.class_list().remove_1(SELECTED_CLASS);
        }
        let Some(row) = row else {
            return;
        };
        if let Some(el) = self.find(&format!(".{ROW_CLASS}[data-row=\"{row}\"]")) {
            let _ = el.class_list().add_1(SELECTED_CLASS);
        }
    }

    fn set_row_checked(&mut self, row: usize, checked: bool) {
        if let Some(input) = self
            .find(&format!(".{CHECK_CLASS}[data-row=\"{row}\"]"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_checked(checked);
        }
    }

    fn set_column_width(&mut self, col: usize, width: f64) {
        for el in self.find_all(&self.rows, &format!(".{CELL_CLASS}[data-col=\"{col}\"]")) {
            set_px(&el, "width", width);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn set_scroll_top(&mut self, scroll_top: f64) {
        self.rows.set_scroll_top(scroll_top.round() as i32);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn set_header_scroll_left(&mut self, scroll_left: f64) {
        self.header.set_scroll_left(scroll_left.round() as i32);
    }

    fn cell_rect(&self, row: usize, col: usize) -> Option<CellRect> {
        let el = self.find(&format!(
            ".{CELL_CLASS}[data-row=\"{row}\"][data-col=\"{col}\"]"
        ))?;
        let rect = el.get_bounding_client_rect();
        Some(CellRect {
            top: rect.top(),
            left: rect.left(),
            width: rect.width(),
            height: rect.height(),
        })
    }
}
