//! Filter and column-settings pop-ups.
//!
//! Pop-ups are absolutely positioned inside the grid container, just below the
//! header cell that opened them, and pulled left so they never cross the
//! grid's right edge. At most one is open; it closes on a press outside it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement, Node,
};

use super::{update_weak, Listener, SharedState};
use crate::dates::parse_date_str;
use crate::grid::{FilterPopup, ListChoice};
use crate::render::dom::{create, HEADER_CELL_CLASS};
use crate::types::{BlanksMode, FilterInput};

pub const POPUP_CLASS: &str = "dyngrid-popup";
const SHOW_ALL: &str = "-show-all";
const BLANKS: &str = "-blanks";

/// The open pop-up. Removed from the DOM when dropped.
pub(crate) struct Popup {
    element: HtmlElement,
    /// Column and input of a search pop-up, for flushing a pending debounce
    search: Option<(usize, HtmlInputElement)>,
    #[allow(dead_code)]
    listeners: Vec<Listener>,
    #[allow(dead_code)]
    debounce: Option<Closure<dyn FnMut()>>,
}

impl Popup {
    fn new(element: HtmlElement, listeners: Vec<Listener>) -> Self {
        Self {
            element,
            search: None,
            listeners,
            debounce: None,
        }
    }

    pub(crate) fn contains(&self, node: Option<&Node>) -> bool {
        self.element.contains(node)
    }
}

impl Drop for Popup {
    fn drop(&mut self) {
        self.element.remove();
    }
}

fn cancel_search_timer(s: &mut SharedState) -> bool {
    let Some(id) = s.search_timer.take() else {
        return false;
    };
    if let Some(window) = web_sys::window() {
        window.clear_timeout_with_handle(id);
    }
    true
}

/// Close the open pop-up. A search still waiting on its debounce is applied
/// first.
pub(crate) fn close(s: &mut SharedState) {
    let Some(popup) = s.popup.take() else {
        return;
    };
    if cancel_search_timer(s) {
        if let Some((col, input)) = popup.search.as_ref() {
            s.grid.filter_by(*col, FilterInput::Search { text: input.value() });
        }
    }
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn link(document: &Document, text: &str) -> Option<HtmlElement> {
    let el = create(document, "a", "dyngrid-popup-link")?;
    let _ = el.set_attribute("href", "javascript:void(0)");
    el.set_text_content(Some(text));
    Some(el)
}

fn input(document: &Document, kind: &str) -> Option<HtmlInputElement> {
    let input = document
        .create_element("input")
        .ok()?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    input.set_type(kind);
    Some(input)
}

/// Attach to the container, place under `anchor` and make it the open pop-up.
fn show(state: &Rc<RefCell<SharedState>>, popup: Popup, anchor: &HtmlElement) {
    let Ok(mut s) = state.try_borrow_mut() else {
        return;
    };
    let container = s.grid.backend().container().clone();
    let style = popup.element.style();
    let _ = style.set_property("position", "absolute");
    let _ = style.set_property("z-index", "100");
    let _ = style.set_property("display", "block");
    if container.append_child(&popup.element).is_err() {
        return;
    }

    let bounds = container.get_bounding_client_rect();
    let cell = anchor.get_bounding_client_rect();
    let width = f64::from(popup.element.offset_width());
    let max_right = f64::from(container.client_width());
    let mut left = cell.left() - bounds.left();
    if left + width > max_right {
        left = max_right - width;
    }
    let top = cell.bottom() - bounds.top() - 1.0;
    let _ = style.set_property("left", &format!("{}px", left.max(0.0)));
    let _ = style.set_property("top", &format!("{top}px"));
    s.popup = Some(popup);
}

/// Open the filter pop-up of the column at `col` under its header cell.
pub(crate) fn open_filter(state: &Rc<RefCell<SharedState>>, col: usize, anchor: &HtmlElement) {
    let Some(content) = super::update(state, |s| {
        close(s);
        s.grid.filter_popup(col)
    })
    .flatten() else {
        return;
    };
    let Some(document) = document() else {
        return;
    };
    let weak = Rc::downgrade(state);
    let debounce_ms = state
        .try_borrow()
        .map(|s| s.grid.options().search_debounce_ms)
        .unwrap_or(150);

    let popup = match content {
        FilterPopup::List {
            blanks, choices, ..
        } => list_popup(&document, &weak, col, blanks, &choices),
        FilterPopup::Search { text } => search_popup(&document, &weak, col, &text, debounce_ms),
        FilterPopup::DateRange {
            mode,
            start_ms,
            end_ms,
        } => date_popup(&document, &weak, col, mode, start_ms, end_ms),
    };
    let Some(popup) = popup else {
        return;
    };
    let focus = popup.search.as_ref().map(|(_, input)| input.clone());
    show(state, popup, anchor);
    if let Some(input) = focus {
        let _ = input.focus();
        input.select();
    }
}

fn list_popup(
    document: &Document,
    weak: &Weak<RefCell<SharedState>>,
    col: usize,
    blanks: bool,
    choices: &[ListChoice],
) -> Option<Popup> {
    let element = create(document, "div", &format!("{POPUP_CLASS} dyngrid-filter-list"))?;
    let select = document
        .create_element("select")
        .ok()?
        .dyn_into::<HtmlSelectElement>()
        .ok()?;
    select.set_multiple(true);
    select.set_size(10);

    let add = |value: &str, label: &str, selected: bool| {
        if let Ok(option) = HtmlOptionElement::new_with_text_and_value(label, value) {
            option.set_selected(selected);
            let _ = select.append_child(&option);
        }
    };
    add(SHOW_ALL, "Show All", false);
    add(BLANKS, "Blanks", blanks);
    for choice in choices {
        add(&choice.value, &choice.label, choice.selected);
    }
    element.append_child(&select).ok()?;

    let weak = Weak::clone(weak);
    let source = select.clone();
    let listener = Listener::new(&select, "change", move |_event| {
        let options = source.selected_options();
        let selected: Vec<String> = (0..options.length())
            .filter_map(|i| options.item(i))
            .filter_map(|el| el.dyn_into::<HtmlOptionElement>().ok())
            .map(|option| option.value())
            .collect();
        let input = FilterInput::List {
            show_all: selected.iter().any(|v| v == SHOW_ALL),
            include_blanks: selected.iter().any(|v| v == BLANKS),
            values: selected
                .into_iter()
                .filter(|v| v != SHOW_ALL && v != BLANKS)
                .collect(),
        };
        update_weak(&weak, |s| s.grid.filter_by(col, input));
    });
    Some(Popup::new(element, vec![listener]))
}

fn search_popup(
    document: &Document,
    weak: &Weak<RefCell<SharedState>>,
    col: usize,
    text: &str,
    debounce_ms: u32,
) -> Option<Popup> {
    let element = create(document, "div", &format!("{POPUP_CLASS} dyngrid-filter-search"))?;
    let clear = link(document, "Clear")?;
    let search = input(document, "text")?;
    search.set_value(text);
    element.append_child(&clear).ok()?;
    element.append_child(&search).ok()?;

    let debounce = {
        let weak = Weak::clone(weak);
        let search = search.clone();
        Closure::wrap(Box::new(move || {
            let text = search.value();
            update_weak(&weak, |s| {
                s.search_timer = None;
                s.grid.filter_by(col, FilterInput::Search { text });
            });
        }) as Box<dyn FnMut()>)
    };
    let debounce_fn: Function = debounce.as_ref().unchecked_ref::<Function>().clone();

    let mut listeners = Vec::new();
    {
        let weak = Weak::clone(weak);
        listeners.push(Listener::new(&search, "input", move |_event| {
            update_weak(&weak, |s| {
                cancel_search_timer(s);
                s.search_timer = web_sys::window().and_then(|w| {
                    w.set_timeout_with_callback_and_timeout_and_arguments_0(
                        &debounce_fn,
                        i32::try_from(debounce_ms).unwrap_or(i32::MAX),
                    )
                    .ok()
                });
            });
        }));
    }
    {
        let weak = Weak::clone(weak);
        listeners.push(Listener::new(&search, "keydown", move |event| {
            let enter = event
                .dyn_ref::<web_sys::KeyboardEvent>()
                .is_some_and(|k| k.key() == "Enter");
            event.stop_propagation();
            if enter {
                update_weak(&weak, close);
            }
        }));
    }
    {
        let weak = Weak::clone(weak);
        let search = search.clone();
        listeners.push(Listener::new(&clear, "click", move |_event| {
            search.set_value("");
            update_weak(&weak, |s| {
                cancel_search_timer(s);
                s.grid.filter_by(col, FilterInput::Search { text: String::new() });
                close(s);
            });
        }));
    }

    let mut popup = Popup::new(element, listeners);
    popup.search = Some((col, search));
    popup.debounce = Some(debounce);
    Some(popup)
}

fn iso_date(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_popup(
    document: &Document,
    weak: &Weak<RefCell<SharedState>>,
    col: usize,
    mode: BlanksMode,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
) -> Option<Popup> {
    let element = create(document, "div", &format!("{POPUP_CLASS} dyngrid-filter-date-range"))?;
    let modes = create(document, "div", "dyngrid-blanks-box")?;
    let mut radios = Vec::new();
    for (value, label, this) in [
        ("all", "All", BlanksMode::All),
        ("blanks", "Blanks", BlanksMode::Blanks),
        ("non-blanks", "Non-Blanks", BlanksMode::NonBlanks),
    ] {
        let radio = input(document, "radio")?;
        radio.set_name(&format!("dyngrid-blanks-{col}"));
        radio.set_value(value);
        radio.set_checked(this == mode);
        let text = create(document, "span", "")?;
        text.set_text_content(Some(label));
        modes.append_child(&radio).ok()?;
        modes.append_child(&text).ok()?;
        radios.push(radio);
    }
    element.append_child(&modes).ok()?;

    let range = create(document, "div", "dyngrid-date-range-box")?;
    if mode != BlanksMode::All {
        let _ = range.style().set_property("display", "none");
    }
    let start = input(document, "date")?;
    start.set_value(&start_ms.map(iso_date).unwrap_or_default());
    let end = input(document, "date")?;
    end.set_value(&end_ms.map(iso_date).unwrap_or_default());
    let clear_start = link(document, "Clear")?;
    let clear_end = link(document, "Clear")?;
    for (title, clear, field) in [("Start Date", &clear_start, &start), ("End Date", &clear_end, &end)] {
        let row = create(document, "div", "")?;
        let label = create(document, "span", "")?;
        label.set_text_content(Some(&format!("{title} ")));
        row.append_child(&label).ok()?;
        row.append_child(clear).ok()?;
        row.append_child(field).ok()?;
        range.append_child(&row).ok()?;
    }
    element.append_child(&range).ok()?;

    let apply: Rc<dyn Fn()> = {
        let weak = Weak::clone(weak);
        let start = start.clone();
        let end = end.clone();
        let range = range.clone();
        Rc::new(move || {
            let mode = match radios.iter().find(|r| r.checked()).map(HtmlInputElement::value) {
                Some(v) if v == "blanks" => BlanksMode::Blanks,
                Some(v) if v == "non-blanks" => BlanksMode::NonBlanks,
                _ => BlanksMode::All,
            };
            let display = if mode == BlanksMode::All { "block" } else { "none" };
            let _ = range.style().set_property("display", display);
            let input = FilterInput::DateRange {
                mode,
                start_ms: parse_date_str(&start.value()),
                end_ms: parse_date_str(&end.value()),
            };
            update_weak(&weak, |s| s.grid.filter_by(col, input));
        })
    };

    let mut listeners = Vec::new();
    {
        let apply = Rc::clone(&apply);
        listeners.push(Listener::new(&element, "change", move |_event| apply()));
    }
    for (clear, field) in [(&clear_start, &start), (&clear_end, &end)] {
        let apply = Rc::clone(&apply);
        let field = field.clone();
        listeners.push(Listener::new(clear, "click", move |_event| {
            field.set_value("");
            apply();
        }));
    }
    Some(Popup::new(element, listeners))
}

/// Open the column visibility pop-up under the settings button.
pub(crate) fn open_settings(state: &Rc<RefCell<SharedState>>, button: &HtmlElement) {
    let Some(columns) = super::update(state, |s| {
        close(s);
        s.grid
            .columns()
            .iter()
            .enumerate()
            .map(|(col, column)| (col, column.name.clone(), column.visible))
            .collect::<Vec<_>>()
    }) else {
        return;
    };
    let Some(document) = document() else {
        return;
    };
    let Some(element) = create(&document, "div", &format!("{POPUP_CLASS} dyngrid-settings")) else {
        return;
    };
    for (col, name, visible) in columns {
        let (Some(row), Some(check), Some(label)) = (
            create(&document, "div", ""),
            input(&document, "checkbox"),
            create(&document, "span", ""),
        ) else {
            continue;
        };
        check.set_checked(visible);
        let _ = check.set_attribute("data-col", &col.to_string());
        label.set_text_content(Some(&name));
        let _ = row.append_child(&check);
        let _ = row.append_child(&label);
        let _ = element.append_child(&row);
    }

    let weak = Rc::downgrade(state);
    let listener = Listener::new(&element, "change", move |event| {
        let Some(check) = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(col) = crate::render::dom::data_index(&check, "data-col") else {
            return;
        };
        let visible = check.checked();
        update_weak(&weak, |s| s.grid.set_column_visible(col, visible));
    });

    let anchor = button
        .closest(&format!(".{HEADER_CELL_CLASS}"))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .unwrap_or_else(|| button.clone());
    show(state, Popup::new(element, vec![listener]), &anchor);
}
