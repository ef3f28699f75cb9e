//! Browser entry point: the wasm-exported [`DynamicTable`].
//!
//! `DynamicTable` wires a [`Grid`] over a [`DomRenderer`] to the page:
//! - DOM listeners for clicks, check boxes, keys, header buttons and resize drags
//! - The scroll poll interval and the parent resize observer
//! - Filter and column-settings pop-ups
//!
//! Grid state lives in a shared cell. Every handler mutates it inside one
//! borrow, then releases it before host listeners run, so listeners may call
//! back into the table.

mod events;
mod popup;
mod scroll;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlElement};

use crate::editor::{CellEditor, InputEditor, JsEditor};
use crate::error::GridError;
use crate::grid::Grid;
use crate::render::print::PRINT_CLASS;
use crate::render::DomRenderer;
use crate::types::{Column, CssClass, FilterInput, GridEvent, GridOptions, Row};

/// Events hosts can subscribe to with [`DynamicTable::on`].
const EVENT_NAMES: &[&str] = &["rowSelect", "rowDoubleClick", "dataChange"];

pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// Serialize for JS with plain objects instead of `Map`s.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

/// A DOM listener that unregisters itself when dropped.
pub(crate) struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub(crate) fn new(
        target: &EventTarget,
        name: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .ok();
        Self {
            target: target.clone(),
            name,
            closure,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
    }
}

/// Shared state that can be accessed by event handlers
pub(crate) struct SharedState {
    pub(crate) grid: Grid<DomRenderer>,
    pub(crate) listeners: HashMap<String, Vec<Function>>,
    pub(crate) popup: Option<popup::Popup>,
    pub(crate) resize_drag: Option<events::ResizeDrag>,
    pub(crate) search_timer: Option<i32>,
}

type ListenerCall = (Function, Vec<JsValue>);

impl SharedState {
    /// Resolve queued grid events to host listener invocations.
    #[allow(clippy::cast_precision_loss)]
    fn listener_calls(&self, events: &[GridEvent]) -> Vec<ListenerCall> {
        let mut calls = Vec::new();
        for event in events {
            let (name, args) = match event {
                GridEvent::RowSelect { row_index, row } => (
                    "rowSelect",
                    vec![to_js(row), JsValue::from_f64(*row_index as f64)],
                ),
                GridEvent::RowDoubleClick { row_index, row } => (
                    "rowDoubleClick",
                    vec![to_js(row), JsValue::from_f64(*row_index as f64)],
                ),
                GridEvent::DataChange { .. } => ("dataChange", vec![to_js(&self.grid.data())]),
            };
            if let Some(functions) = self.listeners.get(name) {
                calls.extend(functions.iter().map(|f| (f.clone(), args.clone())));
            }
        }
        calls
    }
}

fn invoke_listeners(calls: Vec<ListenerCall>) {
    for (function, args) in calls {
        let args: Array = args.into_iter().collect();
        if let Err(err) = function.apply(&JsValue::NULL, &args) {
            tracing::warn!(?err, "grid listener threw");
        }
    }
}

/// Handle queued editor signals and deliver queued events. Does nothing if
/// the state is already borrowed; the outer handler flushes when it is done.
pub(crate) fn flush(state: &Rc<RefCell<SharedState>>) {
    let calls = {
        let Ok(mut s) = state.try_borrow_mut() else {
            return;
        };
        s.grid.process_editor_signals();
        let events = s.grid.drain_events();
        s.listener_calls(&events)
    };
    invoke_listeners(calls);
}

/// Run `f` against the shared state, then flush. `None` when the state is
/// busy (a re-entrant call from inside a grid operation).
pub(crate) fn update<R>(
    state: &Rc<RefCell<SharedState>>,
    f: impl FnOnce(&mut SharedState) -> R,
) -> Option<R> {
    let result = {
        let Ok(mut s) = state.try_borrow_mut() else {
            tracing::warn!("grid busy, re-entrant call dropped");
            return None;
        };
        f(&mut s)
    };
    flush(state);
    Some(result)
}

/// Same as [`update`] for handlers holding a weak reference.
pub(crate) fn update_weak<R>(
    state: &Weak<RefCell<SharedState>>,
    f: impl FnOnce(&mut SharedState) -> R,
) -> Option<R> {
    let state = state.upgrade()?;
    update(&state, f)
}

fn busy() -> JsValue {
    GridError::Dom("grid is busy".into()).into()
}

/// Deserialize column descriptors. `cssClass` functions become dynamic class
/// callbacks and `editor` objects become JS editors.
fn columns_from_js(value: &JsValue) -> Result<Vec<Column>, GridError> {
    if !Array::is_array(value) {
        return Err(GridError::InvalidOptions("columns must be an array".into()));
    }
    let mut columns = Vec::new();
    for descriptor in Array::from(value).iter() {
        let copy = js_sys::Object::assign(&js_sys::Object::new(), descriptor.unchecked_ref());
        let css = Reflect::get(&copy, &JsValue::from_str("cssClass"))
            .ok()
            .and_then(|v| v.dyn_into::<Function>().ok());
        let editor = Reflect::get(&copy, &JsValue::from_str("editor"))
            .ok()
            .filter(|v| v.is_object());
        let _ = Reflect::delete_property(&copy, &JsValue::from_str("cssClass"));
        let _ = Reflect::delete_property(&copy, &JsValue::from_str("editor"));

        let mut column: Column = serde_wasm_bindgen::from_value(copy.into())?;
        if let Some(function) = css {
            column.css_class = Some(CssClass::Dynamic(Rc::new(move |column, raw, rendered| {
                function
                    .call3(
                        &JsValue::NULL,
                        &to_js(column),
                        &raw.map_or(JsValue::NULL, to_js),
                        &JsValue::from_str(rendered),
                    )
                    .ok()
                    .and_then(|v| v.as_string())
            })));
        }
        if let Some(editor) = editor.and_then(JsEditor::from_js) {
            column.editor = Some(Rc::new(editor));
        }
        columns.push(column);
    }
    Ok(columns)
}

/// Virtualized data grid bound to a container element.
#[wasm_bindgen]
pub struct DynamicTable {
    state: Rc<RefCell<SharedState>>,
    handlers: Vec<Listener>,
    poll: Option<scroll::PollTimer>,
    observer: Option<scroll::ParentObserver>,
}

#[wasm_bindgen]
impl DynamicTable {
    /// Build the grid inside `container`. `options` is a partial
    /// [`GridOptions`] object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, options: JsValue) -> Result<DynamicTable, JsValue> {
        console_error_panic_hook::set_once();

        let options: GridOptions = if options.is_undefined() || options.is_null() {
            GridOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(GridError::from)?
        };
        let poll_ms = options.scroll_poll_ms;
        let fill_parent = options.fill_parent;
        let renderer = DomRenderer::new(container.clone())?;
        let grid = Grid::new(renderer, options)?;

        let state = Rc::new(RefCell::new(SharedState {
            grid,
            listeners: HashMap::new(),
            popup: None,
            resize_drag: None,
            search_timer: None,
        }));

        {
            let weak = Rc::downgrade(&state);
            state
                .borrow_mut()
                .grid
                .editors_mut()
                .set_notify(Rc::new(move || {
                    if let Some(state) = weak.upgrade() {
                        flush(&state);
                    }
                }));
        }

        let mut handlers = events::install(&state);
        handlers.push(scroll::listen_scroll(&state));
        let poll = scroll::PollTimer::start(&state, poll_ms);
        let observed = if fill_parent {
            container.parent_element()
        } else {
            Some(container.clone().into())
        };
        let observer = observed.and_then(|el| scroll::ParentObserver::observe(&state, &el));
        scroll::fit(&state);

        tracing::debug!(fill_parent, poll_ms, "dynamic table created");
        Ok(DynamicTable {
            state,
            handlers,
            poll,
            observer,
        })
    }

    /// Load rows and optionally new column descriptors. Filters are dropped
    /// unless `keep_filters`.
    #[wasm_bindgen(js_name = "setData")]
    pub fn set_data(
        &self,
        rows: JsValue,
        columns: JsValue,
        keep_filters: Option<bool>,
    ) -> Result<(), JsValue> {
        let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows).map_err(GridError::from)?;
        let columns = if columns.is_undefined() || columns.is_null() {
            None
        } else {
            Some(columns_from_js(&columns)?)
        };
        update(&self.state, |s| {
            popup::close(s);
            s.grid.set_data(rows, columns, keep_filters.unwrap_or(false));
        })
        .ok_or_else(busy)
    }

    /// Replace the record at view row `index`.
    #[wasm_bindgen(js_name = "updateRow")]
    pub fn update_row(&self, index: usize, row: JsValue) -> Result<(), JsValue> {
        let row: Row = serde_wasm_bindgen::from_value(row).map_err(GridError::from)?;
        update(&self.state, |s| s.grid.update_row(index, row))
            .ok_or_else(busy)?
            .map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "clearAllFilters")]
    pub fn clear_all_filters(&self) -> Result<(), JsValue> {
        update(&self.state, |s| {
            popup::close(s);
            s.grid.clear_all_filters();
        })
        .ok_or_else(busy)
    }

    #[wasm_bindgen(js_name = "sortBy")]
    pub fn sort_by(&self, col: usize) -> Result<(), JsValue> {
        update(&self.state, |s| s.grid.sort_by(col)).ok_or_else(busy)
    }

    /// Apply a filter selection (`{kind: "list" | "search" | "dateRange", ...}`)
    /// to the column at `col`.
    #[wasm_bindgen(js_name = "filterBy")]
    pub fn filter_by(&self, col: usize, input: JsValue) -> Result<(), JsValue> {
        let input: FilterInput = serde_wasm_bindgen::from_value(input).map_err(GridError::from)?;
        update(&self.state, |s| s.grid.filter_by(col, input)).ok_or_else(busy)
    }

    /// The current view's rows, in display order.
    pub fn data(&self) -> Result<JsValue, JsValue> {
        let s = self.state.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&s.grid.data()))
    }

    #[wasm_bindgen(js_name = "checkedRows")]
    pub fn checked_rows(&self) -> Result<JsValue, JsValue> {
        let s = self.state.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&s.grid.checked_rows()))
    }

    /// `{total, filtered}` row counts.
    pub fn counts(&self) -> Result<JsValue, JsValue> {
        let s = self.state.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&s.grid.counts()))
    }

    /// Change one option by name.
    pub fn option(&mut self, name: &str, value: JsValue) -> Result<(), JsValue> {
        let value: serde_json::Value =
            serde_wasm_bindgen::from_value(value).map_err(GridError::from)?;
        let poll_ms = update(&self.state, |s| {
            s.grid
                .set_option(name, value)
                .map(|()| s.grid.options().scroll_poll_ms)
        })
        .ok_or_else(busy)??;
        if name == "scrollPollMs" {
            self.poll = scroll::PollTimer::start(&self.state, poll_ms);
        }
        if name == "headerHeight" || name == "fillParent" {
            scroll::fit(&self.state);
        }
        Ok(())
    }

    /// Print the whole view as a static table.
    pub fn print(&self) -> Result<(), JsValue> {
        let html = {
            let s = self.state.try_borrow().map_err(|_| busy())?;
            s.grid.print()
        };
        let window = web_sys::window().ok_or_else(|| GridError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| GridError::Dom("no document".into()))?;
        let body = document
            .body()
            .ok_or_else(|| GridError::Dom("no body".into()))?;
        let holder = document.create_element("div")?;
        holder.set_class_name(PRINT_CLASS);
        holder.set_inner_html(&html);
        body.append_child(&holder)?;
        let printed = window.print();
        holder.remove();
        printed
    }

    /// Attach a JS editor object to the column at `col`; `null` detaches.
    #[wasm_bindgen(js_name = "setColumnEditor")]
    pub fn set_column_editor(&self, col: usize, editor: JsValue) -> Result<(), JsValue> {
        let editor: Option<Rc<dyn CellEditor>> = if editor.is_undefined() || editor.is_null() {
            None
        } else {
            let editor = JsEditor::from_js(editor).ok_or_else(|| {
                GridError::InvalidOptions("editor needs activate and callback methods".into())
            })?;
            Some(Rc::new(editor))
        };
        update(&self.state, |s| s.grid.set_column_editor(col, editor)).ok_or_else(busy)
    }

    /// Attach the built-in text editor to the column at `col`.
    #[wasm_bindgen(js_name = "setColumnTextEditor")]
    pub fn set_column_text_editor(&self, col: usize) -> Result<(), JsValue> {
        let editor: Rc<dyn CellEditor> = Rc::new(InputEditor::new());
        update(&self.state, |s| s.grid.set_column_editor(col, Some(editor))).ok_or_else(busy)
    }

    #[wasm_bindgen(js_name = "setColumnVisible")]
    pub fn set_column_visible(&self, col: usize, visible: bool) -> Result<(), JsValue> {
        update(&self.state, |s| s.grid.set_column_visible(col, visible)).ok_or_else(busy)
    }

    /// Subscribe to `rowSelect`, `rowDoubleClick` or `dataChange`.
    pub fn on(&self, event: &str, listener: Function) -> Result<(), JsValue> {
        if !EVENT_NAMES.contains(&event) {
            return Err(GridError::UnknownOperation(format!("event {event}")).into());
        }
        let mut s = self.state.try_borrow_mut().map_err(|_| busy())?;
        s.listeners
            .entry(event.to_string())
            .or_default()
            .push(listener);
        Ok(())
    }

    /// Invoke an operation by name. Unknown names throw.
    pub fn call(&mut self, name: &str, args: Array) -> Result<JsValue, JsValue> {
        let arg = |i: u32| args.get(i);
        let index = |i: u32| -> Result<usize, JsValue> {
            arg(i)
                .as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let index = v as usize;
                    index
                })
                .ok_or_else(|| GridError::InvalidOptions(format!("{name}: expected an index")).into())
        };
        match name {
            "setData" => self
                .set_data(arg(0), arg(1), arg(2).as_bool())
                .map(|()| JsValue::UNDEFINED),
            "updateRow" => self
                .update_row(index(0)?, arg(1))
                .map(|()| JsValue::UNDEFINED),
            "clearAllFilters" => self.clear_all_filters().map(|()| JsValue::UNDEFINED),
            "sortBy" => self.sort_by(index(0)?).map(|()| JsValue::UNDEFINED),
            "filterBy" => self
                .filter_by(index(0)?, arg(1))
                .map(|()| JsValue::UNDEFINED),
            "data" => self.data(),
            "checkedRows" => self.checked_rows(),
            "counts" => self.counts(),
            "option" => {
                let option = arg(0)
                    .as_string()
                    .ok_or_else(|| GridError::InvalidOptions("option: expected a name".into()))?;
                self.option(&option, arg(1)).map(|()| JsValue::UNDEFINED)
            }
            "print" => self.print().map(|()| JsValue::UNDEFINED),
            "resize" => {
                self.resize();
                Ok(JsValue::UNDEFINED)
            }
            _ => Err(GridError::UnknownOperation(name.to_string()).into()),
        }
    }

    /// Re-measure the container and re-render what is visible.
    pub fn resize(&self) {
        scroll::fit(&self.state);
    }

    /// Remove every listener, timer and observer and empty the container.
    pub fn dispose(&mut self) {
        self.handlers.clear();
        self.poll = None;
        self.observer = None;
        if let Ok(mut s) = self.state.try_borrow_mut() {
            popup::close(&mut s);
            s.listeners.clear();
            s.grid.editors_mut().hide_all();
            s.grid.backend().container().set_inner_html("");
        }
    }
}

impl Drop for DynamicTable {
    fn drop(&mut self) {
        self.dispose();
    }
}
