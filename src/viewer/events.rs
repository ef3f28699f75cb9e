//! Pointer, check box and keyboard listeners for `DynamicTable`.
//!
//! Handlers resolve the DOM target to grid coordinates through the `data-row`
//! and `data-col` attributes the renderer writes, then call into the grid.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent};

use super::{popup, update_weak, Listener, SharedState};
use crate::render::builder::CELL_CLASS;
use crate::render::dom::{
    data_index, CHECK_CLASS, FILTER_BUTTON_CLASS, HEADER_CELL_CLASS, RESIZE_CLASS,
    SETTINGS_BUTTON_CLASS, SORT_BUTTON_CLASS,
};
use crate::types::{Key, MIN_COLUMN_WIDTH};

/// A header resize drag in progress.
pub(crate) struct ResizeDrag {
    col: usize,
    start_x: f64,
    start_width: f64,
    cell: HtmlElement,
}

impl ResizeDrag {
    fn width_at(&self, client_x: f64) -> f64 {
        (self.start_width + client_x - self.start_x).max(f64::from(MIN_COLUMN_WIDTH))
    }
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn closest(event: &Event, selector: &str) -> Option<Element> {
    target_element(event)?.closest(selector).ok().flatten()
}

/// Whether the event comes from a form control (pop-up inputs, editors).
fn from_control(event: &Event) -> bool {
    target_element(event).is_some_and(|el| {
        matches!(
            el.tag_name().to_ascii_lowercase().as_str(),
            "input" | "select" | "textarea"
        )
    })
}

/// Register every input listener on the grid's elements and the document.
pub(crate) fn install(state: &Rc<RefCell<SharedState>>) -> Vec<Listener> {
    let (container, header, rows) = {
        let s = state.borrow();
        let backend = s.grid.backend();
        (
            backend.container().clone(),
            backend.header().clone(),
            backend.rows().clone(),
        )
    };
    let document = web_sys::window().and_then(|w| w.document());
    let mut listeners = Vec::new();

    // Cell and counter clicks
    {
        let weak = Rc::downgrade(state);
        listeners.push(Listener::new(&rows, "click", move |event| {
            if closest(&event, &format!(".{CHECK_CLASS}")).is_some() {
                return;
            }
            let Some(cell) = closest(&event, &format!(".{CELL_CLASS}")) else {
                return;
            };
            let Some(row) = data_index(&cell, "data-row") else {
                return;
            };
            let col = data_index(&cell, "data-col");
            update_weak(&weak, |s| match col {
                Some(col) => s.grid.click_cell(row, col),
                None => s.grid.click_counter(row),
            });
        }));
    }

    {
        let weak = Rc::downgrade(state);
        listeners.push(Listener::new(&rows, "dblclick", move |event| {
            let Some(row) = closest(&event, "[data-row]").and_then(|el| data_index(&el, "data-row"))
            else {
                return;
            };
            update_weak(&weak, |s| s.grid.double_click(row));
        }));
    }

    // Row check boxes
    {
        let weak = Rc::downgrade(state);
        listeners.push(Listener::new(&rows, "change", move |event| {
            let Some(input) = target_element(&event)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .filter(|input| input.class_list().contains(CHECK_CLASS))
            else {
                return;
            };
            let Some(row) = data_index(&input, "data-row") else {
                return;
            };
            let checked = input.checked();
            update_weak(&weak, |s| s.grid.toggle_check(row, checked));
        }));
    }

    // Keys only reach the container while it (or a child) has focus
    {
        let weak = Rc::downgrade(state);
        listeners.push(Listener::new(&container, "keydown", move |event| {
            if from_control(&event) {
                return;
            }
            let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if keyboard.ctrl_key() || keyboard.meta_key() || keyboard.alt_key() {
                return;
            }
            let key = Key::from_dom(&keyboard.key());
            if key == Key::Other {
                return;
            }
            let now = super::now_ms();
            if update_weak(&weak, |s| s.grid.handle_key(key, now)) == Some(true) {
                event.prevent_default();
            }
        }));
    }

    // Header buttons
    {
        let weak = Rc::downgrade(state);
        listeners.push(Listener::new(&header, "click", move |event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if let Some(col) =
                closest(&event, &format!(".{SORT_BUTTON_CLASS}")).and_then(|el| data_index(&el, "data-col"))
            {
                super::update(&state, |s| {
                    popup::close(s);
                    s.grid.sort_by(col);
                });
            } else if let Some(button) = closest(&event, &format!(".{FILTER_BUTTON_CLASS}")) {
                let anchor = button
                    .closest(&format!(".{HEADER_CELL_CLASS}"))
                    .ok()
                    .flatten()
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok());
                if let (Some(col), Some(anchor)) = (data_index(&button, "data-col"), anchor) {
                    event.stop_propagation();
                    popup::open_filter(&state, col, &anchor);
                }
            } else if let Some(button) = closest(&event, &format!(".{SETTINGS_BUTTON_CLASS}"))
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                event.stop_propagation();
                popup::open_settings(&state, &button);
            }
        }));
    }

    // Column resize drags start on the header handle and end on the document
    {
        let weak = Rc::downgrade(state);
        listeners.push(Listener::new(&header, "mousedown", move |event| {
            let Some(handle) = closest(&event, &format!(".{RESIZE_CLASS}")) else {
                return;
            };
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let cell = handle
                .closest(&format!(".{HEADER_CELL_CLASS}"))
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            let (Some(col), Some(cell)) = (data_index(&handle, "data-col"), cell) else {
                return;
            };
            event.prevent_default();
            event.stop_propagation();
            let drag = ResizeDrag {
                col,
                start_x: f64::from(mouse.client_x()),
                start_width: f64::from(cell.offset_width()),
                cell,
            };
            update_weak(&weak, |s| s.resize_drag = Some(drag));
        }));
    }

    if let Some(document) = document {
        {
            let weak = Rc::downgrade(state);
            listeners.push(Listener::new(&document, "mousemove", move |event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let Ok(s) = state.try_borrow() else {
                    return;
                };
                if let Some(drag) = s.resize_drag.as_ref() {
                    let width = drag.width_at(f64::from(mouse.client_x()));
                    let _ = drag
                        .cell
                        .style()
                        .set_property("width", &format!("{width}px"));
                }
            }));
        }

        {
            let weak = Rc::downgrade(state);
            listeners.push(Listener::new(&document, "mouseup", move |event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let client_x = f64::from(mouse.client_x());
                update_weak(&weak, |s| {
                    if let Some(drag) = s.resize_drag.take() {
                        s.grid.resize_column(drag.col, drag.width_at(client_x));
                    }
                });
            }));
        }

        // Pop-ups close on any press outside of them
        {
            let weak = Rc::downgrade(state);
            listeners.push(Listener::new(&document, "mousedown", move |event| {
                let target = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Node>().ok());
                update_weak(&weak, |s| {
                    let inside = s
                        .popup
                        .as_ref()
                        .is_some_and(|p| p.contains(target.as_ref()));
                    if !inside {
                        popup::close(s);
                    }
                });
            }));
        }
    }

    listeners
}
