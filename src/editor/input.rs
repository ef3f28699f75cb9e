//! Built-in text editor.
//!
//! An `<input>` element positioned (fixed) over the edited cell. Enter commits
//! and moves down (Shift+Enter up), Tab commits and moves right (Shift+Tab
//! left), Escape just hides it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement, KeyboardEvent};

use super::{commit_signals, Activation, CellEditor, EditorCallback, EditorState};
use crate::types::Direction;

/// Class carried by every editor element the grid owns.
pub(crate) const EDITOR_CLASS: &str = "dyngrid-editor";

struct InputInner {
    input: RefCell<Option<HtmlInputElement>>,
    callback: RefCell<Option<EditorCallback>>,
    state: Cell<Option<EditorState>>,
    /// Text the editor was activated with
    original: RefCell<String>,
}

impl InputInner {
    fn commit_and_move(&self, direction: Option<Direction>) {
        let Some(state) = self.state.get() else {
            return;
        };
        let value = self
            .input
            .borrow()
            .as_ref()
            .map(HtmlInputElement::value)
            .unwrap_or_default();
        let Some(callback) = self.callback.borrow().as_ref().map(Rc::clone) else {
            return;
        };
        let signals = commit_signals(&self.original.borrow(), &value, direction, state);
        for signal in signals {
            callback(signal);
        }
    }

    fn hide(&self) {
        self.state.set(None);
        if let Some(ref input) = *self.input.borrow() {
            let _ = input.style().set_property("display", "none");
            let _ = input.blur();
        }
    }
}

/// Plain text editor usable on any column.
#[wasm_bindgen]
pub struct InputEditor {
    inner: Rc<InputInner>,
    #[allow(dead_code)]
    keydown: RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>,
}

impl Default for InputEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl InputEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> InputEditor {
        InputEditor {
            inner: Rc::new(InputInner {
                input: RefCell::new(None),
                callback: RefCell::new(None),
                state: Cell::new(None),
                original: RefCell::new(String::new()),
            }),
            keydown: RefCell::new(None),
        }
    }
}

impl InputEditor {
    /// Create the `<input>` on first use and wire its key handling.
    fn ensure_input(&self, document: &Document) -> Option<HtmlInputElement> {
        if let Some(ref input) = *self.inner.input.borrow() {
            return Some(input.clone());
        }

        let input = document
            .create_element("input")
            .ok()?
            .dyn_into::<HtmlInputElement>()
            .ok()?;
        input.set_type("text");
        input.set_class_name(EDITOR_CLASS);
        let style = input.style();
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("z-index", "1000");
        let _ = style.set_property("box-sizing", "border-box");
        let _ = style.set_property("border", "2px solid #4285f4");
        let _ = style.set_property("outline", "none");
        let _ = style.set_property("padding", "0 4px");
        let _ = style.set_property("font-family", "inherit");
        let _ = style.set_property("font-size", "inherit");
        let _ = style.set_property("background", "#fff");
        let _ = style.set_property("display", "none");

        let inner = Rc::downgrade(&self.inner);
        let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let direction = match (event.key().as_str(), event.shift_key()) {
                ("Enter", false) => Direction::Down,
                ("Enter", true) => Direction::Up,
                ("Tab", false) => Direction::Right,
                ("Tab", true) => Direction::Left,
                ("Escape", _) => {
                    inner.hide();
                    return;
                }
                _ => return,
            };
            event.prevent_default();
            event.stop_propagation();
            inner.commit_and_move(Some(direction));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        let _ =
            input.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref());
        *self.keydown.borrow_mut() = Some(keydown);

        if let Some(body) = document.body() {
            let _ = body.append_child(&input);
        }
        *self.inner.input.borrow_mut() = Some(input.clone());
        Some(input)
    }
}

impl CellEditor for InputEditor {
    fn activate(&self, activation: &Activation<'_>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(input) = self.ensure_input(&document) else {
            return;
        };
        self.inner.state.set(Some(activation.state()));
        *self.inner.original.borrow_mut() = activation.value.to_string();

        let rect = activation.rect;
        let style = input.style();
        let _ = style.set_property("display", "block");
        let _ = style.set_property("left", &format!("{}px", rect.left));
        let _ = style.set_property("top", &format!("{}px", rect.top));
        let _ = style.set_property("width", &format!("{}px", rect.width));
        let _ = style.set_property("height", &format!("{}px", rect.height));

        input.set_value(activation.value);
        let _ = input.focus();
        input.select();
    }

    fn hide(&self) {
        self.inner.hide();
    }

    fn subscribe(&self, callback: EditorCallback) {
        *self.inner.callback.borrow_mut() = Some(callback);
    }
}

impl Drop for InputEditor {
    fn drop(&mut self) {
        if let Some(ref input) = *self.inner.input.borrow() {
            if let Some(parent) = input.parent_node() {
                let _ = parent.remove_child(input);
            }
        }
    }
}
