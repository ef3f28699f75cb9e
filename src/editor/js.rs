//! Adapter for editors written in JavaScript.
//!
//! A JS editor is any object with `activate(rect, value, row, column,
//! rowIndex, columnIndex)` and `callback(fn)`; `hide()` is optional. The
//! registered function is invoked by the editor as
//! `fn(editor, type, value, state)` where `state` carries `rowIndex` and
//! `columnIndex`.

use std::cell::RefCell;

use js_sys::{Function, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{Activation, CellEditor, EditorCallback, EditorSignal, EditorState};

type SignalClosure = Closure<dyn FnMut(JsValue, JsValue, JsValue, JsValue)>;

pub struct JsEditor {
    object: JsValue,
    callback: RefCell<Option<SignalClosure>>,
}

fn method(object: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn read_index(state: &JsValue, name: &str) -> Option<usize> {
    Reflect::get(state, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = v as usize;
            index
        })
}

impl JsEditor {
    /// Wrap `object` if it has the required `activate` and `callback` methods.
    pub fn from_js(object: JsValue) -> Option<Self> {
        method(&object, "activate")?;
        method(&object, "callback")?;
        Some(Self {
            object,
            callback: RefCell::new(None),
        })
    }
}

impl CellEditor for JsEditor {
    fn activate(&self, activation: &Activation<'_>) {
        let Some(activate) = method(&self.object, "activate") else {
            return;
        };
        let args = js_sys::Array::new();
        args.push(&to_js(&activation.rect));
        args.push(&JsValue::from_str(activation.value));
        args.push(&to_js(activation.row));
        args.push(&to_js(activation.column));
        args.push(&to_js(&activation.row_index));
        args.push(&to_js(&activation.column_index));
        if let Err(err) = activate.apply(&self.object, &args) {
            tracing::warn!(?err, "editor activate failed");
        }
    }

    fn hide(&self) {
        if let Some(hide) = method(&self.object, "hide") {
            let _ = hide.call0(&self.object);
        }
    }

    fn subscribe(&self, callback: EditorCallback) {
        let Some(register) = method(&self.object, "callback") else {
            return;
        };
        let closure = Closure::wrap(Box::new(
            move |_editor: JsValue, kind: JsValue, value: JsValue, state: JsValue| {
                let (Some(row_index), Some(column_index)) = (
                    read_index(&state, "rowIndex"),
                    read_index(&state, "columnIndex"),
                ) else {
                    return;
                };
                let state = EditorState {
                    row_index,
                    column_index,
                };
                let kind = kind.as_string().unwrap_or_default();
                let value: Value = serde_wasm_bindgen::from_value(value).unwrap_or(Value::Null);
                if let Some(signal) = EditorSignal::from_kind(&kind, value, state) {
                    callback(signal);
                }
            },
        ) as Box<dyn FnMut(JsValue, JsValue, JsValue, JsValue)>);
        if let Err(err) = register.call1(&self.object, closure.as_ref().unchecked_ref()) {
            tracing::warn!(?err, "editor callback registration failed");
        }
        *self.callback.borrow_mut() = Some(closure);
    }
}
