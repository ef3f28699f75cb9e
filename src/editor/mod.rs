//! Editor bridge.
//!
//! Cell editors are external collaborators attached per column. The grid
//! activates one over a cell's screen rectangle and subscribes once to its
//! callback channel. Signals coming back (an edit, or a request to move) are
//! queued in an inbox rather than handled on the spot, because an editor may
//! call back while the grid is in the middle of an operation. The grid drains
//! the inbox with [`crate::Grid::process_editor_signals`].

#[cfg(target_arch = "wasm32")]
mod input;
#[cfg(target_arch = "wasm32")]
mod js;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::render::CellRect;
use crate::types::{Column, Direction, Row};

#[cfg(target_arch = "wasm32")]
pub use input::InputEditor;
#[cfg(target_arch = "wasm32")]
pub use js::JsEditor;

/// Where an editor signal comes from: the cell the editor was activated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub row_index: usize,
    pub column_index: usize,
}

/// A message from an editor back to the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSignal {
    /// Write `value` into the row and refresh the cell.
    Edit { value: Value, state: EditorState },
    /// Move the editor to the next cell in `direction`.
    Move {
        direction: Direction,
        state: EditorState,
    },
}

impl EditorSignal {
    /// Build a signal from the callback's `type` string
    /// (`edit`, `up`, `down`, `left`, `right`).
    pub fn from_kind(kind: &str, value: Value, state: EditorState) -> Option<Self> {
        let direction = match kind {
            "edit" => return Some(Self::Edit { value, state }),
            "up" => Direction::Up,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "right" => Direction::Right,
            _ => return None,
        };
        Some(Self::Move { direction, state })
    }

    pub fn state(&self) -> EditorState {
        match self {
            Self::Edit { state, .. } | Self::Move { state, .. } => *state,
        }
    }
}

/// Signals an editor sends when `text` is committed in a cell it was
/// activated on with `original`.
///
/// The edit is only sent when the trimmed text differs from the trimmed
/// original, so stepping through cells never writes displayed text back. The
/// move, if any, is always sent.
pub fn commit_signals(
    original: &str,
    text: &str,
    direction: Option<Direction>,
    state: EditorState,
) -> Vec<EditorSignal> {
    let mut signals = Vec::with_capacity(2);
    if text.trim() != original.trim() {
        signals.push(EditorSignal::Edit {
            value: Value::String(text.to_string()),
            state,
        });
    }
    if let Some(direction) = direction {
        signals.push(EditorSignal::Move { direction, state });
    }
    signals
}

/// Callback handed to editors on subscription.
pub type EditorCallback = Rc<dyn Fn(EditorSignal)>;

/// Everything an editor receives on activation.
#[derive(Debug, Clone, Copy)]
pub struct Activation<'a> {
    /// Screen rectangle of the target cell
    pub rect: CellRect,
    /// Currently displayed text of the cell
    pub value: &'a str,
    pub row: &'a Row,
    pub column: &'a Column,
    pub row_index: usize,
    pub column_index: usize,
}

impl Activation<'_> {
    pub fn state(&self) -> EditorState {
        EditorState {
            row_index: self.row_index,
            column_index: self.column_index,
        }
    }
}

/// Contract every cell editor satisfies.
///
/// Methods take `&self`: editors are shared between columns and between the
/// grid and their own DOM listeners, so they keep state behind interior
/// mutability.
pub trait CellEditor {
    /// Position over `activation.rect`, show `activation.value` and take focus.
    fn activate(&self, activation: &Activation<'_>);

    /// Hide the editor. Hiding an already hidden editor is a no-op.
    fn hide(&self);

    /// Register the grid's callback. Called at most once per editor.
    fn subscribe(&self, callback: EditorCallback);
}

fn same_editor(a: &Rc<dyn CellEditor>, b: &Rc<dyn CellEditor>) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// Grid-side half of the editor contract.
pub struct EditorBridge {
    inbox: Rc<RefCell<VecDeque<EditorSignal>>>,
    notify: Option<Rc<dyn Fn()>>,
    subscribed: Vec<Rc<dyn CellEditor>>,
    active: Option<EditorState>,
}

impl Default for EditorBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorBridge {
    pub fn new() -> Self {
        Self {
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            notify: None,
            subscribed: Vec::new(),
            active: None,
        }
    }

    /// Hook run after every queued signal, e.g. to schedule draining.
    pub fn set_notify(&mut self, notify: Rc<dyn Fn()>) {
        self.notify = Some(notify);
    }

    /// The cell the open editor was activated on.
    pub fn active(&self) -> Option<EditorState> {
        self.active
    }

    fn callback(&self) -> EditorCallback {
        let inbox = Rc::clone(&self.inbox);
        let notify = self.notify.as_ref().map(Rc::clone);
        Rc::new(move |signal| {
            inbox.borrow_mut().push_back(signal);
            if let Some(notify) = &notify {
                notify();
            }
        })
    }

    /// Subscribe to `editor` unless already subscribed.
    pub fn ensure_subscribed(&mut self, editor: &Rc<dyn CellEditor>) {
        if self.subscribed.iter().any(|known| same_editor(known, editor)) {
            return;
        }
        editor.subscribe(self.callback());
        self.subscribed.push(Rc::clone(editor));
    }

    /// Hide every open editor, then activate `editor`.
    pub fn activate(&mut self, editor: &Rc<dyn CellEditor>, activation: &Activation<'_>) {
        self.hide_all();
        self.ensure_subscribed(editor);
        self.active = Some(activation.state());
        editor.activate(activation);
    }

    /// Hide every editor the grid has talked to.
    pub fn hide_all(&mut self) {
        self.active = None;
        for editor in &self.subscribed {
            editor.hide();
        }
    }

    /// Queue a signal as if an editor had called back.
    pub fn push(&self, signal: EditorSignal) {
        self.inbox.borrow_mut().push_back(signal);
    }

    pub fn pop(&self) -> Option<EditorSignal> {
        self.inbox.borrow_mut().pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.inbox.borrow().is_empty()
    }
}

impl std::fmt::Debug for EditorBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBridge")
            .field("pending", &self.inbox.borrow().len())
            .field("subscribed", &self.subscribed.len())
            .field("active", &self.active)
            .finish()
    }
}
