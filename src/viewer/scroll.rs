//! Scroll, poll and resize plumbing for `DynamicTable`.
//!
//! Scroll events only record the offset; the poll interval decides when the
//! burst has settled and renders the visible pages.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, ResizeObserver};

use super::{now_ms, update, update_weak, Listener, SharedState};

pub(crate) fn listen_scroll(state: &Rc<RefCell<SharedState>>) -> Listener {
    let rows = state.borrow().grid.backend().rows().clone();
    let weak = Rc::downgrade(state);
    let source = rows.clone();
    Listener::new(&rows, "scroll", move |_event| {
        let top = f64::from(source.scroll_top());
        let left = f64::from(source.scroll_left());
        update_weak(&weak, |s| s.grid.on_scroll(top, left, now_ms()));
    })
}

/// The fixed-period scroll poll. Cleared on drop.
pub(crate) struct PollTimer {
    id: i32,
    #[allow(dead_code)]
    closure: Closure<dyn FnMut()>,
}

impl PollTimer {
    pub(crate) fn start(state: &Rc<RefCell<SharedState>>, period_ms: u32) -> Option<Self> {
        let window = web_sys::window()?;
        let weak = Rc::downgrade(state);
        let closure = Closure::wrap(Box::new(move || {
            update_weak(&weak, |s| s.grid.poll(now_ms()));
        }) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                i32::try_from(period_ms.max(1)).unwrap_or(i32::MAX),
            )
            .ok()?;
        Some(Self { id, closure })
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
    }
}

/// Watches the element the grid sizes itself from.
pub(crate) struct ParentObserver {
    observer: ResizeObserver,
    #[allow(dead_code)]
    closure: Closure<dyn FnMut(JsValue)>,
}

impl ParentObserver {
    pub(crate) fn observe(state: &Rc<RefCell<SharedState>>, element: &Element) -> Option<Self> {
        let weak = Rc::downgrade(state);
        let closure = Closure::wrap(Box::new(move |_entries: JsValue| {
            if let Some(state) = weak.upgrade() {
                fit(&state);
            }
        }) as Box<dyn FnMut(JsValue)>);
        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref()).ok()?;
        observer.observe(element);
        Some(Self { observer, closure })
    }
}

impl Drop for ParentObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Size the grid from its parent (`fillParent`) or from its own box.
pub(crate) fn fit(state: &Rc<RefCell<SharedState>>) {
    update(state, |s| {
        let container = s.grid.backend().container().clone();
        let source: Option<Element> = if s.grid.options().fill_parent {
            container.parent_element()
        } else {
            Some(container.clone().into())
        };
        let Some(source) = source else {
            return;
        };
        let width = f64::from(source.client_width());
        let height = f64::from(source.client_height());
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let header_height = s.grid.options().header_height;
        s.grid.backend().set_size(width, height, header_height);
        s.grid.resize(width, height);
        tracing::trace!(width, height, "grid fitted");
    });
}
