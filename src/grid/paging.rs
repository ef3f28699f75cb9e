//! Windowed rendering: page rebuilds, render-visible and the scroll scheduler.

use super::Grid;
use crate::layout::PageMask;
use crate::render::builder::{placeholder, placeholders};
use crate::render::GridBackend;

impl<B: GridBackend> Grid<B> {
    /// Discard every page and placeholder and lay out one placeholder per page
    /// of the current view. Always a full reset; open editors are hidden since
    /// their indices may no longer be valid.
    pub(crate) fn rebuild_pages(&mut self) {
        self.editors.hide_all();
        self.pages = PageMask::rebuild(
            self.view.len(),
            self.options.page_size,
            self.options.row_height,
        );
        let nodes = placeholders(&self.pages, &self.columns);
        tracing::debug!(
            pages = self.pages.page_count(),
            rows = self.pages.row_count(),
            "pages rebuilt"
        );
        self.backend.reset_pages(&nodes);
    }

    /// Materialize every placeholder page within `pageBuffer` pages of the
    /// page under the current scroll offset.
    ///
    /// Pending pages are built first, then handed over as runs of consecutive
    /// pages so each run replaces its placeholders in one DOM mutation.
    /// Already rendered pages are left alone. With `maxRenderedPages` set,
    /// least recently used pages outside the window go back to placeholders.
    pub fn render_visible(&mut self) {
        let Some(window) = self
            .pages
            .window(self.viewport.scroll_top, self.options.page_buffer)
        else {
            return;
        };
        self.pages.touch(&window);

        let pending = self.pages.pending(&window);
        if !pending.is_empty() {
            let batch = self.render_context().batch(&self.pages, &pending);
            for page in &pending {
                self.pages.mark_rendered(*page);
            }
            tracing::trace!(
                pages = pending.len(),
                runs = batch.runs.len(),
                "materializing pages"
            );
            self.backend.materialize(&batch);
        }

        if let Some(limit) = self.options.max_rendered_pages {
            let victims = self.pages.eviction_candidates(&window, limit);
            if !victims.is_empty() {
                let nodes: Vec<_> = victims
                    .iter()
                    .map(|page| placeholder(&self.pages, &self.columns, *page))
                    .collect();
                for page in &victims {
                    self.pages.mark_placeholder(*page);
                }
                tracing::trace!(pages = victims.len(), "evicting pages");
                self.backend.evict(&nodes);
            }
        }
    }

    /// Scroll event from the row container. Only records state; rendering
    /// waits for [`Grid::poll`]. The header follows horizontal scrolling
    /// immediately.
    pub fn on_scroll(&mut self, scroll_top: f64, scroll_left: f64, now_ms: f64) {
        self.viewport.scroll_top = scroll_top.max(0.0);
        if (self.viewport.scroll_left - scroll_left).abs() > f64::EPSILON {
            self.viewport.scroll_left = scroll_left;
            self.backend.set_header_scroll_left(scroll_left);
        }
        self.scheduler.on_scroll(now_ms);
    }

    /// Periodic tick. Renders once a scroll burst has settled; returns whether
    /// it did.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if self.scheduler.poll(now_ms) {
            self.render_visible();
            return true;
        }
        false
    }

    /// Move the row container's scroll offset from the grid side.
    pub(crate) fn scroll_to(&mut self, scroll_top: f64) {
        self.viewport.scroll_top = scroll_top.max(0.0);
        self.backend.set_scroll_top(self.viewport.scroll_top);
    }
}
