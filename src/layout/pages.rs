//! Page partitioning and the placeholder mask.
//!
//! The current view is cut into pages of `page_size` rows. Each page is either
//! materialized (real rows in the DOM) or stood in for by a placeholder of the
//! same height, so the total scroll height is always `rows * row_height`.

use std::ops::{Range, RangeInclusive};

/// Per-page materialization state for the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMask {
    rendered: Vec<bool>,
    /// Tick of the last render-visible pass that covered each page.
    last_used: Vec<u64>,
    row_count: usize,
    page_size: usize,
    row_height: f64,
    tick: u64,
}

impl Default for PageMask {
    fn default() -> Self {
        Self::rebuild(0, 1, 0.0)
    }
}

impl PageMask {
    /// Fresh mask with every page a placeholder.
    ///
    /// `page_size` is clamped to at least 1.
    pub fn rebuild(row_count: usize, page_size: usize, row_height: f64) -> Self {
        let page_size = page_size.max(1);
        let pages = row_count.div_ceil(page_size);
        Self {
            rendered: vec![false; pages],
            last_used: vec![0; pages],
            row_count,
            page_size,
            row_height,
            tick: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// The raw mask, one entry per page.
    pub fn mask(&self) -> &[bool] {
        &self.rendered
    }

    /// View rows covered by `page`. Empty for pages past the end.
    pub fn row_range(&self, page: usize) -> Range<usize> {
        let start = page.saturating_mul(self.page_size).min(self.row_count);
        let end = start.saturating_add(self.page_size).min(self.row_count);
        start..end
    }

    pub fn rows_in_page(&self, page: usize) -> usize {
        self.row_range(page).len()
    }

    /// Height of the page, placeholder or real.
    #[allow(clippy::cast_precision_loss)]
    pub fn page_height(&self, page: usize) -> f64 {
        self.rows_in_page(page) as f64 * self.row_height
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn total_height(&self) -> f64 {
        self.row_count as f64 * self.row_height
    }

    pub fn page_of_row(&self, row: usize) -> usize {
        row / self.page_size
    }

    pub fn is_rendered(&self, page: usize) -> bool {
        self.rendered.get(page).copied().unwrap_or(false)
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.iter().filter(|r| **r).count()
    }

    /// Indices of materialized pages, ascending.
    pub fn rendered_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.rendered
            .iter()
            .enumerate()
            .filter(|(_, rendered)| **rendered)
            .map(|(page, _)| page)
    }

    /// Page under a scroll offset: `floor(scroll_top / (page_size * row_height))`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn page_at(&self, scroll_top: f64) -> usize {
        let page_height = self.page_size as f64 * self.row_height;
        let degenerate = page_height.is_nan() || page_height <= 0.0;
        if degenerate || !scroll_top.is_finite() || scroll_top <= 0.0 {
            return 0;
        }
        (scroll_top / page_height).floor() as usize
    }

    /// Pages to materialize for a scroll offset: the current page plus
    /// `buffer` pages each side, clamped to the last page. `None` when there
    /// are no pages.
    pub fn window(&self, scroll_top: f64, buffer: usize) -> Option<RangeInclusive<usize>> {
        let last = self.page_count().checked_sub(1)?;
        let current = self.page_at(scroll_top).min(last);
        let start = current.saturating_sub(buffer);
        let end = current.saturating_add(buffer).min(last);
        Some(start..=end)
    }

    /// Placeholder pages inside `window`, ascending.
    pub fn pending(&self, window: &RangeInclusive<usize>) -> Vec<usize> {
        window
            .clone()
            .filter(|page| *page < self.page_count() && !self.is_rendered(*page))
            .collect()
    }

    /// Record that a render pass covered `window`.
    pub fn touch(&mut self, window: &RangeInclusive<usize>) {
        self.tick += 1;
        let tick = self.tick;
        for page in window.clone() {
            if let Some(slot) = self.last_used.get_mut(page) {
                *slot = tick;
            }
        }
    }

    pub fn mark_rendered(&mut self, page: usize) {
        if let Some(slot) = self.rendered.get_mut(page) {
            *slot = true;
        }
    }

    pub fn mark_placeholder(&mut self, page: usize) {
        if let Some(slot) = self.rendered.get_mut(page) {
            *slot = false;
        }
    }

    /// Materialized pages outside `window` to return to placeholders so that
    /// at most `limit` pages stay rendered. Least recently used first.
    pub fn eviction_candidates(&self, window: &RangeInclusive<usize>, limit: usize) -> Vec<usize> {
        let rendered = self.rendered_count();
        if rendered <= limit {
            return Vec::new();
        }
        let mut outside: Vec<usize> = self
            .rendered_pages()
            .filter(|page| !window.contains(page))
            .collect();
        outside.sort_by_key(|page| (self.last_used.get(*page).copied().unwrap_or(0), *page));
        outside.truncate(rendered - limit);
        outside.sort_unstable();
        outside
    }
}

/// Split ascending page indices into runs of consecutive pages.
pub fn contiguous_runs(pages: &[usize]) -> Vec<Range<usize>> {
    let mut runs: Vec<Range<usize>> = Vec::new();
    for &page in pages {
        match runs.last_mut() {
            Some(run) if run.end == page => run.end = page + 1,
            _ => runs.push(page..page + 1),
        }
    }
    runs
}
