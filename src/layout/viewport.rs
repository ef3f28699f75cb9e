//! Viewport state of the row container.

/// Visible area of the scrolling row container.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset in pixels
    pub scroll_top: f64,
    /// Horizontal scroll offset in pixels (the header follows it)
    pub scroll_left: f64,
    /// Row container width in pixels
    pub width: f64,
    /// Row container height in pixels (grid height minus the header)
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            scroll_top: 0.0,
            scroll_left: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Bottom edge of the visible area in content coordinates.
    pub fn visible_bottom(&self) -> f64 {
        self.scroll_top + self.height
    }

    /// Scroll offset that brings `[top, bottom)` into view.
    ///
    /// Below the visible bottom the offset grows by exactly the overflow; above
    /// the visible top it shrinks by exactly the deficit. `None` when the span
    /// is already visible.
    pub fn scroll_into_view(&self, top: f64, bottom: f64) -> Option<f64> {
        let visible_bottom = self.visible_bottom();
        if bottom > visible_bottom {
            Some(self.scroll_top + (bottom - visible_bottom))
        } else if top < self.scroll_top {
            Some(self.scroll_top - (self.scroll_top - top))
        } else {
            None
        }
    }

    /// Vertical span of view row `row` for a fixed row height.
    #[allow(clippy::cast_precision_loss)]
    pub fn row_span(row: usize, row_height: f64) -> (f64, f64) {
        let top = row as f64 * row_height;
        (top, top + row_height)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn viewport(scroll_top: f64, height: f64) -> Viewport {
        Viewport {
            scroll_top,
            height,
            ..Viewport::new()
        }
    }

    #[test]
    fn test_row_below_scrolls_by_overflow() {
        let v = viewport(0.0, 100.0);
        let (top, bottom) = Viewport::row_span(3, 35.0);
        assert_eq!(v.scroll_into_view(top, bottom), Some(40.0));
    }

    #[test]
    fn test_row_above_scrolls_by_deficit() {
        let v = viewport(200.0, 100.0);
        let (top, bottom) = Viewport::row_span(5, 35.0);
        assert_eq!(v.scroll_into_view(top, bottom), Some(175.0));
    }

    #[test]
    fn test_visible_row_does_not_scroll() {
        let v = viewport(70.0, 100.0);
        let (top, bottom) = Viewport::row_span(2, 35.0);
        assert_eq!(v.scroll_into_view(top, bottom), None);
    }
}
