//! Time-driven state: the scroll render scheduler and the type-ahead buffer.
//!
//! Both take the current time as an argument so they can be driven by a
//! browser clock in the viewer and by plain numbers in tests.

/// Scroll scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    #[default]
    Idle,
    Dirty,
}

/// Two-phase scroll handling: scroll events only flag, a periodic poll renders.
#[derive(Debug, Clone)]
pub struct ScrollScheduler {
    state: ScrollState,
    last_scroll_ms: f64,
    settle_ms: f64,
}

impl ScrollScheduler {
    pub fn new(settle_ms: f64) -> Self {
        Self {
            state: ScrollState::Idle,
            last_scroll_ms: 0.0,
            settle_ms,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn set_settle_ms(&mut self, settle_ms: f64) {
        self.settle_ms = settle_ms;
    }

    /// A scroll event: mark dirty and remember when. No rendering here.
    pub fn on_scroll(&mut self, now_ms: f64) {
        self.state = ScrollState::Dirty;
        self.last_scroll_ms = now_ms;
    }

    /// Poll tick. Returns `true` (and goes idle) when a render is due: dirty
    /// and more than `settle_ms` since the last scroll.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if self.state == ScrollState::Dirty && now_ms - self.last_scroll_ms > self.settle_ms {
            self.state = ScrollState::Idle;
            return true;
        }
        false
    }
}

/// Accumulates typed characters; the text resets after a period of inactivity.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    text: String,
    last_input_ms: f64,
    reset_ms: f64,
}

impl InputBuffer {
    pub fn new(reset_ms: f64) -> Self {
        Self {
            text: String::new(),
            last_input_ms: f64::NEG_INFINITY,
            reset_ms,
        }
    }

    pub fn set_reset_ms(&mut self, reset_ms: f64) {
        self.reset_ms = reset_ms;
    }

    /// Append `c` and return the buffer, starting over if the previous input
    /// is older than the reset period.
    pub fn push(&mut self, c: char, now_ms: f64) -> &str {
        if now_ms - self.last_input_ms >= self.reset_ms {
            self.text.clear();
        }
        self.text.push(c);
        self.last_input_ms = now_ms;
        &self.text
    }

    /// Current text, or empty if it has expired.
    pub fn current(&self, now_ms: f64) -> &str {
        if now_ms - self.last_input_ms >= self.reset_ms {
            ""
        } else {
            &self.text
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.last_input_ms = f64::NEG_INFINITY;
    }
}
