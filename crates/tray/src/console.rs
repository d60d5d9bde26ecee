//! Console window text model.

use std::collections::VecDeque;

/// Default line capacity of the console buffer.
///
/// A client run prints a few hundred lines; the cap only guards against a
/// runaway child.
pub const DEFAULT_CONSOLE_CAPACITY: usize = 5000;

/// Console text plus window and progress state. Oldest lines are dropped
/// beyond capacity.
#[derive(Debug, Clone)]
pub struct ConsoleBuffer {
    lines: VecDeque<String>,
    capacity: usize,
    visible: bool,
    pulsing: bool,
}

impl ConsoleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            visible: false,
            pulsing: false,
        }
    }

    pub fn append(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Buffered lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whole buffer as newline-joined text.
    pub fn text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn pulsing(&self) -> bool {
        self.pulsing
    }

    pub fn set_pulsing(&mut self, pulsing: bool) {
        self.pulsing = pulsing;
    }
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CONSOLE_CAPACITY)
    }
}
