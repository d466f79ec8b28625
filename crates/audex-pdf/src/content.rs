//! Page content stream builder.

use std::fmt::Write;

use crate::text::escape_literal;

/// Resource name of the single shared font.
pub const FONT_RESOURCE: &str = "F1";

/// Accumulates positioned text and rule operators for one page.
#[derive(Debug, Default, Clone)]
pub struct ContentStream {
    ops: String,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` with its baseline starting at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, size: f32, text: &str) {
        let _ = writeln!(
            self.ops,
            "BT /{FONT_RESOURCE} {size:.0} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape_literal(text)
        );
    }

    /// Stroke a horizontal rule.
    pub fn rule(&mut self, x1: f32, x2: f32, y: f32) {
        let _ = writeln!(self.ops, "0.5 w {x1:.2} {y:.2} m {x2:.2} {y:.2} l S");
    }

    pub fn text_ops(&self) -> usize {
        self.ops.matches(" Tj ET").count()
    }

    pub fn as_str(&self) -> &str {
        &self.ops
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}
