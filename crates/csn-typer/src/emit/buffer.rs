//! Indentation-aware line accumulator.

/// One level of indentation.
pub const INDENT: &str = "  ";

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    parts: Vec<String>,
    depth: usize,
    closed: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    /// # Panics
    /// When the buffer is not indented.
    pub fn outdent(&mut self) {
        assert!(self.depth > 0, "cannot outdent a buffer below zero");
        self.depth -= 1;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn current_indent(&self) -> String {
        INDENT.repeat(self.depth)
    }

    /// Appends a line at the current indentation. Empty lines stay empty.
    ///
    /// # Panics
    /// When the buffer was closed.
    pub fn add(&mut self, line: impl AsRef<str>) {
        assert!(!self.closed, "cannot write into a closed buffer");
        let line = line.as_ref();
        if line.is_empty() {
            self.parts.push(String::new());
        } else {
            self.parts.push(format!("{}{}", self.current_indent(), line));
        }
    }

    /// Appends a multi-line text, indenting every line.
    pub fn add_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.add(line);
        }
    }

    /// Writes `open`, the indented body and `close`.
    pub fn add_block(&mut self, open: impl AsRef<str>, body: impl FnOnce(&mut Buffer), close: impl AsRef<str>) {
        self.add(open);
        self.indent();
        body(self);
        self.outdent();
        self.add(close);
    }

    /// Marks the buffer as finished. Further writes panic.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.parts
    }

    pub fn join(&self, glue: &str) -> String {
        self.parts.join(glue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_lines() {
        let mut buffer = Buffer::new();
        buffer.add("class A {");
        buffer.indent();
        buffer.add("x: number;");
        buffer.add("");
        buffer.outdent();
        buffer.add("}");
        assert_eq!(buffer.join("\n"), "class A {\n  x: number;\n\n}");
    }

    #[test]
    fn block_restores_depth() {
        let mut buffer = Buffer::new();
        buffer.add_block("{", |b| b.add_lines("a\nb"), "}");
        assert_eq!(buffer.depth(), 0);
        assert_eq!(buffer.lines(), &["{", "  a", "  b", "}"]);
    }

    #[test]
    #[should_panic(expected = "below zero")]
    fn outdent_below_zero_panics() {
        Buffer::new().outdent();
    }

    #[test]
    #[should_panic(expected = "closed buffer")]
    fn writing_after_close_panics() {
        let mut buffer = Buffer::new();
        buffer.close();
        buffer.add("late");
    }
}
