//! Plain-text rendering of page state.

use std::fmt;

/// A rendered page: a list of text lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    lines: Vec<String>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// A heading underlined to its width.
    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.line(text);
        self.line("=".repeat(text.chars().count()))
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    /// `Label: value`
    pub fn field(&mut self, label: &str, value: impl fmt::Display) -> &mut Self {
        self.line(format!("{label}: {value}"))
    }

    /// A clickable control; disabled controls are shown in parentheses.
    pub fn button(&mut self, label: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.line(format!("[{label}]"))
        } else {
            self.line(format!("({label})"))
        }
    }

    /// A list item, indented one level.
    pub fn item(&mut self, text: impl fmt::Display) -> &mut Self {
        self.line(format!("  - {text}"))
    }

    pub fn separator(&mut self) -> &mut Self {
        self.line("-".repeat(40))
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line(String::new())
    }

    /// Appends `other`, indenting each of its lines by `indent` spaces.
    pub fn nest(&mut self, other: &View, indent: usize) -> &mut Self {
        let pad = " ".repeat(indent);
        for line in &other.lines {
            if line.is_empty() {
                self.blank();
            } else {
                self.line(format!("{pad}{line}"));
            }
        }
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
