//! Colored section banners for example output.
//!
//! Each call writes one block: a `=` rule, the upper-cased title between
//! `//==> ` markers, a `-` rule and the content. Every line is wrapped in
//! an ANSI color and a reset so color never bleeds into later output.

use std::fmt;
use std::io::{self, Write};

/// Width of the `=` and `-` rules.
pub const RULE_WIDTH: usize = 80;

/// Marker placed before and after the title.
pub const TITLE_MARKER: &str = "//==> ";

pub const RESET: &str = "\x1b[0m";

/// Terminal colors used by the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Cyan,
    Yellow,
    Magenta,
    BrightGreen,
}

impl Color {
    pub fn escape(self) -> &'static str {
        match self {
            Color::Cyan => "\x1b[36m",
            Color::Yellow => "\x1b[33m",
            Color::Magenta => "\x1b[35m",
            Color::BrightGreen => "\x1b[92m",
        }
    }

    fn paint(self, text: &str) -> String {
        format!("{}{}{}", self.escape(), text, RESET)
    }
}

/// One titled block of output. Built at call time and thrown away after
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: String,
    pub content: String,
}

impl Banner {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Exact bytes written for this banner, escape sequences included.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", Color::Cyan.paint(&"=".repeat(RULE_WIDTH)))?;
        let heading = format!(
            "{}{}{}",
            TITLE_MARKER,
            self.title.to_uppercase(),
            TITLE_MARKER
        );
        writeln!(f, "{}", Color::Yellow.paint(&heading))?;
        writeln!(f, "{}", Color::Magenta.paint(&"-".repeat(RULE_WIDTH)))?;
        writeln!(f, "{}", Color::BrightGreen.paint(&self.content))?;
        writeln!(f)
    }
}

/// Writes one banner to `out`.
pub fn write_section<W: Write>(out: &mut W, title: &str, content: &str) -> io::Result<()> {
    out.write_all(Banner::new(title, content).render().as_bytes())
}

/// Writes one banner to standard output.
pub fn log_section(title: &str, content: &str) {
    print!("{}", Banner::new(title, content));
}
