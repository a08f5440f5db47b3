//! Colored console output for the interactive runner.

use serde::{Deserialize, Serialize};

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    BoldGreen,
    BoldCyan,
    BoldWhite,
    BoldPurple,
}

impl PrinterColor {
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldWhite => "\x1b[1;37m",
            Self::BoldPurple => "\x1b[1;35m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Width of banner rules.
pub const RULE_WIDTH: usize = 70;

/// Width of section underlines.
pub const UNDERLINE_WIDTH: usize = 40;

/// Printer for console output with optional color.
#[derive(Debug, Clone)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self { color: true }
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// `content` wrapped in the escape codes for `color`, if enabled.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        if self.color {
            format!("{}{}{}", color.ansi_code(), content, RESET)
        } else {
            content.to_string()
        }
    }

    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }

    /// A full-width `=` rule.
    pub fn rule(&self) {
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    /// A section title followed by a `-` underline.
    pub fn section(&self, title: &str, color: PrinterColor) {
        println!();
        self.print(title, color);
        println!("{}", "-".repeat(UNDERLINE_WIDTH));
    }

    /// A `label: value` line with the label colored.
    pub fn field(&self, label: &str, value: &str) {
        println!("   {} {}", self.paint(label, PrinterColor::Cyan), value);
    }
}
