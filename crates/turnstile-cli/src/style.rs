//! Semantic terminal styling.
//!
//! A thin extension trait over `console` so commands say what a string
//! means, not which color it should be.

use console::style;

/// Applies semantic styles to anything displayable.
pub trait SemanticStyle: std::fmt::Display + Sized {
    /// Green bold: something succeeded.
    fn success(&self) -> String {
        style(self).green().bold().to_string()
    }

    /// Red bold: something failed.
    fn error(&self) -> String {
        style(self).red().bold().to_string()
    }

    /// Yellow: something to pay attention to.
    fn warning(&self) -> String {
        style(self).yellow().to_string()
    }

    /// Bold: a section header or key figure.
    fn header(&self) -> String {
        style(self).bold().to_string()
    }

    /// Blue: a command, path, or literal value.
    fn code(&self) -> String {
        style(self).blue().to_string()
    }

    /// Dimmed: secondary detail.
    fn muted(&self) -> String {
        style(self).dim().to_string()
    }
}

impl<T: std::fmt::Display> SemanticStyle for T {}
