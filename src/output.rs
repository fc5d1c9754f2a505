//! Styled console output for Kubekraken
//!
//! Rendering is injected through the [`Styler`] trait so that the executor's
//! decision logic never depends on terminal capabilities. [`ColorStyler`]
//! renders with ANSI colors, [`PlainStyler`] passes text through unchanged.

use colored::Colorize;
use std::io::IsTerminal;
use std::sync::Arc;

/// Semantic role of a piece of console text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Regular command output (stdout blocks)
    Info,
    /// Positive confirmations
    Success,
    /// Errors and stderr of individual targets
    Warning,
    /// Fatal problems
    Error,
    /// Banners and summary lines
    Text,
    /// Delimiters
    Dim,
}

/// Renders text for a semantic role.
pub trait Styler: Send + Sync {
    /// Render `text` with the given style.
    fn render(&self, text: &str, style: Style) -> String;
}

/// Shared styler handle.
pub type SharedStyler = Arc<dyn Styler>;

/// ANSI color styler backed by the `colored` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorStyler;

impl Styler for ColorStyler {
    fn render(&self, text: &str, style: Style) -> String {
        match style {
            Style::Info => text.bright_blue().to_string(),
            Style::Success => text.bright_green().to_string(),
            Style::Warning => text.yellow().to_string(),
            Style::Error => text.red().bold().to_string(),
            Style::Text => text.to_string(),
            Style::Dim => text.bright_black().to_string(),
        }
    }
}

/// Passthrough styler used when colors are unsupported or disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn render(&self, text: &str, _style: Style) -> String {
        text.to_string()
    }
}

/// Pick a styler for the current process.
///
/// Colors are used only when enabled, `NO_COLOR` is unset and stdout is a
/// terminal.
pub fn styler_for(enabled: bool) -> SharedStyler {
    let use_color =
        enabled && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();

    if use_color {
        Arc::new(ColorStyler)
    } else {
        Arc::new(PlainStyler)
    }
}

/// A line of text together with its style, so callers can get either the
/// styled or the plain rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    /// Unstyled text
    pub text: String,
    /// Semantic role
    pub style: Style,
}

impl StyledText {
    /// Create a new styled line
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Render through a styler
    pub fn render(&self, styler: &dyn Styler) -> String {
        styler.render(&self.text, self.style)
    }

    /// Plain text
    pub fn plain(&self) -> &str {
        &self.text
    }
}
