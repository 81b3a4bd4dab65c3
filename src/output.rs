//! # Output Configuration
//!
//! Controls how command summaries look on the terminal: whether markers are
//! emoji or plain text, and whether text is colored.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` and `never` are taken literally; anything else detects
    /// support from the environment and the terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Status markers used in command summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Success,
    Failure,
    Skipped,
    Manual,
}

impl Marker {
    fn emoji(self) -> &'static str {
        match self {
            Marker::Success => "✅",
            Marker::Failure => "❌",
            Marker::Skipped => "⏭️",
            Marker::Manual => "📋",
        }
    }

    fn plain(self) -> &'static str {
        match self {
            Marker::Success => "[OK]",
            Marker::Failure => "[FAIL]",
            Marker::Skipped => "[SKIP]",
            Marker::Manual => "[MANUAL]",
        }
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One summary line: marker, then the message, colored by outcome.
pub fn status_line(config: &OutputConfig, marker: Marker, message: &str) -> String {
    let symbol = emoji(config, marker.emoji(), marker.plain());
    if !config.use_color {
        return format!("{} {}", symbol, message);
    }

    let styled = match marker {
        Marker::Success => style(message).green(),
        Marker::Failure => style(message).red().bold(),
        Marker::Skipped => style(message).dim(),
        Marker::Manual => style(message).yellow(),
    };
    format!("{} {}", symbol, styled.force_styling(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
    }

    #[test]
    fn test_emoji_helper() {
        assert_eq!(emoji(&OutputConfig::with_color(), "✅", "[OK]"), "✅");
        assert_eq!(emoji(&OutputConfig::without_color(), "✅", "[OK]"), "[OK]");
    }

    #[test]
    fn test_status_line_plain() {
        let config = OutputConfig::without_color();
        assert_eq!(
            status_line(&config, Marker::Success, "site rendered"),
            "[OK] site rendered"
        );
        assert_eq!(
            status_line(&config, Marker::Failure, "db failed"),
            "[FAIL] db failed"
        );
    }

    #[test]
    fn test_status_line_colored() {
        let line = status_line(&OutputConfig::with_color(), Marker::Failure, "db failed");
        assert!(line.starts_with("❌ "));
        assert!(line.contains("db failed"));
        assert!(line.contains("\u{1b}["));
    }
}
