//! Logging setup and the scoped `Logger` handle
//!
//! The binary installs `env_logger` once through [`init`]. Library code does
//! not log through the bare `log` macros: every pipeline component receives a
//! `&Logger` naming what is being processed (a playbook, then a role within
//! it), and that handle tags each record with its scope.

use std::fmt;
use std::str::FromStr;

use log::{Level, LevelFilter};

/// Target used for records that are not tied to a playbook.
const ROOT_SCOPE: &str = "ansible_template_render";

/// A logging handle carrying the scope it reports for.
#[derive(Debug, Clone)]
pub struct Logger {
    scope: String,
}

impl Logger {
    /// Create a handle reporting under `scope` (typically a playbook name).
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    /// Narrow this handle to a sub-scope, e.g. `site/nginx`.
    pub fn scoped(&self, name: &str) -> Self {
        Self {
            scope: format!("{}/{}", self.scope, name),
        }
    }

    /// The scope string this handle prefixes records with.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    fn log(&self, level: Level, message: impl fmt::Display) {
        log::log!(target: ROOT_SCOPE, level, "[{}] {}", self.scope, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(ROOT_SCOPE)
    }
}

/// Parse a `--log-level` value, falling back to `info` for unknown input.
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level).unwrap_or(LevelFilter::Info)
}

/// Install the global `env_logger` backend.
///
/// `RUST_LOG`, when set, takes precedence over `level`. Calling this twice is
/// harmless; the second call is ignored.
pub fn init(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(parse_level(level));
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.format_timestamp(None);
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_scoped_logger() {
        let logger = Logger::new("site");
        assert_eq!(logger.scope(), "site");
        assert_eq!(logger.scoped("nginx").scope(), "site/nginx");
        assert_eq!(logger.scoped("nginx").scoped("main.yml").scope(), "site/nginx/main.yml");
    }

    #[test]
    fn test_logger_records_carry_scope() {
        testing_logger::setup();
        Logger::new("site").scoped("app").warn("meta unreadable");

        testing_logger::validate(|captured| {
            assert_eq!(captured.len(), 1);
            assert_eq!(captured[0].level, Level::Warn);
            assert_eq!(captured[0].body, "[site/app] meta unreadable");
        });
    }
}
