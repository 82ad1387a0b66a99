use std::fmt::{self, Write};

use log::Level;

use crate::domain::ports::Logger;

/// [`Logger`] backed by the `log` facade. The active level is whatever the
/// process installed at start-up (`env_logger` in `main`).
#[derive(Debug, Clone, Copy)]
pub struct LogLogger {
    target: &'static str,
}

impl LogLogger {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Logger for LogLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        if !log::log_enabled!(target: self.target, level) {
            return;
        }
        log::log!(target: self.target, level, "{}", format_entry(message, fields));
    }
}

/// `message key=value key=value`
pub fn format_entry(message: &str, fields: &[(&str, &dyn fmt::Display)]) -> String {
    let mut line = String::from(message);
    for (key, value) in fields {
        let _ = write!(line, " {}={}", key, value);
    }
    line
}

#[cfg(test)]
pub(crate) use recording::RecordingLogger;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_entry_appends_fields_in_order() {
        let id = 42;
        let line = format_entry(
            "failed to delete order",
            &[("operation", &"delete_order"), ("id", &id)],
        );
        assert_eq!(line, "failed to delete order operation=delete_order id=42");
    }

    #[test]
    fn format_entry_without_fields_is_the_message() {
        assert_eq!(format_entry("sweep finished", &[]), "sweep finished");
    }

    #[test]
    fn recording_logger_keeps_levels() {
        let logger = RecordingLogger::default();
        logger.info("hello", &[]);
        logger.error("boom", &[("id", &1)]);
        assert_eq!(logger.entries().len(), 2);
        assert_eq!(logger.errors(), vec!["boom id=1".to_string()]);
    }
}
