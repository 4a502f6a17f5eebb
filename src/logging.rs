//! logging — ready-made `slog` loggers for panel builders and estimators.
//!
//! Every [`PanelBuilder`](crate::panel::PanelBuilder), `FirstDiff` and
//! `FixedEffects` logs to a discarding logger unless one is installed with
//! `with_logger`. [`terminal_logger`] is the non-blocking terminal logger
//! used for interactive runs.

use slog::{Drain, Level, Logger, o};

/// Non-blocking terminal logger (`slog-term` formatting behind a
/// `slog-async` worker) that keeps records at `level` and above.
pub fn terminal_logger(level: Level) -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().filter_level(level).fuse();
    Logger::root(drain, o!("crate" => "panel_reg"))
}

/// Discarding logger, the default of every builder and estimator.
pub fn null_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::info;

    #[test]
    // Purpose
    // -------
    // Both loggers accept records without panicking.
    fn loggers_accept_records() {
        let term = terminal_logger(Level::Warning);
        let null = null_logger();

        info!(term, "filtered out"; "n" => 1);
        info!(null, "discarded"; "n" => 2);
    }
}
