//! Logger initialization for the server

use jiff::{Zoned, tz::TimeZone};
use logforth::{append::Stderr, filter::EnvFilter, layout::Layout};
use std::{fmt::Write, io::IsTerminal, str::FromStr, sync::Once};

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

/// Single-line layout: UTC timestamp, level, target and message.
#[derive(Debug)]
struct UtcLayout {
    color: bool,
}

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "31",
        log::Level::Warn => "33",
        log::Level::Info => "32",
        log::Level::Debug => "34",
        log::Level::Trace => "35",
    }
}

impl Layout for UtcLayout {
    fn format(
        &self,
        record: &log::Record<'_>,
        _diagnostics: &[Box<dyn logforth::diagnostic::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let mut output = String::new();
        let now = Zoned::now().with_time_zone(TimeZone::UTC);
        let level = record.level();

        write!(output, "{} ", now.strftime("%Y-%m-%dT%H:%M:%S%.3fZ"))?;

        if self.color {
            write!(output, "\x1b[{}m{level:>5}\x1b[0m", level_color(level))?;
        } else {
            write!(output, "{level:>5}")?;
        }

        write!(output, " {}: {}", record.target(), record.args())?;

        Ok(output.into_bytes())
    }
}

/// Initialize the logger once per process.
/// The log_filter should be a string like "info" or "server=debug,llm=debug"; an unparsable
/// filter falls back to "info".
pub fn init(log_filter: &str) {
    let log_filter = log_filter.to_owned();
    INIT.call_once(move || apply_logger(&log_filter));
}

fn parse_filter(log_filter: &str) -> Option<EnvFilter> {
    EnvFilter::from_str(log_filter)
        .or_else(|_| {
            eprintln!("Invalid log filter '{log_filter}', falling back to '{DEFAULT_FILTER}'");
            EnvFilter::from_str(DEFAULT_FILTER)
        })
        .ok()
}

fn apply_logger(log_filter: &str) {
    let Some(filter) = parse_filter(log_filter) else {
        return;
    };

    let layout = UtcLayout {
        color: std::io::stderr().is_terminal(),
    };

    logforth::builder()
        .dispatch(move |d| d.filter(filter).append(Stderr::default().with_layout(layout)))
        .apply();
}
