//! Logger setup.
//!
//! [`init_with_level`] installs a stderr logger tuned for the colorbar
//! crates: records from `colorbar*` targets pass at the requested level,
//! everything else (image decoders, clap) only at `warn` or above. Each line
//! reads `[elapsed LEVEL stage] message`, where `stage` is the last path
//! segment of the target, so pipeline output shows up as `scan`, `cluster`,
//! `pipeline` and so on. With the `tracing` feature, [`init_tracing`]
//! installs a `tracing-subscriber` formatter instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_TARGET_PREFIX: &str = "colorbar";
const FOREIGN_LEVEL: LevelFilter = LevelFilter::Warn;

struct StageLogger {
    own: LevelFilter,
    foreign: LevelFilter,
    started: Instant,
}

impl StageLogger {
    fn threshold(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET_PREFIX) {
            self.own
        } else {
            self.foreign
        }
    }
}

/// Last `::` segment of a module path target.
fn stage_of(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &std::fmt::Arguments<'_>) -> String {
    format!("[{elapsed:8.3}s {level:>5} {}] {args}", stage_of(target))
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stage logger; `level` applies to colorbar records.
///
/// Only the first call installs anything.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StageLogger {
        own: level,
        foreign: level.min(FOREIGN_LEVEL),
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(logger.own.max(logger.foreign));
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`, defaulting to
/// `info` for colorbar crates and `warn` elsewhere. Span close events carry
/// stage timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,colorbar=info,colorbar_core=info,colorbar_finder=info")
    });
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
