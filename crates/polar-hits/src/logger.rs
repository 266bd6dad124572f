//! Stderr logging with per-target levels.
//!
//! Filters are written as `default[,target=level]*`, e.g.
//! `debug,polar_hits::vertex=warn` keeps debug output everywhere except the
//! per-plane anchor lines of the vertex projector. The same string is
//! accepted by [`init_tracing`] when the `tracing` feature is enabled.

use std::io::Write;
use std::str::FromStr;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, EnvFilter};

use crate::error::LoggerError;

/// Level selection by log target (module path).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    default: LevelFilter,
    /// Longest target first, so the first prefix match is the most specific.
    targets: Vec<(String, LevelFilter)>,
}

impl LogFilter {
    pub fn new(default: LevelFilter) -> Self {
        Self {
            default,
            targets: Vec::new(),
        }
    }

    /// Override the level for `target` and every module below it.
    pub fn with_target(mut self, target: impl Into<String>, level: LevelFilter) -> Self {
        let target = target.into();
        self.targets.retain(|(t, _)| *t != target);
        self.targets.push((target, level));
        self.targets
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self
    }

    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.targets
            .iter()
            .find(|(prefix, _)| {
                target
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
            })
            .map_or(self.default, |&(_, level)| level)
    }

    /// Most verbose level any target can reach.
    pub fn max_level(&self) -> LevelFilter {
        self.targets
            .iter()
            .map(|&(_, level)| level)
            .fold(self.default, Ord::max)
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

impl FromStr for LogFilter {
    type Err = LoggerError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parse_level = |s: &str| {
            LevelFilter::from_str(s.trim())
                .map_err(|_| LoggerError::InvalidDirective(spec.to_string()))
        };

        let mut filter = LogFilter::default();
        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((target, level)) => {
                    let target = target.trim();
                    if target.is_empty() {
                        return Err(LoggerError::InvalidDirective(spec.to_string()));
                    }
                    filter = filter.with_target(target, parse_level(level)?);
                }
                None => filter.default = parse_level(directive)?,
            }
        }
        Ok(filter)
    }
}

struct FilteredLogger {
    filter: LogFilter,
    started: Instant,
}

impl Log for FilteredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            std::io::stderr().lock(),
            "{:>9.3}s {:<5} {}: {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the stderr logger as the global `log` backend.
///
/// Fails with [`LoggerError::AlreadyInstalled`] whenever some logger
/// (this one or another) is already in place.
pub fn init(filter: LogFilter) -> Result<(), LoggerError> {
    let max = filter.max_level();
    log::set_boxed_logger(Box::new(FilteredLogger {
        filter,
        started: Instant::now(),
    }))
    .map_err(|_| LoggerError::AlreadyInstalled)?;
    log::set_max_level(max);
    Ok(())
}

/// Install a `tracing` fmt subscriber that closes spans with timings.
///
/// `filter` uses the same directive syntax as [`LogFilter`].
#[cfg(feature = "tracing")]
pub fn init_tracing(filter: &str) -> Result<(), LoggerError> {
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|_| LoggerError::InvalidDirective(filter.to_string()))?;
    fmt()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(fmt::time::Uptime::default())
        .try_init()
        .map_err(|_| LoggerError::AlreadyInstalled)
}
