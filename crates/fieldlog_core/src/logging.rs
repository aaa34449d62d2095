//! File logging for hosts of the field log core and for the CLI.
//!
//! # Invariants
//! - At most one logger per process. Repeating init with the same level and
//!   directory is a no-op; any other combination is rejected.
//! - Init reports failures as `Err` and never panics.
//! - Core log lines carry `key=value` metadata only, never record text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "fieldlog";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn matches(&self, level: LevelFilter, dir: &Path) -> Result<(), String> {
        if self.level == level && self.dir == dir {
            return Ok(());
        }
        Err(format!(
            "logging already runs at {} in `{}`; cannot switch to {level} in `{}`",
            self.level,
            self.dir.display(),
            dir.display()
        ))
    }
}

/// Starts rotating file logs at `level` in `log_dir`.
///
/// Relative directories resolve against the working directory.
///
/// # Errors
/// - `level` is not one of trace, debug, info, warn, error.
/// - `log_dir` is blank or cannot be created.
/// - Logging already runs with another level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = parse_level(level)?;
    let dir = resolve_dir(log_dir)?;
    ACTIVE
        .get_or_try_init(|| start(level, &dir))?
        .matches(level, &dir)
}

fn start(level: LevelFilter, dir: &Path) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(dir)
        .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;

    let handle = Logger::try_with_str(level.to_string().to_ascii_lowercase())
        .map_err(|err| format!("invalid log level {level}: {err}"))?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("cannot start logger: {err}"))?;

    info!(
        "event=logging_start module=logging status=ok version={} level={level}",
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

/// Active level and directory, or `None` before `init_logging` succeeded.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error",
            level.trim()
        )),
        Ok(filter) => Ok(filter),
    }
}

fn resolve_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log directory cannot be empty".to_string());
    }
    std::path::absolute(trimmed)
        .map_err(|err| format!("cannot resolve log directory `{trimmed}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_level, resolve_dir};
    use log::LevelFilter;

    #[test]
    fn parse_level_is_case_insensitive_and_rejects_off() {
        assert_eq!(parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::Warn);
        assert!(parse_level("off").is_err());
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn resolve_dir_makes_relative_paths_absolute() {
        assert!(resolve_dir("logs/dev").unwrap().is_absolute());
        assert!(resolve_dir("   ").is_err());
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_str = first.path().to_str().unwrap();
        let second_str = second.path().to_str().unwrap();

        init_logging("info", first_str).unwrap();
        init_logging("INFO", first_str).unwrap();

        assert!(init_logging("debug", first_str)
            .unwrap_err()
            .contains("cannot switch"));
        assert!(init_logging("info", second_str)
            .unwrap_err()
            .contains("cannot switch"));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, LevelFilter::Info);
        assert_eq!(dir, first.path());
    }
}
