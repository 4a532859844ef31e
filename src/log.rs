//! Logger setup for unit commitment runs.
//!
//! Messages go to the terminal (warnings and errors on stderr, everything else on stdout) and,
//! when a run has an output folder, to a pair of log files inside it. The level is taken from the
//! `UC_LOG_LEVEL` environment variable if set, then from `settings.toml`, then [`DEFAULT_LOG_LEVEL`].
use anyhow::{Context, Result, bail, ensure};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::Arguments;
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// Set once the global logger has been installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable which overrides the log level from the settings file
pub const LOG_LEVEL_ENV_VAR: &str = "UC_LOG_LEVEL";

/// Log level used when neither the environment nor the settings file give one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file for progress messages (info and below)
const LOG_INFO_FILE_NAME: &str = "uc_info.log";

/// Log file for warnings and errors
const LOG_ERROR_FILE_NAME: &str = "uc_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Convert a log level name (case insensitive) to a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    Ok(match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    })
}

/// Pick the log level, giving the environment variable priority over the settings file
fn resolve_log_level(from_settings: Option<&str>) -> Result<LevelFilter> {
    match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(level) => parse_log_level(&level)
            .with_context(|| format!("Invalid value for {LOG_LEVEL_ENV_VAR}")),
        Err(_) => parse_log_level(from_settings.unwrap_or(DEFAULT_LOG_LEVEL)),
    }
}

/// Whether a record is a warning or an error
fn is_problem(record_level: log::Level) -> bool {
    record_level <= log::Level::Warn
}

/// Format a record as `[time level target] message`, colouring the level if requested
fn format_record(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colours: Option<&ColoredLevelConfig>,
) {
    let timestamp = Local::now().format("%H:%M:%S");
    let target = record.target();
    match colours {
        Some(colours) => {
            let level = colours.color(record.level());
            out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
        }
        None => {
            let level = record.level();
            out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
        }
    }
}

/// Terminal output: progress on stdout and problems on stderr
fn console_dispatch(level: LevelFilter) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let stdout_colours = std::io::stdout().is_terminal().then_some(colours);
    let stderr_colours = std::io::stderr().is_terminal().then_some(colours);

    Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| !is_problem(metadata.level()))
                .format(move |out, message, record| {
                    format_record(out, message, record, stdout_colours.as_ref());
                })
                .level(level)
                .chain(std::io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    format_record(out, message, record, stderr_colours.as_ref());
                })
                .level(level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        )
}

/// Log files in `output_dir`.
///
/// The info file always records at least info level messages, so a run can be inspected
/// afterwards even when the terminal was quiet. Problems are always written to the error file.
fn file_dispatch(output_dir: &Path, level: LevelFilter) -> Result<Dispatch> {
    let create = |file_name| {
        let path = output_dir.join(file_name);
        File::create(&path).with_context(|| format!("Could not create {}", path.display()))
    };
    let info_file = create(LOG_INFO_FILE_NAME)?;
    let error_file = create(LOG_ERROR_FILE_NAME)?;

    Ok(Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| !is_problem(metadata.level()))
                .format(|out, message, record| format_record(out, message, record, None))
                .level(level.max(LevelFilter::Info))
                .chain(info_file),
        )
        .chain(
            Dispatch::new()
                .format(|out, message, record| format_record(out, message, record, None))
                .level(LevelFilter::Warn)
                .chain(error_file),
        ))
}

/// Install the program logger.
///
/// This can only happen once per process; later calls return an error.
///
/// # Arguments
///
/// * `log_level_from_settings` - Level named in `settings.toml`, if any
/// * `output_dir` - Folder in which to create log files, if any
pub fn init(log_level_from_settings: Option<&str>, output_dir: Option<&Path>) -> Result<()> {
    ensure!(!is_logger_initialised(), "Logger already initialised");

    let level = resolve_log_level(log_level_from_settings)?;
    let mut dispatch = Dispatch::new().chain(console_dispatch(level));
    if let Some(output_dir) = output_dir {
        dispatch = dispatch.chain(file_dispatch(output_dir, level)?);
    }
    dispatch.apply()?;

    let _ = LOGGER_INIT.set(());

    Ok(())
}
