use anyhow::Result;
use std::fs;
use std::path::Path;

const LOG_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Maps a textual level to a `log` filter; unknown names fall back to `Info`.
pub fn parse_level(log_level: &str) -> log::LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

/// Installs the global logger: stdout plus `<log_dir>/<app_name>_<timestamp>.log`.
///
/// Only the newest previous log file of `app_name` is kept. Without a
/// `log_dir` the logger writes to stdout only.
///
/// # Errors
/// Fails if the log directory or file cannot be created, or if a global
/// logger is already installed.
pub fn setup_logging(log_dir: Option<&Path>, log_level: &str, app_name: &str) -> Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(parse_level(log_level))
        .chain(std::io::stdout());

    if let Some(log_dir) = log_dir {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)?;
        }

        // Keep the most recent previous run's log next to the new one.
        cleanup_old_logs(log_dir, app_name)?;

        let log_file_name = format!(
            "{}_{}.log",
            app_name,
            chrono::Local::now().format(LOG_STAMP_FORMAT)
        );
        dispatch = dispatch.chain(fern::log_file(log_dir.join(log_file_name))?);
    }

    dispatch.apply()?;
    Ok(())
}

fn cleanup_old_logs(log_dir: &Path, app_name: &str) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|res| res.ok())
        .filter(|e| is_log_of(&e.file_name().to_string_lossy(), app_name))
        .collect();

    // Timestamped names sort chronologically; newest first.
    entries.sort_by_key(|e| std::cmp::Reverse(e.file_name()));

    for entry in entries.iter().skip(1) {
        if let Err(e) = fs::remove_file(entry.path()) {
            eprintln!("Failed to delete old log file {:?}: {}", entry.path(), e);
        }
    }

    Ok(())
}

/// True for `<app_name>_<timestamp>.log` and nothing else.
fn is_log_of(file_name: &str, app_name: &str) -> bool {
    file_name
        .strip_prefix(app_name)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".log"))
        .is_some_and(|stamp| {
            chrono::NaiveDateTime::parse_from_str(stamp, LOG_STAMP_FORMAT).is_ok()
        })
}
