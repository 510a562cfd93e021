use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

struct Logger {
    events: Mutex<File>,
    errors: Mutex<File>,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Open the log files under `root/log`. Until this runs, `log_event` and
/// `log_error` are no-ops, so embedding consumers that never initialize
/// logging pay nothing.
pub fn init(root: &Path) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let log_dir = root.join("log");
    std::fs::create_dir_all(&log_dir)
        .map_err(|err| format!("log directory create failed: {}", err))?;

    let events = open_log(&log_dir.join("teleport.log"))?;
    let errors = open_log(&log_dir.join("error.log"))?;

    LOGGER
        .set(Logger {
            events: Mutex::new(events),
            errors: Mutex::new(errors),
        })
        .map_err(|_| "log system already initialized".to_string())?;
    Ok(())
}

pub fn log_event(message: &str) {
    if let Some(logger) = LOGGER.get() {
        write_line(&logger.events, message);
    }
}

pub fn log_error(message: &str) {
    if let Some(logger) = LOGGER.get() {
        write_line(&logger.errors, message);
    }
}

fn open_log(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| format!("open log {} failed: {}", path.display(), err))
}

fn write_line(file: &Mutex<File>, message: &str) {
    let epoch = unix_timestamp();
    if let Ok(mut file) = file.lock() {
        let _ = writeln!(file, "{epoch} {message}");
        let _ = file.flush();
    }
}

fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
