//! Debug logging for cellshape
//!
//! All `log` records are routed to a file so measurement and shaping
//! diagnostics never interleave with what the terminal is displaying:
//! /tmp/cellshape_debug.log on Unix/macOS, or %TEMP%\cellshape_debug.log on
//! Windows. The file is only created once something is actually logged.
//!
//! Level precedence (highest first):
//! - `--log-level` CLI flag
//! - RUST_LOG environment variable (also mirrors output to stderr)
//! - DEBUG_LEVEL environment variable: 0 off, 1 errors, 2 info, 3 debug, 4 trace
//! - `log_level` from the config file, applied with [`apply_config_level`]

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Option<Self> {
        let val = std::env::var("DEBUG_LEVEL").ok()?;
        match val.trim().parse::<u8>() {
            Ok(0) => Some(DebugLevel::Off),
            Ok(1) => Some(DebugLevel::Error),
            Ok(2) => Some(DebugLevel::Info),
            Ok(3) => Some(DebugLevel::Debug),
            Ok(4) => Some(DebugLevel::Trace),
            _ => None,
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            DebugLevel::Off => LevelFilter::Off,
            DebugLevel::Error => LevelFilter::Error,
            DebugLevel::Info => LevelFilter::Info,
            DebugLevel::Debug => LevelFilter::Debug,
            DebugLevel::Trace => LevelFilter::Trace,
        }
    }

    fn to_level(self) -> Option<log::Level> {
        self.to_level_filter().to_level()
    }
}

/// File sink shared by every record
struct DebugLogger {
    file: Option<std::fs::File>,
    opened: bool,
    mirror_stderr: bool,
}

impl DebugLogger {
    fn new() -> Self {
        DebugLogger {
            file: None,
            opened: false,
            mirror_stderr: false,
        }
    }

    fn open(&mut self) {
        self.opened = true;
        match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(f) => {
                self.file = Some(f);
                self.write_raw(&format!(
                    "\n{}\ncellshape debug session started at {} (level={})\n{}\n",
                    "=".repeat(80),
                    get_timestamp(),
                    log::max_level(),
                    "=".repeat(80)
                ));
            }
            Err(_e) => {
                // Silently fail if log file can't be opened
                // This keeps debug output away from the terminal being measured
            }
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn write_record(&mut self, level: log::Level, target: &str, msg: &fmt::Arguments) {
        if !self.opened {
            self.open();
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            level,
            target,
            msg
        );
        if self.mirror_stderr {
            eprint!("{line}");
        }
        self.write_raw(&line);
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new()))
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Location of the debug log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let log_path = PathBuf::from("/tmp/cellshape_debug.log");
    #[cfg(not(unix))]
    let log_path = std::env::temp_dir().join("cellshape_debug.log");
    log_path
}

/// `log::Log` implementation writing into the debug file
struct LogBridge;

static BRIDGE: LogBridge = LogBridge;

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        get_logger()
            .lock()
            .write_record(record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        if let Some(ref mut file) = get_logger().lock().file {
            let _ = file.flush();
        }
    }
}

/// Most verbose level named in a RUST_LOG value (`debug`, `cellshape=trace,warn`, ...)
fn parse_rust_log(value: &str) -> Option<LevelFilter> {
    value
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next()?.trim();
            LevelFilter::from_str(level).ok()
        })
        .max()
}

/// Install the file logger as the `log` backend.
///
/// `cli_level` is the `--log-level` override. Without any override from the
/// CLI or environment, logging stays off until [`apply_config_level`].
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let rust_log = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| parse_rust_log(&value));

    let pinned = cli_level
        .or(rust_log)
        .or_else(|| DebugLevel::from_env().map(DebugLevel::to_level_filter));

    get_logger().lock().mirror_stderr = rust_log.is_some();
    LEVEL_PINNED.store(pinned.is_some(), Ordering::Release);

    // A second call only updates the level
    let _ = log::set_logger(&BRIDGE);
    log::set_max_level(pinned.unwrap_or(LevelFilter::Off));
}

/// Change the active level unconditionally.
pub fn set_log_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Apply the config file's level unless the CLI or environment chose one.
pub fn apply_config_level(level: LevelFilter) {
    if !LEVEL_PINNED.load(Ordering::Acquire) {
        set_log_level(level);
    }
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    level.to_level().is_some_and(|l| l <= log::max_level())
}

/// Log formatted message under `category`
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    let Some(level) = level.to_level() else {
        return;
    };
    if level <= log::max_level() {
        log::logger().log(
            &Record::builder()
                .level(level)
                .target(category)
                .args(args)
                .build(),
        );
    }
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
