use parking_lot::Mutex;
/// Log bridge for termprofile
///
/// Routes every `log::info!()` etc. from this crate and termprofile-config
/// to a single sink. The level comes from, in order of precedence:
/// - the `--log-level` command-line flag
/// - the TERMPROFILE_LOG environment variable
///   (`off`, `error`, `warn`, `info`, `debug`, `trace`, or 0-5)
/// - off
///
/// Output goes to stderr unless a log file is given, in which case the file
/// is truncated and a session header is written first.
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Environment variable consulted when no level is given explicitly.
pub const LOG_ENV_VAR: &str = "TERMPROFILE_LOG";

/// Verbosity accepted on the command line and in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DebugLevel {
    #[default]
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl DebugLevel {
    fn from_env() -> Self {
        std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DebugLevel::Off)
    }

    fn to_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Error,
            DebugLevel::Warn => log::LevelFilter::Warn,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "off" => Ok(DebugLevel::Off),
            "1" | "error" => Ok(DebugLevel::Error),
            "2" | "warn" => Ok(DebugLevel::Warn),
            "3" | "info" => Ok(DebugLevel::Info),
            "4" | "debug" => Ok(DebugLevel::Debug),
            "5" | "trace" => Ok(DebugLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DebugLevel::Off => "off",
            DebugLevel::Error => "error",
            DebugLevel::Warn => "warn",
            DebugLevel::Info => "info",
            DebugLevel::Debug => "debug",
            DebugLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

enum Sink {
    Stderr,
    File(File),
}

/// `log::Log` implementation behind the bridge
struct DebugLogger {
    level: DebugLevel,
    sink: Mutex<Sink>,
}

impl DebugLogger {
    fn new(level: DebugLevel, log_file: Option<&Path>) -> Self {
        let sink = match log_file {
            Some(path) => match OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(path)
            {
                Ok(mut f) => {
                    let _ = writeln!(
                        f,
                        "\n{}\ntermprofile session started at {} (level={})\n{}",
                        "=".repeat(80),
                        get_timestamp(),
                        level,
                        "=".repeat(80)
                    );
                    Sink::File(f)
                }
                Err(e) => {
                    eprintln!("termprofile: cannot open log file {}: {e}", path.display());
                    Sink::Stderr
                }
            },
            None => Sink::Stderr,
        };
        DebugLogger {
            level,
            sink: Mutex::new(sink),
        }
    }
}

impl log::Log for DebugLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level.to_filter()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        match &mut *self.sink.lock() {
            Sink::Stderr => {
                let _ = std::io::stderr().write_all(line.as_bytes());
            }
            Sink::File(f) => {
                let _ = f.write_all(line.as_bytes());
                let _ = f.flush();
            }
        }
    }

    fn flush(&self) {
        if let Sink::File(f) = &mut *self.sink.lock() {
            let _ = f.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Resolve the effective level: explicit flag, then environment, then off.
pub fn effective_level(cli_level: Option<DebugLevel>) -> DebugLevel {
    cli_level.unwrap_or_else(DebugLevel::from_env)
}

/// Default log file location in the temp directory.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("termprofile_debug.log")
}

/// Install the bridge as the global logger. Later calls are no-ops.
pub fn init_log_bridge(cli_level: Option<DebugLevel>, log_file: Option<&Path>) {
    let level = effective_level(cli_level);
    let logger = LOGGER.get_or_init(|| DebugLogger::new(level, log_file));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level.to_filter());
    }
}
