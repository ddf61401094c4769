/*
 * keysel - keyselib logging
 *
 * Copyright 2019 Manos Pitsidianakis
 *
 * This file is part of keysel.
 *
 * keysel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * keysel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with keysel. If not, see <http://www.gnu.org/licenses/>.
 */

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::{Error, ErrorKind, Result, ResultIntoError};

/// Environment variable that mirrors every log record to stderr.
pub const DEBUG_STDERR_ENV_VAR: &str = "KEYSEL_DEBUG_STDERR";

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, PartialOrd, Serialize)]
#[repr(u8)]
pub enum LogLevel {
    OFF = 0,
    ERROR,
    WARN,
    #[default]
    INFO,
    DEBUG,
    TRACE,
}

impl From<u8> for LogLevel {
    fn from(verbosity: u8) -> Self {
        match verbosity {
            0 => Self::OFF,
            1 => Self::ERROR,
            2 => Self::WARN,
            3 => Self::INFO,
            4 => Self::DEBUG,
            _ => Self::TRACE,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::ERROR => Self::Error,
            LogLevel::WARN => Self::Warn,
            LogLevel::OFF | LogLevel::INFO => Self::Info,
            LogLevel::DEBUG => Self::Debug,
            LogLevel::TRACE => Self::Trace,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::OFF => Self::Off,
            LogLevel::ERROR => Self::Error,
            LogLevel::WARN => Self::Warn,
            LogLevel::INFO => Self::Info,
            LogLevel::DEBUG => Self::Debug,
            LogLevel::TRACE => Self::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OFF => "OFF",
                ERROR => "ERROR",
                WARN => "WARN",
                INFO => "INFO",
                DEBUG => "DEBUG",
                TRACE => "TRACE",
            }
        )
    }
}

impl std::str::FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim() {
            s if s.eq_ignore_ascii_case("off") => OFF,
            s if s.eq_ignore_ascii_case("error") => ERROR,
            s if s.eq_ignore_ascii_case("warn") => WARN,
            s if s.eq_ignore_ascii_case("info") => INFO,
            s if s.eq_ignore_ascii_case("debug") => DEBUG,
            s if s.eq_ignore_ascii_case("trace") => TRACE,
            other => {
                return Err(Error::new(format!("Invalid log level `{}`", other))
                    .set_details("Valid values are OFF, ERROR, WARN, INFO, DEBUG and TRACE.")
                    .set_kind(ErrorKind::ValueError))
            }
        })
    }
}

use LogLevel::*;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, PartialOrd, Serialize)]
pub enum Destination {
    File,
    #[default]
    Stderr,
    None,
}

struct FileOutput {
    writer: BufWriter<Box<dyn Write + Send>>,
    path: PathBuf,
}

#[derive(Clone)]
pub struct StderrLogger {
    dest: Arc<Mutex<FileOutput>>,
    level: Arc<AtomicU8>,
    print_level: bool,
    print_module_names: bool,
    debug_dest: Destination,
}

impl std::fmt::Debug for StderrLogger {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct(stringify!(StderrLogger))
            .field("level", &LogLevel::from(self.level.load(Ordering::SeqCst)))
            .field("print_level", &self.print_level)
            .field("print_module_names", &self.print_module_names)
            .field("debug_dest", &self.debug_dest)
            .finish()
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

fn open_log_file(path: &Path) -> Result<Box<dyn Write + Send>> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .read(true)
        .open(path)
        .chain_err_summary(|| format!("Could not open log file {}", path.display()))?;
    Ok(Box::new(file))
}

/// Default log file location, `$XDG_DATA_HOME/keysel/keysel.log`.
pub fn default_log_path() -> Result<PathBuf> {
    let data_dir = xdg::BaseDirectories::with_prefix("keysel")?;
    Ok(data_dir.place_data_file("keysel.log")?)
}

impl StderrLogger {
    /// Create a logger and install it as the global `log` logger.
    ///
    /// Records go to the log file under the XDG data directory; if it cannot
    /// be opened they go to stderr instead.
    pub fn new(level: LogLevel) -> Self {
        use std::sync::Once;

        static INIT_STDERR_LOGGING: Once = Once::new();

        let (writer, path): (Box<dyn Write + Send>, PathBuf) = if cfg!(test) {
            (Box::new(std::io::stderr()), PathBuf::new())
        } else {
            match default_log_path().and_then(|path| Ok((open_log_file(&path)?, path))) {
                Ok((w, path)) => (w, path),
                Err(_) => (Box::new(std::io::stderr()), PathBuf::new()),
            }
        };
        let logger = Self {
            dest: Arc::new(Mutex::new(FileOutput {
                writer: BufWriter::new(writer),
                path,
            })),
            level: Arc::new(AtomicU8::new(level as u8)),
            print_level: true,
            print_module_names: true,
            debug_dest: if cfg!(test) || std::env::var(DEBUG_STDERR_ENV_VAR).is_ok() {
                Destination::Stderr
            } else {
                Destination::None
            },
        };

        #[cfg(feature = "debug-tracing")]
        log::set_max_level(
            if matches!(LevelFilter::from(logger.log_level()), LevelFilter::Off) {
                LevelFilter::Off
            } else {
                LevelFilter::Trace
            },
        );
        #[cfg(not(feature = "debug-tracing"))]
        log::set_max_level(LevelFilter::from(logger.log_level()));

        INIT_STDERR_LOGGING.call_once(|| {
            _ = log::set_boxed_logger(Box::new(logger.clone()));
        });
        logger
    }

    pub fn log_level(&self) -> LogLevel {
        self.level.load(Ordering::SeqCst).into()
    }

    pub fn change_log_level(&self, new_val: LogLevel) {
        self.level.store(new_val as u8, Ordering::SeqCst);
        log::set_max_level(LevelFilter::from(new_val));
    }

    pub fn change_log_dest(&mut self, path: PathBuf) -> Result<()> {
        use crate::utils::shellexpand::ShellExpandTrait;

        let path = path.expand();
        let writer = open_log_file(&path)?;
        let mut dest = self.dest.lock()?;
        *dest = FileOutput {
            writer: BufWriter::new(writer),
            path,
        };
        Ok(())
    }

    pub fn log_dest(&self) -> PathBuf {
        self.dest
            .lock()
            .map(|d| d.path.clone())
            .unwrap_or_default()
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::from(self.log_level())
            || !matches!(self.debug_dest, Destination::None)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        fn write(
            writer: &mut impl Write,
            record: &Record,
            (print_level, print_module_names): (bool, bool),
        ) -> Option<()> {
            writer
                .write_all(
                    super::datetime::timestamp_to_string(
                        super::datetime::now(),
                        Some(super::datetime::formats::RFC3339_DATETIME_AND_SPACE),
                        false,
                    )
                    .as_bytes(),
                )
                .ok()?;
            writer.write_all(b" [").ok()?;
            if print_level {
                writer
                    .write_all(record.level().to_string().as_bytes())
                    .ok()?;
            }
            write!(writer, "]: ").ok()?;
            if print_module_names {
                write!(writer, "{}: ", record.metadata().target()).ok()?;
            }
            write!(writer, "{}", record.args()).ok()?;
            writer.write_all(b"\n").ok()?;
            writer.flush().ok()?;
            Some(())
        }

        match (
            self.debug_dest,
            record.metadata().level() <= Level::from(self.log_level()),
        ) {
            (Destination::None, false) => {}
            (Destination::None | Destination::File, _) => {
                _ = self.dest.lock().ok().and_then(|mut d| {
                    write(
                        &mut d.writer,
                        record,
                        (self.print_level, self.print_module_names),
                    )
                });
            }
            (Destination::Stderr, true) => {
                _ = self.dest.lock().ok().and_then(|mut d| {
                    write(
                        &mut d.writer,
                        record,
                        (self.print_level, self.print_module_names),
                    )
                });
                _ = write(
                    &mut std::io::stderr(),
                    record,
                    (self.print_level, self.print_module_names),
                );
            }
            (Destination::Stderr, false) => {
                _ = write(
                    &mut std::io::stderr(),
                    record,
                    (self.print_level, self.print_module_names),
                );
            }
        }
    }

    fn flush(&self) {
        self.dest
            .lock()
            .ok()
            .and_then(|mut w| w.writer.flush().ok());
    }
}
