/*
 * keysel - configuration module.
 *
 * Copyright 2017 Manos Pitsidianakis
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

//! Configuration logic and `config.toml` interfaces.

extern crate serde;
extern crate toml;
extern crate xdg;

use std::{
    env,
    fs::OpenOptions,
    io::Write,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Arc,
};

use keyselib::{
    crypto::SelectionPolicy, error::*, log, LogLevel, ShellExpandTrait, StderrLogger,
};

pub mod default_values;
use default_values as default_vals;


pub mod pgp;
pub mod terminal;

/// Environment variable holding the configuration file path.
pub const CONFIG_ENV_VAR: &str = "KEYSEL_CONFIG";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    #[serde(default)]
    pub pgp: pgp::PGPSettings,
    #[serde(default)]
    pub terminal: terminal::TerminalSettings,
    #[serde(default)]
    pub log: LogSettings,
}

pub fn get_config_file() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path).expand());
    }
    let xdg_dirs = xdg::BaseDirectories::with_prefix("keysel")?;
    xdg_dirs
        .place_config_file("config.toml")
        .chain_err_summary(|| {
            format!(
                "Cannot create configuration directory in {}",
                xdg_dirs.get_config_home().display()
            )
        })
        .chain_err_kind(ErrorKind::Platform)
}

/// Keyring used when neither `--keyring` nor `pgp.keyring` is given.
pub fn get_default_keyring() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("keysel")?;
    xdg_dirs
        .place_data_file("keyring.json")
        .chain_err_summary(|| {
            format!(
                "Cannot create data directory in {}",
                xdg_dirs.get_data_home().display()
            )
        })
        .chain_err_kind(ErrorKind::Platform)
}

impl FileSettings {
    pub const EXAMPLE_CONFIG: &'static str = include_str!("../docs/samples/sample-config.toml");

    /// Load the configuration file. A missing file means default settings.
    pub fn new() -> Result<Self> {
        let config_path = get_config_file()?;
        if !config_path.exists() {
            let path_string = config_path.display().to_string();
            if path_string.is_empty() {
                return Err(Error::new("Given configuration path is empty.")
                    .set_kind(ErrorKind::Configuration));
            }
            return Ok(Self::default());
        }
        Self::validate(config_path)
    }

    /// Validate configuration from `input` string.
    pub fn validate_string(s: &str) -> Result<Self> {
        let _: toml::Table = toml::from_str(s).map_err(|err| {
            Error::new("Config file is invalid TOML")
                .set_source(Some(Arc::new(err)))
                .set_kind(ErrorKind::ValueError)
        })?;

        let s: Self = toml::from_str(s).map_err(|err| {
            Error::new("Input contains errors")
                .set_source(Some(Arc::new(err)))
                .set_kind(ErrorKind::Configuration)
        })?;
        Ok(s)
    }

    /// Validate `path` and print errors.
    pub fn validate(path: PathBuf) -> Result<Self> {
        let s = std::fs::read_to_string(&path)
            .chain_err_summary(|| format!("Could not read configuration file {}", path.display()))?;
        let _: toml::Table = toml::from_str(&s).map_err(|err| {
            Error::new(format!(
                "{}: Config file is invalid TOML; {}",
                path.display(),
                err
            ))
            .set_kind(ErrorKind::ValueError)
        })?;

        let s: Self = toml::from_str(&s).map_err(|err| {
            Error::new(format!("{}: Config file contains errors", path.display()))
                .set_source(Some(Arc::new(err)))
                .set_kind(ErrorKind::Configuration)
        })?;

        Ok(s)
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub pgp: pgp::PGPSettings,
    pub terminal: terminal::TerminalSettings,
    pub log: LogSettings,
    pub _logger: StderrLogger,
}

impl Settings {
    /// Load the configuration file and install the logger.
    pub fn new() -> Result<Self> {
        let fs = FileSettings::new()?;
        Self::from_file_settings(fs)
    }

    pub fn from_file_settings(fs: FileSettings) -> Result<Self> {
        let mut _logger = StderrLogger::new(fs.log.maximum_level);

        if let Some(ref log_path) = fs.log.log_file {
            _logger.change_log_dest(log_path.into())?;
        }
        log::debug!("Loaded settings, logging to {}", _logger.log_dest().display());

        Ok(Self {
            pgp: fs.pgp,
            terminal: fs.terminal,
            log: fs.log,
            _logger,
        })
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.pgp.policy(self.terminal.charset)
    }

    /// The keyring to load: `cli_override`, then `pgp.keyring`, then the
    /// default location.
    pub fn keyring_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        match cli_override.or(self.pgp.keyring.as_deref()) {
            Some(path) => Ok(path.expand()),
            None => get_default_keyring(),
        }
    }
}

mod deserializers {
    use serde::{Deserialize, Deserializer};

    pub(in crate::conf) fn non_empty_opt_string<'de, D, T: std::convert::From<Option<String>>>(
        deserializer: D,
    ) -> std::result::Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String>::deserialize(deserializer)?;
        if s.is_empty() {
            Ok(None.into())
        } else {
            Ok(Some(s).into())
        }
    }
}

pub fn create_config_file(p: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(p)
        .chain_err_summary(|| format!("Cannot create configuration file in {}", p.display()))?;
    file.write_all(FileSettings::EXAMPLE_CONFIG.as_bytes())
        .and_then(|()| file.flush())
        .chain_err_summary(|| format!("Could not write to configuration file {}", p.display()))?;
    println!("Written example configuration to {}", p.display());
    let set_permissions = |file: std::fs::File| -> Result<()> {
        let metadata = file.metadata()?;
        let mut permissions = metadata.permissions();

        permissions.set_mode(0o600); // Read/write for owner only.
        file.set_permissions(permissions)?;
        Ok(())
    };
    if let Err(err) = set_permissions(file) {
        println!(
            "Warning: Could not set permissions of {} to 0o600: {}",
            p.display(),
            err
        );
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    #[serde(default, alias = "log-file")]
    pub log_file: Option<PathBuf>,
    #[serde(default, alias = "level", alias = "maximum-level")]
    pub maximum_level: LogLevel,
}
