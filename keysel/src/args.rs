/*
 * keysel - args.rs
 *
 * Copyright 2017-2023 Manos Pitsidianakis
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

//! Command line arguments.

use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

use keyselib::crypto::KeyApplication;

use super::*;

fn try_path_or_stdio(input: &OsStr) -> PathOrStdio {
    if input.as_bytes() == b"-" {
        PathOrStdio::Stdio
    } else {
        PathOrStdio::Path(PathBuf::from(input))
    }
}

/// `Pathbuf` or standard stream (`-` operand).
#[derive(Debug)]
pub enum PathOrStdio {
    /// Path
    Path(PathBuf),
    /// standard stream (`-` operand)
    Stdio,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "keysel",
    about = "select OpenPGP keys and inspect S/MIME certificate chains",
    version_short = "v"
)]
pub struct Opt {
    /// use specified configuration file
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// use specified JSON keyring instead of the configured one
    #[structopt(short, long, parse(from_os_str))]
    pub keyring: Option<PathBuf>,

    #[structopt(subcommand)]
    pub subcommand: SubCommand,
}

#[derive(Debug, StructOpt)]
pub enum SubCommand {
    /// choose a key interactively and print its fingerprint. A `!` is
    /// appended if a validity warning was overridden.
    #[structopt(display_order = 1)]
    Select {
        /// e-mail address the key is for
        #[structopt(long)]
        address: Option<String>,
        /// name shown in the menu title
        #[structopt(long)]
        label: Option<String>,
        /// one of pgp, smime, both
        #[structopt(short, long, default_value = "pgp")]
        protocol: KeyApplication,
        /// search keys by user id or key id; defaults to the address
        #[structopt(value_name = "PATTERN")]
        pattern: Option<String>,
    },
    /// print the sorted key listing.
    #[structopt(display_order = 2)]
    List {
        /// one of pgp, smime, both
        #[structopt(short, long, default_value = "pgp")]
        protocol: KeyApplication,
        #[structopt(value_name = "PATTERN")]
        pattern: Option<String>,
    },
    /// print a key's details and, for certificates, its issuer chain.
    #[structopt(display_order = 3)]
    Verify {
        /// fingerprint or key id, with or without `0x`
        #[structopt(value_name = "KEY_ID")]
        id: String,
    },
    /// create a sample configuration file with available configuration options.
    /// If `PATH` is not specified, keysel will try to create it in
    /// `$XDG_CONFIG_HOME/keysel/config.toml`. Path `-` will output to standard
    /// output instead.
    #[structopt(display_order = 4)]
    CreateConfig {
        #[structopt(value_name = "NEW_CONFIG_PATH", parse(from_os_str = try_path_or_stdio))]
        path: Option<PathOrStdio>,
    },
    /// test a configuration file for syntax issues or missing options.
    /// If `PATH` is not specified, keysel will try to read it from
    /// `$XDG_CONFIG_HOME/keysel/config.toml`. Path `-` will read input from
    /// standard input instead.
    #[structopt(display_order = 5)]
    TestConfig {
        #[structopt(value_name = "CONFIG_PATH", parse(from_os_str = try_path_or_stdio))]
        path: Option<PathOrStdio>,
    },
    /// print location of configuration file that will be loaded.
    PrintConfigPath,
    /// Print log file location.
    PrintLogPath,
}

impl Opt {
    /// Execute `self.subcommand`.
    pub fn execute(self) -> Result<()> {
        let Self {
            config: _,
            keyring,
            subcommand,
        } = self;
        match subcommand {
            SubCommand::Select {
                address,
                label,
                protocol,
                pattern,
            } => {
                let settings = Settings::new()?;
                subcommands::select(&settings, keyring, address, label, protocol, pattern)
            }
            SubCommand::List { protocol, pattern } => {
                let settings = Settings::new()?;
                subcommands::list(&settings, keyring, protocol, pattern)
            }
            SubCommand::Verify { id } => {
                let settings = Settings::new()?;
                subcommands::verify(&settings, keyring, &id)
            }
            SubCommand::CreateConfig { path } => subcommands::create_config(path),
            SubCommand::TestConfig { path } => subcommands::test_config(path),
            SubCommand::PrintConfigPath => {
                let config_path = crate::conf::get_config_file()?;
                println!("{}", config_path.display());
                Ok(())
            }
            SubCommand::PrintLogPath => {
                let settings = Settings::new()?;
                println!("{}", settings._logger.log_dest().display());
                Ok(())
            }
        }
    }
}
