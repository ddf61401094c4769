/*
 * keysel - pager.rs
 *
 * Copyright 2017-2018 Manos Pitsidianakis
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

//! Show key reports through an external pager.

use std::{
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use keyselib::{crypto::Pager, log, Error, ErrorKind, Result, ResultIntoError};

/// [`Pager`] that runs a shell command on the report file, or copies the
/// report to standard error when standard output is not a terminal.
#[derive(Clone, Debug)]
pub struct CommandPager {
    command: String,
    tty: bool,
}

impl CommandPager {
    /// `command` comes from the configuration; `$PAGER` and `more` are the
    /// fallbacks.
    pub fn new(command: Option<&str>) -> Self {
        let command = command
            .map(str::to_string)
            .or_else(|| std::env::var("PAGER").ok().filter(|p| !p.trim().is_empty()))
            .unwrap_or_else(|| "more".to_string());
        Self {
            command,
            tty: termion::is_tty(&std::io::stdout()),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Pager for CommandPager {
    fn display(&mut self, path: &Path, title: &str) -> Result<()> {
        if !self.tty {
            let contents = std::fs::read(path)
                .chain_err_summary(|| format!("Could not read {}", path.display()))?;
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "{}", title)?;
            stderr.write_all(&contents)?;
            stderr.flush()?;
            return Ok(());
        }

        log::trace!("Running pager `{}` on {}", self.command, path.display());
        let status = Command::new("sh")
            .arg("-c")
            .arg(format!("{} \"$1\"", self.command))
            .arg("keysel")
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .chain_err_summary(|| format!("Could not run pager `{}`", self.command))
            .chain_err_kind(ErrorKind::External)?;
        if !status.success() {
            return Err(Error::new(format!(
                "Pager `{}` exited with {}",
                self.command, status
            ))
            .set_kind(ErrorKind::External));
        }
        Ok(())
    }
}
