/*
 * keysel - subcommands.rs
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

//! Implementations of the command line subcommands.

use std::io::{prelude::*, BufReader};

use keyselib::{
    crypto::{
        print_certificate_chain, select_key, KeyApplication, KeyInfoPrompts, KeyRequest,
        KeyService, KeyStore, SelectionSession,
    },
    log, ErrorKind, Result, ShellExpandTrait,
};

use crate::{args::PathOrStdio, conf, terminal::LineMenu, *};

fn load_keyring(settings: &Settings, keyring: Option<PathBuf>) -> Result<KeyStore> {
    let path = settings.keyring_path(keyring.as_deref())?;
    KeyStore::load(&path)
}

pub fn select(
    settings: &Settings,
    keyring: Option<PathBuf>,
    address: Option<String>,
    label: Option<String>,
    protocol: KeyApplication,
    pattern: Option<String>,
) -> Result<()> {
    let store = load_keyring(settings, keyring)?;
    let Some(pattern) = pattern.or_else(|| address.clone()).or_else(|| label.clone()) else {
        return Err(Error::new(
            "Nothing to search for: give a PATTERN, --address or --label.",
        )
        .set_kind(ErrorKind::ValueError));
    };
    let candidates = store.list_keys(&pattern, protocol)?;
    if candidates.is_empty() {
        return Err(Error::new(format!("No keys match `{}`.", pattern)).set_kind(ErrorKind::NotFound));
    }
    let request = KeyRequest {
        address,
        label: label.unwrap_or_else(|| pattern.clone()),
        app: protocol,
    };
    let policy = settings.policy();
    let stdin = std::io::stdin();
    let mut ui = LineMenu::new(stdin.lock(), std::io::stderr(), policy.charset);
    let mut pager = CommandPager::new(settings.terminal.pager.as_deref());
    let selection = select_key(&candidates, &request, &policy, &store, &mut ui, &mut pager)?;
    let Some(key) = selection.key else {
        return Err(Error::new("No key selected."));
    };
    log::info!(
        "Selected {}{}",
        key.fpr_or_lkeyid(),
        if selection.forced_valid { " (forced valid)" } else { "" }
    );
    println!(
        "{}{}",
        key.fpr_or_lkeyid(),
        if selection.forced_valid { "!" } else { "" }
    );
    Ok(())
}

pub fn list(
    settings: &Settings,
    keyring: Option<PathBuf>,
    protocol: KeyApplication,
    pattern: Option<String>,
) -> Result<()> {
    let store = load_keyring(settings, keyring)?;
    let pattern = pattern.unwrap_or_default();
    let candidates = store.list_keys(&pattern, protocol)?;
    let request = KeyRequest {
        address: None,
        label: pattern,
        app: protocol,
    };
    let policy = settings.policy();
    let session = SelectionSession::new(&candidates, &request, &policy)?;
    let mut stdout = std::io::stdout().lock();
    for line in session.lines() {
        stdout.write_all(&policy.charset.encode(&line))?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

pub fn verify(settings: &Settings, keyring: Option<PathBuf>, id: &str) -> Result<()> {
    let store = load_keyring(settings, keyring)?;
    let Some(index) = store.find(id) else {
        return Err(Error::new(format!("No key matches `{}`.", id)).set_kind(ErrorKind::NotFound));
    };
    let mut stdout = std::io::stdout().lock();
    print_certificate_chain(
        &mut stdout,
        &store[index],
        &store,
        KeyInfoPrompts::global(),
        settings.terminal.charset,
    )?;
    stdout.flush()?;
    Ok(())
}

pub fn create_config(path: Option<PathOrStdio>) -> Result<()> {
    let config_path = match path {
        Some(PathOrStdio::Stdio) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(conf::FileSettings::EXAMPLE_CONFIG.as_bytes())?;
            stdout.flush()?;
            return Ok(());
        }
        Some(PathOrStdio::Path(path)) => path.expand(),
        None => conf::get_config_file()?,
    };
    if config_path.exists() {
        return Err(Error::new(format!(
            "File `{}` already exists.\nMaybe you meant to specify another path?",
            config_path.display()
        )));
    }
    conf::create_config_file(&config_path)?;
    Ok(())
}

pub fn test_config(path: Option<PathOrStdio>) -> Result<()> {
    let config_path = match path {
        Some(PathOrStdio::Stdio) => {
            let mut input = String::new();
            BufReader::new(std::io::stdin().lock()).read_to_string(&mut input)?;
            conf::FileSettings::validate_string(&input)?;
            return Ok(());
        }
        Some(PathOrStdio::Path(path)) => path.expand(),
        None => conf::get_config_file()?,
    };
    conf::FileSettings::validate(config_path)?;
    Ok(())
}
