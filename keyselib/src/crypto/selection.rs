//
// keysel - crypto::selection
//
// Copyright 2017 Emmanouil Pitsidianakis <manos@pitsidianak.is>
//
// This file is part of keysel.
//
// keysel is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// keysel is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with keysel. If not, see <http://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later

//! The interactive key selection dialog.
//!
//! [`select_key`] lists the candidate keys through a [`SelectionUi`] and
//! loops until the user either picks a key that passes the validity checks
//! of the [`SelectionPolicy`] or leaves the dialog.

use std::{
    io::{BufWriter, Write},
    path::Path,
};

use super::{
    format::{EntryContext, EntryFormat},
    info::{print_certificate_chain, KeyInfoPrompts},
    Key, KeyApplication, KeyIndex, KeyService, KeySort, KeyStore, KeyTable, Validity,
};
use crate::{
    error::{Error, KeySelectionErrorKind, Result},
    text::DisplayCharset,
};

pub const KEY_UNUSABLE_MSG: &str = "This key can't be used: expired/disabled/revoked";
pub const ID_UNUSABLE_WARNING: &str =
    "ID is expired/disabled/revoked. Do you really want to use the key?";
pub const ID_NOT_VALID_WARNING: &str = "ID is not valid. Do you really want to use the key?";
pub const ID_MARGINAL_WARNING: &str =
    "ID is only marginally valid. Do you really want to use the key?";
pub const ID_UNDEFINED_WARNING: &str =
    "ID has undefined validity. Do you really want to use the key?";

/// What the user asked for in the menu.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MenuAction {
    Select,
    Verify,
    ViewId,
    Exit,
}

/// The interaction side of the dialog.
pub trait SelectionUi {
    /// Show the menu and block until the user acts. Returns the 0-based row
    /// the action applies to.
    fn menu_loop(
        &mut self,
        title: &str,
        lines: &[String],
        current: usize,
    ) -> Result<(usize, MenuAction)>;

    fn message(&mut self, text: &str) -> Result<()>;

    fn error(&mut self, text: &str) -> Result<()>;

    /// Ask a yes/no question; `default` is the answer on empty input.
    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool>;
}

/// Shows a file to the user.
pub trait Pager {
    fn display(&mut self, path: &Path, title: &str) -> Result<()>;
}

/// Who the key is for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyRequest {
    pub address: Option<String>,
    pub label: String,
    pub app: KeyApplication,
}

impl KeyRequest {
    pub fn title(&self) -> String {
        let prefix = if self.app.contains(KeyApplication::PGP | KeyApplication::SMIME) {
            "PGP and S/MIME keys matching"
        } else if self.app.contains(KeyApplication::PGP) {
            "PGP keys matching"
        } else if self.app.contains(KeyApplication::SMIME) {
            "S/MIME keys matching"
        } else {
            "keys matching"
        };
        match self.address.as_deref() {
            Some(address) => format!("{} <{}>", prefix, address),
            None => format!("{} \"{}\"", prefix, self.label),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectionPolicy {
    /// List expired, revoked and disabled keys too.
    pub show_unusable: bool,
    pub sort: KeySort,
    /// Refuse unusable keys and confirm keys with weak validity.
    pub strict_trust_check: bool,
    pub entry_format: EntryFormat,
    pub long_ids: bool,
    /// Report a confirmed weak key as forced valid.
    pub legacy_override_semantics: bool,
    pub charset: DisplayCharset,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            show_unusable: false,
            sort: KeySort::default(),
            strict_trust_check: true,
            entry_format: EntryFormat::default(),
            long_ids: true,
            legacy_override_semantics: false,
            charset: DisplayCharset::default(),
        }
    }
}

/// Outcome of the dialog.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeySelection {
    pub key: Option<Key>,
    /// The user accepted a key despite a validity warning.
    pub forced_valid: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Listing,
    Selected,
    Cancelled,
}

/// Warning for a key whose id is not valid or not strong, `None` if it is
/// both.
pub fn validity_warning(key: &Key) -> Option<&'static str> {
    if !key.id_is_valid() {
        return Some(ID_UNUSABLE_WARNING);
    }
    if key.id_is_strong() {
        return None;
    }
    match key.validity {
        Validity::Never => Some(ID_NOT_VALID_WARNING),
        Validity::Marginal => Some(ID_MARGINAL_WARNING),
        Validity::Unknown | Validity::Undefined => Some(ID_UNDEFINED_WARNING),
        // Strong, returned above.
        Validity::Full | Validity::Ultimate => None,
    }
}

pub struct SelectionSession<'s> {
    store: &'s KeyStore,
    policy: &'s SelectionPolicy,
    table: KeyTable,
    title: String,
    state: SessionState,
    current: usize,
    forced_valid: bool,
    selected: Option<KeyIndex>,
}

impl<'s> SelectionSession<'s> {
    /// Build and sort the key table. Fails with
    /// [`KeySelectionErrorKind::AllKeysUnusable`] when every key was filtered
    /// out.
    pub fn new(
        store: &'s KeyStore,
        request: &KeyRequest,
        policy: &'s SelectionPolicy,
    ) -> Result<Self> {
        let mut table = KeyTable::build(store, policy.show_unusable)?;
        table.sort(store, policy.sort);
        Ok(Self {
            store,
            policy,
            table,
            title: request.title(),
            state: SessionState::Listing,
            current: 0,
            forced_valid: false,
            selected: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn table(&self) -> &KeyTable {
        &self.table
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn current(&self) -> usize {
        self.current
    }

    pub const fn forced_valid(&self) -> bool {
        self.forced_valid
    }

    /// Menu lines, one per table entry.
    pub fn lines(&self) -> Vec<String> {
        self.table
            .entries()
            .iter()
            .map(|e| {
                self.policy.entry_format.render(&EntryContext {
                    num: e.num,
                    key: &self.store[e.index],
                    long_ids: self.policy.long_ids,
                })
            })
            .collect()
    }

    /// Apply `action` to `row`.
    pub fn handle(
        &mut self,
        row: usize,
        action: MenuAction,
        service: &dyn KeyService,
        ui: &mut dyn SelectionUi,
        pager: &mut dyn Pager,
    ) -> Result<SessionState> {
        if self.state != SessionState::Listing {
            return Ok(self.state);
        }
        self.forced_valid = false;
        if action == MenuAction::Exit {
            log::debug!("Key selection cancelled");
            self.state = SessionState::Cancelled;
            return Ok(self.state);
        }
        let Some(entry) = self.table.get(row).copied() else {
            log::warn!("Menu returned row {} of {}", row, self.table.len());
            return Ok(self.state);
        };
        self.current = row;
        let store = self.store;
        let key = &store[entry.index];
        match action {
            MenuAction::Exit => {}
            MenuAction::Verify => self.verify(key, service, ui, pager)?,
            MenuAction::ViewId => ui.message(key.uid())?,
            MenuAction::Select => {
                if self.policy.strict_trust_check {
                    if !key.is_usable() {
                        log::info!("Refusing unusable key {}", key.fpr_or_lkeyid());
                        ui.error(KEY_UNUSABLE_MSG)?;
                        return Ok(self.state);
                    }
                    if let Some(warning) = validity_warning(key) {
                        if !ui.ask_yes_no(warning, false)? {
                            return Ok(self.state);
                        }
                        if self.policy.legacy_override_semantics {
                            self.forced_valid = true;
                        }
                    }
                }
                log::debug!("Selected key {}", key.fpr_or_lkeyid());
                self.selected = Some(entry.index);
                self.state = SessionState::Selected;
            }
        }
        Ok(self.state)
    }

    fn verify(
        &self,
        key: &Key,
        service: &dyn KeyService,
        ui: &mut dyn SelectionUi,
        pager: &mut dyn Pager,
    ) -> Result<()> {
        let mut file = match tempfile::Builder::new().prefix("keysel-").tempfile() {
            Ok(file) => file,
            Err(err) => {
                let err = Error::from(err)
                    .set_summary("Can't create temporary file")
                    .set_kind(KeySelectionErrorKind::TemporaryFile.into());
                log::error!("{}", err);
                return ui.error(&err.summary);
            }
        };
        let written = {
            let mut writer = BufWriter::new(file.as_file_mut());
            print_certificate_chain(
                &mut writer,
                key,
                service,
                KeyInfoPrompts::global(),
                self.policy.charset,
            )
            .and_then(|()| Ok(writer.flush()?))
        };
        if let Err(err) = written {
            let err = err
                .set_summary("Could not write key report")
                .set_kind(KeySelectionErrorKind::TemporaryFile.into());
            log::error!("{}", err);
            return ui.error(&err.summary);
        }
        // Close the report before the pager opens it; the path is removed on drop.
        let path = file.into_temp_path();
        let title = format!("Key ID: 0x{}", key.keyid(self.policy.long_ids));
        if let Err(err) = pager.display(&path, &title) {
            log::error!("Could not show key report: {}", err);
            return ui.error(&err.summary);
        }
        Ok(())
    }

    pub fn into_selection(self) -> KeySelection {
        KeySelection {
            key: self.selected.map(|i| self.store[i].clone()),
            forced_valid: self.forced_valid,
        }
    }
}

/// Run the key selection dialog over the keys of `store`.
///
/// Returns an owned copy of the chosen key, or no key if the user left the
/// dialog or every key was unusable. Errors come only from the
/// collaborators.
pub fn select_key(
    store: &KeyStore,
    request: &KeyRequest,
    policy: &SelectionPolicy,
    service: &dyn KeyService,
    ui: &mut dyn SelectionUi,
    pager: &mut dyn Pager,
) -> Result<KeySelection> {
    let mut session = match SelectionSession::new(store, request, policy) {
        Ok(session) => session,
        Err(err) if err.kind.is_all_keys_unusable() => {
            log::info!("{}", err.summary);
            ui.error(&err.summary)?;
            return Ok(KeySelection::default());
        }
        Err(err) => return Err(err),
    };
    if session.table().is_empty() {
        log::info!("No keys match {}", session.title());
        return Ok(KeySelection::default());
    }
    let lines = session.lines();
    while session.state() == SessionState::Listing {
        let (row, action) = ui.menu_loop(session.title(), &lines, session.current())?;
        session.handle(row, action, service, ui, pager)?;
    }
    Ok(session.into_selection())
}
