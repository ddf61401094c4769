//
// keysel - crypto module
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

//! OpenPGP key and X.509 certificate selection.
//!
//! - [`Key`] records are owned by a [`KeyStore`] and referred to by
//!   [`KeyIndex`].
//! - [`KeyTable`] filters and sorts them (see [`SortMode`]).
//! - [`EntryFormat`] renders one listing line per key.
//! - [`print_key_info`] and [`print_certificate_chain`] write verbose
//!   reports, decoding X.509 names with [`DistinguishedName`].
//! - [`select_key`] drives the interactive dialog.

pub mod dn;
pub mod format;
pub mod info;
pub mod key;
pub mod keystore;
pub mod selection;
pub mod sort;
pub mod table;

pub use dn::{format_user_id, DistinguishedName};
pub use format::{EntryContext, EntryFormat, DEFAULT_ENTRY_FORMAT};
pub use info::{format_fingerprint, print_certificate_chain, print_key_info, KeyInfoPrompts};
pub use key::{Key, KeyFlags, Protocol, SubKey, UserId, Validity};
pub use keystore::{KeyApplication, KeyIndex, KeyService, KeyStore};
pub use selection::{
    select_key, KeyRequest, KeySelection, MenuAction, Pager, SelectionPolicy, SelectionSession,
    SelectionUi, SessionState,
};
pub use sort::{compare, key_order, KeySort, SortMode};
pub use table::{KeyTable, KeyTableEntry};

#[cfg(test)]
mod tests;
