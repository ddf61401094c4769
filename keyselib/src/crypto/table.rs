//
// keysel - crypto::table
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

//! The filtered and sorted table of keys shown to the user.

use super::{KeyIndex, KeySort, KeyStore};
use crate::error::{Error, KeySelectionErrorKind, Result};

/// One row of a [`KeyTable`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyTableEntry {
    /// 1-based display number.
    pub num: usize,
    pub index: KeyIndex,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyTable {
    entries: Vec<KeyTableEntry>,
    /// Whether keys were left out because they are expired, revoked or
    /// disabled.
    pub unusable_excluded: bool,
}

impl KeyTable {
    /// Collect the keys of `store`, leaving out unusable keys unless
    /// `show_unusable` is set.
    ///
    /// Fails with [`KeySelectionErrorKind::AllKeysUnusable`] if keys were
    /// left out and none remain.
    pub fn build(store: &KeyStore, show_unusable: bool) -> Result<Self> {
        let mut entries = Vec::new();
        let mut unusable_excluded = false;
        for (index, key) in store.iter() {
            if !show_unusable && !key.is_usable() {
                unusable_excluded = true;
                continue;
            }
            entries.push(KeyTableEntry {
                num: entries.len() + 1,
                index,
            });
        }
        if entries.is_empty() && unusable_excluded {
            return Err(Error::new("All matching keys are marked expired/revoked")
                .set_kind(KeySelectionErrorKind::AllKeysUnusable.into()));
        }
        Ok(Self {
            entries,
            unusable_excluded,
        })
    }

    /// Sort by `sort` and renumber the entries.
    pub fn sort(&mut self, store: &KeyStore, sort: KeySort) {
        self.entries
            .sort_by(|a, b| sort.order(&store[a.index], &store[b.index]));
        for (i, e) in self.entries.iter_mut().enumerate() {
            e.num = i + 1;
        }
    }

    pub fn entries(&self) -> &[KeyTableEntry] {
        &self.entries
    }

    pub fn get(&self, i: usize) -> Option<&KeyTableEntry> {
        self.entries.get(i)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
