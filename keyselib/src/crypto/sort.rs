//
// keysel - crypto::sort
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

//! Key ordering for listings.

use std::{cmp::Ordering, str::FromStr};

use super::{Key, KeyFlags};
use crate::error::{Error, ErrorKind, Result};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// User id, then fingerprint.
    Address,
    /// Creation date, then user id.
    Date,
    /// Fingerprint, then user id.
    #[serde(alias = "key-id", alias = "key_id")]
    KeyId,
    /// Restrictions, validity, key length, creation date, user id and
    /// fingerprint.
    #[default]
    Trust,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "address" | "a" => Ok(Self::Address),
            "date" | "d" => Ok(Self::Date),
            "keyid" | "key-id" | "key_id" | "k" => Ok(Self::KeyId),
            "trust" | "t" => Ok(Self::Trust),
            other => Err(Error::new(format!(
                "Invalid key sort mode `{}`, expected one of address, date, keyid, trust",
                other
            ))
            .set_kind(ErrorKind::ValueError)),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "{}",
            match self {
                Self::Address => "address",
                Self::Date => "date",
                Self::KeyId => "keyid",
                Self::Trust => "trust",
            }
        )
    }
}

/// A sort mode and its direction.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeySort {
    pub mode: SortMode,
    pub reverse: bool,
}

impl KeySort {
    pub const fn new(mode: SortMode, reverse: bool) -> Self {
        Self { mode, reverse }
    }

    pub fn order(self, a: &Key, b: &Key) -> Ordering {
        let ord = key_order(self.mode, a, b);
        if self.reverse {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// ASCII case-insensitive string comparison.
pub fn istr_cmp(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(b.bytes().map(|b| b.to_ascii_lowercase()))
}

fn restriction_order(a: &Key, b: &Key) -> Ordering {
    let ra = (a.flags() & KeyFlags::RESTRICTIONS).bits();
    let rb = (b.flags() & KeyFlags::RESTRICTIONS).bits();
    ra.cmp(&rb)
}

/// Total order of `a` and `b` under `mode`, ascending.
pub fn key_order(mode: SortMode, a: &Key, b: &Key) -> Ordering {
    match mode {
        SortMode::Address => {
            istr_cmp(a.uid(), b.uid()).then_with(|| istr_cmp(a.fpr_or_lkeyid(), b.fpr_or_lkeyid()))
        }
        SortMode::Date => a
            .timestamp()
            .cmp(&b.timestamp())
            .then_with(|| istr_cmp(a.uid(), b.uid())),
        SortMode::KeyId => {
            istr_cmp(a.fpr_or_lkeyid(), b.fpr_or_lkeyid()).then_with(|| istr_cmp(a.uid(), b.uid()))
        }
        SortMode::Trust => restriction_order(a, b)
            .then_with(|| b.validity.cmp(&a.validity))
            .then_with(|| b.length().cmp(&a.length()))
            .then_with(|| b.timestamp().cmp(&a.timestamp()))
            .then_with(|| istr_cmp(a.uid(), b.uid()))
            .then_with(|| istr_cmp(a.fpr_or_lkeyid(), b.fpr_or_lkeyid())),
    }
}

/// Whether `a` sorts after `b`. With `reverse` the answer is negated.
pub fn compare(mode: SortMode, reverse: bool, a: &Key, b: &Key) -> bool {
    let after = key_order(mode, a, b) == Ordering::Greater;
    if reverse {
        !after
    } else {
        after
    }
}
