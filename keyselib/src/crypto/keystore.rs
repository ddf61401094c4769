//
// keysel - crypto::keystore
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

//! An arena of owned [`Key`] records and the key service interface.

use std::path::Path;

use super::{Key, Protocol};
use crate::error::{Error, ErrorKind, KeySelectionErrorKind, Result, ResultIntoError};

bitflags! {
    /// Which protocols a key request is for.
    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
    pub struct KeyApplication: u8 {
        const PGP   = 1;
        const SMIME = 1 << 1;
    }
}

impl KeyApplication {
    pub fn accepts(self, protocol: Protocol) -> bool {
        match protocol {
            // No protocol requested means any protocol.
            _ if self.is_empty() => true,
            Protocol::OpenPgp => self.contains(Self::PGP),
            Protocol::X509 => self.contains(Self::SMIME),
        }
    }
}

impl std::str::FromStr for KeyApplication {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("pgp") || s.eq_ignore_ascii_case("openpgp") => {
                Ok(Self::PGP)
            }
            s if s.eq_ignore_ascii_case("smime") || s.eq_ignore_ascii_case("x509") => {
                Ok(Self::SMIME)
            }
            s if s.eq_ignore_ascii_case("both") => Ok(Self::PGP | Self::SMIME),
            other => Err(Error::new(format!(
                "Invalid protocol `{}`, expected one of pgp, smime, both",
                other
            ))
            .set_kind(ErrorKind::ValueError)),
        }
    }
}

/// Index of a key inside a [`KeyStore`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyIndex(usize);

impl KeyIndex {
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Source of keys: lists keys matching a pattern and resolves certificate
/// issuers.
pub trait KeyService {
    /// Keys matching `pattern` for the protocols in `app`.
    fn list_keys(&self, pattern: &str, app: KeyApplication) -> Result<KeyStore>;

    /// The key whose fingerprint is `chain_id`.
    fn resolve_issuer(&self, chain_id: &str, protocol: Protocol) -> Result<Key>;
}

/// Owns all key records; everything else refers to them by [`KeyIndex`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyStore {
    keys: Vec<Key>,
}

impl KeyStore {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    /// Parse a JSON keyring: an array of key objects.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .chain_err_summary(|| format!("Could not read keyring {}", path.display()))?;
        let store = Self::from_json(&contents)
            .chain_err_summary(|| format!("Could not parse keyring {}", path.display()))?;
        log::debug!("Loaded {} keys from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn push(&mut self, key: Key) -> KeyIndex {
        self.keys.push(key);
        KeyIndex(self.keys.len() - 1)
    }

    pub fn get(&self, index: KeyIndex) -> Option<&Key> {
        self.keys.get(index.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyIndex, &Key)> + '_ {
        self.keys.iter().enumerate().map(|(i, k)| (KeyIndex(i), k))
    }

    /// Look up a key by fingerprint or key id, with or without a `0x`
    /// prefix. Key ids match as a suffix of the fingerprint.
    pub fn find(&self, id: &str) -> Option<KeyIndex> {
        let id = strip_hex_prefix(id.trim());
        if id.is_empty() {
            return None;
        }
        self.iter()
            .find(|(_, k)| key_matches_id(k, id))
            .map(|(i, _)| i)
    }
}

impl std::ops::Index<KeyIndex> for KeyStore {
    type Output = Key;

    fn index(&self, index: KeyIndex) -> &Key {
        &self.keys[index.0]
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn ends_with_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.is_char_boundary(haystack.len() - needle.len())
        && haystack[haystack.len() - needle.len()..].eq_ignore_ascii_case(needle)
}

fn key_matches_id(key: &Key, id: &str) -> bool {
    key.subkeys.iter().any(|s| {
        ends_with_ignore_case(&s.keyid, id)
            || s.fpr
                .as_deref()
                .map(|fpr| ends_with_ignore_case(fpr, id))
                .unwrap_or(false)
    })
}

fn key_matches_pattern(key: &Key, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return true;
    }
    let lower = pattern.to_lowercase();
    key.uids
        .iter()
        .any(|u| u.uid.to_lowercase().contains(&lower))
        || key_matches_id(key, strip_hex_prefix(pattern))
}

impl KeyService for KeyStore {
    fn list_keys(&self, pattern: &str, app: KeyApplication) -> Result<KeyStore> {
        let terms = pattern.split_whitespace().collect::<Vec<&str>>();
        let keys = self
            .keys
            .iter()
            .filter(|k| app.accepts(k.protocol))
            .filter(|k| terms.is_empty() || terms.iter().any(|t| key_matches_pattern(k, t)))
            .cloned()
            .collect::<Vec<Key>>();
        log::trace!(
            "list_keys({:?}, {:?}): {} of {} keys match",
            pattern,
            app,
            keys.len(),
            self.len()
        );
        Ok(Self::new(keys))
    }

    fn resolve_issuer(&self, chain_id: &str, protocol: Protocol) -> Result<Key> {
        self.keys
            .iter()
            .find(|k| {
                k.protocol == protocol
                    && k.fingerprint()
                        .map(|fpr| fpr.eq_ignore_ascii_case(chain_id))
                        .unwrap_or(false)
            })
            .cloned()
            .ok_or_else(|| {
                Error::new("No public key")
                    .set_details(format!("no {} key with fingerprint {}", protocol, chain_id))
                    .set_kind(KeySelectionErrorKind::IssuerLookup.into())
            })
    }
}
