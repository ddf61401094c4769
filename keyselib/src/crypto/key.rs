//
// keysel - crypto::key
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

//! Owned key records: keys, user ids and subkeys, with their status and
//! capability flags.

use crate::utils::datetime::UnixTimestamp;

bitflags! {
    /// Status and capability flags of a key or subkey.
    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
    pub struct KeyFlags: u16 {
        const CAN_SIGN          = 1;
        const CAN_ENCRYPT       = 1 << 1;
        const CAN_CERTIFY       = 1 << 2;
        const IS_X509           = 1 << 3;
        const SECRET            = 1 << 4;
        const EXPIRED           = 1 << 5;
        const REVOKED           = 1 << 6;
        const DISABLED          = 1 << 7;
        const SUBKEY            = 1 << 8;
        const CRITICAL          = 1 << 9;
        const PREFER_ENCRYPTION = 1 << 10;
        const PREFER_SIGNING    = 1 << 11;
        const INVALID           = 1 << 12;

        /// The key cannot be used at all.
        const CANTUSE = Self::REVOKED.bits() | Self::EXPIRED.bits() | Self::DISABLED.bits();
        const RESTRICTIONS = Self::CANTUSE.bits() | Self::CRITICAL.bits();
        const ABILITIES = Self::CAN_ENCRYPT.bits()
            | Self::CAN_SIGN.bits()
            | Self::PREFER_ENCRYPTION.bits()
            | Self::PREFER_SIGNING.bits();
    }
}

/// Cryptographic protocol of a key.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Protocol {
    #[default]
    #[serde(rename = "openpgp", alias = "OpenPGP", alias = "pgp")]
    OpenPgp,
    #[serde(rename = "x509", alias = "X.509", alias = "cms", alias = "smime")]
    X509,
}

impl Protocol {
    /// Name as used by GnuPG.
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenPgp => "OpenPGP",
            Self::X509 => "CMS",
        }
    }

    pub const fn is_x509(self) -> bool {
        matches!(self, Self::X509)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

/// Trust in the binding between a key and its user id.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Validity {
    #[default]
    Unknown = 0,
    Undefined = 1,
    Never = 2,
    Marginal = 3,
    Full = 4,
    Ultimate = 5,
}

impl Validity {
    /// Single character shown in key listings.
    pub const fn as_char(self) -> char {
        match self {
            Self::Full => 'f',
            Self::Marginal => 'm',
            Self::Never => 'n',
            Self::Ultimate => 'u',
            Self::Undefined => 'q',
            Self::Unknown => '?',
        }
    }

    pub const fn is_strong(self) -> bool {
        matches!(self, Self::Full | Self::Ultimate)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserId {
    pub uid: String,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub invalid: bool,
}

impl UserId {
    pub fn new<S: Into<String>>(uid: S) -> Self {
        Self {
            uid: uid.into(),
            revoked: false,
            invalid: false,
        }
    }
}

impl From<&str> for UserId {
    fn from(uid: &str) -> Self {
        Self::new(uid)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubKey {
    /// Hexadecimal key id, usually 16 digits long.
    pub keyid: String,
    #[serde(default, alias = "fingerprint")]
    pub fpr: Option<String>,
    #[serde(default)]
    pub flags: KeyFlags,
    #[serde(default)]
    pub timestamp: UnixTimestamp,
    #[serde(default)]
    pub expires: UnixTimestamp,
    #[serde(default)]
    pub length: u32,
    #[serde(default = "unknown_algorithm")]
    pub algorithm: String,
}

fn unknown_algorithm() -> String {
    "?".to_string()
}

impl SubKey {
    /// The key id, shortened to its last 8 digits when it is 16 digits long.
    pub fn short_keyid(&self) -> &str {
        if self.keyid.len() == 16 {
            self.keyid.get(8..).unwrap_or(&self.keyid)
        } else {
            &self.keyid
        }
    }
}

/// A key or certificate.
///
/// The first entry of `subkeys` is the principal key; its fingerprint is the
/// key's fingerprint.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Key {
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub flags: KeyFlags,
    #[serde(default)]
    pub validity: Validity,
    #[serde(default)]
    pub uids: Vec<UserId>,
    #[serde(default)]
    pub subkeys: Vec<SubKey>,
    #[serde(default)]
    pub issuer_serial: Option<String>,
    #[serde(default)]
    pub issuer_name: Option<String>,
    /// Fingerprint of the issuing certificate.
    #[serde(default)]
    pub chain_id: Option<String>,
}

impl Key {
    /// Flags of the key, with [`KeyFlags::IS_X509`] set for X.509
    /// certificates.
    pub fn flags(&self) -> KeyFlags {
        let mut flags = self.flags;
        flags.set(KeyFlags::IS_X509, self.protocol.is_x509());
        flags
    }

    pub fn is_x509(&self) -> bool {
        self.protocol.is_x509()
    }

    pub fn principal(&self) -> Option<&SubKey> {
        self.subkeys.first()
    }

    /// The user id shown in listings: the first non-revoked one, or the first
    /// one if all are revoked.
    pub fn uid(&self) -> &str {
        self.uids
            .iter()
            .find(|u| !u.revoked)
            .or_else(|| self.uids.first())
            .map(|u| u.uid.as_str())
            .unwrap_or_default()
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.principal().and_then(|s| s.fpr.as_deref())
    }

    /// Key id of the principal key, shortened unless `long_ids` is set.
    /// Returns `????????` for keys without subkeys.
    pub fn keyid(&self, long_ids: bool) -> &str {
        match self.principal() {
            None => "????????",
            Some(s) if long_ids => &s.keyid,
            Some(s) => s.short_keyid(),
        }
    }

    /// The fingerprint if known, otherwise the long key id.
    pub fn fpr_or_lkeyid(&self) -> &str {
        match self.principal() {
            None => "",
            Some(s) => s.fpr.as_deref().unwrap_or(&s.keyid),
        }
    }

    pub fn timestamp(&self) -> UnixTimestamp {
        self.principal().map(|s| s.timestamp).unwrap_or(0)
    }

    pub fn length(&self) -> u32 {
        self.principal().map(|s| s.length).unwrap_or(0)
    }

    pub fn algorithm(&self) -> &str {
        self.principal().map(|s| s.algorithm.as_str()).unwrap_or("?")
    }

    /// Whether the key or any of its subkeys has capability `cap`.
    pub fn has_capability(&self, cap: KeyFlags) -> bool {
        self.flags.intersects(cap) || self.subkeys.iter().any(|s| s.flags.intersects(cap))
    }

    /// A key is usable unless it is revoked, expired or disabled.
    pub fn is_usable(&self) -> bool {
        !self.flags.intersects(KeyFlags::CANTUSE)
    }

    /// Whether the user id is valid; X.509 ids always are.
    pub fn id_is_valid(&self) -> bool {
        self.is_x509() || self.is_usable()
    }

    /// Whether the user id is trusted enough to be used without asking.
    pub fn id_is_strong(&self) -> bool {
        self.is_x509() || self.validity.is_strong()
    }
}
