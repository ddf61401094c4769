//
// keysel - crypto::info
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

//! Verbose key reports and certificate chain walks.

use std::{borrow::Cow, io::Write, sync::OnceLock};

use super::{dn::format_user_id, Key, KeyFlags, KeyService, SubKey};
use crate::{
    error::Result,
    text::{DisplayCharset, TextProcessing},
    utils::datetime::{formats, timestamp_to_string, UnixTimestamp},
};

/// Number of issuers resolved before a chain walk gives up.
pub const MAX_CHAIN_DEPTH: usize = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyInfoLabel {
    Name,
    Aka,
    ValidFrom,
    ValidTo,
    KeyType,
    KeyUsage,
    Fingerprint,
    SerialNo,
    IssuedBy,
    Subkey,
}

impl KeyInfoLabel {
    pub const ALL: [Self; 10] = [
        Self::Name,
        Self::Aka,
        Self::ValidFrom,
        Self::ValidTo,
        Self::KeyType,
        Self::KeyUsage,
        Self::Fingerprint,
        Self::SerialNo,
        Self::IssuedBy,
        Self::Subkey,
    ];

    pub const fn text(self) -> &'static str {
        match self {
            Self::Name => "Name: ",
            Self::Aka => "aka: ",
            Self::ValidFrom => "Valid From: ",
            Self::ValidTo => "Valid To: ",
            Self::KeyType => "Key Type: ",
            Self::KeyUsage => "Key Usage: ",
            Self::Fingerprint => "Fingerprint: ",
            Self::SerialNo => "Serial-No: ",
            Self::IssuedBy => "Issued By: ",
            Self::Subkey => "Subkey: ",
        }
    }
}

/// Report labels, right-aligned to the display width of the widest one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyInfoPrompts {
    width: usize,
}

impl Default for KeyInfoPrompts {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInfoPrompts {
    pub fn new() -> Self {
        Self {
            width: KeyInfoLabel::ALL
                .iter()
                .map(|l| l.text().grapheme_width())
                .max()
                .unwrap_or(0),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static PROMPTS: OnceLock<KeyInfoPrompts> = OnceLock::new();
        PROMPTS.get_or_init(Self::new)
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub fn label(&self, label: KeyInfoLabel) -> String {
        let text = label.text();
        let pad = self.width.saturating_sub(text.grapheme_width());
        format!("{}{}", " ".repeat(pad), text)
    }
}

/// Group a fingerprint for display.
///
/// 40 digit OpenPGP fingerprints are shown in groups of four digits with a
/// wider gap in the middle; anything else in pairs separated by a space
/// (OpenPGP) or a colon (X.509).
pub fn format_fingerprint(fpr: &str, is_pgp: bool) -> String {
    if !fpr.is_ascii() {
        return fpr.to_string();
    }
    let mut ret = String::with_capacity(fpr.len() * 2);
    let mut s = fpr;
    if is_pgp && fpr.len() == 40 {
        let mut i = 0;
        while s.len() >= 5 {
            ret.push_str(&s[..4]);
            ret.push(' ');
            if i == 4 {
                ret.push(' ');
            }
            s = &s[4..];
            i += 1;
        }
    } else {
        let mut i = 0;
        while s.len() >= 3 {
            ret.push_str(&s[..2]);
            ret.push(if is_pgp { ' ' } else { ':' });
            if is_pgp && i == 7 {
                ret.push(' ');
            }
            s = &s[2..];
            i += 1;
        }
    }
    ret.push_str(s);
    ret
}

fn usage(flags: impl Fn(KeyFlags) -> bool) -> String {
    [
        (KeyFlags::CAN_ENCRYPT, "encryption"),
        (KeyFlags::CAN_SIGN, "signing"),
        (KeyFlags::CAN_CERTIFY, "certification"),
    ]
    .into_iter()
    .filter(|(f, _)| flags(*f))
    .map(|(_, s)| s)
    .collect::<Vec<&str>>()
    .join(", ")
}

struct Report<'w, W: Write> {
    writer: &'w mut W,
    prompts: &'w KeyInfoPrompts,
    charset: DisplayCharset,
}

impl<W: Write> Report<'_, W> {
    fn put(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(&self.charset.encode(text))?;
        Ok(())
    }

    fn line(&mut self, label: KeyInfoLabel, value: &str) -> Result<()> {
        let label = self.prompts.label(label);
        self.put(&label)?;
        self.put(value)?;
        self.put("\n")
    }

    fn dates(&mut self, timestamp: UnixTimestamp, expires: UnixTimestamp) -> Result<()> {
        if timestamp > 0 {
            let date = timestamp_to_string(timestamp, Some(formats::LOCALE_DATETIME), false);
            self.line(KeyInfoLabel::ValidFrom, &date)?;
        }
        if expires > 0 {
            let date = timestamp_to_string(expires, Some(formats::LOCALE_DATETIME), false);
            self.line(KeyInfoLabel::ValidTo, &date)?;
        }
        Ok(())
    }

    fn subkey(&mut self, subkey: &SubKey) -> Result<()> {
        let mut header = format!("0x{}", subkey.short_keyid());
        for (flag, note) in [
            (KeyFlags::REVOKED, " [Revoked]"),
            (KeyFlags::INVALID, " [Invalid]"),
            (KeyFlags::EXPIRED, " [Expired]"),
            (KeyFlags::DISABLED, " [Disabled]"),
        ] {
            if subkey.flags.contains(flag) {
                header.push_str(note);
            }
        }
        self.put("\n")?;
        self.line(KeyInfoLabel::Subkey, &header)?;
        self.dates(subkey.timestamp, subkey.expires)?;
        self.line(
            KeyInfoLabel::KeyType,
            &format!("PGP, {} bit {}", subkey.length, subkey.algorithm),
        )?;
        self.line(
            KeyInfoLabel::KeyUsage,
            &usage(|f| subkey.flags.contains(f)),
        )
    }

    fn key(&mut self, key: &Key) -> Result<()> {
        let is_pgp = !key.is_x509();

        for (i, uid) in key.uids.iter().filter(|u| !u.revoked).enumerate() {
            let label = self.prompts.label(if i == 0 {
                KeyInfoLabel::Name
            } else {
                KeyInfoLabel::Aka
            });
            self.put(&label)?;
            if uid.invalid {
                self.put("[Invalid] ")?;
            }
            let text = if is_pgp {
                Cow::Borrowed(uid.uid.as_str())
            } else {
                format_user_id(&uid.uid)
            };
            self.put(&text)?;
            self.put("\n")?;
        }

        if let Some(principal) = key.principal() {
            self.dates(principal.timestamp, principal.expires)?;
        }

        self.line(
            KeyInfoLabel::KeyType,
            &format!(
                "{}, {} bit {}",
                if is_pgp { "PGP" } else { "X.509" },
                key.length(),
                key.algorithm()
            ),
        )?;
        self.line(KeyInfoLabel::KeyUsage, &usage(|f| key.has_capability(f)))?;

        if let Some(fpr) = key.fingerprint() {
            self.line(KeyInfoLabel::Fingerprint, &format_fingerprint(fpr, is_pgp))?;
        }
        if let Some(serial) = key.issuer_serial.as_deref() {
            self.line(KeyInfoLabel::SerialNo, &format!("0x{}", serial))?;
        }
        if let Some(issuer) = key.issuer_name.as_deref() {
            self.line(KeyInfoLabel::IssuedBy, &format_user_id(issuer))?;
        }

        if is_pgp {
            for subkey in &key.subkeys {
                self.subkey(subkey)?;
            }
        }
        Ok(())
    }
}

/// Write the report of a single key.
pub fn print_key_info<W: Write>(
    writer: &mut W,
    key: &Key,
    prompts: &KeyInfoPrompts,
    charset: DisplayCharset,
) -> Result<()> {
    Report {
        writer,
        prompts,
        charset,
    }
    .key(key)
}

/// Write the report of `key` followed by the reports of its issuers, as far
/// as `service` can resolve them.
///
/// The walk ends at a self-signed certificate, a key without issuer, a
/// failed lookup or after [`MAX_CHAIN_DEPTH`] issuers. Lookup failures are
/// written into the report; only write errors are returned.
pub fn print_certificate_chain<W: Write>(
    writer: &mut W,
    key: &Key,
    service: &dyn KeyService,
    prompts: &KeyInfoPrompts,
    charset: DisplayCharset,
) -> Result<()> {
    let mut report = Report {
        writer,
        prompts,
        charset,
    };
    report.key(key)?;

    let mut current: Cow<'_, Key> = Cow::Borrowed(key);
    let mut depth = 0;
    loop {
        let Some(chain_id) = current.chain_id.as_deref() else {
            break;
        };
        let Some(principal) = current.principal() else {
            break;
        };
        if principal
            .fpr
            .as_deref()
            .map(|fpr| fpr.eq_ignore_ascii_case(chain_id))
            .unwrap_or(false)
        {
            break;
        }
        report.put("\n")?;
        log::trace!("Looking up issuer {}", chain_id);
        let issuer = match service.resolve_issuer(chain_id, current.protocol) {
            Ok(issuer) => issuer,
            Err(err) => {
                log::debug!("Could not resolve issuer {}: {}", chain_id, err);
                report.put(&format!("Error finding issuer key: {}\n", err.summary))?;
                break;
            }
        };
        report.key(&issuer)?;
        depth += 1;
        if depth == MAX_CHAIN_DEPTH {
            report.put("\nError: certification chain too long - stopping here\n")?;
            break;
        }
        current = Cow::Owned(issuer);
    }
    report.writer.flush()?;
    Ok(())
}
