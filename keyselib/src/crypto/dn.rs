//
// keysel - crypto::dn
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

//! Distinguished Names, as found in X.509 subject and issuer fields.
//!
//! The parser accepts the string representation of RFC 2253 without
//! validating attribute types:
//!
//! ```rust
//! # use keyselib::crypto::DistinguishedName;
//! let dn: DistinguishedName = "CN=Alice,O=Example\\, Inc.,C=DE".parse().unwrap();
//! assert_eq!(dn.to_string(), "Alice, Example, Inc., DE");
//! ```

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::error::{Error, KeySelectionErrorKind, Result};

/// Attributes displayed first, in this order.
pub const STANDARD_ATTRIBUTES: [&str; 7] = ["CN", "OU", "O", "STREET", "L", "ST", "C"];

pub const UNKNOWN_ENCODING_PLACEHOLDER: &str = "[Can't display this user ID (unknown encoding)]";
pub const INVALID_ENCODING_PLACEHOLDER: &str = "[Can't display this user ID (invalid encoding)]";
pub const INVALID_DN_PLACEHOLDER: &str = "[Can't display this user ID (invalid DN)]";

/// Ordered attribute/value pairs of a Distinguished Name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DistinguishedName(SmallVec<[(String, String); 7]>);

#[inline]
const fn is_delimiter(b: u8) -> bool {
    matches!(b, b',' | b'=' | b'+' | b'<' | b'>' | b'#' | b';')
}

#[inline]
const fn is_escapable(b: u8) -> bool {
    is_delimiter(b) || matches!(b, b'\\' | b'"' | b' ')
}

#[inline]
const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn hex_pair(bytes: &[u8], pos: usize) -> Option<u8> {
    let hi = hex_value(*bytes.get(pos)?)?;
    let lo = hex_value(*bytes.get(pos + 1)?)?;
    Some(hi << 4 | lo)
}

fn invalid(input: &[u8], reason: &'static str) -> Error {
    Error::new("Invalid distinguished name")
        .set_details(format!("{:?}: {}", String::from_utf8_lossy(input), reason))
        .set_kind(KeySelectionErrorKind::InvalidDistinguishedName.into())
}

/// Parse one `key=value` component starting at `pos`. Returns the component
/// and the position right after the value.
fn parse_component(input: &[u8], pos: usize) -> Result<(String, String, usize)> {
    let eq = input[pos..]
        .iter()
        .position(|&b| b == b'=')
        .ok_or_else(|| invalid(input, "attribute without `=`"))?;
    if eq == 0 {
        return Err(invalid(input, "empty attribute type"));
    }
    let key = String::from_utf8_lossy(&input[pos..pos + eq]).into_owned();
    let mut i = pos + eq + 1;
    let mut value: Vec<u8> = Vec::new();

    if input.get(i) == Some(&b'#') {
        i += 1;
        let n = input[i..]
            .iter()
            .take_while(|b| hex_value(**b).is_some())
            .count();
        if n == 0 || n % 2 != 0 {
            return Err(invalid(input, "odd or empty hex string"));
        }
        value.extend((i..i + n).step_by(2).filter_map(|j| hex_pair(input, j)));
        i += n;
    } else {
        while let Some(&b) = input.get(i) {
            match b {
                b'\\' => match input.get(i + 1) {
                    Some(&c) if is_escapable(c) => {
                        value.push(c);
                        i += 2;
                    }
                    _ => {
                        let byte =
                            hex_pair(input, i + 1).ok_or_else(|| invalid(input, "bad escape"))?;
                        value.push(byte);
                        i += 3;
                    }
                },
                b'"' => return Err(invalid(input, "unescaped quote")),
                b if is_delimiter(b) => break,
                b => {
                    value.push(b);
                    i += 1;
                }
            }
        }
    }

    Ok((key, String::from_utf8_lossy(&value).into_owned(), i))
}

impl DistinguishedName {
    /// Decode a DN string. On failure nothing of the input is returned.
    pub fn parse(input: &str) -> Result<Self> {
        let bytes = input.as_bytes();
        let mut ret = SmallVec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            while bytes.get(pos) == Some(&b' ') {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }
            let (key, value, next) = parse_component(bytes, pos)?;
            ret.push((key, value));
            pos = next;
            while bytes.get(pos) == Some(&b' ') {
                pos += 1;
            }
            match bytes.get(pos) {
                None => break,
                Some(b',' | b';' | b'+') => pos += 1,
                Some(_) => return Err(invalid(bytes, "garbage after value")),
            }
        }
        Ok(Self(ret))
    }

    pub fn components(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All values of attribute `key`, in order of appearance.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn write_values(&self, key: &str, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, v) in self.values(key).enumerate() {
            if i > 0 {
                write!(fmt, " + ")?;
            }
            write!(fmt, "{}", v)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DistinguishedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut any = false;
        for key in STANDARD_ATTRIBUTES {
            if self.values(key).next().is_none() {
                continue;
            }
            if any {
                write!(fmt, ", ")?;
            }
            self.write_values(key, fmt)?;
            any = true;
        }

        let mut seen: SmallVec<[&str; 4]> = SmallVec::new();
        for (key, _) in self.0.iter() {
            let key = key.as_str();
            if STANDARD_ATTRIBUTES.contains(&key) || seen.contains(&key) {
                continue;
            }
            if seen.is_empty() {
                write!(fmt, "{}(", if any { " " } else { "" })?;
            } else {
                write!(fmt, ", ")?;
            }
            seen.push(key);
            write!(fmt, "{}=", key)?;
            self.write_values(key, fmt)?;
        }
        if !seen.is_empty() {
            write!(fmt, ")")?;
        }
        Ok(())
    }
}

/// Display form of an X.509 user id: an e-mail address in angle brackets or
/// a Distinguished Name. Ids that cannot be shown yield a placeholder.
pub fn format_user_id(uid: &str) -> Cow<'_, str> {
    if let Some(rest) = uid.strip_prefix('<') {
        return Cow::Borrowed(rest.find('>').map(|end| &rest[..end]).unwrap_or_default());
    }
    if uid.starts_with('(') {
        return Cow::Borrowed(UNKNOWN_ENCODING_PLACEHOLDER);
    }
    if !uid
        .chars()
        .next()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false)
    {
        return Cow::Borrowed(INVALID_ENCODING_PLACEHOLDER);
    }
    match DistinguishedName::parse(uid) {
        Ok(dn) => Cow::Owned(dn.to_string()),
        Err(err) => {
            debug!("Could not parse user id {:?}: {}", uid, err);
            Cow::Borrowed(INVALID_DN_PLACEHOLDER)
        }
    }
}
