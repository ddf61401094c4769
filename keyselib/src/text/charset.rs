//
// keysel - text::charset
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

//! Conversion of UTF-8 text into the charset of the user's terminal.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{Error, ErrorKind, Result};

/// The charset key reports and menu lines are written in.
///
/// Characters that cannot be represented are replaced with numeric character
/// references, as `encoding_rs` does for all legacy encoders.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DisplayCharset {
    encoding: &'static Encoding,
}

impl Default for DisplayCharset {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl DisplayCharset {
    pub const fn utf8() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == encoding_rs::UTF_8
    }

    /// Convert `text` from UTF-8 into this charset.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        if self.is_utf8() {
            return Cow::Borrowed(text.as_bytes());
        }
        let (bytes, _, _) = self.encoding.encode(text);
        bytes
    }
}

impl std::str::FromStr for DisplayCharset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            Error::new(format!("Unknown charset `{}`", label)).set_kind(ErrorKind::ValueError)
        })?;
        // UTF-16 labels decode only; the encoder falls back to UTF-8.
        Ok(Self {
            encoding: encoding.output_encoding(),
        })
    }
}

impl std::fmt::Display for DisplayCharset {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

impl<'de> serde::Deserialize<'de> for DisplayCharset {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String>::deserialize(deserializer)?;
        s.parse::<Self>().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for DisplayCharset {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}
