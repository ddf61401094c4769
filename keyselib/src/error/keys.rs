//
// keysel - error module
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

//! Error kinds for key selection and certificate inspection.

use super::ErrorKind;

/// Failures of the key selection dialog. None of them is fatal: the dialog
/// recovers from each one and reports it to the user.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeySelectionErrorKind {
    /// Unspecified
    #[default]
    None,
    /// A Distinguished Name could not be parsed. The caller displays a
    /// placeholder instead.
    InvalidDistinguishedName,
    /// The issuer of a certificate could not be resolved; the chain walk
    /// stops there.
    IssuerLookup,
    /// Every candidate key was filtered out because it is expired, revoked
    /// or disabled.
    AllKeysUnusable,
    /// The temporary report file could not be created or written.
    TemporaryFile,
}

impl KeySelectionErrorKind {
    pub const fn as_str(&self) -> &'static str {
        use KeySelectionErrorKind::*;
        match self {
            None => "Unspecified key selection error",
            InvalidDistinguishedName => "Invalid distinguished name",
            IssuerLookup => "Issuer key lookup failed",
            AllKeysUnusable => "All matching keys are unusable",
            TemporaryFile => "Temporary file error",
        }
    }
}

impl From<KeySelectionErrorKind> for ErrorKind {
    fn from(kind: KeySelectionErrorKind) -> Self {
        Self::KeySelection(kind)
    }
}
