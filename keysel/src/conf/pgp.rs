/*
 * keysel - configuration module.
 *
 * Copyright 2019 Manos Pitsidianakis
 *
 * This file is part of keysel.
 *
 * keysel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * keysel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with keysel. If not, see <http://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;

use keyselib::{
    crypto::{EntryFormat, KeySort, SelectionPolicy, SortMode},
    text::DisplayCharset,
};

use super::default_vals::*;

/// Settings for key selection
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PGPSettings {
    /// list expired, revoked and disabled keys
    /// Default: false
    #[serde(
        default = "false_val",
        alias = "show-unusable",
        alias = "pgp_show_unusable"
    )]
    pub show_unusable: bool,

    /// one of address, date, keyid, trust
    /// Default: trust
    #[serde(default, alias = "sort-keys")]
    pub sort_keys: SortMode,

    /// Default: false
    #[serde(default = "false_val", alias = "sort-keys-reverse")]
    pub sort_keys_reverse: bool,

    /// refuse unusable keys and ask before using keys with weak validity
    /// Default: true
    #[serde(default = "true_val", alias = "check-trust")]
    pub check_trust: bool,

    /// format of key listing lines
    /// Default: "%4n %t%f %4l/0x%k %-4a %2c %u"
    #[serde(default = "default_entry_format", alias = "entry-format")]
    pub entry_format: String,

    /// show 16 digit key ids
    /// Default: true
    #[serde(default = "true_val", alias = "long-ids")]
    pub long_ids: bool,

    /// report keys whose validity warning was overridden as forced valid
    /// Default: false
    #[serde(default = "false_val", alias = "legacy-override-semantics")]
    pub legacy_override_semantics: bool,

    /// JSON keyring
    /// Default: `$XDG_DATA_HOME/keysel/keyring.json`
    #[serde(default = "none")]
    pub keyring: Option<PathBuf>,
}

impl Default for PGPSettings {
    fn default() -> Self {
        Self {
            show_unusable: false,
            sort_keys: SortMode::default(),
            sort_keys_reverse: false,
            check_trust: true,
            entry_format: default_entry_format(),
            long_ids: true,
            legacy_override_semantics: false,
            keyring: None,
        }
    }
}

impl PGPSettings {
    pub fn policy(&self, charset: DisplayCharset) -> SelectionPolicy {
        SelectionPolicy {
            show_unusable: self.show_unusable,
            sort: KeySort::new(self.sort_keys, self.sort_keys_reverse),
            strict_trust_check: self.check_trust,
            entry_format: EntryFormat::parse(&self.entry_format),
            long_ids: self.long_ids,
            legacy_override_semantics: self.legacy_override_semantics,
            charset,
        }
    }
}
