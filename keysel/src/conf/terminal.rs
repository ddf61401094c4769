/*
 * keysel - conf/terminal.rs
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

//! Settings for terminal display

use keyselib::text::DisplayCharset;

use super::deserializers::non_empty_opt_string;

/// Settings for terminal display
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalSettings {
    /// Charset of terminal output and key reports.
    /// Default: "utf-8"
    pub charset: DisplayCharset,
    /// Command used to show key reports. The report's path is appended.
    /// Default: `$PAGER`, or `more`
    #[serde(deserialize_with = "non_empty_opt_string")]
    pub pager: Option<String>,
}
