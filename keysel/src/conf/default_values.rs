//
// keysel
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

//! default value functions for deserializing

pub fn false_val<T: From<bool>>() -> T {
    false.into()
}

pub fn true_val<T: From<bool>>() -> T {
    true.into()
}

pub fn none<T>() -> Option<T> {
    None
}

pub fn default_entry_format() -> String {
    keyselib::crypto::DEFAULT_ENTRY_FORMAT.to_string()
}
