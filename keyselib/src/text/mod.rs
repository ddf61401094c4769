/*
 * keysel - text mod.
 *
 * Copyright 2017-2020 Manos Pitsidianakis
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

//! Display width and charset helpers for terminal output.

use unicode_segmentation::UnicodeSegmentation;

pub mod charset;
pub mod wcwidth;
pub use charset::DisplayCharset;
pub use wcwidth::*;

pub trait TextProcessing: UnicodeSegmentation + CodePointsIter {
    /// Returns the total width of all graphemes using [`wcwidth`] for each
    /// code-point.
    fn grapheme_width(&self) -> usize {
        let mut count = 0;
        for c in self.code_points() {
            count += wcwidth(c).unwrap_or(0);
        }

        count
    }

    /// Returns the amount of graphemes.
    fn grapheme_len(&self) -> usize {
        UnicodeSegmentation::graphemes(self, true).count()
    }
}

impl TextProcessing for str {}

pub trait Truncate {
    fn truncate_at_boundary(&mut self, new_len: usize);
    fn trim_at_boundary(&self, new_len: usize) -> &str;
}

impl Truncate for &str {
    fn truncate_at_boundary(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }

        if let Some((end, _)) = UnicodeSegmentation::grapheme_indices(*self, true).nth(new_len) {
            *self = &self[..end];
        }
    }

    /// Keep the first `new_len` graphemes.
    fn trim_at_boundary(&self, new_len: usize) -> &str {
        if new_len >= self.len() {
            return self;
        }

        match UnicodeSegmentation::grapheme_indices(*self, true).nth(new_len) {
            Some((end, _)) => &self[..end],
            None => self,
        }
    }
}

impl Truncate for String {
    fn truncate_at_boundary(&mut self, new_len: usize) {
        let end = self.as_str().trim_at_boundary(new_len).len();
        Self::truncate(self, end);
    }

    fn trim_at_boundary(&self, new_len: usize) -> &str {
        let s: &str = self.as_str();
        let end = s.trim_at_boundary(new_len).len();
        &self[..end]
    }
}
