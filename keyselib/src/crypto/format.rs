//
// keysel - crypto::format
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

//! Key listing lines rendered from `printf`-like format strings.
//!
//! | Expando   | Field                                             |
//! |-----------|---------------------------------------------------|
//! | `%n`      | entry number                                      |
//! | `%p`      | protocol                                          |
//! | `%t`      | trust of the key/user id binding                  |
//! | `%u`      | user id                                           |
//! | `%[fmt]`  | creation date as `strftime(3)` format `fmt`       |
//! | `%a` `%A` | algorithm                                         |
//! | `%c` `%C` | capabilities                                      |
//! | `%f` `%F` | flags                                             |
//! | `%k` `%K` | key id                                            |
//! | `%l` `%L` | key length                                        |
//!
//! Each expando takes an optional `[-][width][.precision]` specification.
//! `%?X?if&else?` renders `if` when field `X` is set and `else` otherwise.

use super::{Key, KeyFlags};
use crate::{
    text::{TextProcessing, Truncate},
    utils::datetime::timestamp_to_string,
};

pub const DEFAULT_ENTRY_FORMAT: &str = "%4n %t%f %4l/0x%k %-4a %2c %u";

/// The fields an expando can refer to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Field {
    Number,
    Protocol,
    Trust,
    UserId,
    /// Creation date. With `posix` the C locale is used.
    Date {
        format: String,
        posix: bool,
    },
    Algorithm,
    Capabilities,
    Flags,
    KeyId,
    Length,
}

impl Field {
    fn from_op(op: char) -> Option<Self> {
        Some(match op {
            'n' => Self::Number,
            'p' => Self::Protocol,
            't' => Self::Trust,
            'u' => Self::UserId,
            'a' | 'A' => Self::Algorithm,
            'c' | 'C' => Self::Capabilities,
            'f' | 'F' => Self::Flags,
            'k' | 'K' => Self::KeyId,
            'l' | 'L' => Self::Length,
            _ => return None,
        })
    }
}

/// `[-][width][.precision]`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Padding {
    pub left_align: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
}

impl Padding {
    fn pad(&self, mut s: String) -> String {
        let width = s.grapheme_width();
        match self.width {
            Some(w) if w > width => {
                let fill = " ".repeat(w - width);
                if self.left_align {
                    s.push_str(&fill);
                    s
                } else {
                    fill + &s
                }
            }
            _ => s,
        }
    }

    fn string(&self, s: &str) -> String {
        let s = match self.precision {
            Some(p) => s.trim_at_boundary(p),
            None => s,
        };
        self.pad(s.to_string())
    }

    fn number(&self, n: u64) -> String {
        let digits = n.to_string();
        let digits = match self.precision {
            Some(p) if p > digits.len() => format!("{}{}", "0".repeat(p - digits.len()), digits),
            _ => digits,
        };
        self.pad(digits)
    }

    fn character(&self, c: char) -> String {
        self.pad(c.to_string())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Literal(String),
    /// `None` is an unknown expando and renders as nothing.
    Expando {
        padding: Padding,
        field: Option<Field>,
    },
    Conditional {
        field: Option<Field>,
        if_true: Vec<Segment>,
        if_false: Vec<Segment>,
    },
}

/// What a line is rendered from.
#[derive(Clone, Copy, Debug)]
pub struct EntryContext<'a> {
    pub num: usize,
    pub key: &'a Key,
    pub long_ids: bool,
}

/// A parsed entry format string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryFormat {
    segments: Vec<Segment>,
}

impl Default for EntryFormat {
    fn default() -> Self {
        Self::parse(DEFAULT_ENTRY_FORMAT)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.pos += 1;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .ok()
    }

    fn padding(&mut self) -> Padding {
        let mut ret = Padding::default();
        if self.peek() == Some('-') {
            ret.left_align = true;
            self.pos += 1;
        }
        ret.width = self.number();
        if self.peek() == Some('.') {
            self.pos += 1;
            ret.precision = Some(self.number().unwrap_or(0));
        }
        ret
    }

    /// The text after `%[` up to the closing `]`. `%x` pairs are kept as is.
    fn date(&mut self) -> Field {
        let posix = if self.peek() == Some('!') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut format = String::new();
        while let Some(c) = self.next() {
            match c {
                ']' => break,
                '%' => {
                    format.push('%');
                    if let Some(c) = self.next() {
                        format.push(c);
                    }
                }
                c => format.push(c),
            }
        }
        Field::Date { format, posix }
    }

    fn segments(&mut self, terminators: &[char]) -> Vec<Segment> {
        let mut ret = vec![];
        let mut literal = String::new();
        macro_rules! flush {
            () => {
                if !literal.is_empty() {
                    ret.push(Segment::Literal(std::mem::take(&mut literal)));
                }
            };
        }
        while let Some(c) = self.peek() {
            if terminators.contains(&c) {
                break;
            }
            self.pos += 1;
            if c != '%' {
                literal.push(c);
                continue;
            }
            match self.peek() {
                None => literal.push('%'),
                Some('%') => {
                    self.pos += 1;
                    literal.push('%');
                }
                Some('?') => {
                    self.pos += 1;
                    flush!();
                    let field = match self.next() {
                        Some('[') => Some(self.date()),
                        Some(op) => Field::from_op(op),
                        None => None,
                    };
                    if self.peek() == Some('?') {
                        self.pos += 1;
                    }
                    let if_true = self.segments(&['&', '?']);
                    let if_false = if self.peek() == Some('&') {
                        self.pos += 1;
                        self.segments(&['?'])
                    } else {
                        vec![]
                    };
                    if self.peek() == Some('?') {
                        self.pos += 1;
                    }
                    ret.push(Segment::Conditional {
                        field,
                        if_true,
                        if_false,
                    });
                }
                Some(_) => {
                    flush!();
                    let padding = self.padding();
                    let field = match self.next() {
                        Some('[') => Some(self.date()),
                        Some(op) => Field::from_op(op),
                        None => None,
                    };
                    ret.push(Segment::Expando { padding, field });
                }
            }
        }
        flush!();
        ret
    }
}

fn abilities(flags: KeyFlags) -> String {
    let encrypt = if !flags.contains(KeyFlags::CAN_ENCRYPT) {
        '-'
    } else if flags.contains(KeyFlags::PREFER_SIGNING) {
        '.'
    } else {
        'e'
    };
    let sign = if !flags.contains(KeyFlags::CAN_SIGN) {
        '-'
    } else if flags.contains(KeyFlags::PREFER_ENCRYPTION) {
        '.'
    } else {
        's'
    };
    [encrypt, sign].iter().collect()
}

/// The most important flag as a single character.
fn flag_char(flags: KeyFlags) -> char {
    if flags.contains(KeyFlags::REVOKED) {
        'R'
    } else if flags.contains(KeyFlags::EXPIRED) {
        'X'
    } else if flags.contains(KeyFlags::DISABLED) {
        'd'
    } else if flags.contains(KeyFlags::CRITICAL) {
        'c'
    } else {
        ' '
    }
}

impl Field {
    fn is_set(&self, key: &Key) -> bool {
        match self {
            Self::Capabilities => key.flags().intersects(KeyFlags::ABILITIES),
            Self::Flags => key.flags().intersects(KeyFlags::RESTRICTIONS),
            _ => true,
        }
    }

    fn render(&self, padding: &Padding, ctx: &EntryContext<'_>) -> String {
        let key = ctx.key;
        match self {
            Self::Number => padding.number(ctx.num as u64),
            Self::Protocol => padding.string(key.protocol.name()),
            Self::Trust => padding.character(if key.is_x509() {
                'x'
            } else {
                key.validity.as_char()
            }),
            Self::UserId => padding.string(key.uid()),
            Self::Date { format, posix } => padding.string(&timestamp_to_string(
                key.timestamp(),
                Some(format.as_str()),
                *posix,
            )),
            Self::Algorithm => {
                let padding = Padding {
                    precision: Some(padding.precision.map(|p| p.min(3)).unwrap_or(3)),
                    ..*padding
                };
                padding.string(key.algorithm())
            }
            Self::Capabilities => padding.string(&abilities(key.flags())),
            Self::Flags => padding.character(flag_char(key.flags())),
            Self::KeyId => padding.string(key.keyid(ctx.long_ids)),
            Self::Length => padding.number(u64::from(key.length())),
        }
    }
}

impl EntryFormat {
    /// Parse `format`. Parsing never fails: unknown expandos render as
    /// nothing and unterminated constructs end at the end of the string.
    pub fn parse(format: &str) -> Self {
        let mut parser = Parser {
            chars: format.chars().collect(),
            pos: 0,
        };
        Self {
            segments: parser.segments(&[]),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn render(&self, ctx: &EntryContext<'_>) -> String {
        let mut ret = String::new();
        render_segments(&self.segments, ctx, &mut ret);
        ret
    }
}

impl std::str::FromStr for EntryFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

fn render_segments(segments: &[Segment], ctx: &EntryContext<'_>, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Expando {
                padding,
                field: Some(field),
            } => out.push_str(&field.render(padding, ctx)),
            Segment::Expando { field: None, .. } => {}
            Segment::Conditional {
                field,
                if_true,
                if_false,
            } => {
                let set = field.as_ref().map(|f| f.is_set(ctx.key)).unwrap_or(true);
                render_segments(if set { if_true } else { if_false }, ctx, out);
            }
        }
    }
}
