/*
 * keysel - terminal.rs
 *
 * Copyright 2017-2018 Manos Pitsidianakis
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

//! Line based terminal prompts and the key menu.

use std::io::{BufRead, Write};

use keyselib::{
    crypto::{MenuAction, SelectionUi},
    text::DisplayCharset,
    Result,
};

/// A yes/no question. Empty input or end of input picks `default`.
pub struct Ask<'m> {
    pub message: &'m str,
    pub default: bool,
}

impl Ask<'_> {
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<bool> {
        let choices = if self.default { "[Y/n]" } else { "[y/N]" };
        let mut buffer = String::new();
        write!(out, "{} {} ", self.message, choices)?;
        out.flush()?;
        loop {
            buffer.clear();
            if input.read_line(&mut buffer)? == 0 {
                writeln!(out)?;
                return Ok(self.default);
            }

            match buffer.trim() {
                "" => return Ok(self.default),
                "Y" | "y" | "yes" | "YES" | "Yes" => {
                    return Ok(true);
                }
                "n" | "N" | "no" | "No" | "NO" => {
                    return Ok(false);
                }
                _ => {
                    write!(out, "\n{} {} ", self.message, choices)?;
                    out.flush()?;
                }
            }
        }
    }
}

pub const MENU_HELP: &str =
    "<number> or s<number>: select, c<number>: check key, %<number>: view user id, q: exit";

/// Parse a menu command. Rows are 1-based in the input and 0-based in the
/// result; an omitted number refers to `current`.
pub fn parse_command(input: &str, current: usize, rows: usize) -> Option<(usize, MenuAction)> {
    let input = input.trim();
    let (action, rest) = match input.chars().next() {
        None => return Some((current, MenuAction::Select)),
        Some('q' | 'x') if input.len() == 1 => return Some((current, MenuAction::Exit)),
        Some(c @ ('s' | 'c' | 'v' | '%' | 'i')) => (
            match c {
                's' => MenuAction::Select,
                'c' | 'v' => MenuAction::Verify,
                _ => MenuAction::ViewId,
            },
            input[c.len_utf8()..].trim_start(),
        ),
        Some(_) => (MenuAction::Select, input),
    };
    if rest.is_empty() {
        return Some((current, action));
    }
    match rest.parse::<usize>() {
        Ok(n) if (1..=rows).contains(&n) => Some((n - 1, action)),
        _ => None,
    }
}

/// [`SelectionUi`] reading commands line by line from `input`.
pub struct LineMenu<R, W> {
    input: R,
    output: W,
    charset: DisplayCharset,
}

impl<R: BufRead, W: Write> LineMenu<R, W> {
    pub fn new(input: R, output: W, charset: DisplayCharset) -> Self {
        Self {
            input,
            output,
            charset,
        }
    }

    fn put(&mut self, text: &str) -> Result<()> {
        self.output.write_all(&self.charset.encode(text))?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> SelectionUi for LineMenu<R, W> {
    fn menu_loop(
        &mut self,
        title: &str,
        lines: &[String],
        current: usize,
    ) -> Result<(usize, MenuAction)> {
        self.put(title)?;
        self.put("\n")?;
        for line in lines {
            self.put(line)?;
            self.put("\n")?;
        }
        self.put(MENU_HELP)?;
        self.put("\n")?;
        let mut buffer = String::new();
        loop {
            write!(self.output, "[{}]> ", current + 1)?;
            self.output.flush()?;
            buffer.clear();
            if self.input.read_line(&mut buffer)? == 0 {
                writeln!(self.output)?;
                return Ok((current, MenuAction::Exit));
            }
            match parse_command(&buffer, current, lines.len()) {
                Some(cmd) => return Ok(cmd),
                None => {
                    writeln!(self.output, "Invalid input `{}`.", buffer.trim())?;
                    self.put(MENU_HELP)?;
                    self.put("\n")?;
                }
            }
        }
    }

    fn message(&mut self, text: &str) -> Result<()> {
        self.put(text)?;
        self.put("\n")
    }

    fn error(&mut self, text: &str) -> Result<()> {
        self.put("Error: ")?;
        self.put(text)?;
        self.put("\n")
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ask {
            message: prompt,
            default,
        }
        .run(&mut self.input, &mut self.output)
    }
}
