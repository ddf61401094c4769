/*
 * keysel - lib.rs
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

#![deny(
    rustdoc::redundant_explicit_links,
    unsafe_op_in_unsafe_fn,
    /* groups */
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    /* restriction */
    clippy::dbg_macro,
    clippy::rc_buffer,
    clippy::as_underscore,
    clippy::assertions_on_result_states,
    /* rustdoc */
    rustdoc::broken_intra_doc_links,
    /* pedantic */
    clippy::doc_markdown,
    clippy::expect_fun_call,
    clippy::or_fun_call,
    clippy::bool_to_int_with_if,
    clippy::borrow_as_ptr,
    clippy::unused_enumerate_index,
    clippy::unnecessary_fallible_conversions,
    clippy::struct_field_names,
    clippy::manual_hash_one,
    clippy::into_iter_without_iter,
)]
#![allow(
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::significant_drop_tightening,
    clippy::multiple_crate_versions,
    clippy::significant_drop_in_scrutinee,
    clippy::cognitive_complexity
)]

//! This crate contains the frontend stuff of the application: configuration,
//! command line arguments and a line based terminal menu.
//!
//! Key handling is done in the `keyselib` crate. The split is done to be able
//! to embed the selection dialog in other frontends with the same innards.

pub use std::path::PathBuf;

#[macro_use]
extern crate serde_derive;

pub extern crate termion;

pub use structopt::StructOpt;

pub extern crate keyselib;
pub use keyselib::{error::*, log, LogLevel, ShellExpandTrait};

pub mod args;
pub mod subcommands;

pub mod terminal;
pub use crate::terminal::{Ask, LineMenu};

pub mod pager;
pub use crate::pager::CommandPager;

pub mod conf;
pub use crate::conf::Settings;
