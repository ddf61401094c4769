/*
 * keysel - lib.rs
 *
 * Copyright 2017 Manos Pitsidianakis
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
    clippy::borrow_as_ptr,
    clippy::case_sensitive_file_extension_comparisons,
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
#![doc = include_str!("../README.md")]
//!
//! ## Description
//!
//! A crate that performs the key selection side of a mail client's
//! cryptography support:
//! - Hold [`Key`](crypto::Key) records in a [`KeyStore`](crypto::KeyStore)
//!   and look keys up through the [`KeyService`](crypto::KeyService) trait.
//! - Filter and sort candidate keys for a recipient (see
//!   [`KeyTable`](crypto::KeyTable) and [`SortMode`](crypto::SortMode))
//! - Render listing lines from format strings (see
//!   [`EntryFormat`](crypto::EntryFormat))
//! - Write verbose key reports and walk X.509 certificate chains (see
//!   [`print_certificate_chain`](crypto::print_certificate_chain))
//! - Decode X.509 Distinguished Names (see
//!   [`DistinguishedName`](crypto::DistinguishedName))
//! - Drive the interactive selection dialog (see
//!   [`select_key`](crypto::select_key))
//!
//! Other exports are
//! - Logging to a file or stderr (see [`StderrLogger`])
//! - A `debug` macro that works like `std::dbg` but for multiple threads. (see
//!   [`debug` macro](debug!))

#[macro_use]
pub mod dbg {

    #[allow(clippy::redundant_closure)]
    #[macro_export]
    macro_rules! debug {
        ($val:literal) => {
            {
                if cfg!(feature="debug-tracing") {
                    $crate::log::debug!($val);
                }
                $val
            }
        };
        ($val:expr) => {
            if cfg!(feature="debug-tracing") {
                let stringify = stringify!($val);
                // `match` keeps temporaries alive for the whole expression.
                match $val {
                    tmp => {
                        $crate::log::debug!("{} = {:?}", stringify, tmp);
                        tmp
                    }
                }
            } else {
                $val
            }
        };
        ($fmt:literal, $($arg:tt)*) => {
            if cfg!(feature="debug-tracing") {
                $crate::log::debug!($fmt, $($arg)*);
            }
        };
    }
}

pub mod error;
pub use error::*;

#[macro_use]
pub mod utils;

pub mod text;

pub mod crypto;

pub use utils::{
    datetime::UnixTimestamp,
    logging::{LogLevel, StderrLogger},
    shellexpand::ShellExpandTrait,
};

#[macro_use]
extern crate serde_derive;
pub extern crate log;

#[macro_use]
extern crate bitflags;
pub extern crate smallvec;
