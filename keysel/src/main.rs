/*
 * keysel - main.rs
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

//! Command line client binary.
//!
//! The key handling is done in the `keyselib` crate; this binary parses the
//! command line and dispatches to [`keysel::subcommands`].

use keysel::{args::*, *};

fn main() {
    // Dates stay in the C locale if the environment names an unknown one.
    _ = keyselib::utils::datetime::init_locale();
    let opt = Opt::from_args();
    ::std::process::exit(match run_app(opt) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", err);
            1
        }
    });
}

fn run_app(opt: Opt) -> Result<()> {
    if let Some(config_location) = opt.config.as_ref() {
        std::env::set_var(conf::CONFIG_ENV_VAR, config_location);
    }
    opt.execute()
}
