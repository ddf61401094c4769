//
// keysel
//
// Copyright 2024 Emmanouil Pitsidianakis <manos@pitsidianak.is>
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


use std::{collections::VecDeque, path::Path};

use keyselib::{
    crypto::{
        select_key, KeyApplication, KeyRequest, KeyService, KeySort, KeyStore, MenuAction, Pager,
        SelectionPolicy, SelectionUi, SortMode,
    },
    Result,
};

use super::KEYRING;

#[derive(Default)]
struct Script {
    actions: VecDeque<(usize, MenuAction)>,
    answers: VecDeque<bool>,
    lines: Vec<Vec<String>>,
    prompts: Vec<String>,
}

impl SelectionUi for Script {
    fn menu_loop(&mut self, _: &str, lines: &[String], _: usize) -> Result<(usize, MenuAction)> {
        self.lines.push(lines.to_vec());
        Ok(self.actions.pop_front().unwrap_or((0, MenuAction::Exit)))
    }

    fn message(&mut self, _: &str) -> Result<()> {
        Ok(())
    }

    fn error(&mut self, _: &str) -> Result<()> {
        Ok(())
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(default))
    }
}

struct NoPager;

impl Pager for NoPager {
    fn display(&mut self, _: &Path, _: &str) -> Result<()> {
        Ok(())
    }
}

fn alice() -> (KeyStore, KeyStore, KeyRequest) {
    let keyring = KeyStore::from_json(KEYRING).unwrap();
    let request = KeyRequest {
        address: Some("alice@example.com".into()),
        label: "Alice Example".into(),
        app: KeyApplication::PGP,
    };
    let candidates = keyring
        .list_keys(request.address.as_deref().unwrap(), request.app)
        .unwrap();
    (keyring, candidates, request)
}

#[test]
fn test_selection_listing() {
    let (keyring, candidates, request) = alice();
    let mut ui = Script::default();
    let selection = select_key(
        &candidates,
        &request,
        &SelectionPolicy::default(),
        &keyring,
        &mut ui,
        &mut NoPager,
    )
    .unwrap();
    assert!(selection.key.is_none());
    assert_eq!(
        ui.lines[0],
        vec![
            "   1 u  4096/0x0D1E2F3A4B5C6D7E RSA  es Alice Example <alice@example.com>",
            "   2 m   255/0x99AABBCCDDEEFF00 EdD  es Alice (laptop) <alice@example.com>",
        ]
    );
}

#[test]
fn test_selection_marginal_key() {
    let (keyring, candidates, request) = alice();
    let mut ui = Script {
        actions: [(1, MenuAction::Select)].into_iter().collect(),
        answers: [true].into_iter().collect(),
        ..Script::default()
    };
    let selection = select_key(
        &candidates,
        &request,
        &SelectionPolicy::default(),
        &keyring,
        &mut ui,
        &mut NoPager,
    )
    .unwrap();
    assert_eq!(
        selection.key.unwrap().uid(),
        "Alice (laptop) <alice@example.com>"
    );
    assert!(!selection.forced_valid);
    assert_eq!(
        ui.prompts,
        vec!["ID is only marginally valid. Do you really want to use the key?"]
    );
}

#[test]
fn test_selection_show_unusable_by_date() {
    let (keyring, candidates, request) = alice();
    let policy = SelectionPolicy {
        show_unusable: true,
        sort: KeySort::new(SortMode::Date, true),
        long_ids: false,
        entry_format: "%n %k %?f?[%f] ?%u".parse().unwrap(),
        ..SelectionPolicy::default()
    };
    let mut ui = Script::default();
    select_key(
        &candidates,
        &request,
        &policy,
        &keyring,
        &mut ui,
        &mut NoPager,
    )
    .unwrap();
    assert_eq!(
        ui.lines[0],
        vec![
            "1 DDEEFF00 Alice (laptop) <alice@example.com>",
            "2 4B5C6D7E Alice Example <alice@example.com>",
            "3 DEADBEEF [R] Alice Old <alice@example.com>",
        ]
    );
}
