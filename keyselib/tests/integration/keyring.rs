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


use keyselib::{
    crypto::{
        print_certificate_chain, KeyApplication, KeyInfoPrompts, KeyService, KeyStore, Protocol,
    },
    text::DisplayCharset,
};
use tempfile::TempDir;

use super::KEYRING;

#[test]
fn test_keyring_load() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("keyring.json");
    std::fs::write(&path, KEYRING).unwrap();

    let store = KeyStore::load(&path).unwrap();
    assert_eq!(store.len(), 6);
    assert_eq!(store.iter().filter(|(_, k)| k.is_x509()).count(), 3);

    let err = KeyStore::load(&tmp_dir.path().join("missing.json")).unwrap_err();
    assert!(err.summary.starts_with("Could not read keyring"), "{}", err);
    assert!(err.kind.is_not_found());

    std::fs::write(&path, "[{").unwrap();
    let err = KeyStore::load(&path).unwrap_err();
    assert!(err.summary.starts_with("Could not parse keyring"), "{}", err);
    assert!(err.kind.is_value_error());
}

#[test]
fn test_keyring_list_keys() {
    let store = KeyStore::from_json(KEYRING).unwrap();
    let pgp = store
        .list_keys("alice@example.com", KeyApplication::PGP)
        .unwrap();
    assert_eq!(pgp.len(), 3);
    let smime = store
        .list_keys("alice@example.com", KeyApplication::SMIME)
        .unwrap();
    assert_eq!(smime.len(), 1);
    let both = store
        .list_keys("alice@example.com", KeyApplication::PGP | KeyApplication::SMIME)
        .unwrap();
    assert_eq!(both.len(), 4);
    let by_id = store
        .list_keys("0xDEADBEEF laptop", KeyApplication::empty())
        .unwrap();
    assert_eq!(by_id.len(), 2);
    assert!(store
        .list_keys("bob@example.com", KeyApplication::PGP)
        .unwrap()
        .is_empty());
}

#[test]
fn test_keyring_certificate_chain() {
    let store = KeyStore::from_json(KEYRING).unwrap();
    let cert = &store[store.find("3F4A5B6C").unwrap()];
    assert_eq!(cert.protocol, Protocol::X509);

    let mut out = vec![];
    print_certificate_chain(
        &mut out,
        cert,
        &store,
        KeyInfoPrompts::global(),
        DisplayCharset::default(),
    )
    .unwrap();
    let out = String::from_utf8(out).unwrap();
    let names = out
        .lines()
        .filter(|l| l.trim_start().starts_with("Name: "))
        .map(str::trim_start)
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "Name: Alice Example, Example Corp, DE",
            "Name: Example Intermediate CA, Example Corp, DE",
            "Name: Example Root CA, Example Corp, DE",
        ]
    );
    assert!(out.contains("        aka: alice@example.com\n"));
    assert!(out.contains("  Serial-No: 0x1A2B\n"));
    assert!(out.contains("Fingerprint: 11:22:33:44:55:66:77:88:99:AA:BB:CC:DD:EE:FF:00:3F:4A:5B:6C\n"));
    assert!(!out.contains("Error"));
}
