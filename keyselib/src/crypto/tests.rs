//
// keysel - crypto tests
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

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use super::{
    dn::{
        INVALID_DN_PLACEHOLDER, INVALID_ENCODING_PLACEHOLDER, UNKNOWN_ENCODING_PLACEHOLDER,
    },
    format::{Field, Padding, Segment},
    selection::{
        validity_warning, ID_MARGINAL_WARNING, ID_NOT_VALID_WARNING, ID_UNDEFINED_WARNING,
        ID_UNUSABLE_WARNING, KEY_UNUSABLE_MSG,
    },
    *,
};
use crate::{
    error::{Error, Result},
    text::DisplayCharset,
    utils::datetime::{formats, timestamp_to_string},
};

const FPR: &str = "0123456789ABCDEF0123456789ABCDEF01234567";

fn pgp_key(uid: &str, fpr: &str, validity: Validity) -> Key {
    Key {
        protocol: Protocol::OpenPgp,
        flags: KeyFlags::CAN_ENCRYPT | KeyFlags::CAN_SIGN,
        validity,
        uids: vec![UserId::new(uid)],
        subkeys: vec![SubKey {
            keyid: fpr[fpr.len() - 16..].to_string(),
            fpr: Some(fpr.to_string()),
            flags: KeyFlags::CAN_SIGN | KeyFlags::CAN_CERTIFY,
            timestamp: 0,
            expires: 0,
            length: 4096,
            algorithm: "RSA".to_string(),
        }],
        ..Key::default()
    }
}

fn x509_cert(subject: &str, fpr: &str, issuer: Option<&str>) -> Key {
    Key {
        protocol: Protocol::X509,
        flags: KeyFlags::CAN_SIGN,
        validity: Validity::Unknown,
        uids: vec![UserId::new(subject)],
        subkeys: vec![SubKey {
            keyid: fpr[fpr.len().saturating_sub(16)..].to_string(),
            fpr: Some(fpr.to_string()),
            flags: KeyFlags::CAN_SIGN,
            length: 2048,
            algorithm: "RSA".to_string(),
            ..SubKey::default()
        }],
        issuer_serial: Some("01A2".to_string()),
        issuer_name: Some("CN=Root CA,O=Example".to_string()),
        chain_id: issuer.map(str::to_string),
    }
}

fn fpr(n: u8) -> String {
    format!("{:040X}", n)
}

#[test]
fn test_crypto_dn_parse() {
    let dn = DistinguishedName::parse("CN=Alice,O=Example,C=DE").unwrap();
    assert_eq!(
        dn.components(),
        &[
            ("CN".to_string(), "Alice".to_string()),
            ("O".to_string(), "Example".to_string()),
            ("C".to_string(), "DE".to_string()),
        ]
    );
    assert_eq!(dn.to_string(), "Alice, Example, DE");

    // Standard attributes come first, in fixed order.
    assert_eq!(
        DistinguishedName::parse("C=DE,L=Berlin,CN=Bob")
            .unwrap()
            .to_string(),
        "Bob, Berlin, DE"
    );
    assert_eq!(
        DistinguishedName::parse("X=Foo,CN=Bar").unwrap().to_string(),
        "Bar (X=Foo)"
    );
    assert_eq!(
        DistinguishedName::parse("X=Foo").unwrap().to_string(),
        "(X=Foo)"
    );
    assert_eq!(
        DistinguishedName::parse("OU=a+OU=b,CN=c")
            .unwrap()
            .to_string(),
        "c, a + b"
    );
    assert_eq!(
        DistinguishedName::parse("X=1,Y=2,X=3").unwrap().to_string(),
        "(X=1 + 3, Y=2)"
    );
    assert_eq!(
        DistinguishedName::parse(" CN=Carol ; O=Org")
            .unwrap()
            .values("O")
            .collect::<Vec<_>>(),
        vec!["Org"]
    );
    assert!(DistinguishedName::parse("").unwrap().is_empty());
}

#[test]
fn test_crypto_dn_values() {
    // hex form
    assert_eq!(
        DistinguishedName::parse("CN=#414243")
            .unwrap()
            .values("CN")
            .collect::<Vec<_>>(),
        vec!["ABC"]
    );
    // escapes
    assert_eq!(
        DistinguishedName::parse(r"O=Example\, Inc.,CN=\41lice")
            .unwrap()
            .to_string(),
        "Alice, Example, Inc."
    );
    assert_eq!(
        DistinguishedName::parse(r#"CN=\"quoted\"\+\;\\"#)
            .unwrap()
            .values("CN")
            .collect::<Vec<_>>(),
        vec![r#""quoted"+;\"#]
    );
    // UTF-8 through hex escapes
    assert_eq!(
        DistinguishedName::parse(r"CN=J\C3\BCrgen")
            .unwrap()
            .to_string(),
        "Jürgen"
    );
}

#[test]
fn test_crypto_dn_failures() {
    for input in [
        "CN",
        "=x",
        "CN=#",
        "CN=#414",
        "CN=#41zz",
        r"CN=a\zb",
        r"CN=a\",
        "CN=\"x\"",
        "CN=a=b",
        "CN=a,O",
        "CN=a>b",
    ] {
        let err = DistinguishedName::parse(input).unwrap_err();
        assert!(err.kind.is_invalid_dn(), "{:?}: {}", input, err);
    }
}

#[test]
fn test_crypto_format_user_id() {
    assert_eq!(format_user_id("<alice@example.com>"), "alice@example.com");
    assert_eq!(format_user_id("<alice@example.com"), "");
    assert_eq!(format_user_id("(binary)"), UNKNOWN_ENCODING_PLACEHOLDER);
    assert_eq!(format_user_id("#x"), INVALID_ENCODING_PLACEHOLDER);
    assert_eq!(format_user_id(""), INVALID_ENCODING_PLACEHOLDER);
    assert_eq!(format_user_id("CN=x,\"y"), INVALID_DN_PLACEHOLDER);
    assert_eq!(format_user_id("CN=Alice,O=Example"), "Alice, Example");
}

#[test]
fn test_crypto_trust_order() {
    let full = pgp_key("b", &fpr(1), Validity::Full);
    let marginal = pgp_key("a", &fpr(2), Validity::Marginal);
    assert_eq!(
        key_order(SortMode::Trust, &full, &marginal),
        std::cmp::Ordering::Less
    );

    // Restrictions win over validity.
    let mut revoked = pgp_key("a", &fpr(3), Validity::Ultimate);
    revoked.flags |= KeyFlags::REVOKED;
    assert!(compare(SortMode::Trust, false, &revoked, &marginal));
    let mut expired_disabled = revoked.clone();
    expired_disabled.flags = KeyFlags::EXPIRED | KeyFlags::DISABLED;
    assert!(compare(
        SortMode::Trust,
        false,
        &expired_disabled,
        &revoked
    ));

    // Restrictions compare by flag value, not by how many are set.
    let mut critical = pgp_key("a", &fpr(7), Validity::Ultimate);
    critical.flags |= KeyFlags::CRITICAL;
    let mut expired_revoked = pgp_key("a", &fpr(8), Validity::Ultimate);
    expired_revoked.flags |= KeyFlags::EXPIRED | KeyFlags::REVOKED;
    assert!(compare(SortMode::Trust, false, &critical, &expired_revoked));
    assert!(!compare(SortMode::Trust, false, &expired_revoked, &critical));
    assert_eq!(
        key_order(SortMode::Trust, &expired_revoked, &critical),
        std::cmp::Ordering::Less
    );

    // Longer keys, then newer keys first.
    let mut short = pgp_key("a", &fpr(4), Validity::Full);
    short.subkeys[0].length = 2048;
    assert!(compare(SortMode::Trust, false, &short, &full));
    let mut newer = pgp_key("b", &fpr(5), Validity::Full);
    newer.subkeys[0].timestamp = 1_600_000_000;
    assert!(compare(SortMode::Trust, false, &full, &newer));

    // Then user id and fingerprint, ignoring case.
    let upper = pgp_key("B", &fpr(6), Validity::Full);
    assert!(compare(SortMode::Trust, false, &upper, &full));
    assert!(!compare(SortMode::Trust, false, &full, &upper));
}

#[test]
fn test_crypto_other_orders() {
    let mut a = pgp_key("alice@example.com", &fpr(9), Validity::Full);
    let mut b = pgp_key("Bob@example.com", &fpr(1), Validity::Full);
    a.subkeys[0].timestamp = 20;
    b.subkeys[0].timestamp = 10;
    assert!(compare(SortMode::Address, false, &b, &a));
    assert!(!compare(SortMode::Address, false, &a, &b));
    assert!(compare(SortMode::Date, false, &a, &b));
    assert!(compare(SortMode::KeyId, false, &a, &b));

    // Same user id: address falls back to the fingerprint.
    let c = pgp_key("ALICE@example.com", &fpr(2), Validity::Full);
    assert!(compare(SortMode::Address, false, &a, &c));

    // No subkeys: date 0 sorts first.
    let mut bare = c.clone();
    bare.subkeys.clear();
    assert!(compare(SortMode::Date, false, &b, &bare));
}

#[test]
fn test_crypto_compare_properties() {
    let mut keys = vec![];
    for (i, (uid, validity)) in [
        ("alice", Validity::Full),
        ("Alice", Validity::Marginal),
        ("bob", Validity::Never),
        ("carol", Validity::Ultimate),
        ("dave", Validity::Full),
    ]
    .into_iter()
    .enumerate()
    {
        let mut k = pgp_key(uid, &fpr(i as u8), validity);
        k.subkeys[0].timestamp = (i as u64 % 3) * 100;
        k.subkeys[0].length = if i % 2 == 0 { 4096 } else { 2048 };
        if i == 2 {
            k.flags |= KeyFlags::EXPIRED;
        }
        keys.push(k);
    }
    for mode in [
        SortMode::Address,
        SortMode::Date,
        SortMode::KeyId,
        SortMode::Trust,
    ] {
        for a in &keys {
            for b in &keys {
                assert_eq!(
                    compare(mode, true, a, b),
                    !compare(mode, false, a, b),
                    "{:?}",
                    mode
                );
                assert_eq!(key_order(mode, a, b), key_order(mode, b, a).reverse());
                for c in &keys {
                    if key_order(mode, a, b).is_le() && key_order(mode, b, c).is_le() {
                        assert!(key_order(mode, a, c).is_le(), "{:?}", mode);
                    }
                }
            }
        }
    }
}

#[test]
fn test_crypto_key_table() {
    let mut revoked = pgp_key("revoked", &fpr(1), Validity::Full);
    revoked.flags |= KeyFlags::REVOKED;
    let marginal = pgp_key("marginal", &fpr(2), Validity::Marginal);
    let full = pgp_key("full", &fpr(3), Validity::Full);
    let store = KeyStore::new(vec![revoked.clone(), marginal, full]);

    let mut table = KeyTable::build(&store, false).unwrap();
    assert!(table.unusable_excluded);
    assert_eq!(table.len(), 2);
    table.sort(&store, KeySort::new(SortMode::Trust, false));
    let uids = table
        .entries()
        .iter()
        .map(|e| (e.num, store[e.index].uid()))
        .collect::<Vec<_>>();
    assert_eq!(uids, vec![(1, "full"), (2, "marginal")]);

    table.sort(&store, KeySort::new(SortMode::Trust, true));
    assert_eq!(store[table.entries()[0].index].uid(), "marginal");
    assert_eq!(table.entries()[0].num, 1);

    let table = KeyTable::build(&store, true).unwrap();
    assert!(!table.unusable_excluded);
    assert_eq!(table.len(), 3);

    let only_revoked = KeyStore::new(vec![revoked]);
    let err = KeyTable::build(&only_revoked, false).unwrap_err();
    assert!(err.kind.is_all_keys_unusable());
    assert_eq!(err.summary, "All matching keys are marked expired/revoked");

    let table = KeyTable::build(&KeyStore::default(), false).unwrap();
    assert!(table.is_empty());
    assert!(!table.unusable_excluded);
}

#[test]
fn test_crypto_fingerprint_grouping() {
    assert_eq!(
        format_fingerprint(FPR, true),
        "0123 4567 89AB CDEF 0123  4567 89AB CDEF 0123 4567"
    );
    assert_eq!(
        format_fingerprint("0123456789ABCDEF0123456789ABCDEF", true),
        "01 23 45 67 89 AB CD EF  01 23 45 67 89 AB CD EF"
    );
    assert_eq!(format_fingerprint("AABBCC", false), "AA:BB:CC");
    assert_eq!(format_fingerprint("AABBC", false), "AA:BB:C");
    assert_eq!(format_fingerprint("", false), "");
}

#[test]
fn test_crypto_key_info_pgp() {
    let mut key = pgp_key("Alice <alice@example.com>", FPR, Validity::Full);
    key.uids.insert(
        0,
        UserId {
            uid: "Old <old@example.com>".into(),
            revoked: true,
            invalid: false,
        },
    );
    key.uids.push(UserId {
        uid: "Al".into(),
        revoked: false,
        invalid: true,
    });
    key.subkeys.push(SubKey {
        keyid: "FEDCBA9876543210".into(),
        fpr: None,
        flags: KeyFlags::CAN_ENCRYPT | KeyFlags::EXPIRED,
        length: 4096,
        algorithm: "RSA".into(),
        ..SubKey::default()
    });

    let prompts = KeyInfoPrompts::new();
    assert_eq!(prompts.width(), "Fingerprint: ".len());
    let mut out = vec![];
    print_key_info(&mut out, &key, &prompts, DisplayCharset::default()).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "       Name: Alice <alice@example.com>
        aka: [Invalid] Al
   Key Type: PGP, 4096 bit RSA
  Key Usage: encryption, signing, certification
Fingerprint: 0123 4567 89AB CDEF 0123  4567 89AB CDEF 0123 4567

     Subkey: 0x01234567
   Key Type: PGP, 4096 bit RSA
  Key Usage: signing, certification

     Subkey: 0x76543210 [Expired]
   Key Type: PGP, 4096 bit RSA
  Key Usage: encryption
"
    );
}

#[test]
fn test_crypto_key_info_dates() {
    let mut key = pgp_key("Alice", FPR, Validity::Full);
    key.subkeys[0].timestamp = 1_500_000_000;
    key.subkeys[0].expires = 1_600_000_000;
    let mut out = vec![];
    print_key_info(
        &mut out,
        &key,
        KeyInfoPrompts::global(),
        DisplayCharset::default(),
    )
    .unwrap();
    let out = String::from_utf8(out).unwrap();
    let from = format!(
        " Valid From: {}\n",
        timestamp_to_string(1_500_000_000, Some(formats::LOCALE_DATETIME), false)
    );
    let to = format!(
        "   Valid To: {}\n",
        timestamp_to_string(1_600_000_000, Some(formats::LOCALE_DATETIME), false)
    );
    // Once for the key and once for its principal subkey.
    assert_eq!(out.matches(&from).count(), 2, "{}", out);
    assert_eq!(out.matches(&to).count(), 2, "{}", out);
}

#[test]
fn test_crypto_key_info_x509() {
    let cert = x509_cert("CN=Alice,O=Example,C=DE", "AABBCC", None);
    let mut out = vec![];
    print_key_info(
        &mut out,
        &cert,
        KeyInfoPrompts::global(),
        DisplayCharset::default(),
    )
    .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "       Name: Alice, Example, DE
   Key Type: X.509, 2048 bit RSA
  Key Usage: signing
Fingerprint: AA:BB:CC
  Serial-No: 0x01A2
  Issued By: Root CA, Example
"
    );

    // Charset conversion applies to the whole report.
    let cert = x509_cert(r"CN=J\C3\BCrgen", "AABBCC", None);
    let mut out = vec![];
    print_key_info(
        &mut out,
        &cert,
        KeyInfoPrompts::global(),
        "latin1".parse().unwrap(),
    )
    .unwrap();
    assert!(out.starts_with(b"       Name: J\xfcrgen\n"));
}

#[test]
fn test_crypto_chain_walk() {
    let root = x509_cert("CN=Root CA", "AA01", Some("AA01"));
    let intermediate = x509_cert("CN=Intermediate", "AA02", Some("AA01"));
    let leaf = x509_cert("CN=Leaf", "AA03", Some("AA02"));
    let store = KeyStore::new(vec![root.clone(), intermediate, leaf.clone()]);

    let walk = |key: &Key| {
        let mut out = vec![];
        print_certificate_chain(
            &mut out,
            key,
            &store,
            KeyInfoPrompts::global(),
            DisplayCharset::default(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    };

    // Self-signed: only the certificate itself.
    let out = walk(&root);
    assert_eq!(out.matches("Name: ").count(), 1);

    // Chain ids are hex and match regardless of case.
    let lower_root = x509_cert("CN=Root CA", "AA01", Some("aa01"));
    let out = walk(&lower_root);
    assert_eq!(out.matches("Name: ").count(), 1);
    assert!(!out.contains("Error"), "{}", out);

    let out = walk(&leaf);
    assert_eq!(out.matches("Name: ").count(), 3);
    assert!(out.contains("Name: Leaf\n"));
    assert!(out.contains("\n\n       Name: Intermediate\n"));
    assert!(out.ends_with("Issued By: Root CA, Example\n"));
    assert!(out.contains("\n\n       Name: Root CA\n"));

    // Missing issuer stops the walk with a diagnostic.
    let orphan = x509_cert("CN=Orphan", "AA04", Some("DEAD"));
    let out = walk(&orphan);
    assert!(out.ends_with("\nError finding issuer key: No public key\n"), "{}", out);
    assert_eq!(out.matches("Name: ").count(), 1);

    // No chain id at all.
    let out = walk(&x509_cert("CN=Lonely", "AA05", None));
    assert_eq!(out.matches("Name: ").count(), 1);
}

/// Every issuer has yet another issuer.
struct EndlessChain;

impl KeyService for EndlessChain {
    fn list_keys(&self, _: &str, _: KeyApplication) -> Result<KeyStore> {
        Ok(KeyStore::default())
    }

    fn resolve_issuer(&self, chain_id: &str, _: Protocol) -> Result<Key> {
        Ok(x509_cert(
            "CN=Issuer",
            chain_id,
            Some(&format!("{}0", chain_id)),
        ))
    }
}

#[test]
fn test_crypto_chain_walk_depth() {
    let leaf = x509_cert("CN=Leaf", "BB", Some("BB0"));
    let mut out = vec![];
    print_certificate_chain(
        &mut out,
        &leaf,
        &EndlessChain,
        KeyInfoPrompts::global(),
        DisplayCharset::default(),
    )
    .unwrap();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.matches("Name: Issuer\n").count(), info::MAX_CHAIN_DEPTH);
    assert!(out.ends_with("\n\nError: certification chain too long - stopping here\n"));
}

#[test]
fn test_crypto_entry_format() {
    let key = pgp_key("Alice <a@x>", FPR, Validity::Full);
    let ctx = EntryContext {
        num: 1,
        key: &key,
        long_ids: false,
    };
    let render = |fmt: &str| EntryFormat::parse(fmt).render(&ctx);

    assert_eq!(
        EntryFormat::default().render(&ctx),
        "   1 f  4096/0x01234567 RSA  es Alice <a@x>"
    );
    assert_eq!(render("%p %K %L"), "OpenPGP 01234567 4096");
    assert_eq!(
        EntryFormat::parse("%k").render(&EntryContext {
            long_ids: true,
            ..ctx
        }),
        "89ABCDEF01234567"
    );
    assert_eq!(render("%.5u|%-8n|%5.3n"), "Alice|1       |  001");
    assert_eq!(render("100%% %z!"), "100% !");
    assert_eq!(render("%?c?can&cannot?"), "can");
    assert_eq!(render("%?f?[%f]&ok?"), "ok");
    assert_eq!(render("%?u?yes&no?"), "yes");
    assert_eq!(render("%?p?only?"), "only");

    let mut weird = key.clone();
    weird.flags = KeyFlags::REVOKED | KeyFlags::CRITICAL;
    weird.subkeys[0].algorithm = "ECDSA".into();
    weird.validity = Validity::Undefined;
    let ctx = EntryContext {
        num: 12,
        key: &weird,
        long_ids: false,
    };
    let render = |fmt: &str| EntryFormat::parse(fmt).render(&ctx);
    assert_eq!(render("%?c?can&cannot?"), "cannot");
    assert_eq!(render("%?f?[%f]&ok?"), "[R]");
    assert_eq!(render("%c %t %a|%-5a|%.1a"), "-- q ECD|ECD  |E");

    weird.flags = KeyFlags::CAN_ENCRYPT | KeyFlags::CAN_SIGN | KeyFlags::PREFER_SIGNING;
    weird.protocol = Protocol::X509;
    let ctx = EntryContext {
        num: 3,
        key: &weird,
        long_ids: false,
    };
    assert_eq!(EntryFormat::parse("%c %t %p").render(&ctx), ".s x CMS");
}

#[test]
fn test_crypto_entry_format_parse() {
    assert_eq!(
        EntryFormat::parse("%[!%d.%m]").segments(),
        &[Segment::Expando {
            padding: Padding::default(),
            field: Some(Field::Date {
                format: "%d.%m".into(),
                posix: true,
            }),
        }]
    );
    assert_eq!(
        EntryFormat::parse("x%-3.1k").segments(),
        &[
            Segment::Literal("x".into()),
            Segment::Expando {
                padding: Padding {
                    left_align: true,
                    width: Some(3),
                    precision: Some(1),
                },
                field: Some(Field::KeyId),
            }
        ]
    );

    let mut key = pgp_key("Alice", FPR, Validity::Full);
    key.subkeys[0].timestamp = 1_600_000_000;
    let ctx = EntryContext {
        num: 1,
        key: &key,
        long_ids: false,
    };
    assert_eq!(
        EntryFormat::parse("[%[!%Y-%m-%d]]").render(&ctx),
        format!(
            "[{}]",
            timestamp_to_string(1_600_000_000, Some("%Y-%m-%d"), true)
        )
    );
}

#[test]
fn test_crypto_keystore() {
    let store = KeyStore::from_json(
        r#"[
  {
    "protocol": "openpgp",
    "flags": "CAN_ENCRYPT | CAN_SIGN",
    "validity": "full",
    "uids": [{ "uid": "Alice <alice@example.com>" }],
    "subkeys": [{
      "keyid": "89ABCDEF01234567",
      "fpr": "0123456789ABCDEF0123456789ABCDEF01234567",
      "flags": "CAN_SIGN | CAN_CERTIFY",
      "timestamp": 1500000000,
      "length": 4096,
      "algorithm": "RSA"
    }]
  },
  {
    "protocol": "x509",
    "uids": [{ "uid": "CN=Bob,O=Example" }, { "uid": "<bob@example.com>" }],
    "subkeys": [{ "keyid": "AABBCCDDEEFF0011", "fpr": "AABBCCDDEEFF0011" }],
    "chain_id": "AABBCCDDEEFF0011"
  }
]"#,
    )
    .unwrap();
    assert_eq!(store.len(), 2);
    let alice = store.find("0x01234567").unwrap();
    assert_eq!(store[alice].validity, Validity::Full);
    assert!(store[alice].flags().contains(KeyFlags::CAN_ENCRYPT));
    assert_eq!(store[alice].timestamp(), 1_500_000_000);
    let bob = store.find("eeff0011").unwrap();
    assert!(store[bob].is_x509());
    assert_eq!(store[bob].algorithm(), "?");
    assert!(store.find("").is_none());

    let pgp = store.list_keys("", KeyApplication::PGP).unwrap();
    assert_eq!(pgp.len(), 1);
    let both = store
        .list_keys("bob@EXAMPLE", KeyApplication::PGP | KeyApplication::SMIME)
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(
        store
            .list_keys("nobody 01234567", KeyApplication::empty())
            .unwrap()
            .len(),
        1
    );

    assert!(store
        .resolve_issuer("aabbccddeeff0011", Protocol::X509)
        .is_ok());
    let err = store
        .resolve_issuer("AABBCCDDEEFF0011", Protocol::OpenPgp)
        .unwrap_err();
    assert!(err.kind.is_issuer_lookup());

    let roundtrip = KeyStore::from_json(&store.to_json().unwrap()).unwrap();
    assert_eq!(roundtrip, store);

    assert!(KeyStore::from_json(r#"[{"protocol": "openpgp", "colour": 1}]"#).is_err());
}

#[derive(Default)]
struct ScriptedUi {
    actions: VecDeque<(usize, MenuAction)>,
    answers: VecDeque<bool>,
    titles: Vec<String>,
    lines: Vec<Vec<String>>,
    messages: Vec<String>,
    errors: Vec<String>,
    prompts: Vec<(String, bool)>,
}

impl ScriptedUi {
    fn new(actions: &[(usize, MenuAction)], answers: &[bool]) -> Self {
        Self {
            actions: actions.iter().copied().collect(),
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl SelectionUi for ScriptedUi {
    fn menu_loop(
        &mut self,
        title: &str,
        lines: &[String],
        _current: usize,
    ) -> Result<(usize, MenuAction)> {
        self.titles.push(title.to_string());
        self.lines.push(lines.to_vec());
        Ok(self.actions.pop_front().unwrap_or((0, MenuAction::Exit)))
    }

    fn message(&mut self, text: &str) -> Result<()> {
        self.messages.push(text.to_string());
        Ok(())
    }

    fn error(&mut self, text: &str) -> Result<()> {
        self.errors.push(text.to_string());
        Ok(())
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        self.prompts.push((prompt.to_string(), default));
        Ok(self.answers.pop_front().unwrap_or(default))
    }
}

#[derive(Default)]
struct RecordingPager {
    shown: Vec<(PathBuf, String, String)>,
}

impl Pager for RecordingPager {
    fn display(&mut self, path: &Path, title: &str) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        self.shown
            .push((path.to_path_buf(), title.to_string(), contents));
        Ok(())
    }
}

/// Records whether the report file is still open in this process while it
/// is displayed.
#[derive(Default)]
struct OpenFilePager {
    open: Option<bool>,
}

impl Pager for OpenFilePager {
    fn display(&mut self, path: &Path, _: &str) -> Result<()> {
        let real = std::fs::canonicalize(path)?;
        let open = std::fs::read_dir("/proc/self/fd")?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| std::fs::read_link(entry.path()).ok())
            .any(|target| target == path || target == real);
        self.open = Some(open);
        Ok(())
    }
}

struct FailingPager;

impl Pager for FailingPager {
    fn display(&mut self, _: &Path, _: &str) -> Result<()> {
        Err(Error::new("pager exited with status 1"))
    }
}

fn request() -> KeyRequest {
    KeyRequest {
        address: Some("alice@example.com".into()),
        label: "Alice".into(),
        app: KeyApplication::PGP,
    }
}

fn run(
    store: &KeyStore,
    policy: &SelectionPolicy,
    ui: &mut ScriptedUi,
    pager: &mut RecordingPager,
) -> KeySelection {
    select_key(store, &request(), policy, store, ui, pager).unwrap()
}

#[test]
fn test_crypto_select_strong_key() {
    let store = KeyStore::new(vec![
        pgp_key("Marginal <alice@example.com>", &fpr(1), Validity::Marginal),
        pgp_key("Alice <alice@example.com>", FPR, Validity::Ultimate),
    ]);
    let mut ui = ScriptedUi::new(&[(0, MenuAction::Select)], &[]);
    let mut pager = RecordingPager::default();
    let selection = run(&store, &SelectionPolicy::default(), &mut ui, &mut pager);
    assert_eq!(
        selection.key.as_ref().map(Key::uid),
        Some("Alice <alice@example.com>")
    );
    assert!(!selection.forced_valid);
    assert!(ui.prompts.is_empty());
    assert_eq!(ui.titles, vec!["PGP keys matching <alice@example.com>"]);
    assert_eq!(ui.lines[0].len(), 2);
    assert!(ui.lines[0][0].starts_with("   1 u "), "{:?}", ui.lines[0]);
    assert!(ui.lines[0][1].starts_with("   2 m "), "{:?}", ui.lines[0]);
}

#[test]
fn test_crypto_select_weak_key() {
    for (validity, warning) in [
        (Validity::Marginal, ID_MARGINAL_WARNING),
        (Validity::Never, ID_NOT_VALID_WARNING),
        (Validity::Unknown, ID_UNDEFINED_WARNING),
        (Validity::Undefined, ID_UNDEFINED_WARNING),
    ] {
        let store = KeyStore::new(vec![pgp_key("Alice", FPR, validity)]);
        // Declining stays in the list; the second attempt is accepted.
        let mut ui = ScriptedUi::new(
            &[(0, MenuAction::Select), (0, MenuAction::Select)],
            &[false, true],
        );
        let mut pager = RecordingPager::default();
        let selection = run(&store, &SelectionPolicy::default(), &mut ui, &mut pager);
        assert!(selection.key.is_some());
        assert!(!selection.forced_valid);
        assert_eq!(
            ui.prompts,
            vec![(warning.to_string(), false), (warning.to_string(), false)]
        );
        assert_eq!(ui.titles.len(), 2);
    }
}

#[test]
fn test_crypto_select_forced_valid() {
    let store = KeyStore::new(vec![pgp_key("Alice", FPR, Validity::Marginal)]);
    let policy = SelectionPolicy {
        legacy_override_semantics: true,
        ..SelectionPolicy::default()
    };
    let mut ui = ScriptedUi::new(&[(0, MenuAction::Select)], &[true]);
    let mut pager = RecordingPager::default();
    let selection = run(&store, &policy, &mut ui, &mut pager);
    assert!(selection.key.is_some());
    assert!(selection.forced_valid);

    // X.509 ids are always strong.
    let store = KeyStore::new(vec![x509_cert("CN=Alice", "AA01", None)]);
    let mut ui = ScriptedUi::new(&[(0, MenuAction::Select)], &[]);
    let selection = run(&store, &policy, &mut ui, &mut pager);
    assert!(selection.key.is_some());
    assert!(!selection.forced_valid);
    assert!(ui.prompts.is_empty());
}

#[test]
fn test_crypto_select_unusable_key() {
    let mut key = pgp_key("Alice", FPR, Validity::Full);
    key.flags |= KeyFlags::EXPIRED;
    let store = KeyStore::new(vec![key]);
    let policy = SelectionPolicy {
        show_unusable: true,
        ..SelectionPolicy::default()
    };
    let mut ui = ScriptedUi::new(&[(0, MenuAction::Select), (0, MenuAction::Exit)], &[]);
    let mut pager = RecordingPager::default();
    let selection = run(&store, &policy, &mut ui, &mut pager);
    assert_eq!(selection, KeySelection::default());
    assert_eq!(ui.errors, vec![KEY_UNUSABLE_MSG]);
    assert!(ui.prompts.is_empty());

    // Without trust checking anything goes.
    let policy = SelectionPolicy {
        show_unusable: true,
        strict_trust_check: false,
        ..SelectionPolicy::default()
    };
    let mut ui = ScriptedUi::new(&[(0, MenuAction::Select)], &[]);
    let selection = run(&store, &policy, &mut ui, &mut pager);
    assert!(selection.key.is_some());
    assert!(ui.errors.is_empty());

    // Hidden unusable keys.
    let mut ui = ScriptedUi::new(&[(0, MenuAction::Select)], &[]);
    let selection = run(&store, &SelectionPolicy::default(), &mut ui, &mut pager);
    assert_eq!(selection, KeySelection::default());
    assert_eq!(ui.errors, vec!["All matching keys are marked expired/revoked"]);
    assert!(ui.titles.is_empty());
}

#[test]
fn test_crypto_verify_and_view() {
    let leaf = x509_cert("CN=Leaf", "AA03", Some("AA01"));
    let root = x509_cert("CN=Root CA", "AA01", Some("AA01"));
    let store = KeyStore::new(vec![leaf, root]);
    let policy = SelectionPolicy {
        long_ids: false,
        sort: KeySort::new(SortMode::Address, false),
        ..SelectionPolicy::default()
    };
    let mut ui = ScriptedUi::new(
        &[
            (0, MenuAction::Verify),
            (1, MenuAction::ViewId),
            (7, MenuAction::Select),
            (1, MenuAction::Exit),
        ],
        &[],
    );
    let mut pager = RecordingPager::default();
    let request = KeyRequest {
        address: None,
        label: "Leaf".into(),
        app: KeyApplication::SMIME,
    };
    let selection = select_key(&store, &request, &policy, &store, &mut ui, &mut pager).unwrap();
    assert_eq!(selection, KeySelection::default());
    assert_eq!(ui.titles[0], "S/MIME keys matching \"Leaf\"");
    assert_eq!(ui.titles.len(), 4);
    assert_eq!(ui.messages, vec!["CN=Root CA"]);

    assert_eq!(pager.shown.len(), 1);
    let (path, title, contents) = &pager.shown[0];
    assert_eq!(title, "Key ID: 0xAA03");
    assert!(contents.starts_with("       Name: Leaf\n"));
    assert!(contents.contains("\n\n       Name: Root CA\n"));
    assert!(!path.exists());
}

#[test]
fn test_crypto_session_transitions() {
    let store = KeyStore::new(vec![pgp_key("Alice", FPR, Validity::Full)]);
    let policy = SelectionPolicy::default();
    let mut session = SelectionSession::new(&store, &request(), &policy).unwrap();
    let mut ui = ScriptedUi::default();
    let mut pager = RecordingPager::default();
    assert_eq!(session.state(), SessionState::Listing);
    assert_eq!(
        session
            .handle(3, MenuAction::Select, &store, &mut ui, &mut pager)
            .unwrap(),
        SessionState::Listing
    );
    assert_eq!(
        session
            .handle(0, MenuAction::Select, &store, &mut ui, &mut pager)
            .unwrap(),
        SessionState::Selected
    );
    // Terminal states are final.
    assert_eq!(
        session
            .handle(0, MenuAction::Exit, &store, &mut ui, &mut pager)
            .unwrap(),
        SessionState::Selected
    );
    assert_eq!(session.into_selection().key.unwrap().uid(), "Alice");

    // Pager failures are shown and the dialog goes on.
    let mut session = SelectionSession::new(&store, &request(), &policy).unwrap();
    assert_eq!(
        session
            .handle(0, MenuAction::Verify, &store, &mut ui, &mut FailingPager)
            .unwrap(),
        SessionState::Listing
    );
    assert_eq!(ui.errors, vec!["pager exited with status 1"]);

    let mut ui = ScriptedUi::new(&[(0, MenuAction::Verify), (0, MenuAction::Select)], &[]);
    let selection =
        select_key(&store, &request(), &policy, &store, &mut ui, &mut FailingPager).unwrap();
    assert_eq!(selection.key.as_ref().map(Key::uid), Some("Alice"));
    assert_eq!(ui.titles.len(), 2);
    assert_eq!(ui.errors, vec!["pager exited with status 1"]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_crypto_verify_report_closed() {
    let store = KeyStore::new(vec![pgp_key("Alice", FPR, Validity::Full)]);
    let policy = SelectionPolicy::default();
    let mut session = SelectionSession::new(&store, &request(), &policy).unwrap();
    let mut ui = ScriptedUi::default();
    let mut pager = OpenFilePager::default();
    session
        .handle(0, MenuAction::Verify, &store, &mut ui, &mut pager)
        .unwrap();
    assert_eq!(pager.open, Some(false));
    assert!(ui.errors.is_empty());
}

#[test]
fn test_crypto_validity_warning() {
    for validity in [Validity::Full, Validity::Ultimate] {
        assert_eq!(validity_warning(&pgp_key("Alice", FPR, validity)), None);
    }
    assert_eq!(
        validity_warning(&pgp_key("Alice", FPR, Validity::Marginal)),
        Some(ID_MARGINAL_WARNING)
    );
    let mut revoked = pgp_key("Alice", FPR, Validity::Ultimate);
    revoked.flags |= KeyFlags::REVOKED;
    assert_eq!(validity_warning(&revoked), Some(ID_UNUSABLE_WARNING));
    let mut cert = x509_cert("CN=Alice", "AA01", None);
    assert_eq!(validity_warning(&cert), None);
    cert.flags |= KeyFlags::EXPIRED;
    assert_eq!(validity_warning(&cert), None);
}

#[test]
fn test_crypto_request_title() {
    let mut request = KeyRequest {
        address: None,
        label: "Michael Elkins".into(),
        app: KeyApplication::PGP | KeyApplication::SMIME,
    };
    assert_eq!(
        request.title(),
        "PGP and S/MIME keys matching \"Michael Elkins\""
    );
    request.app = KeyApplication::empty();
    request.address = Some("me@mutt.org".into());
    assert_eq!(request.title(), "keys matching <me@mutt.org>");
}
