// Merkle Tree Certificates: external-interface wire fixtures.
//
// SPDX-License-Identifier: Apache-2.0

//! Exercises the two reference fixtures from this crate's external
//! interfaces against bytes built by hand, rather than through
//! [`mtc::assertion::create_assertion`] or [`mtc::hash::hash_empty`] — the
//! point is to pin the wire format itself, independent of whichever helper
//! happens to produce it.

use mtc_codec::{serialize, Decode, OpaqueVector, Vector};

use mtc::assertion::{Assertion, Claim, ClaimList, SubjectInfo, SubjectType};
use mtc::hash::{sha256, Distinguisher, HashEmptyInput, HashHead, IssuerID};
use mtc::ip::IPv4Address;
use mtc::assertion::{DNSName, DNSNameList, IPv4AddressList};

#[test]
fn assertion_fixture_encodes_to_77_bytes() {
    // subject_info = "some subject info", claims = [ipv4: [1.1.1.1,
    // 1.2.3.4], dns: ["cloudflare.com", "cloudflareresearch.com"]], built
    // directly (not via create_assertion, whose fixed claim ordering would
    // put dns first).
    let ipv4 = Claim::Ipv4(IPv4AddressList::new(vec![
        IPv4Address::new([1, 1, 1, 1]),
        IPv4Address::new([1, 2, 3, 4]),
    ])
    .unwrap());
    let dns = Claim::Dns(
        DNSNameList::new(vec![
            DNSName::new(b"cloudflare.com".to_vec()).unwrap(),
            DNSName::new(b"cloudflareresearch.com".to_vec()).unwrap(),
        ])
        .unwrap(),
    );
    let assertion = Assertion {
        subject_type: SubjectType::Tls,
        subject_info: SubjectInfo::new(b"some subject info".to_vec()).unwrap(),
        claims: ClaimList::new(vec![ipv4, dns]).unwrap(),
    };

    let bytes = serialize(&assertion);
    assert_eq!(bytes.len(), 77);

    let mut expected = Vec::new();
    expected.extend_from_slice(&[0x00, 0x00]); // SubjectType::Tls
    expected.extend_from_slice(&[0x00, 0x11]); // SubjectInfo length = 17
    expected.extend_from_slice(b"some subject info");
    expected.extend_from_slice(&[0x00, 0x36]); // ClaimList byte length = 54
    expected.extend_from_slice(&[0x00, 0x02]); // ClaimType::Ipv4
    expected.extend_from_slice(&[0x00, 0x08]); // IPv4AddressList byte length = 8
    expected.extend_from_slice(&[1, 1, 1, 1]);
    expected.extend_from_slice(&[1, 2, 3, 4]);
    expected.extend_from_slice(&[0x00, 0x00]); // ClaimType::Dns
    expected.extend_from_slice(&[0x00, 0x26]); // DNSNameList byte length = 38
    expected.push(14);
    expected.extend_from_slice(b"cloudflare.com");
    expected.push(22);
    expected.extend_from_slice(b"cloudflareresearch.com");

    assert_eq!(bytes, expected);

    let decoded = Assertion::decode(&mut std::io::Cursor::new(&bytes)).unwrap();
    assert_eq!(serialize(&decoded), bytes);
}

#[test]
fn empty_tree_root_fixture_hashes_the_documented_64_byte_block() {
    // From spec.md §6: an empty-tree root over issuer_id="some issuer id",
    // batch=65535 hashes the 64-byte block `00 0e "some issuer id" 00 00
    // ff ff` zero-padded, followed by an 8-byte index=0 and a 1-byte
    // level=0.
    let issuer_id = IssuerID::new(b"some issuer id".to_vec()).unwrap();
    let head = HashHead::new(Distinguisher::HashEmptyInput, issuer_id, 65535);
    let head_bytes = serialize(&head);

    let mut expected_head = Vec::new();
    expected_head.extend_from_slice(&[0x00]); // Distinguisher::HashEmptyInput
    expected_head.extend_from_slice(&[0x0e]); // IssuerID length = 14
    expected_head.extend_from_slice(b"some issuer id");
    expected_head.extend_from_slice(&[0x00, 0x00, 0xff, 0xff]); // batch_number = 65535
    expected_head.resize(64, 0);
    assert_eq!(head_bytes, expected_head);

    let input = HashEmptyInput { head: head.clone(), index: 0, level: 0 };
    let input_bytes = serialize(&input);
    assert_eq!(input_bytes.len(), 64 + 8 + 1);

    let mut expected_input = expected_head;
    expected_input.extend_from_slice(&0u64.to_be_bytes());
    expected_input.push(0);
    assert_eq!(input_bytes, expected_input);

    assert_eq!(sha256(&input_bytes), mtc::hash::hash_empty(&head, 0, 0));
}

#[test]
fn issuer_id_marker_width_is_one_byte() {
    // IssuerID is bounded 0..32, so its length prefix is always one byte
    // wide (spec.md §3's OpaqueVector marker-width rule).
    assert_eq!(IssuerID::MARKER_WIDTH, 1);
    let _: OpaqueVector<0, 32> = IssuerID::new(vec![]).unwrap();
}

#[test]
fn claim_list_accepts_empty() {
    let claims = ClaimList::new(Vec::<Claim>::new()).unwrap();
    assert!(claims.as_slice().is_empty());
    assert_eq!(serialize(&claims), vec![0x00, 0x00]);
}

#[test]
fn merkle_proof_path_vector_uses_two_byte_marker() {
    // `Vector<SHA256, 0, 65535>` (the proof's `path` field) shares the
    // same 2-byte marker width as the other 16-bit-bounded vectors.
    assert_eq!(Vector::<[u8; 32], 0, 65535>::MARKER_WIDTH, 2);
}
