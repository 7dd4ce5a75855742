// Merkle Tree Certificates: end-to-end batch issuance and verification.
//
// SPDX-License-Identifier: Apache-2.0

//! Drives the full issuer/relying-party workflow through [`mtc::batch::Batch`]
//! — issue, persist, read back, verify — across several successive batches,
//! and checks the freshness boundaries from spec.md §8 scenario 6 against a
//! persisted, multi-batch window rather than a single in-memory one.

use std::fs;

use ed25519_dalek::Keypair;

use mtc::assertion::create_assertion;
use mtc::batch::Batch;
use mtc::certificate::verify_certificate;
use mtc::error::VerificationError;
use mtc::hash::IssuerID;
use mtc::ip::IPv4Address;
use mtc::window::VALIDITY_WINDOW_SIZE;
use mtc::Error;

fn issuer() -> IssuerID { IssuerID::new(b"some issuer id".to_vec()).unwrap() }

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("mtc-lifecycle-{name}-{:?}", std::thread::current().id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn ten_identical_assertions_all_verify() {
    // spec.md §8 scenario 1.
    let assertion =
        create_assertion(b"info".to_vec(), None, None, Some(vec![IPv4Address::new([192, 168, 1, 1])]), None)
            .unwrap();
    let assertions = vec![assertion; 10];
    let keypair = Keypair::generate(&mut rand::thread_rng());

    let issued = Batch::issue(&assertions, &issuer(), 0, &keypair, None).unwrap();
    for cert in &issued.certificates {
        verify_certificate(cert, &issued.signed_validity_window, &issuer(), &keypair.public).unwrap();
    }
}

#[test]
fn successive_batches_persist_and_stay_verifiable() {
    let dir = scratch_dir("successive");
    let keypair = Keypair::generate(&mut rand::thread_rng());

    let mut previous = None;
    let mut per_batch_assertions = Vec::new();
    for batch_number in 0..3u32 {
        let subject = format!("subject-{batch_number}");
        let assertion =
            create_assertion(subject.into_bytes(), None, None, Some(vec![IPv4Address::new([10, 0, 0, batch_number as u8])]), None)
                .unwrap();
        let assertions = vec![assertion; 4];

        let issued = Batch::issue(&assertions, &issuer(), batch_number, &keypair, previous.as_ref()).unwrap();
        Batch::write_to(&dir, &issued).unwrap();
        Batch::set_latest(&dir, batch_number).unwrap();

        per_batch_assertions.push(assertions);
        previous = Some(issued.signed_validity_window);
    }

    assert_eq!(Batch::latest_batch_number(&dir), Some(2));

    // The most recent window verifies every certificate issued in any of
    // the three batches (batch 0's offset is 2, batch 1's is 1, batch 2's
    // is 0), demonstrating that old certificates remain valid as long as
    // their batch is still inside the window.
    let latest_window = Batch::read_validity_window(&dir, 2).unwrap();
    for batch_number in 0..3u32 {
        for index in 0..4u64 {
            let certificate = Batch::read_certificate(&dir, batch_number, index).unwrap();
            let assertion = Batch::read_assertion(&dir, batch_number, index).unwrap();
            assert_eq!(assertion, per_batch_assertions[batch_number as usize][index as usize]);
            verify_certificate(&certificate, &latest_window, &issuer(), &keypair.public).unwrap();
        }
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn certificate_from_the_future_is_rejected() {
    // spec.md §8 scenario 6, second half: a certificate from batch 6
    // checked against a window from batch 5.
    let dir = scratch_dir("future");
    let keypair = Keypair::generate(&mut rand::thread_rng());

    let assertion =
        create_assertion(b"info".to_vec(), None, None, Some(vec![IPv4Address::new([1, 1, 1, 1])]), None).unwrap();

    let mut previous = None;
    let mut windows = Vec::new();
    for batch_number in 0..=6u32 {
        let issued = Batch::issue(&[assertion.clone()], &issuer(), batch_number, &keypair, previous.as_ref()).unwrap();
        Batch::write_to(&dir, &issued).unwrap();
        windows.push(issued.signed_validity_window.clone());
        previous = Some(issued.signed_validity_window);
    }

    let cert_from_batch_6 = Batch::read_certificate(&dir, 6, 0).unwrap();
    let window_from_batch_5 = windows[5].clone();

    let err = verify_certificate(&cert_from_batch_6, &window_from_batch_5, &issuer(), &keypair.public).unwrap_err();
    assert!(matches!(err, Error::Verification(VerificationError::FromTheFuture(6, 5))));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn certificate_older_than_the_retention_floor_is_expired() {
    // spec.md §8 scenario 6, first half: a certificate from batch 5
    // checked against a window far enough ahead that batch 5 has fallen
    // out the back of the sliding window. One batch beyond
    // `5 + VALIDITY_WINDOW_SIZE` (rather than exactly at it) to land
    // strictly past the retention floor `win_batch - VALIDITY_WINDOW_SIZE`:
    // at exactly `VALIDITY_WINDOW_SIZE` batches of age the certificate's
    // root has already scrolled out of `tree_heads`, but the freshness
    // check (mirroring `original_source/mtc/certificate.py`'s
    // `max(window_batch_number - VALIDITY_WINDOW_SIZE, 0)`) only rejects
    // ages strictly greater than that — see DESIGN.md.
    let dir = scratch_dir("expired");
    let keypair = Keypair::generate(&mut rand::thread_rng());
    let assertion =
        create_assertion(b"info".to_vec(), None, None, Some(vec![IPv4Address::new([1, 1, 1, 1])]), None).unwrap();

    let mut previous = None;
    let mut certificate_from_batch_5 = None;
    let last_batch = 5 + VALIDITY_WINDOW_SIZE as u32 + 1;
    for batch_number in 0..=last_batch {
        let issued = Batch::issue(&[assertion.clone()], &issuer(), batch_number, &keypair, previous.as_ref()).unwrap();
        Batch::write_to(&dir, &issued).unwrap();
        if batch_number == 5 {
            certificate_from_batch_5 = Some(Batch::read_certificate(&dir, 5, 0).unwrap());
        }
        previous = Some(issued.signed_validity_window);
    }

    let final_window = previous.unwrap();
    let err = verify_certificate(&certificate_from_batch_5.unwrap(), &final_window, &issuer(), &keypair.public)
        .unwrap_err();
    assert!(matches!(err, Error::Verification(VerificationError::Expired(5, batch)) if batch == last_batch));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn tampering_any_single_byte_of_a_persisted_certificate_breaks_verification() {
    let dir = scratch_dir("tamper");
    let keypair = Keypair::generate(&mut rand::thread_rng());
    let assertion =
        create_assertion(b"info".to_vec(), None, None, Some(vec![IPv4Address::new([8, 8, 8, 8])]), None).unwrap();
    let assertions = vec![assertion; 3];

    let issued = Batch::issue(&assertions, &issuer(), 0, &keypair, None).unwrap();
    Batch::write_to(&dir, &issued).unwrap();

    let window = issued.signed_validity_window.clone();
    let mut good = Batch::read_certificate(&dir, 0, 1).unwrap();
    verify_certificate(&good, &window, &issuer(), &keypair.public).unwrap();

    good.assertion = create_assertion(b"tampered".to_vec(), None, None, None, None).unwrap();
    assert!(verify_certificate(&good, &window, &issuer(), &keypair.public).is_err());
}
