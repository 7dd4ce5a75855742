// Merkle Tree Certificates: batch issuance and persistence (C5).
//
// SPDX-License-Identifier: Apache-2.0

//! Ties the codec, assertion, tree, window and certificate layers together
//! into the operations an issuer and a certificate-serving process
//! actually need: build a batch ([`Batch::issue`]), persist it to three
//! flat files plus an atomically-swapped "latest" pointer
//! ([`Batch::write_to`], [`Batch::set_latest`]), and randomly access one
//! assertion or certificate out of a persisted batch by index
//! ([`Batch::read_assertion`], [`Batch::read_certificate`]), using
//! [`mtc_codec::Skip`] to avoid decoding everything ahead of the target.
//!
//! Grounded on `original_source/cli/utils.py`'s `save_batch`,
//! `read_validity_window`, `read_assertion`, and
//! `original_source/cli/batch.py`'s batch-directory layout
//! (`<root>/batches/<N>/{signed-validity-window,assertions,certificates}`
//! plus a `latest` pointer file), translated to operate on already-decoded
//! values rather than CLI arguments, PEM files or JSON — those remain
//! external collaborators per this crate's scope.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ed25519_dalek::Keypair;
use mtc_codec::{Decode, Encode, Skip};

use crate::assertion::{Assertion, Assertions};
use crate::certificate::{BikeshedCertificate, MerkleTreeProofSHA256, MerkleTreeTrustAnchor, Proof, ProofType, TrustAnchor};
use crate::hash::IssuerID;
use crate::merkle::{create_merkle_tree, create_merkle_tree_proofs};
use crate::window::{create_signed_validity_window, SignedValidityWindow};
use crate::Error;

/// The three artifacts produced by issuing one batch: the signed validity
/// window, the batch's assertions (as the wire-level
/// [`Assertions`](crate::assertion::Assertions) vector), and one
/// certificate per assertion, in assertion order.
pub struct IssuedBatch {
    /// The freshly signed validity window, extending `previous` by one
    /// batch.
    pub signed_validity_window: SignedValidityWindow,
    /// The batch's assertions, in the order supplied to [`Batch::issue`].
    pub assertions: Assertions,
    /// One certificate per assertion, in the same order.
    pub certificates: Vec<BikeshedCertificate>,
}

/// Namespace for batch issuance and persistence. Holds no state itself —
/// every batch's identity lives in the files under its directory.
pub struct Batch;

impl Batch {
    /// Builds the Merkle tree over `assertions`, signs its root into the
    /// sliding validity window (extending `previous`, or starting a new
    /// window if `previous` is `None`), and materializes one certificate
    /// per assertion.
    pub fn issue(
        assertions: &[Assertion],
        issuer_id: &IssuerID,
        batch_number: u32,
        keypair: &Keypair,
        previous: Option<&SignedValidityWindow>,
    ) -> Result<IssuedBatch, Error> {
        let nodes = create_merkle_tree(assertions, issuer_id, batch_number);
        let root = *nodes.last().expect("tree always has a root level").first().expect("root level has one node");
        let signed_validity_window =
            create_signed_validity_window(root, issuer_id, batch_number, keypair, previous)?;

        let paths = create_merkle_tree_proofs(&nodes, assertions.len());
        let certificates = assertions
            .iter()
            .cloned()
            .zip(paths)
            .enumerate()
            .map(|(index, (assertion, path))| {
                Ok(BikeshedCertificate {
                    assertion,
                    proof: Proof {
                        trust_anchor: TrustAnchor {
                            proof_type: ProofType::MerkleTreeSha256,
                            data: mtc_codec::Wrapped::new(MerkleTreeTrustAnchor {
                                issuer_id: issuer_id.clone(),
                                batch_number,
                            }),
                        },
                        data: mtc_codec::Wrapped::new(MerkleTreeProofSHA256 {
                            index: index as u64,
                            path: mtc_codec::Vector::new(path)?,
                        }),
                    },
                })
            })
            .collect::<Result<Vec<_>, mtc_codec::Error>>()?;

        Ok(IssuedBatch {
            signed_validity_window,
            assertions: Assertions::new(assertions.to_vec())?,
            certificates,
        })
    }

    /// Writes `issued`'s three artifacts under
    /// `<root>/batches/<batch_number>/`, where `batch_number` is taken from
    /// `issued.signed_validity_window.window.batch_number`.
    pub fn write_to(root: &Path, issued: &IssuedBatch) -> io::Result<()> {
        let dir = Self::batch_dir(root, issued.signed_validity_window.window.batch_number);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("signed-validity-window"), issued.signed_validity_window.to_vec())?;
        fs::write(dir.join("assertions"), issued.assertions.to_vec())?;

        let mut certificates = Vec::new();
        for certificate in &issued.certificates {
            certificate.encode(&mut certificates).expect("in-memory write cannot fail");
        }
        fs::write(dir.join("certificates"), certificates)?;
        Ok(())
    }

    /// Reads and decodes the signed validity window for `batch_number`.
    pub fn read_validity_window(root: &Path, batch_number: u32) -> Result<SignedValidityWindow, Error> {
        let bytes = fs::read(Self::batch_dir(root, batch_number).join("signed-validity-window"))?;
        Ok(mtc_codec::deserialize(&bytes)?)
    }

    /// Decodes the assertion at `index` within `batch_number`'s persisted
    /// assertion list, seeking past the `Assertions` vector's own length
    /// marker and then past `index` prior assertions via [`Skip`] rather
    /// than decoding the whole list.
    pub fn read_assertion(root: &Path, batch_number: u32, index: u64) -> Result<Assertion, Error> {
        let bytes = fs::read(Self::batch_dir(root, batch_number).join("assertions"))?;
        let mut cursor = io::Cursor::new(bytes);

        let mut marker = vec![0u8; Assertions::MARKER_WIDTH];
        io::Read::read_exact(&mut cursor, &mut marker)?;
        for _ in 0..index {
            Assertion::skip(&mut cursor)?;
        }
        Ok(Assertion::decode(&mut cursor)?)
    }

    /// Decodes the certificate at `index` within `batch_number`'s
    /// persisted certificate stream, seeking past `index` prior
    /// certificates via [`Skip`].
    pub fn read_certificate(root: &Path, batch_number: u32, index: u64) -> Result<BikeshedCertificate, Error> {
        let bytes = fs::read(Self::batch_dir(root, batch_number).join("certificates"))?;
        let mut cursor = io::Cursor::new(bytes);
        for _ in 0..index {
            BikeshedCertificate::skip(&mut cursor)?;
        }
        Ok(BikeshedCertificate::decode(&mut cursor)?)
    }

    /// Reads the "latest batch" pointer, if one has been set.
    pub fn latest_batch_number(root: &Path) -> Option<u32> {
        fs::read_to_string(root.join("latest")).ok()?.trim().parse().ok()
    }

    /// Atomically updates the "latest batch" pointer via rename-over-temp,
    /// so concurrent readers never observe a missing or partially written
    /// pointer file.
    pub fn set_latest(root: &Path, batch_number: u32) -> io::Result<()> {
        fs::create_dir_all(root)?;
        let tmp = root.join("latest.tmp");
        fs::write(&tmp, batch_number.to_string())?;
        fs::rename(tmp, root.join("latest"))
    }

    fn batch_dir(root: &Path, batch_number: u32) -> PathBuf {
        root.join("batches").join(batch_number.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assertion::create_assertion;
    use crate::certificate::verify_certificate;
    use crate::ip::IPv4Address;

    fn issuer() -> IssuerID { IssuerID::new(b"issuer".to_vec()).unwrap() }

    #[test]
    fn issue_write_read_round_trip() {
        let dir = std::env::temp_dir().join(format!("mtc-batch-test-{:?}", std::thread::current().id()));
        let _ = fs::remove_dir_all(&dir);

        let assertion =
            create_assertion(b"info".to_vec(), None, None, Some(vec![IPv4Address::new([1, 1, 1, 1])]), None)
                .unwrap();
        let assertions = vec![assertion; 5];
        let keypair = Keypair::generate(&mut rand::thread_rng());

        let issued = Batch::issue(&assertions, &issuer(), 0, &keypair, None).unwrap();
        Batch::write_to(&dir, &issued).unwrap();
        Batch::set_latest(&dir, 0).unwrap();

        assert_eq!(Batch::latest_batch_number(&dir), Some(0));

        let window = Batch::read_validity_window(&dir, 0).unwrap();
        for index in 0..5u64 {
            let assertion = Batch::read_assertion(&dir, 0, index).unwrap();
            assert_eq!(assertion, assertions[index as usize]);

            let certificate = Batch::read_certificate(&dir, 0, index).unwrap();
            verify_certificate(&certificate, &window, &issuer(), &keypair.public).unwrap();
        }

        fs::remove_dir_all(&dir).ok();
    }
}
