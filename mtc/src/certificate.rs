// Merkle Tree Certificates: trust anchors, proofs and certificate verification (C4, part 2).
//
// SPDX-License-Identifier: Apache-2.0

//! A [`BikeshedCertificate`] pairs one [`Assertion`] with a [`Proof`] of
//! its inclusion in a batch's Merkle tree. [`verify_certificate`]
//! implements the seven-step check binding a certificate to a signed
//! [`SignedValidityWindow`](crate::window::SignedValidityWindow): signature,
//! proof type, issuer, freshness, path recomputation, and root comparison.
//!
//! `TrustAnchor` and `Proof` each carry their type-specific payload
//! (`MerkleTreeTrustAnchor`, `MerkleTreeProofSHA256`) behind
//! [`Wrapped`](mtc_codec::Wrapped), the doubly-wrapped opaque container —
//! the outer opaque-vector length prefix is what lets [`Skip`] seek past a
//! certificate without decoding its proof body at all, which is how
//! [`crate::batch::Batch::read_certificate`] does random access into a
//! concatenated certificate stream.

use std::io;

use mtc_codec::{Decode, Encode, Error, Skip, Vector, Wrapped};

use crate::assertion::Assertion;
use crate::hash::{hash_assertion, hash_node, Distinguisher, HashHead, IssuerID, SHA256Hash};
use crate::window::{SignedValidityWindow, LabeledValidityWindow, VALIDITY_WINDOW_SIZE};

/// Which inclusion-proof format a [`TrustAnchor`]/[`Proof`] pair uses.
///
/// Unlike the fixed-admissible-value enums elsewhere in this crate
/// (generated by [`mtc_codec::wire_enum`]), `ProofType` accepts any u16 at
/// decode time rather than rejecting unrecognized values — the proof's
/// wire container is a [`Wrapped`] opaque blob that a relying party can
/// [`Skip`] without ever decoding, so an unrecognized type must still
/// decode successfully in order to skip past it. A relying party rejects
/// an unrecognized type semantically, via
/// [`crate::error::VerificationError::WrongProofType`] in
/// [`verify_certificate`], not at the wire layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProofType(pub u16);

impl ProofType {
    /// A SHA-256 Merkle inclusion proof — the only format this crate
    /// issues or verifies.
    pub const MerkleTreeSha256: ProofType = ProofType(0);
}

impl Encode for ProofType {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> { self.0.encode(w) }
}

impl Decode for ProofType {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> { Ok(ProofType(u16::decode(r)?)) }
}

impl Skip for ProofType {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> { u16::skip(r) }
}

/// The payload of a `merkle_tree_sha256` trust anchor: which issuer and
/// batch a certificate's proof is relative to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MerkleTreeTrustAnchor {
    /// The issuer that committed the batch.
    pub issuer_id: IssuerID,
    /// The batch this anchor refers to.
    pub batch_number: u32,
}

impl Encode for MerkleTreeTrustAnchor {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.issuer_id.encode(w)?;
        self.batch_number.encode(w)
    }
}

impl Decode for MerkleTreeTrustAnchor {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(MerkleTreeTrustAnchor { issuer_id: IssuerID::decode(r)?, batch_number: u32::decode(r)? })
    }
}

/// The payload of a `merkle_tree_sha256` proof: the leaf index and its
/// inclusion path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MerkleTreeProofSHA256 {
    /// The index of the committed assertion within its batch.
    pub index: u64,
    /// The sibling hashes from the leaf up to (but not including) the
    /// root, as produced by [`crate::merkle::create_merkle_tree_proof`].
    pub path: Vector<SHA256Hash, 0, 65535>,
}

impl Encode for MerkleTreeProofSHA256 {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.index.encode(w)?;
        self.path.encode(w)
    }
}

impl Decode for MerkleTreeProofSHA256 {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(MerkleTreeProofSHA256 { index: u64::decode(r)?, path: Vector::decode(r)? })
    }
}

/// `{proof_type, data}`: identifies which batch and issuer a certificate's
/// proof commits against.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrustAnchor {
    /// Which proof format `data` holds.
    pub proof_type: ProofType,
    /// The `merkle_tree_sha256` trust-anchor payload, doubly-wrapped in an
    /// opaque length-prefixed container (`TrustAnchorData`, 0..255 bytes).
    pub data: Wrapped<MerkleTreeTrustAnchor, 255>,
}

impl Encode for TrustAnchor {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.proof_type.encode(w)?;
        self.data.encode(w)
    }
}

impl Decode for TrustAnchor {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(TrustAnchor { proof_type: ProofType::decode(r)?, data: Wrapped::decode(r)? })
    }
}

impl Skip for TrustAnchor {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> {
        ProofType::skip(r)?;
        Wrapped::<MerkleTreeTrustAnchor, 255>::skip(r)
    }
}

/// `{trust_anchor, data}`: a trust anchor plus the inclusion-proof payload
/// it anchors.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Proof {
    /// Identifies the batch and issuer this proof is relative to.
    pub trust_anchor: TrustAnchor,
    /// The `merkle_tree_sha256` proof payload, doubly-wrapped in an opaque
    /// length-prefixed container (`ProofData`, 0..65535 bytes).
    pub data: Wrapped<MerkleTreeProofSHA256, 65535>,
}

impl Encode for Proof {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.trust_anchor.encode(w)?;
        self.data.encode(w)
    }
}

impl Decode for Proof {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(Proof { trust_anchor: TrustAnchor::decode(r)?, data: Wrapped::decode(r)? })
    }
}

impl Skip for Proof {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> {
        TrustAnchor::skip(r)?;
        Wrapped::<MerkleTreeProofSHA256, 65535>::skip(r)
    }
}

/// `{assertion, proof}`: one assertion together with its inclusion proof —
/// the unit of distribution to a relying party.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BikeshedCertificate {
    /// The committed assertion.
    pub assertion: Assertion,
    /// Its inclusion proof.
    pub proof: Proof,
}

impl Encode for BikeshedCertificate {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.assertion.encode(w)?;
        self.proof.encode(w)
    }
}

impl Decode for BikeshedCertificate {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(BikeshedCertificate { assertion: Assertion::decode(r)?, proof: Proof::decode(r)? })
    }
}

impl Skip for BikeshedCertificate {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> {
        Assertion::skip(r)?;
        Proof::skip(r)
    }
}

/// Verifies `cert` against `signed_window`, binding the check to
/// `expected_issuer_id` and `public_key` rather than trusting whatever
/// issuer id the certificate itself claims. Returns the first failure
/// encountered, per the seven numbered steps below.
pub fn verify_certificate(
    cert: &BikeshedCertificate,
    signed_window: &SignedValidityWindow,
    expected_issuer_id: &IssuerID,
    public_key: &ed25519_dalek::PublicKey,
) -> Result<(), crate::Error> {
    use ed25519_dalek::Verifier;

    // 1. Signature check, bound to the *expected* issuer id.
    let labeled = LabeledValidityWindow::new(expected_issuer_id.clone(), signed_window.window.clone());
    let signature = ed25519_dalek::Signature::from_bytes(signed_window.signature.as_bytes())
        .map_err(|_| crate::Error::InvalidSignature)?;
    public_key.verify(&labeled.to_vec(), &signature)?;

    // 2. Proof type must be the one this crate understands.
    if cert.proof.trust_anchor.proof_type != ProofType::MerkleTreeSha256 {
        return Err(crate::error::VerificationError::WrongProofType.into());
    }

    // 3. Issuer binding.
    let anchor = cert.proof.trust_anchor.data.get();
    if anchor.issuer_id.as_bytes() != expected_issuer_id.as_bytes() {
        return Err(crate::error::VerificationError::UnrecognizedIssuer.into());
    }

    // 4. Freshness: not from the future, not expired out of the window.
    let cert_batch = anchor.batch_number;
    let win_batch = signed_window.window.batch_number;
    if cert_batch > win_batch {
        return Err(crate::error::VerificationError::FromTheFuture(cert_batch, win_batch).into());
    }
    let retention_floor = win_batch.saturating_sub(VALIDITY_WINDOW_SIZE as u32);
    if cert_batch < retention_floor {
        return Err(crate::error::VerificationError::Expired(cert_batch, win_batch).into());
    }

    // 5. Recompute the leaf hash.
    let proof_data = cert.proof.data.get();
    let head_assertion = HashHead::new(Distinguisher::HashAssertionInput, expected_issuer_id.clone(), cert_batch);
    let mut h = hash_assertion(&head_assertion, proof_data.index, &cert.assertion);

    // 6. Walk the inclusion path back to the root.
    let head_node = HashHead::new(Distinguisher::HashNodeInput, expected_issuer_id.clone(), cert_batch);
    let mut index = proof_data.index;
    for (i, sibling) in proof_data.path.as_slice().iter().enumerate() {
        let (left, right) = if index & 1 == 1 { (*sibling, h) } else { (h, *sibling) };
        h = hash_node(&head_node, index >> 1, (i + 1) as u8, left, right);
        index >>= 1;
    }
    if index != 0 {
        return Err(crate::error::VerificationError::IncorrectPath.into());
    }

    // 7. Compare against the tree head recorded at this certificate's age.
    let offset = (win_batch - cert_batch) as usize;
    match signed_window.window.tree_heads.at(offset) {
        Some(root) if root == h => Ok(()),
        _ => Err(crate::error::VerificationError::RootMismatch.into()),
    }
}
