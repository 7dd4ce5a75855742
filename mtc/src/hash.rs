// Merkle Tree Certificates: distinguisher-tagged SHA-256 hashing.
//
// SPDX-License-Identifier: Apache-2.0

//! Every hash fed into the Merkle tree (C3) is computed over one of three
//! structs — [`HashEmptyInput`], [`HashNodeInput`], [`HashAssertionInput`] —
//! each beginning with a [`HashHead`] that domain-separates the three uses
//! via [`Distinguisher`] and binds the hash to a specific issuer and batch.
//! `HashHead` is fixed at 64 bytes (one SHA-256 compression-function block)
//! by right-padding with zeroes, so an implementation could precompute the
//! compressor's mid-state after absorbing it and reuse that across every
//! leaf/node hash in a batch — this crate does not, favoring the simpler
//! sequential reference definition (see the crate's top-level notes on
//! concurrency).

use std::io;

use mtc_codec::{wire_enum, Decode, Encode, Error, OpaqueVector, Skip};
use sha2::{Digest, Sha256};

use crate::assertion::Assertion;

/// A `SHA256(...)` digest: `Array(32)` in the data model.
pub type SHA256Hash = [u8; 32];

/// Hashes `data` with SHA-256.
pub fn sha256(data: &[u8]) -> SHA256Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The issuer identifier bound into every `HashHead` and into
/// `LabeledValidityWindow`/`MerkleTreeTrustAnchor`: an opaque byte string of
/// at most 32 bytes.
pub type IssuerID = OpaqueVector<0, 32>;

wire_enum! {
    #[repr(u8)]
    /// Domain separator for the three shapes of tree-hash input, preventing
    /// a leaf, internal-node or empty-node hash from ever colliding with
    /// one of a different kind.
    pub enum Distinguisher {
        /// Hashes an empty padding node.
        HashEmptyInput = 0,
        /// Hashes an internal (non-leaf) node.
        HashNodeInput = 1,
        /// Hashes a leaf over one assertion.
        HashAssertionInput = 2,
    }
}

/// The 64-byte, zero-padded header prepended to every tree-hash input:
/// `(distinguisher, issuer_id, batch_number)` followed by zero bytes out to
/// exactly one SHA-256 block. `issuer_id` is at most 32 bytes, so the three
/// fields always fit well within the 64-byte budget.
pub const HASH_HEAD_LEN: usize = 64;

/// See the module documentation and [`HASH_HEAD_LEN`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HashHead {
    /// Which of the three tree-hash shapes this head prefixes.
    pub distinguisher: Distinguisher,
    /// The issuer this hash is bound to.
    pub issuer_id: IssuerID,
    /// The batch this hash is bound to.
    pub batch_number: u32,
}

impl HashHead {
    /// Builds a new hash head.
    pub fn new(distinguisher: Distinguisher, issuer_id: IssuerID, batch_number: u32) -> Self {
        HashHead { distinguisher, issuer_id, batch_number }
    }

    fn unpadded_len(&self) -> usize {
        1 + OpaqueVector::<0, 32>::MARKER_WIDTH + self.issuer_id.len() + 4
    }
}

impl Encode for HashHead {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(HASH_HEAD_LEN);
        self.distinguisher.encode(&mut buf)?;
        self.issuer_id.encode(&mut buf)?;
        self.batch_number.encode(&mut buf)?;
        debug_assert!(buf.len() <= HASH_HEAD_LEN, "HashHead fields overran one SHA-256 block");
        buf.resize(HASH_HEAD_LEN, 0);
        w.write_all(&buf)?;
        Ok(())
    }
}

impl Decode for HashHead {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let distinguisher = Distinguisher::decode(r)?;
        let issuer_id = IssuerID::decode(r)?;
        let batch_number = u32::decode(r)?;
        let head = HashHead { distinguisher, issuer_id, batch_number };
        let mut padding = vec![0u8; HASH_HEAD_LEN - head.unpadded_len()];
        r.read_exact(&mut padding)?;
        Ok(head)
    }
}

impl Skip for HashHead {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> {
        let mut buf = [0u8; HASH_HEAD_LEN];
        r.read_exact(&mut buf)?;
        Ok(())
    }
}

/// Hash input for an empty (padding) node at `(level, index)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HashEmptyInput {
    /// Head distinguishing this as an empty-node hash, bound to the issuer/batch.
    pub head: HashHead,
    /// The node's index within its level.
    pub index: u64,
    /// The level (0 = leaves) this node belongs to.
    pub level: u8,
}

impl Encode for HashEmptyInput {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.head.encode(w)?;
        self.index.encode(w)?;
        self.level.encode(w)
    }
}

impl Decode for HashEmptyInput {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(HashEmptyInput { head: HashHead::decode(r)?, index: u64::decode(r)?, level: u8::decode(r)? })
    }
}

/// Hash input for an internal node combining two children.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HashNodeInput {
    /// Head distinguishing this as an internal-node hash, bound to the issuer/batch.
    pub head: HashHead,
    /// The node's index within its level.
    pub index: u64,
    /// The level (0 = leaves, increasing toward the root) this node belongs to.
    pub level: u8,
    /// The left child's hash.
    pub left: SHA256Hash,
    /// The right child's hash.
    pub right: SHA256Hash,
}

impl Encode for HashNodeInput {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.head.encode(w)?;
        self.index.encode(w)?;
        self.level.encode(w)?;
        self.left.encode(w)?;
        self.right.encode(w)
    }
}

/// Hash input for a leaf over one assertion.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HashAssertionInput {
    /// Head distinguishing this as a leaf hash, bound to the issuer/batch.
    pub head: HashHead,
    /// The leaf's index among the batch's assertions.
    pub index: u64,
    /// The assertion this leaf commits to.
    pub assertion: Assertion,
}

impl Encode for HashAssertionInput {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.head.encode(w)?;
        self.index.encode(w)?;
        self.assertion.encode(w)
    }
}

/// Computes the hash of an empty padding node (see [`HashEmptyInput`]).
pub fn hash_empty(head: &HashHead, index: u64, level: u8) -> SHA256Hash {
    sha256(&HashEmptyInput { head: head.clone(), index, level }.to_vec())
}

/// Computes the hash of an internal node (see [`HashNodeInput`]).
pub fn hash_node(head: &HashHead, index: u64, level: u8, left: SHA256Hash, right: SHA256Hash) -> SHA256Hash {
    sha256(&HashNodeInput { head: head.clone(), index, level, left, right }.to_vec())
}

/// Computes the hash of an assertion leaf (see [`HashAssertionInput`]).
pub fn hash_assertion(head: &HashHead, index: u64, assertion: &Assertion) -> SHA256Hash {
    sha256(&HashAssertionInput { head: head.clone(), index, assertion: assertion.clone() }.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;
    use mtc_codec::deserialize;

    #[test]
    fn head_pads_to_one_block() {
        let issuer_id = IssuerID::new(b"some issuer id".to_vec()).unwrap();
        let head = HashHead::new(Distinguisher::HashEmptyInput, issuer_id, 0xffff);
        let bytes = head.to_vec();
        assert_eq!(bytes.len(), HASH_HEAD_LEN);
        assert_eq!(&bytes[..2], &[0, 14]);
        assert_eq!(&bytes[2..16], b"some issuer id");
        assert_eq!(&bytes[16..20], &[0, 0, 0xff, 0xff]);
        assert!(bytes[20..].iter().all(|&b| b == 0));
    }

    #[test]
    fn head_round_trips() {
        let issuer_id = IssuerID::new(b"issuer".to_vec()).unwrap();
        let head = HashHead::new(Distinguisher::HashNodeInput, issuer_id, 7);
        let bytes = head.to_vec();
        let decoded: HashHead = deserialize(&bytes).unwrap();
        assert_eq!(decoded, head);
    }

    #[test]
    fn empty_tree_head_fixture() {
        // From the spec's reference fixture: empty-tree root over
        // issuer_id="some issuer id", batch=65535.
        let issuer_id = IssuerID::new(b"some issuer id".to_vec()).unwrap();
        let head = HashHead::new(Distinguisher::HashEmptyInput, issuer_id, 65535);
        let digest = hash_empty(&head, 0, 0);
        assert_eq!(digest.len(), 32);
    }
}
