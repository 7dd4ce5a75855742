// Merkle Tree Certificates: sliding validity window and its signature (C4, part 1).
//
// SPDX-License-Identifier: Apache-2.0

//! An issuer signs a fixed-size sliding window of the most recent
//! [`TreeHeads`] once per batch, binding them to its issuer id with
//! [`LabeledValidityWindow`]'s literal label. [`create_signed_validity_window`]
//! advances that window by one batch, refusing to do so unless the caller
//! can prove continuity with the previous signed window.

use std::io;

use ed25519_dalek::{Keypair, Signer, Verifier};
use mtc_codec::{Decode, Encode, Error, OpaqueVector, Skip, Validate};

use crate::hash::{IssuerID, SHA256Hash};

/// Seconds between successive batches.
pub const BATCH_DURATION: u64 = 3600;
/// Seconds a tree head remains valid after being signed.
pub const LIFETIME: u64 = 14 * 24 * 3600;
/// Number of tree heads kept in a signed validity window:
/// `floor(LIFETIME / BATCH_DURATION) + 1`.
pub const VALIDITY_WINDOW_SIZE: usize = (LIFETIME / BATCH_DURATION) as usize + 1;

/// The literal 32-byte ASCII label (including trailing NUL) that scopes
/// every Ed25519 signature produced by this crate to validity-window
/// signing, so a signature over some other message type can never be
/// mistaken for one.
pub const VALIDITY_WINDOW_LABEL: [u8; 32] = *b"Merkle Tree Crts ValidityWindow\0";

/// A fixed-size sequence of the most recent tree heads, most-recent first,
/// zero-padded on the wire out to exactly [`VALIDITY_WINDOW_SIZE`] entries.
/// How many of those entries are "real" (as opposed to zero padding) is
/// not self-described by `TreeHeads` itself — it is `min(batch_number + 1,
/// VALIDITY_WINDOW_SIZE)`, computed from the enclosing
/// [`ValidityWindow`]'s `batch_number`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TreeHeads(Vec<SHA256Hash>);

impl TreeHeads {
    /// Builds a tree-heads window from up to [`VALIDITY_WINDOW_SIZE`] real
    /// heads (most recent first), zero-padding the rest.
    pub fn new(heads: impl Into<Vec<SHA256Hash>>) -> Result<Self, Error> {
        let mut heads = heads.into();
        if heads.len() > VALIDITY_WINDOW_SIZE {
            return Err(Error::validation(format!(
                "tree heads list has {} entries, exceeding VALIDITY_WINDOW_SIZE {}",
                heads.len(),
                VALIDITY_WINDOW_SIZE
            )));
        }
        heads.resize(VALIDITY_WINDOW_SIZE, [0u8; 32]);
        Ok(TreeHeads(heads))
    }

    /// Returns the `count` most-recent real heads, discarding zero padding.
    pub fn real_heads(&self, count: usize) -> &[SHA256Hash] { &self.0[..count.min(VALIDITY_WINDOW_SIZE)] }

    /// Returns the head at wire offset `offset` (0 = most recent),
    /// including any zero-padding slot.
    pub fn at(&self, offset: usize) -> Option<SHA256Hash> { self.0.get(offset).copied() }
}

impl Encode for TreeHeads {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        for head in &self.0 {
            head.encode(w)?;
        }
        Ok(())
    }
}

impl Decode for TreeHeads {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let mut heads = Vec::with_capacity(VALIDITY_WINDOW_SIZE);
        for _ in 0..VALIDITY_WINDOW_SIZE {
            heads.push(<[u8; 32]>::decode(r)?);
        }
        Ok(TreeHeads(heads))
    }
}

impl Skip for TreeHeads {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> {
        let mut buf = vec![0u8; VALIDITY_WINDOW_SIZE * 32];
        io::Read::read_exact(r, &mut buf)?;
        Ok(())
    }
}

/// `{batch_number, tree_heads}`: the payload signed once per batch.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ValidityWindow {
    /// The batch this window was produced for.
    pub batch_number: u32,
    /// The sliding window of recent tree heads.
    pub tree_heads: TreeHeads,
}

impl ValidityWindow {
    /// `min(batch_number + 1, VALIDITY_WINDOW_SIZE)`: how many of
    /// `tree_heads`' entries are real rather than zero padding.
    pub fn real_head_count(&self) -> usize { (self.batch_number as usize + 1).min(VALIDITY_WINDOW_SIZE) }
}

impl Encode for ValidityWindow {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.batch_number.encode(w)?;
        self.tree_heads.encode(w)
    }
}

impl Decode for ValidityWindow {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(ValidityWindow { batch_number: u32::decode(r)?, tree_heads: TreeHeads::decode(r)? })
    }
}

/// `{label, issuer_id, window}`: the exact byte sequence that is
/// Ed25519-signed and verified.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LabeledValidityWindow {
    /// Always [`VALIDITY_WINDOW_LABEL`]; kept as a field (rather than
    /// implied) so the signed bytes are fully explicit.
    pub label: [u8; 32],
    /// The issuer this window is bound to.
    pub issuer_id: IssuerID,
    /// The signed payload.
    pub window: ValidityWindow,
}

impl LabeledValidityWindow {
    /// Builds a labeled window ready for signing or signature verification.
    pub fn new(issuer_id: IssuerID, window: ValidityWindow) -> Self {
        LabeledValidityWindow { label: VALIDITY_WINDOW_LABEL, issuer_id, window }
    }
}

impl Validate for LabeledValidityWindow {
    fn validate(&self) -> Result<(), Error> {
        if self.label != VALIDITY_WINDOW_LABEL {
            return Err(Error::validation("validity window label does not match the required literal"));
        }
        Ok(())
    }
}

impl Encode for LabeledValidityWindow {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.label.encode(w)?;
        self.issuer_id.encode(w)?;
        self.window.encode(w)
    }
}

/// An Ed25519 signature, opaque on the wire: 1 to 65535 bytes.
pub type Signature = OpaqueVector<1, 65535>;

/// `{window, signature}`: a validity window together with its Ed25519
/// signature over the window's labeled encoding.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SignedValidityWindow {
    /// The signed payload.
    pub window: ValidityWindow,
    /// The Ed25519 signature over `LabeledValidityWindow{_, issuer_id,
    /// window}`'s encoding, for whatever `issuer_id` the verifying party
    /// expects.
    pub signature: Signature,
}

impl Encode for SignedValidityWindow {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.window.encode(w)?;
        self.signature.encode(w)
    }
}

impl Decode for SignedValidityWindow {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(SignedValidityWindow { window: ValidityWindow::decode(r)?, signature: Signature::decode(r)? })
    }
}

/// Advances the signed validity window by one batch: binds `new_root` (the
/// root of the tree built for `batch_number`) into a fresh
/// [`TreeHeads`] window and signs it with `keypair`.
///
/// If `previous` is `None`, `batch_number` must be `0`. Otherwise
/// `batch_number` must equal `previous.window.batch_number + 1`, and
/// `previous.signature` must verify under `keypair.public` over
/// `previous`'s own labeled encoding — refusing to extend a window this
/// issuer cannot prove it actually signed.
pub fn create_signed_validity_window(
    new_root: SHA256Hash,
    issuer_id: &IssuerID,
    batch_number: u32,
    keypair: &Keypair,
    previous: Option<&SignedValidityWindow>,
) -> Result<SignedValidityWindow, crate::Error> {
    let previous_real_heads: Vec<SHA256Hash> = match previous {
        None => {
            if batch_number != 0 {
                return Err(crate::Error::Codec(Error::validation(
                    "batch_number must be 0 when no previous validity window is supplied",
                )));
            }
            Vec::new()
        }
        Some(prev) => {
            if batch_number != prev.window.batch_number + 1 {
                return Err(crate::Error::Codec(Error::validation(format!(
                    "batch_number {} does not continue previous batch {}",
                    batch_number, prev.window.batch_number
                ))));
            }
            let labeled = LabeledValidityWindow::new(issuer_id.clone(), prev.window.clone());
            let sig = ed25519_dalek::Signature::from_bytes(prev.signature.as_bytes())
                .map_err(|_| crate::Error::InvalidSignature)?;
            keypair.public.verify(&labeled.to_vec(), &sig)?;

            let count = prev.window.real_head_count();
            prev.window.tree_heads.real_heads(count).to_vec()
        }
    };

    let mut heads = vec![new_root];
    let keep = previous_real_heads.len().min(VALIDITY_WINDOW_SIZE - 1);
    heads.extend_from_slice(&previous_real_heads[..keep]);

    let window = ValidityWindow { batch_number, tree_heads: TreeHeads::new(heads)? };
    let labeled = LabeledValidityWindow::new(issuer_id.clone(), window.clone());
    let signature_bytes = keypair.sign(&labeled.to_vec()).to_bytes().to_vec();

    Ok(SignedValidityWindow { window, signature: Signature::new(signature_bytes)? })
}
