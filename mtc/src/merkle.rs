// Merkle Tree Certificates: tree builder and inclusion-proof extraction (C3).
//
// SPDX-License-Identifier: Apache-2.0

//! Builds the level-by-level binary hash tree committing a batch of
//! assertions, and extracts per-assertion inclusion proofs from it. For
//! `n` assertions the tree always has a fixed `l = n.bit_length() + 1`
//! levels, computed from `n` up front rather than from when a level
//! happens to shrink to one node. Every level except the last is padded
//! on the right with one distinguisher-tagged empty-node hash whenever
//! its natural node count is odd — including a level that naturally
//! lands at exactly 1 node, if that level is not yet the root. For
//! example at `n = 4`, `l = 4`: level 1 has 2 nodes (even, unpadded),
//! level 2 naturally has 1 node but gets padded to 2 since it is not
//! the final level, and level 3 is the single-node root built from
//! level 2's two (one real, one empty) nodes.
//!
//! The full level array ([`NodesList`]) is returned from
//! [`create_merkle_tree`] rather than just the root, so that many proofs
//! can be extracted from one build without recomputing internal hashes —
//! mirroring `commit_verify::merkle::merklize`'s divide-and-conquer
//! approach in spirit, though this builder proceeds level-by-level (as the
//! reference implementation does) rather than recursively, since the
//! iterative form makes the empty-node padding rule easier to state per
//! level.

use crate::assertion::Assertion;
use crate::hash::{hash_assertion, hash_empty, hash_node, Distinguisher, HashHead, IssuerID, SHA256Hash};

/// The full level array of a committed batch: `nodes[0]` is the (possibly
/// padded) leaf level, `nodes[nodes.len() - 1]` is the single-element root
/// level.
pub type NodesList = Vec<Vec<SHA256Hash>>;

/// Builds the Merkle tree committing `assertions` under `issuer_id` and
/// `batch_number`, returning the full level array.
///
/// Special cases: an empty batch (`assertions.is_empty()`) yields a
/// single-node tree whose root hashes an empty node at `(index=0,
/// level=0)`; a one-assertion batch yields a single-node tree whose root
/// hashes that one assertion at `index=0`.
pub fn create_merkle_tree(assertions: &[Assertion], issuer_id: &IssuerID, batch_number: u32) -> NodesList {
    let head_assertion = HashHead::new(Distinguisher::HashAssertionInput, issuer_id.clone(), batch_number);
    let head_empty = HashHead::new(Distinguisher::HashEmptyInput, issuer_id.clone(), batch_number);
    let head_node = HashHead::new(Distinguisher::HashNodeInput, issuer_id.clone(), batch_number);

    let n = assertions.len();
    if n == 0 {
        return vec![vec![hash_empty(&head_empty, 0, 0)]];
    }
    if n == 1 {
        return vec![vec![hash_assertion(&head_assertion, 0, &assertions[0])]];
    }

    // Avoid floating-point log2: the tree always has `l` levels, fixed up
    // front from `n`, never data-driven off when a level happens to reach
    // width 1.
    let l = (64 - (n as u64).leading_zeros()) as u8 + 1;

    let mut leaves: Vec<SHA256Hash> =
        assertions.iter().enumerate().map(|(j, a)| hash_assertion(&head_assertion, j as u64, a)).collect();
    if leaves.len() % 2 == 1 {
        leaves.push(hash_empty(&head_empty, leaves.len() as u64, 0));
    }

    let mut levels: NodesList = vec![leaves];
    for level_index in 1..l {
        let prev = levels.last().expect("checked non-empty above");
        let mut next: Vec<SHA256Hash> = (0..prev.len() / 2)
            .map(|j| hash_node(&head_node, j as u64, level_index, prev[2 * j], prev[2 * j + 1]))
            .collect();
        if next.len() % 2 == 1 && level_index != l - 1 {
            next.push(hash_empty(&head_empty, next.len() as u64, level_index));
        }
        levels.push(next);
    }
    levels
}

/// Extracts the inclusion path for assertion `index` from a tree built by
/// [`create_merkle_tree`]: the sibling hash at each level on the root-ward
/// walk from that leaf. The path has `nodes.len() - 1` entries.
pub fn create_merkle_tree_proof(nodes: &NodesList, index: u64) -> Vec<SHA256Hash> {
    (0..nodes.len().saturating_sub(1))
        .map(|level| {
            let sibling_index = ((index >> level) ^ 1) as usize;
            nodes[level][sibling_index]
        })
        .collect()
}

/// Extracts inclusion paths for every leaf in `nodes`' base level at once,
/// used by batch issuance to materialize all per-assertion proofs from one
/// tree build.
pub fn create_merkle_tree_proofs(nodes: &NodesList, leaf_count: usize) -> Vec<Vec<SHA256Hash>> {
    (0..leaf_count as u64).map(|index| create_merkle_tree_proof(nodes, index)).collect()
}
