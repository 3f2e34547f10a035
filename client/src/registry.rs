//! Per-proposal voter registry.
//!
//! The registry stores commitments only; secrets never enter it. It answers
//! inclusion queries by recomputing the commitment from a secret, and can be
//! snapshotted to JSON so a registry rebuilt elsewhere yields the same root.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::field::{fr_from_bytes, fr_to_bytes, FieldError, FIELD_BYTES};
use crate::hasher::VoteHasher;
use crate::merkle::{MerkleError, VoterTree};

#[derive(Debug, Error)]
pub enum RegistryError
{
	#[error("secret has no registered commitment for this proposal")]
	NotRegistered,

	#[error(transparent)]
	Merkle(#[from] MerkleError),

	#[error(transparent)]
	Field(#[from] FieldError),

	#[error("snapshot io failure: {0}")]
	Io(#[from] std::io::Error),

	#[error("snapshot encoding failure: {0}")]
	Encoding(#[from] serde_json::Error),
}

/// Everything a voter needs to prove membership: the root their ballot must
/// verify against, plus the path witnesses for their leaf.
#[derive(Clone, Debug)]
pub struct RegistryProof
{
	pub voters_root: Fr,
	pub leaf_index: usize,
	pub siblings: Vec<Fr>,
	pub path_bits: Vec<bool>,
}

pub struct VoterRegistry
{
	proposal_id: u64,
	tree: VoterTree,
}

#[derive(Serialize, Deserialize)]
struct RegistrySnapshot
{
	proposal_id: u64,
	commitments: Vec<[u8; FIELD_BYTES]>,
}

impl VoterRegistry
{
	pub fn new(proposal_id: u64) -> Self
	{
		Self { proposal_id, tree: VoterTree::new() }
	}

	pub fn proposal_id(&self) -> u64
	{
		self.proposal_id
	}

	pub fn tree(&self) -> &VoterTree
	{
		&self.tree
	}

	pub fn len(&self) -> usize
	{
		self.tree.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.tree.is_empty()
	}

	/// Registers a commitment and returns its leaf index; idempotent.
	pub fn register(&mut self, commitment: Fr) -> Result<usize, MerkleError>
	{
		let index = self.tree.insert(commitment)?;
		log::debug!("registered commitment at leaf {index} for proposal {}", self.proposal_id);
		Ok(index)
	}

	pub fn root(&self, hasher: &VoteHasher) -> Fr
	{
		self.tree.compute_root(hasher)
	}

	/// Looks up the commitment derived from `secret` and assembles the
	/// membership witness for it.
	pub fn proof_for(&self, hasher: &VoteHasher, secret: Fr) -> Result<RegistryProof, RegistryError>
	{
		let commitment = hasher.commitment(secret);
		let leaf_index = self.tree.index_of(commitment).ok_or(RegistryError::NotRegistered)?;
		let path = self.tree.inclusion_proof(hasher, leaf_index)?;

		Ok(RegistryProof {
			voters_root: self.tree.compute_root(hasher),
			leaf_index,
			siblings: path.siblings,
			path_bits: path.path_bits,
		})
	}

	pub fn save<W: Write>(&self, writer: W) -> Result<(), RegistryError>
	{
		let snapshot = RegistrySnapshot {
			proposal_id: self.proposal_id,
			commitments: self.tree.leaves().iter().map(|leaf| fr_to_bytes(*leaf)).collect(),
		};
		serde_json::to_writer(writer, &snapshot)?;
		Ok(())
	}

	pub fn load<R: Read>(reader: R) -> Result<Self, RegistryError>
	{
		let snapshot: RegistrySnapshot = serde_json::from_reader(reader)?;
		let mut registry = Self::new(snapshot.proposal_id);
		for bytes in &snapshot.commitments
		{
			registry.tree.insert(fr_from_bytes(bytes)?)?;
		}
		Ok(registry)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn proves_membership_for_registered_secrets()
	{
		let hasher = VoteHasher::new();
		let mut registry = VoterRegistry::new(9);
		for secret in [111u64, 222, 333]
		{
			registry.register(hasher.commitment(Fr::from(secret))).unwrap();
		}

		let proof = registry.proof_for(&hasher, Fr::from(222u64)).unwrap();
		assert_eq!(proof.leaf_index, 1);
		assert_eq!(proof.voters_root, registry.root(&hasher));
		assert_eq!(
			crate::merkle::recompute_root(
				&hasher,
				hasher.commitment(Fr::from(222u64)),
				&crate::merkle::InclusionProof {
					siblings: proof.siblings.clone(),
					path_bits: proof.path_bits.clone(),
				},
			),
			proof.voters_root,
		);
	}

	#[test]
	fn unregistered_secret_is_refused()
	{
		let hasher = VoteHasher::new();
		let mut registry = VoterRegistry::new(9);
		registry.register(hasher.commitment(Fr::from(111u64))).unwrap();

		assert!(matches!(
			registry.proof_for(&hasher, Fr::from(999u64)),
			Err(RegistryError::NotRegistered),
		));
	}

	#[test]
	fn snapshot_round_trips_with_identical_root()
	{
		let hasher = VoteHasher::new();
		let mut registry = VoterRegistry::new(4);
		for secret in [5u64, 6, 7, 8, 9]
		{
			registry.register(hasher.commitment(Fr::from(secret))).unwrap();
		}

		let mut buffer = Vec::new();
		registry.save(&mut buffer).unwrap();
		let restored = VoterRegistry::load(buffer.as_slice()).unwrap();

		assert_eq!(restored.proposal_id(), 4);
		assert_eq!(restored.len(), registry.len());
		assert_eq!(restored.root(&hasher), registry.root(&hasher));
	}
}
