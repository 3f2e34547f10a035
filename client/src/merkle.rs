//! Append-only voter commitment tree of fixed depth twenty.
//!
//! The root is computed in two phases: the leaf level is zero-padded to the
//! next power of two and folded pairwise, then the running node is hashed
//! against the zero element until exactly [`TREE_DEPTH`] levels have been
//! applied. Inclusion proofs always carry [`TREE_DEPTH`] siblings regardless
//! of how many voters are registered.

use ark_bn254::Fr;
use ark_ff::Zero;
use thiserror::Error;

use crate::hasher::VoteHasher;

pub const TREE_DEPTH: usize = 20;
pub const MAX_LEAVES: usize = 1 << TREE_DEPTH;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError
{
	#[error("voter tree is at capacity")]
	TreeFull,

	#[error("no leaf at index {0}")]
	LeafOutOfRange(usize),
}

/// An inclusion path from a leaf to the root. A path bit of `true` means the
/// running node is the right child at that level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionProof
{
	pub siblings: Vec<Fr>,
	pub path_bits: Vec<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct VoterTree
{
	leaves: Vec<Fr>,
}

impl VoterTree
{
	pub fn new() -> Self
	{
		Self { leaves: Vec::new() }
	}

	pub fn len(&self) -> usize
	{
		self.leaves.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.leaves.is_empty()
	}

	pub fn leaves(&self) -> &[Fr]
	{
		&self.leaves
	}

	pub fn index_of(&self, commitment: Fr) -> Option<usize>
	{
		self.leaves.iter().position(|leaf| *leaf == commitment)
	}

	/// Appends a commitment and returns its index. Re-inserting a commitment
	/// that is already present returns the original index and leaves the tree
	/// unchanged.
	pub fn insert(&mut self, commitment: Fr) -> Result<usize, MerkleError>
	{
		if let Some(index) = self.index_of(commitment)
		{
			return Ok(index);
		}
		if self.leaves.len() >= MAX_LEAVES
		{
			return Err(MerkleError::TreeFull);
		}
		self.leaves.push(commitment);
		Ok(self.leaves.len() - 1)
	}

	fn padded_base(&self) -> Vec<Fr>
	{
		let width = self.leaves.len().next_power_of_two().max(1);
		let mut level = self.leaves.clone();
		level.resize(width, Fr::zero());
		level
	}

	pub fn compute_root(&self, hasher: &VoteHasher) -> Fr
	{
		let mut level = self.padded_base();
		let mut depth = 0;

		while level.len() > 1
		{
			level = fold_level(hasher, &level);
			depth += 1;
		}

		let mut node = level[0];
		while depth < TREE_DEPTH
		{
			node = hasher.hash_two(node, Fr::zero());
			depth += 1;
		}
		node
	}

	pub fn inclusion_proof(
		&self,
		hasher: &VoteHasher,
		index: usize,
	) -> Result<InclusionProof, MerkleError>
	{
		if index >= self.leaves.len()
		{
			return Err(MerkleError::LeafOutOfRange(index));
		}

		let mut level = self.padded_base();
		let mut position = index;
		let mut siblings = Vec::with_capacity(TREE_DEPTH);
		let mut path_bits = Vec::with_capacity(TREE_DEPTH);

		while level.len() > 1
		{
			let is_right = position % 2 == 1;
			let sibling = if is_right { level[position - 1] } else { level[position + 1] };
			siblings.push(sibling);
			path_bits.push(is_right);

			level = fold_level(hasher, &level);
			position /= 2;
		}

		// Above the padded subtree the sibling is always the zero element.
		while siblings.len() < TREE_DEPTH
		{
			siblings.push(Fr::zero());
			path_bits.push(false);
		}

		Ok(InclusionProof { siblings, path_bits })
	}
}

fn fold_level(hasher: &VoteHasher, level: &[Fr]) -> Vec<Fr>
{
	level
		.chunks(2)
		.map(|pair| hasher.hash_two(pair[0], pair[1]))
		.collect()
}

/// Folds a leaf up through an inclusion proof and returns the implied root.
pub fn recompute_root(hasher: &VoteHasher, leaf: Fr, proof: &InclusionProof) -> Fr
{
	proof
		.siblings
		.iter()
		.zip(proof.path_bits.iter())
		.fold(leaf, |node, (sibling, is_right)| {
			if *is_right
			{
				hasher.hash_two(*sibling, node)
			}
			else
			{
				hasher.hash_two(node, *sibling)
			}
		})
}
