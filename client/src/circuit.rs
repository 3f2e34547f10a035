//! Groth16 ballot circuit.
//!
//! The statement, over public inputs allocated in the order
//! `[voters_root, nullifier, proposal_id, vote]`:
//!
//! 1. the commitment `hash_two(secret, secret)` sits in the voter tree whose
//!    root is `voters_root`, at the position described by the witnessed path;
//! 2. `nullifier == hash_two(secret, proposal_id)`;
//! 3. `vote` is binary.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::merkle::TREE_DEPTH;

/// In-circuit counterpart of `VoteHasher::hash_two`, sharing its parameters.
fn poseidon_hash_var(
	cs: ConstraintSystemRef<Fr>,
	config: &PoseidonConfig<Fr>,
	inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError>
{
	let mut sponge = PoseidonSpongeVar::new(cs, config);
	sponge.absorb(&inputs)?;
	let squeezed = sponge.squeeze_field_elements(1)?;
	Ok(squeezed[0].clone())
}

#[derive(Clone)]
pub struct BallotCircuit
{
	pub config: PoseidonConfig<Fr>,

	// Public inputs.
	pub voters_root: Option<Fr>,
	pub nullifier: Option<Fr>,
	pub proposal_id: Option<Fr>,
	pub vote: Option<Fr>,

	// Private witnesses.
	pub secret: Option<Fr>,
	pub siblings: Vec<Option<Fr>>,
	pub path_bits: Vec<Option<bool>>,
}

impl BallotCircuit
{
	/// Shape-only instance used for parameter generation.
	pub fn blank(config: PoseidonConfig<Fr>) -> Self
	{
		Self {
			config,
			voters_root: None,
			nullifier: None,
			proposal_id: None,
			vote: None,
			secret: None,
			siblings: vec![None; TREE_DEPTH],
			path_bits: vec![None; TREE_DEPTH],
		}
	}
}

impl ConstraintSynthesizer<Fr> for BallotCircuit
{
	fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError>
	{
		if self.siblings.len() != TREE_DEPTH || self.path_bits.len() != TREE_DEPTH
		{
			return Err(SynthesisError::Unsatisfiable);
		}

		let voters_root =
			FpVar::new_input(cs.clone(), || self.voters_root.ok_or(SynthesisError::AssignmentMissing))?;
		let nullifier =
			FpVar::new_input(cs.clone(), || self.nullifier.ok_or(SynthesisError::AssignmentMissing))?;
		let proposal_id =
			FpVar::new_input(cs.clone(), || self.proposal_id.ok_or(SynthesisError::AssignmentMissing))?;
		let vote =
			FpVar::new_input(cs.clone(), || self.vote.ok_or(SynthesisError::AssignmentMissing))?;

		let secret =
			FpVar::new_witness(cs.clone(), || self.secret.ok_or(SynthesisError::AssignmentMissing))?;

		// vote * (vote - 1) == 0
		let ballot_slack = &vote * &(&vote - &FpVar::one());
		ballot_slack.enforce_equal(&FpVar::zero())?;

		// The nullifier binds the secret to this proposal.
		let expected_nullifier =
			poseidon_hash_var(cs.clone(), &self.config, &[secret.clone(), proposal_id.clone()])?;
		expected_nullifier.enforce_equal(&nullifier)?;

		// Fold the commitment up to the registered root.
		let mut node = poseidon_hash_var(cs.clone(), &self.config, &[secret.clone(), secret.clone()])?;
		for level in 0..TREE_DEPTH
		{
			let sibling = FpVar::new_witness(cs.clone(), || {
				self.siblings[level].ok_or(SynthesisError::AssignmentMissing)
			})?;
			let is_right = Boolean::new_witness(cs.clone(), || {
				self.path_bits[level].ok_or(SynthesisError::AssignmentMissing)
			})?;

			let left = is_right.select(&sibling, &node)?;
			let right = is_right.select(&node, &sibling)?;
			node = poseidon_hash_var(cs.clone(), &self.config, &[left, right])?;
		}
		node.enforce_equal(&voters_root)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use ark_relations::r1cs::ConstraintSystem;

	use crate::hasher::VoteHasher;
	use crate::merkle::VoterTree;

	fn assignment(vote: u64, secret: u64, forge_nullifier: bool) -> BallotCircuit
	{
		let hasher = VoteHasher::new();
		let proposal_id = 77u64;

		let mut tree = VoterTree::new();
		for s in [111u64, 12345, 999]
		{
			tree.insert(hasher.commitment(Fr::from(s))).unwrap();
		}
		let index = tree.index_of(hasher.commitment(Fr::from(12345u64))).unwrap();
		let path = tree.inclusion_proof(&hasher, index).unwrap();

		let nullifier = if forge_nullifier
		{
			Fr::from(1u64)
		}
		else
		{
			hasher.nullifier(Fr::from(secret), proposal_id)
		};

		BallotCircuit {
			config: hasher.config().clone(),
			voters_root: Some(tree.compute_root(&hasher)),
			nullifier: Some(nullifier),
			proposal_id: Some(Fr::from(proposal_id)),
			vote: Some(Fr::from(vote)),
			secret: Some(Fr::from(secret)),
			siblings: path.siblings.into_iter().map(Some).collect(),
			path_bits: path.path_bits.into_iter().map(Some).collect(),
		}
	}

	fn satisfied(circuit: BallotCircuit) -> bool
	{
		let cs = ConstraintSystem::<Fr>::new_ref();
		circuit.generate_constraints(cs.clone()).unwrap();
		cs.is_satisfied().unwrap()
	}

	#[test]
	fn valid_ballot_satisfies_the_circuit()
	{
		assert!(satisfied(assignment(1, 12345, false)));
		assert!(satisfied(assignment(0, 12345, false)));
	}

	#[test]
	fn public_inputs_are_exactly_four()
	{
		let cs = ConstraintSystem::<Fr>::new_ref();
		assignment(1, 12345, false).generate_constraints(cs.clone()).unwrap();
		// one constant instance variable plus the four inputs
		assert_eq!(cs.num_instance_variables(), 5);
	}

	#[test]
	fn non_member_secret_fails()
	{
		assert!(!satisfied(assignment(1, 54321, false)));
	}

	#[test]
	fn non_binary_vote_fails()
	{
		assert!(!satisfied(assignment(2, 12345, false)));
	}

	#[test]
	fn forged_nullifier_fails()
	{
		assert!(!satisfied(assignment(1, 12345, true)));
	}

	#[test]
	fn wrong_length_path_fails_synthesis()
	{
		let mut circuit = assignment(1, 12345, false);
		circuit.siblings.pop();

		let cs = ConstraintSystem::<Fr>::new_ref();
		assert!(matches!(circuit.generate_constraints(cs), Err(SynthesisError::Unsatisfiable)));
	}
}
