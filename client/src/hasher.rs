//! Poseidon hashing over the BN254 scalar field.
//!
//! A [`VoteHasher`] owns the Poseidon parameters and is passed explicitly to
//! every call site that hashes: the registry, the Merkle tree, the circuit
//! and the prover all share one configuration, which is what keeps native
//! hashing and in-circuit hashing in agreement.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::{CryptographicSponge, FieldBasedCryptographicSponge};
use ark_ff::PrimeField;

// Width-3 Poseidon (rate 2, capacity 1) with the standard x^5 s-box and
// grain-derived round constants.
const POSEIDON_RATE: usize = 2;
const POSEIDON_CAPACITY: usize = 1;
const POSEIDON_ALPHA: u64 = 5;
const POSEIDON_FULL_ROUNDS: u64 = 8;
const POSEIDON_PARTIAL_ROUNDS: u64 = 57;

pub fn poseidon_config() -> PoseidonConfig<Fr>
{
	let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
		Fr::MODULUS_BIT_SIZE as u64,
		POSEIDON_RATE,
		POSEIDON_FULL_ROUNDS,
		POSEIDON_PARTIAL_ROUNDS,
		0,
	);

	PoseidonConfig::new(
		POSEIDON_FULL_ROUNDS as usize,
		POSEIDON_PARTIAL_ROUNDS as usize,
		POSEIDON_ALPHA,
		mds,
		ark,
		POSEIDON_RATE,
		POSEIDON_CAPACITY,
	)
}

#[derive(Clone)]
pub struct VoteHasher
{
	config: PoseidonConfig<Fr>,
}

impl VoteHasher
{
	pub fn new() -> Self
	{
		Self { config: poseidon_config() }
	}

	pub fn config(&self) -> &PoseidonConfig<Fr>
	{
		&self.config
	}

	/// Order-sensitive two-input Poseidon hash.
	pub fn hash_two(&self, left: Fr, right: Fr) -> Fr
	{
		let inputs: &[Fr] = &[left, right];
		let mut sponge = PoseidonSponge::new(&self.config);
		sponge.absorb(&inputs);
		sponge.squeeze_native_field_elements(1)[0]
	}

	/// Voter commitment: `hash_two(secret, secret)`.
	pub fn commitment(&self, secret: Fr) -> Fr
	{
		self.hash_two(secret, secret)
	}

	/// Per-proposal nullifier: `hash_two(secret, proposal_id)`. Proposal ids
	/// embed as integers below 2^64, disjoint from field-uniform secrets.
	pub fn nullifier(&self, secret: Fr, proposal_id: u64) -> Fr
	{
		self.hash_two(secret, Fr::from(proposal_id))
	}
}

impl Default for VoteHasher
{
	fn default() -> Self
	{
		Self::new()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn hashes_deterministically_across_instances()
	{
		let a = VoteHasher::new();
		let b = VoteHasher::new();
		assert_eq!(
			a.hash_two(Fr::from(1u64), Fr::from(2u64)),
			b.hash_two(Fr::from(1u64), Fr::from(2u64)),
		);
	}

	#[test]
	fn hash_is_order_sensitive()
	{
		let hasher = VoteHasher::new();
		assert_ne!(
			hasher.hash_two(Fr::from(1u64), Fr::from(2u64)),
			hasher.hash_two(Fr::from(2u64), Fr::from(1u64)),
		);
	}

	#[test]
	fn commitment_and_nullifier_diverge()
	{
		let hasher = VoteHasher::new();
		let secret = Fr::from(12345u64);
		assert_ne!(hasher.commitment(secret), hasher.nullifier(secret, 1));
		assert_ne!(hasher.nullifier(secret, 1), hasher.nullifier(secret, 2));
	}

	#[test]
	fn sampled_secrets_yield_pairwise_distinct_nullifiers()
	{
		use ark_ff::UniformRand;
		use std::collections::BTreeSet;

		let hasher = VoteHasher::new();
		let mut rng = ark_std::test_rng();

		let mut seen = BTreeSet::new();
		for _ in 0..200
		{
			let secret = Fr::rand(&mut rng);
			assert!(seen.insert(hasher.nullifier(secret, 77).into_bigint()));
		}
	}
}
