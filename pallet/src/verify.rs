//! Groth16 ballot verification.
//!
//! The public-input tuple is reconstructed here from ledger state: the first
//! element is always the proposal's stored voters root, so a caller-chosen
//! root can never reach the verifier. Nullifier bytes must be a canonical
//! field encoding, otherwise one spent nullifier could be resubmitted under a
//! modulus-shifted alias.

use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_crypto_primitives::snark::SNARK;
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use sp_std::vec::Vec;

use crate::types::{HashBytes, ProofData, ProposalId, VerifyKey, VoteOptionIndex, PUBLIC_INPUT_COUNT};

#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError
{
	MalformedVerifyKey,
	MalformedProof,
	MalformedNullifier,
	Backend,
}

fn decode_g1(bytes: &[u8]) -> Option<G1Affine>
{
	G1Affine::deserialize_uncompressed(bytes).ok()
}

fn decode_g2(bytes: &[u8]) -> Option<G2Affine>
{
	G2Affine::deserialize_uncompressed(bytes).ok()
}

fn decode_verify_key(key: &VerifyKey) -> Result<VerifyingKey<Bn254>, VerifyError>
{
	if key.gamma_abc_g1.len() != PUBLIC_INPUT_COUNT + 1
	{
		return Err(VerifyError::MalformedVerifyKey);
	}

	let gamma_abc_g1 = key
		.gamma_abc_g1
		.iter()
		.map(|bytes| decode_g1(bytes))
		.collect::<Option<Vec<G1Affine>>>()
		.ok_or(VerifyError::MalformedVerifyKey)?;

	Ok(VerifyingKey {
		alpha_g1: decode_g1(&key.alpha_g1).ok_or(VerifyError::MalformedVerifyKey)?,
		beta_g2: decode_g2(&key.beta_g2).ok_or(VerifyError::MalformedVerifyKey)?,
		gamma_g2: decode_g2(&key.gamma_g2).ok_or(VerifyError::MalformedVerifyKey)?,
		delta_g2: decode_g2(&key.delta_g2).ok_or(VerifyError::MalformedVerifyKey)?,
		gamma_abc_g1,
	})
}

fn decode_proof(proof: &ProofData) -> Result<Proof<Bn254>, VerifyError>
{
	Ok(Proof {
		a: decode_g1(&proof.pi_a).ok_or(VerifyError::MalformedProof)?,
		b: decode_g2(&proof.pi_b).ok_or(VerifyError::MalformedProof)?,
		c: decode_g1(&proof.pi_c).ok_or(VerifyError::MalformedProof)?,
	})
}

/// Decodes 32 big-endian bytes into a field element, rejecting values at or
/// above the modulus rather than reducing them.
pub fn fr_from_canonical_bytes(bytes: &HashBytes) -> Option<Fr>
{
	let element = Fr::from_be_bytes_mod_order(bytes);
	if element.into_bigint().to_bytes_be() == *bytes
	{
		Some(element)
	}
	else
	{
		None
	}
}

/// Checks that a key decodes and has one `gamma_abc_g1` point per public
/// input plus one.
pub fn validate_verify_key(key: &VerifyKey) -> Result<(), VerifyError>
{
	decode_verify_key(key).map(|_| ())
}

pub fn verify_ballot(
	key: &VerifyKey,
	voters_root: &HashBytes,
	nullifier: &HashBytes,
	proposal_id: ProposalId,
	option: VoteOptionIndex,
	proof: &ProofData,
) -> Result<bool, VerifyError>
{
	let verifying_key = decode_verify_key(key)?;
	let nullifier = fr_from_canonical_bytes(nullifier).ok_or(VerifyError::MalformedNullifier)?;
	let proof = decode_proof(proof)?;

	let public_inputs: [Fr; PUBLIC_INPUT_COUNT] = [
		Fr::from_be_bytes_mod_order(voters_root),
		nullifier,
		Fr::from(proposal_id),
		Fr::from(option as u64),
	];

	let prepared = Groth16::<Bn254>::process_vk(&verifying_key).map_err(|_| VerifyError::Backend)?;
	Groth16::<Bn254>::verify_with_processed_vk(&prepared, &public_inputs, &proof)
		.map_err(|_| VerifyError::Backend)
}
