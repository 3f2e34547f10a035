//! Groth16 proving for ballots.
//!
//! A [`BallotProver`] is constructed once per circuit via [`BallotProver::setup`]
//! and then shared: it owns the proving key, a prepared verifying key for
//! pre-submission checks, and the Poseidon parameters the circuit hashes with.
//! Statements that cannot be proven (a secret outside the tree, a non-binary
//! vote, a stale root) surface as [`ProverError::WitnessGenerationFailed`]
//! before the proving backend is ever invoked.

use ark_bn254::{Bn254, Fr};
use ark_crypto_primitives::snark::{CircuitSpecificSetupSNARK, SNARK};
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_groth16::{prepare_verifying_key, Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, SynthesisError};
use ark_serialize::{CanonicalSerialize, SerializationError};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::circuit::BallotCircuit;
use crate::field::{fr_to_bytes, FIELD_BYTES};
use crate::hasher::VoteHasher;
use crate::merkle::TREE_DEPTH;
use crate::registry::RegistryProof;

#[derive(Debug, Error)]
pub enum ProverError
{
	#[error("witness generation failed: inputs do not satisfy the ballot circuit")]
	WitnessGenerationFailed,

	#[error("constraint synthesis failure: {0}")]
	Synthesis(#[from] SynthesisError),

	#[error("proving backend failure: {0}")]
	Backend(String),

	#[error("point serialization failure: {0}")]
	Serialization(#[from] SerializationError),
}

/// The four public inputs of a ballot, in circuit allocation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicInputs
{
	pub voters_root: Fr,
	pub nullifier: Fr,
	pub proposal_id: u64,
	pub vote: u8,
}

impl PublicInputs
{
	pub fn to_field_elements(&self) -> [Fr; 4]
	{
		[
			self.voters_root,
			self.nullifier,
			Fr::from(self.proposal_id),
			Fr::from(self.vote),
		]
	}
}

/// Full circuit assignment for one ballot.
#[derive(Clone, Debug)]
pub struct BallotWitness
{
	pub public: PublicInputs,
	pub secret: Fr,
	pub siblings: Vec<Fr>,
	pub path_bits: Vec<bool>,
}

impl BallotWitness
{
	/// Derives the nullifier and assembles the assignment from a registry
	/// inclusion proof.
	pub fn from_registry(
		hasher: &VoteHasher,
		membership: &RegistryProof,
		secret: Fr,
		proposal_id: u64,
		vote: u8,
	) -> Self
	{
		Self {
			public: PublicInputs {
				voters_root: membership.voters_root,
				nullifier: hasher.nullifier(secret, proposal_id),
				proposal_id,
				vote,
			},
			secret,
			siblings: membership.siblings.clone(),
			path_bits: membership.path_bits.clone(),
		}
	}

	fn circuit(&self, config: PoseidonConfig<Fr>) -> BallotCircuit
	{
		BallotCircuit {
			config,
			voters_root: Some(self.public.voters_root),
			nullifier: Some(self.public.nullifier),
			proposal_id: Some(Fr::from(self.public.proposal_id)),
			vote: Some(Fr::from(self.public.vote)),
			secret: Some(self.secret),
			siblings: self.siblings.iter().copied().map(Some).collect(),
			path_bits: self.path_bits.iter().copied().map(Some).collect(),
		}
	}
}

/// A proof together with the public inputs it was generated for.
#[derive(Clone, Debug)]
pub struct BallotProof
{
	pub proof: Proof<Bn254>,
	pub public: PublicInputs,
}

impl BallotProof
{
	pub fn to_bytes(&self) -> Result<ProofBytes, ProverError>
	{
		Ok(ProofBytes {
			pi_a: point_bytes(&self.proof.a)?,
			pi_b: point_bytes(&self.proof.b)?,
			pi_c: point_bytes(&self.proof.c)?,
		})
	}

	pub fn nullifier_bytes(&self) -> [u8; FIELD_BYTES]
	{
		fr_to_bytes(self.public.nullifier)
	}

	pub fn voters_root_bytes(&self) -> [u8; FIELD_BYTES]
	{
		fr_to_bytes(self.public.voters_root)
	}
}

/// Wire form of a proof: each point uncompressed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofBytes
{
	pub pi_a: Vec<u8>,
	pub pi_b: Vec<u8>,
	pub pi_c: Vec<u8>,
}

/// Wire form of a Groth16 verifying key: each point uncompressed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyKeyBytes
{
	pub alpha_g1: Vec<u8>,
	pub beta_g2: Vec<u8>,
	pub gamma_g2: Vec<u8>,
	pub delta_g2: Vec<u8>,
	pub gamma_abc_g1: Vec<Vec<u8>>,
}

impl VerifyKeyBytes
{
	pub fn from_key(key: &VerifyingKey<Bn254>) -> Result<Self, ProverError>
	{
		Ok(Self {
			alpha_g1: point_bytes(&key.alpha_g1)?,
			beta_g2: point_bytes(&key.beta_g2)?,
			gamma_g2: point_bytes(&key.gamma_g2)?,
			delta_g2: point_bytes(&key.delta_g2)?,
			gamma_abc_g1: key
				.gamma_abc_g1
				.iter()
				.map(point_bytes)
				.collect::<Result<_, _>>()?,
		})
	}
}

fn point_bytes<P: CanonicalSerialize>(point: &P) -> Result<Vec<u8>, SerializationError>
{
	let mut bytes = Vec::new();
	point.serialize_uncompressed(&mut bytes)?;
	Ok(bytes)
}

pub struct BallotProver
{
	config: PoseidonConfig<Fr>,
	proving_key: ProvingKey<Bn254>,
	verifying_key: VerifyingKey<Bn254>,
	prepared_key: PreparedVerifyingKey<Bn254>,
}

impl BallotProver
{
	/// Circuit-specific Groth16 parameter generation over a blank circuit.
	pub fn setup<R: RngCore + CryptoRng>(hasher: &VoteHasher, rng: &mut R) -> Result<Self, ProverError>
	{
		let circuit = BallotCircuit::blank(hasher.config().clone());
		let (proving_key, verifying_key) =
			Groth16::<Bn254>::circuit_specific_setup(circuit, rng).map_err(backend)?;
		let prepared_key = prepare_verifying_key(&verifying_key);
		log::info!("ballot circuit keys generated (tree depth {TREE_DEPTH})");

		Ok(Self {
			config: hasher.config().clone(),
			proving_key,
			verifying_key,
			prepared_key,
		})
	}

	pub fn verifying_key(&self) -> &VerifyingKey<Bn254>
	{
		&self.verifying_key
	}

	pub fn export_verify_key(&self) -> Result<VerifyKeyBytes, ProverError>
	{
		VerifyKeyBytes::from_key(&self.verifying_key)
	}

	pub fn prove<R: RngCore + CryptoRng>(
		&self,
		witness: &BallotWitness,
		rng: &mut R,
	) -> Result<BallotProof, ProverError>
	{
		let circuit = witness.circuit(self.config.clone());

		// Reject unprovable statements before invoking the backend.
		let check = ConstraintSystem::<Fr>::new_ref();
		circuit.clone().generate_constraints(check.clone())?;
		if !check.is_satisfied()?
		{
			return Err(ProverError::WitnessGenerationFailed);
		}

		let proof = Groth16::<Bn254>::prove(&self.proving_key, circuit, rng).map_err(backend)?;
		log::debug!("ballot proof generated for proposal {}", witness.public.proposal_id);

		Ok(BallotProof { proof, public: witness.public.clone() })
	}

	/// Pre-submission verification against the prover's own verifying key.
	pub fn verify_locally(&self, proof: &BallotProof) -> Result<bool, ProverError>
	{
		Groth16::<Bn254>::verify_with_processed_vk(
			&self.prepared_key,
			&proof.public.to_field_elements(),
			&proof.proof,
		)
		.map_err(backend)
	}
}

fn backend<E: core::fmt::Debug>(err: E) -> ProverError
{
	ProverError::Backend(format!("{err:?}"))
}
