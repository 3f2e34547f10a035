//! Shared fixtures: a registry of test voters and real Groth16 ballots
//! produced with the client library. Key generation is expensive, so one
//! prover is shared across the whole suite.

use std::sync::OnceLock;

use ark_bn254::Fr;
use rand::rngs::StdRng;
use rand::SeedableRng;

use suffragium_client::field::fr_to_bytes;
use suffragium_client::{BallotProver, BallotWitness, VoteHasher, VoterRegistry};

use crate::types::{HashBytes, ProofData, VerifyKey};

pub const SECRET: u64 = 12345;
pub const VOTERS: [u64; 3] = [SECRET, 67890, 24680];

fn prover() -> &'static BallotProver
{
	static PROVER: OnceLock<BallotProver> = OnceLock::new();
	PROVER.get_or_init(|| {
		let hasher = VoteHasher::new();
		let mut rng = StdRng::seed_from_u64(42);
		BallotProver::setup(&hasher, &mut rng).expect("circuit setup")
	})
}

/// The verifying key matching every ballot built by [`ballot`].
pub fn verify_key() -> VerifyKey
{
	let exported = prover().export_verify_key().expect("key export");
	VerifyKey {
		alpha_g1: exported.alpha_g1,
		beta_g2: exported.beta_g2,
		gamma_g2: exported.gamma_g2,
		delta_g2: exported.delta_g2,
		gamma_abc_g1: exported.gamma_abc_g1,
	}
}

fn registry_of(proposal_id: u64, secrets: &[u64]) -> (VoteHasher, VoterRegistry)
{
	let hasher = VoteHasher::new();
	let mut registry = VoterRegistry::new(proposal_id);
	for secret in secrets
	{
		registry
			.register(hasher.commitment(Fr::from(*secret)))
			.expect("register voter");
	}
	(hasher, registry)
}

/// Root of the commitment tree over `secrets`, as stored on-chain.
pub fn voters_root(secrets: &[u64]) -> HashBytes
{
	let (hasher, registry) = registry_of(0, secrets);
	fr_to_bytes(registry.root(&hasher))
}

pub struct Ballot
{
	pub voters_root: HashBytes,
	pub nullifier: HashBytes,
	pub proof: ProofData,
}

/// Builds a registry over `secrets` and proves a ballot for `secret`.
pub fn ballot(secrets: &[u64], secret: u64, proposal_id: u64, option: u8) -> Ballot
{
	let (hasher, registry) = registry_of(proposal_id, secrets);
	let membership = registry
		.proof_for(&hasher, Fr::from(secret))
		.expect("inclusion proof");
	let witness =
		BallotWitness::from_registry(&hasher, &membership, Fr::from(secret), proposal_id, option);

	let mut rng = StdRng::seed_from_u64(7);
	let proof = prover().prove(&witness, &mut rng).expect("prove ballot");
	let bytes = proof.to_bytes().expect("serialize proof");

	Ballot {
		voters_root: proof.voters_root_bytes(),
		nullifier: proof.nullifier_bytes(),
		proof: ProofData { pi_a: bytes.pi_a, pi_b: bytes.pi_b, pi_c: bytes.pi_c },
	}
}
