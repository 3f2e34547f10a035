//! Off-chain side of the suffragium voting protocol: voter registry
//! bookkeeping, the depth-twenty commitment tree, the Groth16 ballot circuit
//! and its prover.
//!
//! A ballot proves, without identifying the voter, that some registered
//! secret both belongs to a proposal's voter tree and deterministically
//! yields the submitted nullifier. The on-chain ledger
//! (`pallet-suffragium`) verifies the proof against its stored root and
//! rejects any reused nullifier.

pub mod circuit;
pub mod field;
pub mod hasher;
pub mod merkle;
pub mod prover;
pub mod registry;

pub use circuit::BallotCircuit;
pub use hasher::VoteHasher;
pub use merkle::{InclusionProof, MerkleError, VoterTree, MAX_LEAVES, TREE_DEPTH};
pub use prover::{
	BallotProof, BallotProver, BallotWitness, ProofBytes, ProverError, PublicInputs,
	VerifyKeyBytes,
};
pub use registry::{RegistryError, RegistryProof, VoterRegistry};
