use frame_support::pallet_prelude::*;
use sp_std::vec::Vec;

/// Proposals are addressed by an authority-chosen 64-bit identifier, which is
/// also the value bound into every nullifier for that proposal.
pub type ProposalId = u64;

/// Unix seconds.
pub type Timestamp = u64;

/// Big-endian encoding of a BN254 scalar field element.
pub type HashBytes = [u8; 32];

/// Index into a proposal's tally vector.
pub type VoteOptionIndex = u8;

/// Circuit public inputs: voters root, nullifier, proposal id, vote.
pub const PUBLIC_INPUT_COUNT: usize = 4;

/// Groth16 verifying key, one uncompressed point per field.
#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub struct VerifyKey
{
	pub alpha_g1: Vec<u8>,
	pub beta_g2: Vec<u8>,
	pub gamma_g2: Vec<u8>,
	pub delta_g2: Vec<u8>,
	pub gamma_abc_g1: Vec<Vec<u8>>,
}

impl VerifyKey
{
	pub fn byte_len(&self) -> usize
	{
		self.alpha_g1.len()
			+ self.beta_g2.len()
			+ self.gamma_g2.len()
			+ self.delta_g2.len()
			+ self.gamma_abc_g1.iter().map(Vec::len).sum::<usize>()
	}
}

/// Groth16 proof, one uncompressed point per field.
#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub struct ProofData
{
	pub pi_a: Vec<u8>,
	pub pi_b: Vec<u8>,
	pub pi_c: Vec<u8>,
}

impl ProofData
{
	pub fn byte_len(&self) -> usize
	{
		self.pi_a.len() + self.pi_b.len() + self.pi_c.len()
	}
}

#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub enum ProposalOutcome
{
	Passed,
	Rejected,
	Tied,
}

#[derive(RuntimeDebug, PartialEq, Eq)]
pub enum TallyError
{
	InvalidOption,
	Overflow,
}

#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo)]
#[scale_info(skip_type_params(T))]
pub struct Proposal<T: crate::Config>
{
	pub proposal_id: ProposalId,

	/// Root of the voter commitment tree ballots must prove membership in.
	/// Fixed at creation; the verifier substitutes this value for the first
	/// public input of every submitted proof.
	pub voters_root: HashBytes,

	/// Account permitted to finalize the proposal.
	pub authority: T::AccountId,

	/// One tally per ballot option.
	pub vote_counts: BoundedVec<u64, T::MaxVoteOptions>,

	pub created_at: Timestamp,
	pub voting_ends_at: Timestamp,
	pub is_finalized: bool,

	/// Optional hash of off-chain proposal content.
	pub metadata: Option<T::Hash>,
}

impl<T: crate::Config> Proposal<T>
{
	pub fn has_ended(&self, now: Timestamp) -> bool
	{
		now >= self.voting_ends_at
	}

	pub fn is_open(&self, now: Timestamp) -> bool
	{
		!self.has_ended(now) && !self.is_finalized
	}

	pub fn accepts_option(&self, option: VoteOptionIndex) -> bool
	{
		(option as usize) < self.vote_counts.len()
	}

	pub fn register_vote(mut self, option: VoteOptionIndex) -> Result<Self, TallyError>
	{
		let counter = self
			.vote_counts
			.get_mut(option as usize)
			.ok_or(TallyError::InvalidOption)?;
		*counter = counter.checked_add(1).ok_or(TallyError::Overflow)?;
		Ok(self)
	}

	pub fn finalize(mut self) -> Self
	{
		self.is_finalized = true;
		self
	}

	/// Binary reading of the tallies: option one carries the ayes.
	pub fn outcome(&self) -> ProposalOutcome
	{
		let nays = self.vote_counts.first().copied().unwrap_or(0);
		let ayes = self.vote_counts.get(1).copied().unwrap_or(0);

		if ayes > nays { ProposalOutcome::Passed }
		else if nays > ayes { ProposalOutcome::Rejected }
		else { ProposalOutcome::Tied }
	}
}
