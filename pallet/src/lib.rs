//! # Suffragium
//!
//! Anonymous, double-vote resistant governance voting. An authority opens a
//! proposal carrying the Merkle root of a voter commitment tree; registered
//! voters submit ballots accompanied by a Groth16 proof of tree membership
//! and a deterministic per-proposal nullifier. The pallet verifies each proof
//! against the *stored* root, records the nullifier, and tallies the vote
//! without ever learning which voter cast it.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

pub mod types;
pub mod verify;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

#[frame_support::pallet]
pub mod pallet
{
	use frame_support::pallet_prelude::*;
	use frame_support::traits::UnixTime;
	use frame_system::pallet_prelude::*;
	use sp_std::{vec, vec::Vec};

	use crate::types::{
		HashBytes, ProofData, Proposal, ProposalId, ProposalOutcome, TallyError, Timestamp,
		VerifyKey, VoteOptionIndex,
	};
	use crate::verify::{self, VerifyError};

	#[pallet::pallet]
	#[pallet::without_storage_info]
	pub struct Pallet<T>(_);

	#[pallet::config]
	pub trait Config: frame_system::Config
	{
		type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

		/// Wall-clock source for proposal deadlines.
		type TimeProvider: UnixTime;

		/// Upper bound on the number of ballot options a proposal may carry.
		#[pallet::constant]
		type MaxVoteOptions: Get<u32>;

		/// Upper bound, in bytes, on a submitted proof.
		#[pallet::constant]
		type MaxProofLength: Get<u32>;

		/// Upper bound, in bytes, on the registered verifying key.
		#[pallet::constant]
		type MaxVerifyKeyLength: Get<u32>;
	}

	/// Ballot proposals, addressed by their authority-chosen identifier.
	#[pallet::storage]
	#[pallet::getter(fn proposals)]
	pub type Proposals<T: Config> = StorageMap<_, Twox64Concat, ProposalId, Proposal<T>>;

	/// Spent nullifiers, scoped per proposal. Existence of a key is what
	/// makes a second ballot from the same secret detectable.
	#[pallet::storage]
	pub type Nullifiers<T: Config> =
		StorageDoubleMap<_, Twox64Concat, ProposalId, Blake2_128Concat, HashBytes, (), OptionQuery>;

	/// Proposal ids opened by each authority.
	#[pallet::storage]
	#[pallet::getter(fn proposals_by_authority)]
	pub type ProposalsByAuthority<T: Config> =
		StorageMap<_, Blake2_128Concat, T::AccountId, Vec<ProposalId>, ValueQuery>;

	/// The verifying key every ballot proof is checked against.
	#[pallet::storage]
	#[pallet::getter(fn verify_key)]
	pub type VerifyKeyStore<T: Config> = StorageValue<_, VerifyKey>;

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config>
	{
		/// A Groth16 verifying key was installed.
		VerifyKeyRegistered,

		/// A proposal was opened for anonymous voting.
		ProposalCreated
		{
			proposal_id: ProposalId,
			authority: T::AccountId,
			voters_root: HashBytes,
			voting_ends_at: Timestamp,
		},

		/// A ballot was verified and tallied.
		VoteCast
		{
			proposal_id: ProposalId,
			nullifier: HashBytes,
			option: VoteOptionIndex,
		},

		/// Voting closed; the tallies are immutable from here on.
		ProposalFinalized
		{
			proposal_id: ProposalId,
			vote_counts: Vec<u64>,
			outcome: ProposalOutcome,
		},
	}

	#[pallet::error]
	pub enum Error<T>
	{
		/// No proposal is stored under the supplied identifier.
		UnknownProposal,

		/// A proposal already exists under the supplied identifier.
		DuplicateProposal,

		/// The number of ballot options is outside `2..=MaxVoteOptions`.
		InvalidVoteOptions,

		/// The proposal deadline has passed.
		VotingEnded,

		/// The proposal has already been finalized.
		ProposalFinalized,

		/// The ballot option is out of range for this proposal.
		InvalidVote,

		/// The encoded proof exceeds `MaxProofLength`.
		ProofTooLarge,

		/// A proof point failed to deserialize.
		MalformedProof,

		/// The nullifier bytes are not a canonical field encoding.
		MalformedNullifier,

		/// The verifying key failed to deserialize or has the wrong arity.
		MalformedVerifyKey,

		/// No verifying key has been installed.
		VerifyKeyMissing,

		/// The proof did not verify against the stored voters root.
		InvalidProof,

		/// The nullifier has already been spent for this proposal.
		AlreadyVoted,

		/// The proposal deadline has not been reached.
		VotingNotEnded,

		/// Only the proposal authority may finalize it.
		Unauthorized,

		/// A tally counter would overflow.
		TallyOverflow,
	}

	#[pallet::call]
	impl<T: Config> Pallet<T>
	{
		/// Installs the verifying key ballots are checked against. Root-only:
		/// the key is fixed protocol parameter material, not authority state.
		#[pallet::call_index(0)]
		#[pallet::weight(T::DbWeight::get().reads_writes(0, 1))]
		pub fn register_verify_key(
			origin: OriginFor<T>,
			key: VerifyKey,
		) -> DispatchResult
		{
			ensure_root(origin)?;
			ensure!(
				key.byte_len() <= T::MaxVerifyKeyLength::get() as usize,
				Error::<T>::MalformedVerifyKey
			);
			verify::validate_verify_key(&key).map_err(|_| Error::<T>::MalformedVerifyKey)?;

			VerifyKeyStore::<T>::put(key);
			Self::deposit_event(Event::VerifyKeyRegistered);
			Ok(())
		}

		/// Opens a proposal. The voters root is immutable once stored; a
		/// deadline already in the past is accepted and simply never admits
		/// a ballot.
		#[pallet::call_index(1)]
		#[pallet::weight(T::DbWeight::get().reads_writes(2, 2))]
		pub fn create_proposal(
			origin: OriginFor<T>,
			proposal_id: ProposalId,
			voters_root: HashBytes,
			voting_ends_at: Timestamp,
			vote_options: VoteOptionIndex,
			metadata: Option<T::Hash>,
		) -> DispatchResult
		{
			let authority = ensure_signed(origin)?;
			ensure!(
				!Proposals::<T>::contains_key(proposal_id),
				Error::<T>::DuplicateProposal
			);
			ensure!(
				vote_options >= 2 && (vote_options as u32) <= T::MaxVoteOptions::get(),
				Error::<T>::InvalidVoteOptions
			);

			let vote_counts = BoundedVec::try_from(vec![0u64; vote_options as usize])
				.map_err(|_| Error::<T>::InvalidVoteOptions)?;
			let proposal = Proposal::<T> {
				proposal_id,
				voters_root,
				authority: authority.clone(),
				vote_counts,
				created_at: Self::now(),
				voting_ends_at,
				is_finalized: false,
				metadata,
			};

			Proposals::<T>::insert(proposal_id, proposal);
			ProposalsByAuthority::<T>::append(&authority, proposal_id);
			Self::deposit_event(Event::ProposalCreated {
				proposal_id,
				authority,
				voters_root,
				voting_ends_at,
			});
			Ok(())
		}

		/// Submits an anonymous ballot. The proof is verified against the
		/// public inputs `[stored voters_root, nullifier, proposal_id, vote]`;
		/// the nullifier record and the tally increment commit together or
		/// not at all.
		#[pallet::call_index(2)]
		#[pallet::weight(T::DbWeight::get().reads_writes(4, 2))]
		pub fn cast_vote(
			origin: OriginFor<T>,
			proposal_id: ProposalId,
			nullifier: HashBytes,
			option: VoteOptionIndex,
			proof: ProofData,
		) -> DispatchResult
		{
			ensure_signed(origin)?;

			let proposal = Proposals::<T>::get(proposal_id).ok_or(Error::<T>::UnknownProposal)?;
			ensure!(!proposal.has_ended(Self::now()), Error::<T>::VotingEnded);
			ensure!(!proposal.is_finalized, Error::<T>::ProposalFinalized);
			ensure!(proposal.accepts_option(option), Error::<T>::InvalidVote);
			ensure!(
				proof.byte_len() <= T::MaxProofLength::get() as usize,
				Error::<T>::ProofTooLarge
			);

			let key = VerifyKeyStore::<T>::get().ok_or(Error::<T>::VerifyKeyMissing)?;
			let accepted = verify::verify_ballot(
				&key,
				&proposal.voters_root,
				&nullifier,
				proposal_id,
				option,
				&proof,
			)
			.map_err(|err| match err
			{
				VerifyError::MalformedVerifyKey => Error::<T>::MalformedVerifyKey,
				VerifyError::MalformedProof => Error::<T>::MalformedProof,
				VerifyError::MalformedNullifier => Error::<T>::MalformedNullifier,
				VerifyError::Backend => Error::<T>::InvalidProof,
			})?;
			ensure!(accepted, Error::<T>::InvalidProof);

			ensure!(
				!Nullifiers::<T>::contains_key(proposal_id, nullifier),
				Error::<T>::AlreadyVoted
			);

			let proposal = proposal.register_vote(option).map_err(|err| match err
			{
				TallyError::InvalidOption => Error::<T>::InvalidVote,
				TallyError::Overflow => Error::<T>::TallyOverflow,
			})?;

			Nullifiers::<T>::insert(proposal_id, nullifier, ());
			Proposals::<T>::insert(proposal_id, proposal);
			Self::deposit_event(Event::VoteCast { proposal_id, nullifier, option });
			Ok(())
		}

		/// Closes a proposal after its deadline. Only the authority that
		/// opened it may finalize; tallies are frozen afterwards.
		#[pallet::call_index(3)]
		#[pallet::weight(T::DbWeight::get().reads_writes(1, 1))]
		pub fn finalize_proposal(
			origin: OriginFor<T>,
			proposal_id: ProposalId,
		) -> DispatchResult
		{
			let sender = ensure_signed(origin)?;

			let proposal = Proposals::<T>::get(proposal_id).ok_or(Error::<T>::UnknownProposal)?;
			ensure!(proposal.has_ended(Self::now()), Error::<T>::VotingNotEnded);
			ensure!(!proposal.is_finalized, Error::<T>::ProposalFinalized);
			ensure!(sender == proposal.authority, Error::<T>::Unauthorized);

			let proposal = proposal.finalize();
			let vote_counts = proposal.vote_counts.to_vec();
			let outcome = proposal.outcome();

			Proposals::<T>::insert(proposal_id, proposal);
			Self::deposit_event(Event::ProposalFinalized { proposal_id, vote_counts, outcome });
			Ok(())
		}
	}

	impl<T: Config> Pallet<T>
	{
		fn now() -> Timestamp
		{
			T::TimeProvider::now().as_secs()
		}

		pub fn nullifier_spent(proposal_id: ProposalId, nullifier: HashBytes) -> bool
		{
			Nullifiers::<T>::contains_key(proposal_id, nullifier)
		}
	}
}
