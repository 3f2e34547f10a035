use crate as pallet_suffragium;
use frame_support::{
	derive_impl,
	traits::{ConstU32, ConstU64, UnixTime},
};
use sp_core::H256;
use sp_runtime::{
	traits::{BlakeTwo256, IdentityLookup},
	BuildStorage,
};
use std::cell::Cell;
use std::time::Duration;

type Block = frame_system::mocking::MockBlock<Test>;

frame_support::construct_runtime!(
	pub enum Test
	{
		System: frame_system,
		Suffragium: pallet_suffragium,
	}
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig as frame_system::DefaultConfig)]
impl frame_system::Config for Test
{
	type BaseCallFilter = frame_support::traits::Everything;
	type BlockWeights = ();
	type BlockLength = ();
	type DbWeight = ();
	type RuntimeOrigin = RuntimeOrigin;
	type Nonce = u64;
	type Hash = H256;
	type RuntimeCall = RuntimeCall;
	type Hashing = BlakeTwo256;
	type AccountId = u64;
	type Lookup = IdentityLookup<Self::AccountId>;
	type Block = Block;
	type RuntimeEvent = RuntimeEvent;
	type BlockHashCount = ConstU64<250>;
	type Version = ();
	type PalletInfo = PalletInfo;
	type OnNewAccount = ();
	type OnKilledAccount = ();
	type SystemWeightInfo = ();
	type SS58Prefix = ();
	type OnSetCode = ();
	type MaxConsumers = ConstU32<16>;
}

thread_local! {
	static NOW_SECONDS: Cell<u64> = Cell::new(0);
}

/// Unix-seconds clock the tests wind forward explicitly.
pub struct MockTime;

impl UnixTime for MockTime
{
	fn now() -> Duration
	{
		Duration::from_secs(NOW_SECONDS.with(Cell::get))
	}
}

pub fn set_time(seconds: u64)
{
	NOW_SECONDS.with(|now| now.set(seconds));
}

impl pallet_suffragium::Config for Test
{
	type RuntimeEvent = RuntimeEvent;
	type TimeProvider = MockTime;
	type MaxVoteOptions = ConstU32<16>;
	type MaxProofLength = ConstU32<512>;
	type MaxVerifyKeyLength = ConstU32<4096>;
}

pub fn new_test_ext() -> sp_io::TestExternalities
{
	let storage = frame_system::GenesisConfig::<Test>::default()
		.build_storage()
		.unwrap();
	let mut ext: sp_io::TestExternalities = storage.into();
	ext.execute_with(|| {
		System::set_block_number(1);
		set_time(0);
	});
	ext
}
