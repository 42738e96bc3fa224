use accrue_shared::{PoolFee, MULTIPLIER_PRECISION};
use soroban_sdk::{contracttype, Address, I256};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    pub admin: Address,
    pub vesting_address: Address, // Only caller of the fee/lock bypass paths
    pub rewards_distributor: Address, // Only caller of add_rewards
    pub emergency_pause: bool,
}

/// Product-dependent switches shared by the staking, freezing and farming
/// deployments of the ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProductRules {
    pub reject_duplicate_pools: bool, // One pool per (base, reward) pair
    pub strict_lock_ids: bool, // Unknown lock ids fail instead of meaning "no lock"
    pub allow_empty_claims: bool, // Zero-reward claims succeed as no-ops
}

impl Default for ProductRules {
    fn default() -> Self {
        Self {
            reject_duplicate_pools: false,
            strict_lock_ids: true,
            allow_empty_claims: false,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardConfig {
    pub reward_per_block: i128,
    pub update_blocks_interval: u32,
    pub last_update_block_num: u32,
    pub total_alloc_point: i128, // Sum of every pool's alloc_point
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub base_token: Address,
    pub reward_token: Address,
    pub total_shares: i128,
    pub last_reward_block: u32,
    pub alloc_point: i128, // Weight of this pool in block emission
    pub acc_reward_per_share: I256, // Block emission, scaled by ACC_PRECISION
    pub bonus_rewards_amount: i128, // Everything ever injected via add_rewards
    pub bonus_acc_reward_per_share: I256, // Injections, scaled by ACC_PRECISION
    pub fee: PoolFee,
    pub min_stake_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub amount: i128,
    pub lock_id: u32,
    pub deposit_timestamp: u64,
    pub withdrawal_timestamp: u64,
    pub reward_debt: I256,
    pub bonus_reward_debt: I256,
    pub total_claimed: i128,
    pub finished: bool,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserInfo {
    pub total_deposit_amount: i128,
    pub deposit_count: u32,
    pub total_claim: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockPeriod {
    pub duration: u64, // Seconds
    pub multiplier: u32, // MULTIPLIER_PRECISION = 1.0x
}

impl Default for LockPeriod {
    fn default() -> Self {
        Self {
            duration: 0,
            multiplier: MULTIPLIER_PRECISION,
        }
    }
}

/// Amounts moved by a single claim or withdrawal.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Payout {
    pub reward: i128, // Net reward transferred
    pub reward_fee: i128,
    pub principal: i128, // Net principal transferred
    pub principal_fee: i128,
    pub reward_forfeited: bool, // Reward did not fit a token amount and was dropped
}
