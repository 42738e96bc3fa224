//! Events published by the reward ledger.

use accrue_shared::PoolFee;
use soroban_sdk::{contracttype, symbol_short, Address, Env, I256};

/// Emitted when a new pool is appended to the registry
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAdded {
    pub pool_id: u32,
    pub base_token: Address,
    pub reward_token: Address,
    pub last_reward_block: u32,
}

/// Emitted when a deposit record is opened
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposited {
    pub user: Address,
    pub pool_id: u32,
    pub deposit_id: u32,
    pub lock_id: u32,
    pub amount: i128,
    pub fee: i128,
    pub withdrawal_timestamp: u64,
}

/// Emitted when rewards of a deposit are paid out
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claimed {
    pub user: Address,
    pub pool_id: u32,
    pub deposit_id: u32,
    pub reward: i128,
    pub fee: i128,
}

/// Emitted when principal leaves a deposit
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawn {
    pub user: Address,
    pub pool_id: u32,
    pub deposit_id: u32,
    pub principal: i128,
    pub principal_fee: i128,
    pub reward: i128,
    pub reward_fee: i128,
    pub reward_forfeited: bool, // Reward too large to pay; principal still returned
    pub finished: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsAdded {
    pub pool_id: u32,
    pub amount: i128,
    pub bonus_acc_reward_per_share: I256,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardConfigUpdated {
    pub old_reward_per_block: i128,
    pub new_reward_per_block: i128,
    pub update_blocks_interval: u32,
    pub block: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockPeriodUpdated {
    pub lock_id: u32,
    pub duration: u64,
    pub multiplier: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolFeeUpdated {
    pub pool_id: u32,
    pub fee: PoolFee,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinStakeUpdated {
    pub pool_id: u32,
    pub min_stake_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllocPointUpdated {
    pub pool_id: u32,
    pub alloc_point: i128,
    pub total_alloc_point: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseToggled {
    pub paused: bool,
}

pub fn pool_added(env: &Env, event: PoolAdded) {
    env.events().publish((symbol_short!("pool_add"),), event);
}

pub fn deposited(env: &Env, event: Deposited) {
    env.events()
        .publish((symbol_short!("deposit"), event.user.clone()), event);
}

pub fn claimed(env: &Env, event: Claimed) {
    env.events()
        .publish((symbol_short!("claim"), event.user.clone()), event);
}

pub fn withdrawn(env: &Env, event: Withdrawn) {
    env.events()
        .publish((symbol_short!("withdraw"), event.user.clone()), event);
}

pub fn rewards_added(env: &Env, event: RewardsAdded) {
    env.events().publish((symbol_short!("rewards"),), event);
}

pub fn reward_config_updated(env: &Env, event: RewardConfigUpdated) {
    env.events().publish((symbol_short!("rate_upd"),), event);
}

pub fn lock_period_updated(env: &Env, event: LockPeriodUpdated) {
    env.events().publish((symbol_short!("lock_upd"),), event);
}

pub fn pool_fee_updated(env: &Env, event: PoolFeeUpdated) {
    env.events().publish((symbol_short!("fee_upd"),), event);
}

pub fn min_stake_updated(env: &Env, event: MinStakeUpdated) {
    env.events().publish((symbol_short!("min_upd"),), event);
}

pub fn alloc_point_updated(env: &Env, event: AllocPointUpdated) {
    env.events().publish((symbol_short!("alloc_upd"),), event);
}

pub fn pause_toggled(env: &Env, paused: bool) {
    env.events()
        .publish((symbol_short!("pause"),), PauseToggled { paused });
}
