//! Bonus distributor: discrete reward injections spread over current shares.

use accrue_shared::{math, LedgerError};
use soroban_sdk::{Env, I256};

use crate::events::{self, RewardsAdded};
use crate::pool;
use crate::storage;
use crate::types::Pool;

/// Credits `amount` of pre-funded reward token to everyone staked in the pool.
pub fn add_rewards(env: &Env, pool_id: u32, amount: i128) -> Result<Pool, LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount);
    }

    let mut pool = pool::load_settled(env, pool_id)?;
    if pool.total_shares == 0 {
        return Err(LedgerError::InvalidAmount);
    }

    pool.bonus_rewards_amount = pool
        .bonus_rewards_amount
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    pool.bonus_acc_reward_per_share = math::accrue(
        env,
        &pool.bonus_acc_reward_per_share,
        &I256::from_i128(env, amount),
        pool.total_shares,
    );

    storage::set_pool(env, pool_id, &pool);

    events::rewards_added(
        env,
        RewardsAdded {
            pool_id,
            amount,
            bonus_acc_reward_per_share: pool.bonus_acc_reward_per_share.clone(),
        },
    );

    Ok(pool)
}
