//! Pool registry: an append-only list of pools and the lazy block accumulator.

use accrue_shared::{invariants, math, LedgerError, PoolFee};
use soroban_sdk::{Address, Env, I256};

use crate::events::{self, AllocPointUpdated, MinStakeUpdated, PoolAdded, PoolFeeUpdated};
use crate::storage;
use crate::types::{Pool, ProductRules, RewardConfig};

/// Advances the block accumulator of `pool` to `current_block` in memory.
///
/// The pool earns `reward_per_block * alloc_point / total_alloc_point` per
/// block. Emission for blocks in which the pool had no shares is dropped.
pub fn settle(env: &Env, pool: &mut Pool, reward_config: &RewardConfig, current_block: u32) {
    if current_block <= pool.last_reward_block {
        return;
    }

    if pool.total_shares == 0 {
        pool.last_reward_block = current_block;
        return;
    }

    let elapsed = current_block - pool.last_reward_block;
    let reward = math::emission(
        env,
        elapsed,
        reward_config.reward_per_block,
        pool.alloc_point,
        reward_config.total_alloc_point,
    );
    pool.acc_reward_per_share =
        math::accrue(env, &pool.acc_reward_per_share, &reward, pool.total_shares);
    pool.last_reward_block = current_block;
}

/// Loads a pool settled to the current ledger sequence without persisting it.
pub fn load_settled(env: &Env, pool_id: u32) -> Result<Pool, LedgerError> {
    let reward_config = storage::get_reward_config(env)?;
    let mut pool = storage::get_pool(env, pool_id)?;
    settle(env, &mut pool, &reward_config, env.ledger().sequence());
    Ok(pool)
}

/// Settles every pool under `reward_config`; used before the rate or the
/// allocation weights change.
pub fn settle_all(env: &Env, reward_config: &RewardConfig) -> Result<(), LedgerError> {
    let current_block = env.ledger().sequence();
    for pool_id in 0..storage::get_pool_count(env) {
        let mut pool = storage::get_pool(env, pool_id)?;
        settle(env, &mut pool, reward_config, current_block);
        storage::set_pool(env, pool_id, &pool);
    }
    Ok(())
}

fn update_total_alloc(
    reward_config: &mut RewardConfig,
    old_alloc_point: i128,
    new_alloc_point: i128,
) -> Result<(), LedgerError> {
    reward_config.total_alloc_point = reward_config
        .total_alloc_point
        .checked_sub(old_alloc_point)
        .and_then(|total| total.checked_add(new_alloc_point))
        .ok_or(LedgerError::ArithmeticOverflow)?;
    Ok(())
}

pub fn add_pool(
    env: &Env,
    rules: &ProductRules,
    base_token: Address,
    reward_token: Address,
    last_reward_block: u32,
    acc_reward_per_share: I256,
    fee: PoolFee,
    min_stake_amount: i128,
    alloc_point: i128,
) -> Result<u32, LedgerError> {
    if !fee.is_valid() {
        return Err(LedgerError::InvalidFee);
    }
    if acc_reward_per_share < I256::from_i32(env, 0) || min_stake_amount < 0 || alloc_point < 0 {
        return Err(LedgerError::InvalidAmount);
    }
    if rules.reject_duplicate_pools && storage::has_pool_pair(env, &base_token, &reward_token) {
        return Err(LedgerError::PoolAlreadyExists);
    }

    let pool_id = storage::get_pool_count(env);
    let next_count = pool_id
        .checked_add(1)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    // Existing pools earn at their old weight up to this block
    let mut reward_config = storage::get_reward_config(env)?;
    settle_all(env, &reward_config)?;
    update_total_alloc(&mut reward_config, 0, alloc_point)?;

    // Emission never starts in the past
    let start_block = last_reward_block.max(env.ledger().sequence());

    let pool = Pool {
        base_token: base_token.clone(),
        reward_token: reward_token.clone(),
        total_shares: 0,
        last_reward_block: start_block,
        alloc_point,
        acc_reward_per_share,
        bonus_rewards_amount: 0,
        bonus_acc_reward_per_share: I256::from_i32(env, 0),
        fee,
        min_stake_amount,
    };

    storage::set_pool(env, pool_id, &pool);
    storage::set_pool_pair(env, &base_token, &reward_token, pool_id);
    storage::set_pool_count(env, next_count);
    storage::set_reward_config(env, &reward_config);

    events::pool_added(
        env,
        PoolAdded {
            pool_id,
            base_token,
            reward_token,
            last_reward_block: start_block,
        },
    );

    Ok(pool_id)
}

/// Overrides the emission bookkeeping of a pool after settling it.
pub fn set_pool_info(
    env: &Env,
    pool_id: u32,
    last_reward_block: u32,
    acc_reward_per_share: I256,
) -> Result<Pool, LedgerError> {
    let mut pool = load_settled(env, pool_id)?;

    invariants::ensure_non_decreasing(&pool.acc_reward_per_share, &acc_reward_per_share)?;
    if last_reward_block < env.ledger().sequence() {
        return Err(LedgerError::InvalidAmount);
    }

    pool.last_reward_block = last_reward_block;
    pool.acc_reward_per_share = acc_reward_per_share;
    storage::set_pool(env, pool_id, &pool);
    Ok(pool)
}

/// Re-weights a pool. Every pool is settled at the old weights first.
pub fn set_allocation_point(
    env: &Env,
    pool_id: u32,
    alloc_point: i128,
) -> Result<Pool, LedgerError> {
    if alloc_point < 0 {
        return Err(LedgerError::InvalidAmount);
    }
    let mut reward_config = storage::get_reward_config(env)?;
    settle_all(env, &reward_config)?;

    let mut pool = storage::get_pool(env, pool_id)?;
    update_total_alloc(&mut reward_config, pool.alloc_point, alloc_point)?;
    pool.alloc_point = alloc_point;

    storage::set_pool(env, pool_id, &pool);
    storage::set_reward_config(env, &reward_config);

    events::alloc_point_updated(
        env,
        AllocPointUpdated {
            pool_id,
            alloc_point,
            total_alloc_point: reward_config.total_alloc_point,
        },
    );
    Ok(pool)
}

pub fn set_pool_fee(env: &Env, pool_id: u32, fee: PoolFee) -> Result<Pool, LedgerError> {
    if !fee.is_valid() {
        return Err(LedgerError::InvalidFee);
    }
    let mut pool = storage::get_pool(env, pool_id)?;
    pool.fee = fee.clone();
    storage::set_pool(env, pool_id, &pool);

    events::pool_fee_updated(env, PoolFeeUpdated { pool_id, fee });
    Ok(pool)
}

pub fn set_min_stake_amount(
    env: &Env,
    pool_id: u32,
    min_stake_amount: i128,
) -> Result<Pool, LedgerError> {
    if min_stake_amount < 0 {
        return Err(LedgerError::InvalidAmount);
    }
    let mut pool = storage::get_pool(env, pool_id)?;
    pool.min_stake_amount = min_stake_amount;
    storage::set_pool(env, pool_id, &pool);

    events::min_stake_updated(
        env,
        MinStakeUpdated {
            pool_id,
            min_stake_amount,
        },
    );
    Ok(pool)
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    const RATE: i128 = 100_000_000_000_000_000;

    fn sample_pool(env: &Env, total_shares: i128, last_reward_block: u32) -> Pool {
        Pool {
            base_token: Address::generate(env),
            reward_token: Address::generate(env),
            total_shares,
            last_reward_block,
            alloc_point: 1,
            acc_reward_per_share: I256::from_i32(env, 0),
            bonus_rewards_amount: 0,
            bonus_acc_reward_per_share: I256::from_i32(env, 0),
            fee: PoolFee::zero(),
            min_stake_amount: 0,
        }
    }

    fn rate(reward_per_block: i128, total_alloc_point: i128) -> RewardConfig {
        RewardConfig {
            reward_per_block,
            update_blocks_interval: 0,
            last_update_block_num: 0,
            total_alloc_point,
        }
    }

    #[test]
    fn test_settle_accrues_block_emission() {
        let env = Env::default();
        let mut pool = sample_pool(&env, 100, 10);

        settle(&env, &mut pool, &rate(RATE, 1), 20);

        assert_eq!(pool.last_reward_block, 20);
        assert_eq!(
            math::pending(&env, 100, &pool.acc_reward_per_share, &I256::from_i32(&env, 0)),
            Ok(1_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_settle_weights_by_allocation() {
        let env = Env::default();
        let mut pool = sample_pool(&env, 100, 10);
        pool.alloc_point = 1;

        // One of four allocation points
        settle(&env, &mut pool, &rate(RATE, 4), 20);

        assert_eq!(
            math::pending(&env, 100, &pool.acc_reward_per_share, &I256::from_i32(&env, 0)),
            Ok(250_000_000_000_000_000)
        );
    }

    #[test]
    fn test_settle_is_idempotent_at_one_height() {
        let env = Env::default();
        let mut pool = sample_pool(&env, 300, 5);

        settle(&env, &mut pool, &rate(7, 1), 50);
        let once = pool.clone();
        settle(&env, &mut pool, &rate(7, 1), 50);
        assert_eq!(pool, once);

        // Earlier heights never move the accumulator backwards
        settle(&env, &mut pool, &rate(7, 1), 40);
        assert_eq!(pool, once);
    }

    #[test]
    fn test_settle_empty_pool_drops_emission() {
        let env = Env::default();
        let mut pool = sample_pool(&env, 0, 10);

        settle(&env, &mut pool, &rate(1_000, 1), 30);

        assert_eq!(pool.acc_reward_per_share, I256::from_i32(&env, 0));
        assert_eq!(pool.last_reward_block, 30);
    }

    #[test]
    fn test_settle_before_start_block_is_noop() {
        let env = Env::default();
        let mut pool = sample_pool(&env, 100, 500);

        settle(&env, &mut pool, &rate(1_000, 1), 200);

        assert_eq!(pool.acc_reward_per_share, I256::from_i32(&env, 0));
        assert_eq!(pool.last_reward_block, 500);
    }

    #[test]
    fn test_settle_single_share_keeps_accruing() {
        let env = Env::default();
        let mut pool = sample_pool(&env, 1, 0);

        // Each step pushes the accumulator further past i128::MAX
        for block in [2_000u32, 4_000, 6_000] {
            settle(&env, &mut pool, &rate(RATE, 1), block);
            assert_eq!(pool.last_reward_block, block);
        }
        assert_eq!(pool.acc_reward_per_share.to_i128(), None);
        assert_eq!(
            math::pending(&env, 1, &pool.acc_reward_per_share, &I256::from_i32(&env, 0)),
            Ok(600 * 1_000_000_000_000_000_000)
        );
    }
}
