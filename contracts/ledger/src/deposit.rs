//! Deposit ledger: per-user deposit records and the token movements around them.

use accrue_shared::{math, validate_positive_amount, LedgerError};
use soroban_sdk::{token, Address, Env, I256};

use crate::events::{self, Claimed, Deposited, Withdrawn};
use crate::lock;
use crate::pool;
use crate::storage;
use crate::types::{Deposit, Payout, Pool, ProductRules, UserInfo};

// ============================================================================
// Reward math over a single record
// ============================================================================

/// Unclaimed reward of `record` against an already settled `pool`.
///
/// The lock multiplier scales the block-emission part only; bonus
/// injections are paid exactly as funded.
pub fn pending_of(env: &Env, pool: &Pool, record: &Deposit) -> Result<i128, LedgerError> {
    if record.finished {
        return Ok(0);
    }

    let multiplier = lock::resolve(env, record.lock_id).multiplier;
    let block_part = math::pending(
        env,
        record.amount,
        &pool.acc_reward_per_share,
        &record.reward_debt,
    )?;
    let block_part = math::apply_multiplier(env, block_part, multiplier)?;
    let bonus_part = math::pending(
        env,
        record.amount,
        &pool.bonus_acc_reward_per_share,
        &record.bonus_reward_debt,
    )?;

    block_part
        .checked_add(bonus_part)
        .ok_or(LedgerError::ArithmeticOverflow)
}

fn snapshot_debts(env: &Env, pool: &Pool, record: &mut Deposit) {
    record.reward_debt = math::accumulated(env, record.amount, &pool.acc_reward_per_share);
    record.bonus_reward_debt =
        math::accumulated(env, record.amount, &pool.bonus_acc_reward_per_share);
}

/// Moves the pending reward of `record` out of the accumulators.
/// Returns `(net, fee)`; `total_claimed` grows by the net part.
fn take_reward(
    env: &Env,
    pool: &Pool,
    record: &mut Deposit,
    claim_fee: u32,
) -> Result<(i128, i128), LedgerError> {
    let gross = pending_of(env, pool, record)?;
    snapshot_debts(env, pool, record);

    let (net, fee) = math::split_fee(env, gross, claim_fee)?;
    record.total_claimed = record
        .total_claimed
        .checked_add(net)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    Ok((net, fee))
}

/// `take_reward` for withdrawals. A reward too large for a token amount is
/// forfeited instead of failing, so principal can always leave the pool.
/// Returns `(net, fee, forfeited)`.
fn take_reward_on_exit(
    env: &Env,
    pool: &Pool,
    record: &mut Deposit,
    claim_fee: u32,
) -> Result<(i128, i128, bool), LedgerError> {
    match take_reward(env, pool, record, claim_fee) {
        Ok((net, fee)) => Ok((net, fee, false)),
        Err(LedgerError::ArithmeticOverflow) => {
            snapshot_debts(env, pool, record);
            Ok((0, 0, true))
        }
        Err(err) => Err(err),
    }
}

fn add_claim(info: &mut UserInfo, reward: i128) -> Result<(), LedgerError> {
    info.total_claim = info
        .total_claim
        .checked_add(reward)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    Ok(())
}

// ============================================================================
// Token movements
// ============================================================================

fn pull_in(env: &Env, token: &Address, from: &Address, gross: i128, fee: i128) {
    let client = token::Client::new(env, token);
    let this = env.current_contract_address();
    client.transfer(from, &this, &gross);
    if fee > 0 {
        client.burn(&this, &fee);
    }
}

fn pay_out(env: &Env, token: &Address, to: &Address, amount: i128, fee: i128) {
    let client = token::Client::new(env, token);
    let this = env.current_contract_address();
    if amount > 0 {
        client.transfer(&this, to, &amount);
    }
    if fee > 0 {
        client.burn(&this, &fee);
    }
}

// ============================================================================
// Opening and closing positions
// ============================================================================

/// Appends a deposit record for `user` and grows every aggregate by `amount`.
/// `pool` must already be settled; it is persisted here.
fn open(
    env: &Env,
    user: &Address,
    pool_id: u32,
    pool: &mut Pool,
    lock_id: u32,
    amount: i128,
    deposit_timestamp: u64,
    withdrawal_timestamp: u64,
) -> Result<u32, LedgerError> {
    let mut info = storage::get_user_info(env, user, pool_id);
    let deposit_id = info.deposit_count;

    let mut record = Deposit {
        amount,
        lock_id,
        deposit_timestamp,
        withdrawal_timestamp,
        reward_debt: I256::from_i32(env, 0),
        bonus_reward_debt: I256::from_i32(env, 0),
        total_claimed: 0,
        finished: false,
    };
    snapshot_debts(env, pool, &mut record);

    let total_shares = pool
        .total_shares
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    let tvl = storage::get_tvl(env, pool_id, lock_id)
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    info.deposit_count = deposit_id
        .checked_add(1)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    info.total_deposit_amount = info
        .total_deposit_amount
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    pool.total_shares = total_shares;
    storage::set_pool(env, pool_id, pool);
    storage::set_deposit(env, user, pool_id, deposit_id, &record);
    storage::set_user_info(env, user, pool_id, &info);
    storage::set_tvl(env, pool_id, lock_id, tvl);

    Ok(deposit_id)
}

/// Takes `amount` of principal out of `record` and every aggregate.
/// Reward debts are re-snapshotted at the remaining amount.
fn reduce(
    env: &Env,
    pool: &mut Pool,
    record: &mut Deposit,
    info: &mut UserInfo,
    tvl: &mut i128,
    amount: i128,
) -> Result<(), LedgerError> {
    record.amount = record
        .amount
        .checked_sub(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    pool.total_shares = pool
        .total_shares
        .checked_sub(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    info.total_deposit_amount = info
        .total_deposit_amount
        .checked_sub(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    *tvl = tvl
        .checked_sub(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    record.finished = record.amount == 0;
    snapshot_debts(env, pool, record);
    Ok(())
}

fn load_active(
    env: &Env,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
) -> Result<Deposit, LedgerError> {
    let record = storage::get_deposit(env, user, pool_id, deposit_id)?;
    if record.finished {
        return Err(LedgerError::AlreadyWithdrawn);
    }
    Ok(record)
}

// ============================================================================
// Ledger operations
// ============================================================================

pub fn deposit(
    env: &Env,
    rules: &ProductRules,
    user: &Address,
    pool_id: u32,
    lock_id: u32,
    gross_amount: i128,
) -> Result<u32, LedgerError> {
    let mut pool = pool::load_settled(env, pool_id)?;
    let lock = lock::resolve_for_deposit(env, rules, lock_id)?;
    if !validate_positive_amount(gross_amount) {
        return Err(LedgerError::InvalidAmount);
    }

    let (net_amount, fee) = math::split_fee(env, gross_amount, pool.fee.deposit_fee)?;
    if net_amount <= 0 || net_amount < pool.min_stake_amount {
        return Err(LedgerError::InvalidAmount);
    }

    let deposit_timestamp = env.ledger().timestamp();
    let withdrawal_timestamp = deposit_timestamp
        .checked_add(lock.duration)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    let deposit_id = open(
        env,
        user,
        pool_id,
        &mut pool,
        lock_id,
        net_amount,
        deposit_timestamp,
        withdrawal_timestamp,
    )?;

    pull_in(env, &pool.base_token, user, gross_amount, fee);

    events::deposited(
        env,
        Deposited {
            user: user.clone(),
            pool_id,
            deposit_id,
            lock_id,
            amount: net_amount,
            fee,
            withdrawal_timestamp,
        },
    );

    Ok(deposit_id)
}

/// Deposit made by the vesting collaborator on behalf of `user`.
/// No fee, no minimum and no lock-id validation; the lock window is supplied.
pub fn deposit_vesting(
    env: &Env,
    vesting: &Address,
    user: &Address,
    pool_id: u32,
    amount: i128,
    deposit_timestamp: u64,
    withdrawal_timestamp: u64,
    lock_id: u32,
) -> Result<u32, LedgerError> {
    let mut pool = pool::load_settled(env, pool_id)?;
    if !validate_positive_amount(amount) || withdrawal_timestamp < deposit_timestamp {
        return Err(LedgerError::InvalidAmount);
    }

    let deposit_id = open(
        env,
        user,
        pool_id,
        &mut pool,
        lock_id,
        amount,
        deposit_timestamp,
        withdrawal_timestamp,
    )?;

    pull_in(env, &pool.base_token, vesting, amount, 0);

    events::deposited(
        env,
        Deposited {
            user: user.clone(),
            pool_id,
            deposit_id,
            lock_id,
            amount,
            fee: 0,
            withdrawal_timestamp,
        },
    );

    Ok(deposit_id)
}

pub fn claim(
    env: &Env,
    rules: &ProductRules,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
) -> Result<Payout, LedgerError> {
    let pool = pool::load_settled(env, pool_id)?;
    let mut record = load_active(env, user, pool_id, deposit_id)?;

    let (reward, fee) = take_reward(env, &pool, &mut record, pool.fee.claim_fee)?;
    if reward == 0 && fee == 0 {
        if rules.allow_empty_claims {
            return Ok(Payout::default());
        }
        return Err(LedgerError::InvalidAmount);
    }

    let mut info = storage::get_user_info(env, user, pool_id);
    add_claim(&mut info, reward)?;

    storage::set_pool(env, pool_id, &pool);
    storage::set_deposit(env, user, pool_id, deposit_id, &record);
    storage::set_user_info(env, user, pool_id, &info);

    pay_out(env, &pool.reward_token, user, reward, fee);

    events::claimed(
        env,
        Claimed {
            user: user.clone(),
            pool_id,
            deposit_id,
            reward,
            fee,
        },
    );

    Ok(Payout {
        reward,
        reward_fee: fee,
        ..Payout::default()
    })
}

/// Claims every active deposit of `user` in the pool, optionally only those
/// with the given lock id. Deposits with nothing pending are skipped.
pub fn claim_many(
    env: &Env,
    rules: &ProductRules,
    user: &Address,
    pool_id: u32,
    lock_filter: Option<u32>,
) -> Result<Payout, LedgerError> {
    let pool = pool::load_settled(env, pool_id)?;
    let mut info = storage::get_user_info(env, user, pool_id);
    let mut payout = Payout::default();

    for deposit_id in 0..info.deposit_count {
        let mut record = storage::get_deposit(env, user, pool_id, deposit_id)?;
        if record.finished || matches!(lock_filter, Some(lock_id) if lock_id != record.lock_id) {
            continue;
        }

        let (reward, fee) = take_reward(env, &pool, &mut record, pool.fee.claim_fee)?;
        if reward == 0 && fee == 0 {
            continue;
        }

        payout.reward = payout
            .reward
            .checked_add(reward)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        payout.reward_fee = payout
            .reward_fee
            .checked_add(fee)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        storage::set_deposit(env, user, pool_id, deposit_id, &record);
        events::claimed(
            env,
            Claimed {
                user: user.clone(),
                pool_id,
                deposit_id,
                reward,
                fee,
            },
        );
    }

    if payout.reward == 0 && payout.reward_fee == 0 {
        if rules.allow_empty_claims {
            return Ok(payout);
        }
        return Err(LedgerError::InvalidAmount);
    }

    add_claim(&mut info, payout.reward)?;
    storage::set_pool(env, pool_id, &pool);
    storage::set_user_info(env, user, pool_id, &info);

    pay_out(env, &pool.reward_token, user, payout.reward, payout.reward_fee);

    Ok(payout)
}

/// Closes a deposit once its lock window has passed: pays pending reward net
/// of the claim fee and principal net of the withdraw fee.
pub fn withdraw(
    env: &Env,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
) -> Result<Payout, LedgerError> {
    let mut pool = pool::load_settled(env, pool_id)?;
    let mut record = load_active(env, user, pool_id, deposit_id)?;
    if env.ledger().timestamp() < record.withdrawal_timestamp {
        return Err(LedgerError::PeriodNotEnded);
    }

    let (reward, reward_fee, reward_forfeited) =
        take_reward_on_exit(env, &pool, &mut record, pool.fee.claim_fee)?;
    let principal_gross = record.amount;
    let (principal, principal_fee) =
        math::split_fee(env, principal_gross, pool.fee.withdraw_fee)?;

    let mut info = storage::get_user_info(env, user, pool_id);
    let mut tvl = storage::get_tvl(env, pool_id, record.lock_id);
    reduce(env, &mut pool, &mut record, &mut info, &mut tvl, principal_gross)?;
    add_claim(&mut info, reward)?;

    let payout = Payout {
        reward,
        reward_fee,
        principal,
        principal_fee,
        reward_forfeited,
    };
    finish(env, user, pool_id, deposit_id, &pool, &record, &info, tvl, &payout);
    Ok(payout)
}

/// Partial or full withdrawal by the vesting collaborator, ignoring the lock
/// window and all fees.
pub fn withdraw_vesting(
    env: &Env,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
    amount: i128,
) -> Result<Payout, LedgerError> {
    let mut pool = pool::load_settled(env, pool_id)?;
    let mut record = load_active(env, user, pool_id, deposit_id)?;
    if !validate_positive_amount(amount) || amount > record.amount {
        return Err(LedgerError::InvalidAmount);
    }

    let (reward, _, reward_forfeited) = take_reward_on_exit(env, &pool, &mut record, 0)?;

    let mut info = storage::get_user_info(env, user, pool_id);
    let mut tvl = storage::get_tvl(env, pool_id, record.lock_id);
    reduce(env, &mut pool, &mut record, &mut info, &mut tvl, amount)?;
    add_claim(&mut info, reward)?;

    let payout = Payout {
        reward,
        principal: amount,
        reward_forfeited,
        ..Payout::default()
    };
    finish(env, user, pool_id, deposit_id, &pool, &record, &info, tvl, &payout);
    Ok(payout)
}

/// Persists a withdrawal and moves its tokens.
fn finish(
    env: &Env,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
    pool: &Pool,
    record: &Deposit,
    info: &UserInfo,
    tvl: i128,
    payout: &Payout,
) {
    storage::set_pool(env, pool_id, pool);
    storage::set_deposit(env, user, pool_id, deposit_id, record);
    storage::set_user_info(env, user, pool_id, info);
    storage::set_tvl(env, pool_id, record.lock_id, tvl);

    pay_out(env, &pool.reward_token, user, payout.reward, payout.reward_fee);
    pay_out(
        env,
        &pool.base_token,
        user,
        payout.principal,
        payout.principal_fee,
    );

    events::withdrawn(
        env,
        Withdrawn {
            user: user.clone(),
            pool_id,
            deposit_id,
            principal: payout.principal,
            principal_fee: payout.principal_fee,
            reward: payout.reward,
            reward_fee: payout.reward_fee,
            reward_forfeited: payout.reward_forfeited,
            finished: record.finished,
        },
    );
}

// ============================================================================
// Views
// ============================================================================

pub fn pending_reward(
    env: &Env,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
) -> Result<i128, LedgerError> {
    let pool = pool::load_settled(env, pool_id)?;
    let record = storage::get_deposit(env, user, pool_id, deposit_id)?;
    pending_of(env, &pool, &record)
}

pub fn pending_total(
    env: &Env,
    user: &Address,
    pool_id: u32,
    lock_filter: Option<u32>,
) -> Result<i128, LedgerError> {
    let pool = pool::load_settled(env, pool_id)?;
    let info = storage::get_user_info(env, user, pool_id);

    let mut total: i128 = 0;
    for deposit_id in 0..info.deposit_count {
        let record = storage::get_deposit(env, user, pool_id, deposit_id)?;
        if matches!(lock_filter, Some(lock_id) if lock_id != record.lock_id) {
            continue;
        }
        total = total
            .checked_add(pending_of(env, &pool, &record)?)
            .ok_or(LedgerError::ArithmeticOverflow)?;
    }
    Ok(total)
}
