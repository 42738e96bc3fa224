//! Fee engine and fixed-point accumulator math.
//!
//! All values handled here are non-negative token amounts or accumulators, so
//! integer division truncates toward zero, which is floor rounding. Rounding
//! remainders always stay in the contract and are never credited to a user.

use soroban_sdk::{Env, I256};

use crate::{LedgerError, ACC_PRECISION, MAX_BASIS_POINTS, MULTIPLIER_PRECISION};

/// Computes `a * b / denominator` rounded down.
///
/// Products that do not fit in `i128` are evaluated with 256-bit host
/// integers; only a quotient that itself overflows `i128` is an error.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, LedgerError> {
    if a < 0 || b < 0 || denominator <= 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }

    match a.checked_mul(b) {
        Some(product) => Ok(product / denominator),
        None => {
            let wide = I256::from_i128(env, a)
                .mul(&I256::from_i128(env, b))
                .div(&I256::from_i128(env, denominator));
            wide.to_i128().ok_or(LedgerError::ArithmeticOverflow)
        }
    }
}

/// Basis-point fee on `amount`: `amount * fee_bps / 10000`.
pub fn compute_fee(env: &Env, amount: i128, fee_bps: u32) -> Result<i128, LedgerError> {
    if fee_bps as i128 > MAX_BASIS_POINTS {
        return Err(LedgerError::InvalidFee);
    }
    mul_div(env, amount, fee_bps as i128, MAX_BASIS_POINTS)
}

/// Splits `amount` into `(net, fee)`.
pub fn split_fee(env: &Env, amount: i128, fee_bps: u32) -> Result<(i128, i128), LedgerError> {
    let fee = compute_fee(env, amount, fee_bps)?;
    let net = amount
        .checked_sub(fee)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    Ok((net, fee))
}

fn acc_precision(env: &Env) -> I256 {
    I256::from_i128(env, ACC_PRECISION)
}

/// Block emission for `elapsed` blocks, weighted by the pool's share of
/// the allocation points. Zero when no allocation point is set.
pub fn emission(
    env: &Env,
    elapsed: u32,
    reward_per_block: i128,
    alloc_point: i128,
    total_alloc_point: i128,
) -> I256 {
    if reward_per_block <= 0 || alloc_point <= 0 || total_alloc_point <= 0 {
        return I256::from_i32(env, 0);
    }
    I256::from_i128(env, reward_per_block)
        .mul(&I256::from_i128(env, elapsed as i128))
        .mul(&I256::from_i128(env, alloc_point))
        .div(&I256::from_i128(env, total_alloc_point))
}

/// Advances an accumulator by `reward` spread over `total_shares`.
///
/// Accumulators are 256-bit, so a pool with very few shares keeps accruing
/// instead of failing every later settlement.
pub fn accrue(env: &Env, acc_per_share: &I256, reward: &I256, total_shares: i128) -> I256 {
    if total_shares <= 0 || *reward <= I256::from_i32(env, 0) {
        return acc_per_share.clone();
    }
    let increment = reward
        .mul(&acc_precision(env))
        .div(&I256::from_i128(env, total_shares));
    acc_per_share.add(&increment)
}

/// `amount * acc_per_share / 1e18`, the value a reward-debt snapshot stores.
pub fn accumulated(env: &Env, amount: i128, acc_per_share: &I256) -> I256 {
    if amount <= 0 {
        return I256::from_i32(env, 0);
    }
    I256::from_i128(env, amount)
        .mul(acc_per_share)
        .div(&acc_precision(env))
}

/// Unclaimed reward of a position against one accumulator.
///
/// Fails with `ArithmeticOverflow` only when the reward itself does not fit
/// in a token amount.
pub fn pending(
    env: &Env,
    amount: i128,
    acc_per_share: &I256,
    reward_debt: &I256,
) -> Result<i128, LedgerError> {
    let owed = accumulated(env, amount, acc_per_share).sub(reward_debt);
    if owed <= I256::from_i32(env, 0) {
        return Ok(0);
    }
    owed.to_i128().ok_or(LedgerError::ArithmeticOverflow)
}

/// Scales a reward by a lock multiplier (100000 = 1.0x).
pub fn apply_multiplier(env: &Env, reward: i128, multiplier: u32) -> Result<i128, LedgerError> {
    if multiplier == MULTIPLIER_PRECISION {
        return Ok(reward);
    }
    mul_div(env, reward, multiplier as i128, MULTIPLIER_PRECISION as i128)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fee_floor_rounding() {
        let env = Env::default();
        assert_eq!(compute_fee(&env, 1000, 100), Ok(10));
        assert_eq!(compute_fee(&env, 999, 100), Ok(9));
        assert_eq!(compute_fee(&env, 1, 9_999), Ok(0));
        assert_eq!(compute_fee(&env, 1000, 10_000), Ok(1000));
        assert_eq!(compute_fee(&env, 1000, 10_001), Err(LedgerError::InvalidFee));
    }

    #[test]
    fn test_split_fee_never_exceeds_amount() {
        let env = Env::default();
        for bps in [0u32, 1, 50, 100, 2_500, 10_000] {
            let (net, fee) = split_fee(&env, 123_456_789, bps).unwrap();
            assert!(fee <= 123_456_789);
            assert_eq!(net + fee, 123_456_789);
        }
    }

    #[test]
    fn test_accrue_single_depositor() {
        let env = Env::default();
        // 10 blocks at 0.1 token per block over 100 shares
        let reward = emission(&env, 10, 100_000_000_000_000_000, 1, 1);
        let acc = accrue(&env, &I256::from_i32(&env, 0), &reward, 100);
        assert_eq!(
            acc,
            I256::from_i128(&env, 10_000_000_000_000_000_000_000_000_000_000_000)
        );
        assert_eq!(
            pending(&env, 100, &acc, &I256::from_i32(&env, 0)),
            Ok(1_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_accrue_without_shares_keeps_accumulator() {
        let env = Env::default();
        let acc = I256::from_i32(&env, 42);
        assert_eq!(accrue(&env, &acc, &I256::from_i32(&env, 1_000), 0), acc);
    }

    #[test]
    fn test_emission_weighted_by_allocation() {
        let env = Env::default();
        assert_eq!(emission(&env, 10, 1_000, 1, 4), I256::from_i32(&env, 2_500));
        assert_eq!(emission(&env, 10, 1_000, 3, 4), I256::from_i32(&env, 7_500));
        assert_eq!(emission(&env, 10, 1_000, 0, 4), I256::from_i32(&env, 0));
        assert_eq!(emission(&env, 10, 1_000, 1, 0), I256::from_i32(&env, 0));
    }

    #[test]
    fn test_accrue_single_share_beyond_i128() {
        let env = Env::default();
        // 0.1 token per block into one share unit for 2000 blocks: 2e38 > i128::MAX
        let reward = emission(&env, 2_000, 100_000_000_000_000_000, 1, 1);
        let acc = accrue(&env, &I256::from_i32(&env, 0), &reward, 1);
        assert_eq!(acc.to_i128(), None);
        assert_eq!(
            pending(&env, 1, &acc, &I256::from_i32(&env, 0)),
            Ok(200_000_000_000_000_000_000)
        );

        // A reward that no token amount can hold is reported, not wrapped
        let huge = I256::from_i128(&env, i128::MAX)
            .mul(&acc_precision(&env))
            .mul(&I256::from_i32(&env, 4));
        assert_eq!(
            pending(&env, 1, &huge, &I256::from_i32(&env, 0)),
            Err(LedgerError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        let env = Env::default();
        // a * b overflows i128 but the quotient fits
        let a = 10i128.pow(30);
        let b = 10i128.pow(20);
        assert_eq!(mul_div(&env, a, b, ACC_PRECISION), Ok(10i128.pow(32)));

        // quotient itself does not fit
        assert_eq!(
            mul_div(&env, i128::MAX, i128::MAX, 1),
            Err(LedgerError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_mul_div_rejects_negative_operands() {
        let env = Env::default();
        assert_eq!(mul_div(&env, -1, 5, 1), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(mul_div(&env, 1, 5, 0), Err(LedgerError::ArithmeticOverflow));
    }

    #[test]
    fn test_pending_matches_debt_at_snapshot() {
        let env = Env::default();
        let acc = I256::from_i128(&env, 3_333_333_333_333_333_333);
        let debt = accumulated(&env, 7, &acc);
        assert_eq!(pending(&env, 7, &acc, &debt), Ok(0));
        // A debt above the accrued value never turns into a negative reward
        let stale = debt.add(&I256::from_i32(&env, 1));
        assert_eq!(pending(&env, 7, &acc, &stale), Ok(0));
    }

    #[test]
    fn test_apply_multiplier() {
        let env = Env::default();
        assert_eq!(apply_multiplier(&env, 1_000, MULTIPLIER_PRECISION), Ok(1_000));
        assert_eq!(apply_multiplier(&env, 1_000, 150_000), Ok(1_500));
        assert_eq!(apply_multiplier(&env, 1_000_000, 100_005), Ok(1_000_050));
        assert_eq!(apply_multiplier(&env, 3, 50_000), Ok(1));
    }
}
