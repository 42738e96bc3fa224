//! Checks over ledger accounting that must hold after every operation.

use crate::LedgerError;

/// Accumulators only ever grow; a decrease would make earlier reward-debt
/// snapshots exceed the accrued value.
pub fn ensure_non_decreasing<T: PartialOrd>(previous: &T, next: &T) -> Result<(), LedgerError> {
    if next < previous {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

/// `total_shares` must equal the sum of every active deposit amount.
pub fn shares_balanced<I>(total_shares: i128, active_amounts: I) -> bool
where
    I: IntoIterator<Item = i128>,
{
    let mut sum: i128 = 0;
    for amount in active_amounts {
        if amount < 0 {
            return false;
        }
        sum = match sum.checked_add(amount) {
            Some(value) => value,
            None => return false,
        };
    }
    sum == total_shares
}

/// Total payouts may not exceed what was emitted plus what was injected.
/// `tolerance` absorbs per-deposit floor rounding.
pub fn within_emission_budget(
    paid_out: i128,
    blocks_elapsed: u32,
    reward_per_block: i128,
    bonus_rewards_amount: i128,
    tolerance: i128,
) -> bool {
    let emitted = match (blocks_elapsed as i128).checked_mul(reward_per_block) {
        Some(value) => value,
        None => return false,
    };
    match emitted
        .checked_add(bonus_rewards_amount)
        .and_then(|budget| budget.checked_add(tolerance))
    {
        Some(budget) => paid_out <= budget,
        None => false,
    }
}
