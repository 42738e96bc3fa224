//! Lock period table: lock id -> (duration, reward multiplier).

use accrue_shared::LedgerError;
use soroban_sdk::Env;

use crate::events::{self, LockPeriodUpdated};
use crate::storage;
use crate::types::{LockPeriod, ProductRules};

/// Lock period of `lock_id`, defaulting to no lock at 1.0x.
pub fn resolve(env: &Env, lock_id: u32) -> LockPeriod {
    storage::get_lock_period(env, lock_id).unwrap_or_default()
}

/// Lock period for a user deposit; unknown ids fail under strict rules.
pub fn resolve_for_deposit(
    env: &Env,
    rules: &ProductRules,
    lock_id: u32,
) -> Result<LockPeriod, LedgerError> {
    match storage::get_lock_period(env, lock_id) {
        Some(lock) => Ok(lock),
        None if rules.strict_lock_ids => Err(LedgerError::WrongLockPeriod),
        None => Ok(LockPeriod::default()),
    }
}

pub fn set_duration(env: &Env, lock_id: u32, duration: u64) -> LockPeriod {
    let mut lock = resolve(env, lock_id);
    lock.duration = duration;
    store(env, lock_id, &lock);
    lock
}

pub fn set_multiplier(env: &Env, lock_id: u32, multiplier: u32) -> Result<LockPeriod, LedgerError> {
    if multiplier == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    let mut lock = resolve(env, lock_id);
    lock.multiplier = multiplier;
    store(env, lock_id, &lock);
    Ok(lock)
}

fn store(env: &Env, lock_id: u32, lock: &LockPeriod) {
    storage::set_lock_period(env, lock_id, lock);
    events::lock_period_updated(
        env,
        LockPeriodUpdated {
            lock_id,
            duration: lock.duration,
            multiplier: lock.multiplier,
        },
    );
}
