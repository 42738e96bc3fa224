use accrue_shared::LedgerError;
use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Deposit, LedgerConfig, LockPeriod, Pool, ProductRules, RewardConfig, UserInfo};

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

// Storage Keys
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    Rules,
    RewardConfig,
    PoolCount,
    Pool(u32),
    PoolPair(Address, Address), // base_token, reward_token
    Deposit(Address, u32, u32), // user, pool_id, deposit_id
    UserInfo(Address, u32), // user, pool_id
    LockPeriod(u32),
    Tvl(u32, u32), // pool_id, lock_id
}

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn read_persistent<T>(env: &Env, key: &DataKey) -> Option<T>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    }
    value
}

fn write_persistent<T>(env: &Env, key: &DataKey, value: &T)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

// ============================================================================
// Instance storage
// ============================================================================

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<LedgerConfig, LedgerError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(LedgerError::NotInitialized)
}

pub fn set_config(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_rules(env: &Env) -> ProductRules {
    env.storage()
        .instance()
        .get(&DataKey::Rules)
        .unwrap_or_default()
}

pub fn set_rules(env: &Env, rules: &ProductRules) {
    env.storage().instance().set(&DataKey::Rules, rules);
}

pub fn get_reward_config(env: &Env) -> Result<RewardConfig, LedgerError> {
    env.storage()
        .instance()
        .get(&DataKey::RewardConfig)
        .ok_or(LedgerError::NotInitialized)
}

pub fn set_reward_config(env: &Env, config: &RewardConfig) {
    env.storage().instance().set(&DataKey::RewardConfig, config);
}

pub fn get_pool_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::PoolCount)
        .unwrap_or(0)
}

pub fn set_pool_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::PoolCount, &count);
}

// ============================================================================
// Persistent storage
// ============================================================================

pub fn get_pool(env: &Env, pool_id: u32) -> Result<Pool, LedgerError> {
    read_persistent(env, &DataKey::Pool(pool_id)).ok_or(LedgerError::WrongPool)
}

pub fn set_pool(env: &Env, pool_id: u32, pool: &Pool) {
    write_persistent(env, &DataKey::Pool(pool_id), pool);
}

pub fn has_pool_pair(env: &Env, base_token: &Address, reward_token: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::PoolPair(base_token.clone(), reward_token.clone()))
}

pub fn set_pool_pair(env: &Env, base_token: &Address, reward_token: &Address, pool_id: u32) {
    write_persistent(
        env,
        &DataKey::PoolPair(base_token.clone(), reward_token.clone()),
        &pool_id,
    );
}

pub fn get_deposit(
    env: &Env,
    user: &Address,
    pool_id: u32,
    deposit_id: u32,
) -> Result<Deposit, LedgerError> {
    read_persistent(env, &DataKey::Deposit(user.clone(), pool_id, deposit_id))
        .ok_or(LedgerError::DepositNotFound)
}

pub fn set_deposit(env: &Env, user: &Address, pool_id: u32, deposit_id: u32, deposit: &Deposit) {
    write_persistent(
        env,
        &DataKey::Deposit(user.clone(), pool_id, deposit_id),
        deposit,
    );
}

pub fn get_user_info(env: &Env, user: &Address, pool_id: u32) -> UserInfo {
    read_persistent(env, &DataKey::UserInfo(user.clone(), pool_id)).unwrap_or_default()
}

pub fn set_user_info(env: &Env, user: &Address, pool_id: u32, info: &UserInfo) {
    write_persistent(env, &DataKey::UserInfo(user.clone(), pool_id), info);
}

pub fn get_lock_period(env: &Env, lock_id: u32) -> Option<LockPeriod> {
    read_persistent(env, &DataKey::LockPeriod(lock_id))
}

pub fn set_lock_period(env: &Env, lock_id: u32, lock: &LockPeriod) {
    write_persistent(env, &DataKey::LockPeriod(lock_id), lock);
}

pub fn get_tvl(env: &Env, pool_id: u32, lock_id: u32) -> i128 {
    read_persistent(env, &DataKey::Tvl(pool_id, lock_id)).unwrap_or(0)
}

pub fn set_tvl(env: &Env, pool_id: u32, lock_id: u32, tvl: i128) {
    write_persistent(env, &DataKey::Tvl(pool_id, lock_id), &tvl);
}
