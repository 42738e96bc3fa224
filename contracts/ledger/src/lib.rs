#![no_std]
use accrue_shared::{LedgerError, PoolFee};
use soroban_sdk::{contract, contractimpl, log, Address, Env, I256};

mod access;
mod bonus;
mod deposit;
pub mod events;
mod lock;
mod pool;
mod storage;
pub mod types;

pub use types::{
    Deposit, LedgerConfig, LockPeriod, Payout, Pool, ProductRules, RewardConfig, UserInfo,
};

#[contract]
pub struct RewardLedger;

#[contractimpl]
impl RewardLedger {
    // ========================================================================
    // Configuration
    // ========================================================================

    /// Initialize the ledger
    pub fn initialize(
        env: Env,
        admin: Address,
        vesting_address: Address,
        rewards_distributor: Address,
        reward_per_block: i128,
        update_blocks_interval: u32,
        rules: ProductRules,
    ) -> Result<(), LedgerError> {
        // Check if already initialized
        if storage::has_config(&env) {
            return Err(LedgerError::AlreadyInitialized);
        }

        if reward_per_block < 0 {
            return Err(LedgerError::InvalidAmount);
        }

        admin.require_auth();

        let config = LedgerConfig {
            admin: admin.clone(),
            vesting_address,
            rewards_distributor,
            emergency_pause: false,
        };
        let reward_config = RewardConfig {
            reward_per_block,
            update_blocks_interval,
            last_update_block_num: env.ledger().sequence(),
            total_alloc_point: 0,
        };

        storage::set_config(&env, &config);
        storage::set_rules(&env, &rules);
        storage::set_reward_config(&env, &reward_config);
        storage::set_pool_count(&env, 0);
        storage::extend_instance_ttl(&env);

        log!(&env, "Reward ledger initialized by admin: {}", admin);

        Ok(())
    }

    pub fn set_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), LedgerError> {
        let mut config = access::require_admin(&env, &admin)?;
        config.admin = new_admin.clone();
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);

        log!(&env, "Admin changed to: {}", new_admin);
        Ok(())
    }

    pub fn set_vesting_address(
        env: Env,
        admin: Address,
        vesting_address: Address,
    ) -> Result<(), LedgerError> {
        let mut config = access::require_admin(&env, &admin)?;
        config.vesting_address = vesting_address.clone();
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);

        log!(&env, "Vesting address set to: {}", vesting_address);
        Ok(())
    }

    pub fn set_rewards_distributor(
        env: Env,
        admin: Address,
        rewards_distributor: Address,
    ) -> Result<(), LedgerError> {
        let mut config = access::require_admin(&env, &admin)?;
        config.rewards_distributor = rewards_distributor.clone();
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);

        log!(&env, "Rewards distributor set to: {}", rewards_distributor);
        Ok(())
    }

    /// Admin function to pause/unpause user and vesting operations
    pub fn set_emergency_pause(env: Env, admin: Address, paused: bool) -> Result<(), LedgerError> {
        let mut config = access::require_admin(&env, &admin)?;
        config.emergency_pause = paused;
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);

        events::pause_toggled(&env, paused);
        log!(&env, "Emergency pause set to: {}", paused);
        Ok(())
    }

    pub fn set_product_rules(
        env: Env,
        admin: Address,
        rules: ProductRules,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        storage::set_rules(&env, &rules);
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "Product rules updated: duplicates={}, strict_locks={}, empty_claims={}",
            rules.reject_duplicate_pools,
            rules.strict_lock_ids,
            rules.allow_empty_claims
        );
        Ok(())
    }

    // ========================================================================
    // Pool registry
    // ========================================================================

    /// Append a pool weighted by `alloc_point`; returns its id
    pub fn add_pool(
        env: Env,
        admin: Address,
        base_token: Address,
        reward_token: Address,
        last_reward_block: u32,
        acc_reward_per_share: I256,
        fee: PoolFee,
        min_stake_amount: i128,
        alloc_point: i128,
    ) -> Result<u32, LedgerError> {
        access::require_admin(&env, &admin)?;
        let rules = storage::get_rules(&env);

        let pool_id = pool::add_pool(
            &env,
            &rules,
            base_token.clone(),
            reward_token.clone(),
            last_reward_block,
            acc_reward_per_share,
            fee,
            min_stake_amount,
            alloc_point,
        )?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "Pool {} added: base={}, reward={}, alloc_point={}",
            pool_id,
            base_token,
            reward_token,
            alloc_point
        );
        Ok(pool_id)
    }

    pub fn set_pool_info(
        env: Env,
        admin: Address,
        pool_id: u32,
        last_reward_block: u32,
        acc_reward_per_share: I256,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        pool::set_pool_info(&env, pool_id, last_reward_block, acc_reward_per_share.clone())?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "Pool {} info set: last_reward_block={}, acc={}",
            pool_id,
            last_reward_block,
            acc_reward_per_share
        );
        Ok(())
    }

    pub fn set_pool_fee(
        env: Env,
        admin: Address,
        pool_id: u32,
        fee: PoolFee,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        pool::set_pool_fee(&env, pool_id, fee)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "Pool {} fee updated", pool_id);
        Ok(())
    }

    pub fn set_min_stake_amount(
        env: Env,
        admin: Address,
        pool_id: u32,
        min_stake_amount: i128,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        pool::set_min_stake_amount(&env, pool_id, min_stake_amount)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "Pool {} min stake set to: {}", pool_id, min_stake_amount);
        Ok(())
    }

    /// Settle every pool at the current weights, then re-weight one pool
    pub fn set_allocation_point(
        env: Env,
        admin: Address,
        pool_id: u32,
        alloc_point: i128,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        pool::set_allocation_point(&env, pool_id, alloc_point)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "Pool {} alloc point set to: {}", pool_id, alloc_point);
        Ok(())
    }

    /// Settle every pool with the current rate, then switch to the new one
    pub fn set_reward_configuration(
        env: Env,
        admin: Address,
        reward_per_block: i128,
        update_blocks_interval: u32,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        if reward_per_block < 0 {
            return Err(LedgerError::InvalidAmount);
        }

        Self::apply_reward_config(&env, reward_per_block, Some(update_blocks_interval))?;

        log!(
            &env,
            "Reward configuration set: per_block={}, interval={}",
            reward_per_block,
            update_blocks_interval
        );
        Ok(())
    }

    /// Revise the emission rate; allowed once per `update_blocks_interval`
    pub fn update_reward_per_block(
        env: Env,
        admin: Address,
        reward_per_block: i128,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        if reward_per_block < 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let reward_config = storage::get_reward_config(&env)?;
        let next_update = reward_config
            .last_update_block_num
            .saturating_add(reward_config.update_blocks_interval);
        if env.ledger().sequence() < next_update {
            return Err(LedgerError::NotAllowed);
        }

        Self::apply_reward_config(&env, reward_per_block, None)?;

        log!(&env, "Reward per block updated to: {}", reward_per_block);
        Ok(())
    }

    // ========================================================================
    // Lock period table
    // ========================================================================

    pub fn set_lock_period(
        env: Env,
        admin: Address,
        lock_id: u32,
        duration: u64,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        lock::set_duration(&env, lock_id, duration);
        storage::extend_instance_ttl(&env);

        log!(&env, "Lock {} duration set to: {}", lock_id, duration);
        Ok(())
    }

    pub fn set_lock_period_multiplier(
        env: Env,
        admin: Address,
        lock_id: u32,
        multiplier: u32,
    ) -> Result<(), LedgerError> {
        access::require_admin(&env, &admin)?;
        lock::set_multiplier(&env, lock_id, multiplier)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "Lock {} multiplier set to: {}", lock_id, multiplier);
        Ok(())
    }

    // ========================================================================
    // Privileged collaborators
    // ========================================================================

    /// Spread a pre-funded reward injection over current depositors
    pub fn add_rewards(
        env: Env,
        distributor: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<(), LedgerError> {
        access::require_distributor(&env, &distributor)?;
        bonus::add_rewards(&env, pool_id, amount)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "Bonus of {} added to pool {}", amount, pool_id);
        Ok(())
    }

    pub fn deposit_vesting(
        env: Env,
        vesting: Address,
        user: Address,
        pool_id: u32,
        amount: i128,
        deposit_timestamp: u64,
        withdrawal_timestamp: u64,
        lock_id: u32,
    ) -> Result<u32, LedgerError> {
        access::require_vesting(&env, &vesting)?;

        let deposit_id = deposit::deposit_vesting(
            &env,
            &vesting,
            &user,
            pool_id,
            amount,
            deposit_timestamp,
            withdrawal_timestamp,
            lock_id,
        )?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "Vesting deposit {} of {} for user {} in pool {}",
            deposit_id,
            amount,
            user,
            pool_id
        );
        Ok(deposit_id)
    }

    pub fn withdraw_vesting(
        env: Env,
        vesting: Address,
        user: Address,
        pool_id: u32,
        deposit_id: u32,
        amount: i128,
    ) -> Result<Payout, LedgerError> {
        access::require_vesting(&env, &vesting)?;

        let payout = deposit::withdraw_vesting(&env, &user, pool_id, deposit_id, amount)?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "Vesting withdrew {} from deposit {} of user {} with {} reward",
            amount,
            deposit_id,
            user,
            payout.reward
        );
        Ok(payout)
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Deposit base tokens into a pool under a lock tier; returns the deposit id
    pub fn deposit(
        env: Env,
        user: Address,
        pool_id: u32,
        lock_id: u32,
        amount: i128,
    ) -> Result<u32, LedgerError> {
        user.require_auth();
        access::require_active(&env)?;
        let rules = storage::get_rules(&env);

        let deposit_id = deposit::deposit(&env, &rules, &user, pool_id, lock_id, amount)?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "User {} deposited {} into pool {} as deposit {}",
            user,
            amount,
            pool_id,
            deposit_id
        );
        Ok(deposit_id)
    }

    /// Claim pending rewards of one deposit; returns the net amount paid
    pub fn claim(env: Env, user: Address, pool_id: u32, deposit_id: u32) -> Result<i128, LedgerError> {
        user.require_auth();
        access::require_active(&env)?;
        let rules = storage::get_rules(&env);

        let payout = deposit::claim(&env, &rules, &user, pool_id, deposit_id)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "User {} claimed {} from deposit {}", user, payout.reward, deposit_id);
        Ok(payout.reward)
    }

    pub fn claim_all(env: Env, user: Address, pool_id: u32) -> Result<i128, LedgerError> {
        user.require_auth();
        access::require_active(&env)?;
        let rules = storage::get_rules(&env);

        let payout = deposit::claim_many(&env, &rules, &user, pool_id, None)?;
        storage::extend_instance_ttl(&env);

        log!(&env, "User {} claimed {} from pool {}", user, payout.reward, pool_id);
        Ok(payout.reward)
    }

    pub fn claim_all_by_lock_id(
        env: Env,
        user: Address,
        pool_id: u32,
        lock_id: u32,
    ) -> Result<i128, LedgerError> {
        user.require_auth();
        access::require_active(&env)?;
        let rules = storage::get_rules(&env);

        let payout = deposit::claim_many(&env, &rules, &user, pool_id, Some(lock_id))?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "User {} claimed {} from pool {} lock {}",
            user,
            payout.reward,
            pool_id,
            lock_id
        );
        Ok(payout.reward)
    }

    /// Withdraw a deposit after its lock window, with its pending rewards
    pub fn withdraw(
        env: Env,
        user: Address,
        pool_id: u32,
        deposit_id: u32,
    ) -> Result<Payout, LedgerError> {
        user.require_auth();
        access::require_active(&env)?;

        let payout = deposit::withdraw(&env, &user, pool_id, deposit_id)?;
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "User {} withdrew {} with {} reward from deposit {}, forfeited={}",
            user,
            payout.principal,
            payout.reward,
            deposit_id,
            payout.reward_forfeited
        );
        Ok(payout)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Get contract configuration
    pub fn get_config(env: Env) -> Result<LedgerConfig, LedgerError> {
        storage::get_config(&env)
    }

    pub fn get_rules(env: Env) -> ProductRules {
        storage::get_rules(&env)
    }

    pub fn get_reward_configuration(env: Env) -> Result<RewardConfig, LedgerError> {
        storage::get_reward_config(&env)
    }

    /// Stored pool state, as of its last settlement
    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, LedgerError> {
        storage::get_pool(&env, pool_id)
    }

    pub fn get_pool_length(env: Env) -> u32 {
        storage::get_pool_count(&env)
    }

    pub fn get_deposit(
        env: Env,
        user: Address,
        pool_id: u32,
        deposit_id: u32,
    ) -> Result<Deposit, LedgerError> {
        storage::get_deposit(&env, &user, pool_id, deposit_id)
    }

    pub fn get_user_info(env: Env, user: Address, pool_id: u32) -> UserInfo {
        storage::get_user_info(&env, &user, pool_id)
    }

    pub fn get_user_last_deposit_id(
        env: Env,
        user: Address,
        pool_id: u32,
    ) -> Result<u32, LedgerError> {
        storage::get_user_info(&env, &user, pool_id)
            .deposit_count
            .checked_sub(1)
            .ok_or(LedgerError::DepositNotFound)
    }

    pub fn get_lock_period(env: Env, lock_id: u32) -> LockPeriod {
        lock::resolve(&env, lock_id)
    }

    /// Net principal staked in a pool under one lock id
    pub fn get_tvl(env: Env, pool_id: u32, lock_id: u32) -> i128 {
        storage::get_tvl(&env, pool_id, lock_id)
    }

    /// Pending reward of a deposit as if the pool were settled now
    pub fn pending_reward(
        env: Env,
        user: Address,
        pool_id: u32,
        deposit_id: u32,
    ) -> Result<i128, LedgerError> {
        deposit::pending_reward(&env, &user, pool_id, deposit_id)
    }

    pub fn pending_reward_total(env: Env, user: Address, pool_id: u32) -> Result<i128, LedgerError> {
        deposit::pending_total(&env, &user, pool_id, None)
    }

    pub fn pending_reward_by_lock_id(
        env: Env,
        user: Address,
        pool_id: u32,
        lock_id: u32,
    ) -> Result<i128, LedgerError> {
        deposit::pending_total(&env, &user, pool_id, Some(lock_id))
    }

    // Internal helper functions
    fn apply_reward_config(
        env: &Env,
        reward_per_block: i128,
        update_blocks_interval: Option<u32>,
    ) -> Result<(), LedgerError> {
        let mut reward_config = storage::get_reward_config(env)?;
        pool::settle_all(env, &reward_config)?;

        let old_reward_per_block = reward_config.reward_per_block;
        let block = env.ledger().sequence();
        reward_config.reward_per_block = reward_per_block;
        reward_config.last_update_block_num = block;
        if let Some(interval) = update_blocks_interval {
            reward_config.update_blocks_interval = interval;
        }
        storage::set_reward_config(env, &reward_config);
        storage::extend_instance_ttl(env);

        events::reward_config_updated(
            env,
            events::RewardConfigUpdated {
                old_reward_per_block,
                new_reward_per_block: reward_per_block,
                update_blocks_interval: reward_config.update_blocks_interval,
                block,
            },
        );
        Ok(())
    }
}
