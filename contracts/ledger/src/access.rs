use accrue_shared::LedgerError;
use soroban_sdk::{Address, Env};

use crate::storage;
use crate::types::LedgerConfig;

pub fn require_admin(env: &Env, admin: &Address) -> Result<LedgerConfig, LedgerError> {
    admin.require_auth();
    let config = storage::get_config(env)?;
    if config.admin != *admin {
        return Err(LedgerError::NotAuthorized);
    }
    Ok(config)
}

pub fn require_vesting(env: &Env, caller: &Address) -> Result<LedgerConfig, LedgerError> {
    caller.require_auth();
    let config = storage::get_config(env)?;
    if config.vesting_address != *caller {
        return Err(LedgerError::NotAllowed);
    }
    ensure_not_paused(&config)?;
    Ok(config)
}

pub fn require_distributor(env: &Env, caller: &Address) -> Result<LedgerConfig, LedgerError> {
    caller.require_auth();
    let config = storage::get_config(env)?;
    if config.rewards_distributor != *caller {
        return Err(LedgerError::NotAllowed);
    }
    Ok(config)
}

/// Loads the config for a user-facing call, failing while paused.
pub fn require_active(env: &Env) -> Result<LedgerConfig, LedgerError> {
    let config = storage::get_config(env)?;
    ensure_not_paused(&config)?;
    Ok(config)
}

fn ensure_not_paused(config: &LedgerConfig) -> Result<(), LedgerError> {
    if config.emergency_pause {
        return Err(LedgerError::ContractPaused);
    }
    Ok(())
}
