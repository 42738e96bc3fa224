#![no_std]
use soroban_sdk::{contracterror, contracttype};

pub mod invariants;
pub mod math;

/// Shared types, errors and constants used across the Accrue ledger contracts.
/// Every product (staking, freezing, farming) reports the same error codes so
/// off-chain tooling can react to them uniformly.

// ============================================================================
// Fee Types
// ============================================================================

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolFee {
    pub deposit_fee: u32, // In basis points, taken from principal
    pub withdraw_fee: u32, // In basis points, taken from returned principal
    pub claim_fee: u32, // In basis points, taken from reward payouts
}

impl PoolFee {
    pub const fn zero() -> Self {
        Self {
            deposit_fee: 0,
            withdraw_fee: 0,
            claim_fee: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        validate_basis_points(self.deposit_fee)
            && validate_basis_points(self.withdraw_fee)
            && validate_basis_points(self.claim_fee)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Stable error codes. Never renumber a variant: callers match on the code.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LedgerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    WrongPool = 3,
    WrongLockPeriod = 4,
    InvalidAmount = 5,
    PeriodNotEnded = 6,
    NotAllowed = 7,
    NotAuthorized = 8,
    ArithmeticOverflow = 9,
    ContractPaused = 10,
    PoolAlreadyExists = 11,
    DepositNotFound = 12,
    AlreadyWithdrawn = 13,
    InvalidFee = 14,
}

// ============================================================================
// Constants
// ============================================================================

/// Basis points representing 100% (10000 basis points = 100%)
pub const MAX_BASIS_POINTS: i128 = 10_000;

/// Fixed-point scale of both reward accumulators
pub const ACC_PRECISION: i128 = 1_000_000_000_000_000_000;

/// Lock multiplier scale (100000 = 1.0x)
pub const MULTIPLIER_PRECISION: u32 = 100_000;

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: i128) -> bool {
    amount > 0
}

/// Validate that a fee is within 0-100%
pub fn validate_basis_points(basis_points: u32) -> bool {
    (basis_points as i128) <= MAX_BASIS_POINTS
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pool_fee_validation() {
        assert!(PoolFee::zero().is_valid());

        let full = PoolFee {
            deposit_fee: 10_000,
            withdraw_fee: 10_000,
            claim_fee: 10_000,
        };
        assert!(full.is_valid());

        let too_high = PoolFee {
            deposit_fee: 100,
            withdraw_fee: 10_001,
            claim_fee: 0,
        };
        assert!(!too_high.is_valid());
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(1));
        assert!(!validate_positive_amount(0));
        assert!(!validate_positive_amount(-5));
    }
}
