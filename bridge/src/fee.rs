//! Bridge fee calculation
//!
//! The protocol fee is taken in the bridged token before burning:
//!
//! ```text
//! fee = clamp(amount * fee_bps / 10000, min_fee, max_fee)
//! ```
//!
//! A transfer must be strictly larger than its fee.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;
use cw_storage_plus::Item;

use crate::error::ContractError;

/// Maximum fee rate in basis points (10%)
pub const MAX_FEE_BPS: u64 = 1_000;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

#[cw_serde]
pub struct FeeParams {
    /// Proportional fee in basis points
    pub fee_bps: u64,
    /// Floor applied to every transfer
    pub min_fee: Uint128,
    /// Ceiling applied to every transfer
    pub max_fee: Uint128,
}

impl FeeParams {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.fee_bps > MAX_FEE_BPS {
            return Err(ContractError::InvalidFeeParams {
                reason: format!("fee {} bps exceeds max {}", self.fee_bps, MAX_FEE_BPS),
            });
        }
        if self.min_fee > self.max_fee {
            return Err(ContractError::InvalidFeeParams {
                reason: format!(
                    "min fee {} above max fee {}",
                    self.min_fee, self.max_fee
                ),
            });
        }
        Ok(())
    }
}

pub const FEE_PARAMS: Item<FeeParams> = Item::new("fee_params");

pub fn calculate_fee(params: &FeeParams, amount: Uint128) -> Uint128 {
    amount
        .multiply_ratio(params.fee_bps as u128, BPS_DENOMINATOR)
        .max(params.min_fee)
        .min(params.max_fee)
}

/// Split `amount` into (net, fee), rejecting amounts that do not cover the fee.
pub fn split_fee(params: &FeeParams, amount: Uint128) -> Result<(Uint128, Uint128), ContractError> {
    let fee = calculate_fee(params, amount);
    if fee >= amount {
        return Err(ContractError::AmountBelowFee { amount, fee });
    }
    Ok((amount - fee, fee))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: u128 = 1_000_000;

    fn params() -> FeeParams {
        FeeParams {
            fee_bps: 100,
            min_fee: Uint128::new(TOKEN / 10),
            max_fee: Uint128::new(5 * TOKEN),
        }
    }

    #[test]
    fn test_fee_clamped_to_bounds() {
        let p = params();
        assert_eq!(calculate_fee(&p, Uint128::zero()), Uint128::new(TOKEN / 10));
        assert_eq!(calculate_fee(&p, Uint128::new(10 * TOKEN)), Uint128::new(TOKEN / 10));
        assert_eq!(calculate_fee(&p, Uint128::new(100 * TOKEN)), Uint128::new(TOKEN));
        assert_eq!(calculate_fee(&p, Uint128::new(1_000 * TOKEN)), Uint128::new(5 * TOKEN));
    }

    #[test]
    fn test_split_fee() {
        let p = params();
        assert_eq!(
            split_fee(&p, Uint128::new(100 * TOKEN)).unwrap(),
            (Uint128::new(99 * TOKEN), Uint128::new(TOKEN))
        );
        assert_eq!(
            split_fee(&p, Uint128::new(TOKEN / 10)).unwrap_err(),
            ContractError::AmountBelowFee {
                amount: Uint128::new(TOKEN / 10),
                fee: Uint128::new(TOKEN / 10),
            }
        );
    }

    #[test]
    fn test_validate() {
        let mut p = params();
        p.validate().unwrap();
        p.fee_bps = MAX_FEE_BPS + 1;
        assert!(p.validate().is_err());
        p.fee_bps = 0;
        p.min_fee = Uint128::new(10);
        p.max_fee = Uint128::new(9);
        assert!(p.validate().is_err());
    }
}
