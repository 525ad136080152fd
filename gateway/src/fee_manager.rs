//! Fee Manager Module
//!
//! Estimates the native-coin cost of bridging through a protocol by taking
//! the module's own quote and applying a per-protocol policy:
//!
//! ```text
//! fee = quote * multiplier_bps / 10000 + base_fee + gas_price * gas_limit
//! ```
//!
//! The gas term only applies while the destination's gas price sample is at
//! most [`GAS_PRICE_MAX_AGE`] seconds old. Estimates are cached per
//! (destination, protocol) for [`FEE_CACHE_TTL`] seconds.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Deps, QuerierWrapper, StdResult, Storage, Timestamp, Uint128};
use cw_storage_plus::Map;

use crate::error::ContractError;
use crate::registry::{load_active, ProtocolRegistration};
use common::module::{FeeQuoteResponse, ModuleQueryMsg};
use common::Protocol;

// ============================================================================
// Constants
// ============================================================================

/// Basis points denominator (10000 = 1x)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Maximum fee multiplier (5x)
pub const MAX_MULTIPLIER_BPS: u64 = 50_000;

/// Cached estimates are served for this many seconds
pub const FEE_CACHE_TTL: u64 = 300;

/// Gas price samples older than this are ignored
pub const GAS_PRICE_MAX_AGE: u64 = 3_600;

/// Reported in fee comparisons when a module cannot quote
pub const FEE_UNAVAILABLE: Uint128 = Uint128::MAX;

// ============================================================================
// Data Structures
// ============================================================================

/// Per-protocol adjustment applied on top of the module quote
#[cw_serde]
pub struct FeePolicy {
    /// Multiplier on the module quote in basis points (10000 = 1x)
    pub multiplier_bps: u64,
    /// Flat amount added to every estimate
    pub base_fee: Uint128,
    /// Gas units charged at the destination's sampled gas price
    pub gas_limit: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            multiplier_bps: BPS_DENOMINATOR as u64,
            base_fee: Uint128::zero(),
            gas_limit: 0,
        }
    }
}

impl FeePolicy {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.multiplier_bps == 0 || self.multiplier_bps > MAX_MULTIPLIER_BPS {
            return Err(ContractError::InvalidFeePolicy {
                reason: format!(
                    "multiplier {} bps outside 1..={}",
                    self.multiplier_bps, MAX_MULTIPLIER_BPS
                ),
            });
        }
        Ok(())
    }
}

/// Destination gas price published by a gas oracle
#[cw_serde]
pub struct GasPriceSample {
    pub price: Uint128,
    pub updated_at: Timestamp,
}

#[cw_serde]
pub struct FeeCacheEntry {
    pub fee: Uint128,
    pub computed_at: Timestamp,
    pub valid: bool,
}

/// An estimate and whether it came from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeEstimate {
    pub fee: Uint128,
    pub cached: bool,
    pub computed_at: Timestamp,
}

// ============================================================================
// Storage
// ============================================================================

pub const FEE_POLICIES: Map<&str, FeePolicy> = Map::new("fee_policies");

/// Gas price samples keyed by destination chain id
pub const GAS_PRICES: Map<u64, GasPriceSample> = Map::new("gas_prices");

/// Fee estimates keyed by (destination chain id, protocol key)
pub const FEE_CACHE: Map<(u64, &str), FeeCacheEntry> = Map::new("fee_cache");

// ============================================================================
// Calculation
// ============================================================================

/// Cached fee if the entry is valid and younger than the TTL.
pub fn cached_fee(entry: Option<&FeeCacheEntry>, now: Timestamp) -> Option<Uint128> {
    entry
        .filter(|e| e.valid && now.seconds() < e.computed_at.seconds() + FEE_CACHE_TTL)
        .map(|e| e.fee)
}

/// `price * gas_limit` for a fresh sample, zero for an absent or stale one.
pub fn gas_adjustment(
    sample: Option<&GasPriceSample>,
    gas_limit: u64,
    now: Timestamp,
) -> Result<Uint128, ContractError> {
    match sample {
        Some(s) if now.seconds().saturating_sub(s.updated_at.seconds()) <= GAS_PRICE_MAX_AGE => {
            Ok(s.price.checked_mul(Uint128::from(gas_limit))?)
        }
        _ => Ok(Uint128::zero()),
    }
}

pub fn apply_policy(
    quote: Uint128,
    policy: &FeePolicy,
    gas: Uint128,
) -> Result<Uint128, ContractError> {
    let scaled = quote.multiply_ratio(policy.multiplier_bps as u128, BPS_DENOMINATOR);
    Ok(scaled.checked_add(policy.base_fee)?.checked_add(gas)?)
}

pub fn quote_module(
    querier: &QuerierWrapper,
    module: &Addr,
    destination: u64,
    amount: Uint128,
) -> StdResult<FeeQuoteResponse> {
    querier.query_wasm_smart(
        module,
        &ModuleQueryMsg::QuoteFee {
            destination,
            amount,
        },
    )
}

/// Query the module and apply the protocol's policy, ignoring the cache.
fn live_estimate(
    deps: Deps,
    now: Timestamp,
    registration: &ProtocolRegistration,
    destination: u64,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let quote = quote_module(&deps.querier, &registration.module, destination, amount).map_err(
        |e| ContractError::FeeQuoteUnavailable {
            protocol: registration.protocol,
            reason: e.to_string(),
        },
    )?;
    let key = registration.protocol.as_str();
    let policy = FEE_POLICIES.may_load(deps.storage, key)?.unwrap_or_default();
    let sample = GAS_PRICES.may_load(deps.storage, destination)?;
    let gas = gas_adjustment(sample.as_ref(), policy.gas_limit, now)?;
    apply_policy(quote.native_fee, &policy, gas)
}

/// Cache-or-compute estimate for an active protocol. Does not write the cache.
pub fn estimate(
    deps: Deps,
    now: Timestamp,
    protocol: Protocol,
    destination: u64,
    amount: Uint128,
) -> Result<FeeEstimate, ContractError> {
    let registration = load_active(deps.storage, protocol)?;
    let entry = FEE_CACHE.may_load(deps.storage, (destination, protocol.as_str()))?;
    if let (Some(fee), Some(entry)) = (cached_fee(entry.as_ref(), now), entry.as_ref()) {
        return Ok(FeeEstimate {
            fee,
            cached: true,
            computed_at: entry.computed_at,
        });
    }
    let fee = live_estimate(deps, now, &registration, destination, amount)?;
    Ok(FeeEstimate {
        fee,
        cached: false,
        computed_at: now,
    })
}

pub fn store_estimate(
    storage: &mut dyn Storage,
    protocol: Protocol,
    destination: u64,
    estimate: &FeeEstimate,
) -> StdResult<()> {
    FEE_CACHE.save(
        storage,
        (destination, protocol.as_str()),
        &FeeCacheEntry {
            fee: estimate.fee,
            computed_at: estimate.computed_at,
            valid: true,
        },
    )
}
