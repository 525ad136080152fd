//! Fee manager handlers.

use cosmwasm_std::{to_json_binary, DepsMut, Env, MessageInfo, Response, Uint128};

use crate::error::ContractError;
use crate::fee_manager::{
    estimate, store_estimate, FeePolicy, GasPriceSample, FEE_CACHE, FEE_POLICIES, GAS_PRICES,
};
use crate::msg::FeeEstimateResponse;
use crate::state::{ensure_admin, ensure_role, Role};
use common::Protocol;

/// Estimate a fee and refresh the cache. The estimate is returned as
/// response data.
pub fn execute_estimate_fee(
    deps: DepsMut,
    env: Env,
    protocol: Protocol,
    destination: u64,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let result = estimate(deps.as_ref(), env.block.time, protocol, destination, amount)?;
    if !result.cached {
        store_estimate(deps.storage, protocol, destination, &result)?;
    }

    let data = FeeEstimateResponse {
        protocol,
        destination,
        fee: result.fee,
        cached: result.cached,
        computed_at: result.computed_at,
    };

    Ok(Response::new()
        .set_data(to_json_binary(&data)?)
        .add_attribute("method", "estimate_fee")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("destination", destination.to_string())
        .add_attribute("fee", result.fee.to_string())
        .add_attribute("cached", result.cached.to_string()))
}

pub fn execute_set_fee_policy(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
    policy: FeePolicy,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;
    policy.validate()?;

    FEE_POLICIES.save(deps.storage, protocol.as_str(), &policy)?;

    Ok(Response::new()
        .add_attribute("method", "set_fee_policy")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("multiplier_bps", policy.multiplier_bps.to_string())
        .add_attribute("base_fee", policy.base_fee.to_string())
        .add_attribute("gas_limit", policy.gas_limit.to_string()))
}

pub fn execute_invalidate_fee_cache(
    deps: DepsMut,
    info: MessageInfo,
    destination: u64,
    protocol: Protocol,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let key = (destination, protocol.as_str());
    if let Some(mut entry) = FEE_CACHE.may_load(deps.storage, key)? {
        entry.valid = false;
        FEE_CACHE.save(deps.storage, key, &entry)?;
    }

    Ok(Response::new()
        .add_attribute("method", "invalidate_fee_cache")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("destination", destination.to_string()))
}

pub fn execute_update_gas_price(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    destination: u64,
    price: Uint128,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::GasOracle, &info.sender)?;

    GAS_PRICES.save(
        deps.storage,
        destination,
        &GasPriceSample {
            price,
            updated_at: env.block.time,
        },
    )?;

    Ok(Response::new()
        .add_attribute("method", "update_gas_price")
        .add_attribute("destination", destination.to_string())
        .add_attribute("price", price.to_string()))
}
