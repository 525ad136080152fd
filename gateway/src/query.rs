//! Query handlers.

use cosmwasm_std::{Binary, Deps, Env, Order, StdError, StdResult, Uint128};
use cw_storage_plus::Bound;

use crate::fee_manager::{
    self, FeeCacheEntry, FeePolicy, GasPriceSample, FEE_CACHE, FEE_POLICIES, FEE_UNAVAILABLE,
    GAS_PRICES,
};
use crate::msg::{
    CompareFeesResponse, ConfigResponse, DestinationInfo, DestinationsResponse,
    FeeEstimateResponse, HasRoleResponse, IsTransferBlockedResponse, PendingAdminResponse,
    ProtocolFee, RegistrationsResponse, StatusResponse, SuspiciousActivityResponse,
    UsageResponse,
};
use crate::registry::{is_destination_supported, ProtocolRegistration, DESTINATIONS, REGISTRATIONS};
use crate::security::{
    current_window, AnomalyThresholds, ProtocolConfig, RateLimitWindow, ANOMALY_THRESHOLDS,
    BLOCKED_TRANSFERS, GLOBAL_WINDOW, PROTOCOL_CONFIGS, PROTOCOL_WINDOWS,
    SUSPICIOUS_ACTIVITY, SUSPICIOUS_ACTIVITY_CEILING, USER_WINDOWS,
};
use crate::state::{has_role, Role, Stats, CONFIG, PENDING_ADMIN, STATS};
use common::gateway::DestinationSupportedResponse;
use common::Protocol;

/// Default and max pagination limits
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

fn contract_err(err: crate::ContractError) -> StdError {
    match err {
        crate::ContractError::Std(e) => e,
        other => StdError::generic_err(other.to_string()),
    }
}

// ============================================================================
// Config & status
// ============================================================================

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        token: config.token,
        global_daily_limit: config.global_daily_limit,
    })
}

pub fn query_status(deps: Deps) -> StdResult<StatusResponse> {
    let config = CONFIG.load(deps.storage)?;
    let registrations = REGISTRATIONS
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, r)| r))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(StatusResponse {
        paused: config.paused,
        emergency_paused: config.emergency_paused,
        registered_protocols: registrations.len() as u32,
        active_protocols: registrations
            .iter()
            .filter(|r| r.active && !r.deprecated)
            .count() as u32,
    })
}

pub fn query_stats(deps: Deps) -> StdResult<Stats> {
    STATS.load(deps.storage)
}

pub fn query_pending_admin(deps: Deps) -> StdResult<Option<PendingAdminResponse>> {
    Ok(PENDING_ADMIN
        .may_load(deps.storage)?
        .map(|p| PendingAdminResponse {
            new_address: p.new_address,
            execute_after: p.execute_after,
        }))
}

pub fn query_has_role(deps: Deps, role: Role, address: String) -> StdResult<HasRoleResponse> {
    let address = deps.api.addr_validate(&address)?;
    Ok(HasRoleResponse {
        has_role: has_role(deps, role, &address).map_err(contract_err)?,
    })
}

// ============================================================================
// Registry
// ============================================================================

pub fn query_registration(deps: Deps, protocol: Protocol) -> StdResult<ProtocolRegistration> {
    REGISTRATIONS.load(deps.storage, protocol.as_str())
}

pub fn query_registrations(deps: Deps) -> StdResult<RegistrationsResponse> {
    let registrations = REGISTRATIONS
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, r)| r))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(RegistrationsResponse { registrations })
}

pub fn query_destination_supported(
    deps: Deps,
    protocol: Protocol,
    destination: u64,
) -> StdResult<DestinationSupportedResponse> {
    Ok(DestinationSupportedResponse {
        supported: is_destination_supported(deps.storage, protocol, destination)
            .map_err(contract_err)?,
    })
}

pub fn query_destinations(
    deps: Deps,
    protocol: Protocol,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<DestinationsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let destinations = DESTINATIONS
        .prefix(protocol.as_str())
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            item.map(|(destination, d)| DestinationInfo {
                destination,
                supported: d.supported,
                config: d.config,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(DestinationsResponse { destinations })
}

// ============================================================================
// Security
// ============================================================================

pub fn query_protocol_config(deps: Deps, protocol: Protocol) -> StdResult<ProtocolConfig> {
    Ok(PROTOCOL_CONFIGS
        .may_load(deps.storage, protocol.as_str())?
        .unwrap_or_default())
}

fn usage(window: Option<RateLimitWindow>, limit: Uint128, env: &Env) -> UsageResponse {
    let window = current_window(window, env.block.time);
    let remaining = if limit.is_zero() {
        Uint128::MAX
    } else {
        limit.saturating_sub(window.used)
    };
    UsageResponse {
        window,
        limit,
        remaining,
    }
}

pub fn query_protocol_usage(deps: Deps, env: Env, protocol: Protocol) -> StdResult<UsageResponse> {
    let key = protocol.as_str();
    let limits = PROTOCOL_CONFIGS
        .may_load(deps.storage, key)?
        .unwrap_or_default();
    let window = PROTOCOL_WINDOWS.may_load(deps.storage, key)?;
    Ok(usage(window, limits.daily_limit, &env))
}

pub fn query_user_usage(
    deps: Deps,
    env: Env,
    address: String,
    protocol: Protocol,
) -> StdResult<UsageResponse> {
    let address = deps.api.addr_validate(&address)?;
    let key = protocol.as_str();
    let limits = PROTOCOL_CONFIGS
        .may_load(deps.storage, key)?
        .unwrap_or_default();
    let window = USER_WINDOWS.may_load(deps.storage, (&address, key))?;
    Ok(usage(window, limits.user_daily_limit, &env))
}

pub fn query_global_usage(deps: Deps, env: Env) -> StdResult<UsageResponse> {
    let config = CONFIG.load(deps.storage)?;
    let window = GLOBAL_WINDOW.may_load(deps.storage)?;
    Ok(usage(window, config.global_daily_limit, &env))
}

pub fn query_anomaly_thresholds(deps: Deps) -> StdResult<AnomalyThresholds> {
    Ok(ANOMALY_THRESHOLDS
        .may_load(deps.storage)?
        .unwrap_or_default())
}

pub fn query_suspicious_activity(
    deps: Deps,
    address: String,
) -> StdResult<SuspiciousActivityResponse> {
    let address = deps.api.addr_validate(&address)?;
    let count = SUSPICIOUS_ACTIVITY
        .may_load(deps.storage, &address)?
        .unwrap_or(0);
    Ok(SuspiciousActivityResponse {
        count,
        blocked: count > SUSPICIOUS_ACTIVITY_CEILING,
    })
}

pub fn query_is_transfer_blocked(
    deps: Deps,
    transfer_id: Binary,
) -> StdResult<IsTransferBlockedResponse> {
    Ok(IsTransferBlockedResponse {
        blocked: BLOCKED_TRANSFERS.has(deps.storage, transfer_id.as_slice()),
    })
}

// ============================================================================
// Fees
// ============================================================================

pub fn query_fee_policy(deps: Deps, protocol: Protocol) -> StdResult<FeePolicy> {
    Ok(FEE_POLICIES
        .may_load(deps.storage, protocol.as_str())?
        .unwrap_or_default())
}

pub fn query_gas_price(deps: Deps, destination: u64) -> StdResult<Option<GasPriceSample>> {
    GAS_PRICES.may_load(deps.storage, destination)
}

pub fn query_cached_fee(
    deps: Deps,
    destination: u64,
    protocol: Protocol,
) -> StdResult<Option<FeeCacheEntry>> {
    FEE_CACHE.may_load(deps.storage, (destination, protocol.as_str()))
}

pub fn query_estimate_fee(
    deps: Deps,
    env: Env,
    protocol: Protocol,
    destination: u64,
    amount: Uint128,
) -> StdResult<FeeEstimateResponse> {
    let result = fee_manager::estimate(deps, env.block.time, protocol, destination, amount)
        .map_err(contract_err)?;
    Ok(FeeEstimateResponse {
        protocol,
        destination,
        fee: result.fee,
        cached: result.cached,
        computed_at: result.computed_at,
    })
}

/// Cached or live estimate per registered protocol. Inactive protocols and failed
/// quotes report [`FEE_UNAVAILABLE`].
pub fn query_compare_fees(
    deps: Deps,
    env: Env,
    destination: u64,
    amount: Uint128,
) -> StdResult<CompareFeesResponse> {
    let registrations = REGISTRATIONS
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, r)| r))
        .collect::<StdResult<Vec<_>>>()?;

    let fees = registrations
        .iter()
        .map(|registration| {
            // inactive and deprecated protocols fail `estimate` as well
            let fee = fee_manager::estimate(
                deps,
                env.block.time,
                registration.protocol,
                destination,
                amount,
            )
            .map(|estimate| estimate.fee)
            .unwrap_or(FEE_UNAVAILABLE);
            ProtocolFee {
                protocol: registration.protocol,
                fee,
            }
        })
        .collect();

    Ok(CompareFeesResponse { destination, fees })
}
