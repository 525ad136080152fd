//! Omnibridge Gateway - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers
//! - `registry`, `security`, `fee_manager` - component state and logic

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response,
    StdError, StdResult,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{
    execute_accept_admin, execute_activate_emergency_pause, execute_admit, execute_block_transfer,
    execute_bridge, execute_burn_from, execute_cancel_admin_proposal,
    execute_clear_suspicious_activity, execute_collect_fee, execute_deactivate_emergency_pause,
    execute_estimate_fee, execute_grant_role, execute_invalidate_fee_cache, execute_mint,
    execute_pause, execute_pause_protocol, execute_perform_health_check, execute_propose_admin,
    execute_register_protocol, execute_report_suspicious_activity, execute_revoke_role,
    execute_set_anomaly_thresholds, execute_set_destination_support, execute_set_fee_policy,
    execute_set_global_daily_limit, execute_set_protocol_config, execute_set_protocol_status,
    execute_unblock_transfer, execute_unpause, execute_unpause_protocol, execute_update_gas_price,
    execute_update_module, reply_routed,
};
use crate::fee_manager::FeePolicy;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_anomaly_thresholds, query_cached_fee, query_compare_fees, query_config,
    query_destination_supported, query_destinations, query_estimate_fee, query_fee_policy,
    query_gas_price, query_global_usage, query_has_role, query_is_transfer_blocked,
    query_pending_admin, query_protocol_config, query_protocol_usage, query_registration,
    query_registrations, query_stats, query_status, query_suspicious_activity, query_user_usage,
};
use crate::security::{AnomalyThresholds, ANOMALY_THRESHOLDS};
use crate::state::{
    Config, Role, Stats, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, ENTERED, ROLES, ROUTER_NONCE,
    ROUTE_REPLY_ID, STATS,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    let token = deps.api.addr_validate(&msg.token)?;

    let thresholds = msg.anomaly_thresholds.unwrap_or_default();
    if thresholds.frequency_threshold > 0 && thresholds.time_window == 0 {
        return Err(ContractError::InvalidThresholds {
            reason: "frequency threshold requires a time window".to_string(),
        });
    }

    let config = Config {
        admin: admin.clone(),
        token: token.clone(),
        paused: false,
        emergency_paused: false,
        global_daily_limit: msg.global_daily_limit,
    };
    CONFIG.save(deps.storage, &config)?;
    ANOMALY_THRESHOLDS.save(deps.storage, &thresholds)?;
    STATS.save(deps.storage, &Stats::default())?;
    ROUTER_NONCE.save(deps.storage, &0u64)?;
    ENTERED.save(deps.storage, &false)?;

    let grants = [
        (Role::SecurityAdmin, &msg.security_admins),
        (Role::Emergency, &msg.emergency_operators),
        (Role::GasOracle, &msg.gas_oracles),
    ];
    for (role, addresses) in grants {
        for address in addresses {
            let address = deps.api.addr_validate(address)?;
            ROLES.save(deps.storage, (role.as_str(), &address), &true)?;
        }
    }

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("token", token)
        .add_attribute("global_daily_limit", msg.global_daily_limit.to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Router
        ExecuteMsg::Bridge {
            protocol,
            destination,
            recipient,
            amount,
        } => execute_bridge(deps, env, info, protocol, destination, recipient, amount),

        // Module-facing
        ExecuteMsg::Admit {
            sender,
            protocol,
            amount,
            transfer_id,
        } => execute_admit(deps, env, info, sender, protocol, amount, transfer_id),
        ExecuteMsg::BurnFrom { owner, amount } => execute_burn_from(deps, info, owner, amount),
        ExecuteMsg::CollectFee {
            owner,
            amount,
            collector,
        } => execute_collect_fee(deps, info, owner, amount, collector),
        ExecuteMsg::Mint {
            recipient,
            amount,
            transfer_id,
        } => execute_mint(deps, info, recipient, amount, transfer_id),

        // Registry
        ExecuteMsg::RegisterProtocol {
            protocol,
            module,
            version,
        } => execute_register_protocol(deps, env, info, protocol, module, version),
        ExecuteMsg::UpdateModule {
            protocol,
            module,
            version,
        } => execute_update_module(deps, info, protocol, module, version),
        ExecuteMsg::SetProtocolStatus {
            protocol,
            active,
            deprecated,
        } => execute_set_protocol_status(deps, info, protocol, active, deprecated),
        ExecuteMsg::SetDestinationSupport {
            protocol,
            destination,
            supported,
            config,
        } => execute_set_destination_support(deps, info, protocol, destination, supported, config),
        ExecuteMsg::PerformHealthCheck { protocol } => {
            execute_perform_health_check(deps, env, protocol)
        }

        // Security
        ExecuteMsg::SetProtocolConfig {
            protocol,
            daily_limit,
            transaction_limit,
            cooldown_period,
            user_daily_limit,
        } => execute_set_protocol_config(
            deps,
            info,
            protocol,
            daily_limit,
            transaction_limit,
            cooldown_period,
            user_daily_limit,
        ),
        ExecuteMsg::SetGlobalDailyLimit { limit } => {
            execute_set_global_daily_limit(deps, info, limit)
        }
        ExecuteMsg::SetAnomalyThresholds {
            volume_threshold,
            frequency_threshold,
            time_window,
        } => execute_set_anomaly_thresholds(
            deps,
            info,
            AnomalyThresholds {
                volume_threshold,
                frequency_threshold,
                time_window,
            },
        ),
        ExecuteMsg::PauseProtocol { protocol } => execute_pause_protocol(deps, info, protocol),
        ExecuteMsg::UnpauseProtocol { protocol } => execute_unpause_protocol(deps, info, protocol),
        ExecuteMsg::Pause {} => execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute_unpause(deps, info),
        ExecuteMsg::BlockTransfer {
            transfer_id,
            reason,
        } => execute_block_transfer(deps, info, transfer_id, reason),
        ExecuteMsg::UnblockTransfer { transfer_id } => {
            execute_unblock_transfer(deps, info, transfer_id)
        }
        ExecuteMsg::ReportSuspiciousActivity { address, reason } => {
            execute_report_suspicious_activity(deps, info, address, reason)
        }
        ExecuteMsg::ClearSuspiciousActivity { address } => {
            execute_clear_suspicious_activity(deps, info, address)
        }

        // Emergency
        ExecuteMsg::ActivateEmergencyPause {} => execute_activate_emergency_pause(deps, info),
        ExecuteMsg::DeactivateEmergencyPause {} => execute_deactivate_emergency_pause(deps, info),

        // Fees
        ExecuteMsg::EstimateFee {
            protocol,
            destination,
            amount,
        } => execute_estimate_fee(deps, env, protocol, destination, amount),
        ExecuteMsg::SetFeePolicy {
            protocol,
            multiplier_bps,
            base_fee,
            gas_limit,
        } => execute_set_fee_policy(
            deps,
            info,
            protocol,
            FeePolicy {
                multiplier_bps,
                base_fee,
                gas_limit,
            },
        ),
        ExecuteMsg::InvalidateFeeCache {
            destination,
            protocol,
        } => execute_invalidate_fee_cache(deps, info, destination, protocol),
        ExecuteMsg::UpdateGasPrice { destination, price } => {
            execute_update_gas_price(deps, env, info, destination, price)
        }

        // Admin
        ExecuteMsg::GrantRole { role, address } => execute_grant_role(deps, info, role, address),
        ExecuteMsg::RevokeRole { role, address } => execute_revoke_role(deps, info, role, address),
        ExecuteMsg::ProposeAdmin { new_admin } => execute_propose_admin(deps, env, info, new_admin),
        ExecuteMsg::AcceptAdmin {} => execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => execute_cancel_admin_proposal(deps, info),
    }
}

// ============================================================================
// Reply
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        ROUTE_REPLY_ID => reply_routed(deps, msg),
        id => Err(StdError::generic_err(format!("unknown reply id: {}", id)).into()),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Status {} => to_json_binary(&query_status(deps)?),
        QueryMsg::Stats {} => to_json_binary(&query_stats(deps)?),
        QueryMsg::PendingAdmin {} => to_json_binary(&query_pending_admin(deps)?),
        QueryMsg::HasRole { role, address } => {
            to_json_binary(&query_has_role(deps, role, address)?)
        }

        // Registry
        QueryMsg::Registration { protocol } => {
            to_json_binary(&query_registration(deps, protocol)?)
        }
        QueryMsg::Registrations {} => to_json_binary(&query_registrations(deps)?),
        QueryMsg::DestinationSupported {
            protocol,
            destination,
        } => to_json_binary(&query_destination_supported(deps, protocol, destination)?),
        QueryMsg::Destinations {
            protocol,
            start_after,
            limit,
        } => to_json_binary(&query_destinations(deps, protocol, start_after, limit)?),

        // Security
        QueryMsg::ProtocolConfig { protocol } => {
            to_json_binary(&query_protocol_config(deps, protocol)?)
        }
        QueryMsg::ProtocolUsage { protocol } => {
            to_json_binary(&query_protocol_usage(deps, env, protocol)?)
        }
        QueryMsg::UserUsage { address, protocol } => {
            to_json_binary(&query_user_usage(deps, env, address, protocol)?)
        }
        QueryMsg::GlobalUsage {} => to_json_binary(&query_global_usage(deps, env)?),
        QueryMsg::AnomalyThresholds {} => to_json_binary(&query_anomaly_thresholds(deps)?),
        QueryMsg::SuspiciousActivity { address } => {
            to_json_binary(&query_suspicious_activity(deps, address)?)
        }
        QueryMsg::IsTransferBlocked { transfer_id } => {
            to_json_binary(&query_is_transfer_blocked(deps, transfer_id)?)
        }

        // Fees
        QueryMsg::FeePolicy { protocol } => to_json_binary(&query_fee_policy(deps, protocol)?),
        QueryMsg::GasPrice { destination } => {
            to_json_binary(&query_gas_price(deps, destination)?)
        }
        QueryMsg::CachedFee {
            destination,
            protocol,
        } => to_json_binary(&query_cached_fee(deps, destination, protocol)?),
        QueryMsg::EstimateFee {
            protocol,
            destination,
            amount,
        } => to_json_binary(&query_estimate_fee(
            deps,
            env,
            protocol,
            destination,
            amount,
        )?),
        QueryMsg::CompareFees {
            destination,
            amount,
        } => to_json_binary(&query_compare_fees(deps, env, destination, amount)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if ENTERED.may_load(deps.storage)?.is_none() {
        ENTERED.save(deps.storage, &false)?;
    }

    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
