//! Security administration handlers.

use cosmwasm_std::{Binary, DepsMut, Event, MessageInfo, Response, Uint128};

use super::parse_transfer_id;
use crate::error::ContractError;
use crate::security::{
    flag_suspicious, AnomalyThresholds, ProtocolConfig, ANOMALY_THRESHOLDS, BLOCKED_TRANSFERS,
    PROTOCOL_CONFIGS, SUSPICIOUS_ACTIVITY, SUSPICIOUS_ACTIVITY_CEILING,
};
use crate::state::{ensure_role, Role, CONFIG};
use common::{bytes32_to_hex, Protocol};

// ============================================================================
// Limits
// ============================================================================

pub fn execute_set_protocol_config(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
    daily_limit: Uint128,
    transaction_limit: Uint128,
    cooldown_period: u64,
    user_daily_limit: Uint128,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let key = protocol.as_str();
    let mut limits = PROTOCOL_CONFIGS
        .may_load(deps.storage, key)?
        .unwrap_or_default();
    limits.daily_limit = daily_limit;
    limits.transaction_limit = transaction_limit;
    limits.cooldown_period = cooldown_period;
    limits.user_daily_limit = user_daily_limit;
    PROTOCOL_CONFIGS.save(deps.storage, key, &limits)?;

    Ok(Response::new()
        .add_event(
            Event::new("config_updated")
                .add_attribute("component", "security")
                .add_attribute("protocol", key)
                .add_attribute("daily_limit", daily_limit.to_string())
                .add_attribute("transaction_limit", transaction_limit.to_string())
                .add_attribute("cooldown_period", cooldown_period.to_string())
                .add_attribute("user_daily_limit", user_daily_limit.to_string()),
        )
        .add_attribute("method", "set_protocol_config")
        .add_attribute("protocol", key))
}

pub fn execute_set_global_daily_limit(
    deps: DepsMut,
    info: MessageInfo,
    limit: Uint128,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.global_daily_limit = limit;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "set_global_daily_limit")
        .add_attribute("limit", limit.to_string()))
}

pub fn execute_set_anomaly_thresholds(
    deps: DepsMut,
    info: MessageInfo,
    thresholds: AnomalyThresholds,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    if thresholds.frequency_threshold > 0 && thresholds.time_window == 0 {
        return Err(ContractError::InvalidThresholds {
            reason: "frequency threshold requires a time window".to_string(),
        });
    }
    ANOMALY_THRESHOLDS.save(deps.storage, &thresholds)?;

    Ok(Response::new()
        .add_attribute("method", "set_anomaly_thresholds")
        .add_attribute("volume_threshold", thresholds.volume_threshold.to_string())
        .add_attribute(
            "frequency_threshold",
            thresholds.frequency_threshold.to_string(),
        )
        .add_attribute("time_window", thresholds.time_window.to_string()))
}

// ============================================================================
// Pauses
// ============================================================================

fn set_protocol_paused(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
    paused: bool,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let key = protocol.as_str();
    let mut limits: ProtocolConfig = PROTOCOL_CONFIGS
        .may_load(deps.storage, key)?
        .unwrap_or_default();
    limits.paused = paused;
    PROTOCOL_CONFIGS.save(deps.storage, key, &limits)?;

    let (action, event) = if paused {
        ("pause_protocol", "protocol_paused")
    } else {
        ("unpause_protocol", "protocol_unpaused")
    };
    Ok(Response::new()
        .add_event(
            Event::new(event)
                .add_attribute("protocol", key)
                .add_attribute("by", info.sender.as_str()),
        )
        .add_attribute("method", action)
        .add_attribute("protocol", key))
}

pub fn execute_pause_protocol(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
) -> Result<Response, ContractError> {
    set_protocol_paused(deps, info, protocol, true)
}

pub fn execute_unpause_protocol(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
) -> Result<Response, ContractError> {
    set_protocol_paused(deps, info, protocol, false)
}

/// Pause all admissions (manager pause).
pub fn execute_pause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.paused = true;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("method", "pause"))
}

pub fn execute_unpause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.paused = false;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("method", "unpause"))
}

pub fn execute_activate_emergency_pause(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::Emergency, &info.sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.emergency_paused = true;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_event(
            Event::new("emergency_pause_activated").add_attribute("by", info.sender.as_str()),
        )
        .add_attribute("method", "activate_emergency_pause"))
}

pub fn execute_deactivate_emergency_pause(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::Emergency, &info.sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.emergency_paused = false;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_event(
            Event::new("emergency_pause_deactivated").add_attribute("by", info.sender.as_str()),
        )
        .add_attribute("method", "deactivate_emergency_pause"))
}

// ============================================================================
// Blocks & suspicious activity
// ============================================================================

pub fn execute_block_transfer(
    deps: DepsMut,
    info: MessageInfo,
    transfer_id: Binary,
    reason: String,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let id = parse_transfer_id(&transfer_id)?;
    BLOCKED_TRANSFERS.save(deps.storage, id.as_slice(), &true)?;

    Ok(Response::new()
        .add_event(
            Event::new("transfer_blocked")
                .add_attribute("transfer_id", bytes32_to_hex(&id))
                .add_attribute("reason", reason),
        )
        .add_attribute("method", "block_transfer")
        .add_attribute("transfer_id", bytes32_to_hex(&id)))
}

pub fn execute_unblock_transfer(
    deps: DepsMut,
    info: MessageInfo,
    transfer_id: Binary,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let id = parse_transfer_id(&transfer_id)?;
    BLOCKED_TRANSFERS.remove(deps.storage, id.as_slice());

    Ok(Response::new()
        .add_attribute("method", "unblock_transfer")
        .add_attribute("transfer_id", bytes32_to_hex(&id)))
}

pub fn execute_report_suspicious_activity(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
    reason: String,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let address = deps.api.addr_validate(&address)?;
    let count = flag_suspicious(deps.storage, &address)?;

    Ok(Response::new()
        .add_attribute("method", "report_suspicious_activity")
        .add_attribute("address", address)
        .add_attribute("reason", reason)
        .add_attribute("count", count.to_string())
        .add_attribute(
            "blocked",
            (count > SUSPICIOUS_ACTIVITY_CEILING).to_string(),
        ))
}

pub fn execute_clear_suspicious_activity(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_role(deps.as_ref(), Role::SecurityAdmin, &info.sender)?;

    let address = deps.api.addr_validate(&address)?;
    SUSPICIOUS_ACTIVITY.remove(deps.storage, &address);

    Ok(Response::new()
        .add_attribute("method", "clear_suspicious_activity")
        .add_attribute("address", address))
}
