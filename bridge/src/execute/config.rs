//! Module configuration handlers (admin only).
//!
//! This module handles:
//! - Destination mapping and trusted remotes
//! - Fee parameters and the fee collector
//! - Access lists (whitelist, blacklist, relayers)
//! - Backend endpoint parameters and the validator set
//! - Pause

use cosmwasm_std::{Binary, DepsMut, Event, MessageInfo, Response, Uint128};

use crate::backends::BackendConfig;
use crate::error::ContractError;
use crate::fee::{FeeParams, FEE_PARAMS};
use crate::state::{
    ensure_admin, Destination, BACKEND, BLACKLIST, CONFIG, DESTINATIONS, NATIVE_INDEX, RELAYERS,
    WHITELIST,
};
use common::Protocol;

fn config_event(key: &str) -> Event {
    Event::new("config_updated")
        .add_attribute("component", "bridge")
        .add_attribute("key", key)
}

fn load_destination(deps: &DepsMut, chain_id: u64) -> Result<Destination, ContractError> {
    DESTINATIONS
        .may_load(deps.storage, chain_id)?
        .ok_or(ContractError::DestinationNotSupported { chain_id })
}

// ============================================================================
// Destinations
// ============================================================================

/// Map `chain_id` to a backend-native id and trust `remote` on it.
pub fn execute_set_remote(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u64,
    native_id: String,
    remote: Binary,
) -> Result<Response, ContractError> {
    let config = ensure_admin(deps.as_ref(), &info.sender)?;
    if chain_id == config.this_chain_id {
        return Err(ContractError::InvalidNativeId {
            reason: format!("chain {} is this chain", chain_id),
        });
    }

    let backend = BACKEND.load(deps.storage)?;
    let native_id = backend.backend().parse_native_id(&native_id)?;
    backend.backend().validate_remote(&remote)?;

    if let Some(mapped) = NATIVE_INDEX.may_load(deps.storage, &native_id)? {
        if mapped != chain_id {
            return Err(ContractError::InvalidNativeId {
                reason: format!("{} is already mapped to chain {}", native_id, mapped),
            });
        }
    }

    let previous = DESTINATIONS.may_load(deps.storage, chain_id)?;
    if let Some(previous) = &previous {
        if previous.native_id != native_id {
            NATIVE_INDEX.remove(deps.storage, &previous.native_id);
        }
    }
    NATIVE_INDEX.save(deps.storage, &native_id, &chain_id)?;

    let destination = Destination {
        chain_id,
        native_id: native_id.clone(),
        trusted_remote: Some(remote.clone()),
        enabled: previous.map(|p| p.enabled).unwrap_or(true),
    };
    DESTINATIONS.save(deps.storage, chain_id, &destination)?;

    Ok(Response::new()
        .add_event(
            config_event("trusted_remote")
                .add_attribute("chain_id", chain_id.to_string())
                .add_attribute("native_id", &native_id)
                .add_attribute("remote", hex::encode(remote.as_slice())),
        )
        .add_attribute("method", "set_remote")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("native_id", native_id))
}

/// Drop the trusted remote; the native id mapping stays.
pub fn execute_remove_remote(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u64,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let mut destination = load_destination(&deps, chain_id)?;
    destination.trusted_remote = None;
    DESTINATIONS.save(deps.storage, chain_id, &destination)?;

    Ok(Response::new()
        .add_event(
            config_event("trusted_remote")
                .add_attribute("chain_id", chain_id.to_string())
                .add_attribute("remote", ""),
        )
        .add_attribute("method", "remove_remote")
        .add_attribute("chain_id", chain_id.to_string()))
}

pub fn execute_set_destination_enabled(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u64,
    enabled: bool,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let mut destination = load_destination(&deps, chain_id)?;
    destination.enabled = enabled;
    DESTINATIONS.save(deps.storage, chain_id, &destination)?;

    Ok(Response::new()
        .add_attribute("method", "set_destination_enabled")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("enabled", enabled.to_string()))
}

// ============================================================================
// Fees
// ============================================================================

pub fn execute_set_fee_params(
    deps: DepsMut,
    info: MessageInfo,
    fee_bps: u64,
    min_fee: Uint128,
    max_fee: Uint128,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let params = FeeParams {
        fee_bps,
        min_fee,
        max_fee,
    };
    params.validate()?;
    FEE_PARAMS.save(deps.storage, &params)?;

    Ok(Response::new()
        .add_event(
            config_event("fee_params")
                .add_attribute("fee_bps", fee_bps.to_string())
                .add_attribute("min_fee", min_fee.to_string())
                .add_attribute("max_fee", max_fee.to_string()),
        )
        .add_attribute("method", "set_fee_params"))
}

pub fn execute_set_fee_collector(
    deps: DepsMut,
    info: MessageInfo,
    collector: String,
) -> Result<Response, ContractError> {
    let mut config = ensure_admin(deps.as_ref(), &info.sender)?;
    config.fee_collector = deps.api.addr_validate(&collector)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_event(
            config_event("fee_collector").add_attribute("collector", &config.fee_collector),
        )
        .add_attribute("method", "set_fee_collector")
        .add_attribute("collector", config.fee_collector))
}

// ============================================================================
// Access Lists
// ============================================================================

pub fn execute_set_whitelisted(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
    whitelisted: bool,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let address = deps.api.addr_validate(&address)?;
    if whitelisted {
        WHITELIST.save(deps.storage, &address, &true)?;
    } else {
        WHITELIST.remove(deps.storage, &address);
    }

    Ok(Response::new()
        .add_attribute("method", "set_whitelisted")
        .add_attribute("address", address)
        .add_attribute("whitelisted", whitelisted.to_string()))
}

pub fn execute_set_blacklisted(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
    blacklisted: bool,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let address = deps.api.addr_validate(&address)?;
    if blacklisted {
        BLACKLIST.save(deps.storage, &address, &true)?;
    } else {
        BLACKLIST.remove(deps.storage, &address);
    }

    Ok(Response::new()
        .add_attribute("method", "set_blacklisted")
        .add_attribute("address", address)
        .add_attribute("blacklisted", blacklisted.to_string()))
}

pub fn execute_add_relayer(
    deps: DepsMut,
    info: MessageInfo,
    relayer: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let relayer = deps.api.addr_validate(&relayer)?;
    RELAYERS.save(deps.storage, &relayer, &true)?;

    Ok(Response::new()
        .add_attribute("method", "add_relayer")
        .add_attribute("relayer", relayer))
}

pub fn execute_remove_relayer(
    deps: DepsMut,
    info: MessageInfo,
    relayer: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let relayer = deps.api.addr_validate(&relayer)?;
    RELAYERS.remove(deps.storage, &relayer);

    Ok(Response::new()
        .add_attribute("method", "remove_relayer")
        .add_attribute("relayer", relayer))
}

// ============================================================================
// Backend
// ============================================================================

/// Replace endpoint parameters. The protocol is fixed for the instance.
pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    backend: BackendConfig,
) -> Result<Response, ContractError> {
    let config = ensure_admin(deps.as_ref(), &info.sender)?;
    if backend.protocol() != config.protocol {
        return Err(ContractError::BackendMismatch {
            expected: config.protocol,
            got: backend.protocol(),
        });
    }
    backend.backend().validate(deps.api)?;
    BACKEND.save(deps.storage, &backend)?;

    Ok(Response::new()
        .add_event(config_event("backend").add_attribute("protocol", config.protocol.as_str()))
        .add_attribute("method", "update_config"))
}

pub fn execute_update_validators(
    deps: DepsMut,
    info: MessageInfo,
    validators: Vec<Binary>,
    threshold: u32,
) -> Result<Response, ContractError> {
    let config = ensure_admin(deps.as_ref(), &info.sender)?;

    let BackendConfig::ValidatorSet(mut set) = BACKEND.load(deps.storage)? else {
        return Err(ContractError::BackendMismatch {
            expected: config.protocol,
            got: Protocol::ValidatorSet,
        });
    };
    set.validators = validators;
    set.threshold = threshold;
    let backend = BackendConfig::ValidatorSet(set);
    backend.backend().validate(deps.api)?;
    BACKEND.save(deps.storage, &backend)?;

    Ok(Response::new()
        .add_event(config_event("validators").add_attribute("threshold", threshold.to_string()))
        .add_attribute("method", "update_validators")
        .add_attribute("threshold", threshold.to_string()))
}

// ============================================================================
// Pause
// ============================================================================

pub fn execute_pause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = ensure_admin(deps.as_ref(), &info.sender)?;
    config.paused = true;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_event(config_event("paused").add_attribute("paused", "true"))
        .add_attribute("method", "pause"))
}

pub fn execute_unpause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = ensure_admin(deps.as_ref(), &info.sender)?;
    config.paused = false;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_event(config_event("paused").add_attribute("paused", "false"))
        .add_attribute("method", "unpause"))
}
