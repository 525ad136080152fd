//! Protocol registry handlers.

use cosmwasm_std::{Binary, DepsMut, Env, Event, MessageInfo, Response};

use crate::error::ContractError;
use crate::registry::{
    apply_status, load_registration, DestinationSupport, ProtocolRegistration, DESTINATIONS,
    HEALTH_CHECK_INTERVAL, MODULE_PROTOCOLS, REGISTRATIONS,
};
use crate::state::ensure_admin;
use common::Protocol;

pub fn execute_register_protocol(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    protocol: Protocol,
    module: String,
    version: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    if module.trim().is_empty() {
        return Err(ContractError::InvalidModule {
            reason: "module address is empty".to_string(),
        });
    }
    if REGISTRATIONS.has(deps.storage, protocol.as_str()) {
        return Err(ContractError::ProtocolAlreadyRegistered { protocol });
    }
    let module = deps.api.addr_validate(&module)?;
    if let Some(existing) = MODULE_PROTOCOLS.may_load(deps.storage, &module)? {
        return Err(ContractError::ModuleAlreadyRegistered { protocol: existing });
    }

    let registration = ProtocolRegistration {
        protocol,
        module: module.clone(),
        version: version.clone(),
        active: true,
        deprecated: false,
        registered_at: env.block.time,
        last_health_check: None,
    };
    REGISTRATIONS.save(deps.storage, protocol.as_str(), &registration)?;
    MODULE_PROTOCOLS.save(deps.storage, &module, &protocol)?;

    Ok(Response::new()
        .add_attribute("method", "register_protocol")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("module", module)
        .add_attribute("version", version))
}

/// Swap the module behind a protocol. The previous module loses its
/// ledger access immediately.
pub fn execute_update_module(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
    module: String,
    version: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let mut registration = load_registration(deps.storage, protocol)?;
    if registration.deprecated {
        return Err(ContractError::ProtocolDeprecated { protocol });
    }
    let module = deps.api.addr_validate(&module)?;
    if let Some(existing) = MODULE_PROTOCOLS.may_load(deps.storage, &module)? {
        if existing != protocol {
            return Err(ContractError::ModuleAlreadyRegistered { protocol: existing });
        }
    }

    MODULE_PROTOCOLS.remove(deps.storage, &registration.module);
    MODULE_PROTOCOLS.save(deps.storage, &module, &protocol)?;

    let previous = registration.module.clone();
    registration.module = module.clone();
    registration.version = version.clone();
    REGISTRATIONS.save(deps.storage, protocol.as_str(), &registration)?;

    Ok(Response::new()
        .add_event(
            Event::new("config_updated")
                .add_attribute("component", "registry")
                .add_attribute("protocol", protocol.as_str())
                .add_attribute("previous_module", previous)
                .add_attribute("module", module.clone()),
        )
        .add_attribute("method", "update_module")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("module", module)
        .add_attribute("version", version))
}

pub fn execute_set_protocol_status(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
    active: bool,
    deprecated: bool,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let mut registration = load_registration(deps.storage, protocol)?;
    apply_status(&mut registration, active, deprecated)?;
    REGISTRATIONS.save(deps.storage, protocol.as_str(), &registration)?;

    Ok(Response::new()
        .add_attribute("method", "set_protocol_status")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("active", registration.active.to_string())
        .add_attribute("deprecated", registration.deprecated.to_string()))
}

pub fn execute_set_destination_support(
    deps: DepsMut,
    info: MessageInfo,
    protocol: Protocol,
    destination: u64,
    supported: bool,
    config: Option<Binary>,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;
    load_registration(deps.storage, protocol)?;

    let key = (protocol.as_str(), destination);
    let config = match config {
        Some(c) => c,
        None => DESTINATIONS
            .may_load(deps.storage, key)?
            .map(|d| d.config)
            .unwrap_or_default(),
    };
    DESTINATIONS.save(deps.storage, key, &DestinationSupport { supported, config })?;

    Ok(Response::new()
        .add_attribute("method", "set_destination_support")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("destination", destination.to_string())
        .add_attribute("supported", supported.to_string()))
}

/// Probe the module contract. An unreachable module deactivates its protocol.
pub fn execute_perform_health_check(
    deps: DepsMut,
    env: Env,
    protocol: Protocol,
) -> Result<Response, ContractError> {
    let mut registration = load_registration(deps.storage, protocol)?;
    let now = env.block.time.seconds();

    if let Some(last) = registration.last_health_check {
        let next = last.seconds() + HEALTH_CHECK_INTERVAL;
        if now < next {
            return Err(ContractError::HealthCheckTooSoon {
                remaining_seconds: next - now,
            });
        }
    }

    let healthy = deps
        .querier
        .query_wasm_contract_info(registration.module.as_str())
        .is_ok();

    registration.last_health_check = Some(env.block.time);
    if !healthy {
        registration.active = false;
    }
    REGISTRATIONS.save(deps.storage, protocol.as_str(), &registration)?;

    Ok(Response::new()
        .add_event(
            Event::new("protocol_health_check")
                .add_attribute("protocol", protocol.as_str())
                .add_attribute("module", registration.module.as_str())
                .add_attribute("healthy", healthy.to_string())
                .add_attribute("active", registration.active.to_string()),
        )
        .add_attribute("method", "perform_health_check")
        .add_attribute("protocol", protocol.as_str()))
}
