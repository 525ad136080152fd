//! Protocol registry.
//!
//! One module per protocol. Registrations move through
//! active -> inactive -> active and may be deprecated, which is terminal.
//! Each protocol keeps its own destination allow-list with an opaque
//! per-destination configuration blob.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Storage, Timestamp};
use cw_storage_plus::Map;

use crate::error::ContractError;
use common::Protocol;

/// Minimum spacing between health checks of one protocol
pub const HEALTH_CHECK_INTERVAL: u64 = 3_600;

/// Registered bridge module for a protocol
#[cw_serde]
pub struct ProtocolRegistration {
    pub protocol: Protocol,
    pub module: Addr,
    pub version: String,
    pub active: bool,
    pub deprecated: bool,
    pub registered_at: Timestamp,
    pub last_health_check: Option<Timestamp>,
}

/// Destination allow-list entry
#[cw_serde]
pub struct DestinationSupport {
    pub supported: bool,
    pub config: Binary,
}

/// Registrations keyed by protocol key
pub const REGISTRATIONS: Map<&str, ProtocolRegistration> = Map::new("registrations");

/// Reverse index module -> protocol
pub const MODULE_PROTOCOLS: Map<&Addr, Protocol> = Map::new("module_protocols");

/// Destination support keyed by (protocol key, destination chain id)
pub const DESTINATIONS: Map<(&str, u64), DestinationSupport> = Map::new("destinations");

pub fn load_registration(
    storage: &dyn Storage,
    protocol: Protocol,
) -> Result<ProtocolRegistration, ContractError> {
    REGISTRATIONS
        .may_load(storage, protocol.as_str())?
        .ok_or(ContractError::ProtocolNotRegistered { protocol })
}

/// Load a registration that may carry new transfers.
pub fn load_active(
    storage: &dyn Storage,
    protocol: Protocol,
) -> Result<ProtocolRegistration, ContractError> {
    let registration = load_registration(storage, protocol)?;
    if registration.deprecated {
        return Err(ContractError::ProtocolDeprecated { protocol });
    }
    if !registration.active {
        return Err(ContractError::ProtocolInactive { protocol });
    }
    Ok(registration)
}

pub fn is_destination_supported(
    storage: &dyn Storage,
    protocol: Protocol,
    destination: u64,
) -> Result<bool, ContractError> {
    Ok(DESTINATIONS
        .may_load(storage, (protocol.as_str(), destination))?
        .map(|d| d.supported)
        .unwrap_or(false))
}

/// Resolve the protocol a calling module is registered for.
pub fn module_protocol(
    storage: &dyn Storage,
    module: &Addr,
) -> Result<ProtocolRegistration, ContractError> {
    let protocol = MODULE_PROTOCOLS
        .may_load(storage, module)?
        .ok_or(ContractError::UnauthorizedModule)?;
    load_registration(storage, protocol)
}

/// Check `module` is the module registered for `protocol` and the protocol is usable.
pub fn ensure_active_module(
    storage: &dyn Storage,
    module: &Addr,
    protocol: Protocol,
) -> Result<ProtocolRegistration, ContractError> {
    let registration = load_active(storage, protocol)?;
    if registration.module != *module {
        return Err(ContractError::ModuleMismatch { protocol });
    }
    Ok(registration)
}

/// Apply a status change. Deprecation is terminal.
pub fn apply_status(
    registration: &mut ProtocolRegistration,
    active: bool,
    deprecated: bool,
) -> Result<(), ContractError> {
    if registration.deprecated {
        return Err(ContractError::ProtocolDeprecated {
            protocol: registration.protocol,
        });
    }
    if deprecated {
        registration.deprecated = true;
        registration.active = false;
    } else {
        registration.active = active;
    }
    Ok(())
}
