//! State definitions for the Omnibridge gateway contract

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Deps, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;

/// Contract name for migration info
pub const CONTRACT_NAME: &str = "crates.io:omnibridge-gateway";
/// Contract version for migration info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Admin timelock duration in seconds (7 days)
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Reply id for the routed module dispatch
pub const ROUTE_REPLY_ID: u64 = 1;

// ============================================================================
// Configuration
// ============================================================================

/// Gateway configuration
#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Bridged cw20 token; the gateway holds its minter role
    pub token: Addr,
    /// Manager-level pause set by the security admins
    pub paused: bool,
    /// Emergency pause set by the emergency operators
    pub emergency_paused: bool,
    /// Gateway-wide 24h volume ceiling (0 = unlimited)
    pub global_daily_limit: Uint128,
}

/// Pending admin change
#[cw_serde]
pub struct PendingAdmin {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

/// Gateway statistics
#[cw_serde]
#[derive(Default)]
pub struct Stats {
    pub total_routed: u64,
    pub total_admitted: u64,
    pub total_minted: Uint128,
    pub total_burned: Uint128,
    pub total_fees_collected: Uint128,
    pub anomalies_detected: u64,
}

// ============================================================================
// Roles
// ============================================================================

/// Delegated roles. The admin implicitly holds all of them.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Role {
    /// Manages limits, thresholds, pauses, blocks and suspicious-activity state
    SecurityAdmin,
    /// Toggles the emergency pause
    Emergency,
    /// Publishes per-destination gas price samples
    GasOracle,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SecurityAdmin => "security_admin",
            Role::Emergency => "emergency",
            Role::GasOracle => "gas_oracle",
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

pub const CONFIG: Item<Config> = Item::new("config");
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");
pub const STATS: Item<Stats> = Item::new("stats");

/// Role grants keyed by (role, address)
pub const ROLES: Map<(&str, &Addr), bool> = Map::new("roles");

/// Nonce for router-assigned transfer ids
pub const ROUTER_NONCE: Item<u64> = Item::new("router_nonce");

/// Inbound transfer ids already minted, keyed by (protocol, transfer id)
pub const MINTED: Map<(&str, &[u8]), bool> = Map::new("minted");

/// Set while a routed module dispatch is in flight
pub const ENTERED: Item<bool> = Item::new("entered");

// ============================================================================
// Access helpers
// ============================================================================

pub fn has_role(deps: Deps, role: Role, address: &Addr) -> Result<bool, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if *address == config.admin {
        return Ok(true);
    }
    Ok(ROLES
        .may_load(deps.storage, (role.as_str(), address))?
        .unwrap_or(false))
}

pub fn ensure_role(deps: Deps, role: Role, address: &Addr) -> Result<(), ContractError> {
    if !has_role(deps, role, address)? {
        return Err(ContractError::MissingRole {
            role: role.as_str().to_string(),
        });
    }
    Ok(())
}

pub fn ensure_admin(deps: Deps, address: &Addr) -> Result<Config, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if *address != config.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(config)
}
