//! State definitions for the Omnibridge bridge module
//!
//! One module instance serves one messaging protocol. Besides configuration
//! it owns the destination mapping (uniform chain id to backend-native id and
//! trusted remote), the transfer records and the replay sets.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Deps, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use crate::backends::BackendConfig;
use crate::error::ContractError;
use common::Protocol;

/// Contract name for migration info
pub const CONTRACT_NAME: &str = "crates.io:omnibridge-bridge";
/// Contract version for migration info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Admin timelock duration in seconds (7 days)
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Reply id for the backend dispatch submessage
pub const DISPATCH_REPLY_ID: u64 = 1;
/// Reply id for the gateway mint submessage
pub const MINT_REPLY_ID: u64 = 2;

/// Recipients longer than this are rejected
pub const MAX_RECIPIENT_LEN: usize = 255;

// ============================================================================
// Core Configuration
// ============================================================================

/// Module configuration
#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Gateway holding the token ledger and the security manager
    pub gateway: Addr,
    /// Protocol this instance implements (fixed at instantiate)
    pub protocol: Protocol,
    /// Uniform chain id of this network
    pub this_chain_id: u64,
    /// Native denom network fees are paid in
    pub fee_denom: String,
    /// Receives the bridged-token protocol fee
    pub fee_collector: Addr,
    /// Outbound pause; whitelisted senders bypass it
    pub paused: bool,
}

/// Pending admin change proposal
#[cw_serde]
pub struct PendingAdmin {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

/// Remote chain as seen by this module
#[cw_serde]
pub struct Destination {
    /// Uniform chain id
    pub chain_id: u64,
    /// Backend-native id (endpoint id, domain, wormhole chain, chain name)
    pub native_id: String,
    /// Remote module authorized as inbound source and outbound receiver
    pub trusted_remote: Option<Binary>,
    pub enabled: bool,
}

// ============================================================================
// Transfers
// ============================================================================

#[cw_serde]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
        }
    }
}

#[cw_serde]
pub enum Direction {
    Outbound,
    Inbound,
}

/// Transfer record, kept forever
#[cw_serde]
pub struct BridgeTransfer {
    pub id: Binary,
    /// Local address bytes for outbound, remote sender bytes for inbound
    pub sender: Binary,
    pub recipient: Binary,
    /// Net amount bridged
    pub amount: Uint128,
    pub source_chain: u64,
    pub destination_chain: u64,
    pub protocol: Protocol,
    pub status: TransferStatus,
    pub direction: Direction,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub failure_reason: Option<String>,
}

/// Verified inbound message that could not be decoded
#[cw_serde]
pub struct FailedMessage {
    pub payload_hash: Binary,
    pub source_chain: u64,
    pub sender: Binary,
    pub payload: Binary,
    pub reason: String,
    pub failed_at: Timestamp,
}

/// Module statistics
#[cw_serde]
#[derive(Default)]
pub struct Stats {
    pub total_outgoing: u64,
    pub total_incoming: u64,
    pub total_failed: u64,
    pub total_sent: Uint128,
    pub total_received: Uint128,
    pub total_fees: Uint128,
}

// ============================================================================
// Storage
// ============================================================================

pub const CONFIG: Item<Config> = Item::new("config");
pub const BACKEND: Item<BackendConfig> = Item::new("backend");
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");
pub const STATS: Item<Stats> = Item::new("stats");

/// Outbound nonce, part of every directly issued transfer id
pub const OUTGOING_NONCE: Item<u64> = Item::new("outgoing_nonce");

/// Set while a backend dispatch or a mint is in flight
pub const ENTERED: Item<bool> = Item::new("entered");

/// Transfer id awaiting the mint reply
pub const PENDING_MINT: Item<Binary> = Item::new("pending_mint");

/// Destinations keyed by uniform chain id
pub const DESTINATIONS: Map<u64, Destination> = Map::new("destinations");

/// Backend-native id -> uniform chain id
pub const NATIVE_INDEX: Map<&str, u64> = Map::new("native_index");

pub const WHITELIST: Map<&Addr, bool> = Map::new("whitelist");
pub const BLACKLIST: Map<&Addr, bool> = Map::new("blacklist");

/// Relayers allowed to submit validator-signed messages
pub const RELAYERS: Map<&Addr, bool> = Map::new("relayers");

/// Transfer records keyed by transfer id
pub const TRANSFERS: Map<&[u8], BridgeTransfer> = Map::new("transfers");

/// Inbound transfer ids already minted (or settled as failed)
pub const PROCESSED_TRANSFERS: Map<&[u8], bool> = Map::new("processed_transfers");

/// Inbound (source native id, nonce or sequence) pairs already seen
pub const PROCESSED_NONCES: Map<(&str, u64), bool> = Map::new("processed_nonces");

/// Undecodable inbound messages keyed by keccak256(payload)
pub const FAILED_MESSAGES: Map<&[u8], FailedMessage> = Map::new("failed_messages");

// ============================================================================
// Helpers
// ============================================================================

pub fn ensure_admin(deps: Deps, sender: &Addr) -> Result<Config, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if *sender != config.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(config)
}

pub fn is_entered(deps: Deps) -> Result<bool, ContractError> {
    Ok(ENTERED.may_load(deps.storage)?.unwrap_or(false))
}
