//! Error types for the Omnibridge gateway contract

use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

use common::Protocol;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: caller lacks the {role} role")]
    MissingRole { role: String },

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    #[error("Unauthorized: caller is not a registered bridge module")]
    UnauthorizedModule,

    #[error("Unauthorized: caller is not the module registered for {protocol}")]
    ModuleMismatch { protocol: Protocol },

    // ========================================================================
    // Admin Errors
    // ========================================================================

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    // ========================================================================
    // Registry Errors
    // ========================================================================

    #[error("Protocol not registered: {protocol}")]
    ProtocolNotRegistered { protocol: Protocol },

    #[error("Protocol already registered: {protocol}")]
    ProtocolAlreadyRegistered { protocol: Protocol },

    #[error("Protocol inactive: {protocol}")]
    ProtocolInactive { protocol: Protocol },

    #[error("Protocol deprecated: {protocol}")]
    ProtocolDeprecated { protocol: Protocol },

    #[error("Module already registered for {protocol}")]
    ModuleAlreadyRegistered { protocol: Protocol },

    #[error("Destination {destination} not supported by {protocol}")]
    DestinationNotSupported { protocol: Protocol, destination: u64 },

    #[error("Health check too soon: {remaining_seconds} seconds remaining")]
    HealthCheckTooSoon { remaining_seconds: u64 },

    // ========================================================================
    // Security Errors
    // ========================================================================

    #[error("Emergency pause active")]
    EmergencyPaused,

    #[error("Gateway is paused")]
    GatewayPaused,

    #[error("Protocol paused: {protocol}")]
    ProtocolPaused { protocol: Protocol },

    #[error("Transfer blocked: {transfer_id}")]
    TransferBlocked { transfer_id: String },

    #[error("Address blocked after repeated suspicious activity: {address}")]
    AddressBlocked { address: String },

    #[error("Rate limit exceeded: {limit_type} limit {limit}, requested {requested}")]
    RateLimitExceeded {
        limit_type: String,
        limit: Uint128,
        requested: Uint128,
    },

    #[error("Cooldown active: {remaining_seconds} seconds remaining")]
    CooldownActive { remaining_seconds: u64 },

    #[error("Re-entrant call rejected")]
    Reentrancy,

    // ========================================================================
    // Input Errors
    // ========================================================================

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid recipient: {reason}")]
    InvalidRecipient { reason: String },

    #[error("Transfer {transfer_id} already minted via {protocol}")]
    AlreadyMinted {
        protocol: Protocol,
        transfer_id: String,
    },

    #[error("Invalid transfer id: expected 32 bytes, got {len}")]
    InvalidTransferId { len: usize },

    #[error("Invalid fee policy: {reason}")]
    InvalidFeePolicy { reason: String },

    #[error("Invalid anomaly thresholds: {reason}")]
    InvalidThresholds { reason: String },

    #[error("Invalid module: {reason}")]
    InvalidModule { reason: String },

    // ========================================================================
    // Fee Errors
    // ========================================================================

    #[error("Fee quote unavailable for {protocol}: {reason}")]
    FeeQuoteUnavailable { protocol: Protocol, reason: String },
}
