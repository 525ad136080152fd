//! Error types for the Omnibridge bridge module

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

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    #[error("Unauthorized: routed transfers are only accepted from the gateway")]
    UnauthorizedRouter,

    #[error("Unauthorized: caller is not the {expected}")]
    UnauthorizedEndpoint { expected: String },

    #[error("Unauthorized: caller is not a registered relayer")]
    UnauthorizedRelayer,

    // ========================================================================
    // Admin Errors
    // ========================================================================

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    // ========================================================================
    // State Errors
    // ========================================================================

    #[error("Bridge module is paused")]
    ModulePaused,

    #[error("Re-entrant call rejected")]
    Reentrancy,

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid recipient: {reason}")]
    InvalidRecipient { reason: String },

    #[error("Invalid funds: {reason}")]
    InvalidFunds { reason: String },

    #[error("Invalid native chain id: {reason}")]
    InvalidNativeId { reason: String },

    #[error("Invalid remote address: {reason}")]
    InvalidRemote { reason: String },

    #[error("Invalid fee params: {reason}")]
    InvalidFeeParams { reason: String },

    #[error("Invalid backend config: {reason}")]
    InvalidBackendConfig { reason: String },

    #[error("Invalid transfer id: expected 32 bytes, got {len}")]
    InvalidTransferId { len: usize },

    #[error("Backend mismatch: module runs {expected}, got {got}")]
    BackendMismatch { expected: Protocol, got: Protocol },

    // ========================================================================
    // Transfer Policy Errors
    // ========================================================================

    #[error("Destination chain {chain_id} not supported")]
    DestinationNotSupported { chain_id: u64 },

    #[error("No trusted remote for chain {chain_id}")]
    NoTrustedRemote { chain_id: u64 },

    #[error("Sender is blacklisted: {address}")]
    SenderBlacklisted { address: String },

    #[error("Amount {amount} does not cover the bridge fee {fee}")]
    AmountBelowFee { amount: Uint128, fee: Uint128 },

    #[error("Insufficient network fee: required {required}, provided {provided}")]
    InsufficientNetworkFee { required: Uint128, provided: Uint128 },

    // ========================================================================
    // Authentication Errors
    // ========================================================================

    #[error("Delivery does not match the {protocol} backend")]
    WrongDelivery { protocol: Protocol },

    #[error("Unknown source chain: {origin}")]
    UnknownSource { origin: String },

    #[error("Untrusted remote for source chain {origin}")]
    UntrustedRemote { origin: String },

    #[error("Invalid VAA: {reason}")]
    InvalidVaa { reason: String },

    #[error("Message expired: issued at {issued_at}, timeout {timeout} seconds")]
    MessageExpired { issued_at: u64, timeout: u64 },

    #[error("Message issued in the future: issued at {issued_at}, block time {block_time}")]
    MessageFromFuture { issued_at: u64, block_time: u64 },

    #[error("Unknown validator index {index}")]
    UnknownValidator { index: u32 },

    #[error("Duplicate signature from validator {index}")]
    DuplicateSignature { index: u32 },

    #[error("Insufficient signatures: got {got}, required {required}")]
    InsufficientSignatures { got: u32, required: u32 },

    // ========================================================================
    // Replay Errors
    // ========================================================================

    #[error("Transfer already processed: {transfer_id}")]
    AlreadyProcessed { transfer_id: String },

    #[error("Nonce {nonce} from {origin} already processed")]
    NonceAlreadyProcessed { origin: String, nonce: u64 },

    #[error("Transfer already recorded: {transfer_id}")]
    TransferExists { transfer_id: String },

    // ========================================================================
    // Payload and Record Errors
    // ========================================================================

    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Transfer not found: {transfer_id}")]
    TransferNotFound { transfer_id: String },

    #[error("Transfer {transfer_id} already completed")]
    TransferCompleted { transfer_id: String },
}
