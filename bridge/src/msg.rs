//! Message types for the Omnibridge bridge module

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};

use crate::backends::{BackendConfig, ValidatorSignature};
use crate::fee::FeeParams;
use crate::state::{BridgeTransfer, Destination, FailedMessage, Stats};
use common::module::{FeeQuoteResponse, RoutedTransfer};
use common::Protocol;

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Gateway the module is registered with
    pub gateway: String,
    /// Uniform chain id of this network
    pub this_chain_id: u64,
    pub fee_collector: String,
    /// Native denom network fees are paid in
    pub fee_denom: String,
    pub fee_params: FeeParams,
    pub backend: BackendConfig,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Outbound
    // ========================================================================
    /// Burn `amount` of the bridged token and send it to `destination`.
    /// Attached native funds pay the network fee; the excess is refunded.
    InitiateTransfer {
        destination: u64,
        recipient: Binary,
        amount: Uint128,
        /// Set by the gateway when it routes a transfer here
        routed: Option<RoutedTransfer>,
    },

    // ========================================================================
    // Inbound (one entry per backend)
    // ========================================================================
    /// LayerZero endpoint delivery
    LzReceive {
        src_eid: u32,
        sender: Binary,
        nonce: u64,
        message: Binary,
    },
    /// Hyperlane mailbox delivery
    Handle {
        origin: u32,
        sender: Binary,
        body: Binary,
    },
    /// Axelar gateway delivery
    Execute {
        source_chain: String,
        source_address: String,
        payload: Binary,
    },
    /// Guardian-signed VAA; anyone may submit
    SubmitVaa { vaa: Binary },
    /// Validator-signed message; registered relayers only
    SubmitSigned {
        source_chain: u64,
        sender: Binary,
        payload: Binary,
        issued_at: u64,
        signatures: Vec<ValidatorSignature>,
    },

    // ========================================================================
    // Configuration (admin)
    // ========================================================================
    SetRemote {
        chain_id: u64,
        native_id: String,
        remote: Binary,
    },
    RemoveRemote {
        chain_id: u64,
    },
    SetDestinationEnabled {
        chain_id: u64,
        enabled: bool,
    },
    SetFeeParams {
        fee_bps: u64,
        min_fee: Uint128,
        max_fee: Uint128,
    },
    SetFeeCollector {
        collector: String,
    },
    SetWhitelisted {
        address: String,
        whitelisted: bool,
    },
    SetBlacklisted {
        address: String,
        blacklisted: bool,
    },
    AddRelayer {
        relayer: String,
    },
    RemoveRelayer {
        relayer: String,
    },
    /// Replace endpoint parameters; the protocol cannot change
    UpdateConfig {
        backend: BackendConfig,
    },
    /// Validator-set backend only
    UpdateValidators {
        validators: Vec<Binary>,
        threshold: u32,
    },
    Pause {},
    Unpause {},
    /// Settle a pending transfer as failed
    MarkFailed {
        transfer_id: Binary,
        reason: String,
    },

    // ========================================================================
    // Admin
    // ========================================================================
    ProposeAdmin {
        new_admin: String,
    },
    AcceptAdmin {},
    CancelAdminProposal {},
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(StatusResponse)]
    Status {},

    #[returns(BackendConfig)]
    Backend {},

    #[returns(FeeParams)]
    FeeParams {},

    #[returns(CalculateFeeResponse)]
    CalculateFee { amount: Uint128 },

    /// Network and protocol fee for a transfer; used by the gateway
    #[returns(FeeQuoteResponse)]
    QuoteFee { destination: u64, amount: Uint128 },

    #[returns(Option<BridgeTransfer>)]
    Transfer { transfer_id: Binary },

    #[returns(TransfersResponse)]
    Transfers {
        start_after: Option<Binary>,
        limit: Option<u32>,
    },

    #[returns(Option<Destination>)]
    Destination { chain_id: u64 },

    #[returns(DestinationsResponse)]
    Destinations {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(IsProcessedResponse)]
    IsProcessed { transfer_id: Binary },

    #[returns(IsProcessedResponse)]
    IsNonceProcessed { source: String, nonce: u64 },

    #[returns(Option<FailedMessage>)]
    FailedMessage { payload_hash: Binary },

    #[returns(AccessListResponse)]
    AccessList { address: String },

    #[returns(ValidatorsResponse)]
    Validators {},

    #[returns(Option<PendingAdminResponse>)]
    PendingAdmin {},
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub gateway: Addr,
    pub protocol: Protocol,
    pub this_chain_id: u64,
    pub fee_denom: String,
    pub fee_collector: Addr,
}

#[cw_serde]
pub struct StatusResponse {
    pub paused: bool,
    pub outgoing_nonce: u64,
    pub stats: Stats,
}

#[cw_serde]
pub struct CalculateFeeResponse {
    pub fee: Uint128,
    pub net_amount: Uint128,
}

#[cw_serde]
pub struct TransfersResponse {
    pub transfers: Vec<BridgeTransfer>,
}

#[cw_serde]
pub struct DestinationsResponse {
    pub destinations: Vec<Destination>,
}

#[cw_serde]
pub struct IsProcessedResponse {
    pub processed: bool,
}

#[cw_serde]
pub struct AccessListResponse {
    pub whitelisted: bool,
    pub blacklisted: bool,
    pub relayer: bool,
}

#[cw_serde]
pub struct ValidatorsResponse {
    pub validators: Vec<Binary>,
    pub threshold: u32,
    pub message_timeout: u64,
}

#[cw_serde]
pub struct PendingAdminResponse {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}
