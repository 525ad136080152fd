//! Message types for the Omnibridge gateway contract

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};

use crate::fee_manager::{FeeCacheEntry, FeePolicy, GasPriceSample};
use crate::registry::ProtocolRegistration;
use crate::security::{AnomalyThresholds, ProtocolConfig, RateLimitWindow};
use crate::state::{Role, Stats};
use common::gateway::DestinationSupportedResponse;
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
    /// Bridged cw20 token; the gateway must be its minter
    pub token: String,
    /// Gateway-wide 24h volume ceiling (0 = unlimited)
    pub global_daily_limit: Uint128,
    /// Initial anomaly heuristics (defaults to disabled)
    pub anomaly_thresholds: Option<AnomalyThresholds>,
    pub security_admins: Vec<String>,
    pub emergency_operators: Vec<String>,
    pub gas_oracles: Vec<String>,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Router
    // ========================================================================
    /// Bridge `amount` of the token through `protocol`. Native funds attached
    /// pay the protocol's network fee; any excess is refunded by the module.
    Bridge {
        protocol: Protocol,
        destination: u64,
        /// Destination-native recipient bytes
        recipient: Binary,
        amount: Uint128,
    },

    // ========================================================================
    // Module-facing (registered modules only)
    // ========================================================================
    /// Security admission for a transfer initiated directly at a module
    Admit {
        sender: String,
        protocol: Protocol,
        amount: Uint128,
        transfer_id: Binary,
    },
    BurnFrom {
        owner: String,
        amount: Uint128,
    },
    CollectFee {
        owner: String,
        amount: Uint128,
        collector: String,
    },
    Mint {
        recipient: String,
        amount: Uint128,
        transfer_id: Binary,
    },

    // ========================================================================
    // Registry (admin)
    // ========================================================================
    RegisterProtocol {
        protocol: Protocol,
        module: String,
        version: String,
    },
    UpdateModule {
        protocol: Protocol,
        module: String,
        version: String,
    },
    SetProtocolStatus {
        protocol: Protocol,
        active: bool,
        deprecated: bool,
    },
    SetDestinationSupport {
        protocol: Protocol,
        destination: u64,
        supported: bool,
        config: Option<Binary>,
    },
    /// Anyone may trigger, at most once per interval per protocol
    PerformHealthCheck {
        protocol: Protocol,
    },

    // ========================================================================
    // Security (security admin)
    // ========================================================================
    SetProtocolConfig {
        protocol: Protocol,
        daily_limit: Uint128,
        transaction_limit: Uint128,
        cooldown_period: u64,
        user_daily_limit: Uint128,
    },
    SetGlobalDailyLimit {
        limit: Uint128,
    },
    SetAnomalyThresholds {
        volume_threshold: Uint128,
        frequency_threshold: u32,
        time_window: u64,
    },
    PauseProtocol {
        protocol: Protocol,
    },
    UnpauseProtocol {
        protocol: Protocol,
    },
    Pause {},
    Unpause {},
    BlockTransfer {
        transfer_id: Binary,
        reason: String,
    },
    UnblockTransfer {
        transfer_id: Binary,
    },
    ReportSuspiciousActivity {
        address: String,
        reason: String,
    },
    ClearSuspiciousActivity {
        address: String,
    },

    // ========================================================================
    // Emergency (emergency role)
    // ========================================================================
    ActivateEmergencyPause {},
    DeactivateEmergencyPause {},

    // ========================================================================
    // Fees
    // ========================================================================
    /// Estimate and cache; response data is a [`FeeEstimateResponse`]
    EstimateFee {
        protocol: Protocol,
        destination: u64,
        amount: Uint128,
    },
    /// Admin
    SetFeePolicy {
        protocol: Protocol,
        multiplier_bps: u64,
        base_fee: Uint128,
        gas_limit: u64,
    },
    /// Admin
    InvalidateFeeCache {
        destination: u64,
        protocol: Protocol,
    },
    /// Gas oracle
    UpdateGasPrice {
        destination: u64,
        price: Uint128,
    },

    // ========================================================================
    // Admin
    // ========================================================================
    GrantRole {
        role: Role,
        address: String,
    },
    RevokeRole {
        role: Role,
        address: String,
    },
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

    #[returns(Stats)]
    Stats {},

    #[returns(Option<PendingAdminResponse>)]
    PendingAdmin {},

    #[returns(HasRoleResponse)]
    HasRole { role: Role, address: String },

    // Registry
    #[returns(ProtocolRegistration)]
    Registration { protocol: Protocol },

    #[returns(RegistrationsResponse)]
    Registrations {},

    #[returns(DestinationSupportedResponse)]
    DestinationSupported { protocol: Protocol, destination: u64 },

    #[returns(DestinationsResponse)]
    Destinations {
        protocol: Protocol,
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    // Security
    #[returns(ProtocolConfig)]
    ProtocolConfig { protocol: Protocol },

    #[returns(UsageResponse)]
    ProtocolUsage { protocol: Protocol },

    #[returns(UsageResponse)]
    UserUsage { address: String, protocol: Protocol },

    #[returns(UsageResponse)]
    GlobalUsage {},

    #[returns(AnomalyThresholds)]
    AnomalyThresholds {},

    #[returns(SuspiciousActivityResponse)]
    SuspiciousActivity { address: String },

    #[returns(IsTransferBlockedResponse)]
    IsTransferBlocked { transfer_id: Binary },

    // Fees
    #[returns(FeePolicy)]
    FeePolicy { protocol: Protocol },

    #[returns(Option<GasPriceSample>)]
    GasPrice { destination: u64 },

    #[returns(Option<FeeCacheEntry>)]
    CachedFee { destination: u64, protocol: Protocol },

    /// Cache-or-compute without writing the cache
    #[returns(FeeEstimateResponse)]
    EstimateFee {
        protocol: Protocol,
        destination: u64,
        amount: Uint128,
    },

    /// Estimate for every registered protocol
    #[returns(CompareFeesResponse)]
    CompareFees { destination: u64, amount: Uint128 },
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub token: Addr,
    pub global_daily_limit: Uint128,
}

#[cw_serde]
pub struct StatusResponse {
    pub paused: bool,
    pub emergency_paused: bool,
    pub registered_protocols: u32,
    pub active_protocols: u32,
}

#[cw_serde]
pub struct PendingAdminResponse {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

#[cw_serde]
pub struct HasRoleResponse {
    pub has_role: bool,
}

#[cw_serde]
pub struct RegistrationsResponse {
    pub registrations: Vec<ProtocolRegistration>,
}

#[cw_serde]
pub struct DestinationInfo {
    pub destination: u64,
    pub supported: bool,
    pub config: Binary,
}

#[cw_serde]
pub struct DestinationsResponse {
    pub destinations: Vec<DestinationInfo>,
}

/// Window usage as seen at query time (expired windows read as empty)
#[cw_serde]
pub struct UsageResponse {
    pub window: RateLimitWindow,
    pub limit: Uint128,
    pub remaining: Uint128,
}

#[cw_serde]
pub struct SuspiciousActivityResponse {
    pub count: u32,
    pub blocked: bool,
}

#[cw_serde]
pub struct IsTransferBlockedResponse {
    pub blocked: bool,
}

#[cw_serde]
pub struct FeeEstimateResponse {
    pub protocol: Protocol,
    pub destination: u64,
    pub fee: Uint128,
    pub cached: bool,
    pub computed_at: Timestamp,
}

#[cw_serde]
pub struct ProtocolFee {
    pub protocol: Protocol,
    /// [`crate::FEE_UNAVAILABLE`] when the module could not quote
    pub fee: Uint128,
}

#[cw_serde]
pub struct CompareFeesResponse {
    pub destination: u64,
    pub fees: Vec<ProtocolFee>,
}
