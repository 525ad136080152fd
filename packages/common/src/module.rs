//! Router-facing subset of the bridge module interface.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Uint128};

use crate::Protocol;

/// Context the gateway attaches when it routes a transfer to a module.
///
/// Only honoured when the caller is the module's configured gateway.
#[cw_serde]
pub struct RoutedTransfer {
    /// Original sender whose tokens are burned.
    pub sender: String,
    /// 32-byte transfer id already admitted by the gateway.
    pub transfer_id: Binary,
}

#[cw_serde]
pub enum ModuleExecuteMsg {
    InitiateTransfer {
        destination: u64,
        recipient: Binary,
        amount: Uint128,
        routed: Option<RoutedTransfer>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum ModuleQueryMsg {
    #[returns(FeeQuoteResponse)]
    QuoteFee { destination: u64, amount: Uint128 },
}

/// Fee quote for a transfer of `amount` to a destination.
#[cw_serde]
pub struct FeeQuoteResponse {
    pub protocol: Protocol,
    /// Native-coin fee charged by the underlying messaging protocol.
    pub native_fee: Uint128,
    pub native_denom: String,
    /// Bridged-token fee deducted from the amount.
    pub protocol_fee: Uint128,
}
