//! Module-facing subset of the gateway interface.
//!
//! Bridge modules never touch the token directly. They ask the gateway to
//! admit a transfer, burn the sender's tokens, move the protocol fee and mint
//! on delivery. The gateway holds the token's minter role and is the single
//! allowance spender users approve.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{to_json_binary, Addr, Binary, CosmosMsg, StdResult, Uint128, WasmMsg};

use crate::Protocol;

#[cw_serde]
pub enum GatewayExecuteMsg {
    /// Run security admission for a transfer the module initiated directly.
    Admit {
        sender: String,
        protocol: Protocol,
        amount: Uint128,
        transfer_id: Binary,
    },
    /// Burn `amount` of the bridged token from `owner` using the gateway allowance.
    BurnFrom { owner: String, amount: Uint128 },
    /// Move a protocol fee from `owner` to `collector`.
    CollectFee {
        owner: String,
        amount: Uint128,
        collector: String,
    },
    /// Mint `amount` of the bridged token to `recipient` for inbound
    /// `transfer_id`. Each id mints at most once per protocol.
    Mint {
        recipient: String,
        amount: Uint128,
        transfer_id: Binary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum GatewayQueryMsg {
    #[returns(DestinationSupportedResponse)]
    DestinationSupported { protocol: Protocol, destination: u64 },
}

#[cw_serde]
pub struct DestinationSupportedResponse {
    pub supported: bool,
}

/// Wrap a gateway call as a wasm execute message without funds.
pub fn gateway_msg(gateway: &Addr, msg: &GatewayExecuteMsg) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: gateway.to_string(),
        msg: to_json_binary(msg)?,
        funds: vec![],
    }))
}
