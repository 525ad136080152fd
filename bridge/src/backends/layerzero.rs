//! LayerZero-style endpoint backend
//!
//! Outbound messages go through the endpoint's `Send`, which charges the fee
//! returned by its `EstimateFee` query. The endpoint calls back `LzReceive`
//! with the source endpoint id, sender and a per-path nonce.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{
    to_json_binary, Addr, Api, Binary, CosmosMsg, Deps, Env, MessageInfo, QuerierWrapper,
    Uint128, WasmMsg,
};

use super::{
    ensure_caller, parse_numeric_id, require_bytes32, validate_addr, Backend, Delivery, Dispatch,
    VerifiedMessage,
};
use crate::codec::{decode_abi, encode_abi, TransferPayload};
use crate::error::ContractError;
use common::Protocol;

#[cw_serde]
pub struct LayerZeroConfig {
    pub endpoint: Addr,
    /// Endpoint id of this chain
    pub local_eid: u32,
}

#[cw_serde]
pub enum LzEndpointExecuteMsg {
    Send {
        dst_eid: u32,
        receiver: Binary,
        message: Binary,
        refund_address: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum LzEndpointQueryMsg {
    #[returns(LzFeeResponse)]
    EstimateFee { dst_eid: u32, message: Binary },
}

#[cw_serde]
pub struct LzFeeResponse {
    pub native_fee: Uint128,
}

fn eid(native_id: &str) -> Result<u32, ContractError> {
    native_id.parse().map_err(|_| ContractError::InvalidNativeId {
        reason: format!("'{}' is not an endpoint id", native_id),
    })
}

impl Backend for LayerZeroConfig {
    fn protocol(&self) -> Protocol {
        Protocol::LayerZero
    }

    fn validate(&self, api: &dyn Api) -> Result<(), ContractError> {
        validate_addr(api, &self.endpoint, "endpoint")
    }

    fn parse_native_id(&self, native_id: &str) -> Result<String, ContractError> {
        parse_numeric_id::<u32>(native_id, self.local_eid, "endpoint id")
    }

    fn validate_remote(&self, remote: &[u8]) -> Result<(), ContractError> {
        require_bytes32(remote)
    }

    fn encode_payload(
        &self,
        payload: &TransferPayload,
        _native_id: &str,
    ) -> Result<Vec<u8>, ContractError> {
        Ok(encode_abi(payload))
    }

    fn decode_payload(&self, data: &[u8]) -> Result<TransferPayload, ContractError> {
        decode_abi(data)
    }

    fn network_fee(
        &self,
        querier: &QuerierWrapper,
        native_id: &str,
        payload: &[u8],
    ) -> Result<Uint128, ContractError> {
        let res: LzFeeResponse = querier.query_wasm_smart(
            &self.endpoint,
            &LzEndpointQueryMsg::EstimateFee {
                dst_eid: eid(native_id)?,
                message: Binary::from(payload),
            },
        )?;
        Ok(res.native_fee)
    }

    fn dispatch(&self, msg: Dispatch) -> Result<Option<CosmosMsg>, ContractError> {
        Ok(Some(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: self.endpoint.to_string(),
            msg: to_json_binary(&LzEndpointExecuteMsg::Send {
                dst_eid: eid(msg.native_id)?,
                receiver: msg.remote.clone(),
                message: msg.payload,
                refund_address: msg.refund_address.to_string(),
            })?,
            funds: msg.fee,
        })))
    }

    fn authenticate(
        &self,
        _deps: Deps,
        _env: &Env,
        info: &MessageInfo,
        delivery: Delivery,
    ) -> Result<VerifiedMessage, ContractError> {
        let Delivery::LayerZero {
            src_eid,
            sender,
            nonce,
            message,
        } = delivery
        else {
            return Err(ContractError::WrongDelivery {
                protocol: self.protocol(),
            });
        };
        ensure_caller(info, &self.endpoint, "LayerZero endpoint")?;

        Ok(VerifiedMessage {
            origin: src_eid.to_string(),
            sender,
            payload: message,
            replay_key: Some(nonce),
        })
    }
}
