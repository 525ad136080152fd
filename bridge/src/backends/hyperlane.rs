//! Hyperlane-style mailbox backend
//!
//! Payloads use the compact warp layout. The mailbox is the only caller
//! allowed to deliver `Handle`.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Api, Binary, CosmosMsg, Deps, Env, MessageInfo, QuerierWrapper,
    Uint128, WasmMsg,
};

use super::{
    ensure_caller, linear_fee, parse_numeric_id, require_bytes32, validate_addr, Backend,
    Delivery, Dispatch, VerifiedMessage,
};
use crate::codec::{decode_warp, encode_warp, TransferPayload};
use crate::error::ContractError;
use common::Protocol;

#[cw_serde]
pub struct HyperlaneConfig {
    pub mailbox: Addr,
    /// Domain of this chain
    pub local_domain: u32,
    /// Interchain gas payment: `base_fee + fee_per_byte * body_len`
    pub base_fee: Uint128,
    pub fee_per_byte: Uint128,
}

#[cw_serde]
pub enum MailboxExecuteMsg {
    Dispatch {
        dest_domain: u32,
        recipient_addr: Binary,
        msg_body: Binary,
    },
}

impl Backend for HyperlaneConfig {
    fn protocol(&self) -> Protocol {
        Protocol::Hyperlane
    }

    fn validate(&self, api: &dyn Api) -> Result<(), ContractError> {
        validate_addr(api, &self.mailbox, "mailbox")
    }

    fn parse_native_id(&self, native_id: &str) -> Result<String, ContractError> {
        parse_numeric_id::<u32>(native_id, self.local_domain, "domain")
    }

    fn validate_remote(&self, remote: &[u8]) -> Result<(), ContractError> {
        require_bytes32(remote)
    }

    fn encode_payload(
        &self,
        payload: &TransferPayload,
        _native_id: &str,
    ) -> Result<Vec<u8>, ContractError> {
        encode_warp(payload)
    }

    fn decode_payload(&self, data: &[u8]) -> Result<TransferPayload, ContractError> {
        decode_warp(data)
    }

    fn network_fee(
        &self,
        _querier: &QuerierWrapper,
        _native_id: &str,
        payload: &[u8],
    ) -> Result<Uint128, ContractError> {
        linear_fee(self.base_fee, self.fee_per_byte, payload.len())
    }

    fn dispatch(&self, msg: Dispatch) -> Result<Option<CosmosMsg>, ContractError> {
        let dest_domain = msg
            .native_id
            .parse()
            .map_err(|_| ContractError::InvalidNativeId {
                reason: format!("'{}' is not a domain", msg.native_id),
            })?;
        Ok(Some(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: self.mailbox.to_string(),
            msg: to_json_binary(&MailboxExecuteMsg::Dispatch {
                dest_domain,
                recipient_addr: msg.remote.clone(),
                msg_body: msg.payload,
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
        let Delivery::Hyperlane {
            origin,
            sender,
            body,
        } = delivery
        else {
            return Err(ContractError::WrongDelivery {
                protocol: self.protocol(),
            });
        };
        ensure_caller(info, &self.mailbox, "Hyperlane mailbox")?;

        Ok(VerifiedMessage {
            origin: origin.to_string(),
            sender,
            payload: body,
            replay_key: None,
        })
    }
}
