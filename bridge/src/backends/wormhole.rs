//! Wormhole-style core bridge backend
//!
//! Outbound transfers are posted as core messages carrying the Wormhole
//! transfer payload; guardians observe and sign them off-chain. Inbound VAAs
//! can be submitted by anyone and are verified through the core bridge's
//! `VerifyVaa` query. (emitter chain, sequence) pairs are replay-protected.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{
    to_json_binary, Addr, Api, Binary, CosmosMsg, Deps, Env, MessageInfo, QuerierWrapper,
    Uint128, WasmMsg,
};

use super::{
    parse_numeric_id, require_bytes32, validate_addr, Backend, Delivery, Dispatch,
    VerifiedMessage,
};
use crate::codec::{decode_wormhole, encode_wormhole, TransferPayload};
use crate::error::ContractError;
use common::Protocol;

#[cw_serde]
pub struct WormholeConfig {
    pub core_bridge: Addr,
    /// Wormhole chain id of this chain
    pub chain_id: u16,
    /// Core bridge message fee
    pub message_fee: Uint128,
}

#[cw_serde]
pub enum WormholeExecuteMsg {
    PostMessage { message: Binary, nonce: u32 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum WormholeQueryMsg {
    #[returns(ParsedVaa)]
    VerifyVaa { vaa: Binary, block_time: u64 },
}

/// Body of a guardian-verified VAA
#[cw_serde]
pub struct ParsedVaa {
    pub emitter_chain: u16,
    pub emitter_address: Binary,
    pub sequence: u64,
    pub payload: Binary,
}

fn wormhole_chain(native_id: &str) -> Result<u16, ContractError> {
    native_id.parse().map_err(|_| ContractError::InvalidNativeId {
        reason: format!("'{}' is not a wormhole chain id", native_id),
    })
}

impl Backend for WormholeConfig {
    fn protocol(&self) -> Protocol {
        Protocol::Wormhole
    }

    fn validate(&self, api: &dyn Api) -> Result<(), ContractError> {
        validate_addr(api, &self.core_bridge, "core bridge")?;
        if self.chain_id == 0 {
            return Err(ContractError::InvalidBackendConfig {
                reason: "wormhole chain id 0 is reserved".to_string(),
            });
        }
        Ok(())
    }

    fn parse_native_id(&self, native_id: &str) -> Result<String, ContractError> {
        let canonical = parse_numeric_id::<u16>(native_id, self.chain_id, "wormhole chain id")?;
        if canonical == "0" {
            return Err(ContractError::InvalidNativeId {
                reason: "wormhole chain id 0 is reserved".to_string(),
            });
        }
        Ok(canonical)
    }

    fn validate_remote(&self, remote: &[u8]) -> Result<(), ContractError> {
        require_bytes32(remote)
    }

    fn encode_payload(
        &self,
        payload: &TransferPayload,
        native_id: &str,
    ) -> Result<Vec<u8>, ContractError> {
        encode_wormhole(payload, wormhole_chain(native_id)?)
    }

    fn decode_payload(&self, data: &[u8]) -> Result<TransferPayload, ContractError> {
        decode_wormhole(data, self.chain_id)
    }

    fn network_fee(
        &self,
        _querier: &QuerierWrapper,
        _native_id: &str,
        _payload: &[u8],
    ) -> Result<Uint128, ContractError> {
        Ok(self.message_fee)
    }

    fn dispatch(&self, msg: Dispatch) -> Result<Option<CosmosMsg>, ContractError> {
        Ok(Some(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: self.core_bridge.to_string(),
            msg: to_json_binary(&WormholeExecuteMsg::PostMessage {
                message: msg.payload,
                // core message nonces are 32-bit
                nonce: msg.nonce as u32,
            })?,
            funds: msg.fee,
        })))
    }

    fn authenticate(
        &self,
        deps: Deps,
        env: &Env,
        _info: &MessageInfo,
        delivery: Delivery,
    ) -> Result<VerifiedMessage, ContractError> {
        let Delivery::Wormhole { vaa } = delivery else {
            return Err(ContractError::WrongDelivery {
                protocol: self.protocol(),
            });
        };

        let parsed: ParsedVaa = deps
            .querier
            .query_wasm_smart(
                &self.core_bridge,
                &WormholeQueryMsg::VerifyVaa {
                    vaa,
                    block_time: env.block.time.seconds(),
                },
            )
            .map_err(|e| ContractError::InvalidVaa {
                reason: e.to_string(),
            })?;

        Ok(VerifiedMessage {
            origin: parsed.emitter_chain.to_string(),
            sender: parsed.emitter_address,
            payload: parsed.payload,
            replay_key: Some(parsed.sequence),
        })
    }
}
