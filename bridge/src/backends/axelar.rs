//! Axelar-style gateway backend
//!
//! Chains are addressed by name and remote contracts by their string
//! address. Chain names compare case-insensitively and are stored lowercase.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Api, Binary, CosmosMsg, Deps, Env, MessageInfo, QuerierWrapper,
    Uint128, WasmMsg,
};

use super::{
    ensure_caller, linear_fee, validate_addr, Backend, Delivery, Dispatch, VerifiedMessage,
};
use crate::codec::{decode_abi, encode_abi, TransferPayload};
use crate::error::ContractError;
use common::Protocol;

#[cw_serde]
pub struct AxelarConfig {
    pub gateway: Addr,
    /// Axelar name of this chain
    pub chain_name: String,
    /// Gas service payment: `base_fee + fee_per_byte * payload_len`
    pub base_fee: Uint128,
    pub fee_per_byte: Uint128,
}

#[cw_serde]
pub enum AxelarGatewayExecuteMsg {
    CallContract {
        destination_chain: String,
        destination_address: String,
        payload: Binary,
    },
}

fn remote_address(remote: &[u8]) -> Result<String, ContractError> {
    String::from_utf8(remote.to_vec()).map_err(|_| ContractError::InvalidRemote {
        reason: "Axelar remote address must be UTF-8".to_string(),
    })
}

impl Backend for AxelarConfig {
    fn protocol(&self) -> Protocol {
        Protocol::Axelar
    }

    fn validate(&self, api: &dyn Api) -> Result<(), ContractError> {
        validate_addr(api, &self.gateway, "gateway")?;
        if self.chain_name.trim().is_empty() {
            return Err(ContractError::InvalidBackendConfig {
                reason: "chain name is empty".to_string(),
            });
        }
        Ok(())
    }

    fn parse_native_id(&self, native_id: &str) -> Result<String, ContractError> {
        let name = native_id.trim().to_lowercase();
        if name.is_empty() {
            return Err(ContractError::InvalidNativeId {
                reason: "chain name is empty".to_string(),
            });
        }
        if name == self.chain_name.trim().to_lowercase() {
            return Err(ContractError::InvalidNativeId {
                reason: format!("chain {} is this chain", name),
            });
        }
        Ok(name)
    }

    fn validate_remote(&self, remote: &[u8]) -> Result<(), ContractError> {
        if remote_address(remote)?.trim().is_empty() {
            return Err(ContractError::InvalidRemote {
                reason: "address is empty".to_string(),
            });
        }
        Ok(())
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
        _querier: &QuerierWrapper,
        _native_id: &str,
        payload: &[u8],
    ) -> Result<Uint128, ContractError> {
        linear_fee(self.base_fee, self.fee_per_byte, payload.len())
    }

    fn dispatch(&self, msg: Dispatch) -> Result<Option<CosmosMsg>, ContractError> {
        Ok(Some(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: self.gateway.to_string(),
            msg: to_json_binary(&AxelarGatewayExecuteMsg::CallContract {
                destination_chain: msg.native_id.to_string(),
                destination_address: remote_address(msg.remote)?,
                payload: msg.payload,
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
        let Delivery::Axelar {
            source_chain,
            source_address,
            payload,
        } = delivery
        else {
            return Err(ContractError::WrongDelivery {
                protocol: self.protocol(),
            });
        };
        ensure_caller(info, &self.gateway, "Axelar gateway")?;

        Ok(VerifiedMessage {
            origin: source_chain.trim().to_lowercase(),
            sender: Binary::from(source_address.into_bytes()),
            payload,
            replay_key: None,
        })
    }
}
