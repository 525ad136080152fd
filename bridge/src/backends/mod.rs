//! Messaging backends
//!
//! A module instance is bound to one backend for its lifetime. Each backend
//! translates the uniform transfer (uniform chain id, recipient bytes, net
//! amount) into its own addressing, payload layout and fee model, and turns
//! an inbound delivery into a [`VerifiedMessage`] once the delivery has been
//! authenticated with the backend's own proof (endpoint caller, VAA,
//! validator signatures).

pub mod axelar;
pub mod hyperlane;
pub mod layerzero;
pub mod validator_set;
pub mod wormhole;

use std::str::FromStr;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    Addr, Api, Binary, Coin, CosmosMsg, Deps, Env, MessageInfo, QuerierWrapper, Uint128,
};

use crate::codec::TransferPayload;
use crate::error::ContractError;
use common::Protocol;

pub use axelar::AxelarConfig;
pub use hyperlane::HyperlaneConfig;
pub use layerzero::LayerZeroConfig;
pub use validator_set::{ValidatorSetConfig, ValidatorSignature};
pub use wormhole::WormholeConfig;

/// Backend selection and its endpoint configuration
#[cw_serde]
pub enum BackendConfig {
    LayerZero(LayerZeroConfig),
    Wormhole(WormholeConfig),
    Hyperlane(HyperlaneConfig),
    Axelar(AxelarConfig),
    ValidatorSet(ValidatorSetConfig),
}

impl BackendConfig {
    pub fn backend(&self) -> &dyn Backend {
        match self {
            BackendConfig::LayerZero(c) => c,
            BackendConfig::Wormhole(c) => c,
            BackendConfig::Hyperlane(c) => c,
            BackendConfig::Axelar(c) => c,
            BackendConfig::ValidatorSet(c) => c,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.backend().protocol()
    }
}

/// Outbound message handed to a backend after the burn has been scheduled
pub struct Dispatch<'a> {
    pub native_id: &'a str,
    pub remote: &'a Binary,
    pub payload: Binary,
    /// Network fee coins forwarded with the backend call
    pub fee: Vec<Coin>,
    pub nonce: u64,
    pub refund_address: &'a Addr,
    pub fee_collector: &'a Addr,
}

/// Inbound delivery as received by one of the module's entry points
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    LayerZero {
        src_eid: u32,
        sender: Binary,
        nonce: u64,
        message: Binary,
    },
    Hyperlane {
        origin: u32,
        sender: Binary,
        body: Binary,
    },
    Axelar {
        source_chain: String,
        source_address: String,
        payload: Binary,
    },
    Wormhole {
        vaa: Binary,
    },
    ValidatorSet {
        source_chain: u64,
        sender: Binary,
        payload: Binary,
        issued_at: u64,
        signatures: Vec<ValidatorSignature>,
    },
}

/// Authenticated inbound message, still undecoded
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedMessage {
    /// Canonical backend-native id of the source chain
    pub origin: String,
    /// Remote sender proven by the backend
    pub sender: Binary,
    pub payload: Binary,
    /// Per-source nonce or sequence, when the backend provides one
    pub replay_key: Option<u64>,
}

pub trait Backend {
    fn protocol(&self) -> Protocol;

    /// Check endpoint addresses and parameters.
    fn validate(&self, api: &dyn Api) -> Result<(), ContractError>;

    /// Parse a destination's native id, returning its canonical form.
    fn parse_native_id(&self, native_id: &str) -> Result<String, ContractError>;

    fn validate_remote(&self, remote: &[u8]) -> Result<(), ContractError>;

    fn encode_payload(
        &self,
        payload: &TransferPayload,
        native_id: &str,
    ) -> Result<Vec<u8>, ContractError>;

    fn decode_payload(&self, data: &[u8]) -> Result<TransferPayload, ContractError>;

    /// Native-coin cost of sending `payload` to `native_id`.
    fn network_fee(
        &self,
        querier: &QuerierWrapper,
        native_id: &str,
        payload: &[u8],
    ) -> Result<Uint128, ContractError>;

    /// Message handing the payload to the messaging layer, if the backend
    /// has an on-chain endpoint.
    fn dispatch(&self, msg: Dispatch) -> Result<Option<CosmosMsg>, ContractError>;

    fn authenticate(
        &self,
        deps: Deps,
        env: &Env,
        info: &MessageInfo,
        delivery: Delivery,
    ) -> Result<VerifiedMessage, ContractError>;
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn parse_numeric_id<T: FromStr + ToString + PartialEq>(
    native_id: &str,
    local: T,
    what: &str,
) -> Result<String, ContractError> {
    let id: T = native_id
        .trim()
        .parse()
        .map_err(|_| ContractError::InvalidNativeId {
            reason: format!("'{}' is not a valid {}", native_id, what),
        })?;
    if id == local {
        return Err(ContractError::InvalidNativeId {
            reason: format!("{} {} is this chain", what, native_id),
        });
    }
    Ok(id.to_string())
}

pub(crate) fn require_bytes32(remote: &[u8]) -> Result<(), ContractError> {
    if remote.len() != 32 {
        return Err(ContractError::InvalidRemote {
            reason: format!("expected 32 bytes, got {}", remote.len()),
        });
    }
    Ok(())
}

pub(crate) fn ensure_caller(
    info: &MessageInfo,
    expected: &Addr,
    name: &str,
) -> Result<(), ContractError> {
    if info.sender != *expected {
        return Err(ContractError::UnauthorizedEndpoint {
            expected: name.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_addr(api: &dyn Api, addr: &Addr, name: &str) -> Result<(), ContractError> {
    api.addr_validate(addr.as_str())
        .map_err(|e| ContractError::InvalidBackendConfig {
            reason: format!("{}: {}", name, e),
        })?;
    Ok(())
}

/// `base + per_byte * len`
pub(crate) fn linear_fee(
    base: Uint128,
    per_byte: Uint128,
    len: usize,
) -> Result<Uint128, ContractError> {
    Ok(base.checked_add(per_byte.checked_mul(Uint128::from(len as u128))?)?)
}
