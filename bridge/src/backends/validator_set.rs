//! Validator-set backend
//!
//! Off-chain validators watch outbound `transfer_initiated` events and sign
//! the message for the destination chain. A registered relayer submits the
//! message with the signatures; it is accepted once `threshold` distinct
//! validators have signed within the message timeout.
//!
//! # Signed digest
//! ```text
//! keccak256(
//!     "omnibridge.validator.v1"
//!     | source_chain (u64 BE) | destination_chain (u64 BE)
//!     | module_len (u32 BE) | module address
//!     | sender_len (u32 BE) | sender
//!     | issued_at (u64 BE)
//!     | keccak256(payload)
//! )
//! ```

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    coins, Api, BankMsg, Binary, CosmosMsg, Deps, Env, MessageInfo, QuerierWrapper, Uint128,
};

use super::{Backend, Delivery, Dispatch, VerifiedMessage};
use crate::codec::{decode_abi, encode_abi, TransferPayload};
use crate::error::ContractError;
use crate::state::{CONFIG, RELAYERS};
use common::{keccak256, Protocol};

/// Domain separator of the signed digest
pub const DIGEST_DOMAIN: &[u8] = b"omnibridge.validator.v1";

/// Seconds `issued_at` may run ahead of block time
pub const MAX_CLOCK_SKEW: u64 = 300;

#[cw_serde]
pub struct ValidatorSetConfig {
    /// secp256k1 public keys, compressed (33 bytes) or uncompressed (65 bytes)
    pub validators: Vec<Binary>,
    pub threshold: u32,
    /// Seconds after `issued_at` a signed message stays acceptable
    pub message_timeout: u64,
    /// Native fee forwarded to the fee collector to pay relayers
    pub relayer_fee: Uint128,
}

/// Signature by the validator at `index` in the configured set
#[cw_serde]
pub struct ValidatorSignature {
    pub index: u32,
    /// 64-byte (r, s) signature over the message digest
    pub signature: Binary,
}

/// Smallest accepted threshold for `n` validators: ceil(2n / 3)
pub fn min_threshold(n: usize) -> u32 {
    ((2 * n + 2) / 3) as u32
}

/// Digest validators sign for delivery to the module at `module`.
pub fn message_digest(
    source_chain: u64,
    destination_chain: u64,
    module: &str,
    sender: &[u8],
    issued_at: u64,
    payload: &[u8],
) -> [u8; 32] {
    let mut data = Vec::with_capacity(DIGEST_DOMAIN.len() + 64 + module.len() + sender.len());
    data.extend_from_slice(DIGEST_DOMAIN);
    data.extend_from_slice(&source_chain.to_be_bytes());
    data.extend_from_slice(&destination_chain.to_be_bytes());
    data.extend_from_slice(&(module.len() as u32).to_be_bytes());
    data.extend_from_slice(module.as_bytes());
    data.extend_from_slice(&(sender.len() as u32).to_be_bytes());
    data.extend_from_slice(sender);
    data.extend_from_slice(&issued_at.to_be_bytes());
    data.extend_from_slice(&keccak256(payload));
    keccak256(&data)
}

impl ValidatorSetConfig {
    /// Count distinct validators whose signature over `digest` verifies.
    /// Malformed or wrong signatures are ignored; unknown indices and
    /// repeated indices reject the whole submission.
    pub fn count_signatures(
        &self,
        api: &dyn Api,
        digest: &[u8; 32],
        signatures: &[ValidatorSignature],
    ) -> Result<u32, ContractError> {
        let mut seen = vec![false; self.validators.len()];
        let mut valid = 0u32;

        for sig in signatures {
            let index = sig.index as usize;
            let Some(pubkey) = self.validators.get(index) else {
                return Err(ContractError::UnknownValidator { index: sig.index });
            };
            if seen[index] {
                return Err(ContractError::DuplicateSignature { index: sig.index });
            }
            seen[index] = true;

            if api
                .secp256k1_verify(digest, sig.signature.as_slice(), pubkey.as_slice())
                .unwrap_or(false)
            {
                valid += 1;
            }
        }
        Ok(valid)
    }
}

impl Backend for ValidatorSetConfig {
    fn protocol(&self) -> Protocol {
        Protocol::ValidatorSet
    }

    fn validate(&self, _api: &dyn Api) -> Result<(), ContractError> {
        let n = self.validators.len();
        if n == 0 {
            return Err(ContractError::InvalidBackendConfig {
                reason: "validator set is empty".to_string(),
            });
        }
        for (i, key) in self.validators.iter().enumerate() {
            if key.len() != 33 && key.len() != 65 {
                return Err(ContractError::InvalidBackendConfig {
                    reason: format!("validator {} key has {} bytes", i, key.len()),
                });
            }
            if self.validators[..i].contains(key) {
                return Err(ContractError::InvalidBackendConfig {
                    reason: format!("validator {} is a duplicate", i),
                });
            }
        }
        let min = min_threshold(n);
        if self.threshold < min || self.threshold as usize > n {
            return Err(ContractError::InvalidBackendConfig {
                reason: format!(
                    "threshold {} outside [{}, {}] for {} validators",
                    self.threshold, min, n, n
                ),
            });
        }
        if self.message_timeout == 0 {
            return Err(ContractError::InvalidBackendConfig {
                reason: "message timeout must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn parse_native_id(&self, native_id: &str) -> Result<String, ContractError> {
        // native ids are uniform chain ids; this chain is rejected by SetRemote
        let id: u64 = native_id
            .trim()
            .parse()
            .map_err(|_| ContractError::InvalidNativeId {
                reason: format!("'{}' is not a valid chain id", native_id),
            })?;
        if id == 0 {
            return Err(ContractError::InvalidNativeId {
                reason: "chain id 0 is reserved".to_string(),
            });
        }
        Ok(id.to_string())
    }

    fn validate_remote(&self, remote: &[u8]) -> Result<(), ContractError> {
        if remote.is_empty() || remote.len() > 64 {
            return Err(ContractError::InvalidRemote {
                reason: format!("expected 1 to 64 bytes, got {}", remote.len()),
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
        _payload: &[u8],
    ) -> Result<Uint128, ContractError> {
        Ok(self.relayer_fee)
    }

    fn dispatch(&self, msg: Dispatch) -> Result<Option<CosmosMsg>, ContractError> {
        // no on-chain endpoint; relayers are paid through the fee collector
        let Some(fee) = msg.fee.into_iter().find(|c| !c.amount.is_zero()) else {
            return Ok(None);
        };
        Ok(Some(CosmosMsg::Bank(BankMsg::Send {
            to_address: msg.fee_collector.to_string(),
            amount: coins(fee.amount.u128(), fee.denom),
        })))
    }

    fn authenticate(
        &self,
        deps: Deps,
        env: &Env,
        info: &MessageInfo,
        delivery: Delivery,
    ) -> Result<VerifiedMessage, ContractError> {
        let Delivery::ValidatorSet {
            source_chain,
            sender,
            payload,
            issued_at,
            signatures,
        } = delivery
        else {
            return Err(ContractError::WrongDelivery {
                protocol: self.protocol(),
            });
        };

        if !RELAYERS.has(deps.storage, &info.sender) {
            return Err(ContractError::UnauthorizedRelayer);
        }
        let now = env.block.time.seconds();
        if issued_at > now.saturating_add(MAX_CLOCK_SKEW) {
            return Err(ContractError::MessageFromFuture {
                issued_at,
                block_time: now,
            });
        }
        if now > issued_at.saturating_add(self.message_timeout) {
            return Err(ContractError::MessageExpired {
                issued_at,
                timeout: self.message_timeout,
            });
        }

        let config = CONFIG.load(deps.storage)?;
        let digest = message_digest(
            source_chain,
            config.this_chain_id,
            env.contract.address.as_str(),
            sender.as_slice(),
            issued_at,
            payload.as_slice(),
        );
        let got = self.count_signatures(deps.api, &digest, &signatures)?;
        if got < self.threshold {
            return Err(ContractError::InsufficientSignatures {
                got,
                required: self.threshold,
            });
        }

        Ok(VerifiedMessage {
            origin: source_chain.to_string(),
            sender,
            payload,
            replay_key: None,
        })
    }
}
