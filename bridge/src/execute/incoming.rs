//! Inbound deliveries and their settlement.
//!
//! Every backend entry point funnels into [`execute_receive`]: authenticate
//! with the backend, check the trusted remote, consume the replay keys, then
//! mint through the gateway. Undeliverable messages are recorded rather than
//! rejected so the replay keys stay consumed.

use cosmwasm_std::{
    Addr, Binary, DepsMut, Env, Event, MessageInfo, Reply, Response, SubMsg, SubMsgResult,
};

use super::id_hex;
use crate::backends::{Delivery, VerifiedMessage};
use crate::codec::TransferPayload;
use crate::error::ContractError;
use crate::state::{
    ensure_admin, is_entered, BridgeTransfer, Direction, FailedMessage, TransferStatus, BACKEND,
    BLACKLIST, CONFIG, DESTINATIONS, ENTERED, FAILED_MESSAGES, MINT_REPLY_ID, NATIVE_INDEX,
    PENDING_MINT, PROCESSED_NONCES, PROCESSED_TRANSFERS, STATS, TRANSFERS,
};
use common::gateway::{gateway_msg, GatewayExecuteMsg};
use common::keccak256;

pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    delivery: Delivery,
) -> Result<Response, ContractError> {
    if is_entered(deps.as_ref())? {
        return Err(ContractError::Reentrancy);
    }
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::ModulePaused);
    }

    let backend_config = BACKEND.load(deps.storage)?;
    let backend = backend_config.backend();
    let verified = backend.authenticate(deps.as_ref(), &env, &info, delivery)?;

    let source_chain = NATIVE_INDEX
        .may_load(deps.storage, &verified.origin)?
        .ok_or_else(|| ContractError::UnknownSource {
            origin: verified.origin.clone(),
        })?;
    let source = DESTINATIONS.load(deps.storage, source_chain)?;
    if source.trusted_remote.as_ref() != Some(&verified.sender) {
        return Err(ContractError::UntrustedRemote {
            origin: verified.origin,
        });
    }

    if let Some(nonce) = verified.replay_key {
        let key = (verified.origin.as_str(), nonce);
        if PROCESSED_NONCES.has(deps.storage, key) {
            return Err(ContractError::NonceAlreadyProcessed {
                origin: verified.origin.clone(),
                nonce,
            });
        }
        PROCESSED_NONCES.save(deps.storage, key, &true)?;
    }

    let payload = match backend.decode_payload(&verified.payload) {
        Ok(payload) => payload,
        Err(err) => {
            return record_failed_message(deps, &env, source_chain, verified, err.to_string())
        }
    };

    let transfer_id = payload.transfer_id;
    if PROCESSED_TRANSFERS.has(deps.storage, transfer_id.as_slice()) {
        return Err(ContractError::AlreadyProcessed {
            transfer_id: id_hex(&transfer_id),
        });
    }
    PROCESSED_TRANSFERS.save(deps.storage, transfer_id.as_slice(), &true)?;

    let transfer = BridgeTransfer {
        id: Binary::from(transfer_id.to_vec()),
        sender: Binary::from(payload.sender.clone()),
        recipient: Binary::from(payload.recipient.clone()),
        amount: payload.amount,
        source_chain,
        destination_chain: config.this_chain_id,
        protocol: config.protocol,
        status: TransferStatus::Pending,
        direction: Direction::Inbound,
        created_at: env.block.time,
        updated_at: env.block.time,
        failure_reason: None,
    };

    let Some(recipient) = local_recipient(&deps, &payload) else {
        return settle_failed(deps, &env, transfer, "recipient is not a valid address");
    };
    if BLACKLIST.has(deps.storage, &recipient) {
        return settle_failed(deps, &env, transfer, "recipient is blacklisted");
    }

    TRANSFERS.save(deps.storage, transfer_id.as_slice(), &transfer)?;
    PENDING_MINT.save(deps.storage, &transfer.id)?;
    ENTERED.save(deps.storage, &true)?;

    let mint = gateway_msg(
        &config.gateway,
        &GatewayExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount: payload.amount,
            transfer_id: transfer.id.clone(),
        },
    )?;

    Ok(Response::new()
        .add_submessage(SubMsg::reply_always(mint, MINT_REPLY_ID))
        .add_attribute("method", "receive")
        .add_attribute("protocol", config.protocol.as_str())
        .add_attribute("source_chain", source_chain.to_string())
        .add_attribute("transfer_id", id_hex(&transfer_id))
        .add_attribute("recipient", recipient)
        .add_attribute("amount", payload.amount.to_string()))
}

fn local_recipient(deps: &DepsMut, payload: &TransferPayload) -> Option<Addr> {
    let recipient = std::str::from_utf8(&payload.recipient).ok()?;
    deps.api.addr_validate(recipient).ok()
}

/// Settle the mint submessage started by [`execute_receive`].
pub fn reply_mint(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    ENTERED.save(deps.storage, &false)?;
    let id = PENDING_MINT.load(deps.storage)?;
    PENDING_MINT.remove(deps.storage);

    let mut transfer = TRANSFERS.load(deps.storage, id.as_slice())?;
    match msg.result {
        SubMsgResult::Ok(_) => {
            transfer.status = TransferStatus::Completed;
            transfer.updated_at = env.block.time;
            TRANSFERS.save(deps.storage, id.as_slice(), &transfer)?;

            let mut stats = STATS.load(deps.storage)?;
            stats.total_incoming += 1;
            stats.total_received += transfer.amount;
            STATS.save(deps.storage, &stats)?;

            Ok(Response::new()
                .add_event(
                    Event::new("transfer_completed")
                        .add_attribute("transfer_id", id_hex(&id))
                        .add_attribute("protocol", transfer.protocol.as_str())
                        .add_attribute("source_chain", transfer.source_chain.to_string())
                        .add_attribute("amount", transfer.amount.to_string()),
                )
                .add_attribute("method", "mint_complete"))
        }
        SubMsgResult::Err(err) => settle_failed(deps, &env, transfer, &err),
    }
}

/// Record `transfer` as failed. The transfer id stays processed.
fn settle_failed(
    deps: DepsMut,
    env: &Env,
    mut transfer: BridgeTransfer,
    reason: &str,
) -> Result<Response, ContractError> {
    transfer.status = TransferStatus::Failed;
    transfer.failure_reason = Some(reason.to_string());
    transfer.updated_at = env.block.time;
    TRANSFERS.save(deps.storage, transfer.id.as_slice(), &transfer)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_failed += 1;
    STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_event(
            Event::new("transfer_failed")
                .add_attribute("transfer_id", id_hex(&transfer.id))
                .add_attribute("protocol", transfer.protocol.as_str())
                .add_attribute("reason", reason),
        )
        .add_attribute("method", "transfer_failed"))
}

fn record_failed_message(
    deps: DepsMut,
    env: &Env,
    source_chain: u64,
    verified: VerifiedMessage,
    reason: String,
) -> Result<Response, ContractError> {
    let hash = keccak256(&verified.payload);
    let failed = FailedMessage {
        payload_hash: Binary::from(hash.to_vec()),
        source_chain,
        sender: verified.sender,
        payload: verified.payload,
        reason,
        failed_at: env.block.time,
    };
    FAILED_MESSAGES.save(deps.storage, hash.as_slice(), &failed)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_failed += 1;
    STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_event(
            Event::new("transfer_failed")
                .add_attribute("payload_hash", id_hex(&hash))
                .add_attribute("source_chain", source_chain.to_string())
                .add_attribute("reason", &failed.reason),
        )
        .add_attribute("method", "undecodable_message"))
}

/// Admin remediation: settle a pending transfer as failed.
pub fn execute_mark_failed(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    transfer_id: Binary,
    reason: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.as_ref(), &info.sender)?;

    let transfer = TRANSFERS
        .may_load(deps.storage, transfer_id.as_slice())?
        .ok_or_else(|| ContractError::TransferNotFound {
            transfer_id: id_hex(&transfer_id),
        })?;
    match transfer.status {
        TransferStatus::Completed => Err(ContractError::TransferCompleted {
            transfer_id: id_hex(&transfer_id),
        }),
        TransferStatus::Failed => {
            let mut transfer = transfer;
            transfer.failure_reason = Some(reason.clone());
            transfer.updated_at = env.block.time;
            TRANSFERS.save(deps.storage, transfer_id.as_slice(), &transfer)?;
            Ok(Response::new()
                .add_attribute("method", "mark_failed")
                .add_attribute("transfer_id", id_hex(&transfer_id))
                .add_attribute("reason", reason))
        }
        TransferStatus::Pending => {
            Ok(settle_failed(deps, &env, transfer, &reason)?.add_attribute("marked_by", info.sender))
        }
    }
}
