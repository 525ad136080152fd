//! Outbound transfers.

use cosmwasm_std::{
    coins, BankMsg, Binary, DepsMut, Env, Event, MessageInfo, Response, SubMsg, Uint128,
};

use crate::backends::Dispatch;
use crate::codec::TransferPayload;
use crate::error::ContractError;
use crate::fee::{split_fee, FEE_PARAMS};
use crate::state::{
    is_entered, BridgeTransfer, Direction, TransferStatus, BACKEND, BLACKLIST, CONFIG,
    DESTINATIONS, DISPATCH_REPLY_ID, ENTERED, MAX_RECIPIENT_LEN, OUTGOING_NONCE, STATS,
    TRANSFERS, WHITELIST,
};
use common::gateway::{
    gateway_msg, DestinationSupportedResponse, GatewayExecuteMsg, GatewayQueryMsg,
};
use common::module::RoutedTransfer;
use common::{bytes32_to_hex, compute_transfer_id};

fn validate_recipient(recipient: &Binary) -> Result<(), ContractError> {
    if recipient.is_empty() {
        return Err(ContractError::InvalidRecipient {
            reason: "recipient is empty".to_string(),
        });
    }
    if recipient.iter().all(|b| *b == 0) {
        return Err(ContractError::InvalidRecipient {
            reason: "recipient is the zero address".to_string(),
        });
    }
    if recipient.len() > MAX_RECIPIENT_LEN {
        return Err(ContractError::InvalidRecipient {
            reason: format!(
                "recipient has {} bytes, max {}",
                recipient.len(),
                MAX_RECIPIENT_LEN
            ),
        });
    }
    Ok(())
}

/// Burn, charge and dispatch a transfer to `destination`.
///
/// Routed calls come from the gateway, which has already admitted the
/// transfer; direct calls are admitted here through a gateway `Admit`
/// message that runs before the burn.
pub fn execute_initiate_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    destination: u64,
    recipient: Binary,
    amount: Uint128,
    routed: Option<RoutedTransfer>,
) -> Result<Response, ContractError> {
    if is_entered(deps.as_ref())? {
        return Err(ContractError::Reentrancy);
    }
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "amount must be greater than zero".to_string(),
        });
    }
    validate_recipient(&recipient)?;

    let config = CONFIG.load(deps.storage)?;
    let dest = DESTINATIONS
        .may_load(deps.storage, destination)?
        .filter(|d| d.enabled)
        .ok_or(ContractError::DestinationNotSupported {
            chain_id: destination,
        })?;
    let remote = dest
        .trusted_remote
        .clone()
        .ok_or(ContractError::NoTrustedRemote {
            chain_id: destination,
        })?;

    let nonce = OUTGOING_NONCE.may_load(deps.storage)?.unwrap_or(0);
    let is_direct = routed.is_none();
    let (sender, transfer_id) = match routed {
        Some(routed) => {
            if info.sender != config.gateway {
                return Err(ContractError::UnauthorizedRouter);
            }
            let sender = deps.api.addr_validate(&routed.sender)?;
            let transfer_id: [u8; 32] =
                routed.transfer_id.as_slice().try_into().map_err(|_| {
                    ContractError::InvalidTransferId {
                        len: routed.transfer_id.len(),
                    }
                })?;
            (sender, transfer_id)
        }
        None => {
            let transfer_id = compute_transfer_id(
                env.contract.address.as_bytes(),
                info.sender.as_bytes(),
                recipient.as_slice(),
                amount.u128(),
                env.block.time.seconds(),
                nonce,
            );
            (info.sender.clone(), transfer_id)
        }
    };

    if BLACKLIST.has(deps.storage, &sender) {
        return Err(ContractError::SenderBlacklisted {
            address: sender.to_string(),
        });
    }
    if config.paused && !WHITELIST.has(deps.storage, &sender) {
        return Err(ContractError::ModulePaused);
    }

    if is_direct {
        let res: DestinationSupportedResponse = deps.querier.query_wasm_smart(
            &config.gateway,
            &GatewayQueryMsg::DestinationSupported {
                protocol: config.protocol,
                destination,
            },
        )?;
        if !res.supported {
            return Err(ContractError::DestinationNotSupported {
                chain_id: destination,
            });
        }
    }

    if TRANSFERS.has(deps.storage, transfer_id.as_slice()) {
        return Err(ContractError::TransferExists {
            transfer_id: bytes32_to_hex(&transfer_id),
        });
    }
    OUTGOING_NONCE.save(deps.storage, &(nonce + 1))?;

    let fee_params = FEE_PARAMS.load(deps.storage)?;
    let (net_amount, fee) = split_fee(&fee_params, amount)?;

    let backend_config = BACKEND.load(deps.storage)?;
    let backend = backend_config.backend();
    let payload = TransferPayload {
        transfer_id,
        sender: sender.as_bytes().to_vec(),
        recipient: recipient.to_vec(),
        amount: net_amount,
    };
    let encoded = backend.encode_payload(&payload, &dest.native_id)?;
    let network_fee = backend.network_fee(&deps.querier, &dest.native_id, &encoded)?;

    // Network fee
    let mut paid = Uint128::zero();
    for coin in &info.funds {
        if coin.denom != config.fee_denom {
            return Err(ContractError::InvalidFunds {
                reason: format!("only {} is accepted, got {}", config.fee_denom, coin.denom),
            });
        }
        paid = paid.checked_add(coin.amount)?;
    }
    if paid < network_fee {
        return Err(ContractError::InsufficientNetworkFee {
            required: network_fee,
            provided: paid,
        });
    }
    let refund = paid - network_fee;

    let dispatch = backend.dispatch(Dispatch {
        native_id: &dest.native_id,
        remote: &remote,
        payload: Binary::from(encoded.clone()),
        fee: if network_fee.is_zero() {
            vec![]
        } else {
            coins(network_fee.u128(), &config.fee_denom)
        },
        nonce,
        refund_address: &sender,
        fee_collector: &config.fee_collector,
    })?;

    // Messages: [admit], burn, fee, dispatch, refund
    let mut res = Response::new();
    if is_direct {
        res = res.add_message(gateway_msg(
            &config.gateway,
            &GatewayExecuteMsg::Admit {
                sender: sender.to_string(),
                protocol: config.protocol,
                amount,
                transfer_id: Binary::from(transfer_id.to_vec()),
            },
        )?);
    }
    res = res.add_message(gateway_msg(
        &config.gateway,
        &GatewayExecuteMsg::BurnFrom {
            owner: sender.to_string(),
            amount: net_amount,
        },
    )?);
    if !fee.is_zero() {
        res = res.add_message(gateway_msg(
            &config.gateway,
            &GatewayExecuteMsg::CollectFee {
                owner: sender.to_string(),
                amount: fee,
                collector: config.fee_collector.to_string(),
            },
        )?);
    }
    if let Some(msg) = dispatch {
        ENTERED.save(deps.storage, &true)?;
        res = res.add_submessage(SubMsg::reply_on_success(msg, DISPATCH_REPLY_ID));
    }
    if !refund.is_zero() {
        res = res.add_message(BankMsg::Send {
            to_address: sender.to_string(),
            amount: coins(refund.u128(), &config.fee_denom),
        });
    }

    let transfer = BridgeTransfer {
        id: Binary::from(transfer_id.to_vec()),
        sender: Binary::from(sender.as_bytes()),
        recipient: recipient.clone(),
        amount: net_amount,
        source_chain: config.this_chain_id,
        destination_chain: destination,
        protocol: config.protocol,
        status: TransferStatus::Pending,
        direction: Direction::Outbound,
        created_at: env.block.time,
        updated_at: env.block.time,
        failure_reason: None,
    };
    TRANSFERS.save(deps.storage, transfer_id.as_slice(), &transfer)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_outgoing += 1;
    stats.total_sent += net_amount;
    stats.total_fees += fee;
    STATS.save(deps.storage, &stats)?;

    let id_hex = bytes32_to_hex(&transfer_id);
    Ok(res
        .add_event(
            Event::new("transfer_initiated")
                .add_attribute("transfer_id", &id_hex)
                .add_attribute("protocol", config.protocol.as_str())
                .add_attribute("sender", &sender)
                .add_attribute("recipient", hex::encode(recipient.as_slice()))
                .add_attribute("destination_chain", destination.to_string())
                .add_attribute("native_id", &dest.native_id)
                .add_attribute("amount", net_amount.to_string())
                .add_attribute("fee", fee.to_string())
                .add_attribute("nonce", nonce.to_string())
                .add_attribute("payload", hex::encode(&encoded)),
        )
        .add_attribute("method", "initiate_transfer")
        .add_attribute("transfer_id", id_hex)
        .add_attribute("routed", (!is_direct).to_string())
        .add_attribute("network_fee", network_fee.to_string())
        .add_attribute("refund", refund.to_string()))
}

/// Release the outbound guard once the backend accepted the message.
pub fn reply_dispatch(deps: DepsMut) -> Result<Response, ContractError> {
    ENTERED.save(deps.storage, &false)?;
    Ok(Response::new().add_attribute("method", "dispatch_complete"))
}
