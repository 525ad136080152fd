//! Router: protocol-selected outbound bridging.

use cosmwasm_std::{
    to_json_binary, Binary, DepsMut, Env, MessageInfo, Reply, Response, SubMsg, Uint128, WasmMsg,
};

use crate::error::ContractError;
use crate::registry::{is_destination_supported, load_active};
use crate::security::admit;
use crate::state::{CONFIG, ENTERED, ROUTER_NONCE, ROUTE_REPLY_ID, STATS};
use common::module::{ModuleExecuteMsg, RoutedTransfer};
use common::{bytes32_to_hex, compute_transfer_id, Protocol};

/// Route a transfer to the module registered for `protocol`.
///
/// The module call runs as a submessage; the re-entrancy guard stays set
/// until its reply.
pub fn execute_bridge(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    protocol: Protocol,
    destination: u64,
    recipient: Binary,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if ENTERED.may_load(deps.storage)?.unwrap_or(false) {
        return Err(ContractError::Reentrancy);
    }

    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "amount must be greater than zero".to_string(),
        });
    }
    if recipient.is_empty() {
        return Err(ContractError::InvalidRecipient {
            reason: "recipient is empty".to_string(),
        });
    }

    let config = CONFIG.load(deps.storage)?;
    let registration = load_active(deps.storage, protocol)?;
    if !is_destination_supported(deps.storage, protocol, destination)? {
        return Err(ContractError::DestinationNotSupported {
            protocol,
            destination,
        });
    }

    let nonce = ROUTER_NONCE.may_load(deps.storage)?.unwrap_or(0);
    ROUTER_NONCE.save(deps.storage, &(nonce + 1))?;

    let transfer_id = compute_transfer_id(
        env.contract.address.as_bytes(),
        info.sender.as_bytes(),
        recipient.as_slice(),
        amount.u128(),
        env.block.time.seconds(),
        nonce,
    );

    let anomaly = admit(
        deps.storage,
        &env,
        &config,
        &info.sender,
        protocol,
        amount,
        &transfer_id,
    )?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_routed += 1;
    stats.total_admitted += 1;
    if anomaly.is_some() {
        stats.anomalies_detected += 1;
    }
    STATS.save(deps.storage, &stats)?;

    ENTERED.save(deps.storage, &true)?;

    let dispatch = WasmMsg::Execute {
        contract_addr: registration.module.to_string(),
        msg: to_json_binary(&ModuleExecuteMsg::InitiateTransfer {
            destination,
            recipient,
            amount,
            routed: Some(RoutedTransfer {
                sender: info.sender.to_string(),
                transfer_id: Binary::from(transfer_id.to_vec()),
            }),
        })?,
        funds: info.funds,
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(dispatch, ROUTE_REPLY_ID))
        .add_events(anomaly)
        .add_attribute("method", "bridge")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("module", registration.module)
        .add_attribute("destination", destination.to_string())
        .add_attribute("sender", info.sender)
        .add_attribute("amount", amount.to_string())
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("transfer_id", bytes32_to_hex(&transfer_id)))
}

/// Release the router guard once the module call has completed.
pub fn reply_routed(deps: DepsMut, _msg: Reply) -> Result<Response, ContractError> {
    ENTERED.save(deps.storage, &false)?;
    Ok(Response::new().add_attribute("method", "bridge_routed"))
}
