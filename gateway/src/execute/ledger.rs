//! Module-facing ledger handlers.
//!
//! The gateway is the token's only minter and the spender users approve, so
//! every supply change goes through here on behalf of a registered module.

use cosmwasm_std::{
    to_json_binary, Binary, CosmosMsg, DepsMut, Env, MessageInfo, Response, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;

use super::parse_transfer_id;
use crate::error::ContractError;
use crate::registry::{ensure_active_module, module_protocol};
use crate::security::admit;
use crate::state::{CONFIG, MINTED, STATS};
use common::{bytes32_to_hex, Protocol};

fn token_msg(token: &str, msg: &Cw20ExecuteMsg) -> Result<CosmosMsg, ContractError> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(msg)?,
        funds: vec![],
    }))
}

/// Security admission requested by the module registered for `protocol`.
pub fn execute_admit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    sender: String,
    protocol: Protocol,
    amount: Uint128,
    transfer_id: Binary,
) -> Result<Response, ContractError> {
    ensure_active_module(deps.storage, &info.sender, protocol)?;
    let sender = deps.api.addr_validate(&sender)?;
    let transfer_id = parse_transfer_id(&transfer_id)?;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "amount must be greater than zero".to_string(),
        });
    }

    let config = CONFIG.load(deps.storage)?;
    let anomaly = admit(
        deps.storage,
        &env,
        &config,
        &sender,
        protocol,
        amount,
        &transfer_id,
    )?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_admitted += 1;
    if anomaly.is_some() {
        stats.anomalies_detected += 1;
    }
    STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_events(anomaly)
        .add_attribute("method", "admit")
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("sender", sender)
        .add_attribute("amount", amount.to_string())
        .add_attribute("transfer_id", bytes32_to_hex(&transfer_id)))
}

pub fn execute_burn_from(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let registration = module_protocol(deps.storage, &info.sender)?;
    ensure_active_module(deps.storage, &info.sender, registration.protocol)?;
    let owner = deps.api.addr_validate(&owner)?;

    let config = CONFIG.load(deps.storage)?;
    let mut stats = STATS.load(deps.storage)?;
    stats.total_burned += amount;
    STATS.save(deps.storage, &stats)?;

    let msg = token_msg(
        config.token.as_str(),
        &Cw20ExecuteMsg::BurnFrom {
            owner: owner.to_string(),
            amount,
        },
    )?;

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "burn_from")
        .add_attribute("protocol", registration.protocol.as_str())
        .add_attribute("owner", owner)
        .add_attribute("amount", amount.to_string()))
}

pub fn execute_collect_fee(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
    amount: Uint128,
    collector: String,
) -> Result<Response, ContractError> {
    let registration = module_protocol(deps.storage, &info.sender)?;
    ensure_active_module(deps.storage, &info.sender, registration.protocol)?;
    let owner = deps.api.addr_validate(&owner)?;
    let collector = deps.api.addr_validate(&collector)?;

    let config = CONFIG.load(deps.storage)?;
    let mut stats = STATS.load(deps.storage)?;
    stats.total_fees_collected += amount;
    STATS.save(deps.storage, &stats)?;

    let msg = token_msg(
        config.token.as_str(),
        &Cw20ExecuteMsg::TransferFrom {
            owner: owner.to_string(),
            recipient: collector.to_string(),
            amount,
        },
    )?;

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "collect_fee")
        .add_attribute("protocol", registration.protocol.as_str())
        .add_attribute("owner", owner)
        .add_attribute("collector", collector)
        .add_attribute("amount", amount.to_string()))
}

/// Mint on delivery. Allowed for any registered module, including inactive
/// or deprecated ones, so deliveries already in flight still settle.
/// Each (protocol, transfer id) mints once, across module replacements.
pub fn execute_mint(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
    transfer_id: Binary,
) -> Result<Response, ContractError> {
    let registration = module_protocol(deps.storage, &info.sender)?;
    if registration.module != info.sender {
        return Err(ContractError::ModuleMismatch {
            protocol: registration.protocol,
        });
    }
    let recipient = deps.api.addr_validate(&recipient)?;
    let transfer_id = parse_transfer_id(&transfer_id)?;

    let key = (registration.protocol.as_str(), transfer_id.as_slice());
    if MINTED.has(deps.storage, key) {
        return Err(ContractError::AlreadyMinted {
            protocol: registration.protocol,
            transfer_id: bytes32_to_hex(&transfer_id),
        });
    }
    MINTED.save(deps.storage, key, &true)?;

    let config = CONFIG.load(deps.storage)?;
    let mut stats = STATS.load(deps.storage)?;
    stats.total_minted += amount;
    STATS.save(deps.storage, &stats)?;

    let msg = token_msg(
        config.token.as_str(),
        &Cw20ExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount,
        },
    )?;

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "mint")
        .add_attribute("protocol", registration.protocol.as_str())
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount.to_string())
        .add_attribute("transfer_id", bytes32_to_hex(&transfer_id)))
}
