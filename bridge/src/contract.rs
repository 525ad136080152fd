//! Omnibridge Bridge Module - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers
//! - `backends/` - per-protocol addressing, payloads, fees and authentication

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response,
    StdError, StdResult,
};
use cw2::set_contract_version;

use crate::backends::Delivery;
use crate::error::ContractError;
use crate::execute::{
    execute_accept_admin, execute_add_relayer, execute_cancel_admin_proposal,
    execute_initiate_transfer, execute_mark_failed, execute_pause, execute_propose_admin,
    execute_receive, execute_remove_relayer, execute_remove_remote, execute_set_blacklisted,
    execute_set_destination_enabled, execute_set_fee_collector, execute_set_fee_params,
    execute_set_remote, execute_set_whitelisted, execute_unpause, execute_update_config,
    execute_update_validators, reply_dispatch, reply_mint,
};
use crate::fee::FEE_PARAMS;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_access_list, query_backend, query_calculate_fee, query_config, query_destination,
    query_destinations, query_failed_message, query_fee_params, query_is_nonce_processed,
    query_is_processed, query_pending_admin, query_quote_fee, query_status, query_transfer,
    query_transfers, query_validators,
};
use crate::state::{
    Config, Stats, BACKEND, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, DISPATCH_REPLY_ID, ENTERED,
    MINT_REPLY_ID, OUTGOING_NONCE, STATS,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    let gateway = deps.api.addr_validate(&msg.gateway)?;
    let fee_collector = deps.api.addr_validate(&msg.fee_collector)?;
    if msg.fee_denom.trim().is_empty() {
        return Err(ContractError::InvalidBackendConfig {
            reason: "fee denom is empty".to_string(),
        });
    }
    msg.fee_params.validate()?;
    msg.backend.backend().validate(deps.api)?;

    let protocol = msg.backend.protocol();
    let config = Config {
        admin: admin.clone(),
        gateway: gateway.clone(),
        protocol,
        this_chain_id: msg.this_chain_id,
        fee_denom: msg.fee_denom,
        fee_collector,
        paused: false,
    };
    CONFIG.save(deps.storage, &config)?;
    BACKEND.save(deps.storage, &msg.backend)?;
    FEE_PARAMS.save(deps.storage, &msg.fee_params)?;
    STATS.save(deps.storage, &Stats::default())?;
    OUTGOING_NONCE.save(deps.storage, &0u64)?;
    ENTERED.save(deps.storage, &false)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("gateway", gateway)
        .add_attribute("protocol", protocol.as_str())
        .add_attribute("this_chain_id", msg.this_chain_id.to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Outbound
        ExecuteMsg::InitiateTransfer {
            destination,
            recipient,
            amount,
            routed,
        } => execute_initiate_transfer(deps, env, info, destination, recipient, amount, routed),

        // Inbound
        ExecuteMsg::LzReceive {
            src_eid,
            sender,
            nonce,
            message,
        } => execute_receive(
            deps,
            env,
            info,
            Delivery::LayerZero {
                src_eid,
                sender,
                nonce,
                message,
            },
        ),
        ExecuteMsg::Handle {
            origin,
            sender,
            body,
        } => execute_receive(
            deps,
            env,
            info,
            Delivery::Hyperlane {
                origin,
                sender,
                body,
            },
        ),
        ExecuteMsg::Execute {
            source_chain,
            source_address,
            payload,
        } => execute_receive(
            deps,
            env,
            info,
            Delivery::Axelar {
                source_chain,
                source_address,
                payload,
            },
        ),
        ExecuteMsg::SubmitVaa { vaa } => {
            execute_receive(deps, env, info, Delivery::Wormhole { vaa })
        }
        ExecuteMsg::SubmitSigned {
            source_chain,
            sender,
            payload,
            issued_at,
            signatures,
        } => execute_receive(
            deps,
            env,
            info,
            Delivery::ValidatorSet {
                source_chain,
                sender,
                payload,
                issued_at,
                signatures,
            },
        ),

        // Configuration
        ExecuteMsg::SetRemote {
            chain_id,
            native_id,
            remote,
        } => execute_set_remote(deps, info, chain_id, native_id, remote),
        ExecuteMsg::RemoveRemote { chain_id } => execute_remove_remote(deps, info, chain_id),
        ExecuteMsg::SetDestinationEnabled { chain_id, enabled } => {
            execute_set_destination_enabled(deps, info, chain_id, enabled)
        }
        ExecuteMsg::SetFeeParams {
            fee_bps,
            min_fee,
            max_fee,
        } => execute_set_fee_params(deps, info, fee_bps, min_fee, max_fee),
        ExecuteMsg::SetFeeCollector { collector } => {
            execute_set_fee_collector(deps, info, collector)
        }
        ExecuteMsg::SetWhitelisted {
            address,
            whitelisted,
        } => execute_set_whitelisted(deps, info, address, whitelisted),
        ExecuteMsg::SetBlacklisted {
            address,
            blacklisted,
        } => execute_set_blacklisted(deps, info, address, blacklisted),
        ExecuteMsg::AddRelayer { relayer } => execute_add_relayer(deps, info, relayer),
        ExecuteMsg::RemoveRelayer { relayer } => execute_remove_relayer(deps, info, relayer),
        ExecuteMsg::UpdateConfig { backend } => execute_update_config(deps, info, backend),
        ExecuteMsg::UpdateValidators {
            validators,
            threshold,
        } => execute_update_validators(deps, info, validators, threshold),
        ExecuteMsg::Pause {} => execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute_unpause(deps, info),
        ExecuteMsg::MarkFailed {
            transfer_id,
            reason,
        } => execute_mark_failed(deps, env, info, transfer_id, reason),

        // Admin
        ExecuteMsg::ProposeAdmin { new_admin } => execute_propose_admin(deps, env, info, new_admin),
        ExecuteMsg::AcceptAdmin {} => execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => execute_cancel_admin_proposal(deps, info),
    }
}

// ============================================================================
// Reply
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        DISPATCH_REPLY_ID => reply_dispatch(deps),
        MINT_REPLY_ID => reply_mint(deps, env, msg),
        id => Err(StdError::generic_err(format!("unknown reply id: {}", id)).into()),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Status {} => to_json_binary(&query_status(deps)?),
        QueryMsg::Backend {} => to_json_binary(&query_backend(deps)?),
        QueryMsg::PendingAdmin {} => to_json_binary(&query_pending_admin(deps)?),

        // Fees
        QueryMsg::FeeParams {} => to_json_binary(&query_fee_params(deps)?),
        QueryMsg::CalculateFee { amount } => to_json_binary(&query_calculate_fee(deps, amount)?),
        QueryMsg::QuoteFee {
            destination,
            amount,
        } => to_json_binary(&query_quote_fee(deps, destination, amount)?),

        // Transfers
        QueryMsg::Transfer { transfer_id } => to_json_binary(&query_transfer(deps, transfer_id)?),
        QueryMsg::Transfers { start_after, limit } => {
            to_json_binary(&query_transfers(deps, start_after, limit)?)
        }
        QueryMsg::IsProcessed { transfer_id } => {
            to_json_binary(&query_is_processed(deps, transfer_id)?)
        }
        QueryMsg::IsNonceProcessed { source, nonce } => {
            to_json_binary(&query_is_nonce_processed(deps, source, nonce)?)
        }
        QueryMsg::FailedMessage { payload_hash } => {
            to_json_binary(&query_failed_message(deps, payload_hash)?)
        }

        // Destinations
        QueryMsg::Destination { chain_id } => to_json_binary(&query_destination(deps, chain_id)?),
        QueryMsg::Destinations { start_after, limit } => {
            to_json_binary(&query_destinations(deps, start_after, limit)?)
        }

        // Access
        QueryMsg::AccessList { address } => to_json_binary(&query_access_list(deps, address)?),
        QueryMsg::Validators {} => to_json_binary(&query_validators(deps)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if ENTERED.may_load(deps.storage)?.is_none() {
        ENTERED.save(deps.storage, &false)?;
    }

    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
