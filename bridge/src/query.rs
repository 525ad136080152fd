//! Query handlers.

use cosmwasm_std::{Binary, Deps, Order, StdError, StdResult, Uint128};
use cw_storage_plus::Bound;

use crate::backends::BackendConfig;
use crate::codec::TransferPayload;
use crate::error::ContractError;
use crate::fee::{calculate_fee, FeeParams, FEE_PARAMS};
use crate::msg::{
    AccessListResponse, CalculateFeeResponse, ConfigResponse, DestinationsResponse,
    IsProcessedResponse, PendingAdminResponse, StatusResponse, TransfersResponse,
    ValidatorsResponse,
};
use crate::state::{
    BridgeTransfer, Destination, FailedMessage, BACKEND, BLACKLIST, CONFIG, DESTINATIONS,
    FAILED_MESSAGES, OUTGOING_NONCE, PENDING_ADMIN, PROCESSED_NONCES, PROCESSED_TRANSFERS,
    RELAYERS, STATS, TRANSFERS, WHITELIST,
};
use common::module::FeeQuoteResponse;

/// Default and max pagination limits
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

fn contract_err(err: ContractError) -> StdError {
    match err {
        ContractError::Std(e) => e,
        other => StdError::generic_err(other.to_string()),
    }
}

// ============================================================================
// Config & status
// ============================================================================

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        gateway: config.gateway,
        protocol: config.protocol,
        this_chain_id: config.this_chain_id,
        fee_denom: config.fee_denom,
        fee_collector: config.fee_collector,
    })
}

pub fn query_status(deps: Deps) -> StdResult<StatusResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(StatusResponse {
        paused: config.paused,
        outgoing_nonce: OUTGOING_NONCE.may_load(deps.storage)?.unwrap_or(0),
        stats: STATS.load(deps.storage)?,
    })
}

pub fn query_backend(deps: Deps) -> StdResult<BackendConfig> {
    BACKEND.load(deps.storage)
}

pub fn query_pending_admin(deps: Deps) -> StdResult<Option<PendingAdminResponse>> {
    Ok(PENDING_ADMIN
        .may_load(deps.storage)?
        .map(|p| PendingAdminResponse {
            new_address: p.new_address,
            execute_after: p.execute_after,
        }))
}

// ============================================================================
// Fees
// ============================================================================

pub fn query_fee_params(deps: Deps) -> StdResult<FeeParams> {
    FEE_PARAMS.load(deps.storage)
}

pub fn query_calculate_fee(deps: Deps, amount: Uint128) -> StdResult<CalculateFeeResponse> {
    let params = FEE_PARAMS.load(deps.storage)?;
    let fee = calculate_fee(&params, amount);
    Ok(CalculateFeeResponse {
        fee,
        net_amount: amount.saturating_sub(fee),
    })
}

/// Quote against a placeholder payload of typical size: a 32-byte recipient
/// and a 64-byte sender.
pub fn query_quote_fee(deps: Deps, destination: u64, amount: Uint128) -> StdResult<FeeQuoteResponse> {
    let config = CONFIG.load(deps.storage)?;
    let dest = DESTINATIONS
        .may_load(deps.storage, destination)?
        .filter(|d| d.enabled)
        .ok_or_else(|| {
            contract_err(ContractError::DestinationNotSupported {
                chain_id: destination,
            })
        })?;

    let params = FEE_PARAMS.load(deps.storage)?;
    let protocol_fee = calculate_fee(&params, amount);

    let backend_config = BACKEND.load(deps.storage)?;
    let backend = backend_config.backend();
    let placeholder = TransferPayload {
        transfer_id: [0u8; 32],
        sender: vec![1u8; 64],
        recipient: vec![1u8; 32],
        amount: amount.saturating_sub(protocol_fee),
    };
    let encoded = backend
        .encode_payload(&placeholder, &dest.native_id)
        .map_err(contract_err)?;
    let native_fee = backend
        .network_fee(&deps.querier, &dest.native_id, &encoded)
        .map_err(contract_err)?;

    Ok(FeeQuoteResponse {
        protocol: config.protocol,
        native_fee,
        native_denom: config.fee_denom,
        protocol_fee,
    })
}

// ============================================================================
// Transfers
// ============================================================================

pub fn query_transfer(deps: Deps, transfer_id: Binary) -> StdResult<Option<BridgeTransfer>> {
    TRANSFERS.may_load(deps.storage, transfer_id.as_slice())
}

pub fn query_transfers(
    deps: Deps,
    start_after: Option<Binary>,
    limit: Option<u32>,
) -> StdResult<TransfersResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_ref().map(|id| Bound::exclusive(id.as_slice()));

    let transfers = TRANSFERS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, t)| t))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(TransfersResponse { transfers })
}

pub fn query_is_processed(deps: Deps, transfer_id: Binary) -> StdResult<IsProcessedResponse> {
    Ok(IsProcessedResponse {
        processed: PROCESSED_TRANSFERS.has(deps.storage, transfer_id.as_slice()),
    })
}

pub fn query_is_nonce_processed(
    deps: Deps,
    source: String,
    nonce: u64,
) -> StdResult<IsProcessedResponse> {
    Ok(IsProcessedResponse {
        processed: PROCESSED_NONCES.has(deps.storage, (source.as_str(), nonce)),
    })
}

pub fn query_failed_message(deps: Deps, payload_hash: Binary) -> StdResult<Option<FailedMessage>> {
    FAILED_MESSAGES.may_load(deps.storage, payload_hash.as_slice())
}

// ============================================================================
// Destinations
// ============================================================================

pub fn query_destination(deps: Deps, chain_id: u64) -> StdResult<Option<Destination>> {
    DESTINATIONS.may_load(deps.storage, chain_id)
}

pub fn query_destinations(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<DestinationsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let destinations = DESTINATIONS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, d)| d))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(DestinationsResponse { destinations })
}

// ============================================================================
// Access
// ============================================================================

pub fn query_access_list(deps: Deps, address: String) -> StdResult<AccessListResponse> {
    let address = deps.api.addr_validate(&address)?;
    Ok(AccessListResponse {
        whitelisted: WHITELIST.has(deps.storage, &address),
        blacklisted: BLACKLIST.has(deps.storage, &address),
        relayer: RELAYERS.has(deps.storage, &address),
    })
}

pub fn query_validators(deps: Deps) -> StdResult<ValidatorsResponse> {
    match BACKEND.load(deps.storage)? {
        BackendConfig::ValidatorSet(set) => Ok(ValidatorsResponse {
            validators: set.validators,
            threshold: set.threshold,
            message_timeout: set.message_timeout,
        }),
        other => Err(StdError::generic_err(format!(
            "{} backend has no validator set",
            other.protocol()
        ))),
    }
}
