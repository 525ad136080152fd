//! Security manager: admission control for outbound transfers.
//!
//! Admission runs every check before touching any counter, so a rejected
//! transfer leaves all windows unchanged. The anomaly heuristics run after
//! admission and only feed the suspicious-activity counter; once an address
//! exceeds [`SUSPICIOUS_ACTIVITY_CEILING`] its next admission fails until a
//! security admin clears it.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Env, Event, Storage, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;
use crate::state::Config;
use common::{bytes32_to_hex, Protocol};

/// Rolling window length for volume limits (24 hours)
pub const RATE_LIMIT_PERIOD: u64 = 86_400;

/// Suspicious-activity count above which an address is blocked
pub const SUSPICIOUS_ACTIVITY_CEILING: u32 = 3;

// ============================================================================
// Types
// ============================================================================

/// Per-protocol limits. A zero limit or period means unlimited.
#[cw_serde]
#[derive(Default)]
pub struct ProtocolConfig {
    pub paused: bool,
    /// Max volume per 24h window across all users
    pub daily_limit: Uint128,
    /// Max amount per single transfer
    pub transaction_limit: Uint128,
    /// Minimum seconds between two transfers of one user on this protocol
    pub cooldown_period: u64,
    /// Max volume per 24h window per user
    pub user_daily_limit: Uint128,
}

/// Volume window state
#[cw_serde]
pub struct RateLimitWindow {
    pub window_start: Timestamp,
    pub used: Uint128,
}

/// Anomaly heuristics. Zero disables the respective heuristic.
#[cw_serde]
#[derive(Default)]
pub struct AnomalyThresholds {
    /// Single-transfer amount above which the transfer is flagged
    pub volume_threshold: Uint128,
    /// Transfers per `time_window` above which the sender is flagged
    pub frequency_threshold: u32,
    /// Frequency window in seconds
    pub time_window: u64,
}

/// Per-address transfer count within the frequency window
#[cw_serde]
pub struct ActivityWindow {
    pub window_start: Timestamp,
    pub count: u32,
}

// ============================================================================
// Storage
// ============================================================================

pub const PROTOCOL_CONFIGS: Map<&str, ProtocolConfig> = Map::new("protocol_configs");
pub const PROTOCOL_WINDOWS: Map<&str, RateLimitWindow> = Map::new("protocol_windows");
pub const USER_WINDOWS: Map<(&Addr, &str), RateLimitWindow> = Map::new("user_windows");
pub const GLOBAL_WINDOW: Item<RateLimitWindow> = Item::new("global_window");
pub const LAST_TRANSFER: Map<(&Addr, &str), Timestamp> = Map::new("last_transfer");

pub const ANOMALY_THRESHOLDS: Item<AnomalyThresholds> = Item::new("anomaly_thresholds");
pub const ACTIVITY: Map<&Addr, ActivityWindow> = Map::new("activity");
pub const SUSPICIOUS_ACTIVITY: Map<&Addr, u32> = Map::new("suspicious_activity");

/// Blocked transfer ids
pub const BLOCKED_TRANSFERS: Map<&[u8], bool> = Map::new("blocked_transfers");

// ============================================================================
// Window helpers
// ============================================================================

/// The window as seen at `now`, reset if 24h have elapsed since it opened.
pub fn current_window(window: Option<RateLimitWindow>, now: Timestamp) -> RateLimitWindow {
    match window {
        Some(w)
            if now.seconds() < w.window_start.seconds().saturating_add(RATE_LIMIT_PERIOD) =>
        {
            w
        }
        _ => RateLimitWindow {
            window_start: now,
            used: Uint128::zero(),
        },
    }
}

fn charge(
    window: &RateLimitWindow,
    limit: Uint128,
    amount: Uint128,
    limit_type: &str,
) -> Result<RateLimitWindow, ContractError> {
    let used = window.used.checked_add(amount)?;
    if !limit.is_zero() && used > limit {
        return Err(ContractError::RateLimitExceeded {
            limit_type: limit_type.to_string(),
            limit,
            requested: amount,
        });
    }
    Ok(RateLimitWindow {
        window_start: window.window_start,
        used,
    })
}

pub fn suspicious_count(storage: &dyn Storage, address: &Addr) -> Result<u32, ContractError> {
    Ok(SUSPICIOUS_ACTIVITY.may_load(storage, address)?.unwrap_or(0))
}

/// Increment the suspicious-activity counter; returns the new count.
pub fn flag_suspicious(storage: &mut dyn Storage, address: &Addr) -> Result<u32, ContractError> {
    let count = suspicious_count(storage, address)?.saturating_add(1);
    SUSPICIOUS_ACTIVITY.save(storage, address, &count)?;
    Ok(count)
}

// ============================================================================
// Admission
// ============================================================================

/// Admit a transfer or reject it with the first failing check.
///
/// Returns an `anomaly_detected` event when a heuristic fired.
pub fn admit(
    storage: &mut dyn Storage,
    env: &Env,
    config: &Config,
    sender: &Addr,
    protocol: Protocol,
    amount: Uint128,
    transfer_id: &[u8; 32],
) -> Result<Option<Event>, ContractError> {
    let now = env.block.time;
    let key = protocol.as_str();

    if config.emergency_paused {
        return Err(ContractError::EmergencyPaused);
    }
    if config.paused {
        return Err(ContractError::GatewayPaused);
    }

    let limits = PROTOCOL_CONFIGS
        .may_load(storage, key)?
        .unwrap_or_default();
    if limits.paused {
        return Err(ContractError::ProtocolPaused { protocol });
    }

    if BLOCKED_TRANSFERS.has(storage, transfer_id.as_slice()) {
        return Err(ContractError::TransferBlocked {
            transfer_id: bytes32_to_hex(transfer_id),
        });
    }

    if suspicious_count(storage, sender)? > SUSPICIOUS_ACTIVITY_CEILING {
        return Err(ContractError::AddressBlocked {
            address: sender.to_string(),
        });
    }

    if !limits.transaction_limit.is_zero() && amount > limits.transaction_limit {
        return Err(ContractError::RateLimitExceeded {
            limit_type: "transaction".to_string(),
            limit: limits.transaction_limit,
            requested: amount,
        });
    }

    if limits.cooldown_period > 0 {
        if let Some(last) = LAST_TRANSFER.may_load(storage, (sender, key))? {
            let ready_at = last.seconds().saturating_add(limits.cooldown_period);
            if now.seconds() < ready_at {
                return Err(ContractError::CooldownActive {
                    remaining_seconds: ready_at - now.seconds(),
                });
            }
        }
    }

    let protocol_window = charge(
        &current_window(PROTOCOL_WINDOWS.may_load(storage, key)?, now),
        limits.daily_limit,
        amount,
        "protocol_daily",
    )?;
    let user_window = charge(
        &current_window(USER_WINDOWS.may_load(storage, (sender, key))?, now),
        limits.user_daily_limit,
        amount,
        "user_daily",
    )?;
    let global_window = charge(
        &current_window(GLOBAL_WINDOW.may_load(storage)?, now),
        config.global_daily_limit,
        amount,
        "global_daily",
    )?;

    PROTOCOL_WINDOWS.save(storage, key, &protocol_window)?;
    USER_WINDOWS.save(storage, (sender, key), &user_window)?;
    GLOBAL_WINDOW.save(storage, &global_window)?;
    LAST_TRANSFER.save(storage, (sender, key), &now)?;

    detect_anomaly(storage, now, sender, protocol, amount)
}

fn detect_anomaly(
    storage: &mut dyn Storage,
    now: Timestamp,
    sender: &Addr,
    protocol: Protocol,
    amount: Uint128,
) -> Result<Option<Event>, ContractError> {
    let thresholds = ANOMALY_THRESHOLDS.may_load(storage)?.unwrap_or_default();

    let mut activity = match ACTIVITY.may_load(storage, sender)? {
        Some(a)
            if now.seconds() < a.window_start.seconds().saturating_add(thresholds.time_window) =>
        {
            a
        }
        _ => ActivityWindow {
            window_start: now,
            count: 0,
        },
    };
    activity.count = activity.count.saturating_add(1);
    ACTIVITY.save(storage, sender, &activity)?;

    let kind = if !thresholds.volume_threshold.is_zero() && amount > thresholds.volume_threshold {
        "volume"
    } else if thresholds.frequency_threshold > 0
        && thresholds.time_window > 0
        && activity.count > thresholds.frequency_threshold
    {
        "frequency"
    } else {
        return Ok(None);
    };

    let count = flag_suspicious(storage, sender)?;
    Ok(Some(
        Event::new("anomaly_detected")
            .add_attribute("address", sender.to_string())
            .add_attribute("protocol", protocol.as_str())
            .add_attribute("kind", kind)
            .add_attribute("amount", amount.to_string())
            .add_attribute("transfers_in_window", activity.count.to_string())
            .add_attribute("suspicious_count", count.to_string())
            .add_attribute(
                "blocked",
                (count > SUSPICIOUS_ACTIVITY_CEILING).to_string(),
            ),
    ))
}
