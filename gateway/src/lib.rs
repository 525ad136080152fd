//! Omnibridge Gateway - Protocol Router and Token Ledger
//!
//! One gateway instance fronts a single bridged cw20 token and any number of
//! protocol-specific bridge modules (LayerZero, Wormhole, Hyperlane, Axelar,
//! validator set).
//!
//! # Outbound Flow (Routed)
//! 1. User approves the gateway as cw20 spender
//! 2. User calls `Bridge` naming a protocol and destination
//! 3. Registry and destination checks, then security admission
//! 4. The registered module is called with the admitted transfer id
//! 5. The module asks the gateway to burn, collect its fee and dispatches
//!
//! # Inbound Flow
//! A module authenticates a delivery with its messaging protocol and asks the
//! gateway to `Mint` to the recipient.
//!
//! # Security
//! - Layered pauses (emergency, manager, per protocol)
//! - Per-protocol, per-user and global 24h volume windows
//! - Transaction ceilings and per-user cooldowns
//! - Anomaly detection feeding a suspicious-activity counter
//! - Re-entrancy guard across the module dispatch

pub mod contract;
pub mod error;
mod execute;
pub mod fee_manager;
pub mod msg;
mod query;
pub mod registry;
pub mod security;
pub mod state;

pub use crate::error::ContractError;
pub use crate::fee_manager::FEE_UNAVAILABLE;
pub use crate::security::SUSPICIOUS_ACTIVITY_CEILING;
