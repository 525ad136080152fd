//! Omnibridge Bridge Module - One Messaging Protocol per Instance
//!
//! Each instance binds the gateway's bridged token to one cross-chain
//! messaging backend: a LayerZero-style endpoint, a Wormhole core bridge, a
//! Hyperlane mailbox, an Axelar gateway or a threshold-signing validator set.
//!
//! # Outbound Flow
//! 1. Sender approves the gateway for `amount` (net + protocol fee)
//! 2. `InitiateTransfer` directly, or routed by the gateway's `Bridge`
//! 3. Destination, trusted remote, blacklist and pause checks
//! 4. Direct calls are admitted by the gateway security manager
//! 5. Gateway burns the net amount and moves the fee to the collector
//! 6. The payload is dispatched through the backend with the network fee
//!
//! # Inbound Flow
//! 1. Backend-specific entry point authenticates the delivery
//! 2. Sender must be the trusted remote of the source chain
//! 3. Replay keys (nonce/sequence and transfer id) are consumed
//! 4. Gateway mints to the recipient; the outcome is recorded
//!
//! Mint failures and undecodable messages are recorded, never retried.

pub mod backends;
pub mod codec;
pub mod contract;
pub mod error;
mod execute;
pub mod fee;
pub mod msg;
mod query;
pub mod state;

pub use crate::error::ContractError;
