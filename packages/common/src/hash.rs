//! Hash computation for transfer ids.
//!
//! # Transfer id layout (160 bytes hashed)
//! - Bytes 0-31:    keccak256(issuer)     contract that assigned the nonce
//! - Bytes 32-63:   keccak256(sender)
//! - Bytes 64-95:   keccak256(recipient)  destination-native recipient bytes
//! - Bytes 96-127:  amount (uint256, big-endian, left-padded)
//! - Bytes 128-143: timestamp seconds (uint128 slot, big-endian)
//! - Bytes 144-159: nonce (uint128 slot, big-endian)

use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute a transfer id unique per (issuer, nonce).
pub fn compute_transfer_id(
    issuer: &[u8],
    sender: &[u8],
    recipient: &[u8],
    amount: u128,
    timestamp: u64,
    nonce: u64,
) -> [u8; 32] {
    let mut data = [0u8; 160];

    data[0..32].copy_from_slice(&keccak256(issuer));
    data[32..64].copy_from_slice(&keccak256(sender));
    data[64..96].copy_from_slice(&keccak256(recipient));
    data[96 + 16..128].copy_from_slice(&amount.to_be_bytes());
    data[128 + 8..144].copy_from_slice(&timestamp.to_be_bytes());
    data[144 + 8..160].copy_from_slice(&nonce.to_be_bytes());

    keccak256(&data)
}

/// Convert bytes32 to hex string (with 0x prefix)
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse hex string (with or without 0x prefix) to bytes32
pub fn hex_to_bytes32(input: &str) -> Result<[u8; 32], &'static str> {
    let input = input.strip_prefix("0x").unwrap_or(input);
    if input.len() != 64 {
        return Err("invalid hex length, expected 64 characters");
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(input, &mut out).map_err(|_| "invalid hex character")?;
    Ok(out)
}
