//! Transfer payload codecs
//!
//! Every backend carries the same four fields: transfer id, original sender,
//! recipient and net amount. Three wire layouts are used.
//!
//! ## ABI (LayerZero, Axelar, validator set)
//! `abi.encode(bytes32 transferId, bytes sender, bytes recipient, uint256 amount)`:
//! ```text
//! | transferId (32) | offset(sender) (32) | offset(recipient) (32) | amount (32) |
//! | len (32) | sender, zero-padded to 32 | len (32) | recipient, zero-padded to 32 |
//! ```
//!
//! ## Warp (Hyperlane)
//! ```text
//! | len (1) | recipient | amount (32) | transferId (32) | len (1) | sender |
//! ```
//!
//! ## Wormhole transfer (payload id 1)
//! ```text
//! | 0x01 | amount (32) | transferId (32) | toChain (2) | len (1) | to | len (1) | from |
//! ```

use cosmwasm_std::Uint128;

use crate::error::ContractError;

const WORD: usize = 32;

/// Wormhole payload id for a token transfer
pub const WORMHOLE_TRANSFER_ID: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayload {
    pub transfer_id: [u8; 32],
    pub sender: Vec<u8>,
    pub recipient: Vec<u8>,
    pub amount: Uint128,
}

fn invalid(reason: impl Into<String>) -> ContractError {
    ContractError::InvalidPayload {
        reason: reason.into(),
    }
}

fn u256_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn read_u256(bytes: &[u8]) -> Result<Uint128, ContractError> {
    if bytes.len() != WORD {
        return Err(invalid("truncated amount"));
    }
    if bytes[..16].iter().any(|b| *b != 0) {
        return Err(invalid("amount exceeds 128 bits"));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Ok(Uint128::new(u128::from_be_bytes(low)))
}

fn read_usize_word(bytes: &[u8]) -> Result<usize, ContractError> {
    let value = read_u256(bytes)?.u128();
    usize::try_from(value).map_err(|_| invalid("offset out of range"))
}

fn take<'a>(bytes: &'a [u8], start: usize, len: usize) -> Result<&'a [u8], ContractError> {
    let end = start.checked_add(len).ok_or_else(|| invalid("length overflow"))?;
    bytes.get(start..end).ok_or_else(|| invalid("truncated payload"))
}

fn short_len(bytes: &[u8], what: &str) -> Result<u8, ContractError> {
    u8::try_from(bytes.len()).map_err(|_| invalid(format!("{} longer than 255 bytes", what)))
}

fn transfer_id(bytes: &[u8]) -> [u8; 32] {
    let mut id = [0u8; 32];
    id.copy_from_slice(bytes);
    id
}

// ============================================================================
// ABI
// ============================================================================

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

pub fn encode_abi(payload: &TransferPayload) -> Vec<u8> {
    let sender_offset = 4 * WORD;
    let recipient_offset = sender_offset + WORD + padded_len(payload.sender.len());
    let total = recipient_offset + WORD + padded_len(payload.recipient.len());

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&payload.transfer_id);
    out.extend_from_slice(&u256_word(sender_offset as u128));
    out.extend_from_slice(&u256_word(recipient_offset as u128));
    out.extend_from_slice(&u256_word(payload.amount.u128()));
    for field in [&payload.sender, &payload.recipient] {
        out.extend_from_slice(&u256_word(field.len() as u128));
        out.extend_from_slice(field);
        out.resize(out.len() + padded_len(field.len()) - field.len(), 0);
    }
    out
}

fn abi_bytes(data: &[u8], offset_word: &[u8]) -> Result<Vec<u8>, ContractError> {
    let offset = read_usize_word(offset_word)?;
    let len = read_usize_word(take(data, offset, WORD)?)?;
    Ok(take(data, offset + WORD, len)?.to_vec())
}

pub fn decode_abi(data: &[u8]) -> Result<TransferPayload, ContractError> {
    let head = take(data, 0, 4 * WORD)?;
    Ok(TransferPayload {
        transfer_id: transfer_id(&head[..WORD]),
        sender: abi_bytes(data, &head[WORD..2 * WORD])?,
        recipient: abi_bytes(data, &head[2 * WORD..3 * WORD])?,
        amount: read_u256(&head[3 * WORD..])?,
    })
}

// ============================================================================
// Warp (Hyperlane)
// ============================================================================

pub fn encode_warp(payload: &TransferPayload) -> Result<Vec<u8>, ContractError> {
    let recipient_len = short_len(&payload.recipient, "recipient")?;
    let sender_len = short_len(&payload.sender, "sender")?;

    let mut out = Vec::with_capacity(2 + 2 * WORD + payload.recipient.len() + payload.sender.len());
    out.push(recipient_len);
    out.extend_from_slice(&payload.recipient);
    out.extend_from_slice(&u256_word(payload.amount.u128()));
    out.extend_from_slice(&payload.transfer_id);
    out.push(sender_len);
    out.extend_from_slice(&payload.sender);
    Ok(out)
}

pub fn decode_warp(data: &[u8]) -> Result<TransferPayload, ContractError> {
    let recipient_len = take(data, 0, 1)?[0] as usize;
    let mut cursor = 1;
    let recipient = take(data, cursor, recipient_len)?.to_vec();
    cursor += recipient_len;
    let amount = read_u256(take(data, cursor, WORD)?)?;
    cursor += WORD;
    let id = transfer_id(take(data, cursor, WORD)?);
    cursor += WORD;
    let sender_len = take(data, cursor, 1)?[0] as usize;
    cursor += 1;
    let sender = take(data, cursor, sender_len)?.to_vec();
    if cursor + sender_len != data.len() {
        return Err(invalid("trailing bytes"));
    }
    Ok(TransferPayload {
        transfer_id: id,
        sender,
        recipient,
        amount,
    })
}

// ============================================================================
// Wormhole
// ============================================================================

pub fn encode_wormhole(payload: &TransferPayload, to_chain: u16) -> Result<Vec<u8>, ContractError> {
    let recipient_len = short_len(&payload.recipient, "recipient")?;
    let sender_len = short_len(&payload.sender, "sender")?;

    let mut out = Vec::with_capacity(
        1 + 2 * WORD + 2 + 2 + payload.recipient.len() + payload.sender.len(),
    );
    out.push(WORMHOLE_TRANSFER_ID);
    out.extend_from_slice(&u256_word(payload.amount.u128()));
    out.extend_from_slice(&payload.transfer_id);
    out.extend_from_slice(&to_chain.to_be_bytes());
    out.push(recipient_len);
    out.extend_from_slice(&payload.recipient);
    out.push(sender_len);
    out.extend_from_slice(&payload.sender);
    Ok(out)
}

/// Decode a Wormhole transfer payload addressed to `local_chain`.
pub fn decode_wormhole(data: &[u8], local_chain: u16) -> Result<TransferPayload, ContractError> {
    if take(data, 0, 1)?[0] != WORMHOLE_TRANSFER_ID {
        return Err(invalid("unexpected wormhole payload id"));
    }
    let mut cursor = 1;
    let amount = read_u256(take(data, cursor, WORD)?)?;
    cursor += WORD;
    let id = transfer_id(take(data, cursor, WORD)?);
    cursor += WORD;
    let chain = take(data, cursor, 2)?;
    let to_chain = u16::from_be_bytes([chain[0], chain[1]]);
    if to_chain != local_chain {
        return Err(invalid(format!(
            "payload targets wormhole chain {}, this is {}",
            to_chain, local_chain
        )));
    }
    cursor += 2;
    let recipient_len = take(data, cursor, 1)?[0] as usize;
    cursor += 1;
    let recipient = take(data, cursor, recipient_len)?.to_vec();
    cursor += recipient_len;
    let sender_len = take(data, cursor, 1)?[0] as usize;
    cursor += 1;
    let sender = take(data, cursor, sender_len)?.to_vec();
    if cursor + sender_len != data.len() {
        return Err(invalid("trailing bytes"));
    }
    Ok(TransferPayload {
        transfer_id: id,
        sender,
        recipient,
        amount,
    })
}
