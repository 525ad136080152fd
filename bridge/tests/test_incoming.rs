//! Inbound deliveries, settlement and remediation on a LayerZero module.

mod suite;

use cosmwasm_std::{Addr, Binary, Uint128};
use cw_multi_test::{AppResponse, Executor};

use bridge::codec::{encode_abi, TransferPayload};
use bridge::msg::{ExecuteMsg, IsProcessedResponse, QueryMsg, StatusResponse};
use bridge::state::{Direction, FailedMessage, TransferStatus};
use common::{keccak256, Protocol};
use suite::{
    err_contains, event_attr, has_event, inbound, setup, wasm_attr, Suite, DESTINATION,
    ENDPOINT_FEE, RECIPIENT, REMOTE,
};

fn lz_receive(
    suite: &mut Suite,
    nonce: u64,
    message: Vec<u8>,
) -> anyhow::Result<AppResponse> {
    suite.deliver(ExecuteMsg::LzReceive {
        src_eid: 30102,
        sender: Binary::from(REMOTE.to_vec()),
        nonce,
        message: Binary::from(message),
    })
}

fn deliver_payload(
    suite: &mut Suite,
    nonce: u64,
    payload: &TransferPayload,
) -> anyhow::Result<AppResponse> {
    lz_receive(suite, nonce, encode_abi(payload))
}

#[test]
fn test_inbound_mint_completes() {
    let mut suite = setup();

    let res = deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();
    assert!(has_event(&res, "transfer_completed"));
    assert_eq!(
        event_attr(&res, "transfer_completed", "source_chain").as_deref(),
        Some("56")
    );
    assert_eq!(suite.token_balance(RECIPIENT), 5_000);

    let transfer = suite.transfer(&[7u8; 32]).unwrap();
    assert_eq!(transfer.status, TransferStatus::Completed);
    assert_eq!(transfer.direction, Direction::Inbound);
    assert_eq!(transfer.source_chain, DESTINATION);
    assert_eq!(transfer.sender, Binary::from(vec![0xCD; 20]));

    let processed: IsProcessedResponse = suite.query(&QueryMsg::IsProcessed {
        transfer_id: Binary::from(vec![7u8; 32]),
    });
    assert!(processed.processed);
    let nonce: IsProcessedResponse = suite.query(&QueryMsg::IsNonceProcessed {
        source: "30102".to_string(),
        nonce: 1,
    });
    assert!(nonce.processed);

    let status: StatusResponse = suite.query(&QueryMsg::Status {});
    assert_eq!(status.stats.total_incoming, 1);
    assert_eq!(status.stats.total_received, Uint128::new(5_000));
}

#[test]
fn test_transfer_id_replay_rejected() {
    let mut suite = setup();
    deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();

    // fresh nonce, same transfer
    err_contains(
        deliver_payload(&mut suite, 2, &inbound(7, 5_000)),
        "Transfer already processed",
    );
    assert_eq!(suite.token_balance(RECIPIENT), 5_000);
}

#[test]
fn test_nonce_replay_rejected() {
    let mut suite = setup();
    deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();

    err_contains(
        deliver_payload(&mut suite, 1, &inbound(8, 5_000)),
        "Nonce 1 from 30102 already processed",
    );
}

#[test]
fn test_source_authentication() {
    let mut suite = setup();
    let payload = Binary::from(encode_abi(&inbound(7, 5_000)));

    err_contains(
        suite.deliver(ExecuteMsg::LzReceive {
            src_eid: 30102,
            sender: Binary::from(vec![0xCD; 32]),
            nonce: 1,
            message: payload.clone(),
        }),
        "Untrusted remote for source chain 30102",
    );
    err_contains(
        suite.deliver(ExecuteMsg::LzReceive {
            src_eid: 30999,
            sender: Binary::from(REMOTE.to_vec()),
            nonce: 1,
            message: payload.clone(),
        }),
        "Unknown source chain: 30999",
    );

    let user = suite.user.clone();
    err_contains(
        suite.exec(
            &user,
            ExecuteMsg::LzReceive {
                src_eid: 30102,
                sender: Binary::from(REMOTE.to_vec()),
                nonce: 1,
                message: payload.clone(),
            },
            &[],
        ),
        "caller is not the LayerZero endpoint",
    );
    err_contains(
        suite.deliver(ExecuteMsg::Handle {
            origin: 56,
            sender: Binary::from(REMOTE.to_vec()),
            body: payload,
        }),
        "Delivery does not match the layer_zero backend",
    );

    // nothing consumed by the rejected attempts
    deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();
}

#[test]
fn test_removed_remote_stops_inbound() {
    let mut suite = setup();
    suite
        .admin_exec(ExecuteMsg::RemoveRemote {
            chain_id: DESTINATION,
        })
        .unwrap();

    err_contains(
        deliver_payload(&mut suite, 1, &inbound(7, 5_000)),
        "Untrusted remote",
    );
}

#[test]
fn test_paused_module_rejects_inbound() {
    let mut suite = setup();
    suite.admin_exec(ExecuteMsg::Pause {}).unwrap();

    err_contains(
        deliver_payload(&mut suite, 1, &inbound(7, 5_000)),
        "Bridge module is paused",
    );
}

#[test]
fn test_blacklisted_recipient_fails_transfer() {
    let mut suite = setup();
    suite
        .admin_exec(ExecuteMsg::SetBlacklisted {
            address: RECIPIENT.to_string(),
            blacklisted: true,
        })
        .unwrap();

    let res = deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();
    assert!(has_event(&res, "transfer_failed"));
    assert_eq!(suite.token_balance(RECIPIENT), 0);

    let transfer = suite.transfer(&[7u8; 32]).unwrap();
    assert_eq!(transfer.status, TransferStatus::Failed);
    assert_eq!(
        transfer.failure_reason.as_deref(),
        Some("recipient is blacklisted")
    );

    // the id stays consumed
    err_contains(
        deliver_payload(&mut suite, 2, &inbound(7, 5_000)),
        "Transfer already processed",
    );
}

#[test]
fn test_invalid_recipient_fails_transfer() {
    let mut suite = setup();
    let mut payload = inbound(7, 5_000);
    payload.recipient = vec![0xFF, 0xFE, 0xFD];

    deliver_payload(&mut suite, 1, &payload).unwrap();
    let transfer = suite.transfer(&[7u8; 32]).unwrap();
    assert_eq!(transfer.status, TransferStatus::Failed);
    assert_eq!(
        transfer.failure_reason.as_deref(),
        Some("recipient is not a valid address")
    );
}

#[test]
fn test_undecodable_message_recorded() {
    let mut suite = setup();
    let garbage = b"not a transfer payload".to_vec();

    let res = lz_receive(&mut suite, 1, garbage.clone()).unwrap();
    assert_eq!(
        wasm_attr(&res, "method").as_deref(),
        Some("undecodable_message")
    );

    let failed: Option<FailedMessage> = suite.query(&QueryMsg::FailedMessage {
        payload_hash: Binary::from(keccak256(&garbage).to_vec()),
    });
    let failed = failed.unwrap();
    assert_eq!(failed.source_chain, DESTINATION);
    assert_eq!(failed.payload, Binary::from(garbage.clone()));
    assert!(failed.reason.contains("Invalid payload"));

    // the nonce is consumed
    err_contains(
        lz_receive(&mut suite, 1, garbage),
        "already processed",
    );

    let status: StatusResponse = suite.query(&QueryMsg::Status {});
    assert_eq!(status.stats.total_failed, 1);
}

#[test]
fn test_mint_failure_recorded() {
    let mut suite = setup();
    let admin = suite.admin.clone();

    // module replaced at the gateway: mints from this instance are refused
    suite
        .app
        .execute_contract(
            admin,
            suite.gateway.clone(),
            &gateway::msg::ExecuteMsg::UpdateModule {
                protocol: Protocol::LayerZero,
                module: "terra1newmodule".to_string(),
                version: "2.0.0".to_string(),
            },
            &[],
        )
        .unwrap();

    let res = deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();
    assert!(has_event(&res, "transfer_failed"));
    assert_eq!(suite.token_balance(RECIPIENT), 0);

    let transfer = suite.transfer(&[7u8; 32]).unwrap();
    assert_eq!(transfer.status, TransferStatus::Failed);
    assert!(transfer.failure_reason.is_some());

    // guard released after the failed mint
    deliver_payload(&mut suite, 2, &inbound(8, 1_000)).unwrap();
    assert_eq!(
        suite.transfer(&[8u8; 32]).unwrap().status,
        TransferStatus::Failed
    );

    let status: StatusResponse = suite.query(&QueryMsg::Status {});
    assert_eq!(status.stats.total_failed, 2);
    assert_eq!(status.stats.total_incoming, 0);
}

#[test]
fn test_mark_failed() {
    let mut suite = setup();
    let res = suite.send(100_000, ENDPOINT_FEE).unwrap();
    let id = event_attr(&res, "transfer_initiated", "transfer_id").unwrap();
    let id = Binary::from(hex::decode(id.trim_start_matches("0x")).unwrap());

    let user = suite.user.clone();
    err_contains(
        suite.exec(
            &user,
            ExecuteMsg::MarkFailed {
                transfer_id: id.clone(),
                reason: "stuck".to_string(),
            },
            &[],
        ),
        "only admin",
    );

    let res = suite
        .admin_exec(ExecuteMsg::MarkFailed {
            transfer_id: id.clone(),
            reason: "destination never executed".to_string(),
        })
        .unwrap();
    assert!(has_event(&res, "transfer_failed"));
    let transfer = suite.transfer(&id).unwrap();
    assert_eq!(transfer.status, TransferStatus::Failed);

    // a failed transfer only gets its reason updated
    suite
        .admin_exec(ExecuteMsg::MarkFailed {
            transfer_id: id.clone(),
            reason: "refunded off-chain".to_string(),
        })
        .unwrap();
    let transfer = suite.transfer(&id).unwrap();
    assert_eq!(
        transfer.failure_reason.as_deref(),
        Some("refunded off-chain")
    );
    let status: StatusResponse = suite.query(&QueryMsg::Status {});
    assert_eq!(status.stats.total_failed, 1);

    deliver_payload(&mut suite, 1, &inbound(7, 5_000)).unwrap();
    err_contains(
        suite.admin_exec(ExecuteMsg::MarkFailed {
            transfer_id: Binary::from(vec![7u8; 32]),
            reason: "too late".to_string(),
        }),
        "already completed",
    );
    err_contains(
        suite.admin_exec(ExecuteMsg::MarkFailed {
            transfer_id: Binary::from(vec![9u8; 32]),
            reason: "unknown".to_string(),
        }),
        "Transfer not found",
    );
}

#[test]
fn test_access_list_query() {
    let mut suite = setup();
    suite
        .admin_exec(ExecuteMsg::SetWhitelisted {
            address: RECIPIENT.to_string(),
            whitelisted: true,
        })
        .unwrap();

    let access: bridge::msg::AccessListResponse = suite.query(&QueryMsg::AccessList {
        address: RECIPIENT.to_string(),
    });
    assert!(access.whitelisted);
    assert!(!access.blacklisted);
    assert!(!access.relayer);

    let relayer: bridge::msg::AccessListResponse = suite.query(&QueryMsg::AccessList {
        address: Addr::unchecked(suite::RELAYER).to_string(),
    });
    assert!(relayer.relayer);
}
