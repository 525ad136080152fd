//! Protocol registry integration tests.

mod suite;

use cosmwasm_std::{Addr, Binary, Uint128};
use cw_multi_test::Executor;

use common::gateway::{DestinationSupportedResponse, GatewayExecuteMsg};
use common::Protocol;
use gateway::msg::{DestinationsResponse, ExecuteMsg, QueryMsg, StatusResponse};
use gateway::registry::{ProtocolRegistration, HEALTH_CHECK_INTERVAL};
use suite::{
    err_contains, event_attr, has_event, setup, MockExecuteMsg, MockInstantiateMsg, DESTINATION,
};

#[test]
fn test_register_rejections() {
    let mut suite = setup();
    let module = suite.module.clone();
    let user = suite.user.clone();

    err_contains(
        suite.exec(
            &user,
            ExecuteMsg::RegisterProtocol {
                protocol: Protocol::Wormhole,
                module: "terra1wormholemodule".to_string(),
                version: "1.0.0".to_string(),
            },
        ),
        "only admin",
    );
    err_contains(
        suite.admin_exec(ExecuteMsg::RegisterProtocol {
            protocol: Protocol::Wormhole,
            module: " ".to_string(),
            version: "1.0.0".to_string(),
        }),
        "Invalid module",
    );
    err_contains(
        suite.admin_exec(ExecuteMsg::RegisterProtocol {
            protocol: Protocol::LayerZero,
            module: "terra1othermodule".to_string(),
            version: "2.0.0".to_string(),
        }),
        "Protocol already registered: layer_zero",
    );
    err_contains(
        suite.admin_exec(ExecuteMsg::RegisterProtocol {
            protocol: Protocol::Wormhole,
            module: module.to_string(),
            version: "1.0.0".to_string(),
        }),
        "Module already registered for layer_zero",
    );
}

#[test]
fn test_status_counts_and_deprecation_is_terminal() {
    let mut suite = setup();
    suite.add_module(Protocol::Hyperlane, 0);

    let status: StatusResponse = suite.query(&QueryMsg::Status {});
    assert_eq!(status.registered_protocols, 2);
    assert_eq!(status.active_protocols, 2);

    suite
        .admin_exec(ExecuteMsg::SetProtocolStatus {
            protocol: Protocol::Hyperlane,
            active: false,
            deprecated: true,
        })
        .unwrap();
    let status: StatusResponse = suite.query(&QueryMsg::Status {});
    assert_eq!(status.active_protocols, 1);

    err_contains(
        suite.admin_exec(ExecuteMsg::SetProtocolStatus {
            protocol: Protocol::Hyperlane,
            active: true,
            deprecated: false,
        }),
        "Protocol deprecated: hyperlane",
    );
    err_contains(
        suite.admin_exec(ExecuteMsg::UpdateModule {
            protocol: Protocol::Hyperlane,
            module: "terra1newmodule".to_string(),
            version: "2.0.0".to_string(),
        }),
        "Protocol deprecated: hyperlane",
    );
}

#[test]
fn test_health_check() {
    let mut suite = setup();

    let res = suite
        .admin_exec(ExecuteMsg::PerformHealthCheck {
            protocol: Protocol::LayerZero,
        })
        .unwrap();
    assert_eq!(
        event_attr(&res, "protocol_health_check", "healthy"),
        Some("true".to_string())
    );

    err_contains(
        suite.exec(
            &Addr::unchecked("terra1anyone"),
            ExecuteMsg::PerformHealthCheck {
                protocol: Protocol::LayerZero,
            },
        ),
        "Health check too soon",
    );

    suite.advance(HEALTH_CHECK_INTERVAL);
    suite
        .exec(
            &Addr::unchecked("terra1anyone"),
            ExecuteMsg::PerformHealthCheck {
                protocol: Protocol::LayerZero,
            },
        )
        .unwrap();
}

#[test]
fn test_health_check_deactivates_missing_module() {
    let mut suite = setup();
    suite
        .admin_exec(ExecuteMsg::RegisterProtocol {
            protocol: Protocol::Axelar,
            module: "terra1notacontract".to_string(),
            version: "1.0.0".to_string(),
        })
        .unwrap();

    let res = suite
        .exec(
            &Addr::unchecked("terra1anyone"),
            ExecuteMsg::PerformHealthCheck {
                protocol: Protocol::Axelar,
            },
        )
        .unwrap();
    assert!(has_event(&res, "protocol_health_check"));
    assert_eq!(
        event_attr(&res, "protocol_health_check", "healthy"),
        Some("false".to_string())
    );

    let registration: ProtocolRegistration = suite.query(&QueryMsg::Registration {
        protocol: Protocol::Axelar,
    });
    assert!(!registration.active);
    assert!(registration.last_health_check.is_some());
}

#[test]
fn test_update_module_revokes_previous_module() {
    let mut suite = setup();
    let old_module = suite.module.clone();
    let code_id = suite.mock_code_id;

    let mint = |recipient: &str, id: u8| MockExecuteMsg::Forward {
        msg: GatewayExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount: Uint128::new(5),
            transfer_id: Binary::from(vec![id; 32]),
        },
    };
    suite
        .module_exec(&old_module, mint("terra1recipient", 1))
        .unwrap();

    let new_module = suite
        .app
        .instantiate_contract(
            code_id,
            suite.admin.clone(),
            &MockInstantiateMsg {
                gateway: suite.gateway.to_string(),
                protocol: Protocol::LayerZero,
                native_fee: Uint128::zero(),
            },
            &[],
            "mock-module-v2",
            None,
        )
        .unwrap();

    let res = suite
        .admin_exec(ExecuteMsg::UpdateModule {
            protocol: Protocol::LayerZero,
            module: new_module.to_string(),
            version: "2.0.0".to_string(),
        })
        .unwrap();
    assert_eq!(
        event_attr(&res, "config_updated", "previous_module"),
        Some(old_module.to_string())
    );

    err_contains(
        suite.module_exec(&old_module, mint("terra1recipient", 2)),
        "not a registered bridge module",
    );
    // ids the previous module minted stay spent for the protocol
    err_contains(
        suite.module_exec(&new_module, mint("terra1recipient", 1)),
        "already minted via layer_zero",
    );
    suite
        .module_exec(&new_module, mint("terra1recipient", 2))
        .unwrap();

    let registration: ProtocolRegistration = suite.query(&QueryMsg::Registration {
        protocol: Protocol::LayerZero,
    });
    assert_eq!(registration.module, new_module);
    assert_eq!(registration.version, "2.0.0");
}

#[test]
fn test_destination_support_and_pagination() {
    let mut suite = setup();

    for destination in [1u64, 10, 137, 8453] {
        suite
            .admin_exec(ExecuteMsg::SetDestinationSupport {
                protocol: Protocol::LayerZero,
                destination,
                supported: true,
                config: Some(Binary::from(destination.to_be_bytes().to_vec())),
            })
            .unwrap();
    }
    // toggling support keeps the stored config
    suite
        .admin_exec(ExecuteMsg::SetDestinationSupport {
            protocol: Protocol::LayerZero,
            destination: 137,
            supported: false,
            config: None,
        })
        .unwrap();

    let res: DestinationSupportedResponse = suite.query(&QueryMsg::DestinationSupported {
        protocol: Protocol::LayerZero,
        destination: 137,
    });
    assert!(!res.supported);
    let res: DestinationSupportedResponse = suite.query(&QueryMsg::DestinationSupported {
        protocol: Protocol::Wormhole,
        destination: DESTINATION,
    });
    assert!(!res.supported);

    let page: DestinationsResponse = suite.query(&QueryMsg::Destinations {
        protocol: Protocol::LayerZero,
        start_after: None,
        limit: Some(3),
    });
    let ids: Vec<u64> = page.destinations.iter().map(|d| d.destination).collect();
    assert_eq!(ids, vec![1, 10, DESTINATION]);

    let page: DestinationsResponse = suite.query(&QueryMsg::Destinations {
        protocol: Protocol::LayerZero,
        start_after: Some(DESTINATION),
        limit: None,
    });
    assert_eq!(page.destinations.len(), 2);
    assert_eq!(page.destinations[0].destination, 137);
    assert!(!page.destinations[0].supported);
    assert_eq!(
        page.destinations[0].config,
        Binary::from(137u64.to_be_bytes().to_vec())
    );
    assert_eq!(page.destinations[1].destination, 8453);

    err_contains(
        suite.admin_exec(ExecuteMsg::SetDestinationSupport {
            protocol: Protocol::Wormhole,
            destination: 1,
            supported: true,
            config: None,
        }),
        "Protocol not registered: wormhole",
    );
}
