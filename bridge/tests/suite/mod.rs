//! Shared test setup: gateway, cw20-base token, a bridge module and a mock
//! messaging endpoint that plays every backend's on-chain counterpart.
#![allow(dead_code)]

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    coins, from_json, to_json_binary, Addr, Binary, Coin, Deps, DepsMut, Env, MessageInfo,
    Response, StdError, StdResult, Uint128, WasmMsg,
};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg, MinterResponse};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};
use cw_storage_plus::Item;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};

use bridge::backends::layerzero::LzFeeResponse;
use bridge::backends::validator_set::message_digest;
use bridge::backends::wormhole::ParsedVaa;
use bridge::backends::{
    AxelarConfig, BackendConfig, HyperlaneConfig, LayerZeroConfig, ValidatorSetConfig,
    ValidatorSignature, WormholeConfig,
};
use bridge::codec::TransferPayload;
use bridge::fee::FeeParams;
use bridge::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use bridge::state::BridgeTransfer;
use common::Protocol;

pub const NATIVE_DENOM: &str = "uluna";
pub const INITIAL_TOKENS: u128 = 1_000_000_000;
pub const THIS_CHAIN: u64 = 1;
pub const DESTINATION: u64 = 56;
pub const ENDPOINT_FEE: u128 = 300;
pub const REMOTE: [u8; 32] = [0xAB; 32];
pub const RECIPIENT: &str = "terra1recipient";
pub const COLLECTOR: &str = "terra1collector";
pub const RELAYER: &str = "terra1relayer";
pub const VALIDATORS: usize = 21;
pub const THRESHOLD: u32 = 14;
pub const MESSAGE_TIMEOUT: u64 = 3_600;

// ============================================================================
// Mock endpoint
// ============================================================================

/// VAA body the mock core bridge "verifies"
#[cw_serde]
pub struct MockVaa {
    pub emitter_chain: u16,
    pub emitter_address: Binary,
    pub sequence: u64,
    pub payload: Binary,
    pub valid: bool,
}

#[cw_serde]
pub struct SentMessage {
    pub destination: String,
    pub receiver: Binary,
    pub payload: Binary,
    pub funds: Vec<Coin>,
}

#[cw_serde]
pub enum EndpointExecuteMsg {
    Send {
        dst_eid: u32,
        receiver: Binary,
        message: Binary,
        refund_address: String,
    },
    Dispatch {
        dest_domain: u32,
        recipient_addr: Binary,
        msg_body: Binary,
    },
    CallContract {
        destination_chain: String,
        destination_address: String,
        payload: Binary,
    },
    PostMessage {
        message: Binary,
        nonce: u32,
    },
    /// Call the bridge module as this endpoint
    Deliver {
        target: String,
        msg: ExecuteMsg,
    },
}

#[cw_serde]
pub enum EndpointQueryMsg {
    EstimateFee { dst_eid: u32, message: Binary },
    VerifyVaa { vaa: Binary, block_time: u64 },
    LastMessage {},
}

const LAST_MESSAGE: Item<SentMessage> = Item::new("last_message");

fn endpoint_instantiate(
    _deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    _msg: Empty,
) -> StdResult<Response> {
    Ok(Response::new())
}

#[cw_serde]
pub struct Empty {}

fn record(
    deps: DepsMut,
    info: MessageInfo,
    destination: String,
    receiver: Binary,
    payload: Binary,
) -> StdResult<Response> {
    LAST_MESSAGE.save(
        deps.storage,
        &SentMessage {
            destination,
            receiver,
            payload,
            funds: info.funds,
        },
    )?;
    Ok(Response::new())
}

fn endpoint_execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: EndpointExecuteMsg,
) -> StdResult<Response> {
    match msg {
        EndpointExecuteMsg::Send {
            dst_eid,
            receiver,
            message,
            ..
        } => record(deps, info, dst_eid.to_string(), receiver, message),
        EndpointExecuteMsg::Dispatch {
            dest_domain,
            recipient_addr,
            msg_body,
        } => record(deps, info, dest_domain.to_string(), recipient_addr, msg_body),
        EndpointExecuteMsg::CallContract {
            destination_chain,
            destination_address,
            payload,
        } => record(
            deps,
            info,
            destination_chain,
            Binary::from(destination_address.into_bytes()),
            payload,
        ),
        EndpointExecuteMsg::PostMessage { message, .. } => {
            record(deps, info, String::new(), Binary::default(), message)
        }
        EndpointExecuteMsg::Deliver { target, msg } => {
            Ok(Response::new().add_message(WasmMsg::Execute {
                contract_addr: target,
                msg: to_json_binary(&msg)?,
                funds: vec![],
            }))
        }
    }
}

fn endpoint_query(deps: Deps, _env: Env, msg: EndpointQueryMsg) -> StdResult<Binary> {
    match msg {
        EndpointQueryMsg::EstimateFee { .. } => to_json_binary(&LzFeeResponse {
            native_fee: Uint128::new(ENDPOINT_FEE),
        }),
        EndpointQueryMsg::VerifyVaa { vaa, .. } => {
            let vaa: MockVaa = from_json(&vaa)?;
            if !vaa.valid {
                return Err(StdError::generic_err("guardian signatures do not verify"));
            }
            to_json_binary(&ParsedVaa {
                emitter_chain: vaa.emitter_chain,
                emitter_address: vaa.emitter_address,
                sequence: vaa.sequence,
                payload: vaa.payload,
            })
        }
        EndpointQueryMsg::LastMessage {} => to_json_binary(&LAST_MESSAGE.may_load(deps.storage)?),
    }
}

// ============================================================================
// Validator keys
// ============================================================================

pub fn validator_keys() -> Vec<SigningKey> {
    (0..VALIDATORS)
        .map(|i| SigningKey::from_slice(&[i as u8 + 1; 32]).unwrap())
        .collect()
}

pub fn public_key(key: &SigningKey) -> Binary {
    Binary::from(key.verifying_key().to_encoded_point(false).as_bytes().to_vec())
}

pub fn sign(key: &SigningKey, digest: &[u8; 32]) -> Binary {
    let signature: Signature = key.sign_prehash(digest).unwrap();
    Binary::from(signature.to_bytes().to_vec())
}

/// Signatures from the validators at `indices` over an inbound message to `module`
pub fn sign_message(
    keys: &[SigningKey],
    indices: impl IntoIterator<Item = usize>,
    module: &Addr,
    sender: &[u8],
    issued_at: u64,
    payload: &[u8],
) -> Vec<ValidatorSignature> {
    let digest = message_digest(
        DESTINATION,
        THIS_CHAIN,
        module.as_str(),
        sender,
        issued_at,
        payload,
    );
    indices
        .into_iter()
        .map(|i| ValidatorSignature {
            index: i as u32,
            signature: sign(&keys[i], &digest),
        })
        .collect()
}

// ============================================================================
// Suite
// ============================================================================

pub struct Suite {
    pub app: App,
    pub admin: Addr,
    pub user: Addr,
    pub gateway: Addr,
    pub token: Addr,
    pub bridge: Addr,
    pub endpoint: Addr,
    pub bridge_code: u64,
    pub protocol: Protocol,
    /// Trusted remote of `DESTINATION`
    pub remote: Binary,
    /// Backend-native id of `DESTINATION`
    pub native_id: String,
}

/// LayerZero module
pub fn setup() -> Suite {
    setup_with(Protocol::LayerZero)
}

/// Gateway with a bridge module for `protocol` registered, and `DESTINATION`
/// supported on both sides.
pub fn setup_with(protocol: Protocol) -> Suite {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
    let user = Addr::unchecked("terra1user");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &user, coins(10_000_000, NATIVE_DENOM))
            .unwrap();
    });

    let cw20_code = app.store_code(Box::new(ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    )));
    let gateway_code = app.store_code(Box::new(
        ContractWrapper::new(
            gateway::contract::execute,
            gateway::contract::instantiate,
            gateway::contract::query,
        )
        .with_reply(gateway::contract::reply),
    ));
    let bridge_code = app.store_code(Box::new(
        ContractWrapper::new(
            bridge::contract::execute,
            bridge::contract::instantiate,
            bridge::contract::query,
        )
        .with_reply(bridge::contract::reply),
    ));
    let endpoint_code = app.store_code(Box::new(ContractWrapper::new(
        endpoint_execute,
        endpoint_instantiate,
        endpoint_query,
    )));

    let token = app
        .instantiate_contract(
            cw20_code,
            admin.clone(),
            &cw20_base::msg::InstantiateMsg {
                name: "Omni Token".to_string(),
                symbol: "OMNI".to_string(),
                decimals: 6,
                initial_balances: vec![Cw20Coin {
                    address: user.to_string(),
                    amount: Uint128::new(INITIAL_TOKENS),
                }],
                mint: Some(MinterResponse {
                    minter: admin.to_string(),
                    cap: None,
                }),
                marketing: None,
            },
            &[],
            "omni",
            None,
        )
        .unwrap();

    let gateway = app
        .instantiate_contract(
            gateway_code,
            admin.clone(),
            &gateway::msg::InstantiateMsg {
                admin: admin.to_string(),
                token: token.to_string(),
                global_daily_limit: Uint128::zero(),
                anomaly_thresholds: None,
                security_admins: vec![],
                emergency_operators: vec![],
                gas_oracles: vec![],
            },
            &[],
            "gateway",
            None,
        )
        .unwrap();

    app.execute_contract(
        admin.clone(),
        token.clone(),
        &Cw20ExecuteMsg::UpdateMinter {
            new_minter: Some(gateway.to_string()),
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        user.clone(),
        token.clone(),
        &Cw20ExecuteMsg::IncreaseAllowance {
            spender: gateway.to_string(),
            amount: Uint128::new(INITIAL_TOKENS),
            expires: None,
        },
        &[],
    )
    .unwrap();

    let endpoint = app
        .instantiate_contract(endpoint_code, admin.clone(), &Empty {}, &[], "endpoint", None)
        .unwrap();

    let (backend, native_id, remote) = backend_for(protocol, &endpoint);

    let bridge = app
        .instantiate_contract(
            bridge_code,
            admin.clone(),
            &module_instantiate(&admin, &gateway, backend),
            &[],
            "bridge",
            None,
        )
        .unwrap();

    app.execute_contract(
        admin.clone(),
        gateway.clone(),
        &gateway::msg::ExecuteMsg::RegisterProtocol {
            protocol,
            module: bridge.to_string(),
            version: "1.0.0".to_string(),
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        admin.clone(),
        gateway.clone(),
        &gateway::msg::ExecuteMsg::SetDestinationSupport {
            protocol,
            destination: DESTINATION,
            supported: true,
            config: None,
        },
        &[],
    )
    .unwrap();

    let mut suite = Suite {
        app,
        admin,
        user,
        gateway,
        token,
        bridge,
        endpoint,
        bridge_code,
        protocol,
        remote: remote.clone(),
        native_id: native_id.clone(),
    };
    suite.configure_module(native_id, remote);
    suite
}

fn module_instantiate(admin: &Addr, gateway: &Addr, backend: BackendConfig) -> InstantiateMsg {
    InstantiateMsg {
        admin: admin.to_string(),
        gateway: gateway.to_string(),
        this_chain_id: THIS_CHAIN,
        fee_collector: COLLECTOR.to_string(),
        fee_denom: NATIVE_DENOM.to_string(),
        fee_params: FeeParams {
            fee_bps: 100,
            min_fee: Uint128::new(10),
            max_fee: Uint128::new(1_000_000),
        },
        backend,
    }
}

fn backend_for(protocol: Protocol, endpoint: &Addr) -> (BackendConfig, String, Binary) {
    let remote32 = Binary::from(REMOTE.to_vec());
    match protocol {
        Protocol::LayerZero => (
            BackendConfig::LayerZero(LayerZeroConfig {
                endpoint: endpoint.clone(),
                local_eid: 30107,
            }),
            "30102".to_string(),
            remote32,
        ),
        Protocol::Hyperlane => (
            BackendConfig::Hyperlane(HyperlaneConfig {
                mailbox: endpoint.clone(),
                local_domain: 1_000,
                base_fee: Uint128::new(100),
                fee_per_byte: Uint128::new(1),
            }),
            "56".to_string(),
            remote32,
        ),
        Protocol::Axelar => (
            BackendConfig::Axelar(AxelarConfig {
                gateway: endpoint.clone(),
                chain_name: "terra".to_string(),
                base_fee: Uint128::new(200),
                fee_per_byte: Uint128::zero(),
            }),
            "binance".to_string(),
            Binary::from(b"0xremote".to_vec()),
        ),
        Protocol::Wormhole => (
            BackendConfig::Wormhole(WormholeConfig {
                core_bridge: endpoint.clone(),
                chain_id: 3,
                message_fee: Uint128::new(50),
            }),
            "4".to_string(),
            remote32,
        ),
        Protocol::ValidatorSet => (
            BackendConfig::ValidatorSet(ValidatorSetConfig {
                validators: validator_keys().iter().map(public_key).collect(),
                threshold: THRESHOLD,
                message_timeout: MESSAGE_TIMEOUT,
                relayer_fee: Uint128::zero(),
            }),
            DESTINATION.to_string(),
            Binary::from(b"0xremote-bridge".to_vec()),
        ),
    }
}

impl Suite {
    fn configure_module(&mut self, native_id: String, remote: Binary) {
        self.admin_exec(ExecuteMsg::SetRemote {
            chain_id: DESTINATION,
            native_id,
            remote,
        })
        .unwrap();
        self.admin_exec(ExecuteMsg::AddRelayer {
            relayer: RELAYER.to_string(),
        })
        .unwrap();
    }

    /// Deploy a fresh module for the same protocol and swap it in at the
    /// gateway. Returns the retired module.
    pub fn replace_module(&mut self) -> Addr {
        let (backend, native_id, remote) = backend_for(self.protocol, &self.endpoint);
        let module = self
            .app
            .instantiate_contract(
                self.bridge_code,
                self.admin.clone(),
                &module_instantiate(&self.admin, &self.gateway, backend),
                &[],
                "bridge-v2",
                None,
            )
            .unwrap();
        self.app
            .execute_contract(
                self.admin.clone(),
                self.gateway.clone(),
                &gateway::msg::ExecuteMsg::UpdateModule {
                    protocol: self.protocol,
                    module: module.to_string(),
                    version: "2.0.0".to_string(),
                },
                &[],
            )
            .unwrap();

        let retired = std::mem::replace(&mut self.bridge, module);
        self.configure_module(native_id, remote);
        retired
    }

    pub fn admin_exec(&mut self, msg: ExecuteMsg) -> anyhow::Result<AppResponse> {
        let admin = self.admin.clone();
        self.exec(&admin, msg, &[])
    }

    pub fn exec(
        &mut self,
        sender: &Addr,
        msg: ExecuteMsg,
        funds: &[Coin],
    ) -> anyhow::Result<AppResponse> {
        self.app
            .execute_contract(sender.clone(), self.bridge.clone(), &msg, funds)
    }

    /// Direct outbound transfer from the user to `DESTINATION`
    pub fn send(&mut self, amount: u128, fee_funds: u128) -> anyhow::Result<AppResponse> {
        let user = self.user.clone();
        let funds = if fee_funds == 0 {
            vec![]
        } else {
            coins(fee_funds, NATIVE_DENOM)
        };
        self.exec(
            &user,
            ExecuteMsg::InitiateTransfer {
                destination: DESTINATION,
                recipient: Binary::from(b"0xrecipient".to_vec()),
                amount: Uint128::new(amount),
                routed: None,
            },
            &funds,
        )
    }

    /// Deliver `msg` to the bridge as the endpoint contract
    pub fn deliver(&mut self, msg: ExecuteMsg) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            self.admin.clone(),
            self.endpoint.clone(),
            &EndpointExecuteMsg::Deliver {
                target: self.bridge.to_string(),
                msg,
            },
            &[],
        )
    }

    pub fn advance(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += seconds / 5 + 1;
        });
    }

    pub fn now(&self) -> u64 {
        self.app.block_info().time.seconds()
    }

    pub fn query<T: serde::de::DeserializeOwned>(&self, msg: &QueryMsg) -> T {
        self.app
            .wrap()
            .query_wasm_smart(self.bridge.clone(), msg)
            .unwrap()
    }

    pub fn transfer(&self, id: &[u8]) -> Option<BridgeTransfer> {
        self.query(&QueryMsg::Transfer {
            transfer_id: Binary::from(id),
        })
    }

    pub fn last_message(&self) -> Option<SentMessage> {
        self.app
            .wrap()
            .query_wasm_smart(self.endpoint.clone(), &EndpointQueryMsg::LastMessage {})
            .unwrap()
    }

    pub fn token_balance(&self, address: &str) -> u128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                self.token.clone(),
                &Cw20QueryMsg::Balance {
                    address: address.to_string(),
                },
            )
            .unwrap();
        res.balance.u128()
    }

    pub fn native_balance(&self, address: &Addr) -> u128 {
        self.app
            .wrap()
            .query_balance(address.clone(), NATIVE_DENOM)
            .unwrap()
            .amount
            .u128()
    }
}

/// Inbound transfer to `RECIPIENT`
pub fn inbound(id: u8, amount: u128) -> TransferPayload {
    TransferPayload {
        transfer_id: [id; 32],
        sender: vec![0xCD; 20],
        recipient: RECIPIENT.as_bytes().to_vec(),
        amount: Uint128::new(amount),
    }
}

pub fn has_event(res: &AppResponse, ty: &str) -> bool {
    res.events.iter().any(|e| e.ty == format!("wasm-{}", ty))
}

pub fn event_attr(res: &AppResponse, ty: &str, key: &str) -> Option<String> {
    res.events
        .iter()
        .filter(|e| e.ty == format!("wasm-{}", ty))
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
}

/// Attribute of the module's own `wasm` event
pub fn wasm_attr(res: &AppResponse, key: &str) -> Option<String> {
    res.events
        .iter()
        .filter(|e| e.ty == "wasm")
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
}

pub fn err_contains(res: anyhow::Result<AppResponse>, needle: &str) {
    let err = res.unwrap_err();
    let msg = err.root_cause().to_string();
    assert!(msg.contains(needle), "expected '{}' in '{}'", needle, msg);
}
