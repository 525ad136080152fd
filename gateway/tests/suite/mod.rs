//! Shared test setup: gateway, cw20-base token and a mock bridge module.
#![allow(dead_code)]

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    coins, to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response,
    StdError, StdResult, Uint128, WasmMsg,
};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg, MinterResponse};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};
use cw_storage_plus::Item;

use common::gateway::GatewayExecuteMsg;
use common::module::{FeeQuoteResponse, RoutedTransfer};
use common::Protocol;
use gateway::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};

pub const NATIVE_DENOM: &str = "uluna";
pub const INITIAL_TOKENS: u128 = 1_000_000_000;
pub const DESTINATION: u64 = 56;

// ============================================================================
// Mock bridge module
// ============================================================================

#[cw_serde]
pub struct MockInstantiateMsg {
    pub gateway: String,
    pub protocol: Protocol,
    pub native_fee: Uint128,
}

#[cw_serde]
pub enum MockExecuteMsg {
    InitiateTransfer {
        destination: u64,
        recipient: Binary,
        amount: Uint128,
        routed: Option<RoutedTransfer>,
    },
    SetQuote {
        native_fee: Uint128,
    },
    SetFailing {
        failing: bool,
    },
    SetReenter {
        reenter: bool,
    },
    /// Call the gateway as this module
    Forward {
        msg: GatewayExecuteMsg,
    },
}

#[cw_serde]
pub enum MockQueryMsg {
    QuoteFee { destination: u64, amount: Uint128 },
    LastRouted {},
}

const MOCK_GATEWAY: Item<Addr> = Item::new("gateway");
const MOCK_PROTOCOL: Item<Protocol> = Item::new("protocol");
const MOCK_QUOTE: Item<Uint128> = Item::new("quote");
const MOCK_FAILING: Item<bool> = Item::new("failing");
const MOCK_REENTER: Item<bool> = Item::new("reenter");
const MOCK_LAST: Item<RoutedTransfer> = Item::new("last_routed");

fn mock_instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: MockInstantiateMsg,
) -> StdResult<Response> {
    MOCK_GATEWAY.save(deps.storage, &deps.api.addr_validate(&msg.gateway)?)?;
    MOCK_PROTOCOL.save(deps.storage, &msg.protocol)?;
    MOCK_QUOTE.save(deps.storage, &msg.native_fee)?;
    MOCK_FAILING.save(deps.storage, &false)?;
    MOCK_REENTER.save(deps.storage, &false)?;
    Ok(Response::new())
}

fn mock_execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: MockExecuteMsg,
) -> StdResult<Response> {
    let gateway = MOCK_GATEWAY.load(deps.storage)?;
    match msg {
        MockExecuteMsg::InitiateTransfer {
            destination,
            recipient,
            amount,
            routed,
        } => {
            let routed = routed.ok_or_else(|| StdError::generic_err("expected routed call"))?;
            if info.sender != gateway {
                return Err(StdError::generic_err("routed call from non-gateway"));
            }
            MOCK_LAST.save(deps.storage, &routed)?;

            let mut res = Response::new().add_message(WasmMsg::Execute {
                contract_addr: gateway.to_string(),
                msg: to_json_binary(&GatewayExecuteMsg::BurnFrom {
                    owner: routed.sender.clone(),
                    amount,
                })?,
                funds: vec![],
            });
            if MOCK_REENTER.load(deps.storage)? {
                res = res.add_message(WasmMsg::Execute {
                    contract_addr: gateway.to_string(),
                    msg: to_json_binary(&ExecuteMsg::Bridge {
                        protocol: MOCK_PROTOCOL.load(deps.storage)?,
                        destination,
                        recipient,
                        amount,
                    })?,
                    funds: vec![],
                });
            }
            Ok(res)
        }
        MockExecuteMsg::SetQuote { native_fee } => {
            MOCK_QUOTE.save(deps.storage, &native_fee)?;
            Ok(Response::new())
        }
        MockExecuteMsg::SetFailing { failing } => {
            MOCK_FAILING.save(deps.storage, &failing)?;
            Ok(Response::new())
        }
        MockExecuteMsg::SetReenter { reenter } => {
            MOCK_REENTER.save(deps.storage, &reenter)?;
            Ok(Response::new())
        }
        MockExecuteMsg::Forward { msg } => Ok(Response::new().add_message(WasmMsg::Execute {
            contract_addr: gateway.to_string(),
            msg: to_json_binary(&msg)?,
            funds: vec![],
        })),
    }
}

fn mock_query(deps: Deps, _env: Env, msg: MockQueryMsg) -> StdResult<Binary> {
    match msg {
        MockQueryMsg::QuoteFee { .. } => {
            if MOCK_FAILING.load(deps.storage)? {
                return Err(StdError::generic_err("quote unavailable"));
            }
            to_json_binary(&FeeQuoteResponse {
                protocol: MOCK_PROTOCOL.load(deps.storage)?,
                native_fee: MOCK_QUOTE.load(deps.storage)?,
                native_denom: NATIVE_DENOM.to_string(),
                protocol_fee: Uint128::zero(),
            })
        }
        MockQueryMsg::LastRouted {} => to_json_binary(&MOCK_LAST.may_load(deps.storage)?),
    }
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
    pub module: Addr,
    pub mock_code_id: u64,
}

/// Gateway with a LayerZero mock module registered and `DESTINATION` supported.
pub fn setup() -> Suite {
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
    let mock_code_id = app.store_code(Box::new(ContractWrapper::new(
        mock_execute,
        mock_instantiate,
        mock_query,
    )));

    let token = app
        .instantiate_contract(
            cw20_code,
            admin.clone(),
            &cw20_base::msg::InstantiateMsg {
                name: "Omni Token".to_string(),
                symbol: "OMNI".to_string(),
                decimals: 6,
                initial_balances: vec![
                    Cw20Coin {
                        address: user.to_string(),
                        amount: Uint128::new(INITIAL_TOKENS),
                    },
                    Cw20Coin {
                        address: "terra1other".to_string(),
                        amount: Uint128::new(INITIAL_TOKENS),
                    },
                ],
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
            &InstantiateMsg {
                admin: admin.to_string(),
                token: token.to_string(),
                global_daily_limit: Uint128::zero(),
                anomaly_thresholds: None,
                security_admins: vec!["terra1security".to_string()],
                emergency_operators: vec!["terra1emergency".to_string()],
                gas_oracles: vec!["terra1oracle".to_string()],
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

    for owner in [user.clone(), Addr::unchecked("terra1other")] {
        app.execute_contract(
            owner,
            token.clone(),
            &Cw20ExecuteMsg::IncreaseAllowance {
                spender: gateway.to_string(),
                amount: Uint128::new(INITIAL_TOKENS),
                expires: None,
            },
            &[],
        )
        .unwrap();
    }

    let mut suite = Suite {
        app,
        admin,
        user,
        gateway,
        token,
        module: Addr::unchecked(""),
        mock_code_id,
    };
    suite.module = suite.add_module(Protocol::LayerZero, 1_000);
    suite
}

impl Suite {
    /// Instantiate and register a mock module, supporting `DESTINATION`.
    pub fn add_module(&mut self, protocol: Protocol, native_fee: u128) -> Addr {
        let module = self
            .app
            .instantiate_contract(
                self.mock_code_id,
                self.admin.clone(),
                &MockInstantiateMsg {
                    gateway: self.gateway.to_string(),
                    protocol,
                    native_fee: Uint128::new(native_fee),
                },
                &[],
                "mock-module",
                None,
            )
            .unwrap();
        self.admin_exec(ExecuteMsg::RegisterProtocol {
            protocol,
            module: module.to_string(),
            version: "1.0.0".to_string(),
        })
        .unwrap();
        self.admin_exec(ExecuteMsg::SetDestinationSupport {
            protocol,
            destination: DESTINATION,
            supported: true,
            config: None,
        })
        .unwrap();
        module
    }

    pub fn admin_exec(&mut self, msg: ExecuteMsg) -> anyhow::Result<AppResponse> {
        let admin = self.admin.clone();
        self.exec(&admin, msg)
    }

    pub fn exec(&mut self, sender: &Addr, msg: ExecuteMsg) -> anyhow::Result<AppResponse> {
        self.app
            .execute_contract(sender.clone(), self.gateway.clone(), &msg, &[])
    }

    pub fn module_exec(&mut self, module: &Addr, msg: MockExecuteMsg) -> anyhow::Result<AppResponse> {
        self.app
            .execute_contract(self.admin.clone(), module.clone(), &msg, &[])
    }

    pub fn bridge(&mut self, sender: &Addr, protocol: Protocol, amount: u128) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            sender.clone(),
            self.gateway.clone(),
            &ExecuteMsg::Bridge {
                protocol,
                destination: DESTINATION,
                recipient: Binary::from(b"0xrecipient".to_vec()),
                amount: Uint128::new(amount),
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

    pub fn query<T: serde::de::DeserializeOwned>(&self, msg: &QueryMsg) -> T {
        self.app
            .wrap()
            .query_wasm_smart(self.gateway.clone(), msg)
            .unwrap()
    }

    pub fn token_balance(&self, address: &Addr) -> u128 {
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

pub fn err_contains(res: anyhow::Result<AppResponse>, needle: &str) {
    let err = res.unwrap_err();
    let msg = err.root_cause().to_string();
    assert!(msg.contains(needle), "expected '{}' in '{}'", needle, msg);
}
