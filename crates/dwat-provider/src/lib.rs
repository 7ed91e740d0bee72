//! Boundary to the host-injected wallet (EIP-1193).
//!
//! The browser build adapts `window.ethereum` to [`WalletProvider`]; tests and
//! native tools use [`InMemoryProvider`].

use async_trait::async_trait;
use dwat_types::{ChainId, QuantityError, WalletAddress, Wei};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";

pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
pub const CHAIN_CHANGED: &str = "chainChanged";

pub const USER_REJECTED_REQUEST: i64 = 4001;
pub const UNSUPPORTED_METHOD: i64 = 4200;
pub const REQUEST_ALREADY_PENDING: i64 = -32002;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Error object returned by the wallet (`{code, message}`).
    #[error("{message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected response to {method}: {detail}")]
    MalformedResponse { method: String, detail: String },
    /// The host threw something that is not an RPC error object.
    #[error("{0}")]
    Host(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        ProviderError::Rpc {
            code,
            message: message.into(),
        }
    }

    fn malformed(method: &str, detail: impl ToString) -> Self {
        ProviderError::MalformedResponse {
            method: method.to_owned(),
            detail: detail.to_string(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rpc { code, .. } if *code == USER_REJECTED_REQUEST)
    }
}

/// Notifications pushed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<WalletAddress>),
    /// Chain id exactly as the wallet encodes it (hex string).
    ChainChanged(String),
}

impl ProviderEvent {
    /// Decode a raw `(event name, payload)` pair. Unknown events and payloads
    /// of the wrong shape yield `None`.
    pub fn decode(event: &str, payload: Value) -> Option<ProviderEvent> {
        match event {
            ACCOUNTS_CHANGED => {
                let accounts: Vec<String> = serde_json::from_value(payload).ok()?;
                Some(ProviderEvent::AccountsChanged(
                    accounts.into_iter().map(WalletAddress).collect(),
                ))
            }
            CHAIN_CHANGED => payload.as_str().map(|raw| ProviderEvent::ChainChanged(raw.to_owned())),
            _ => None,
        }
    }
}

pub type EventHandler = Rc<dyn Fn(ProviderEvent)>;

/// Listener registration. Dropping it removes the listeners from the
/// provider.
#[must_use = "dropping a Subscription removes the provider listeners"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

#[async_trait(?Send)]
pub trait WalletProvider {
    /// Raw `request({ method, params })`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Register `handler` for `accountsChanged` and `chainChanged`.
    fn listen(&self, handler: EventHandler) -> Result<Subscription, ProviderError>;

    async fn request_accounts(&self) -> Result<Vec<WalletAddress>, ProviderError> {
        let value = self.request(ETH_REQUEST_ACCOUNTS, json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(value)
            .map_err(|err| ProviderError::malformed(ETH_REQUEST_ACCOUNTS, err))?;
        Ok(accounts.into_iter().map(WalletAddress).collect())
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        let value = self.request(ETH_CHAIN_ID, json!([])).await?;
        let raw = expect_str(ETH_CHAIN_ID, &value)?;
        ChainId::from_hex(raw).map_err(|err| quantity_error(ETH_CHAIN_ID, err))
    }

    async fn balance_of(&self, account: &WalletAddress) -> Result<Wei, ProviderError> {
        let value = self
            .request(ETH_GET_BALANCE, json!([account.as_str(), "latest"]))
            .await?;
        let raw = expect_str(ETH_GET_BALANCE, &value)?;
        Wei::from_hex(raw).map_err(|err| quantity_error(ETH_GET_BALANCE, err))
    }
}

fn expect_str<'a>(method: &str, value: &'a Value) -> Result<&'a str, ProviderError> {
    value
        .as_str()
        .ok_or_else(|| ProviderError::malformed(method, format!("expected hex string, got {value}")))
}

fn quantity_error(method: &str, err: QuantityError) -> ProviderError {
    ProviderError::malformed(method, err)
}

/// Looks up the wallet at call time; `None` means no wallet is installed.
pub trait ProviderLocator {
    fn locate(&self) -> Option<Rc<dyn WalletProvider>>;
}

impl<F> ProviderLocator for F
where
    F: Fn() -> Option<Rc<dyn WalletProvider>>,
{
    fn locate(&self) -> Option<Rc<dyn WalletProvider>> {
        self()
    }
}

type Listeners = Rc<RefCell<Vec<(u64, EventHandler)>>>;

#[derive(Default)]
struct Ledger {
    accounts: Vec<WalletAddress>,
    chain_id: u64,
    balances: HashMap<String, u128>,
    failures: HashMap<String, ProviderError>,
}

/// Scripted wallet held entirely in memory.
pub struct InMemoryProvider {
    ledger: RefCell<Ledger>,
    listeners: Listeners,
    next_listener: Cell<u64>,
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new(Vec::new(), ChainId(1))
    }
}

impl InMemoryProvider {
    pub fn new(accounts: Vec<WalletAddress>, chain_id: ChainId) -> Self {
        Self {
            ledger: RefCell::new(Ledger {
                accounts,
                chain_id: chain_id.0,
                ..Ledger::default()
            }),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
        }
    }

    pub fn with_balance(self, account: &str, wei: u128) -> Self {
        self.ledger
            .borrow_mut()
            .balances
            .insert(account.to_ascii_lowercase(), wei);
        self
    }

    /// Make every later call of `method` fail with `err`.
    pub fn fail_method(&self, method: &str, err: ProviderError) {
        self.ledger
            .borrow_mut()
            .failures
            .insert(method.to_owned(), err);
    }

    pub fn clear_failures(&self) {
        self.ledger.borrow_mut().failures.clear();
    }

    /// Switch accounts and notify listeners, as a wallet does when the user
    /// picks another account or locks the extension.
    pub fn set_accounts(&self, accounts: Vec<WalletAddress>) {
        self.ledger.borrow_mut().accounts = accounts.clone();
        self.emit(ProviderEvent::AccountsChanged(accounts));
    }

    pub fn switch_chain(&self, chain_id: ChainId) {
        self.ledger.borrow_mut().chain_id = chain_id.0;
        self.emit(ProviderEvent::ChainChanged(format!("{:#x}", chain_id.0)));
    }

    pub fn emit(&self, event: ProviderEvent) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        debug!(?event, listeners = handlers.len(), "in-memory provider emit");
        for handler in handlers {
            handler(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[async_trait(?Send)]
impl WalletProvider for InMemoryProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let ledger = self.ledger.borrow();
        if let Some(err) = ledger.failures.get(method) {
            return Err(err.clone());
        }

        match method {
            ETH_REQUEST_ACCOUNTS => Ok(json!(
                ledger
                    .accounts
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
            )),
            ETH_CHAIN_ID => Ok(json!(format!("{:#x}", ledger.chain_id))),
            ETH_GET_BALANCE => {
                let account = params
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| ProviderError::rpc(-32602, "missing address parameter"))?;
                let wei = ledger
                    .balances
                    .get(&account.to_ascii_lowercase())
                    .copied()
                    .unwrap_or_default();
                Ok(json!(format!("{wei:#x}")))
            }
            other => Err(ProviderError::rpc(
                UNSUPPORTED_METHOD,
                format!("method {other} is not supported"),
            )),
        }
    }

    fn listen(&self, handler: EventHandler) -> Result<Subscription, ProviderError> {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, handler));

        let listeners = Rc::clone(&self.listeners);
        Ok(Subscription::new(move || {
            listeners.borrow_mut().retain(|(listener, _)| *listener != id);
        }))
    }
}
