//! Wallet session: the one place that knows whether a wallet is connected.
//!
//! [`SessionManager`] owns the [`WalletSession`] and is its only writer. Every
//! mutation goes through `watch::Sender::send_modify`, so observers always see
//! a whole update. Readers hold a `watch::Receiver` or take a snapshot.
//!
//! A connect attempt records the session generation when it starts. Anything
//! that ends or replaces the session (explicit disconnect, the wallet
//! reporting no accounts or another account) advances the generation, and a
//! connect that resolves under an older generation is dropped instead of
//! committed.

mod guard;

pub use guard::{can_enter, resolve_route};

use dwat_provider::{
    EventHandler, ProviderError, ProviderEvent, ProviderLocator, Subscription, WalletProvider,
};
use dwat_types::{ChainId, WalletAddress};
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub account: Option<WalletAddress>,
    pub chain_id: Option<ChainId>,
    /// Native balance of `account` in whole units.
    pub balance: Option<String>,
    pub connecting: bool,
    pub last_error: Option<String>,
}

impl WalletSession {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("MetaMask is not installed. Please install MetaMask to connect your wallet.")]
    ProviderUnavailable,
    #[error("No accounts found. Please unlock your MetaMask wallet.")]
    NoAccountsReturned,
    #[error("Failed to connect wallet: {0}")]
    ProviderRequestFailed(#[source] ProviderError),
    #[error("Failed to fetch balance: {0}")]
    BalanceFetchFailed(#[source] ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(WalletAddress),
    /// Another attempt was already in flight; this call did nothing.
    AlreadyConnecting,
    /// The session was ended while waiting on the wallet; the result was dropped.
    Superseded,
}

pub type LocalBoxFuture = Pin<Box<dyn Future<Output = ()>>>;

struct Established {
    account: WalletAddress,
    chain_id: ChainId,
    balance: Option<String>,
}

pub struct SessionManager {
    locator: Box<dyn ProviderLocator>,
    state: watch::Sender<WalletSession>,
    generation: Cell<u64>,
    /// Chain reported by the wallet while the first connect is in flight.
    pending_chain: Cell<Option<ChainId>>,
}

impl SessionManager {
    pub fn new(locator: impl ProviderLocator + 'static) -> Self {
        let (state, _) = watch::channel(WalletSession::default());
        Self {
            locator: Box::new(locator),
            state,
            generation: Cell::new(0),
            pending_chain: Cell::new(None),
        }
    }

    pub fn snapshot(&self) -> WalletSession {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    /// Ask the wallet for account access and load chain and balance.
    ///
    /// Failures are also recorded in `last_error`; on failure the previous
    /// account, chain and balance are left untouched.
    pub async fn connect(&self) -> Result<ConnectOutcome, SessionError> {
        if self.state.borrow().connecting {
            debug!("connect ignored: an attempt is already in flight");
            return Ok(ConnectOutcome::AlreadyConnecting);
        }

        let generation = self.generation.get();
        self.pending_chain.set(None);
        self.state.send_modify(|session| {
            session.connecting = true;
            session.last_error = None;
        });

        let result = match self.locator.locate() {
            Some(provider) => self.establish(provider.as_ref()).await,
            None => Err(SessionError::ProviderUnavailable),
        };

        if self.generation.get() != generation {
            debug!("connect result dropped: session ended while waiting on the wallet");
            return Ok(ConnectOutcome::Superseded);
        }

        match result {
            Ok(established) => {
                let chain_id = self.pending_chain.take().unwrap_or(established.chain_id);
                info!(
                    account = %established.account,
                    chain_id = chain_id.0,
                    "wallet connected"
                );
                let account = established.account.clone();
                self.state.send_modify(|session| {
                    session.account = Some(established.account);
                    session.chain_id = Some(chain_id);
                    session.balance = established.balance;
                    session.connecting = false;
                });
                Ok(ConnectOutcome::Connected(account))
            }
            Err(err) => {
                warn!(error = %err, "wallet connect failed");
                let message = err.to_string();
                self.state.send_modify(|session| {
                    session.connecting = false;
                    session.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    async fn establish(&self, provider: &dyn WalletProvider) -> Result<Established, SessionError> {
        let accounts = provider
            .request_accounts()
            .await
            .map_err(SessionError::ProviderRequestFailed)?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or(SessionError::NoAccountsReturned)?;

        let chain_id = provider
            .chain_id()
            .await
            .map_err(SessionError::ProviderRequestFailed)?;

        let balance = match provider.balance_of(&account).await {
            Ok(wei) => Some(wei.to_ether_string()),
            Err(err) => {
                let err = SessionError::BalanceFetchFailed(err);
                warn!(account = %account, error = %err, "connecting without balance");
                None
            }
        };

        Ok(Established {
            account,
            chain_id,
            balance,
        })
    }

    /// Drop the session. Any connect still waiting on the wallet is discarded
    /// when it resolves.
    pub fn disconnect(&self) {
        self.generation.set(self.generation.get() + 1);
        self.pending_chain.set(None);
        self.state.send_modify(|session| *session = WalletSession::default());
        info!("wallet disconnected");
    }

    /// Refetch the balance of the current account.
    ///
    /// The result is only committed if the account is still the same when the
    /// wallet answers.
    pub async fn refresh_balance(&self) -> Result<(), SessionError> {
        let Some(account) = self.state.borrow().account.clone() else {
            return Ok(());
        };
        let provider = self
            .locator
            .locate()
            .ok_or(SessionError::ProviderUnavailable)?;

        let wei = provider
            .balance_of(&account)
            .await
            .map_err(SessionError::BalanceFetchFailed)?;

        self.state.send_if_modified(|session| match &session.account {
            Some(current) if current.same_as(&account) => {
                session.balance = Some(wei.to_ether_string());
                true
            }
            _ => false,
        });
        Ok(())
    }

    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            ProviderEvent::ChainChanged(raw) => self.on_chain_changed(&raw),
        }
    }

    async fn on_accounts_changed(&self, accounts: Vec<WalletAddress>) {
        let Some(next) = accounts.into_iter().next() else {
            info!("wallet reported no accounts");
            self.disconnect();
            return;
        };

        // A disconnected session adopts the reported account too.
        let switched = self.state.send_if_modified(|session| {
            let differs = session
                .account
                .as_ref()
                .is_none_or(|current| !current.same_as(&next));
            if differs {
                session.account = Some(next.clone());
                session.chain_id = session.chain_id.or(self.pending_chain.take());
                session.connecting = false;
            }
            differs
        });
        if !switched {
            debug!(account = %next, "accountsChanged ignored");
            return;
        }

        // Any connect still waiting on the wallet would write an older account.
        self.generation.set(self.generation.get() + 1);
        info!(account = %next, "wallet account switched");

        if self.state.borrow().chain_id.is_none() {
            if let Err(err) = self.refresh_chain_id().await {
                warn!(account = %next, error = %err, "account adopted without chain id");
            }
        }
        if let Err(err) = self.refresh_balance().await {
            warn!(account = %next, error = %err, "keeping stale balance");
        }
    }

    /// Fill in the chain of an account adopted from a notification.
    async fn refresh_chain_id(&self) -> Result<(), SessionError> {
        let Some(account) = self.state.borrow().account.clone() else {
            return Ok(());
        };
        let provider = self
            .locator
            .locate()
            .ok_or(SessionError::ProviderUnavailable)?;

        let chain_id = provider
            .chain_id()
            .await
            .map_err(SessionError::ProviderRequestFailed)?;

        self.state.send_if_modified(|session| match &session.account {
            Some(current) if current.same_as(&account) && session.chain_id.is_none() => {
                session.chain_id = Some(chain_id);
                true
            }
            _ => false,
        });
        Ok(())
    }

    fn on_chain_changed(&self, raw: &str) {
        let chain_id = match ChainId::from_hex(raw) {
            Ok(chain_id) => chain_id,
            Err(err) => {
                warn!(raw, error = %err, "ignoring undecodable chainChanged payload");
                return;
            }
        };

        let applied = self.state.send_if_modified(|session| {
            if session.account.is_none() {
                // Applied when the pending connect commits.
                if session.connecting {
                    self.pending_chain.set(Some(chain_id));
                }
                return false;
            }
            if session.chain_id == Some(chain_id) {
                return false;
            }
            session.chain_id = Some(chain_id);
            true
        });
        if applied {
            info!(chain_id = chain_id.0, "wallet chain switched");
        }
    }

    /// Register for wallet notifications. Each notification is handed to
    /// `spawn` as a future; the browser passes `spawn_local`.
    ///
    /// Keep the returned [`Subscription`] for as long as the manager should
    /// follow the wallet; dropping it removes both listeners.
    pub fn attach<S>(self: &Rc<Self>, spawn: S) -> Result<Subscription, SessionError>
    where
        S: Fn(LocalBoxFuture) + 'static,
    {
        let provider = self
            .locator
            .locate()
            .ok_or(SessionError::ProviderUnavailable)?;

        let manager = Rc::downgrade(self);
        let handler: EventHandler = Rc::new(move |event: ProviderEvent| {
            if let Some(manager) = manager.upgrade() {
                spawn(Box::pin(async move { manager.handle_event(event).await }));
            }
        });

        provider
            .listen(handler)
            .map_err(SessionError::ProviderRequestFailed)
    }
}
