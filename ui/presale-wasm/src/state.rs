//! Page-level state.
//!
//! WASM is single-threaded, so everything lives in `thread_local!` slots and
//! is reached only through the accessors below. The wallet session itself is
//! owned by the [`SessionManager`]; this module just holds the one instance.

use crate::countdown::CountdownTimer;
use crate::ethereum;
use dwat_presale::{DEFAULT_END_DATE, MIN_PURCHASE, presale_terms};
use dwat_provider::Subscription;
use dwat_session::SessionManager;
use dwat_types::{Currency, PresaleTerms};
use gloo_storage::{LocalStorage, Storage};
use std::cell::RefCell;
use std::rc::Rc;

const CURRENCY_KEY: &str = "dwat_presale_currency";

pub struct AppState {
    pub terms: PresaleTerms,
    pub token_amount: u64,
    pub currency: Currency,
    pub wallet_events: Option<Subscription>,
    pub countdown: Option<CountdownTimer>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terms: presale_terms(DEFAULT_END_DATE),
            token_amount: MIN_PURCHASE,
            currency: Currency::Eth,
            wallet_events: None,
            countdown: None,
        }
    }
}

thread_local! {
    static SESSION: Rc<SessionManager> = Rc::new(SessionManager::new(ethereum::locate));
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

pub fn session() -> Rc<SessionManager> {
    SESSION.with(Rc::clone)
}

pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

// ── Convenience accessors ──

pub fn terms() -> PresaleTerms {
    with(|s| s.terms.clone())
}

pub fn set_terms(terms: PresaleTerms) {
    with_mut(|s| s.terms = terms);
}

pub fn order() -> (u64, Currency) {
    with(|s| (s.token_amount, s.currency))
}

pub fn set_token_amount(amount: u64) {
    with_mut(|s| s.token_amount = amount);
}

/// Select `currency` and remember it for the next visit.
pub fn set_currency(currency: Currency) {
    with_mut(|s| s.currency = currency);
    if let Err(err) = LocalStorage::set(CURRENCY_KEY, currency) {
        gloo_console::warn!(format!("could not save currency preference: {err}"));
    }
}

/// Restore the currency chosen on a previous visit, if one was stored.
pub fn restore_currency() {
    if let Ok(currency) = LocalStorage::get::<Currency>(CURRENCY_KEY) {
        with_mut(|s| s.currency = currency);
    }
}

pub fn is_listening() -> bool {
    with(|s| s.wallet_events.is_some())
}

pub fn set_wallet_events(subscription: Subscription) {
    with_mut(|s| s.wallet_events = Some(subscription));
}

/// Replacing the timer drops (and so cancels) the previous one.
pub fn set_countdown(timer: Option<CountdownTimer>) {
    let previous = with_mut(|s| std::mem::replace(&mut s.countdown, timer));
    drop(previous);
}
