//! Event binding.
//!
//! Wires every listener once after start-up. Async handlers are spawned with
//! `wasm_bindgen_futures::spawn_local`; the closures live for the page.

use crate::dom::{self, Elements};
use crate::router;
use crate::state;
use crate::view;
use dwat_presale::{parse_purchase_amount, quote};
use dwat_session::ConnectOutcome;
use dwat_types::{Currency, Route};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Attach a click handler for the life of the page.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        if let Err(err) = $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref()) {
            gloo_console::error!("failed to bind click handler:", err);
        }
        cb.forget();
    }};
}

pub fn bind_events(els: &Elements) {
    // ── Navigation ──
    for link in &els.nav_links {
        let Some(route) = dom::data(link, "nav").and_then(|path| Route::from_path(&path)) else {
            continue;
        };
        let els2 = els.clone();
        on_click!(link, move |event: web_sys::MouseEvent| {
            event.prevent_default();
            router::navigate(&els2, route);
        });
    }
    {
        let els2 = els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::PopStateEvent| {
            router::sync(&els2);
        }) as Box<dyn FnMut(_)>);
        if let Err(err) = gloo_utils::window()
            .add_event_listener_with_callback("popstate", cb.as_ref().unchecked_ref())
        {
            gloo_console::error!("failed to bind popstate:", err);
        }
        cb.forget();
    }

    // ── Wallet ──
    on_click!(els.connect_btn, move |_: web_sys::MouseEvent| {
        let session = state::session();
        if session.is_connected() {
            session.disconnect();
            gloo_console::log!("wallet disconnected");
        } else {
            wasm_bindgen_futures::spawn_local(connect_wallet());
        }
    });
    for option in &els.wallet_options {
        on_click!(option, move |_: web_sys::MouseEvent| {
            wasm_bindgen_futures::spawn_local(connect_wallet());
        });
    }

    // ── Purchase form ──
    {
        let els2 = els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            on_amount_input(&els2);
        }) as Box<dyn FnMut(_)>);
        if let Err(err) = els
            .purchase_amount
            .add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())
        {
            gloo_console::error!("failed to bind amount input:", err);
        }
        cb.forget();
    }
    for button in &els.currency_buttons {
        let Some(currency) = dom::data(button, "currency").and_then(|c| c.parse::<Currency>().ok())
        else {
            continue;
        };
        let els2 = els.clone();
        on_click!(button, move |_: web_sys::MouseEvent| {
            state::set_currency(currency);
            view::render_quote(&els2);
        });
    }
    {
        let els2 = els.clone();
        on_click!(els.purchase_btn, move |_: web_sys::MouseEvent| {
            on_purchase(&els2);
        });
    }
}

/// Connect through the session manager and start following wallet
/// notifications once a wallet answers.
pub async fn connect_wallet() {
    match state::session().connect().await {
        Ok(ConnectOutcome::Connected(account)) => {
            gloo_console::log!(format!("wallet connected: {account}"));
            crate::listen_to_wallet();
        }
        Ok(ConnectOutcome::AlreadyConnecting) => {}
        Ok(ConnectOutcome::Superseded) => {
            gloo_console::log!("wallet connect discarded after disconnect");
        }
        Err(err) => gloo_console::warn!(format!("wallet connect failed: {err}")),
    }
}

/// Invalid input keeps the previous amount and shows why.
fn on_amount_input(els: &Elements) {
    match parse_purchase_amount(&els.purchase_amount.value()) {
        Ok(amount) => {
            state::set_token_amount(amount);
            view::show_purchase_error(els, None);
            view::render_quote(els);
        }
        Err(err) => view::show_purchase_error(els, Some(&err.to_string())),
    }
}

/// Purchases are not submitted on-chain; the request is only logged.
fn on_purchase(els: &Elements) {
    let session = state::session().snapshot();
    let Some(account) = session.account else {
        router::navigate(els, Route::WalletConnect);
        return;
    };
    let (amount, currency) = state::order();
    let quote = quote(amount, currency);
    gloo_console::log!(format!(
        "purchase requested: {} DWAT for {} {} from {}",
        quote.token_amount, quote.estimated_cost, quote.currency, account
    ));
}
