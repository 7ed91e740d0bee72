//! DWAT presale front-end.
//!
//! Rust + WASM: binds the static page, adapts `window.ethereum` for the
//! session manager, guards the presale route, and runs the countdown and
//! purchase form.

pub mod api;
pub mod countdown;
pub mod dom;
pub mod ethereum;
pub mod events;
pub mod router;
pub mod state;
pub mod view;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    state::restore_currency();
    view::render_quote(&els);
    view::render_wallet_options(&els, ethereum::detect());

    match api::fetch_terms().await {
        Ok(terms) => state::set_terms(terms),
        Err(err) => gloo_console::warn!(format!("using built-in presale terms: {err}")),
    }
    let terms = state::terms();
    view::render_terms(&els, &terms);

    let end_date = countdown::configured_end_date(&els).unwrap_or(terms.end_date);
    state::set_countdown(countdown::CountdownTimer::start(&els, &end_date));

    listen_to_wallet();
    follow_session(&els);
    events::bind_events(&els);

    Ok(())
}

/// Subscribe the session manager to wallet notifications, once. Without a
/// wallet this is retried after the next successful connect.
pub(crate) fn listen_to_wallet() {
    if state::is_listening() {
        return;
    }
    match state::session().attach(wasm_bindgen_futures::spawn_local) {
        Ok(subscription) => state::set_wallet_events(subscription),
        Err(err) => gloo_console::log!(format!("not following wallet events: {err}")),
    }
}

/// Re-render and re-check the route on every session change.
fn follow_session(els: &dom::Elements) {
    let els = els.clone();
    let mut updates = state::session().subscribe();
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            let session = updates.borrow_and_update().clone();
            view::render_session(&els, &session);
            router::sync(&els);
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
}
