//! Client-side routing over the History API.
//!
//! Each page is a `[data-route="/path"]` section; exactly one is visible.
//! The presale guard is checked on every navigation, never cached.

use crate::dom::{self, Elements};
use crate::state;
use dwat_session::{WalletSession, resolve_route};
use dwat_types::Route;
use wasm_bindgen::JsValue;

/// Page shown for a location pathname. Unknown paths land on home.
pub fn landing(path: &str, session: &WalletSession) -> Route {
    resolve_route(Route::from_path(path).unwrap_or(Route::Home), session)
}

fn pathname() -> String {
    gloo_utils::window()
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_owned())
}

fn history_update(path: &str, replace: bool) {
    let Ok(history) = gloo_utils::window().history() else {
        return;
    };
    let result = if replace {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if let Err(err) = result {
        gloo_console::error!("history update failed:", err);
    }
}

/// User-initiated navigation; adds a history entry.
pub fn navigate(els: &Elements, requested: Route) {
    let target = resolve_route(requested, &state::session().snapshot());
    if target != requested {
        gloo_console::log!(format!("{} redirected to {}", requested.path(), target.path()));
    }
    if pathname() != target.path() {
        history_update(target.path(), false);
    }
    show(els, target);
}

/// Re-evaluate the current location after start-up, back/forward, or a
/// session change. Redirects replace the current history entry.
pub fn sync(els: &Elements) {
    let path = pathname();
    let target = landing(&path, &state::session().snapshot());
    if path != target.path() {
        history_update(target.path(), true);
    }
    show(els, target);
}

fn show(els: &Elements, route: Route) {
    for page in &els.pages {
        let visible = dom::data(page, "route").as_deref() == Some(route.path());
        dom::set_hidden(page, !visible);
    }
    for link in &els.nav_links {
        let active = dom::data(link, "nav").as_deref() == Some(route.path());
        dom::toggle_class(link, "active", active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwat_types::{ChainId, WalletAddress};

    #[test]
    fn landing_pages() {
        let guest = WalletSession::default();
        assert_eq!(landing("/", &guest), Route::Home);
        assert_eq!(landing("/careers/", &guest), Route::Careers);
        assert_eq!(landing("/presale", &guest), Route::WalletConnect);
        assert_eq!(landing("/no-such-page", &guest), Route::Home);

        let member = WalletSession {
            account: Some(WalletAddress("0xbeef000000000000000000000000000000000001".to_owned())),
            chain_id: Some(ChainId(1)),
            ..WalletSession::default()
        };
        assert_eq!(landing("/presale", &member), Route::Presale);
        assert_eq!(landing("/wallet-connect", &member), Route::Presale);
    }
}
