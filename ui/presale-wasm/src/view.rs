//! Rendering of session, wallet options, terms, and the purchase quote.

use crate::dom::{self, Elements};
use crate::ethereum::WalletFlags;
use crate::state;
use dwat_presale::quote;
use dwat_session::WalletSession;
use dwat_types::PresaleTerms;

pub fn connect_label(session: &WalletSession) -> &'static str {
    if session.connecting {
        "Connecting..."
    } else if session.is_connected() {
        "Disconnect"
    } else {
        "Connect Wallet"
    }
}

pub fn render_session(els: &Elements, session: &WalletSession) {
    dom::set_text(&els.connect_btn, connect_label(session));
    els.connect_btn.set_disabled(session.connecting);

    let account = session
        .account
        .as_ref()
        .map(|a| a.short())
        .unwrap_or_else(|| "Not connected".to_owned());
    dom::set_text(&els.wallet_account, &account);
    dom::set_text(
        &els.wallet_chain,
        &session.chain_id.map(|c| c.to_string()).unwrap_or_default(),
    );
    dom::set_text(
        &els.wallet_balance,
        &session
            .balance
            .as_ref()
            .map(|b| format!("{b} ETH"))
            .unwrap_or_default(),
    );

    match &session.last_error {
        Some(message) => {
            dom::set_text(&els.wallet_error, message);
            dom::set_hidden(&els.wallet_error, false);
        }
        None => dom::set_hidden(&els.wallet_error, true),
    }

    let ended = els.countdown.class_list().contains("ended");
    els.purchase_btn
        .set_disabled(ended || !session.is_connected());
}

pub fn render_wallet_options(els: &Elements, flags: WalletFlags) {
    for option in &els.wallet_options {
        let key = dom::data(option, "wallet").unwrap_or_default();
        dom::toggle_class(option, "unavailable", !flags.offers(&key));
    }
    let hint = if flags.installed {
        ""
    } else {
        "No wallet extension detected. Install MetaMask to continue."
    };
    dom::set_text(&els.wallet_hint, hint);
}

/// Text for a `[data-term]` cell.
pub fn term_value(terms: &PresaleTerms, key: &str) -> Option<String> {
    let value = match key {
        "symbol" => terms.symbol.clone(),
        "total_supply" => terms.total_supply.clone(),
        "presale_allocation" => terms.presale_allocation.clone(),
        "initial_price" => terms.initial_price.clone(),
        "expected_launch_price" => terms.expected_launch_price.clone(),
        "min_purchase" => format!("{} {}", terms.min_purchase, terms.symbol),
        "max_purchase" => format!("{} {}", terms.max_purchase, terms.symbol),
        "accepted_currencies" => terms
            .accepted_currencies
            .iter()
            .map(|c| c.symbol())
            .collect::<Vec<_>>()
            .join(", "),
        "end_date" => terms.end_date.clone(),
        _ => return None,
    };
    Some(value)
}

pub fn render_terms(els: &Elements, terms: &PresaleTerms) {
    for cell in &els.terms_cells {
        let Some(key) = dom::data(cell, "term") else {
            continue;
        };
        if let Some(value) = term_value(terms, &key) {
            dom::set_text(cell, &value);
        }
    }
}

pub fn render_quote(els: &Elements) {
    let (amount, currency) = state::order();
    let quote = quote(amount, currency);
    dom::set_text(
        &els.estimated_cost,
        &format!("{} {}", quote.estimated_cost, quote.currency),
    );
    for button in &els.currency_buttons {
        let selected = dom::data(button, "currency").as_deref() == Some(currency.symbol());
        dom::toggle_class(button, "selected", selected);
    }
}

pub fn show_purchase_error(els: &Elements, message: Option<&str>) {
    match message {
        Some(message) => {
            dom::set_text(&els.purchase_error, message);
            dom::set_hidden(&els.purchase_error, false);
        }
        None => dom::set_hidden(&els.purchase_error, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwat_presale::{DEFAULT_END_DATE, presale_terms};
    use dwat_types::WalletAddress;

    #[test]
    fn button_label_tracks_session() {
        let mut session = WalletSession::default();
        assert_eq!(connect_label(&session), "Connect Wallet");

        session.connecting = true;
        assert_eq!(connect_label(&session), "Connecting...");

        session.connecting = false;
        session.account = Some(WalletAddress("0x1234567890abcdef1234567890abcdef12345678".to_owned()));
        assert_eq!(connect_label(&session), "Disconnect");
    }

    #[test]
    fn term_cells() {
        let terms = presale_terms(DEFAULT_END_DATE);
        assert_eq!(term_value(&terms, "min_purchase").as_deref(), Some("100 DWAT"));
        assert_eq!(
            term_value(&terms, "accepted_currencies").as_deref(),
            Some("ETH, USDT, USDC")
        );
        assert_eq!(term_value(&terms, "initial_price").as_deref(), Some("$0.05"));
        assert_eq!(term_value(&terms, "bogus"), None);
    }
}
