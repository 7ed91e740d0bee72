//! DOM element bindings.
//!
//! Every element the site touches is resolved once at startup into
//! [`Elements`]. Missing required nodes fail `bind()` with the element id.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement};

// ── Helpers ──

fn doc() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Ok(nodes) = doc().query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_hidden(el: &Element, hidden: bool) {
    if hidden {
        let _ = el.set_attribute("hidden", "");
    } else {
        let _ = el.remove_attribute("hidden");
    }
}

pub fn data(el: &Element, key: &str) -> Option<String> {
    el.get_attribute(&format!("data-{key}"))
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── Elements struct ──

#[derive(Clone)]
pub struct Elements {
    // Routing
    pub nav_links: Vec<Element>,
    pub pages: Vec<Element>,

    // Wallet session
    pub connect_btn: HtmlButtonElement,
    pub wallet_account: Element,
    pub wallet_chain: Element,
    pub wallet_balance: Element,
    pub wallet_error: Element,

    // Wallet-connect page
    pub wallet_options: Vec<Element>,
    pub wallet_hint: Element,

    // Countdown
    pub countdown: Element,
    pub countdown_cells: Vec<Element>,
    pub presale_status: Element,

    // Purchase form
    pub terms_cells: Vec<Element>,
    pub purchase_amount: HtmlInputElement,
    pub currency_buttons: Vec<Element>,
    pub estimated_cost: Element,
    pub purchase_error: Element,
    pub purchase_btn: HtmlButtonElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_button {
    ($id:expr) => {
        by_id_typed::<HtmlButtonElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing button #{}", $id)))?
    };
}

impl Elements {
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            nav_links: query_all("a[data-nav]"),
            pages: query_all("[data-route]"),

            connect_btn: get_button!("connectWalletBtn"),
            wallet_account: get_el!("walletAccount"),
            wallet_chain: get_el!("walletChain"),
            wallet_balance: get_el!("walletBalance"),
            wallet_error: get_el!("walletError"),

            wallet_options: query_all("[data-wallet]"),
            wallet_hint: get_el!("walletHint"),

            countdown: get_el!("presaleCountdown"),
            countdown_cells: query_all("#presaleCountdown [data-unit]"),
            presale_status: get_el!("presaleStatus"),

            terms_cells: query_all("[data-term]"),
            purchase_amount: get_input!("purchaseAmount"),
            currency_buttons: query_all("[data-currency]"),
            estimated_cost: get_el!("estimatedCost"),
            purchase_error: get_el!("purchaseError"),
            purchase_btn: get_button!("purchaseBtn"),
        })
    }
}
