//! `window.ethereum` adapter.
//!
//! Wraps the injected EIP-1193 object as a [`WalletProvider`]. The object is
//! looked up on every [`locate`] call so a wallet injected after page load is
//! still found.

use async_trait::async_trait;
use dwat_provider::{
    ACCOUNTS_CHANGED, CHAIN_CHANGED, EventHandler, ProviderError, ProviderEvent, Subscription,
    WalletProvider,
};
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

type Listener = (&'static str, Closure<dyn FnMut(JsValue)>);

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

pub struct Eip1193Provider {
    ethereum: JsValue,
}

impl Eip1193Provider {
    pub fn from_window() -> Option<Self> {
        let ethereum = Reflect::get(&gloo_utils::window(), &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum })
    }

    fn method(&self, name: &str) -> Result<Function, ProviderError> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::Host(format!("wallet provider has no {name}()")))
    }

    fn flag(&self, name: &str) -> bool {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Locator handed to the session manager.
pub fn locate() -> Option<Rc<dyn WalletProvider>> {
    Eip1193Provider::from_window().map(|provider| Rc::new(provider) as Rc<dyn WalletProvider>)
}

/// Which wallet extension injected the provider, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletFlags {
    pub installed: bool,
    pub is_meta_mask: bool,
    pub is_coinbase_wallet: bool,
}

impl WalletFlags {
    /// Whether the wallet option with the given `data-wallet` key is usable.
    pub fn offers(&self, option: &str) -> bool {
        match option {
            "metamask" => self.is_meta_mask,
            "coinbase" => self.is_coinbase_wallet,
            _ => false,
        }
    }
}

pub fn detect() -> WalletFlags {
    match Eip1193Provider::from_window() {
        Some(provider) => WalletFlags {
            installed: true,
            is_meta_mask: provider.flag("isMetaMask"),
            is_coinbase_wallet: provider.flag("isCoinbaseWallet"),
        },
        None => WalletFlags::default(),
    }
}

#[async_trait(?Send)]
impl WalletProvider for Eip1193Provider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = RequestArguments {
            method,
            params: &params,
        }
        .serialize(&serializer)
        .map_err(|err| ProviderError::Host(err.to_string()))?;

        let pending = self
            .method("request")?
            .call1(&self.ethereum, &args)
            .map_err(host_error)?;
        let promise: Promise = pending
            .dyn_into()
            .map_err(|_| ProviderError::Host("request() did not return a promise".to_owned()))?;
        let result = JsFuture::from(promise).await.map_err(host_error)?;

        if result.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|err| ProviderError::Host(err.to_string()))
    }

    fn listen(&self, handler: EventHandler) -> Result<Subscription, ProviderError> {
        let on = self.method("on")?;
        let remove = self.method("removeListener")?;

        let mut listeners: Vec<Listener> = Vec::with_capacity(2);
        for event in [ACCOUNTS_CHANGED, CHAIN_CHANGED] {
            let handler = handler.clone();
            let callback = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
                let payload: Value = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
                match ProviderEvent::decode(event, payload) {
                    Some(decoded) => handler(decoded),
                    None => gloo_console::warn!(format!("ignoring malformed {event} notification")),
                }
            });
            if let Err(err) = on.call2(&self.ethereum, &JsValue::from_str(event), callback.as_ref()) {
                unregister(&remove, &self.ethereum, &listeners);
                return Err(host_error(err));
            }
            listeners.push((event, callback));
        }

        let ethereum = self.ethereum.clone();
        Ok(Subscription::new(move || {
            unregister(&remove, &ethereum, &listeners);
        }))
    }
}

fn unregister(remove: &Function, ethereum: &JsValue, listeners: &[Listener]) {
    for (event, callback) in listeners {
        let _ = remove.call2(ethereum, &JsValue::from_str(event), callback.as_ref());
    }
}

/// Rejections from the wallet are `{code, message}` objects; anything else
/// becomes a host error.
fn host_error(err: JsValue) -> ProviderError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok();
    let code = field("code").and_then(|v| v.as_f64());
    let message = field("message").and_then(|v| v.as_string());

    match (code, message) {
        (Some(code), Some(message)) => ProviderError::rpc(code as i64, message),
        (None, Some(message)) => ProviderError::Host(message),
        _ => ProviderError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_options_follow_flags() {
        let metamask = WalletFlags {
            installed: true,
            is_meta_mask: true,
            is_coinbase_wallet: false,
        };
        assert!(metamask.offers("metamask"));
        assert!(!metamask.offers("coinbase"));
        assert!(!metamask.offers("walletconnect"));
        assert!(!WalletFlags::default().offers("metamask"));
    }
}
