//! Presale arithmetic: countdown to the sale end and purchase quotes.

pub mod countdown;
pub mod quote;
pub mod terms;

pub use countdown::{Countdown, Tick, time_left};
pub use quote::{AmountError, Rate, estimate_cost, parse_purchase_amount, quote};
pub use terms::{DEFAULT_END_DATE, MAX_PURCHASE, MIN_PURCHASE, TOKEN_SYMBOL, presale_terms};
