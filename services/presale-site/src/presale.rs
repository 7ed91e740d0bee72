use crate::{ApiResult, AppState, bad_request};
use axum::{
    Json,
    extract::{Query, State},
};
use dwat_presale::{parse_purchase_amount, quote as price_quote};
use dwat_types::{Currency, PresaleTerms, PurchaseQuote};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteQuery {
    amount: Option<String>,
    currency: Option<String>,
}

pub(crate) async fn terms(State(state): State<AppState>) -> Json<PresaleTerms> {
    Json(state.terms.as_ref().clone())
}

/// `GET /presale/quote?amount=250&currency=USDT`; currency defaults to ETH.
pub(crate) async fn quote(Query(query): Query<QuoteQuery>) -> ApiResult<PurchaseQuote> {
    let raw_amount = query
        .amount
        .ok_or_else(|| bad_request("amount is required"))?;
    let amount = parse_purchase_amount(&raw_amount).map_err(|e| bad_request(&e.to_string()))?;

    let currency = match query.currency.as_deref() {
        None | Some("") => Currency::Eth,
        Some(raw) => raw
            .parse::<Currency>()
            .map_err(|e| bad_request(&e.to_string()))?,
    };

    let quote = price_quote(amount, currency);
    debug!(
        "quoted {} DWAT in {}: {}",
        quote.token_amount, quote.currency, quote.estimated_cost
    );
    Ok(Json(quote))
}
