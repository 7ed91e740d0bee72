//! Calls to the site server.

use dwat_types::PresaleTerms;
use gloo_net::http::Request;

/// Live sale terms from `GET /presale/terms`.
pub async fn fetch_terms() -> Result<PresaleTerms, String> {
    let response = Request::get("/presale/terms")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !response.ok() {
        return Err(format!("terms request failed with HTTP {}", response.status()));
    }
    response
        .json::<PresaleTerms>()
        .await
        .map_err(|e| format!("invalid terms payload: {e}"))
}
