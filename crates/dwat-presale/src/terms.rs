use dwat_types::{Currency, PresaleTerms};

pub const TOKEN_SYMBOL: &str = "DWAT";
pub const MIN_PURCHASE: u64 = 100;
pub const MAX_PURCHASE: u64 = 1_000_000;
pub const DEFAULT_END_DATE: &str = "2024-12-31T23:59:59Z";

/// Public sale terms shown on the presale page.
pub fn presale_terms(end_date: &str) -> PresaleTerms {
    PresaleTerms {
        symbol: TOKEN_SYMBOL.to_owned(),
        total_supply: "1,000,000,000".to_owned(),
        presale_allocation: "300,000,000".to_owned(),
        initial_price: "$0.05".to_owned(),
        expected_launch_price: "$0.15".to_owned(),
        min_purchase: MIN_PURCHASE,
        max_purchase: MAX_PURCHASE,
        accepted_currencies: Currency::ALL.to_vec(),
        end_date: end_date.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_list_every_currency() {
        let terms = presale_terms(DEFAULT_END_DATE);
        assert_eq!(terms.symbol, "DWAT");
        assert_eq!(terms.accepted_currencies, vec![Currency::Eth, Currency::Usdt, Currency::Usdc]);
        assert!(terms.min_purchase < terms.max_purchase);
        assert_eq!(terms.end_date, "2024-12-31T23:59:59Z");
    }
}
