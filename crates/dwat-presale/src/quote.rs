use crate::terms::{MAX_PURCHASE, MIN_PURCHASE};
use dwat_types::{Currency, PurchaseQuote};

/// Rates are stored as integer billionths of the settlement currency per
/// token, so quotes never touch floating point.
const RATE_SCALE: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    nanos: u64,
}

impl Rate {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    pub fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Static presale price of one DWAT.
    pub fn of(currency: Currency) -> Rate {
        match currency {
            // 0.00003 ETH
            Currency::Eth => Rate::from_nanos(30_000),
            // 0.05 USD
            Currency::Usdt | Currency::Usdc => Rate::from_nanos(50_000_000),
        }
    }
}

pub fn display_decimals(currency: Currency) -> u32 {
    if currency.is_stable() { 2 } else { 6 }
}

/// `token_amount × rate(currency)`, rounded half-up to the currency's
/// display precision.
pub fn estimate_cost(token_amount: u64, currency: Currency) -> String {
    let scaled = u128::from(token_amount) * u128::from(Rate::of(currency).nanos());
    format_scaled(scaled, RATE_SCALE, display_decimals(currency))
}

pub fn quote(token_amount: u64, currency: Currency) -> PurchaseQuote {
    PurchaseQuote {
        token_amount,
        currency,
        estimated_cost: estimate_cost(token_amount, currency),
    }
}

fn format_scaled(value: u128, scale: u32, decimals: u32) -> String {
    let decimals = decimals.min(scale);
    let divisor = 10_u128.pow(scale - decimals);
    let rounded = (value + divisor / 2) / divisor;

    if decimals == 0 {
        return rounded.to_string();
    }
    let unit = 10_u128.pow(decimals);
    format!(
        "{}.{:0width$}",
        rounded / unit,
        rounded % unit,
        width = decimals as usize
    )
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("enter a whole number of tokens")]
    NotANumber,
    #[error("minimum purchase is {} DWAT", MIN_PURCHASE)]
    BelowMinimum,
    #[error("maximum purchase is {} DWAT", MAX_PURCHASE)]
    AboveMaximum,
}

/// Validate raw purchase-form input before it reaches [`quote`].
pub fn parse_purchase_amount(input: &str) -> Result<u64, AmountError> {
    let amount: u64 = input
        .trim()
        .parse()
        .map_err(|_| AmountError::NotANumber)?;
    if amount < MIN_PURCHASE {
        return Err(AmountError::BelowMinimum);
    }
    if amount > MAX_PURCHASE {
        return Err(AmountError::AboveMaximum);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eth_quotes_use_six_decimals() {
        assert_eq!(estimate_cost(100, Currency::Eth), "0.003000");
        assert_eq!(estimate_cost(1_000_000, Currency::Eth), "30.000000");
        assert_eq!(estimate_cost(12_345, Currency::Eth), "0.370350");
    }

    #[test]
    fn stable_quotes_use_two_decimals() {
        assert_eq!(estimate_cost(250, Currency::Usdt), "12.50");
        assert_eq!(estimate_cost(100, Currency::Usdc), "5.00");
        assert_eq!(estimate_cost(101, Currency::Usdt), "5.05");
    }

    #[test]
    fn cost_is_monotonic_in_amount() {
        for currency in Currency::ALL {
            let mut previous = 0_u128;
            for amount in (MIN_PURCHASE..5_000).step_by(37).chain([MAX_PURCHASE]) {
                let cost = estimate_cost(amount, currency);
                let as_units: u128 = cost.replace('.', "").parse().unwrap();
                assert!(as_units >= previous, "{currency} {amount} -> {cost}");
                previous = as_units;
            }
        }
    }

    #[test]
    fn quote_carries_inputs() {
        let q = quote(250, Currency::Usdt);
        assert_eq!(q.token_amount, 250);
        assert_eq!(q.currency, Currency::Usdt);
        assert_eq!(q.estimated_cost, "12.50");
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(format_scaled(1_005_000_000, 9, 2), "1.01");
        assert_eq!(format_scaled(1_004_999_999, 9, 2), "1.00");
        assert_eq!(format_scaled(7_500_000_000, 9, 0), "8");
    }

    #[test]
    fn purchase_input_validation() {
        assert_eq!(parse_purchase_amount("100"), Ok(100));
        assert_eq!(parse_purchase_amount(" 2500 "), Ok(2_500));
        assert_eq!(parse_purchase_amount("99"), Err(AmountError::BelowMinimum));
        assert_eq!(parse_purchase_amount("1000001"), Err(AmountError::AboveMaximum));
        assert_eq!(parse_purchase_amount("12.5"), Err(AmountError::NotANumber));
        assert_eq!(parse_purchase_amount("-100"), Err(AmountError::NotANumber));
        assert_eq!(parse_purchase_amount(""), Err(AmountError::NotANumber));
        assert_eq!(
            AmountError::BelowMinimum.to_string(),
            "minimum purchase is 100 DWAT"
        );
    }
}
