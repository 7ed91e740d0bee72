use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of wei in one ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("quantity must be 0x-prefixed hex, got '{0}'")]
    MissingPrefix(String),
    #[error("invalid hex quantity '{0}'")]
    Invalid(String),
    #[error("chain id must be positive")]
    ZeroChainId,
}

/// Parse an EIP-1474 hex quantity (`"0x1a"`) into an integer.
pub fn parse_hex_quantity(raw: &str) -> Result<u128, QuantityError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| QuantityError::MissingPrefix(raw.to_owned()))?;
    if digits.is_empty() {
        return Err(QuantityError::Invalid(raw.to_owned()));
    }
    u128::from_str_radix(digits, 16).map_err(|_| QuantityError::Invalid(raw.to_owned()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Addresses are hex; checksum casing does not change identity.
    pub fn same_as(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// `0x1234...abcd` form used in the navbar and purchase card.
    pub fn short(&self) -> String {
        if self.0.len() < 10 || !self.0.is_ascii() {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Decode the hex chain id carried by `eth_chainId` and `chainChanged`.
    pub fn from_hex(raw: &str) -> Result<Self, QuantityError> {
        let value = parse_hex_quantity(raw)?;
        let value = u64::try_from(value).map_err(|_| QuantityError::Invalid(raw.to_owned()))?;
        if value == 0 {
            return Err(QuantityError::ZeroChainId);
        }
        Ok(Self(value))
    }

    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("Ethereum Mainnet"),
            10 => Some("Optimism"),
            56 => Some("BNB Smart Chain"),
            137 => Some("Polygon"),
            8453 => Some("Base"),
            42161 => Some("Arbitrum One"),
            11155111 => Some("Sepolia"),
            _ => None,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "chain {}", self.0),
        }
    }
}

/// Native balance in the smallest unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Wei(pub u128);

impl Wei {
    pub fn from_hex(raw: &str) -> Result<Self, QuantityError> {
        parse_hex_quantity(raw).map(Self)
    }

    /// Whole-unit decimal string: `1500000000000000000` becomes `"1.5"`,
    /// zero becomes `"0.0"`. Trailing fractional zeros are dropped but at
    /// least one fractional digit is kept.
    pub fn to_ether_string(&self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let frac = self.0 % WEI_PER_ETHER;
        let frac = format!("{frac:018}");
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            format!("{whole}.0")
        } else {
            format!("{whole}.{frac}")
        }
    }
}

/// Settlement currencies accepted by the presale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Currency {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "USDC")]
    Usdc,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eth, Currency::Usdt, Currency::Usdc];

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eth => "ETH",
            Currency::Usdt => "USDT",
            Currency::Usdc => "USDC",
        }
    }

    /// Stablecoins are quoted in cents; the base-layer coin in micro units.
    pub fn is_stable(&self) -> bool {
        matches!(self, Currency::Usdt | Currency::Usdc)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency '{0}'")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ETH" => Ok(Currency::Eth),
            "USDT" => Ok(Currency::Usdt),
            "USDC" => Ok(Currency::Usdc),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseQuote {
    pub token_amount: u64,
    pub currency: Currency,
    pub estimated_cost: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    pub const ZERO: TimeLeft = TimeLeft {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresaleTerms {
    pub symbol: String,
    pub total_supply: String,
    pub presale_allocation: String,
    pub initial_price: String,
    pub expected_launch_price: String,
    pub min_purchase: u64,
    pub max_purchase: u64,
    pub accepted_currencies: Vec<Currency>,
    pub end_date: String,
}

/// Navigable pages of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Careers,
    WalletConnect,
    Presale,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::About,
        Route::Careers,
        Route::WalletConnect,
        Route::Presale,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Careers => "/careers",
            Route::WalletConnect => "/wallet-connect",
            Route::Presale => "/presale",
        }
    }

    /// Match a location pathname. Trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_quantities() {
        assert_eq!(parse_hex_quantity("0x0"), Ok(0));
        assert_eq!(parse_hex_quantity("0X1f"), Ok(31));
        assert!(matches!(parse_hex_quantity("12"), Err(QuantityError::MissingPrefix(_))));
        assert!(matches!(parse_hex_quantity("0x"), Err(QuantityError::Invalid(_))));
        assert!(matches!(parse_hex_quantity("0xzz"), Err(QuantityError::Invalid(_))));
    }

    #[test]
    fn chain_id_from_hex() {
        assert_eq!(ChainId::from_hex("0x1"), Ok(ChainId(1)));
        assert_eq!(ChainId::from_hex("0x89"), Ok(ChainId(137)));
        assert_eq!(ChainId::from_hex("0x0"), Err(QuantityError::ZeroChainId));
        assert_eq!(ChainId(137).to_string(), "Polygon (137)");
        assert_eq!(ChainId(999).to_string(), "chain 999");
    }

    #[test]
    fn wei_formats_as_ether() {
        assert_eq!(Wei(0).to_ether_string(), "0.0");
        assert_eq!(Wei(WEI_PER_ETHER).to_ether_string(), "1.0");
        assert_eq!(Wei(1_500_000_000_000_000_000).to_ether_string(), "1.5");
        assert_eq!(Wei(1).to_ether_string(), "0.000000000000000001");
        assert_eq!(
            Wei::from_hex("0xde0b6b3a7640000").map(|w| w.to_ether_string()),
            Ok("1.0".to_owned())
        );
    }

    #[test]
    fn short_address() {
        let addr = WalletAddress("0x1234567890123456789012345678901234567890".to_owned());
        assert_eq!(addr.short(), "0x1234...7890");
        assert_eq!(WalletAddress("0x12".to_owned()).short(), "0x12");
        assert!(addr.same_as(&WalletAddress(addr.0.to_ascii_uppercase().replace("0X", "0x"))));
    }

    #[test]
    fn currency_parsing_and_serde() {
        assert_eq!("eth".parse::<Currency>(), Ok(Currency::Eth));
        assert_eq!(" USDC ".parse::<Currency>(), Ok(Currency::Usdc));
        assert!("DOGE".parse::<Currency>().is_err());
        assert_eq!(serde_json::to_string(&Currency::Usdt).unwrap(), "\"USDT\"");
        assert!(Currency::Usdt.is_stable());
        assert!(!Currency::Eth.is_stable());
    }

    #[test]
    fn route_paths() {
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path(""), Some(Route::Home));
        assert_eq!(Route::from_path("/presale/"), Some(Route::Presale));
        assert_eq!(Route::from_path("/wallet-connect"), Some(Route::WalletConnect));
        assert_eq!(Route::from_path("/nowhere"), None);
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn time_left_total() {
        let left = TimeLeft {
            days: 1,
            hours: 1,
            minutes: 1,
            seconds: 1,
        };
        assert_eq!(left.total_seconds(), 90_061);
        assert_eq!(TimeLeft::default(), TimeLeft::ZERO);
    }
}
