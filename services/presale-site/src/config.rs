use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use dwat_presale::DEFAULT_END_DATE;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STATIC_DIR: &str = "./dist";

/// Startup settings, read once from the environment:
///
/// - `PRESALE_SITE_ADDR` listen address (default `0.0.0.0:8080`)
/// - `PRESALE_STATIC_DIR` built front-end bundle (default `./dist`)
/// - `PRESALE_END_DATE` RFC 3339 instant the sale closes, normalised to UTC
#[derive(Debug, Clone)]
pub(crate) struct SiteConfig {
    pub(crate) addr: SocketAddr,
    pub(crate) static_dir: PathBuf,
    pub(crate) end_date: String,
}

impl SiteConfig {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_addr = lookup("PRESALE_SITE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_owned());
        let addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .with_context(|| format!("invalid PRESALE_SITE_ADDR '{raw_addr}'"))?;

        let static_dir = lookup("PRESALE_STATIC_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_owned());

        let raw_end_date = lookup("PRESALE_END_DATE")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_END_DATE.to_owned());
        let end_date = normalize_end_date(&raw_end_date).with_context(|| {
            format!("PRESALE_END_DATE must be an RFC 3339 instant, got '{raw_end_date}'")
        })?;

        Ok(Self {
            addr,
            static_dir: PathBuf::from(static_dir),
            end_date,
        })
    }
}

/// Parse and re-emit as `YYYY-MM-DDTHH:MM:SSZ`, which every browser's
/// `Date.parse` accepts.
fn normalize_end_date(raw: &str) -> Result<String, chrono::ParseError> {
    let instant = DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc);
    Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<SiteConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        SiteConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.static_dir, PathBuf::from("./dist"));
        assert_eq!(config.end_date, DEFAULT_END_DATE);
    }

    #[test]
    fn overrides_apply() {
        let config = config_from(&[
            ("PRESALE_SITE_ADDR", "127.0.0.1:3000"),
            ("PRESALE_STATIC_DIR", "/srv/site"),
            ("PRESALE_END_DATE", "2025-06-30T12:00:00+02:00"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.static_dir, PathBuf::from("/srv/site"));
        assert_eq!(config.end_date, "2025-06-30T10:00:00Z");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("PRESALE_SITE_ADDR", "localhost")]).is_err());
        assert!(config_from(&[("PRESALE_END_DATE", "next tuesday")]).is_err());
        assert!(config_from(&[("PRESALE_END_DATE", "2024-12-31")]).is_err());
    }

    #[test]
    fn rejects_impossible_end_dates() {
        for raw in [
            "2024-99-99Tgarbage!-",
            "0000-00-00T99:99:99Z",
            "2024-02-30T00:00:00Z",
            "2024-12-31T24:00:01Z",
        ] {
            assert!(config_from(&[("PRESALE_END_DATE", raw)]).is_err(), "{raw}");
        }
    }

    #[test]
    fn end_date_is_normalised_to_utc() {
        assert_eq!(
            normalize_end_date("2024-12-31T23:59:59.250-05:00").unwrap(),
            "2025-01-01T04:59:59Z"
        );
        assert_eq!(normalize_end_date(DEFAULT_END_DATE).unwrap(), DEFAULT_END_DATE);
    }
}
