use std::str::FromStr;
use std::time::Duration;

use crate::error::{PriceWatchError, Result};

const DEFAULT_SYMBOLS: &str = "HCMC,ATVK,ACB";
const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
const MAX_DECIMAL_PLACES: u32 = 10;

/// Alert throttling parameters shared by every instrument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertSettings {
    /// Minimum absolute move, in percent, since the last announced price.
    pub threshold_percent: f64,
    /// Number of decimal places percentages are rounded to.
    pub decimal_places: u32,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            threshold_percent: 5.0,
            decimal_places: 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SignalSettings {
    /// Messaging CLI program, looked up on `PATH` when not absolute.
    pub program: String,
    /// Sender identity, a phone number in international format.
    pub username: String,
    /// Destination group ids.
    pub groups: Vec<String>,
}

/// Static configuration, built once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub symbols: Vec<String>,
    pub alerts: AlertSettings,
    pub poll_interval: Duration,
    pub verbose: bool,

    // =========================
    // Price source
    // =========================
    pub yahoo_url: String,
    /// Upper bound on a single quote request. A timed out fetch is treated
    /// like any other fetch failure.
    pub http_timeout: Duration,

    // =========================
    // Notifier
    // =========================
    pub signal: SignalSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let symbols = parse_symbols(
            &var("PRICEWATCH_SYMBOLS").unwrap_or_else(|| DEFAULT_SYMBOLS.to_string()),
        );
        if symbols.is_empty() {
            return Err(PriceWatchError::Config(
                "PRICEWATCH_SYMBOLS must name at least one ticker".to_string(),
            ));
        }

        let threshold_percent: f64 =
            parse_or("PRICEWATCH_ALERT_PERCENT", var("PRICEWATCH_ALERT_PERCENT"), 5.0)?;
        if !threshold_percent.is_finite() || threshold_percent <= 0.0 {
            return Err(PriceWatchError::Config(format!(
                "PRICEWATCH_ALERT_PERCENT must be positive, got {}",
                threshold_percent
            )));
        }

        let decimal_places: u32 =
            parse_or("PRICEWATCH_DECIMAL_PLACES", var("PRICEWATCH_DECIMAL_PLACES"), 2)?;
        if decimal_places > MAX_DECIMAL_PLACES {
            return Err(PriceWatchError::Config(format!(
                "PRICEWATCH_DECIMAL_PLACES must be at most {}, got {}",
                MAX_DECIMAL_PLACES, decimal_places
            )));
        }

        let interval_secs: u64 =
            parse_or("PRICEWATCH_INTERVAL_SECS", var("PRICEWATCH_INTERVAL_SECS"), 60)?;
        let timeout_secs: u64 =
            parse_or("PRICEWATCH_HTTP_TIMEOUT_SECS", var("PRICEWATCH_HTTP_TIMEOUT_SECS"), 10)?;
        if interval_secs == 0 || timeout_secs == 0 {
            return Err(PriceWatchError::Config(
                "poll interval and HTTP timeout must be non-zero".to_string(),
            ));
        }

        let verbose = var("PRICEWATCH_VERBOSE").map_or(false, |v| is_truthy(&v));

        let username = var("SIGNAL_CLI_USERNAME")
            .ok_or_else(|| PriceWatchError::Config("SIGNAL_CLI_USERNAME is not set".to_string()))?;
        let groups: Vec<String> = var("SIGNAL_CLI_GROUPS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        if groups.is_empty() {
            return Err(PriceWatchError::Config("SIGNAL_CLI_GROUPS is not set".to_string()));
        }

        Ok(Self {
            symbols,
            alerts: AlertSettings {
                threshold_percent,
                decimal_places,
            },
            poll_interval: Duration::from_secs(interval_secs),
            verbose,
            yahoo_url: var("PRICEWATCH_YAHOO_URL")
                .unwrap_or_else(|| DEFAULT_YAHOO_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            http_timeout: Duration::from_secs(timeout_secs),
            signal: SignalSettings {
                program: var("SIGNAL_CLI_BIN").unwrap_or_else(|| "signal-cli".to_string()),
                username,
                groups,
            },
        })
    }
}

fn parse_symbols(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
    {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| PriceWatchError::Config(format!("{} = '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const SIGNAL: [(&str, &str); 2] = [
        ("SIGNAL_CLI_USERNAME", "+15550001111"),
        ("SIGNAL_CLI_GROUPS", "groupA groupB"),
    ];

    #[test]
    fn defaults_apply_when_only_signal_is_set() {
        let config = Config::from_lookup(lookup(&SIGNAL)).unwrap();

        assert_eq!(config.symbols, vec!["HCMC", "ATVK", "ACB"]);
        assert_eq!(config.alerts, AlertSettings::default());
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.yahoo_url, DEFAULT_YAHOO_URL);
        assert!(!config.verbose);
        assert_eq!(config.signal.program, "signal-cli");
        assert_eq!(config.signal.groups, vec!["groupA", "groupB"]);
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = SIGNAL.to_vec();
        pairs.extend([
            ("PRICEWATCH_SYMBOLS", "acb, tlry  acb"),
            ("PRICEWATCH_ALERT_PERCENT", "2.5"),
            ("PRICEWATCH_DECIMAL_PLACES", "0"),
            ("PRICEWATCH_INTERVAL_SECS", "15"),
            ("PRICEWATCH_VERBOSE", "Yes"),
            ("PRICEWATCH_YAHOO_URL", "http://localhost:8080/"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.symbols, vec!["ACB", "TLRY"]);
        assert_eq!(config.alerts.threshold_percent, 2.5);
        assert_eq!(config.alerts.decimal_places, 0);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert!(config.verbose);
        assert_eq!(config.yahoo_url, "http://localhost:8080");
    }

    #[test]
    fn missing_signal_identity_is_rejected() {
        let err = Config::from_lookup(lookup(&[("SIGNAL_CLI_GROUPS", "g")])).unwrap_err();
        assert!(matches!(err, PriceWatchError::Config(msg) if msg.contains("SIGNAL_CLI_USERNAME")));

        let err = Config::from_lookup(lookup(&[("SIGNAL_CLI_USERNAME", "+1")])).unwrap_err();
        assert!(matches!(err, PriceWatchError::Config(msg) if msg.contains("SIGNAL_CLI_GROUPS")));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        for (key, value) in [
            ("PRICEWATCH_ALERT_PERCENT", "five"),
            ("PRICEWATCH_ALERT_PERCENT", "0"),
            ("PRICEWATCH_ALERT_PERCENT", "-3"),
            ("PRICEWATCH_DECIMAL_PLACES", "-1"),
            ("PRICEWATCH_DECIMAL_PLACES", "11"),
            ("PRICEWATCH_INTERVAL_SECS", "0"),
        ] {
            let mut pairs = SIGNAL.to_vec();
            pairs.push((key, value));
            assert!(
                Config::from_lookup(lookup(&pairs)).is_err(),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn separators_only_symbol_list_is_rejected() {
        let mut pairs = SIGNAL.to_vec();
        pairs.push(("PRICEWATCH_SYMBOLS", " , ,"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }
}
