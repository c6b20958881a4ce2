use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::api::{PriceSource, Quote};
use crate::error::{PriceWatchError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_open: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<OhlcSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct OhlcSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily quotes from the Yahoo Finance v8 chart endpoint.
#[derive(Clone)]
pub struct YahooChartSource {
    http: Client,
    url: Url,
}

impl YahooChartSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let url = Url::parse(&url).map_err(|e| {
            PriceWatchError::Config(format!("invalid price source URL '{}': {}", url, e))
        })?;
        if url.cannot_be_a_base() {
            return Err(PriceWatchError::Config(format!(
                "price source URL '{}' cannot carry a path",
                url
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { http, url })
    }

    /// The symbol is pushed as a single path segment, so `/`, `?` and `#`
    /// are percent-encoded instead of reshaping the request.
    fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart"])
                .push(symbol);
        }
        url
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        let body = self
            .http
            .get(self.chart_url(symbol))
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?
            .text()
            .await?;

        let quote = parse_chart(symbol, &body)?;
        debug!(
            "{} fetched: price = {}, open = {}, currency = {:?}",
            quote.symbol, quote.current_price, quote.opening_price, quote.currency
        );
        Ok(quote)
    }
}

/// Extracts a quote from a chart response body.
///
/// Yahoo answers unknown tickers with a 404 whose body still carries a
/// `chart.error` object, so the status code is not checked before parsing.
fn parse_chart(symbol: &str, body: &str) -> Result<Quote> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(PriceWatchError::UnknownSymbol {
            symbol: symbol.to_string(),
            reason: err.description.unwrap_or(err.code),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| PriceWatchError::UnknownSymbol {
            symbol: symbol.to_string(),
            reason: "empty chart result".to_string(),
        })?;

    let series = result.indicators.quote.into_iter().next().unwrap_or_default();

    let current_price = result
        .meta
        .regular_market_price
        .or_else(|| series.close.iter().rev().flatten().next().copied())
        .ok_or_else(|| missing(symbol, "regularMarketPrice"))?;

    let opening_price = series
        .open
        .iter()
        .flatten()
        .next()
        .copied()
        .or(result.meta.regular_market_open)
        .ok_or_else(|| missing(symbol, "open"))?;

    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(missing(symbol, "regularMarketPrice"));
    }
    if !opening_price.is_finite() || opening_price <= 0.0 {
        return Err(missing(symbol, "open"));
    }

    Ok(Quote {
        symbol: result.meta.symbol.unwrap_or_else(|| symbol.to_string()),
        current_price,
        opening_price,
        currency: result.meta.currency,
    })
}

fn missing(symbol: &str, field: &'static str) -> PriceWatchError {
    PriceWatchError::MissingField {
        symbol: symbol.to_string(),
        field,
    }
}
