use log::{debug, info, warn};

use crate::api::{PriceSource, Quote};
use crate::config::AlertSettings;
use crate::error::Result;
use crate::tracker::alerts::{AlertEvent, Direction};

/// Per-symbol tracking state.
///
/// `last_announced_price` is the throttling baseline: it only moves when an
/// alert fires, never on a plain refresh.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub symbol: String,
    pub current_price: f64,
    pub opening_price: f64,
    pub last_announced_price: f64,
    pub currency: Option<String>,
}

impl Instrument {
    /// Fetches the first quote and uses its price as the initial baseline.
    pub async fn new(source: &dyn PriceSource, symbol: &str) -> Result<Self> {
        let quote = source.fetch(symbol).await?;
        debug!("constructed {} from {:?}", symbol, quote);
        Ok(Self::from_quote(quote))
    }

    pub fn from_quote(quote: Quote) -> Self {
        Self {
            symbol: quote.symbol,
            current_price: quote.current_price,
            opening_price: quote.opening_price,
            last_announced_price: quote.current_price,
            currency: quote.currency,
        }
    }

    /// Re-reads current and opening price. On failure the previous values
    /// stay in place and the next evaluation runs on them.
    pub async fn refresh(&mut self, source: &dyn PriceSource) {
        match source.fetch(&self.symbol).await {
            Ok(quote) => {
                self.current_price = quote.current_price;
                self.opening_price = quote.opening_price;
                if quote.currency.is_some() {
                    self.currency = quote.currency;
                }
                info!(
                    "{} updated, last_announced_price = {}, current_price = {}",
                    self.symbol, self.last_announced_price, self.current_price
                );
            }
            Err(e) => {
                warn!(
                    "{} refresh failed, keeping current_price = {}: {}",
                    self.symbol, self.current_price, e
                );
            }
        }
    }

    /// Decides whether the move since the last announcement is large enough
    /// to report. A firing rebases `last_announced_price` before returning.
    pub fn evaluate_alert(&mut self, settings: &AlertSettings) -> Option<AlertEvent> {
        let (direction_since_last, pct_since_last) =
            percent_change(self.current_price, self.last_announced_price, settings.decimal_places);

        if pct_since_last < settings.threshold_percent {
            return None;
        }

        self.last_announced_price = self.current_price;

        let (direction_since_open, pct_since_open) =
            percent_change(self.current_price, self.opening_price, settings.decimal_places);

        Some(AlertEvent {
            symbol: self.symbol.clone(),
            direction_since_last,
            pct_since_last,
            direction_since_open,
            pct_since_open,
            price: self.current_price,
            currency: self.currency.clone(),
        })
    }
}

/// Signed move from `baseline` to `current` in percent, split into a
/// direction and a magnitude rounded to `decimal_places`.
pub fn percent_change(current: f64, baseline: f64, decimal_places: u32) -> (Direction, f64) {
    if current == baseline {
        return (Direction::Up, 0.0);
    }

    let delta = (current - baseline) / baseline * 100.0;
    let rounded = round_to(delta, decimal_places);
    debug!(
        "percentage difference between {} and {} is {}",
        current, baseline, rounded
    );

    (Direction::of(delta), rounded.abs())
}

/// Rounds the exact binary value to `decimal_places`, ties to even.
/// Fixed-precision formatting does this without the error a scale,
/// round and unscale pass would add.
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    format!("{:.*}", decimal_places as usize, value)
        .parse()
        .unwrap_or(value)
}
