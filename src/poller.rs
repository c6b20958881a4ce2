//! Poll loop.
//!
//! Each cycle has two phases that never overlap: every instrument is
//! refreshed concurrently and the whole batch is awaited, then alerts are
//! evaluated one instrument at a time in construction order.

use futures::future::join_all;
use log::{debug, error, info};

use crate::api::PriceSource;
use crate::config::Config;
use crate::notify::Notifier;
use crate::tracker::Instrument;

/// Builds the initial instrument set. Symbols whose first fetch fails are
/// logged and left out.
pub async fn init_all(source: &dyn PriceSource, symbols: &[String]) -> Vec<Instrument> {
    let results = join_all(symbols.iter().map(|symbol| Instrument::new(source, symbol))).await;

    symbols
        .iter()
        .zip(results)
        .filter_map(|(symbol, result)| match result {
            Ok(instrument) => {
                info!(
                    "tracking {} from {} (open {})",
                    instrument.symbol, instrument.current_price, instrument.opening_price
                );
                Some(instrument)
            }
            Err(e) => {
                error!("Failed to initialise {}: {}", symbol, e);
                None
            }
        })
        .collect()
}

pub async fn refresh_all(source: &dyn PriceSource, instruments: &mut [Instrument]) {
    join_all(instruments.iter_mut().map(|instrument| instrument.refresh(source))).await;
}

/// Evaluates every instrument and hands each alert to the notifier.
/// Returns the number of alerts raised.
pub async fn alert_all(
    config: &Config,
    notifier: &dyn Notifier,
    instruments: &mut [Instrument],
) -> usize {
    let mut raised = 0;

    for instrument in instruments.iter_mut() {
        let Some(event) = instrument.evaluate_alert(&config.alerts) else {
            continue;
        };
        raised += 1;

        let message = event.message(config.alerts.decimal_places);
        info!(
            "alerting {}: {} {}% since last announced",
            event.symbol, event.direction_since_last, event.pct_since_last
        );
        debug!("message: {:?}", message);

        if let Err(e) = notifier.notify(&message).await {
            error!("Failed to send alert for {}: {}", event.symbol, e);
        }
    }

    raised
}

/// One refresh-then-evaluate pass.
pub async fn cycle(
    config: &Config,
    source: &dyn PriceSource,
    notifier: &dyn Notifier,
    instruments: &mut [Instrument],
) -> usize {
    info!("------------------------------ updating info ------------------------------");
    refresh_all(source, instruments).await;
    info!("---------------------------- end updating info ----------------------------");

    alert_all(config, notifier, instruments).await
}

/// Runs forever; termination is left to the caller.
pub async fn run(
    config: &Config,
    source: &dyn PriceSource,
    notifier: &dyn Notifier,
    mut instruments: Vec<Instrument>,
) {
    info!(
        "Polling {} instrument(s) every {}s, alert threshold {}%",
        instruments.len(),
        config.poll_interval.as_secs(),
        config.alerts.threshold_percent
    );

    loop {
        cycle(config, source, notifier, &mut instruments).await;
        tokio::time::sleep(config.poll_interval).await;
    }
}
