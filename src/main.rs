mod api;
mod config;
mod error;
mod notify;
mod poller;
mod tracker;

use api::yahoo::YahooChartSource;
use config::Config;
use env_logger::Builder;
use error::PriceWatchError;
use log::{info, LevelFilter};
use notify::SignalCli;
use std::error::Error;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // .env is optional
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let crate_level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Configure logger; RUST_LOG overrides the defaults below
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("pricewatch", crate_level)
        .filter_module("reqwest", LevelFilter::Warn) // connection pool chatter
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();

    info!("Starting pricewatch for {}", config.symbols.join(", "));

    let source = YahooChartSource::new(config.yahoo_url.clone(), config.http_timeout)?;
    let notifier = SignalCli::new(config.signal.clone());

    // Symbols that fail here are dropped for the lifetime of the process
    let instruments = poller::init_all(&source, &config.symbols).await;
    if instruments.is_empty() {
        let reason = "no configured symbol could be initialised".to_string();
        return Err(PriceWatchError::Config(reason).into());
    }

    // The poll loop never returns; only an interrupt ends it
    tokio::select! {
        _ = poller::run(&config, &source, &notifier, instruments) => {},
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received");
        },
    };

    info!("Shutdown complete");
    Ok(())
}
