//! Card Arbitrage - price discovery API server
//!
//! Serves the card analysis endpoint. Requires the classifier credential
//! at startup; price sources and billing degrade gracefully at runtime.

use card_arbitrage::config::Config;
use card_arbitrage::web;
use clap::Parser;

/// Card price analysis server - photo in, sell-or-export verdict out
#[derive(Parser, Debug)]
#[command(name = "card_arbitrage")]
#[command(version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting card_arbitrage...");
    log::info!(
        "Calibration: rate {} JPY/USD, fee {:.1}%, shipping ¥{}",
        config.usd_jpy_rate,
        config.export_fee_rate() * 100.0,
        config.export_shipping_jpy
    );

    if let Err(e) = web::serve(config, args.port).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
