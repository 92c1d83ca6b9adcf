//! Binary to connect to the exchange's JSON-RPC/WebSocket API, authenticate,
//! and run the market-making strategy against `BTC-PERPETUAL`.
//!
//! # Usage
//!
//! ```sh
//! export DERIBIT_CLIENT_ID="your-client-id"
//! export DERIBIT_CLIENT_SECRET="your-client-secret"
//! cargo run --bin run_client --features cli
//! ```

use std::env;

use deribit_mm::api::Api;
use deribit_mm::config::StrategyConfig;
use deribit_mm::log::EventLog;
use deribit_mm::trader::Trader;

#[tokio::main]
async fn main() -> deribit_mm::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client_id =
        env::var("DERIBIT_CLIENT_ID").expect("set DERIBIT_CLIENT_ID env var before running");
    let client_secret = env::var("DERIBIT_CLIENT_SECRET")
        .expect("set DERIBIT_CLIENT_SECRET env var before running");

    let log = std::sync::Arc::new(EventLog::new(std::io::stdout()));
    let config = StrategyConfig::default();

    println!("Connecting to the exchange WebSocket API…");
    let api = Api::new(log.clone());
    api.connect("www.deribit.com", "/ws/api/v2").await?;

    println!("Authenticating…");
    if !api.authenticate(&client_id, &client_secret).await {
        eprintln!("failed to send the authentication request");
        return Ok(());
    }

    // Give the handshake a moment to land before wiring the strategy —
    // the reader task applies the access token to every request after.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    if !api.is_authenticated() {
        eprintln!("authentication did not complete; exiting");
        return Ok(());
    }

    let trader = Trader::new(config, api.clone(), log);
    api.register_sink(trader.clone());
    trader.start().await;

    println!("Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await.ok();
    println!("Shutting down.");

    Ok(())
}
