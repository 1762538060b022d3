use clap::Parser;
use log::info;
use server::network::{RelayConfig, Server};
use shared::DEFAULT_PORT;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of concurrent connections
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// Seconds of silence before a connection is dropped
    #[arg(short, long, default_value = "5")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = RelayConfig {
        max_clients: args.max_clients,
        client_timeout: Duration::from_secs(args.timeout_secs),
        ..RelayConfig::default()
    };

    let address = format!("{}:{}", args.host, args.port);
    info!(
        "Starting relay on {} (max {} clients, {}s timeout)",
        address, config.max_clients, args.timeout_secs
    );

    let mut server = Server::new(&address, config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
