//! grassveil-relay - position/chat relay for multiplayer sessions
//!
//! Usage: cargo run -p grassveil-relay -- [--port <PORT>]
//!
//! The port can also come from the PORT environment variable.

use grassveil_relay::{RelayServer, DEFAULT_PORT};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let port = parse_port_arg(&args)
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(DEFAULT_PORT);

    match RelayServer::bind(("0.0.0.0", port)).await {
        Ok(server) => server.run().await,
        Err(e) => {
            log::error!("Failed to start relay on port {}: {}", port, e);
            std::process::exit(1);
        }
    }
}

/// Parse --port argument from command line
fn parse_port_arg(args: &[String]) -> Option<u16> {
    for i in 0..args.len() {
        if args[i] == "--port" || args[i] == "-p" {
            if let Some(port) = args.get(i + 1) {
                return port.parse().ok();
            }
        }
    }
    None
}
