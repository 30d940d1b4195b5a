// Controller-side monitor: accepts runtime connections, parses the wire
// tokens, and prints each vector as a JSON line.
//
// This tool only listens - it's safe to point a live runtime at it.
//
// Usage: cargo run --bin vector_monitor -- [listen_addr]
// Example: cargo run --bin vector_monitor -- 0.0.0.0:5000

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::{info, warn};

use tilt_teleop_runtime::messages::ControlVector;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Runtime connected from {}", peer);

        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    match ControlVector::parse_token(&line) {
                        Some(v) => match serde_json::to_string(&v) {
                            Ok(json) => println!("{}", json),
                            Err(e) => warn!("Failed to serialize vector: {}", e),
                        },
                        None => warn!("Unparseable token: {:?}", line),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Read failed: {}", e);
                    break;
                }
            }
        }
        info!("Runtime disconnected");
    }
}
