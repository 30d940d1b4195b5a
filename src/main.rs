use clap::Parser;
use tracing_subscriber::EnvFilter;

use tilt_teleop_runtime::config;

/// Streams MPU6050 tilt as control vectors to a remote controller over TCP
#[derive(Parser, Debug)]
struct Args {
    /// Controller endpoint, host:port
    #[arg(long, default_value = config::CONTROLLER_ADDR)]
    controller: String,

    /// I2C bus device the MPU6050 is on
    #[arg(long, default_value = config::I2C_BUS)]
    i2c_bus: String,

    /// Use the alternate sensor address (AD0 pulled high, 0x69)
    #[arg(long)]
    alt_address: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    if let Err(e) =
        tilt_teleop_runtime::runtime::run(&args.controller, &args.i2c_bus, args.alt_address).await
    {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
