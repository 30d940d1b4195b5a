// Keyboard teleop: WASD steer, R/F magnitude, Q quit
//
// Drives the controller with the same wire tokens as the runtime, no IMU
// hardware required. Useful for bench-testing the controller side.
//
// Usage: cargo run --bin key_sender -- [controller_addr]

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use tilt_teleop_runtime::config::CONTROLLER_ADDR;
use tilt_teleop_runtime::link::ControllerLink;
use tilt_teleop_runtime::messages::ControlVector;

// Magnitudes match what the tilt transform can produce
const MAGNITUDES: [i16; 3] = [12, 18, 24];
const INPUT_TIMEOUT_MS: u64 = 150; // Recenter after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONTROLLER_ADDR.to_string());

    let mut link = ControllerLink::new(addr.clone());
    info!("Connecting to controller at {}...", addr);
    link.ensure_connected().await;

    info!("Controls: WASD=steer, R/F=magnitude, Q=quit");
    info!("Magnitude: {}", MAGNITUDES[0]);

    enable_raw_mode()?;
    let result = run_teleop(&mut link).await;
    disable_raw_mode()?;

    // Leave the controller stopped
    if let Err(e) = link.send(&ControlVector::neutral()).await {
        warn!("Failed to send neutral vector on exit: {}", e);
    }

    result
}

async fn run_teleop(
    link: &mut ControllerLink,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut mag_idx: usize = 0;

    // Persistent command state
    let mut vector = ControlVector::neutral();
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
                let mag = MAGNITUDES[mag_idx];

                match code {
                    // Steering - update vector and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        vector.x = mag;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        vector.x = -mag;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        vector.y = mag;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        vector.y = -mag;
                        last_movement_input = Instant::now();
                    }

                    // Magnitude control
                    KeyCode::Char('r') if pressed => {
                        mag_idx = (mag_idx + 1).min(MAGNITUDES.len() - 1);
                        info!("Magnitude: {}", MAGNITUDES[mag_idx]);
                    }
                    KeyCode::Char('f') if pressed => {
                        mag_idx = mag_idx.saturating_sub(1);
                        info!("Magnitude: {}", MAGNITUDES[mag_idx]);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Recenter if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            vector = ControlVector::neutral();
        }

        // Always transmit at ~50Hz; reconnect if the controller dropped us
        if let Err(e) = link.send(&vector).await {
            warn!("{}", e);
            link.ensure_connected().await;
        }
    }

    Ok(())
}
