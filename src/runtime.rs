// Poll loop with change/keepalive send gating
// The controller stops the vehicle when tokens stop arriving, so the 500ms
// keepalive doubles as the link liveness signal.

use std::time::{Duration, Instant};

use mpu6050_dmp::address::Address;
use mpu6050_dmp::yaw_pitch_roll::YawPitchRoll;
use tokio::time::interval;
use tracing::{info, warn};

// local imports
use crate::config::{KEEPALIVE, LOOP_HZ};
use crate::imu::{ImuDriver, tilt_to_vector};
use crate::link::ControllerLink;
use crate::messages::{ControlVector, LinkHealth};

pub struct Runtime {
    current: ControlVector,
    last_sent: Option<ControlVector>,
    sent_at: Instant,
    health: LinkHealth,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            current: ControlVector::neutral(),
            last_sent: None,
            sent_at: Instant::now(),
            health: LinkHealth::Reconnecting, // Start down until first connect
        }
    }

    /// Fold a fresh orientation packet into the current command
    fn on_orientation(&mut self, ypr: &YawPitchRoll) {
        self.current = tilt_to_vector(ypr);
    }

    /// Send gate: a changed vector goes out on its tick, an unchanged one
    /// only once the keepalive interval has elapsed
    fn should_send(&self) -> bool {
        self.last_sent != Some(self.current) || self.sent_at.elapsed() >= KEEPALIVE
    }

    fn mark_sent(&mut self) {
        self.last_sent = Some(self.current);
        self.sent_at = Instant::now();
    }

    /// Track link health, logging only the transitions
    fn set_health(&mut self, health: LinkHealth) {
        if self.health != health {
            match health {
                LinkHealth::Connected => info!("Controller link up"),
                LinkHealth::Reconnecting => warn!("Controller link down, reconnecting"),
            }
            self.health = health;
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run(
    controller: &str,
    i2c_bus: &str,
    alt_address: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let address = if alt_address { Address(0x69) } else { Address::default() };
    let mut imu = ImuDriver::new(i2c_bus, address)?;

    let mut link = ControllerLink::new(controller);
    let mut runtime = Runtime::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    // One pinned signal future for the whole loop: a Ctrl-C that lands while
    // the loop body runs stays registered and is picked up on the next poll,
    // instead of being lost with a fresh future per iteration
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(
        "Runtime started: {}Hz loop, {}ms keepalive, controller {}",
        LOOP_HZ,
        KEEPALIVE.as_millis(),
        controller
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut ctrl_c => {
                shutdown(&mut link, &mut runtime).await;
                return Ok(());
            }
        }

        // 1. Drain pending DMP packets (non-blocking), keep the latest
        loop {
            match imu.poll_orientation() {
                Ok(Some(ypr)) => runtime.on_orientation(&ypr),
                Ok(None) => break,
                Err(e) => {
                    warn!("IMU read failed: {}", e);
                    break;
                }
            }
        }

        // 2. Transmit when the gate is open, reconnecting first if needed
        if runtime.should_send() {
            if !link.is_connected() {
                runtime.set_health(LinkHealth::Reconnecting);
                // The retry loop is unbounded; shutdown must stay
                // responsive while the endpoint is down
                tokio::select! {
                    _ = link.ensure_connected() => {}
                    _ = &mut ctrl_c => {
                        shutdown(&mut link, &mut runtime).await;
                        return Ok(());
                    }
                }
            }
            match link.send(&runtime.current).await {
                Ok(()) => {
                    runtime.set_health(LinkHealth::Connected);
                    runtime.mark_sent();
                }
                Err(e) => {
                    warn!("Send failed: {}", e);
                    runtime.set_health(LinkHealth::Reconnecting);
                }
            }
        }
    }
}

/// Best-effort neutral vector so the vehicle stops on orderly exit
async fn shutdown(link: &mut ControllerLink, runtime: &mut Runtime) {
    info!("Shutting down, leaving the controller neutral");
    runtime.current = ControlVector::neutral();
    if link.is_connected() {
        if let Err(e) = link.send(&runtime.current).await {
            warn!("Neutral send on shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt_with_current(v: ControlVector) -> Runtime {
        let mut rt = Runtime::new();
        rt.current = v;
        rt
    }

    #[test]
    fn test_first_vector_sends_immediately() {
        let rt = Runtime::new();
        assert!(rt.should_send(), "nothing sent yet, gate should be open");
    }

    #[test]
    fn test_unchanged_vector_waits_for_keepalive() {
        let mut rt = rt_with_current(ControlVector::new(15, 0));
        rt.mark_sent();
        assert!(!rt.should_send());
    }

    #[test]
    fn test_changed_vector_opens_gate() {
        let mut rt = rt_with_current(ControlVector::new(15, 0));
        rt.mark_sent();
        rt.current = ControlVector::new(16, 0);
        assert!(rt.should_send());
    }

    #[test]
    fn test_keepalive_elapse_opens_gate() {
        let mut rt = rt_with_current(ControlVector::new(15, 0));
        rt.mark_sent();
        rt.sent_at = Instant::now() - KEEPALIVE;
        assert!(rt.should_send());
    }

    #[tokio::test]
    async fn test_pinned_shutdown_signal_survives_busy_loop_body() {
        // The run loop polls one pinned ctrl_c future across iterations; a
        // SIGINT delivered while the loop body runs (between polls) must
        // still complete that future on the next poll
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        // First poll registers the handler, then times out like a loop
        // iteration moving on to its body
        let pending = tokio::time::timeout(Duration::from_millis(10), &mut ctrl_c).await;
        assert!(pending.is_err(), "no signal sent yet");

        // Signal arrives mid-body, with nothing polling the future
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -s INT {}", std::process::id()))
            .status()
            .unwrap();
        assert!(status.success());

        // Next poll of the same future observes it
        let caught = tokio::time::timeout(Duration::from_secs(1), &mut ctrl_c).await;
        assert!(caught.is_ok(), "signal lost between polls");
    }

    #[tokio::test]
    async fn test_reconnect_wait_can_be_raced() {
        // ensure_connected retries forever against a dead endpoint; the run
        // loop relies on being able to select something else against it
        let mut link = ControllerLink::new("127.0.0.1:1");
        let raced = tokio::time::timeout(Duration::from_secs(2), async {
            tokio::select! {
                _ = link.ensure_connected() => false,
                _ = tokio::time::sleep(Duration::from_millis(50)) => true,
            }
        })
        .await
        .unwrap();
        assert!(raced, "reconnect loop starved the competing branch");
    }

    #[test]
    fn test_orientation_updates_current() {
        let mut rt = Runtime::new();
        let ypr = YawPitchRoll {
            yaw: 0.0,
            pitch: 20.0_f32.to_radians(),
            roll: 0.0,
        };
        rt.on_orientation(&ypr);
        assert_eq!(rt.current, ControlVector::new(-20, 0));
    }
}
