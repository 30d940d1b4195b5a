// Timeouts, endpoints, sensor configuration
use std::time::Duration;

// Runtime loop frequency (matches the DMP output rate)
pub const LOOP_HZ: u64 = 100;

// Keepalive: resend the current vector if nothing went out for this long
pub const KEEPALIVE: Duration = Duration::from_millis(500);

// Tilt thresholds in degrees
// Angles saturate at the clamp; anything strictly inside the deadband reads as level
pub const CLAMP_DEG: f32 = 24.0;
pub const DEADBAND_DEG: f32 = 12.0;

// Default controller endpoint
pub const CONTROLLER_ADDR: &str = "192.168.4.1:5000";

// I2C bus the MPU6050 hangs off
pub const I2C_BUS: &str = "/dev/i2c-1";

// DMP sample rate divider: 1kHz / (1 + 9) = 100Hz
pub const SAMPLE_RATE_DIVIDER: u8 = 9;

// Reconnect backoff bounds
pub const BACKOFF_MIN: Duration = Duration::from_millis(250);
pub const BACKOFF_MAX: Duration = Duration::from_secs(5);
