// IMU module
//
// Provides:
// - MPU6050/DMP driver (fusion delegated to the sensor, FIFO-gated polling)
// - Tilt-to-command mapping (clamp, deadband, sign inversion)

mod driver;
pub mod tilt;

pub use driver::{DMP_PACKET_SIZE, ImuDriver, ImuError};
pub use tilt::{axis_command, tilt_to_vector};
