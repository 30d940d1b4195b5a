// MPU6050 DMP driver
//
// Wraps the mpu6050-dmp sensor over the Linux I2C bus. Sensor fusion runs on
// the chip's DMP; we only pull finished quaternion packets out of the FIFO
// and hand back Euler angles.

use linux_embedded_hal::{Delay, I2cdev};
use mpu6050_dmp::{
    accel::AccelFullScale,
    address::Address,
    calibration::{CalibrationParameters, ReferenceGravity},
    gyro::GyroFullScale,
    quaternion::Quaternion,
    sensor::Mpu6050,
    yaw_pitch_roll::YawPitchRoll,
};
use tracing::{debug, info, warn};

use crate::config::SAMPLE_RATE_DIVIDER;

/// DMP FIFO packet size in bytes; the quaternion is the first 16
pub const DMP_PACKET_SIZE: usize = 28;

/// FIFO fill level at which we treat the backlog as overflowed and drop it
const FIFO_DRAIN_THRESHOLD: usize = 512;

type SensorError = mpu6050_dmp::error::Error<I2cdev>;

/// Error types for IMU communication
#[derive(Debug, thiserror::Error)]
pub enum ImuError {
    #[error("failed to open i2c bus: {0}")]
    Bus(#[from] linux_embedded_hal::i2cdev::linux::LinuxI2CError),

    #[error("sensor communication failed: {0:?}")]
    Sensor(SensorError),
}

/// What a poll should do for a given FIFO fill level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FifoState {
    /// No complete packet yet
    Empty,
    /// At least one whole packet waiting
    Ready,
    /// Fill level is not packet-aligned: partial drain or mid-overflow
    /// corruption, flush rather than decode garbage tilt
    Misaligned,
    /// Backlog too deep, everything in it is stale
    Overflowed,
}

fn classify_fifo(count: usize) -> FifoState {
    if count >= FIFO_DRAIN_THRESHOLD {
        FifoState::Overflowed
    } else if count < DMP_PACKET_SIZE {
        FifoState::Empty
    } else if count % DMP_PACKET_SIZE != 0 {
        FifoState::Misaligned
    } else {
        FifoState::Ready
    }
}

impl From<SensorError> for ImuError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

/// MPU6050 orientation source for the runtime
pub struct ImuDriver {
    sensor: Mpu6050<I2cdev>,
    delay: Delay,
    buffer: [u8; DMP_PACKET_SIZE],
}

impl ImuDriver {
    /// Open the sensor on the given bus and bring the DMP up.
    ///
    /// Calibration runs during init; the sensor should be still and level.
    pub fn new(bus: &str, address: Address) -> Result<Self, ImuError> {
        info!("Opening MPU6050 on {} (address 0x{:02X})", bus, u8::from(address));
        let i2c = I2cdev::new(bus)?;
        let sensor = Mpu6050::new(i2c, address).map_err(|e| ImuError::Sensor(e.error))?;

        let mut driver = Self {
            sensor,
            delay: Delay,
            buffer: [0; DMP_PACKET_SIZE],
        };
        driver.initialize()?;
        Ok(driver)
    }

    /// Load DMP firmware, calibrate, and start the FIFO stream
    fn initialize(&mut self) -> Result<(), ImuError> {
        info!("Loading DMP firmware");
        self.sensor.initialize_dmp(&mut self.delay)?;

        let params = CalibrationParameters::new(
            AccelFullScale::G2,
            GyroFullScale::Deg2000,
            ReferenceGravity::ZN,
        );
        info!("Calibrating (keep the sensor still and level)");
        self.sensor.calibrate(&mut self.delay, &params)?;

        self.sensor.set_sample_rate_divider(SAMPLE_RATE_DIVIDER)?;
        self.sensor.enable_fifo()?;
        info!("DMP streaming quaternions");
        Ok(())
    }

    /// Non-blocking orientation poll.
    ///
    /// The FIFO fill level is the data-ready flag: returns an orientation
    /// only when a complete DMP packet is waiting, `None` otherwise. An
    /// overflowed or misaligned FIFO is reset rather than drained so stale
    /// or garbled tilt never reaches the controller.
    pub fn poll_orientation(&mut self) -> Result<Option<YawPitchRoll>, ImuError> {
        let count = self.sensor.get_fifo_count()?;

        match classify_fifo(count) {
            FifoState::Ready => {}
            FifoState::Empty => return Ok(None),
            FifoState::Misaligned => {
                warn!("FIFO misaligned at {} bytes, resetting", count);
                self.sensor.reset_fifo()?;
                return Ok(None);
            }
            FifoState::Overflowed => {
                warn!("FIFO backlog of {} bytes, resetting", count);
                self.sensor.reset_fifo()?;
                return Ok(None);
            }
        }

        let packet = self.sensor.read_fifo(&mut self.buffer)?;
        let Some(quat) = packet.get(..16).and_then(Quaternion::from_bytes) else {
            // Short read despite an aligned fill level; flush and wait
            // for a clean packet
            self.sensor.reset_fifo()?;
            return Ok(None);
        };

        let ypr = YawPitchRoll::from(quat.normalize());
        debug!(
            "ypr: yaw={:.3} pitch={:.3} roll={:.3}",
            ypr.yaw, ypr.pitch, ypr.roll
        );
        Ok(Some(ypr))
    }
}
