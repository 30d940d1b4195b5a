// Tilt-to-command mapping
// Converts DMP pitch/roll angles into the bounded integer vector sent to the
// controller. Yaw is ignored; only tilt drives the vehicle.

use std::f32::consts::PI;

use mpu6050_dmp::yaw_pitch_roll::YawPitchRoll;

use crate::config::{CLAMP_DEG, DEADBAND_DEG};
use crate::messages::ControlVector;

const RAD_TO_DEG: f32 = 180.0 / PI;

/// Map one tilt axis (degrees) to a command component.
///
/// Saturates at ±CLAMP_DEG, zeroes everything strictly inside ±DEADBAND_DEG,
/// then rounds and inverts the sign so tilting the sensor toward an axis
/// drives the vehicle that way.
///
/// The deadband test runs on the unrounded angle, so exactly DEADBAND_DEG
/// passes through. Reachable magnitudes are {0} ∪ [DEADBAND_DEG, CLAMP_DEG].
pub fn axis_command(angle_deg: f32) -> i16 {
    let deg = angle_deg.clamp(-CLAMP_DEG, CLAMP_DEG);
    if deg.abs() < DEADBAND_DEG {
        0
    } else {
        -(deg.round() as i16)
    }
}

/// Convert a DMP orientation (radians, as the library reports it) into the
/// controller command. Pitch (forward/back tilt) drives X, roll (side tilt)
/// drives Y.
pub fn tilt_to_vector(ypr: &YawPitchRoll) -> ControlVector {
    ControlVector::new(
        axis_command(ypr.pitch * RAD_TO_DEG),
        axis_command(ypr.roll * RAD_TO_DEG),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ypr(yaw: f32, pitch: f32, roll: f32) -> YawPitchRoll {
        let deg_to_rad = PI / 180.0;
        YawPitchRoll {
            yaw: yaw * deg_to_rad,
            pitch: pitch * deg_to_rad,
            roll: roll * deg_to_rad,
        }
    }

    #[test]
    fn test_level_is_neutral() {
        assert_eq!(tilt_to_vector(&ypr(0.0, 0.0, 0.0)), ControlVector::neutral());
    }

    #[test]
    fn test_deadband_interior_is_zero() {
        for deg in [0.5, 3.0, 8.0, 11.9, -0.5, -6.0, -11.9] {
            assert_eq!(
                axis_command(deg),
                0,
                "{} deg should be inside the deadband",
                deg
            );
        }
    }

    #[test]
    fn test_deadband_boundary_passes_through() {
        // 12.0 exactly is outside the (strict) deadband interior
        assert_eq!(axis_command(12.0), -12);
        assert_eq!(axis_command(-12.0), 12);
    }

    #[test]
    fn test_sign_inversion() {
        assert_eq!(axis_command(18.0), -18);
        assert_eq!(axis_command(-18.0), 18);
    }

    #[test]
    fn test_saturation_beyond_clamp() {
        assert_eq!(axis_command(40.0), -24);
        assert_eq!(axis_command(-90.0), 24);
    }

    #[test]
    fn test_axis_assignment() {
        // Pitch drives X, roll drives Y, yaw is ignored
        let v = tilt_to_vector(&ypr(170.0, 20.0, -15.0));
        assert_eq!(v, ControlVector::new(-20, 15));
    }

    #[test]
    fn test_output_always_bounded() {
        // Sweep a full revolution; every output must satisfy |v| <= 24
        // and |v| == 0 or |v| >= 12
        let mut deg = -180.0f32;
        while deg <= 180.0 {
            let v = axis_command(deg);
            assert!(v.abs() <= 24, "{} deg -> {} exceeds clamp", deg, v);
            assert!(v == 0 || v.abs() >= 12, "{} deg -> {} inside deadband", deg, v);
            deg += 0.25;
        }
    }
}
