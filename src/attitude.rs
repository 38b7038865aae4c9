//! Raw-to-derived calculators
//!
//! Every angle is available in two forms: from a rotation matrix, when a
//! magnetometer or rotation-vector reading made one available, or from the
//! gravity vector alone. Both forms agree on tilt; only the matrix carries a
//! heading.
//!
//! All functions are pure.

use nalgebra::{ComplexField, Matrix3, RealField, Vector3};

use crate::math::RotationMatrixExt;
use crate::types::{RawSample, SensorKind};

/// Below this inclination (radians, 25°) the device is lying face up
pub const FLAT_FACE_UP_LIMIT: f32 = 0.436_332_3;
/// Above this inclination (radians, 155°) the device is lying face down
pub const FLAT_FACE_DOWN_LIMIT: f32 = 2.705_260_3;

/// Whether an inclination falls in the flat regime
///
/// Compass bearings of the X and Y axes are only meaningful while flat; the
/// camera bearing and device rotation only while tilted.
pub fn is_flat(inclination: f32) -> bool {
    inclination < FLAT_FACE_UP_LIMIT || inclination > FLAT_FACE_DOWN_LIMIT
}

/// Low-pass the accelerometer into a gravity estimate
///
/// The first estimate is the accelerometer reading itself. Accuracy and
/// timestamp are taken from the accelerometer. Returns `None` when either
/// sample is not a three-component vector.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use motion_derive::{Accuracy, RawSample, SensorKind, attitude::low_pass_gravity};
///
/// let accel = RawSample::from_vector(SensorKind::Accelerometer, Vector3::new(0.0, 0.0, 10.0), Accuracy::High, 1);
/// let first = low_pass_gravity(&accel, None, 0.1).unwrap();
/// assert_eq!(first.vector(), accel.vector());
///
/// let accel = RawSample::from_vector(SensorKind::Accelerometer, Vector3::new(0.0, 0.0, 20.0), Accuracy::High, 2);
/// let second = low_pass_gravity(&accel, Some(&first), 0.1).unwrap();
/// assert!((second.vector().unwrap().z - 11.0).abs() < 1e-5);
/// ```
pub fn low_pass_gravity(
    accelerometer: &RawSample,
    previous: Option<&RawSample>,
    alpha: f32,
) -> Option<RawSample> {
    let accel = accelerometer.vector()?;
    let gravity = match previous {
        Some(previous) => accel * alpha + previous.vector()? * (1.0 - alpha),
        None => accel,
    };
    Some(RawSample::from_vector(
        SensorKind::Gravity,
        gravity,
        accelerometer.accuracy,
        accelerometer.timestamp,
    ))
}

/// Acceleration with gravity removed
pub fn linear_acceleration(accelerometer: &Vector3<f32>, gravity: &Vector3<f32>) -> Vector3<f32> {
    accelerometer - gravity
}

/// Inclination from a rotation matrix, in [0, π]
pub fn inclination(rotation: &Matrix3<f32>) -> f32 {
    rotation.entry(8).clamp(-1.0, 1.0).acos()
}

/// Inclination from gravity alone, in [0, π]
pub fn inclination_from_gravity(gravity: &Vector3<f32>) -> f32 {
    (gravity.z / gravity.norm()).clamp(-1.0, 1.0).acos()
}

/// Pitch (rotation about device X) from a rotation matrix
pub fn pitch(rotation: &Matrix3<f32>) -> f32 {
    (-rotation.entry(7)).clamp(-1.0, 1.0).asin()
}

/// Pitch from gravity alone
pub fn pitch_from_gravity(gravity: &Vector3<f32>) -> f32 {
    (-gravity.y / gravity.norm()).clamp(-1.0, 1.0).asin()
}

/// Roll (rotation about device Y) from a rotation matrix
pub fn roll(rotation: &Matrix3<f32>) -> f32 {
    (-rotation.entry(6)).atan2(rotation.entry(8))
}

/// Roll from gravity alone
pub fn roll_from_gravity(gravity: &Vector3<f32>) -> f32 {
    let norm = gravity.norm();
    (-gravity.x / norm).atan2(gravity.z / norm)
}

/// Rotation about the screen normal, `NaN` while the device is flat
pub fn device_rotation(rotation: &Matrix3<f32>) -> f32 {
    if is_flat(inclination(rotation)) {
        return f32::NAN;
    }
    rotation.entry(6).atan2(rotation.entry(7))
}

/// Rotation about the screen normal from gravity alone, `NaN` while flat
pub fn device_rotation_from_gravity(gravity: &Vector3<f32>) -> f32 {
    if is_flat(inclination_from_gravity(gravity)) {
        return f32::NAN;
    }
    let norm = gravity.norm();
    (gravity.x / norm).atan2(gravity.y / norm)
}
