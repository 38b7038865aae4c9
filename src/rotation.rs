//! Rotation matrices from raw sensor readings
//!
//! The engine never builds rotation matrices itself; it asks a
//! [`RotationSource`], normally supplied by the host platform. [`SensorManagerRotation`]
//! is a portable implementation producing East-North-Up matrices.

use nalgebra::{ComplexField, Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Standard gravity in m/s²
const STANDARD_GRAVITY: f32 = 9.81;

/// Builds device-to-world rotation matrices
///
/// Rows of the returned matrix are the world East, North and Up axes expressed
/// in device coordinates, so `R * v` maps a device-basis vector into the world basis.
pub trait RotationSource {
    /// Rotation from a gravity and a magnetic field reading
    ///
    /// Returns `None` when the inputs are degenerate, e.g. in free fall or when
    /// the field is nearly parallel to gravity.
    fn from_gravity_and_magnetic_field(
        &self,
        gravity: &Vector3<f32>,
        magnetic_field: &Vector3<f32>,
    ) -> Option<Matrix3<f32>>;

    /// Rotation from the vector part of a unit orientation quaternion
    fn from_rotation_vector(&self, rotation_vector: &Vector3<f32>) -> Matrix3<f32>;
}

/// Tilt-compensated East-North-Up rotation built from cross products
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use motion_derive::rotation::{RotationSource, SensorManagerRotation};
///
/// let source = SensorManagerRotation::default();
/// let gravity = Vector3::new(0.0, 0.0, 9.81);         // lying flat, face up
/// let magnetic_field = Vector3::new(0.0, 22.0, -40.0); // top edge pointing north
///
/// let rotation = source.from_gravity_and_magnetic_field(&gravity, &magnetic_field).unwrap();
/// assert!((rotation - Matrix3::identity()).norm() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorManagerRotation {
    /// Squared gravity magnitude below which the device is considered in free fall
    pub free_fall_gravity_squared: f32,
    /// Minimum magnitude of the horizontal field component (µT·m/s²)
    pub min_horizontal_field: f32,
}

impl Default for SensorManagerRotation {
    fn default() -> Self {
        Self {
            free_fall_gravity_squared: 0.01 * STANDARD_GRAVITY * STANDARD_GRAVITY,
            min_horizontal_field: 0.1,
        }
    }
}

impl RotationSource for SensorManagerRotation {
    fn from_gravity_and_magnetic_field(
        &self,
        gravity: &Vector3<f32>,
        magnetic_field: &Vector3<f32>,
    ) -> Option<Matrix3<f32>> {
        let gravity_squared = gravity.magnitude_squared();
        if gravity_squared < self.free_fall_gravity_squared {
            return None;
        }

        // East is perpendicular to both the field and gravity
        let east = magnetic_field.cross(gravity);
        let east_norm = east.norm();
        if east_norm < self.min_horizontal_field {
            return None;
        }

        let east = east / east_norm;
        let up = gravity / gravity_squared.sqrt();
        let north = up.cross(&east);

        Some(Matrix3::from_rows(&[
            east.transpose(),
            north.transpose(),
            up.transpose(),
        ]))
    }

    fn from_rotation_vector(&self, rotation_vector: &Vector3<f32>) -> Matrix3<f32> {
        // The scalar part is implied by the unit norm
        let w_squared = 1.0 - rotation_vector.magnitude_squared();
        let w = if w_squared > 0.0 { w_squared.sqrt() } else { 0.0 };

        let quaternion = Quaternion::new(w, rotation_vector.x, rotation_vector.y, rotation_vector.z);
        UnitQuaternion::from_quaternion(quaternion)
            .to_rotation_matrix()
            .into_inner()
    }
}
