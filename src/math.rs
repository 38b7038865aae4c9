//! Mathematical kernels and nalgebra extensions for the derivation engine

use core::f32::consts::TAU;

use nalgebra::{ComplexField, Matrix3, RealField, Vector3};

use crate::types::SampleValues;

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Flat, row-major access to a rotation matrix
///
/// Index `i` addresses row `i / 3`, column `i % 3`, so `R[6..9]` is the
/// normalized gravity (up) direction in device coordinates.
pub trait RotationMatrixExt {
    /// Entry at a flat row-major index (0..9)
    fn entry(&self, index: usize) -> f32;
}

impl RotationMatrixExt for Matrix3<f32> {
    fn entry(&self, index: usize) -> f32 {
        self[(index / 3, index % 3)]
    }
}

/// Rotate a device-basis vector into the world basis
///
/// Returns `None` when `values` is not a three-component vector.
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use motion_derive::{SampleValues, math::rotate};
///
/// let world = rotate(&Matrix3::identity(), &SampleValues::Vector(Vector3::new(1.0, 2.0, 3.0)));
/// assert_eq!(world, Some(Vector3::new(1.0, 2.0, 3.0)));
/// assert_eq!(rotate(&Matrix3::identity(), &SampleValues::Scalar(1.0)), None);
/// ```
pub fn rotate(matrix: &Matrix3<f32>, values: &SampleValues) -> Option<Vector3<f32>> {
    values.vector().map(|vector| matrix * vector)
}

/// Running `(Σsin, Σcos)` of a set of angles
///
/// Angles are accumulated as unit vectors so their mean handles wraparound:
/// the mean of 359° and 1° is 0°, not 180°.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircularSum {
    sin: f32,
    cos: f32,
}

impl CircularSum {
    pub fn add_angle(&mut self, angle: f32) {
        self.sin += angle.sin();
        self.cos += angle.cos();
    }

    pub fn remove_angle(&mut self, angle: f32) {
        self.sin -= angle.sin();
        self.cos -= angle.cos();
    }

    /// Circular mean of `count` accumulated angles, in (-π, π]
    pub fn average_angle(&self, count: usize) -> f32 {
        let n = count as f32;
        (self.sin / n).atan2(self.cos / n)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Normalize an angle in radians into [0, 2π)
pub fn wrap_two_pi(angle: f32) -> f32 {
    let wrapped = angle % TAU;
    if wrapped < 0.0 { wrapped + TAU } else { wrapped }
}
