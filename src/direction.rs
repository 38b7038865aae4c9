//! Bearings of the device axes
//!
//! Each of the six device half-axes has a bearing: the angle clockwise from
//! north of its horizontal projection. Only some of them are meaningful for a
//! given device attitude:
//!
//! - X and Y (and their negatives) act as a compass and need the device to lie flat;
//! - Z and -Z face through the screen and the back camera, and need the device
//!   to be tilted upright enough to sight along them.
//!
//! Outside its regime an axis reports `NaN` and forgets its smoothing history,
//! so a stale average never leaks into the next valid reading.

use nalgebra::{Matrix3, RealField};

use crate::attitude::is_flat;
use crate::math::RotationMatrixExt;
use crate::types::{Accuracy, DerivedKind, Sample};
use crate::window::AngleWindow;

/// A device half-axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    NegativeX,
    Y,
    NegativeY,
    Z,
    NegativeZ,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::X,
        Axis::NegativeX,
        Axis::Y,
        Axis::NegativeY,
        Axis::Z,
        Axis::NegativeZ,
    ];

    /// Rotation-matrix entries holding the axis' East and North components
    fn entries(self) -> (usize, usize) {
        match self {
            Axis::X | Axis::NegativeX => (0, 3),
            Axis::Y | Axis::NegativeY => (1, 4),
            Axis::Z | Axis::NegativeZ => (2, 5),
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, Axis::NegativeX | Axis::NegativeY | Axis::NegativeZ)
    }

    /// Whether the axis is sighted through the screen or camera
    pub fn is_camera(self) -> bool {
        matches!(self, Axis::Z | Axis::NegativeZ)
    }

    /// Whether a bearing exists at the given inclination
    pub fn is_valid_at(self, inclination: f32) -> bool {
        is_flat(inclination) != self.is_camera()
    }

    /// Bearing in (-π, π], ignoring the flatness regime
    ///
    /// # Example
    /// ```
    /// use nalgebra::Matrix3;
    /// use motion_derive::direction::Axis;
    ///
    /// // Lying flat, top edge pointing north: +X points east
    /// let bearing = Axis::X.bearing(&Matrix3::identity());
    /// assert!((bearing - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    /// ```
    pub fn bearing(self, rotation: &Matrix3<f32>) -> f32 {
        let (east_index, north_index) = self.entries();
        let (mut east, mut north) = (rotation.entry(east_index), rotation.entry(north_index));
        if self.is_negative() {
            east = -east;
            north = -north;
        }
        east.atan2(north)
    }

    pub fn derived_kind(self) -> DerivedKind {
        match self {
            Axis::X => DerivedKind::DirectionX,
            Axis::NegativeX => DerivedKind::DirectionNegativeX,
            Axis::Y => DerivedKind::DirectionY,
            Axis::NegativeY => DerivedKind::DirectionNegativeY,
            Axis::Z => DerivedKind::DirectionZ,
            Axis::NegativeZ => DerivedKind::DirectionNegativeZ,
        }
    }

    pub fn from_derived_kind(kind: DerivedKind) -> Option<Self> {
        Axis::ALL.into_iter().find(|axis| axis.derived_kind() == kind)
    }
}

/// Smoothed bearing of one axis
#[derive(Debug, Clone)]
pub struct DirectionCalculator {
    axis: Axis,
    window: AngleWindow,
}

impl DirectionCalculator {
    pub fn new(axis: Axis, history_length: usize) -> Self {
        Self {
            axis,
            window: AngleWindow::new(history_length),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Update with a new attitude and return the smoothed bearing
    ///
    /// Returns a `NaN` sample, and clears the history, when the axis has no
    /// bearing at this inclination.
    pub fn update(
        &mut self,
        rotation: &Matrix3<f32>,
        inclination: f32,
        accuracy: Accuracy,
        timestamp: u64,
    ) -> Sample {
        if !self.axis.is_valid_at(inclination) {
            self.window.clear();
            return Sample::undefined(timestamp);
        }

        self.window.add(self.axis.bearing(rotation), accuracy, timestamp);
        self.window
            .average()
            .unwrap_or_else(|| Sample::undefined(timestamp))
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn history_len(&self) -> usize {
        self.window.len()
    }
}
