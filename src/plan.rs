//! Dependency resolution
//!
//! Deciding what to compute is done once, when the engine is configured. The
//! resulting [`DerivationPlan`] records which raw readings must be cached
//! between calls, which intermediate quantities must be synthesized, and the
//! ordered steps of the two calculation chains. Ingesting a sample then only
//! walks these lists instead of re-testing the subscription bitmask.

use alloc::vec::Vec;

use crate::direction::Axis;
use crate::types::{Capabilities, DerivedKind, SensorKind, Subscription};

/// A step of the chain run when a fresh rotation matrix is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixStep {
    Roll,
    Pitch,
    /// Project a cached device-basis vector into the world basis
    WorldVector(DerivedKind),
    Inclination,
    Direction(Axis),
    DeviceRotation,
}

/// A step of the chain run from gravity alone when no rotation matrix is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityStep {
    Inclination,
    DeviceRotation,
    Pitch,
    Roll,
}

/// Raw readings cached between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Retention {
    pub accelerometer: bool,
    pub gravity: bool,
    pub magnetic_field: bool,
    pub linear_acceleration: bool,
}

/// What the engine must compute for a subscription on a given device
///
/// # Example
/// ```
/// use motion_derive::{Capabilities, SensorKind, Subscription, plan::DerivationPlan};
///
/// let plan = DerivationPlan::resolve(Subscription::DIRECTION_Y, Capabilities::default());
/// assert!(plan.needs_rotation_matrix());
/// assert!(plan.needs_gravity_calc()); // no gravity sensor on this device
/// assert_eq!(
///     plan.required_sensors(),
///     vec![SensorKind::Accelerometer, SensorKind::MagneticField]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPlan {
    subscription: Subscription,
    capabilities: Capabilities,
    needs_rotation_matrix: bool,
    needs_gravity: bool,
    needs_gravity_calc: bool,
    needs_linear_acceleration_calc: bool,
    retention: Retention,
    matrix_steps: Vec<MatrixStep>,
    gravity_steps: Vec<GravityStep>,
}

impl DerivationPlan {
    /// Resolve the dependencies of a subscription
    pub fn resolve(subscription: Subscription, capabilities: Capabilities) -> Self {
        let needs_rotation_matrix =
            subscription.intersects(Subscription::WORLD_VECTORS | Subscription::DIRECTIONS);

        let needs_linear_acceleration_calc = !capabilities.has_linear_acceleration_sensor
            && subscription.intersects(
                Subscription::LINEAR_ACCELERATION | Subscription::WORLD_LINEAR_ACCELERATION,
            );

        let needs_gravity = needs_rotation_matrix
            || needs_linear_acceleration_calc
            || subscription.intersects(
                Subscription::GRAVITY | Subscription::WORLD_GRAVITY | Subscription::ANGLES,
            );
        let needs_gravity_calc = needs_gravity && !capabilities.has_gravity_sensor;

        let retention = Retention {
            accelerometer: subscription.contains(Subscription::WORLD_ACCELEROMETER),
            gravity: needs_gravity,
            magnetic_field: needs_rotation_matrix,
            linear_acceleration: needs_linear_acceleration_calc
                && subscription.contains(Subscription::WORLD_LINEAR_ACCELERATION),
        };

        let matrix_steps = if needs_rotation_matrix {
            Self::build_matrix_steps(subscription, needs_linear_acceleration_calc)
        } else {
            Vec::new()
        };

        let gravity_steps = [
            (Subscription::INCLINATION, GravityStep::Inclination),
            (Subscription::DEVICE_ROTATION, GravityStep::DeviceRotation),
            (Subscription::PITCH, GravityStep::Pitch),
            (Subscription::ROLL, GravityStep::Roll),
        ]
        .into_iter()
        .filter(|(flag, _)| subscription.contains(*flag))
        .map(|(_, step)| step)
        .collect();

        Self {
            subscription,
            capabilities,
            needs_rotation_matrix,
            needs_gravity,
            needs_gravity_calc,
            needs_linear_acceleration_calc,
            retention,
            matrix_steps,
            gravity_steps,
        }
    }

    fn build_matrix_steps(
        subscription: Subscription,
        synthesized_linear: bool,
    ) -> Vec<MatrixStep> {
        let mut steps = Vec::new();

        if subscription.contains(Subscription::ROLL) {
            steps.push(MatrixStep::Roll);
        }
        if subscription.contains(Subscription::PITCH) {
            steps.push(MatrixStep::Pitch);
        }

        for kind in subscription.kinds().filter(|kind| kind.device_counterpart().is_some()) {
            // Hardware linear acceleration is projected as it arrives instead
            if kind == DerivedKind::WorldLinearAcceleration && !synthesized_linear {
                continue;
            }
            steps.push(MatrixStep::WorldVector(kind));
        }

        if subscription.contains(Subscription::INCLINATION) {
            steps.push(MatrixStep::Inclination);
        }
        for axis in Axis::ALL {
            if subscription.subscribes(axis.derived_kind()) {
                steps.push(MatrixStep::Direction(axis));
            }
        }
        if subscription.contains(Subscription::DEVICE_ROTATION) {
            steps.push(MatrixStep::DeviceRotation);
        }

        steps
    }

    pub fn subscription(&self) -> Subscription {
        self.subscription
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn subscribes(&self, kind: DerivedKind) -> bool {
        self.subscription.subscribes(kind)
    }

    /// Any world-basis vector or bearing is subscribed
    pub fn needs_rotation_matrix(&self) -> bool {
        self.needs_rotation_matrix
    }

    /// Gravity feeds some subscribed output
    pub fn needs_gravity(&self) -> bool {
        self.needs_gravity
    }

    /// Gravity is needed and must be synthesized from the accelerometer
    pub fn needs_gravity_calc(&self) -> bool {
        self.needs_gravity_calc
    }

    /// Linear acceleration is needed and must be synthesized
    pub fn needs_linear_acceleration_calc(&self) -> bool {
        self.needs_linear_acceleration_calc
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    pub fn matrix_steps(&self) -> &[MatrixStep] {
        &self.matrix_steps
    }

    pub fn gravity_steps(&self) -> &[GravityStep] {
        &self.gravity_steps
    }

    /// Subscribed bearings, in evaluation order
    pub fn directions(&self) -> impl Iterator<Item = Axis> + '_ {
        self.matrix_steps.iter().filter_map(|step| match step {
            MatrixStep::Direction(axis) => Some(*axis),
            _ => None,
        })
    }

    /// World-basis vectors that need an averaging window
    pub fn world_vectors(&self) -> impl Iterator<Item = DerivedKind> + '_ {
        self.subscription
            .kinds()
            .filter(|kind| kind.device_counterpart().is_some())
    }

    /// Whether any output is smoothed over a window
    pub fn needs_history(&self) -> bool {
        self.subscription
            .intersects(Subscription::WORLD_VECTORS | Subscription::DIRECTIONS)
    }

    /// Hardware sensors the host must deliver for this plan, sorted
    pub fn required_sensors(&self) -> Vec<SensorKind> {
        let subscription = self.subscription;
        let capabilities = self.capabilities;

        let hardware_linear = capabilities.has_linear_acceleration_sensor
            && subscription.intersects(
                Subscription::LINEAR_ACCELERATION | Subscription::WORLD_LINEAR_ACCELERATION,
            );

        let candidates = [
            (
                SensorKind::Accelerometer,
                subscription.intersects(
                    Subscription::ACCELEROMETER | Subscription::WORLD_ACCELEROMETER,
                ) || self.needs_gravity_calc
                    || self.needs_linear_acceleration_calc,
            ),
            (
                SensorKind::MagneticField,
                subscription.contains(Subscription::MAGNETIC_FIELD) || self.needs_rotation_matrix,
            ),
            (
                SensorKind::Gyroscope,
                subscription.contains(Subscription::GYROSCOPE),
            ),
            (
                SensorKind::Gravity,
                self.needs_gravity && capabilities.has_gravity_sensor,
            ),
            (SensorKind::LinearAcceleration, hardware_linear),
            (
                SensorKind::RotationVector,
                subscription.contains(Subscription::ROTATION_VECTOR),
            ),
            (
                SensorKind::Orientation,
                subscription.contains(Subscription::ORIENTATION),
            ),
        ];

        candidates
            .into_iter()
            .filter(|(_, required)| *required)
            .map(|(kind, _)| kind)
            .collect()
    }
}
