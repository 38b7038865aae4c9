//! Core types: raw samples, derived outputs, the subscription bitmask and engine settings

use bitflags::bitflags;
use nalgebra::Vector3;

use crate::error::ConfigError;

/// Hardware sensor streams the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorKind {
    /// Acceleration including gravity, m/s²
    Accelerometer,
    /// Ambient magnetic field, µT
    MagneticField,
    /// Rotation rate, rad/s
    Gyroscope,
    /// Gravity direction and magnitude, m/s²
    Gravity,
    /// Acceleration excluding gravity, m/s²
    LinearAcceleration,
    /// Vector part of the device orientation quaternion
    RotationVector,
    /// Deprecated azimuth/pitch/roll triple in degrees
    Orientation,
}

impl SensorKind {
    /// Map a host platform sensor type constant to a sensor kind
    ///
    /// # Example
    /// ```
    /// use motion_derive::SensorKind;
    ///
    /// assert_eq!(SensorKind::from_android_type(9), Some(SensorKind::Gravity));
    /// assert_eq!(SensorKind::from_android_type(5), None); // light sensor
    /// ```
    pub fn from_android_type(sensor_type: i32) -> Option<Self> {
        match sensor_type {
            1 => Some(SensorKind::Accelerometer),
            2 => Some(SensorKind::MagneticField),
            3 => Some(SensorKind::Orientation),
            4 => Some(SensorKind::Gyroscope),
            9 => Some(SensorKind::Gravity),
            10 => Some(SensorKind::LinearAcceleration),
            11 => Some(SensorKind::RotationVector),
            _ => None,
        }
    }
}

/// Sensor accuracy, ordered from least to most trustworthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Accuracy {
    /// Readings cannot be trusted
    #[default]
    Unreliable,
    Low,
    Medium,
    High,
}

impl Accuracy {
    /// Map a host accuracy constant (0..=3); anything else is unreliable
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Accuracy::Low,
            2 => Accuracy::Medium,
            3 => Accuracy::High,
            _ => Accuracy::Unreliable,
        }
    }
}

/// Values carried by a sample: one component for angles, three for vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValues {
    Scalar(f32),
    Vector(Vector3<f32>),
}

impl SampleValues {
    /// The three-component vector, if this is one
    pub fn vector(&self) -> Option<Vector3<f32>> {
        match self {
            SampleValues::Vector(vector) => Some(*vector),
            SampleValues::Scalar(_) => None,
        }
    }

    /// The single value, if this is a scalar
    pub fn scalar(&self) -> Option<f32> {
        match self {
            SampleValues::Scalar(value) => Some(*value),
            SampleValues::Vector(_) => None,
        }
    }
}

/// A derived output value
///
/// Angles are in radians. A `NaN` scalar means the quantity is undefined in the
/// current device orientation (e.g. a compass bearing while the device is tilted).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub accuracy: Accuracy,
    /// Nanoseconds, in the host's sensor clock
    pub timestamp: u64,
    pub values: SampleValues,
}

impl Sample {
    pub fn scalar(value: f32, accuracy: Accuracy, timestamp: u64) -> Self {
        Self {
            accuracy,
            timestamp,
            values: SampleValues::Scalar(value),
        }
    }

    pub fn vector(value: Vector3<f32>, accuracy: Accuracy, timestamp: u64) -> Self {
        Self {
            accuracy,
            timestamp,
            values: SampleValues::Vector(value),
        }
    }

    /// Undefined angle with unreliable accuracy
    pub fn undefined(timestamp: u64) -> Self {
        Self::scalar(f32::NAN, Accuracy::Unreliable, timestamp)
    }

    /// Whether this is a scalar holding `NaN`
    pub fn is_undefined(&self) -> bool {
        matches!(self.values, SampleValues::Scalar(value) if value.is_nan())
    }
}

/// One reading delivered by the host's sensor layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub kind: SensorKind,
    pub accuracy: Accuracy,
    /// Nanoseconds, in the host's sensor clock
    pub timestamp: u64,
    pub values: SampleValues,
}

impl RawSample {
    /// Create a three-axis reading
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use motion_derive::{Accuracy, RawSample, SensorKind};
    ///
    /// let sample = RawSample::from_vector(
    ///     SensorKind::Accelerometer,
    ///     Vector3::new(0.0, 0.0, 9.81),
    ///     Accuracy::High,
    ///     1_000_000,
    /// );
    /// assert_eq!(sample.vector(), Some(Vector3::new(0.0, 0.0, 9.81)));
    /// ```
    pub fn from_vector(
        kind: SensorKind,
        value: Vector3<f32>,
        accuracy: Accuracy,
        timestamp: u64,
    ) -> Self {
        Self {
            kind,
            accuracy,
            timestamp,
            values: SampleValues::Vector(value),
        }
    }

    pub fn vector(&self) -> Option<Vector3<f32>> {
        self.values.vector()
    }

    /// Copy of this reading as a derived output
    pub fn to_sample(&self) -> Sample {
        Sample {
            accuracy: self.accuracy,
            timestamp: self.timestamp,
            values: self.values,
        }
    }
}

/// Quantities the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DerivedKind {
    Accelerometer,
    Gravity,
    LinearAcceleration,
    MagneticField,
    WorldAccelerometer,
    WorldGravity,
    WorldLinearAcceleration,
    WorldMagneticField,
    Gyroscope,
    RotationVector,
    /// Angle between the screen normal and the gravity vector
    Inclination,
    /// Rotation of the device about its screen normal while held upright
    DeviceRotation,
    Pitch,
    Roll,
    /// Bearing of the device +X axis
    DirectionX,
    DirectionNegativeX,
    DirectionY,
    DirectionNegativeY,
    /// Bearing of the screen normal
    DirectionZ,
    /// Bearing of the back camera
    DirectionNegativeZ,
    /// Deprecated platform orientation passthrough
    Orientation,
}

impl DerivedKind {
    pub const ALL: [DerivedKind; 21] = [
        DerivedKind::Accelerometer,
        DerivedKind::Gravity,
        DerivedKind::LinearAcceleration,
        DerivedKind::MagneticField,
        DerivedKind::WorldAccelerometer,
        DerivedKind::WorldGravity,
        DerivedKind::WorldLinearAcceleration,
        DerivedKind::WorldMagneticField,
        DerivedKind::Gyroscope,
        DerivedKind::RotationVector,
        DerivedKind::Inclination,
        DerivedKind::DeviceRotation,
        DerivedKind::Pitch,
        DerivedKind::Roll,
        DerivedKind::DirectionX,
        DerivedKind::DirectionNegativeX,
        DerivedKind::DirectionY,
        DerivedKind::DirectionNegativeY,
        DerivedKind::DirectionZ,
        DerivedKind::DirectionNegativeZ,
        DerivedKind::Orientation,
    ];

    /// The subscription bit for this kind
    pub fn flag(self) -> Subscription {
        match self {
            DerivedKind::Accelerometer => Subscription::ACCELEROMETER,
            DerivedKind::Gravity => Subscription::GRAVITY,
            DerivedKind::LinearAcceleration => Subscription::LINEAR_ACCELERATION,
            DerivedKind::MagneticField => Subscription::MAGNETIC_FIELD,
            DerivedKind::WorldAccelerometer => Subscription::WORLD_ACCELEROMETER,
            DerivedKind::WorldGravity => Subscription::WORLD_GRAVITY,
            DerivedKind::WorldLinearAcceleration => Subscription::WORLD_LINEAR_ACCELERATION,
            DerivedKind::WorldMagneticField => Subscription::WORLD_MAGNETIC_FIELD,
            DerivedKind::Gyroscope => Subscription::GYROSCOPE,
            DerivedKind::RotationVector => Subscription::ROTATION_VECTOR,
            DerivedKind::Inclination => Subscription::INCLINATION,
            DerivedKind::DeviceRotation => Subscription::DEVICE_ROTATION,
            DerivedKind::Pitch => Subscription::PITCH,
            DerivedKind::Roll => Subscription::ROLL,
            DerivedKind::DirectionX => Subscription::DIRECTION_X,
            DerivedKind::DirectionNegativeX => Subscription::DIRECTION_NEGATIVE_X,
            DerivedKind::DirectionY => Subscription::DIRECTION_Y,
            DerivedKind::DirectionNegativeY => Subscription::DIRECTION_NEGATIVE_Y,
            DerivedKind::DirectionZ => Subscription::DIRECTION_Z,
            DerivedKind::DirectionNegativeZ => Subscription::DIRECTION_NEGATIVE_Z,
            DerivedKind::Orientation => Subscription::ORIENTATION,
        }
    }

    /// Device-basis vector a world-basis kind is projected from
    pub fn device_counterpart(self) -> Option<DerivedKind> {
        match self {
            DerivedKind::WorldAccelerometer => Some(DerivedKind::Accelerometer),
            DerivedKind::WorldGravity => Some(DerivedKind::Gravity),
            DerivedKind::WorldLinearAcceleration => Some(DerivedKind::LinearAcceleration),
            DerivedKind::WorldMagneticField => Some(DerivedKind::MagneticField),
            _ => None,
        }
    }
}

bitflags! {
    /// Set of derived quantities requested by the host
    ///
    /// # Example
    /// ```
    /// use motion_derive::{DerivedKind, Subscription};
    ///
    /// let subscription = Subscription::PITCH | Subscription::ROLL;
    /// assert!(subscription.subscribes(DerivedKind::Pitch));
    /// assert!(!subscription.subscribes(DerivedKind::Inclination));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Subscription: u32 {
        const ACCELEROMETER = 1 << 0;
        const GRAVITY = 1 << 1;
        const LINEAR_ACCELERATION = 1 << 2;
        const MAGNETIC_FIELD = 1 << 3;
        const WORLD_ACCELEROMETER = 1 << 4;
        const WORLD_GRAVITY = 1 << 5;
        const WORLD_LINEAR_ACCELERATION = 1 << 6;
        const WORLD_MAGNETIC_FIELD = 1 << 7;
        const GYROSCOPE = 1 << 8;
        const ROTATION_VECTOR = 1 << 9;
        const INCLINATION = 1 << 10;
        const DEVICE_ROTATION = 1 << 11;
        const PITCH = 1 << 12;
        const ROLL = 1 << 13;
        const DIRECTION_X = 1 << 14;
        const DIRECTION_NEGATIVE_X = 1 << 15;
        const DIRECTION_Y = 1 << 16;
        const DIRECTION_NEGATIVE_Y = 1 << 17;
        const DIRECTION_Z = 1 << 18;
        const DIRECTION_NEGATIVE_Z = 1 << 19;
        const ORIENTATION = 1 << 20;

        const WORLD_VECTORS = Self::WORLD_ACCELEROMETER.bits()
            | Self::WORLD_GRAVITY.bits()
            | Self::WORLD_LINEAR_ACCELERATION.bits()
            | Self::WORLD_MAGNETIC_FIELD.bits();
        const DIRECTIONS = Self::DIRECTION_X.bits()
            | Self::DIRECTION_NEGATIVE_X.bits()
            | Self::DIRECTION_Y.bits()
            | Self::DIRECTION_NEGATIVE_Y.bits()
            | Self::DIRECTION_Z.bits()
            | Self::DIRECTION_NEGATIVE_Z.bits();
        const ANGLES = Self::INCLINATION.bits()
            | Self::DEVICE_ROTATION.bits()
            | Self::PITCH.bits()
            | Self::ROLL.bits();
    }
}

impl Subscription {
    /// Parse a host-provided bitmask, rejecting bits that name no output
    ///
    /// # Example
    /// ```
    /// use motion_derive::{ConfigError, Subscription};
    ///
    /// assert_eq!(Subscription::from_raw(1 << 12), Ok(Subscription::PITCH));
    /// assert_eq!(
    ///     Subscription::from_raw(1 << 12 | 1 << 30),
    ///     Err(ConfigError::UnknownSubscriptionBits(1 << 30))
    /// );
    /// ```
    pub fn from_raw(bits: u32) -> Result<Self, ConfigError> {
        Self::from_bits(bits).ok_or(ConfigError::UnknownSubscriptionBits(
            bits & !Self::all().bits(),
        ))
    }

    pub fn subscribes(&self, kind: DerivedKind) -> bool {
        self.contains(kind.flag())
    }

    /// Subscribed kinds in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = DerivedKind> + '_ {
        DerivedKind::ALL
            .into_iter()
            .filter(move |kind| self.subscribes(*kind))
    }
}

/// Hardware sensors the host device provides
///
/// Missing gravity and linear acceleration sensors are synthesized from the
/// accelerometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub has_gravity_sensor: bool,
    pub has_linear_acceleration_sensor: bool,
}

/// Derivation engine settings
///
/// # Example
/// ```
/// use motion_derive::{Capabilities, EngineSettings, Subscription};
///
/// let settings = EngineSettings {
///     subscription: Subscription::DIRECTION_NEGATIVE_Z | Subscription::INCLINATION,
///     capabilities: Capabilities { has_gravity_sensor: true, ..Default::default() },
///     history_length: 20, // smooth the bearing over 20 samples
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Requested outputs
    pub subscription: Subscription,
    /// Hardware sensors available on the host
    pub capabilities: Capabilities,
    /// Window length of bearing and world-vector averaging
    pub history_length: usize,
    /// Weight of the newest accelerometer sample in synthesized gravity
    ///
    /// Lower values reject more hand motion but track orientation changes slower.
    pub low_pass_coefficient: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            subscription: Subscription::empty(),
            capabilities: Capabilities::default(),
            history_length: 10,
            low_pass_coefficient: 0.1,
        }
    }
}
