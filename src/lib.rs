#![no_std]

//! Motion derive - derived motion quantities from raw smartphone sensors
//!
//! Turns a stream of raw accelerometer, magnetometer, gravity, gyroscope and
//! rotation-vector readings into the quantities an application actually wants:
//! pitch, roll, inclination, device rotation, compass and camera bearings, and
//! sensor vectors expressed in the world (East-North-Up) frame.
//!
//! # Features
//!
//! - Computes only what the subscription needs, resolved once at configuration
//! - Synthesizes gravity and linear acceleration on devices without those sensors
//! - Circular averaging of bearings across the ±π seam
//! - Bearings that switch between compass (flat) and camera (upright) regimes
//! - Pluggable rotation-matrix source for host platform primitives
//! - `#![no_std]` compatible, needs only `alloc`
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use motion_derive::{
//!     Accuracy, Capabilities, DerivationEngine, DerivedKind, RawSample, SensorKind, Subscription,
//! };
//!
//! let mut engine = DerivationEngine::new(
//!     Subscription::DIRECTION_NEGATIVE_Z | Subscription::INCLINATION,
//!     Capabilities { has_gravity_sensor: true, ..Default::default() },
//!     10,
//! )?;
//!
//! // Upright in portrait, back camera facing north
//! engine.ingest(RawSample::from_vector(
//!     SensorKind::MagneticField,
//!     Vector3::new(0.0, -40.0, -22.0), // µT
//!     Accuracy::High,
//!     1_000_000,
//! ));
//! let outputs = engine.ingest(RawSample::from_vector(
//!     SensorKind::Gravity,
//!     Vector3::new(0.0, 9.81, 0.0), // m/s²
//!     Accuracy::High,
//!     2_000_000,
//! ));
//!
//! let bearing = outputs[&DerivedKind::DirectionNegativeZ].values.scalar().unwrap();
//! assert!(bearing.abs() < 1e-4);
//! # Ok::<(), motion_derive::ConfigError>(())
//! ```

extern crate alloc;

pub mod attitude;
pub mod direction;
mod engine;
mod error;
pub mod math;
pub mod plan;
pub mod rotation;
mod types;
pub mod window;

pub use direction::Axis;
pub use engine::{DerivationEngine, DerivedOutputs, SessionSummary};
pub use error::ConfigError;
pub use math::{DEG_TO_RAD, RAD_TO_DEG, wrap_two_pi};
pub use plan::DerivationPlan;
pub use rotation::{RotationSource, SensorManagerRotation};
pub use types::*;
