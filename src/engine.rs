//! Derivation engine: turns raw sensor samples into the subscribed derived quantities

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use log::{debug, trace};
use nalgebra::Matrix3;

use crate::attitude;
use crate::direction::DirectionCalculator;
use crate::error::ConfigError;
use crate::plan::{DerivationPlan, GravityStep, MatrixStep};
use crate::rotation::{RotationSource, SensorManagerRotation};
use crate::types::{
    Accuracy, Capabilities, DerivedKind, EngineSettings, RawSample, Sample, SensorKind,
    Subscription,
};
use crate::window::VectorWindow;

/// Derived quantities that changed during one ingest call
///
/// An empty map means nothing observable changed and listeners need not be notified.
pub type DerivedOutputs = BTreeMap<DerivedKind, Sample>;

/// Counters describing a derivation session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Raw samples passed to `ingest`
    pub samples_ingested: u64,
    /// Derived samples returned to the host
    pub outputs_emitted: u64,
    /// Rotation matrices computed
    pub rotation_updates: u64,
    /// Gravity and magnetic field pairs rejected as degenerate
    pub degenerate_rotations: u64,
}

/// Accuracy and timestamp attached to samples derived in one chain
#[derive(Debug, Clone, Copy)]
struct Stamp {
    accuracy: Accuracy,
    timestamp: u64,
}

impl Stamp {
    fn of(sample: &RawSample) -> Self {
        Self {
            accuracy: sample.accuracy,
            timestamp: sample.timestamp,
        }
    }

    /// Worst accuracy, latest timestamp
    fn combine(first: &RawSample, second: &RawSample) -> Self {
        Self {
            accuracy: first.accuracy.min(second.accuracy),
            timestamp: first.timestamp.max(second.timestamp),
        }
    }
}

/// Averaging window of one world-basis output
#[derive(Debug, Clone)]
struct WorldChannel {
    kind: DerivedKind,
    window: VectorWindow,
    /// Device reading most recently added, so each reading is averaged once
    last_input: Option<RawSample>,
}

/// Collects the subscribed outputs of one ingest call
struct Emitter {
    subscription: Subscription,
    outputs: DerivedOutputs,
}

impl Emitter {
    fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            outputs: BTreeMap::new(),
        }
    }

    fn emit(&mut self, kind: DerivedKind, sample: Sample) {
        if self.subscription.subscribes(kind) {
            self.outputs.insert(kind, sample);
        }
    }
}

/// Derivation engine
///
/// Owns all state of one subscription session: cached raw readings, the latest
/// rotation matrix and the averaging windows. Samples are processed one at a
/// time by [`ingest`](Self::ingest), which returns only the outputs that
/// changed.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use motion_derive::{
///     Accuracy, Capabilities, DerivationEngine, DerivedKind, RawSample, SensorKind, Subscription,
/// };
///
/// let mut engine = DerivationEngine::new(
///     Subscription::PITCH | Subscription::ROLL,
///     Capabilities::default(),
///     10,
/// )?;
///
/// let accel = RawSample::from_vector(
///     SensorKind::Accelerometer,
///     Vector3::new(0.0, 0.0, 9.81),
///     Accuracy::High,
///     1_000,
/// );
/// let outputs = engine.ingest(accel);
/// assert!(outputs.contains_key(&DerivedKind::Pitch));
/// assert!(outputs.contains_key(&DerivedKind::Roll));
/// # Ok::<(), motion_derive::ConfigError>(())
/// ```
pub struct DerivationEngine<R: RotationSource = SensorManagerRotation> {
    /// Engine settings
    settings: EngineSettings,
    /// What to compute, resolved once from the settings
    plan: DerivationPlan,
    /// Host primitive building rotation matrices
    rotation_source: R,
    /// Last accelerometer reading, kept for the world-basis accelerometer
    accelerometer: Option<RawSample>,
    /// Last gravity, from hardware or synthesized
    gravity: Option<RawSample>,
    /// Last magnetic field reading
    magnetic_field: Option<RawSample>,
    /// Last synthesized linear acceleration
    linear_acceleration: Option<RawSample>,
    /// Latest device-to-world rotation
    rotation: Option<Matrix3<f32>>,
    /// One smoothed bearing per subscribed axis
    directions: Vec<DirectionCalculator>,
    /// One averaging window per subscribed world-basis vector
    world: Vec<WorldChannel>,
    /// Session counters
    summary: SessionSummary,
}

impl DerivationEngine {
    /// Create an engine with the default rotation source
    pub fn new(
        subscription: Subscription,
        capabilities: Capabilities,
        history_length: usize,
    ) -> Result<Self, ConfigError> {
        Self::with_settings(EngineSettings {
            subscription,
            capabilities,
            history_length,
            ..Default::default()
        })
    }

    /// Create an engine from settings with the default rotation source
    pub fn with_settings(settings: EngineSettings) -> Result<Self, ConfigError> {
        Self::with_rotation_source(settings, SensorManagerRotation::default())
    }
}

impl<R: RotationSource> DerivationEngine<R> {
    /// Create an engine using a host-provided rotation source
    pub fn with_rotation_source(
        settings: EngineSettings,
        rotation_source: R,
    ) -> Result<Self, ConfigError> {
        if settings.subscription.is_empty() {
            return Err(ConfigError::EmptySubscription);
        }
        let alpha = settings.low_pass_coefficient;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidLowPassCoefficient(alpha));
        }

        let plan = DerivationPlan::resolve(settings.subscription, settings.capabilities);
        if plan.needs_history() && settings.history_length == 0 {
            return Err(ConfigError::ZeroHistoryLength);
        }

        let directions = plan
            .directions()
            .map(|axis| DirectionCalculator::new(axis, settings.history_length))
            .collect();
        let world = plan
            .world_vectors()
            .map(|kind| WorldChannel {
                kind,
                window: VectorWindow::new(settings.history_length),
                last_input: None,
            })
            .collect();

        debug!(
            "derivation plan: subscription={:#x} rotation_matrix={} gravity_calc={} linear_calc={} retention={:?}",
            settings.subscription.bits(),
            plan.needs_rotation_matrix(),
            plan.needs_gravity_calc(),
            plan.needs_linear_acceleration_calc(),
            plan.retention(),
        );

        Ok(Self {
            settings,
            plan,
            rotation_source,
            accelerometer: None,
            gravity: None,
            magnetic_field: None,
            linear_acceleration: None,
            rotation: None,
            directions,
            world,
            summary: SessionSummary::default(),
        })
    }

    /// Process one raw sample and return the derived outputs it changed
    pub fn ingest(&mut self, sample: RawSample) -> DerivedOutputs {
        let mut out = Emitter::new(self.plan.subscription());

        match sample.kind {
            SensorKind::Accelerometer => self.on_accelerometer(sample, &mut out),
            SensorKind::Gravity => self.on_gravity(sample, &mut out),
            SensorKind::MagneticField => self.on_magnetic_field(sample, &mut out),
            SensorKind::LinearAcceleration => self.on_linear_acceleration(sample, &mut out),
            SensorKind::RotationVector => self.on_rotation_vector(sample, &mut out),
            SensorKind::Gyroscope => out.emit(DerivedKind::Gyroscope, sample.to_sample()),
            SensorKind::Orientation => out.emit(DerivedKind::Orientation, sample.to_sample()),
        }

        let outputs = out.outputs;
        self.summary.samples_ingested += 1;
        self.summary.outputs_emitted += outputs.len() as u64;
        trace!(
            "ingested {:?} at {}: {} outputs",
            sample.kind,
            sample.timestamp,
            outputs.len()
        );
        outputs
    }

    fn on_accelerometer(&mut self, sample: RawSample, out: &mut Emitter) {
        out.emit(DerivedKind::Accelerometer, sample.to_sample());
        if self.plan.retention().accelerometer {
            self.accelerometer = Some(sample);
        }

        if self.plan.needs_gravity_calc() {
            self.synthesize_gravity(&sample, out);
        }
        if self.plan.needs_linear_acceleration_calc() {
            self.synthesize_linear_acceleration(&sample, out);
        }
        self.refresh_attitude(true, out);
    }

    fn synthesize_gravity(&mut self, accelerometer: &RawSample, out: &mut Emitter) {
        let alpha = self.settings.low_pass_coefficient;
        let Some(gravity) = attitude::low_pass_gravity(accelerometer, self.gravity.as_ref(), alpha)
        else {
            return;
        };
        self.gravity = Some(gravity);
        out.emit(DerivedKind::Gravity, gravity.to_sample());
    }

    fn synthesize_linear_acceleration(&mut self, accelerometer: &RawSample, out: &mut Emitter) {
        let Some(accel) = accelerometer.vector() else {
            return;
        };
        let Some(gravity) = self.gravity.and_then(|gravity| gravity.vector()) else {
            return;
        };

        let linear = RawSample::from_vector(
            SensorKind::LinearAcceleration,
            attitude::linear_acceleration(&accel, &gravity),
            accelerometer.accuracy,
            accelerometer.timestamp,
        );
        if self.plan.retention().linear_acceleration {
            self.linear_acceleration = Some(linear);
        }
        out.emit(DerivedKind::LinearAcceleration, linear.to_sample());
    }

    fn on_gravity(&mut self, sample: RawSample, out: &mut Emitter) {
        if self.plan.retention().gravity {
            self.gravity = Some(sample);
        }
        out.emit(DerivedKind::Gravity, sample.to_sample());
        self.refresh_attitude(true, out);
    }

    /// Rebuild the rotation and run the matrix chain when gravity and the
    /// magnetic field are both cached
    ///
    /// Without a usable rotation the gravity-only chain runs instead when
    /// `gravity_fallback` is set.
    fn refresh_attitude(&mut self, gravity_fallback: bool, out: &mut Emitter) {
        if self.plan.needs_rotation_matrix()
            && self.gravity.is_some()
            && self.magnetic_field.is_some()
        {
            if let Some(stamp) = self.update_rotation_from_magnetic_field() {
                self.run_matrix_chain(stamp, out);
                return;
            }
        }
        if gravity_fallback {
            self.run_gravity_chain(out);
        }
    }

    fn on_magnetic_field(&mut self, sample: RawSample, out: &mut Emitter) {
        if self.plan.retention().magnetic_field {
            self.magnetic_field = Some(sample);
        }
        out.emit(DerivedKind::MagneticField, sample.to_sample());
        self.refresh_attitude(false, out);
    }

    fn on_linear_acceleration(&mut self, sample: RawSample, out: &mut Emitter) {
        out.emit(DerivedKind::LinearAcceleration, sample.to_sample());

        // Synthesized linear acceleration is projected by the matrix chain
        if !self.plan.subscribes(DerivedKind::WorldLinearAcceleration)
            || self.plan.needs_linear_acceleration_calc()
        {
            return;
        }
        let Some(rotation) = self.rotation else {
            return;
        };
        if let Some(average) = Self::project(
            &mut self.world,
            DerivedKind::WorldLinearAcceleration,
            &sample,
            &rotation,
            Stamp::of(&sample),
        ) {
            out.emit(DerivedKind::WorldLinearAcceleration, average);
        }
    }

    fn on_rotation_vector(&mut self, sample: RawSample, out: &mut Emitter) {
        out.emit(DerivedKind::RotationVector, sample.to_sample());
        if !self.plan.needs_rotation_matrix() {
            return;
        }
        let Some(rotation_vector) = sample.vector() else {
            return;
        };

        self.rotation = Some(self.rotation_source.from_rotation_vector(&rotation_vector));
        self.summary.rotation_updates += 1;
        self.run_matrix_chain(Stamp::of(&sample), out);
    }

    /// Rebuild the rotation from the cached gravity and magnetic field
    ///
    /// A degenerate pair drops the previous rotation so that no output is
    /// derived from an attitude the device has left.
    fn update_rotation_from_magnetic_field(&mut self) -> Option<Stamp> {
        let gravity = self.gravity?;
        let magnetic_field = self.magnetic_field?;

        let rotation = self
            .rotation_source
            .from_gravity_and_magnetic_field(&gravity.vector()?, &magnetic_field.vector()?);
        self.rotation = rotation;

        match rotation {
            Some(_) => {
                self.summary.rotation_updates += 1;
                Some(Stamp::combine(&gravity, &magnetic_field))
            }
            None => {
                self.summary.degenerate_rotations += 1;
                debug!(
                    "degenerate gravity/magnetic field pair at {}",
                    magnetic_field.timestamp.max(gravity.timestamp)
                );
                None
            }
        }
    }

    fn run_matrix_chain(&mut self, stamp: Stamp, out: &mut Emitter) {
        let Some(rotation) = self.rotation else {
            return;
        };
        let inclination = attitude::inclination(&rotation);
        let scalar = |value: f32| Sample::scalar(value, stamp.accuracy, stamp.timestamp);

        for step in self.plan.matrix_steps() {
            match *step {
                MatrixStep::Roll => out.emit(DerivedKind::Roll, scalar(attitude::roll(&rotation))),
                MatrixStep::Pitch => {
                    out.emit(DerivedKind::Pitch, scalar(attitude::pitch(&rotation)))
                }
                MatrixStep::WorldVector(kind) => {
                    let Some(device) = kind.device_counterpart().and_then(|kind| self.cached(kind))
                    else {
                        continue;
                    };
                    let stamp = Stamp {
                        accuracy: stamp.accuracy.min(device.accuracy),
                        timestamp: stamp.timestamp.max(device.timestamp),
                    };
                    if let Some(average) =
                        Self::project(&mut self.world, kind, &device, &rotation, stamp)
                    {
                        out.emit(kind, average);
                    }
                }
                MatrixStep::Inclination => out.emit(DerivedKind::Inclination, scalar(inclination)),
                MatrixStep::Direction(axis) => {
                    if let Some(calculator) = self
                        .directions
                        .iter_mut()
                        .find(|calculator| calculator.axis() == axis)
                    {
                        let sample =
                            calculator.update(&rotation, inclination, stamp.accuracy, stamp.timestamp);
                        out.emit(axis.derived_kind(), sample);
                    }
                }
                MatrixStep::DeviceRotation => out.emit(
                    DerivedKind::DeviceRotation,
                    scalar(attitude::device_rotation(&rotation)),
                ),
            }
        }
    }

    fn run_gravity_chain(&self, out: &mut Emitter) {
        let Some(sample) = self.gravity else {
            return;
        };
        let Some(gravity) = sample.vector() else {
            return;
        };

        for step in self.plan.gravity_steps() {
            let (kind, value) = match step {
                GravityStep::Inclination => (
                    DerivedKind::Inclination,
                    attitude::inclination_from_gravity(&gravity),
                ),
                GravityStep::DeviceRotation => (
                    DerivedKind::DeviceRotation,
                    attitude::device_rotation_from_gravity(&gravity),
                ),
                GravityStep::Pitch => (DerivedKind::Pitch, attitude::pitch_from_gravity(&gravity)),
                GravityStep::Roll => (DerivedKind::Roll, attitude::roll_from_gravity(&gravity)),
            };
            out.emit(kind, Sample::scalar(value, sample.accuracy, sample.timestamp));
        }
    }

    /// Cached device-basis reading backing a world-basis output
    fn cached(&self, kind: DerivedKind) -> Option<RawSample> {
        match kind {
            DerivedKind::Accelerometer => self.accelerometer,
            DerivedKind::Gravity => self.gravity,
            DerivedKind::LinearAcceleration => self.linear_acceleration,
            DerivedKind::MagneticField => self.magnetic_field,
            _ => None,
        }
    }

    /// Add a device-basis reading to the window of `kind` and return the new average
    ///
    /// Returns `None` when the reading was already added.
    fn project(
        world: &mut [WorldChannel],
        kind: DerivedKind,
        device: &RawSample,
        rotation: &Matrix3<f32>,
        stamp: Stamp,
    ) -> Option<Sample> {
        let channel = world.iter_mut().find(|channel| channel.kind == kind)?;
        if channel.last_input.as_ref() == Some(device) {
            return None;
        }
        if !channel
            .window
            .add(&device.values, rotation, stamp.accuracy, stamp.timestamp)
        {
            return None;
        }
        channel.last_input = Some(*device);
        channel.window.average()
    }

    /// The resolved derivation plan
    pub fn plan(&self) -> &DerivationPlan {
        &self.plan
    }

    /// Current settings
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Latest rotation matrix, if one has been computed
    pub fn rotation_matrix(&self) -> Option<Matrix3<f32>> {
        self.rotation
    }

    /// Counters for the session so far
    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Forget all cached readings, the rotation and smoothing history
    ///
    /// Configuration and session counters are kept.
    pub fn reset(&mut self) {
        self.accelerometer = None;
        self.gravity = None;
        self.magnetic_field = None;
        self.linear_acceleration = None;
        self.rotation = None;
        for calculator in &mut self.directions {
            calculator.clear();
        }
        for channel in &mut self.world {
            channel.window.clear();
            channel.last_input = None;
        }
    }

    /// End the session and return its counters
    pub fn finish(self) -> SessionSummary {
        debug!(
            "derivation session finished: {} samples in, {} outputs out, {} rotations ({} degenerate)",
            self.summary.samples_ingested,
            self.summary.outputs_emitted,
            self.summary.rotation_updates,
            self.summary.degenerate_rotations,
        );
        self.summary
    }
}
