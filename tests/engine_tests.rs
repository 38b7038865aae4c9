use motion_derive::{
    Accuracy, Axis, Capabilities, ConfigError, DerivationEngine, DerivedKind, EngineSettings,
    RawSample, SensorKind, Subscription,
};
use nalgebra::Vector3;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

const EPSILON: f32 = 1e-4;

const HARDWARE_GRAVITY: Capabilities = Capabilities {
    has_gravity_sensor: true,
    has_linear_acceleration_sensor: false,
};

fn sample(kind: SensorKind, vector: [f32; 3], accuracy: Accuracy, timestamp: u64) -> RawSample {
    RawSample::from_vector(kind, Vector3::from(vector), accuracy, timestamp)
}

fn high(kind: SensorKind, vector: [f32; 3], timestamp: u64) -> RawSample {
    sample(kind, vector, Accuracy::High, timestamp)
}

// Lying flat, face up, top edge pointing north
const FLAT_GRAVITY: [f32; 3] = [0.0, 0.0, 9.81];
const FLAT_NORTH_FIELD: [f32; 3] = [0.0, 22.0, -40.0];

// Upright in portrait, back camera pointing north
const UPRIGHT_GRAVITY: [f32; 3] = [0.0, 9.81, 0.0];
const UPRIGHT_NORTH_FIELD: [f32; 3] = [0.0, -40.0, -22.0];

fn scalar(outputs: &motion_derive::DerivedOutputs, kind: DerivedKind) -> f32 {
    outputs[&kind].values.scalar().unwrap()
}

fn vector(outputs: &motion_derive::DerivedOutputs, kind: DerivedKind) -> Vector3<f32> {
    outputs[&kind].values.vector().unwrap()
}

/// The first synthesized gravity is the accelerometer itself, then a 0.1 low-pass
#[test]
fn test_gravity_synthesis() {
    let mut engine =
        DerivationEngine::new(Subscription::GRAVITY, Capabilities::default(), 10).unwrap();

    let outputs = engine.ingest(high(SensorKind::Accelerometer, [0.0, 0.0, 10.0], 1));
    assert_eq!(outputs.len(), 1);
    assert_eq!(vector(&outputs, DerivedKind::Gravity), Vector3::new(0.0, 0.0, 10.0));

    let outputs = engine.ingest(sample(
        SensorKind::Accelerometer,
        [0.0, 0.0, 20.0],
        Accuracy::Medium,
        2,
    ));
    let gravity = &outputs[&DerivedKind::Gravity];
    assert!((gravity.values.vector().unwrap().z - 11.0).abs() < EPSILON);
    assert_eq!(gravity.accuracy, Accuracy::Medium);
    assert_eq!(gravity.timestamp, 2);
}

#[test]
fn test_synthesized_linear_acceleration_plus_gravity_is_accelerometer() {
    let mut engine = DerivationEngine::new(
        Subscription::GRAVITY | Subscription::LINEAR_ACCELERATION,
        Capabilities::default(),
        10,
    )
    .unwrap();

    let outputs = engine.ingest(high(SensorKind::Accelerometer, [0.3, -0.2, 9.7], 1));
    assert_eq!(vector(&outputs, DerivedKind::LinearAcceleration), Vector3::zeros());

    let accel = [1.5, 0.4, 11.0];
    let outputs = engine.ingest(high(SensorKind::Accelerometer, accel, 2));
    let gravity = vector(&outputs, DerivedKind::Gravity);
    let linear = vector(&outputs, DerivedKind::LinearAcceleration);
    assert!((gravity + linear - Vector3::from(accel)).magnitude() < EPSILON);
    assert_eq!(outputs[&DerivedKind::LinearAcceleration].timestamp, 2);
}

#[test]
fn test_linear_acceleration_from_hardware_gravity() {
    let mut engine =
        DerivationEngine::new(Subscription::LINEAR_ACCELERATION, HARDWARE_GRAVITY, 10).unwrap();

    // No gravity yet
    let outputs = engine.ingest(high(SensorKind::Accelerometer, [1.0, 0.0, 9.81], 1));
    assert!(outputs.is_empty());

    assert!(engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 2)).is_empty());

    let outputs = engine.ingest(high(SensorKind::Accelerometer, [1.0, 0.0, 9.81], 3));
    let linear = vector(&outputs, DerivedKind::LinearAcceleration);
    assert!((linear - Vector3::new(1.0, 0.0, 0.0)).magnitude() < EPSILON);
}

#[test]
fn test_flat_device_has_compass_bearings_only() {
    let mut engine = DerivationEngine::new(Subscription::DIRECTIONS, HARDWARE_GRAVITY, 10).unwrap();

    assert!(engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1)).is_empty());
    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 2));
    assert_eq!(outputs.len(), 6);

    assert!((scalar(&outputs, DerivedKind::DirectionX) - FRAC_PI_2).abs() < EPSILON);
    assert!((scalar(&outputs, DerivedKind::DirectionNegativeX) + FRAC_PI_2).abs() < EPSILON);
    assert!(scalar(&outputs, DerivedKind::DirectionY).abs() < EPSILON);
    assert!((scalar(&outputs, DerivedKind::DirectionNegativeY).abs() - PI).abs() < EPSILON);

    for kind in [DerivedKind::DirectionZ, DerivedKind::DirectionNegativeZ] {
        let bearing = &outputs[&kind];
        assert!(bearing.is_undefined(), "{:?}", kind);
        assert_eq!(bearing.accuracy, Accuracy::Unreliable);
        assert_eq!(bearing.timestamp, 2);
    }
}

#[test]
fn test_upright_device_has_camera_bearings_only() {
    let mut engine = DerivationEngine::new(Subscription::DIRECTIONS, HARDWARE_GRAVITY, 10).unwrap();

    engine.ingest(high(SensorKind::MagneticField, UPRIGHT_NORTH_FIELD, 1));
    let outputs = engine.ingest(high(SensorKind::Gravity, UPRIGHT_GRAVITY, 2));

    assert!(scalar(&outputs, DerivedKind::DirectionNegativeZ).abs() < EPSILON);
    assert!((scalar(&outputs, DerivedKind::DirectionZ).abs() - PI).abs() < EPSILON);
    for kind in [
        DerivedKind::DirectionX,
        DerivedKind::DirectionNegativeX,
        DerivedKind::DirectionY,
        DerivedKind::DirectionNegativeY,
    ] {
        assert!(outputs[&kind].is_undefined(), "{:?}", kind);
    }
}

#[test]
fn test_bearing_carries_worst_accuracy_and_latest_timestamp() {
    let mut engine = DerivationEngine::new(Subscription::DIRECTION_Y, HARDWARE_GRAVITY, 10).unwrap();

    engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 3));
    let outputs = engine.ingest(sample(
        SensorKind::MagneticField,
        FLAT_NORTH_FIELD,
        Accuracy::Low,
        5,
    ));
    let bearing = &outputs[&DerivedKind::DirectionY];
    assert_eq!(bearing.accuracy, Accuracy::Low);
    assert_eq!(bearing.timestamp, 5);
}

#[test]
fn test_bearing_history_resets_when_leaving_regime() {
    let mut engine = DerivationEngine::new(Subscription::DIRECTION_Y, HARDWARE_GRAVITY, 10).unwrap();

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1));
    engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 2));

    // Tilt upright: the compass bearing is undefined
    let outputs = engine.ingest(high(SensorKind::Gravity, UPRIGHT_GRAVITY, 3));
    assert!(outputs[&DerivedKind::DirectionY].is_undefined());

    // Lay flat again, top edge facing east: no trace of the northward average
    let outputs = engine.ingest(high(SensorKind::MagneticField, [-22.0, 0.0, -40.0], 4));
    assert!(outputs[&DerivedKind::DirectionY].is_undefined());
    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 5));
    assert!((scalar(&outputs, DerivedKind::DirectionY) - FRAC_PI_2).abs() < EPSILON);
}

#[test]
fn test_gyroscope_only_never_builds_rotation() {
    let mut engine =
        DerivationEngine::new(Subscription::GYROSCOPE, Capabilities::default(), 10).unwrap();

    assert!(engine.ingest(high(SensorKind::Accelerometer, FLAT_GRAVITY, 1)).is_empty());
    assert!(engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 2)).is_empty());
    let outputs = engine.ingest(high(SensorKind::Gyroscope, [0.1, 0.2, 0.3], 3));

    assert_eq!(outputs.len(), 1);
    assert_eq!(vector(&outputs, DerivedKind::Gyroscope), Vector3::new(0.1, 0.2, 0.3));
    assert!(engine.rotation_matrix().is_none());
    assert_eq!(engine.summary().rotation_updates, 0);
}

#[test]
fn test_unrelated_samples_emit_nothing() {
    let mut engine = DerivationEngine::new(Subscription::PITCH, Capabilities::default(), 10).unwrap();

    assert!(engine.ingest(high(SensorKind::Gyroscope, [0.1, 0.2, 0.3], 1)).is_empty());
    assert!(engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 2)).is_empty());
    assert!(engine.ingest(high(SensorKind::RotationVector, [0.0, 0.0, 0.0], 3)).is_empty());
    assert!(!engine.ingest(high(SensorKind::Accelerometer, FLAT_GRAVITY, 4)).is_empty());
}

#[test]
fn test_angles_from_gravity_alone() {
    let mut engine = DerivationEngine::new(Subscription::ANGLES, HARDWARE_GRAVITY, 10).unwrap();

    let outputs = engine.ingest(high(SensorKind::Gravity, UPRIGHT_GRAVITY, 1));
    assert_eq!(outputs.len(), 4);
    assert!((scalar(&outputs, DerivedKind::Inclination) - FRAC_PI_2).abs() < EPSILON);
    assert!((scalar(&outputs, DerivedKind::Pitch) + FRAC_PI_2).abs() < EPSILON);
    assert!(scalar(&outputs, DerivedKind::DeviceRotation).abs() < EPSILON);

    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 2));
    assert!(scalar(&outputs, DerivedKind::Inclination).abs() < EPSILON);
    assert!(outputs[&DerivedKind::DeviceRotation].is_undefined());
    assert!(scalar(&outputs, DerivedKind::Roll).abs() < EPSILON);
}

#[test]
fn test_angles_fall_back_to_gravity_without_rotation() {
    let mut engine = DerivationEngine::new(
        Subscription::PITCH | Subscription::DIRECTION_Y,
        HARDWARE_GRAVITY,
        10,
    )
    .unwrap();

    // No magnetic field yet
    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 1));
    assert!(outputs.contains_key(&DerivedKind::Pitch));
    assert!(!outputs.contains_key(&DerivedKind::DirectionY));

    let outputs = engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 2));
    assert!(outputs.contains_key(&DerivedKind::Pitch));
    assert!(outputs.contains_key(&DerivedKind::DirectionY));

    // Field parallel to gravity: no rotation, bearings stop
    assert!(engine.ingest(high(SensorKind::MagneticField, [0.0, 0.0, -40.0], 3)).is_empty());
    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 4));
    assert!(outputs.contains_key(&DerivedKind::Pitch));
    assert!(!outputs.contains_key(&DerivedKind::DirectionY));
    assert_eq!(engine.summary().degenerate_rotations, 2);
}

#[test]
fn test_world_vectors_are_averaged() {
    let mut engine = DerivationEngine::new(
        Subscription::WORLD_GRAVITY | Subscription::WORLD_MAGNETIC_FIELD,
        HARDWARE_GRAVITY,
        10,
    )
    .unwrap();

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1));
    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 2));
    assert!((vector(&outputs, DerivedKind::WorldGravity) - Vector3::from(FLAT_GRAVITY)).magnitude() < EPSILON);
    assert!(
        (vector(&outputs, DerivedKind::WorldMagneticField) - Vector3::from(FLAT_NORTH_FIELD))
            .magnitude()
            < EPSILON
    );

    let outputs = engine.ingest(high(SensorKind::Gravity, [0.0, 0.0, 9.0], 3));
    let world_gravity = &outputs[&DerivedKind::WorldGravity];
    assert!((world_gravity.values.vector().unwrap().z - 9.405).abs() < EPSILON);
    assert_eq!(world_gravity.timestamp, 3);
}

#[test]
fn test_world_accelerometer_with_synthesized_gravity() {
    let mut engine = DerivationEngine::new(
        Subscription::WORLD_ACCELEROMETER,
        Capabilities::default(),
        10,
    )
    .unwrap();

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1));
    let outputs = engine.ingest(high(SensorKind::Accelerometer, FLAT_GRAVITY, 2));
    assert_eq!(outputs.len(), 1);
    assert!(
        (vector(&outputs, DerivedKind::WorldAccelerometer) - Vector3::from(FLAT_GRAVITY))
            .magnitude()
            < EPSILON
    );
}

#[test]
fn test_hardware_linear_acceleration_projected_on_arrival() {
    let capabilities = Capabilities {
        has_gravity_sensor: true,
        has_linear_acceleration_sensor: true,
    };
    let mut engine =
        DerivationEngine::new(Subscription::WORLD_LINEAR_ACCELERATION, capabilities, 10).unwrap();

    // No rotation yet
    assert!(engine.ingest(high(SensorKind::LinearAcceleration, [1.0, 2.0, 3.0], 1)).is_empty());

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 2));
    assert!(engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 3)).is_empty());

    let outputs = engine.ingest(high(SensorKind::LinearAcceleration, [1.0, 2.0, 3.0], 4));
    let world = &outputs[&DerivedKind::WorldLinearAcceleration];
    assert!((world.values.vector().unwrap() - Vector3::new(1.0, 2.0, 3.0)).magnitude() < EPSILON);
    assert_eq!(world.timestamp, 4);
}

#[test]
fn test_synthesized_linear_acceleration_in_world_frame() {
    let mut engine = DerivationEngine::new(
        Subscription::WORLD_LINEAR_ACCELERATION,
        Capabilities::default(),
        10,
    )
    .unwrap();

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1));
    let outputs = engine.ingest(high(SensorKind::Accelerometer, FLAT_GRAVITY, 2));
    assert!(vector(&outputs, DerivedKind::WorldLinearAcceleration).magnitude() < EPSILON);

    // Linear acceleration of 0.9 m/s² averaged with the previous zero
    let outputs = engine.ingest(high(SensorKind::Accelerometer, [1.0, 0.0, 9.81], 3));
    let world = vector(&outputs, DerivedKind::WorldLinearAcceleration);
    assert!((world.magnitude() - 0.45).abs() < EPSILON, "{}", world);
}

#[test]
fn test_world_accelerometer_with_hardware_gravity() {
    let mut engine =
        DerivationEngine::new(Subscription::WORLD_ACCELEROMETER, HARDWARE_GRAVITY, 10).unwrap();

    assert!(engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 1)).is_empty());
    assert!(engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 2)).is_empty());

    let outputs = engine.ingest(high(SensorKind::Accelerometer, [3.0, 0.0, 9.81], 3));
    let world = &outputs[&DerivedKind::WorldAccelerometer];
    assert!((world.values.vector().unwrap() - Vector3::new(3.0, 0.0, 9.81)).magnitude() < EPSILON);
    assert_eq!(world.timestamp, 3);

    // A new field reading must not average the same accelerometer reading twice
    let outputs = engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 4));
    assert!(!outputs.contains_key(&DerivedKind::WorldAccelerometer));

    let outputs = engine.ingest(high(SensorKind::Accelerometer, [1.0, 0.0, 9.81], 5));
    let world = &outputs[&DerivedKind::WorldAccelerometer];
    assert!((world.values.vector().unwrap() - Vector3::new(2.0, 0.0, 9.81)).magnitude() < EPSILON);
    assert_eq!(world.timestamp, 5);
}

#[test]
fn test_synthesized_linear_acceleration_with_hardware_gravity() {
    let mut engine =
        DerivationEngine::new(Subscription::WORLD_LINEAR_ACCELERATION, HARDWARE_GRAVITY, 10)
            .unwrap();

    engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 1));
    assert!(engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 2)).is_empty());

    let outputs = engine.ingest(high(SensorKind::Accelerometer, [1.0, 0.0, 9.81], 3));
    let world = vector(&outputs, DerivedKind::WorldLinearAcceleration);
    assert!((world - Vector3::new(1.0, 0.0, 0.0)).magnitude() < EPSILON, "{}", world);
}

#[test]
fn test_matrix_chain_pitch_and_roll() {
    let mut engine = DerivationEngine::new(
        Subscription::PITCH | Subscription::ROLL | Subscription::DIRECTION_X,
        HARDWARE_GRAVITY,
        10,
    )
    .unwrap();

    engine.ingest(sample(SensorKind::MagneticField, FLAT_NORTH_FIELD, Accuracy::Low, 1));
    let outputs = engine.ingest(high(SensorKind::Gravity, [2.0, 4.0, 8.5], 2));
    assert!(engine.rotation_matrix().is_some());

    let norm = Vector3::new(2.0f32, 4.0, 8.5).norm();
    assert!((scalar(&outputs, DerivedKind::Pitch) - (-4.0 / norm).asin()).abs() < EPSILON);
    assert!(
        (scalar(&outputs, DerivedKind::Roll) - (-2.0 / norm).atan2(8.5 / norm)).abs() < EPSILON
    );

    // Stamped from both matrix inputs, not from gravity alone
    let pitch = &outputs[&DerivedKind::Pitch];
    assert_eq!(pitch.accuracy, Accuracy::Low);
    assert_eq!(pitch.timestamp, 2);
}

#[test]
fn test_subscribed_axes_follow_flatness() {
    let regimes = [
        (FLAT_GRAVITY, FLAT_NORTH_FIELD, false),
        (UPRIGHT_GRAVITY, UPRIGHT_NORTH_FIELD, true),
    ];

    for mask in 1..(1u32 << Axis::ALL.len()) {
        let axes: Vec<Axis> = Axis::ALL
            .into_iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, axis)| axis)
            .collect();
        let subscription = axes
            .iter()
            .fold(Subscription::empty(), |acc, axis| acc | axis.derived_kind().flag());

        for (gravity, field, tilted) in regimes {
            let mut engine = DerivationEngine::new(subscription, HARDWARE_GRAVITY, 10).unwrap();
            engine.ingest(high(SensorKind::MagneticField, field, 1));
            let outputs = engine.ingest(high(SensorKind::Gravity, gravity, 2));

            assert_eq!(outputs.len(), axes.len(), "{:?}", axes);
            for axis in &axes {
                let bearing = &outputs[&axis.derived_kind()];
                assert_eq!(
                    !bearing.is_undefined(),
                    axis.is_camera() == tilted,
                    "{:?} in {:?}, tilted: {}",
                    axis,
                    axes,
                    tilted
                );
            }
        }
    }
}

#[test]
fn test_compass_and_camera_axes_together() {
    let mut engine = DerivationEngine::new(
        Subscription::DIRECTION_X | Subscription::DIRECTION_NEGATIVE_Z,
        HARDWARE_GRAVITY,
        10,
    )
    .unwrap();

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1));
    let outputs = engine.ingest(high(SensorKind::Gravity, FLAT_GRAVITY, 2));
    assert_eq!(outputs.len(), 2);
    assert!((scalar(&outputs, DerivedKind::DirectionX) - FRAC_PI_2).abs() < EPSILON);
    assert!(outputs[&DerivedKind::DirectionNegativeZ].is_undefined());

    engine.ingest(high(SensorKind::MagneticField, UPRIGHT_NORTH_FIELD, 3));
    let outputs = engine.ingest(high(SensorKind::Gravity, UPRIGHT_GRAVITY, 4));
    assert!(outputs[&DerivedKind::DirectionX].is_undefined());
    assert!(scalar(&outputs, DerivedKind::DirectionNegativeZ).abs() < EPSILON);
}

#[test]
fn test_rotation_vector_drives_bearings() {
    let mut engine = DerivationEngine::new(
        Subscription::DIRECTION_Y | Subscription::ROTATION_VECTOR,
        Capabilities::default(),
        1,
    )
    .unwrap();

    let outputs = engine.ingest(high(SensorKind::RotationVector, [0.0, 0.0, 0.0], 1));
    assert!(outputs.contains_key(&DerivedKind::RotationVector));
    assert!(scalar(&outputs, DerivedKind::DirectionY).abs() < EPSILON);

    // A quarter turn counter-clockwise: the top edge points west
    let outputs = engine.ingest(high(SensorKind::RotationVector, [0.0, 0.0, FRAC_PI_4.sin()], 2));
    assert!((scalar(&outputs, DerivedKind::DirectionY) + FRAC_PI_2).abs() < EPSILON);
    assert_eq!(engine.summary().rotation_updates, 2);
}

#[test]
fn test_configuration_errors() {
    assert_eq!(
        Subscription::from_raw(1 << 31),
        Err(ConfigError::UnknownSubscriptionBits(1 << 31))
    );
    assert_eq!(
        DerivationEngine::new(Subscription::empty(), Capabilities::default(), 10).err(),
        Some(ConfigError::EmptySubscription)
    );
    assert_eq!(
        DerivationEngine::new(Subscription::WORLD_GRAVITY, Capabilities::default(), 0).err(),
        Some(ConfigError::ZeroHistoryLength)
    );

    for coefficient in [0.0, -0.5, 1.5, f32::NAN] {
        let settings = EngineSettings {
            subscription: Subscription::GRAVITY,
            low_pass_coefficient: coefficient,
            ..Default::default()
        };
        assert!(matches!(
            DerivationEngine::with_settings(settings),
            Err(ConfigError::InvalidLowPassCoefficient(_))
        ));
    }

    let settings = EngineSettings {
        subscription: Subscription::GRAVITY,
        low_pass_coefficient: 1.0,
        ..Default::default()
    };
    assert!(DerivationEngine::with_settings(settings).is_ok());
}

#[test]
fn test_required_sensors() {
    let engine = DerivationEngine::new(
        Subscription::DIRECTION_NEGATIVE_Z | Subscription::GYROSCOPE,
        HARDWARE_GRAVITY,
        10,
    )
    .unwrap();
    assert_eq!(
        engine.plan().required_sensors(),
        vec![SensorKind::MagneticField, SensorKind::Gyroscope, SensorKind::Gravity]
    );
}

#[test]
fn test_reset_and_finish() {
    let mut engine = DerivationEngine::new(
        Subscription::DIRECTION_Y | Subscription::MAGNETIC_FIELD,
        Capabilities::default(),
        10,
    )
    .unwrap();

    engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 1));
    engine.ingest(high(SensorKind::Accelerometer, FLAT_GRAVITY, 2));
    assert!(engine.rotation_matrix().is_some());

    engine.reset();
    assert!(engine.rotation_matrix().is_none());

    // Gravity was forgotten, so the field alone builds nothing
    let outputs = engine.ingest(high(SensorKind::MagneticField, FLAT_NORTH_FIELD, 3));
    assert_eq!(outputs.len(), 1);
    assert!(engine.rotation_matrix().is_none());

    let summary = engine.finish();
    assert_eq!(summary.samples_ingested, 3);
    assert_eq!(summary.outputs_emitted, 3);
    assert_eq!(summary.rotation_updates, 1);
    assert_eq!(summary.degenerate_rotations, 0);
}
