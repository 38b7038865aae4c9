//! Fixed-capacity sliding windows used to smooth bearings and world-frame vectors

use alloc::collections::VecDeque;

use nalgebra::{Matrix3, Vector3};

use crate::math::{CircularSum, rotate};
use crate::types::{Accuracy, Sample, SampleValues};

#[derive(Debug, Clone, Copy)]
struct Entry<T> {
    value: T,
    accuracy: Accuracy,
    timestamp: u64,
}

/// Bounded FIFO shared by both window flavours
#[derive(Debug, Clone)]
struct History<T> {
    entries: VecDeque<Entry<T>>,
    capacity: usize,
}

impl<T: Copy> History<T> {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push an entry, returning the evicted oldest value when full
    fn push(&mut self, entry: Entry<T>) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front().map(|oldest| oldest.value)
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    fn accuracy(&self) -> Accuracy {
        self.entries
            .iter()
            .map(|entry| entry.accuracy)
            .min()
            .unwrap_or_default()
    }

    fn timestamp(&self) -> u64 {
        self.entries.back().map_or(0, |entry| entry.timestamp)
    }
}

/// Circular mean of the most recent angles
///
/// Keeps a running `(Σsin, Σcos)` so insertion and averaging are O(1).
///
/// # Example
/// ```
/// use motion_derive::{Accuracy, window::AngleWindow};
///
/// let mut window = AngleWindow::new(4);
/// window.add(179.0_f32.to_radians(), Accuracy::High, 1);
/// window.add(-179.0_f32.to_radians(), Accuracy::Medium, 2);
///
/// let average = window.average().unwrap();
/// let degrees = average.values.scalar().unwrap().to_degrees();
/// assert!((degrees.abs() - 180.0).abs() < 1e-3);
/// assert_eq!(average.accuracy, Accuracy::Medium);
/// assert_eq!(average.timestamp, 2);
/// ```
#[derive(Debug, Clone)]
pub struct AngleWindow {
    history: History<f32>,
    sum: CircularSum,
}

impl AngleWindow {
    /// Create a window holding at most `capacity` angles
    ///
    /// A capacity of zero is raised to one, so the latest angle is always kept.
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
            sum: CircularSum::default(),
        }
    }

    /// Add an angle in radians, evicting the oldest one when full
    pub fn add(&mut self, angle: f32, accuracy: Accuracy, timestamp: u64) {
        let entry = Entry {
            value: angle,
            accuracy,
            timestamp,
        };
        if let Some(oldest) = self.history.push(entry) {
            self.sum.remove_angle(oldest);
        }
        self.sum.add_angle(angle);
    }

    /// Circular mean of the retained angles
    ///
    /// Accuracy is the worst retained accuracy and the timestamp is the most
    /// recent one. Returns `None` when the window is empty.
    pub fn average(&self) -> Option<Sample> {
        if self.is_empty() {
            return None;
        }
        Some(Sample::scalar(
            self.sum.average_angle(self.len()),
            self.history.accuracy(),
            self.history.timestamp(),
        ))
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.history.entries.clear();
        self.sum.clear();
    }

    pub fn len(&self) -> usize {
        self.history.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity
    }
}

/// Arithmetic mean of the most recent world-basis vectors
#[derive(Debug, Clone)]
pub struct VectorWindow {
    history: History<Vector3<f32>>,
    sum: Vector3<f32>,
}

impl VectorWindow {
    /// Create a window holding at most `capacity` vectors
    ///
    /// A capacity of zero is raised to one, so the latest vector is always kept.
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
            sum: Vector3::zeros(),
        }
    }

    /// Rotate a device-basis vector into the world basis and add it
    ///
    /// Returns `false` without touching the window when `device` is not a
    /// three-component vector.
    pub fn add(
        &mut self,
        device: &SampleValues,
        rotation: &Matrix3<f32>,
        accuracy: Accuracy,
        timestamp: u64,
    ) -> bool {
        let Some(world) = rotate(rotation, device) else {
            return false;
        };
        let entry = Entry {
            value: world,
            accuracy,
            timestamp,
        };
        if let Some(oldest) = self.history.push(entry) {
            self.sum -= oldest;
        }
        self.sum += world;
        true
    }

    /// Mean of the retained vectors, `None` when empty
    pub fn average(&self) -> Option<Sample> {
        if self.is_empty() {
            return None;
        }
        Some(Sample::vector(
            self.sum / self.len() as f32,
            self.history.accuracy(),
            self.history.timestamp(),
        ))
    }

    pub fn clear(&mut self) {
        self.history.entries.clear();
        self.sum = Vector3::zeros();
    }

    pub fn len(&self) -> usize {
        self.history.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.entries.is_empty()
    }
}
