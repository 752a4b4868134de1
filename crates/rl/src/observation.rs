use std::ops::Deref;

use physics::{Quat, Vec3};

/// Accumulates observation values in the order an agent writes them.
#[derive(Debug, Default)]
pub struct ObservationBuilder {
    values: Vec<f32>,
}

impl ObservationBuilder {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f32) {
        self.values.push(value);
    }

    pub fn push_vec3(&mut self, v: Vec3) {
        self.values.extend_from_slice(&[v.x, v.y, v.z]);
    }

    /// Quaternions are written as `x, y, z, w`.
    pub fn push_quat(&mut self, q: Quat) {
        self.values.extend_from_slice(&[q.x, q.y, q.z, q.w]);
    }

    pub fn push_bool(&mut self, flag: bool) {
        self.values.push(if flag { 1.0 } else { 0.0 });
    }

    pub fn extend_from_slice(&mut self, values: &[f32]) {
        self.values.extend_from_slice(values);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Freeze the values, padding with zeros or truncating to `size`.
    #[must_use]
    pub fn finish(mut self, size: usize) -> Observation {
        self.values.resize(size, 0.0);
        Observation(self.values)
    }
}

/// One tick's observation vector. Read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation(Vec<f32>);

impl Observation {
    #[must_use]
    pub fn zeros(size: usize) -> Self {
        Self(vec![0.0; size])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Deref for Observation {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}
