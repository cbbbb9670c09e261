//! Value: typed property values assembled from formatted channel components.
//! All numeric types use f32.

use serde::{Deserialize, Serialize};

/// Coarse kind of a property value. Determines how many formatted channel
/// slots a mapping consumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    ColorRgba,
    /// Variable-width numeric vector (e.g. morph target weights).
    Vector(usize),
}

impl ValueKind {
    /// Number of scalar components a value of this kind carries.
    #[inline]
    pub fn component_count(self) -> usize {
        match self {
            ValueKind::Float => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Vec3 => 3,
            ValueKind::Vec4 | ValueKind::Quat | ValueKind::ColorRgba => 4,
            ValueKind::Vector(n) => n,
        }
    }

    /// Conventional component suffixes used by clip channels ("X", "Y", ...).
    /// Returns `None` for variable-width vectors where components are addressed by index.
    pub fn component_names(self) -> Option<&'static [&'static str]> {
        match self {
            ValueKind::Float => Some(&[""]),
            ValueKind::Vec2 => Some(&["X", "Y"]),
            ValueKind::Vec3 => Some(&["X", "Y", "Z"]),
            ValueKind::Vec4 => Some(&["X", "Y", "Z", "W"]),
            ValueKind::Quat => Some(&["W", "X", "Y", "Z"]),
            ValueKind::ColorRgba => Some(&["R", "G", "B", "A"]),
            ValueKind::Vector(_) => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// 4D vector
    Vec4([f32; 4]),

    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),

    /// RGBA color (linear by convention)
    ColorRgba([f32; 4]),

    /// Generic, variable-length numeric vector
    Vector(Vec<f32>),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Vector(v) => ValueKind::Vector(v.len()),
        }
    }

    /// Build a value of `kind` from its components in channel order.
    ///
    /// Quaternion channels are authored as (W, X, Y, Z); the result is
    /// stored as (x, y, z, w) and normalized. Returns `None` when the
    /// component count does not match the kind.
    pub fn from_components(kind: ValueKind, c: &[f32]) -> Option<Value> {
        if c.len() != kind.component_count() {
            return None;
        }
        let value = match kind {
            ValueKind::Float => Value::Float(c[0]),
            ValueKind::Vec2 => Value::Vec2([c[0], c[1]]),
            ValueKind::Vec3 => Value::Vec3([c[0], c[1], c[2]]),
            ValueKind::Vec4 => Value::Vec4([c[0], c[1], c[2], c[3]]),
            ValueKind::Quat => Value::Quat(normalize_quat([c[1], c[2], c[3], c[0]])),
            ValueKind::ColorRgba => Value::ColorRgba([c[0], c[1], c[2], c[3]]),
            ValueKind::Vector(_) => Value::Vector(c.to_vec()),
        };
        Some(value)
    }

    /// Flatten into scalar components (quaternions as x, y, z, w).
    pub fn components(&self) -> Vec<f32> {
        match self {
            Value::Float(v) => vec![*v],
            Value::Vec2(v) => v.to_vec(),
            Value::Vec3(v) => v.to_vec(),
            Value::Vec4(v) | Value::Quat(v) | Value::ColorRgba(v) => v.to_vec(),
            Value::Vector(v) => v.clone(),
        }
    }

    /// Convenience constructors
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn quat(x: f32, y: f32, z: f32, w: f32) -> Self {
        Value::Quat([x, y, z, w])
    }
}

#[inline]
fn normalize_quat(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3];
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        for c in &mut q {
            *c *= inv_len;
        }
    }
    q
}
