//! Position/rotation/scale record with affine matrix conversion.

use glam::{Mat4, Quat, Vec3};
use serde_json::{Map, Value};

use crate::transfer::table;
use crate::transfer::TransferResult;

/// Translation, rotation and scale of one object.
///
/// Treated as a value: every transform change builds a fresh one and each
/// holder keeps its own copy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearTransform {
    pub translation: Vec3,
    /// Unit quaternion
    pub rotation: Quat,
    /// Components are expected to be positive; not enforced
    pub scale: Vec3,
}

impl LinearTransform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    #[inline]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self
    }

    #[inline]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compose translation · rotation · scale.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix.
    ///
    /// Exact for any invertible matrix without shear; a sheared matrix
    /// decomposes to the nearest rotation and the column lengths as scale.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }

    /// Overwrite this transform from `matrix`.
    pub fn set_from_matrix(&mut self, matrix: &Mat4) -> &mut Self {
        *self = Self::from_matrix(matrix);
        self
    }

    /// Component-wise comparison; rotations are compared by the angle
    /// between them, in radians. Rotations `q` and `-q` compare equal.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && self.rotation_angle_to(other) <= epsilon
    }

    /// Angle of the rotation taking `other` to `self`.
    ///
    /// Read from the vector part of the relative quaternion, `sin(θ/2)`,
    /// which stays precise for small angles where `acos` of the dot
    /// product does not.
    pub fn rotation_angle_to(&self, other: &Self) -> f32 {
        let relative = self.rotation * other.rotation.conjugate();
        let half_sin = Vec3::new(relative.x, relative.y, relative.z).length().min(1.0);
        2.0 * half_sin.asin()
    }

    /// Decode the host's basis form `{ left, up, forward, trans }`.
    ///
    /// Missing vectors fall back to the identity basis and zero translation.
    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let table = table::as_table(value, "transform")?;
        let column = |key: &str, fallback: Vec3| -> TransferResult<Vec3> {
            match table.get(key) {
                Some(v) if !v.is_null() => table::vec3(v, key),
                _ => Ok(fallback),
            }
        };

        let left = column("left", Vec3::X)?;
        let up = column("up", Vec3::Y)?;
        let forward = column("forward", Vec3::Z)?;
        let trans = column("trans", Vec3::ZERO)?;

        let matrix = Mat4::from_cols(
            left.extend(0.0),
            up.extend(0.0),
            forward.extend(0.0),
            trans.extend(1.0),
        );
        Ok(Self::from_matrix(&matrix))
    }

    /// Encode as the host's basis form.
    pub fn to_table(&self) -> Value {
        let m = self.to_matrix();
        let mut out = Map::new();
        out.insert("left".into(), table::vec3_to_value(m.x_axis.truncate()));
        out.insert("up".into(), table::vec3_to_value(m.y_axis.truncate()));
        out.insert("forward".into(), table::vec3_to_value(m.z_axis.truncate()));
        out.insert("trans".into(), table::vec3_to_value(m.w_axis.truncate()));
        Value::Object(out)
    }
}

impl Default for LinearTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for LinearTransform {
    fn from(matrix: Mat4) -> Self {
        Self::from_matrix(&matrix)
    }
}
