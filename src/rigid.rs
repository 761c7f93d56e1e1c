/*! Defines the linear algebra abstraction every backend implements for composing rigid transformations */

use num_traits::Float;
use std::fmt::Debug;

/// A row-major, homogeneous 4x4 matrix. This is what renderers receive independent of the backend.
pub type HomogeneousMatrix = [[f64; 4]; 4];

/// Wraps linear algebra transformations such that backends
/// only need to implement this trait.
///
/// Only rigid transformations (rotation and translation) are ever composed; there is no
/// scaling or shear anywhere in this crate.
pub trait Rigid {
    /// E.g., 4x4 matrix (ndarray, nalgebra)
    type Transformation: Clone + Debug + PartialEq;

    /// Returns the neutral element wrt. the transformation convention used
    fn neutral_element() -> Self::Transformation;

    /// Concat two transformations (`first · second`)
    fn concat(first: &Self::Transformation, second: &Self::Transformation) -> Self::Transformation;

    /// Rotation by `angle` (radians) about `axis`. The axis is used as given, i.e., callers
    /// have to pass a unit vector.
    fn rotation(axis: &[f64; 3], angle: f64) -> Self::Transformation {
        let r = rotation_matrix(axis, angle);
        Self::from_matrix(&[
            [r[0][0], r[0][1], r[0][2], 0.0],
            [r[1][0], r[1][1], r[1][2], 0.0],
            [r[2][0], r[2][1], r[2][2], 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Pure translation
    fn translation(vector: &[f64; 3]) -> Self::Transformation;

    /// Mounting offset: a rotation followed by a translation expressed in the rotated frame
    fn offset(rotation: &Self::Transformation, translation: &[f64; 3]) -> Self::Transformation {
        Self::concat(rotation, &Self::translation(translation))
    }

    fn to_matrix(trafo: &Self::Transformation) -> HomogeneousMatrix;

    fn from_matrix(matrix: &HomogeneousMatrix) -> Self::Transformation;
}

/// Folds a chain of transformations (ordered from the root outwards) into a single one.
pub fn accumulate<'a, B>(chain: impl IntoIterator<Item = &'a B::Transformation>) -> B::Transformation
where
    B: Rigid,
    B::Transformation: 'a,
{
    chain
        .into_iter()
        .fold(B::neutral_element(), |acc, trafo| B::concat(&acc, trafo))
}

/// Rodrigues' rotation formula `R = cos·I + sin·[k]× + (1 - cos)·k·kᵀ`. The axis `k` is not normalized.
pub fn rotation_matrix(axis: &[f64; 3], angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let [x, y, z] = *axis;
    [
        [c + t * x * x, t * x * y - s * z, t * x * z + s * y],
        [t * x * y + s * z, c + t * y * y, t * y * z - s * x],
        [t * x * z - s * y, t * y * z + s * x, c + t * z * z],
    ]
}

/// Largest absolute component, NaN if any component is NaN
fn max_abs<F: Float>(vector: &[F; 3]) -> F {
    vector.iter().fold(F::zero(), |acc, &v| if v.is_nan() || acc.is_nan() { F::nan() } else { acc.max(v.abs()) })
}

/// Euclidean length of a 3-vector.
///
/// The components are scaled by the largest one before squaring, so neither huge nor tiny
/// (but non-zero) vectors overflow or underflow.
pub fn norm<F: Float>(vector: &[F; 3]) -> F {
    let scale = max_abs(vector);
    if scale.is_zero() || !scale.is_finite() {
        return scale;
    }
    scale * vector.iter().fold(F::zero(), |acc, &v| acc + (v / scale).powi(2)).sqrt()
}

/// Returns the vector scaled to unit length or `None` if it has no (finite, non-zero) length
pub fn normalize<F: Float>(vector: &[F; 3]) -> Option<[F; 3]> {
    let scale = max_abs(vector);
    if scale.is_zero() || !scale.is_finite() {
        return None;
    }
    let scaled = vector.map(|v| v / scale);
    let length = norm(&scaled);
    Some(scaled.map(|v| v / length))
}

/// Whether the vector has unit length up to `tolerance`
pub fn is_unit<F: Float>(vector: &[F; 3], tolerance: F) -> bool {
    (norm(vector) - F::one()).abs() <= tolerance
}
