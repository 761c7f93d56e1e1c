//! Module for the implementations using the ndarray backend. Contains the basic calculus required
use crate::rigid::{rotation_matrix, HomogeneousMatrix, Rigid};
use ::ndarray::prelude::*;

/// Backend representing transformations as homogeneous, 4x4 [Array2] matrices.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NdarrayBackend;

impl Rigid for NdarrayBackend {
    type Transformation = Array2<f64>;

    fn neutral_element() -> Self::Transformation {
        Array2::<f64>::eye(4)
    }

    fn concat(first: &Self::Transformation, second: &Self::Transformation) -> Self::Transformation {
        first.dot(second)
    }

    fn rotation(axis: &[f64; 3], angle: f64) -> Self::Transformation {
        rotate_axis_4x4(axis, angle)
    }

    fn translation(vector: &[f64; 3]) -> Self::Transformation {
        translation(vector)
    }

    fn to_matrix(trafo: &Self::Transformation) -> HomogeneousMatrix {
        let mut result = [[0.0; 4]; 4];
        result
            .iter_mut()
            .zip(trafo.rows())
            .for_each(|(target, row)| target.iter_mut().zip(row.iter()).for_each(|(t, v)| *t = *v));
        result
    }

    fn from_matrix(matrix: &HomogeneousMatrix) -> Self::Transformation {
        Array2::from_shape_fn((4, 4), |(row, col)| matrix[row][col])
    }
}

/// Creates a homogeneous, 4x4 rotation matrix around the x axis.
pub fn rotate_x_4x4(param: f64) -> Array2<f64> {
    let (s, c) = param.sin_cos();
    array![
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, -s, 0.0],
        [0.0, s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0]
    ]
}

/// Creates a homogeneous, 4x4 rotation matrix around the y axis.
pub fn rotate_y_4x4(param: f64) -> Array2<f64> {
    let (s, c) = param.sin_cos();
    array![
        [c, 0.0, s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0]
    ]
}

/// Creates a homogeneous, 4x4 rotation matrix around the z axis.
pub fn rotate_z_4x4(param: f64) -> Array2<f64> {
    let (s, c) = param.sin_cos();
    array![
        [c, -s, 0.0, 0.0],
        [s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0]
    ]
}

/// Creates a homogeneous, 4x4 rotation matrix around an arbitrary axis. The axis is not normalized.
///
/// The positive principal axes are dispatched to [rotate_x_4x4], [rotate_y_4x4] and
/// [rotate_z_4x4], which keep the entries of the rotation axis exact.
pub fn rotate_axis_4x4(axis: &[f64; 3], param: f64) -> Array2<f64> {
    if *axis == [1.0, 0.0, 0.0] {
        return rotate_x_4x4(param);
    } else if *axis == [0.0, 1.0, 0.0] {
        return rotate_y_4x4(param);
    } else if *axis == [0.0, 0.0, 1.0] {
        return rotate_z_4x4(param);
    }
    let rot = rotation_matrix(axis, param);
    let mut result = Array2::<f64>::eye(4);
    result
        .slice_mut(s![..3, ..3])
        .assign(&Array2::from_shape_fn((3, 3), |(row, col)| rot[row][col]));
    result
}

/// Inverts a rigid transformation: `[R | p]⁻¹ = [Rᵀ | -Rᵀ·p]`.
pub fn invert_transformation_4x4(trafo: &Array2<f64>) -> Array2<f64> {
    let mut result = Array2::<f64>::eye(4);
    let rot_t = trafo.slice(s![..3, ..3]).reversed_axes();
    let ipos = rot_t.dot(&trafo.slice(s![..3, 3])) * -1.0;
    result.slice_mut(s![..3, ..3]).assign(&rot_t);
    result.slice_mut(s![..3, 3]).assign(&ipos);
    result
}

/// Create a translation from a 3-vector
pub fn translation(param: &[f64; 3]) -> Array2<f64> {
    let mut result = Array2::<f64>::eye(4);
    result.slice_mut(s![..3, 3]).assign(&ArrayView1::from(&param[..]));
    result
}

/// Extracts the translational part of a homogeneous, 4x4 transformation matrix.
pub fn position(trafo: &Array2<f64>) -> Array1<f64> {
    trafo.slice(s![..3, 3]).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

    fn rodrigues_4x4(axis: &[f64; 3], angle: f64) -> Array2<f64> {
        let rot = rotation_matrix(axis, angle);
        let mut result = Array2::<f64>::eye(4);
        result
            .slice_mut(s![..3, ..3])
            .assign(&Array2::from_shape_fn((3, 3), |(row, col)| rot[row][col]));
        result
    }

    #[test]
    fn test_principal_rotations_match_rodrigues() {
        assert_abs_diff_eq!(rotate_x_4x4(FRAC_PI_3), rodrigues_4x4(&[1.0, 0.0, 0.0], FRAC_PI_3), epsilon = 1e-12);
        assert_abs_diff_eq!(rotate_y_4x4(FRAC_PI_3), rodrigues_4x4(&[0.0, 1.0, 0.0], FRAC_PI_3), epsilon = 1e-12);
        assert_abs_diff_eq!(rotate_z_4x4(FRAC_PI_3), rodrigues_4x4(&[0.0, 0.0, 1.0], FRAC_PI_3), epsilon = 1e-12);
    }

    #[test]
    fn test_axis_rotation_dispatch() {
        let rot = rotate_axis_4x4(&[0.0, 0.0, 1.0], 0.7);
        assert_eq!(rot, rotate_z_4x4(0.7));
        assert_eq!(rot[[2, 2]], 1.0);

        // a negative axis goes through the general formula
        assert_abs_diff_eq!(rotate_axis_4x4(&[0.0, -1.0, 0.0], 0.7), rotate_y_4x4(-0.7), epsilon = 1e-12);

        let axis = [1.0 / 3f64.sqrt(); 3];
        assert_abs_diff_eq!(rotate_axis_4x4(&axis, 0.4), rodrigues_4x4(&axis, 0.4), epsilon = 1e-15);
    }

    #[test]
    fn test_invert_transformation() {
        let axis = [0.0, 0.6, 0.8];
        let trafo = NdarrayBackend::offset(&rotate_axis_4x4(&axis, 1.1), &[1.0, -2.0, 0.5]);
        let inverse = invert_transformation_4x4(&trafo);

        assert_abs_diff_eq!(trafo.dot(&inverse), Array2::<f64>::eye(4), epsilon = 1e-12);
        assert_abs_diff_eq!(inverse.dot(&trafo), Array2::<f64>::eye(4), epsilon = 1e-12);
        assert_abs_diff_eq!(invert_transformation_4x4(&inverse), trafo, epsilon = 1e-12);

        // pure translations are negated
        assert_abs_diff_eq!(
            invert_transformation_4x4(&translation(&[1.0, 2.0, 3.0])),
            translation(&[-1.0, -2.0, -3.0])
        );
    }

    #[test]
    fn test_offset_rotates_translation() {
        // The translation is expressed in the rotated frame
        let offset = NdarrayBackend::offset(&rotate_z_4x4(FRAC_PI_2), &[1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(position(&offset), array![0.0, 1.0, 0.0], epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_conversion() {
        let trafo = NdarrayBackend::concat(&rotate_x_4x4(0.3), &translation(&[1.0, 2.0, 3.0]));
        let matrix = NdarrayBackend::to_matrix(&trafo);
        assert_eq!(matrix[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(matrix[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(NdarrayBackend::from_matrix(&matrix), trafo);
    }
}
