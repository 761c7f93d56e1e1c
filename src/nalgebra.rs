//! Implementation of the [Rigid] backend using nalgebra's [Matrix4].
use crate::rigid::{HomogeneousMatrix, Rigid};
use ::nalgebra::{Matrix3, Matrix4, Translation3, Vector3};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NalgebraBackend;

impl Rigid for NalgebraBackend {
    type Transformation = Matrix4<f64>;

    fn neutral_element() -> Self::Transformation {
        Matrix4::identity()
    }

    fn concat(first: &Self::Transformation, second: &Self::Transformation) -> Self::Transformation {
        first * second
    }

    /// `Rotation3::from_axis_angle` would normalize the axis, so the matrix is assembled directly.
    fn rotation(axis: &[f64; 3], angle: f64) -> Self::Transformation {
        let k = Vector3::from(*axis);
        let (s, c) = angle.sin_cos();
        let rot = Matrix3::identity() * c + k.cross_matrix() * s + k * k.transpose() * (1.0 - c);
        rot.to_homogeneous()
    }

    fn translation(vector: &[f64; 3]) -> Self::Transformation {
        Translation3::new(vector[0], vector[1], vector[2]).to_homogeneous()
    }

    fn to_matrix(trafo: &Self::Transformation) -> HomogeneousMatrix {
        // nalgebra stores column-major
        let mut result = [[0.0; 4]; 4];
        for (row, target) in result.iter_mut().enumerate() {
            for (col, value) in target.iter_mut().enumerate() {
                *value = trafo[(row, col)];
            }
        }
        result
    }

    fn from_matrix(matrix: &HomogeneousMatrix) -> Self::Transformation {
        Matrix4::from_fn(|row, col| matrix[row][col])
    }
}
