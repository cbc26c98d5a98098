use glam::{DMat4, EulerRot};
use thiserror::Error;

/// Converts the Z-up model space into the Y-up viewer space
/// (a rotation of -90 degrees about X).
#[rustfmt::skip]
pub const DEFAULT_MODEL_MATRIX: DMat4 = DMat4::from_cols_array(&[
    1.0, 0.0,  0.0, 0.0,
    0.0, 0.0, -1.0, 0.0,
    0.0, 1.0,  0.0, 0.0,
    0.0, 0.0,  0.0, 1.0,
]);

#[rustfmt::skip]
pub const DEFAULT_INVERSE_MODEL_MATRIX: DMat4 = DMat4::from_cols_array(&[
    1.0,  0.0, 0.0, 0.0,
    0.0,  0.0, 1.0, 0.0,
    0.0, -1.0, 0.0, 0.0,
    0.0,  0.0, 0.0, 1.0,
]);

const MIN_DETERMINANT: f64 = 1e-12;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Model matrix for rotation {0:?} is not invertible")]
    NotInvertible([f64; 3]),
}

/// Model-to-world matrix of a revision and its inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectorModelTransformation {
    pub model_matrix: DMat4,
    pub inverse_model_matrix: DMat4,
}

impl Default for SectorModelTransformation {
    fn default() -> Self {
        Self {
            model_matrix: DEFAULT_MODEL_MATRIX,
            inverse_model_matrix: DEFAULT_INVERSE_MODEL_MATRIX,
        }
    }
}

/// Builds the model transformation from a revision's `[rx, ry, rz]` rotation.
///
/// Without a rotation the fixed default correction is used.
pub fn compose_transform(
    rotation: Option<[f64; 3]>,
) -> Result<SectorModelTransformation, TransformError> {
    let Some([rx, ry, rz]) = rotation else {
        return Ok(SectorModelTransformation::default());
    };

    let model_matrix = DMat4::from_euler(EulerRot::XYZ, rx, ry, rz);
    let determinant = model_matrix.determinant();
    if !determinant.is_finite() || determinant.abs() < MIN_DETERMINANT {
        return Err(TransformError::NotInvertible([rx, ry, rz]));
    }

    let inverse_model_matrix = model_matrix.inverse();
    if !inverse_model_matrix.is_finite() {
        return Err(TransformError::NotInvertible([rx, ry, rz]));
    }

    Ok(SectorModelTransformation {
        model_matrix,
        inverse_model_matrix,
    })
}
