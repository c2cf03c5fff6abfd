use nalgebra::DMatrix;

use crate::WarpError;

/// Coordinate mapping consumed by the warp engine.
///
/// The engine drives warping backwards: for every destination pixel it asks
/// the transform for the corresponding *source* coordinate, which is the
/// inverse of the transform's forward direction. Implementations that cannot
/// be inverted report [`WarpError::NonInvertibleTransform`].
pub trait SpatialTransform {
    fn n_dims(&self) -> usize;

    /// Maps one destination-space point back to the source space.
    fn inverse_map(&self, point: &[f32], out: &mut [f32]) -> Result<(), WarpError>;
}

/// Homogeneous affine transform on N-d coordinates, stored as an
/// `(n + 1) x (n + 1)` matrix acting on `[x0, ..., xn-1, 1]`.
///
/// The inverse is computed once at construction; mapping through a singular
/// transform fails with [`WarpError::NonInvertibleTransform`].
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    matrix: DMatrix<f32>,
    inverse: Option<DMatrix<f32>>,
}

impl Affine {
    pub fn from_matrix(matrix: DMatrix<f32>) -> Self {
        assert!(
            matrix.is_square() && matrix.nrows() >= 2,
            "affine matrix must be square homogeneous"
        );
        let inverse = matrix.clone().try_inverse();
        Self { matrix, inverse }
    }

    pub fn identity(n_dims: usize) -> Self {
        let m = DMatrix::identity(n_dims + 1, n_dims + 1);
        Self {
            inverse: Some(m.clone()),
            matrix: m,
        }
    }

    /// Pure translation by `offsets`. The inverse is built analytically, so
    /// integer translations invert exactly.
    pub fn translation(offsets: &[f32]) -> Self {
        Self {
            matrix: translation_matrix(offsets, 1.0),
            inverse: Some(translation_matrix(offsets, -1.0)),
        }
    }

    /// Per-axis scaling. Any zero factor makes the transform singular.
    pub fn scaling(factors: &[f32]) -> Self {
        let matrix = scaling_matrix(factors);
        let inverse = if factors.iter().all(|&f| f != 0.0) {
            let recip: Vec<f32> = factors.iter().map(|&f| 1.0 / f).collect();
            Some(scaling_matrix(&recip))
        } else {
            None
        };
        Self { matrix, inverse }
    }

    pub fn matrix(&self) -> &DMatrix<f32> {
        &self.matrix
    }

    pub fn is_invertible(&self) -> bool {
        self.inverse.is_some()
    }

    /// Forward mapping of one point.
    pub fn apply(&self, point: &[f32], out: &mut [f32]) {
        apply_homogeneous(&self.matrix, point, out);
    }
}

impl SpatialTransform for Affine {
    fn n_dims(&self) -> usize {
        self.matrix.nrows() - 1
    }

    fn inverse_map(&self, point: &[f32], out: &mut [f32]) -> Result<(), WarpError> {
        let inv = self
            .inverse
            .as_ref()
            .ok_or(WarpError::NonInvertibleTransform)?;
        apply_homogeneous(inv, point, out);
        Ok(())
    }
}

fn translation_matrix(offsets: &[f32], sign: f32) -> DMatrix<f32> {
    let n = offsets.len();
    let mut m = DMatrix::identity(n + 1, n + 1);
    for (d, &t) in offsets.iter().enumerate() {
        m[(d, n)] = sign * t;
    }
    m
}

fn scaling_matrix(factors: &[f32]) -> DMatrix<f32> {
    let n = factors.len();
    let mut m = DMatrix::identity(n + 1, n + 1);
    for (d, &s) in factors.iter().enumerate() {
        m[(d, d)] = s;
    }
    m
}

/// `m * [point, 1]` with projective normalization. A vanishing homogeneous
/// coordinate yields NaN components, which the sampler classifies as
/// out-of-bounds.
fn apply_homogeneous(m: &DMatrix<f32>, point: &[f32], out: &mut [f32]) {
    let n = m.nrows() - 1;
    debug_assert_eq!(point.len(), n);
    debug_assert_eq!(out.len(), n);

    let mut w = m[(n, n)];
    for j in 0..n {
        w += m[(n, j)] * point[j];
    }

    for i in 0..n {
        let mut acc = m[(i, n)];
        for j in 0..n {
            acc += m[(i, j)] * point[j];
        }
        out[i] = acc / w;
    }
}
