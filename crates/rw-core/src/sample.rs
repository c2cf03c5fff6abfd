use core::fmt;

use crate::{BooleanMask, Image, MaskedImage, Shape};

/// Interpolation order for sub-pixel sampling.
///
/// `Nearest` is order 0 (round to the nearest grid point), `Linear` is order
/// 1 (N-d multilinear over the corner neighborhood). Higher orders are an
/// extension point, not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Linear,
}

/// Interpolated values for a batch of sample points, point-major:
/// `n_points * n_channels` values, one contiguous row per point.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleValues {
    n_points: usize,
    n_channels: usize,
    data: Vec<f32>,
}

impl SampleValues {
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn point(&self, i: usize) -> &[f32] {
        assert!(i < self.n_points, "sample point index out of bounds");
        &self.data[i * self.n_channels..(i + 1) * self.n_channels]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Failure payload of sampling a [`MaskedImage`] at points whose
/// interpolation neighborhood is not fully inside the mask.
///
/// Carries the values and validity flags for *every* requested point, not
/// just the failing ones, so callers can tell which points were invalid and
/// still inspect the (diagnostic) values computed there.
#[derive(Debug, Clone, PartialEq)]
pub struct OutOfMaskSampleError {
    sampled_values: SampleValues,
    sampled_mask: Vec<bool>,
}

impl OutOfMaskSampleError {
    pub fn sampled_values(&self) -> &SampleValues {
        &self.sampled_values
    }

    pub fn sampled_mask(&self) -> &[bool] {
        &self.sampled_mask
    }

    pub fn into_parts(self) -> (SampleValues, Vec<bool>) {
        (self.sampled_values, self.sampled_mask)
    }
}

impl fmt::Display for OutOfMaskSampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let invalid = self.sampled_mask.iter().filter(|&&v| !v).count();
        write!(
            f,
            "{invalid} of {} sample points fall outside the image mask",
            self.sampled_mask.len()
        )
    }
}

impl std::error::Error for OutOfMaskSampleError {}

/// Visits every grid point of `point`'s interpolation neighborhood with its
/// weight, in a fixed enumeration order (results are bit-for-bit
/// deterministic). Out-of-bounds corners are visited with `None`.
///
/// Corners with weight exactly zero are excluded: a coordinate lying on the
/// integer grid reads exactly one pixel, so neighborhoods never extend past
/// the image edge for on-grid coordinates.
fn visit_corners(
    shape: &Shape,
    point: &[f32],
    interp: Interpolation,
    mut visit: impl FnMut(Option<usize>, f32),
) {
    let dims = shape.dims();
    let n_dims = dims.len();
    debug_assert_eq!(point.len(), n_dims);

    match interp {
        Interpolation::Nearest => {
            let mut offset = 0usize;
            let mut inside = true;
            for (&p, &d) in point.iter().zip(dims) {
                let r = p.round();
                // positive check so NaN coordinates classify as outside
                if r >= 0.0 && r < d as f32 {
                    offset = offset * d + r as usize;
                } else {
                    inside = false;
                    break;
                }
            }
            visit(inside.then_some(offset), 1.0);
        }
        Interpolation::Linear => {
            assert!(
                n_dims < usize::BITS as usize,
                "too many axes for multilinear sampling"
            );
            for bits in 0usize..(1 << n_dims) {
                let mut weight = 1.0f32;
                let mut offset = 0usize;
                let mut inside = true;
                for (d, (&p, &dim)) in point.iter().zip(dims).enumerate() {
                    let base = p.floor();
                    let frac = p - base;
                    let hi = (bits >> d) & 1 == 1;
                    let factor = if hi { frac } else { 1.0 - frac };
                    if factor == 0.0 {
                        weight = 0.0;
                        break;
                    }
                    weight *= factor;

                    let coord = base + if hi { 1.0 } else { 0.0 };
                    // positive check so NaN coordinates classify as outside
                    if coord >= 0.0 && coord < dim as f32 {
                        offset = offset * dim + coord as usize;
                    } else {
                        inside = false;
                    }
                }
                if weight == 0.0 {
                    continue;
                }
                visit(inside.then_some(offset), weight);
            }
        }
    }
}

/// Samples a plain [`Image`] at continuous coordinates.
///
/// `points` is flat, `n_points * n_dims`, axis order matching the shape.
/// Out-of-bounds corners contribute `extension`; the call never fails.
pub fn sample_image(
    image: &Image,
    points: &[f32],
    interp: Interpolation,
    extension: f32,
) -> SampleValues {
    let n_dims = image.n_dims();
    let nc = image.n_channels();
    assert!(
        points.len() % n_dims == 0,
        "points length must be a multiple of the image dimensionality"
    );

    let data = image.pixels();
    let mut out = Vec::with_capacity(points.len() / n_dims * nc);
    for point in points.chunks_exact(n_dims) {
        let start = out.len();
        out.resize(start + nc, 0.0);
        let acc = &mut out[start..];
        visit_corners(image.shape(), point, interp, |corner, weight| match corner {
            Some(off) => {
                for (a, &v) in acc.iter_mut().zip(&data[off * nc..off * nc + nc]) {
                    *a += weight * v;
                }
            }
            None => {
                for a in acc.iter_mut() {
                    *a += weight * extension;
                }
            }
        });
    }

    SampleValues {
        n_points: points.len() / n_dims,
        n_channels: nc,
        data: out,
    }
}

/// Samples a [`MaskedImage`], returning values plus a per-point flag telling
/// whether the point's whole interpolation neighborhood was in bounds and
/// mask-true. Never fails; the warp engine consumes the flags as data.
pub fn sample_masked_with_validity(
    image: &MaskedImage,
    points: &[f32],
    interp: Interpolation,
) -> (SampleValues, Vec<bool>) {
    let n_dims = image.n_dims();
    let nc = image.n_channels();
    assert!(
        points.len() % n_dims == 0,
        "points length must be a multiple of the image dimensionality"
    );

    let data = image.pixels();
    let mask = image.mask().data();
    let n_points = points.len() / n_dims;
    let mut out = Vec::with_capacity(n_points * nc);
    let mut valid = Vec::with_capacity(n_points);
    for point in points.chunks_exact(n_dims) {
        let start = out.len();
        out.resize(start + nc, 0.0);
        let acc = &mut out[start..];
        let mut point_valid = true;
        visit_corners(image.shape(), point, interp, |corner, weight| match corner {
            Some(off) => {
                point_valid &= mask[off];
                for (a, &v) in acc.iter_mut().zip(&data[off * nc..off * nc + nc]) {
                    *a += weight * v;
                }
            }
            None => point_valid = false,
        });
        valid.push(point_valid);
    }

    let values = SampleValues {
        n_points,
        n_channels: nc,
        data: out,
    };
    (values, valid)
}

/// Samples a [`MaskedImage`]; fails with the full diagnostic payload if any
/// point's neighborhood is not entirely mask-true.
pub fn sample_masked(
    image: &MaskedImage,
    points: &[f32],
    interp: Interpolation,
) -> Result<SampleValues, OutOfMaskSampleError> {
    let (values, valid) = sample_masked_with_validity(image, points, interp);
    if valid.iter().all(|&v| v) {
        Ok(values)
    } else {
        Err(OutOfMaskSampleError {
            sampled_values: values,
            sampled_mask: valid,
        })
    }
}

/// Samples a [`BooleanMask`] with nearest-neighbor lookup (interpolating
/// booleans is undefined). Out-of-bounds points become `false`; there is no
/// failure mode.
pub fn sample_mask(mask: &BooleanMask, points: &[f32]) -> Vec<bool> {
    let n_dims = mask.n_dims();
    assert!(
        points.len() % n_dims == 0,
        "points length must be a multiple of the mask dimensionality"
    );

    let data = mask.data();
    let mut out = Vec::with_capacity(points.len() / n_dims);
    for point in points.chunks_exact(n_dims) {
        let mut value = false;
        visit_corners(mask.shape(), point, Interpolation::Nearest, |corner, _| {
            value = corner.map(|off| data[off]).unwrap_or(false);
        });
        out.push(value);
    }
    out
}

impl Image {
    /// Samples at continuous coordinates with zero extension outside the
    /// image. See [`sample_image`].
    pub fn sample(&self, points: &[f32], interp: Interpolation) -> SampleValues {
        sample_image(self, points, interp, 0.0)
    }

    /// Samples with a caller-specified constant extension value.
    pub fn sample_with_extension(
        &self,
        points: &[f32],
        interp: Interpolation,
        extension: f32,
    ) -> SampleValues {
        sample_image(self, points, interp, extension)
    }
}

impl MaskedImage {
    /// Samples at continuous coordinates; fails with [`OutOfMaskSampleError`]
    /// if any point's interpolation neighborhood leaves the mask.
    pub fn sample(
        &self,
        points: &[f32],
        interp: Interpolation,
    ) -> Result<SampleValues, OutOfMaskSampleError> {
        sample_masked(self, points, interp)
    }
}

impl BooleanMask {
    /// Nearest-neighbor boolean lookup; out-of-bounds points are `false`.
    pub fn sample(&self, points: &[f32]) -> Vec<bool> {
        sample_mask(self, points)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::Interpolation;
    use crate::{BooleanMask, Image, MaskedImage};

    #[test]
    fn blank_image_samples_to_fill() {
        let img = Image::init_blank([100, 100], 1, 2.0);
        let values = img.sample(&[0.0, 0.0, 1.0, 0.0], Interpolation::Linear);

        assert_eq!(values.n_points(), 2);
        assert_eq!(values.n_channels(), 1);
        assert_eq!(values.data(), &[2.0, 2.0]);
    }

    #[test]
    fn linear_matches_bilinear_by_hand() {
        let img = Image::from_vec([2, 2], 1, vec![0.0, 10.0, 20.0, 30.0]).expect("valid image");

        let center = img.sample(&[0.5, 0.5], Interpolation::Linear);
        assert_relative_eq!(center.data()[0], 15.0, epsilon = 1e-6);

        let quarter = img.sample(&[0.25, 0.0], Interpolation::Linear);
        assert_relative_eq!(quarter.data()[0], 5.0, epsilon = 1e-6);
    }

    #[test]
    fn on_grid_coordinates_are_exact() {
        let data: Vec<f32> = (0..9).map(|v| (v * 3 + 1) as f32).collect();
        let img = Image::from_vec([3, 3], 1, data.clone()).expect("valid image");

        // every grid point, including the far edge, reads back exactly
        for r in 0..3 {
            for c in 0..3 {
                let v = img.sample(&[r as f32, c as f32], Interpolation::Linear);
                assert_eq!(v.data()[0], data[r * 3 + c]);
            }
        }
    }

    #[test]
    fn nearest_rounds_to_grid() {
        let data = vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0];
        let img = Image::from_vec([3, 3], 1, data).expect("valid image");

        let v = img.sample(&[1.2, 1.6], Interpolation::Nearest);
        assert_eq!(v.data()[0], 12.0);
    }

    #[test]
    fn out_of_bounds_uses_extension_value() {
        let img = Image::init_blank([3, 3], 2, 4.0);

        let zero_ext = img.sample(&[-2.0, -2.0], Interpolation::Linear);
        assert_eq!(zero_ext.data(), &[0.0, 0.0]);

        let custom = img.sample_with_extension(&[-2.0, -2.0], Interpolation::Linear, 7.0);
        assert_eq!(custom.data(), &[7.0, 7.0]);

        // half in, half out: only the in-bounds corner contributes
        let edge = img.sample(&[-0.5, 0.0], Interpolation::Linear);
        assert_relative_eq!(edge.data()[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn blank_masked_image_samples_to_fill() {
        let img = MaskedImage::init_blank([100, 100], 1, 2.0);
        let values = img
            .sample(&[0.0, 0.0, 1.0, 0.0], Interpolation::Linear)
            .expect("fully true mask");
        assert_eq!(values.data(), &[2.0, 2.0]);
    }

    #[test]
    fn fully_masked_out_image_fails() {
        let mask = BooleanMask::init_fill([100, 100], false);
        let img = MaskedImage::init_blank_masked([100, 100], 1, 2.0, mask).expect("matching shape");

        let err = img
            .sample(&[0.0, 0.0, 1.0, 0.0], Interpolation::Linear)
            .unwrap_err();
        assert_eq!(err.sampled_mask(), &[false, false]);
    }

    #[test]
    fn out_of_mask_error_reports_full_batch() {
        let mut mask = BooleanMask::init_fill([100, 100], false);
        mask.set(&[1, 0], true).expect("in bounds");
        let img = MaskedImage::init_blank_masked([100, 100], 2, 2.0, mask).expect("matching shape");

        let err = img
            .sample(&[0.0, 0.0, 1.0, 0.0], Interpolation::Linear)
            .unwrap_err();

        // values are reported for every point, valid or not
        assert_eq!(err.sampled_values().data(), &[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(err.sampled_mask(), &[false, true]);
        assert_eq!(
            err.to_string(),
            "1 of 2 sample points fall outside the image mask"
        );
    }

    #[test]
    fn masked_validity_requires_whole_neighborhood() {
        let mut mask = BooleanMask::init_blank([3, 3]);
        mask.set(&[1, 1], false).expect("in bounds");
        let img = MaskedImage::init_blank_masked([3, 3], 1, 1.0, mask).expect("matching shape");

        // midpoint between (1,0) and (1,1) needs both corners
        let err = img.sample(&[1.0, 0.5], Interpolation::Linear).unwrap_err();
        assert_eq!(err.sampled_mask(), &[false]);

        // the on-grid neighbor alone is fine
        let ok = img.sample(&[1.0, 0.0], Interpolation::Linear).expect("valid");
        assert_eq!(ok.data(), &[1.0]);
    }

    #[test]
    fn boolean_sampling_never_fails() {
        let mut mask = BooleanMask::init_blank([100, 100]);
        mask.set(&[1, 0], false).expect("in bounds");

        assert_eq!(mask.sample(&[0.0, 0.0, 1.0, 0.0]), vec![true, false]);
        // out of bounds reads as false, not an error
        assert_eq!(mask.sample(&[-5.0, 0.0, 500.0, 0.0]), vec![false, false]);
    }
}
