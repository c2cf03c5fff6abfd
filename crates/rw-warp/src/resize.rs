use rw_core::{BooleanMask, Image, MaskedImage, Shape};

use crate::{Affine, Warp, WarpError};

/// Resampling to a new shape through the warp engine: a per-axis scaling
/// transform (`new / old`) is synthesized and the source warped through it.
/// Images resample linearly, boolean masks with nearest lookup.
pub trait Resize: Sized {
    fn resize(&self, new_shape: impl Into<Shape>) -> Result<Self, WarpError>;
}

impl Resize for Image {
    fn resize(&self, new_shape: impl Into<Shape>) -> Result<Self, WarpError> {
        let new_shape = new_shape.into();
        let t = scale_between(self.shape(), &new_shape)?;
        self.warp_to_shape(new_shape, &t, None)
    }
}

impl Resize for MaskedImage {
    fn resize(&self, new_shape: impl Into<Shape>) -> Result<Self, WarpError> {
        let new_shape = new_shape.into();
        let t = scale_between(self.shape(), &new_shape)?;
        self.warp_to_shape(new_shape, &t, None)
    }
}

impl Resize for BooleanMask {
    fn resize(&self, new_shape: impl Into<Shape>) -> Result<Self, WarpError> {
        let new_shape = new_shape.into();
        let t = scale_between(self.shape(), &new_shape)?;
        self.warp_to_shape(new_shape, &t, None)
    }
}

fn scale_between(old: &Shape, new: &Shape) -> Result<Affine, WarpError> {
    if old.n_dims() != new.n_dims() {
        return Err(WarpError::DimensionMismatch {
            expected: old.n_dims(),
            actual: new.n_dims(),
        });
    }
    let factors: Vec<f32> = new
        .dims()
        .iter()
        .zip(old.dims())
        .map(|(&n, &o)| n as f32 / o as f32)
        .collect();
    Ok(Affine::scaling(&factors))
}

#[cfg(test)]
mod tests {
    use rw_core::{BooleanMask, Image, MaskedImage};

    use super::Resize;
    use crate::WarpError;

    #[test]
    fn resize_mask_produces_requested_shape() {
        let mask = BooleanMask::init_blank([100, 100]);
        let small = mask.resize([10, 10]).expect("valid resize");

        assert_eq!(small.shape().dims(), &[10, 10]);
        assert_eq!(small.n_true(), 100);
    }

    #[test]
    fn resize_to_same_shape_is_identity() {
        let mut img = Image::init_blank([6, 5], 2, 0.0);
        for (i, v) in img.pixels_mut().iter_mut().enumerate() {
            *v = (i % 13) as f32;
        }

        let same = img.resize([6, 5]).expect("valid resize");
        assert_eq!(same, img);
    }

    #[test]
    fn upscale_doubles_extent() {
        let img = Image::from_vec([2, 2], 1, vec![0.0, 4.0, 8.0, 12.0]).expect("valid image");
        let big = img.resize([4, 4]).expect("valid resize");

        assert_eq!(big.shape().dims(), &[4, 4]);
        // on-grid destination pixels read straight from the source
        assert_eq!(big.get(&[0, 0], 0), Ok(0.0));
        assert_eq!(big.get(&[0, 2], 0), Ok(4.0));
        assert_eq!(big.get(&[2, 0], 0), Ok(8.0));
        // destination (1, 1) maps to source (0.5, 0.5)
        assert_eq!(big.get(&[1, 1], 0), Ok(6.0));
    }

    #[test]
    fn masked_resize_keeps_shape_pairing() {
        let img = MaskedImage::init_blank([8, 8], 1, 1.0);
        let small = img.resize([4, 4]).expect("valid resize");

        assert_eq!(small.shape().dims(), &[4, 4]);
        assert_eq!(small.mask().shape().dims(), &[4, 4]);
        assert_eq!(small.n_true_pixels(), 16);
    }

    #[test]
    fn resize_rejects_dimension_change() {
        let img = Image::init_blank([4, 4], 1, 0.0);
        assert!(matches!(
            img.resize([4, 4, 4]),
            Err(WarpError::DimensionMismatch { .. })
        ));
    }
}
