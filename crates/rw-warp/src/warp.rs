use log::debug;
use rw_core::{
    BooleanMask, Image, Interpolation, MaskedImage, Shape, sample_image, sample_mask,
    sample_masked_with_validity,
};

use crate::{SpatialTransform, WarpError};

/// Backward-warping entry points shared by the three raster variants.
///
/// Both operations derive, for every destination pixel, the source
/// coordinate via the transform's inverse mapping and resample the source
/// there. Float sources use linear interpolation, boolean sources nearest
/// (interpolating booleans is undefined); higher orders are an extension
/// point.
///
/// `batch_size` bounds how many destination coordinates are in flight at
/// once. It only caps peak memory: batches run sequentially and per-point
/// work is independent, so any batch size produces bit-identical results.
///
/// Per-point mask invalidity never fails a warp. It is encoded in the
/// destination mask (with a zero placeholder pixel value) instead, because a
/// warp over millions of coordinates cannot reasonably abort on the first
/// undefined one; use the direct `sample` APIs to surface
/// [`rw_core::OutOfMaskSampleError`].
pub trait Warp {
    type ShapeOutput;
    type MaskOutput;

    /// Warps into a destination covering every pixel of `shape`.
    fn warp_to_shape(
        &self,
        shape: impl Into<Shape>,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<Self::ShapeOutput, WarpError>;

    /// Warps into the true region of `template`; template-false locations
    /// are never evaluated and stay undefined in the result.
    fn warp_to_mask(
        &self,
        template: &BooleanMask,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<Self::MaskOutput, WarpError>;
}

impl Warp for Image {
    type ShapeOutput = Image;
    type MaskOutput = MaskedImage;

    fn warp_to_shape(
        &self,
        shape: impl Into<Shape>,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<Image, WarpError> {
        let dest_shape = shape.into();
        check_dims(self.n_dims(), dest_shape.n_dims(), transform.n_dims())?;

        let nc = self.n_channels();
        let mut out = Image::init_blank(dest_shape.clone(), nc, 0.0);
        let offsets: Vec<usize> = (0..dest_shape.n_pixels()).collect();
        for_each_batch(transform, &dest_shape, &offsets, batch_size, |chunk, coords| {
            let values = sample_image(self, coords, Interpolation::Linear, 0.0);
            for (i, &off) in chunk.iter().enumerate() {
                out.pixels_mut()[off * nc..(off + 1) * nc].copy_from_slice(values.point(i));
            }
        })?;
        Ok(out)
    }

    fn warp_to_mask(
        &self,
        template: &BooleanMask,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<MaskedImage, WarpError> {
        check_dims(self.n_dims(), template.n_dims(), transform.n_dims())?;

        let nc = self.n_channels();
        let mut image = Image::init_blank(template.shape().clone(), nc, 0.0);
        let offsets = template.true_offsets();
        for_each_batch(
            transform,
            template.shape(),
            &offsets,
            batch_size,
            |chunk, coords| {
                let values = sample_image(self, coords, Interpolation::Linear, 0.0);
                for (i, &off) in chunk.iter().enumerate() {
                    image.pixels_mut()[off * nc..(off + 1) * nc].copy_from_slice(values.point(i));
                }
            },
        )?;

        // an unmasked source defines every visited pixel
        Ok(MaskedImage::from_parts(image, template.clone())
            .expect("warped image shares the template shape"))
    }
}

impl Warp for MaskedImage {
    type ShapeOutput = MaskedImage;
    type MaskOutput = MaskedImage;

    fn warp_to_shape(
        &self,
        shape: impl Into<Shape>,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<MaskedImage, WarpError> {
        let dest_shape = shape.into();
        check_dims(self.n_dims(), dest_shape.n_dims(), transform.n_dims())?;

        let offsets: Vec<usize> = (0..dest_shape.n_pixels()).collect();
        warp_masked_into(self, &dest_shape, &offsets, transform, batch_size)
    }

    fn warp_to_mask(
        &self,
        template: &BooleanMask,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<MaskedImage, WarpError> {
        check_dims(self.n_dims(), template.n_dims(), transform.n_dims())?;

        let offsets = template.true_offsets();
        warp_masked_into(self, template.shape(), &offsets, transform, batch_size)
    }
}

/// Shared assembly for masked warps: visited pixels whose interpolation
/// neighborhood is fully defined get the sampled value and mask true,
/// everything else keeps the zero placeholder and mask false.
fn warp_masked_into(
    source: &MaskedImage,
    dest_shape: &Shape,
    offsets: &[usize],
    transform: &impl SpatialTransform,
    batch_size: Option<usize>,
) -> Result<MaskedImage, WarpError> {
    let nc = source.n_channels();
    let mut image = Image::init_blank(dest_shape.clone(), nc, 0.0);
    let mut mask = BooleanMask::init_fill(dest_shape.clone(), false);
    for_each_batch(transform, dest_shape, offsets, batch_size, |chunk, coords| {
        let (values, valid) = sample_masked_with_validity(source, coords, Interpolation::Linear);
        for (i, &off) in chunk.iter().enumerate() {
            if valid[i] {
                image.pixels_mut()[off * nc..(off + 1) * nc].copy_from_slice(values.point(i));
                mask.data_mut()[off] = true;
            }
        }
    })?;

    Ok(MaskedImage::from_parts(image, mask).expect("warped image and mask share a shape"))
}

impl Warp for BooleanMask {
    type ShapeOutput = BooleanMask;
    type MaskOutput = BooleanMask;

    fn warp_to_shape(
        &self,
        shape: impl Into<Shape>,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<BooleanMask, WarpError> {
        let dest_shape = shape.into();
        check_dims(self.n_dims(), dest_shape.n_dims(), transform.n_dims())?;

        let offsets: Vec<usize> = (0..dest_shape.n_pixels()).collect();
        warp_mask_into(self, &dest_shape, &offsets, transform, batch_size)
    }

    fn warp_to_mask(
        &self,
        template: &BooleanMask,
        transform: &impl SpatialTransform,
        batch_size: Option<usize>,
    ) -> Result<BooleanMask, WarpError> {
        check_dims(self.n_dims(), template.n_dims(), transform.n_dims())?;

        let offsets = template.true_offsets();
        warp_mask_into(self, template.shape(), &offsets, transform, batch_size)
    }
}

fn warp_mask_into(
    source: &BooleanMask,
    dest_shape: &Shape,
    offsets: &[usize],
    transform: &impl SpatialTransform,
    batch_size: Option<usize>,
) -> Result<BooleanMask, WarpError> {
    let mut out = BooleanMask::init_fill(dest_shape.clone(), false);
    for_each_batch(transform, dest_shape, offsets, batch_size, |chunk, coords| {
        let sampled = sample_mask(source, coords);
        for (i, &off) in chunk.iter().enumerate() {
            out.data_mut()[off] = sampled[i];
        }
    })?;
    Ok(out)
}

fn check_dims(source: usize, dest: usize, transform: usize) -> Result<(), WarpError> {
    if dest != source {
        return Err(WarpError::DimensionMismatch {
            expected: source,
            actual: dest,
        });
    }
    if transform != source {
        return Err(WarpError::DimensionMismatch {
            expected: source,
            actual: transform,
        });
    }
    Ok(())
}

/// Chunks the destination offsets, derives each chunk's source coordinates
/// through the transform's inverse mapping, and hands both to `assemble`.
fn for_each_batch(
    transform: &impl SpatialTransform,
    dest_shape: &Shape,
    offsets: &[usize],
    batch_size: Option<usize>,
    mut assemble: impl FnMut(&[usize], &[f32]),
) -> Result<(), WarpError> {
    let size = batch_size.unwrap_or(offsets.len()).max(1);
    debug!(
        "warping {} destination pixels in batches of at most {size}",
        offsets.len()
    );

    let n_dims = dest_shape.n_dims();
    let mut index = vec![0usize; n_dims];
    let mut point = vec![0f32; n_dims];
    let mut mapped = vec![0f32; n_dims];
    let mut coords = Vec::new();
    for chunk in offsets.chunks(size) {
        coords.clear();
        coords.reserve(chunk.len() * n_dims);
        for &off in chunk {
            dest_shape.index_into(off, &mut index);
            for (p, &i) in point.iter_mut().zip(&index) {
                *p = i as f32;
            }
            transform.inverse_map(&point, &mut mapped)?;
            coords.extend_from_slice(&mapped);
        }
        assemble(chunk, &coords);
    }
    Ok(())
}
