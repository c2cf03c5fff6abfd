//! Core raster primitives: dense N-dimensional multi-channel images,
//! boolean validity masks, and sub-pixel sampling.
//!
//! ## Shapes and Layout
//! A [`Shape`] is one positive extent per spatial axis; buffers linearize
//! indices row-major (last axis fastest) with channels interleaved as the
//! innermost axis. Planar images use the `(rows, cols)` convention but
//! nothing in this crate is specific to two axes.
//!
//! ## Masking
//! A [`MaskedImage`] pairs pixel storage with a same-shape [`BooleanMask`];
//! the mask is the source of truth for which pixels are defined. Sampling a
//! masked image reports, per point, whether the whole interpolation
//! neighborhood is defined, and the batched failure payload
//! ([`OutOfMaskSampleError`]) carries values and flags for every requested
//! point.
//!
//! ## Sampling Coordinates
//! Coordinates are continuous, in axis order, with integer values on pixel
//! centers. Nearest-neighbor rounds to the closest grid point; linear uses
//! the multilinear corner neighborhood with zero-weight corners excluded,
//! so on-grid coordinates read exactly one pixel. Out-of-bounds
//! neighborhoods are never clamped: plain images extend with a constant
//! value, masked images report invalidity, boolean masks read `false`.

mod buffer;
mod error;
mod image;
mod mask;
mod masked;
mod sample;
mod shape;

pub use buffer::PixelBuffer;
pub use error::Error;
pub use image::Image;
pub use mask::BooleanMask;
pub use masked::MaskedImage;
pub use sample::{
    Interpolation, OutOfMaskSampleError, SampleValues, sample_image, sample_mask, sample_masked,
    sample_masked_with_validity,
};
pub use shape::Shape;
