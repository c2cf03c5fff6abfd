//! Geometric resampling on top of `rw-core` rasters.
//!
//! ## Backward Warping
//! [`Warp`] produces a new raster by asking a [`SpatialTransform`] for the
//! source coordinate of every destination pixel and sampling the source
//! there. The output variant mirrors the input (image to image, masked to
//! masked, mask to mask); warping into a template mask restricts evaluation
//! to the template's true region.
//!
//! ## Mask Propagation
//! Sampling invalidity (out-of-bounds neighborhoods, mask-false source
//! pixels) is folded into the destination mask rather than raised, so warps
//! over large destinations never abort on individual undefined pixels.
//!
//! ## Batching
//! Destination coordinates can be processed in bounded-size batches to cap
//! peak memory. Batches are sequential and per-pixel work is independent;
//! results are bit-identical for every batch size.

mod error;
mod resize;
mod transform;
mod warp;

pub use error::WarpError;
pub use resize::Resize;
pub use transform::{Affine, SpatialTransform};
pub use warp::Warp;
