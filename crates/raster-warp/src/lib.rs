//! Umbrella crate for the `raster-warp` workspace.
//!
//! Re-exports the raster data model (`rw-core`) and the resampling engine
//! (`rw-warp`).

pub use rw_core::*;
pub use rw_warp::*;
