//! Off-screen GPU implementations of the edge filter.

pub mod compute;
pub mod context;
pub mod raster;
pub mod target;
pub mod texture;
