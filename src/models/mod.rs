/// Raster storage shared by every stage
pub mod raster;

pub use raster::Raster;
