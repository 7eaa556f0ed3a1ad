pub mod font;
pub mod raster;
