pub(crate) mod decode;
pub(crate) mod font;
pub(crate) mod store;
pub(crate) mod svg_raster;
