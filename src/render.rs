pub(crate) mod blur;
pub(crate) mod compose;
pub(crate) mod frame;
pub(crate) mod layout;
pub(crate) mod raster;
pub(crate) mod text;
