pub(crate) mod cover;
pub(crate) mod status;
