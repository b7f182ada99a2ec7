pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod fonts;
pub(crate) mod store;
