pub(crate) mod card;
pub(crate) mod composite;
pub(crate) mod config;
pub(crate) mod frame;
pub(crate) mod overlay;
pub(crate) mod text;
