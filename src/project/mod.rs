pub mod catalog;
pub mod document;
pub(crate) mod lenient;
pub mod model;
pub mod store;
