pub mod build;
pub mod price;
pub mod study;
pub mod validate;
