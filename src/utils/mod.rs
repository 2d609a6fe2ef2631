pub mod geo;
pub mod image;
