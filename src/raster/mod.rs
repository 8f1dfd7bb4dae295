pub mod image;
pub mod reference;
