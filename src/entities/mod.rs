pub mod prelude;

pub mod collections;
pub mod images;
