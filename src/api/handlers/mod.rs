pub mod collections;
pub mod health;
pub mod images;
