pub mod image_service;
pub mod metadata;
pub mod scratch;
pub mod storage;
