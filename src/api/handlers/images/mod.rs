pub mod download;
pub mod list;
pub mod manage;
pub mod types;
pub mod upload;

// Re-export all types
pub use types::*;

// Re-export all handlers
pub use download::download_image;
pub use list::{list_images, sync_images};
pub use manage::{delete_image, detach_collection, get_image, update_image};
pub use upload::upload_images;
