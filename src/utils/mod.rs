pub mod content;
pub mod validation;
