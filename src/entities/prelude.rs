pub use super::collections::Entity as Collections;
pub use super::images::Entity as Images;
