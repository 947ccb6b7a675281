//! Product catalog entity model.

mod category;
mod product;
pub use category::Category;
pub use product::{Product, REQUIRED_FIELDS};
