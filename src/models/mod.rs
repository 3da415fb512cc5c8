pub mod patch;
pub mod product;

pub use patch::Patch;
pub use product::{CreateProduct, Product, ProductQuery, UpdateProduct};
