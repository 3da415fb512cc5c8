pub mod manager;
pub mod memory;
pub mod repository;

pub use manager::{Database, DatabaseError};
pub use memory::MemoryProductRepository;
pub use repository::{PgProductRepository, ProductRepository};
