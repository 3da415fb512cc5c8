pub mod extract;
pub mod validate;

pub use extract::{parse_id, ApiQuery, ValidatedJson};
pub use validate::{FieldErrors, Validate};
