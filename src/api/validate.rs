use std::collections::HashMap;

/// Field name -> human readable problem
pub type FieldErrors = HashMap<String, String>;

/// Semantic checks applied after a payload has been deserialized
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}
