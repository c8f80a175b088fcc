mod catalog_errors;
mod validation_errors;

pub use catalog_errors::*;
pub use validation_errors::*;
