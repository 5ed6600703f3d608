pub mod validation;

pub use validation::{DEFAULT_TABLE_PREFIX, InputValidator, MAX_TABLE_PREFIX_LEN};
