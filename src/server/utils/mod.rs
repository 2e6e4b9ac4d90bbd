pub mod sanitize_utils;
pub mod validation_utils;
