mod client_identity_extractor;
mod validation_extractor;

pub use client_identity_extractor::*;
pub use validation_extractor::*;
