pub mod api_key;
pub mod extractor;

pub use extractor::ApiKey;
