pub mod error;
pub mod serde_helpers;
pub mod types;
pub mod utils;
