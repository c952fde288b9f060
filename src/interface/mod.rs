mod community;
mod web_api;

pub use community::*;
pub use web_api::*;

pub type FormParams = Vec<(String, String)>;
