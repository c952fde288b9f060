mod offer;
mod stubs;

pub use offer::*;
pub use stubs::*;
