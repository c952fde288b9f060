pub mod config;
pub mod interface;
pub mod manager;
pub mod offer;
pub mod testing;

mod common;

pub use common::error::{ErrorKind, OfferError};
pub use common::types::{OfferFilter, SteamId, TradeOfferState};
