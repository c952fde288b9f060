mod access;
mod item;
mod offer;
pub(crate) mod record;
mod request;
mod response;

pub use access::OfferAccess;
pub(crate) use access::OfferEngine;
pub use item::Item;
pub use offer::{AcceptOutcome, Offer, OfferBackend, OfferSnapshot, SendOutcome};
pub use request::GetOffersOptions;
