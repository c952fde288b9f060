use chrono::{DateTime, Duration, Utc};

use crate::common::error::OfferError;
use std::{fs, path::Path};

// One year ahead, effectively no historical limit
pub const DEFAULT_HISTORICAL_CUTOFF_MS: i64 = 31_536_000_000;

// Offers expire two weeks after being sent
pub const OFFER_EXPIRY_MS: i64 = 1_209_600_000;

pub fn persist(json: String, path: impl AsRef<Path>) -> Result<(), OfferError> {
    fs::write(path.as_ref(), json)?;
    Ok(())
}

pub fn restore(path: impl AsRef<Path>) -> Result<String, OfferError> {
    let json = fs::read_to_string(path.as_ref())?;
    Ok(json)
}

pub fn from_epoch_secs(secs: i64) -> Result<DateTime<Utc>, OfferError> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| OfferError::MalformedResponse(format!("Timestamp {} out of range", secs)))
}

pub fn default_historical_cutoff() -> DateTime<Utc> {
    Utc::now() + Duration::milliseconds(DEFAULT_HISTORICAL_CUTOFF_MS)
}

pub fn offer_expiry_from(sent_at: DateTime<Utc>) -> DateTime<Utc> {
    sent_at + Duration::milliseconds(OFFER_EXPIRY_MS)
}
