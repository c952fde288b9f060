use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use std::{fmt, str::FromStr};

use crate::common::error::OfferError;

pub type OfferIdString = String;
pub type TradeIdString = String;

// Remote trade offer states. Numeric codes follow the remote service, with
// `Invalid` doubling as the local pre-send state.
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug, Display, IntoStaticStr,
)]
#[serde(from = "i64", into = "i64")]
pub enum TradeOfferState {
    Invalid,
    Active,
    Accepted,
    Countered,
    Expired,
    Cancelled,
    Declined,
    InvalidItems,
    EmailPending,
    EmailCancelled,
    InEscrow,
    Unknown(i64),
}

impl TradeOfferState {
    pub fn code(&self) -> i64 {
        match self {
            TradeOfferState::Invalid => 1,
            TradeOfferState::Active => 2,
            TradeOfferState::Accepted => 3,
            TradeOfferState::Countered => 4,
            TradeOfferState::Expired => 5,
            TradeOfferState::Cancelled => 6,
            TradeOfferState::Declined => 7,
            TradeOfferState::InvalidItems => 8,
            TradeOfferState::EmailPending => 9,
            TradeOfferState::EmailCancelled => 10,
            TradeOfferState::InEscrow => 11,
            TradeOfferState::Unknown(code) => *code,
        }
    }

    pub fn is_active(&self) -> bool {
        *self == TradeOfferState::Active
    }
}

impl From<i64> for TradeOfferState {
    fn from(code: i64) -> Self {
        match code {
            1 => TradeOfferState::Invalid,
            2 => TradeOfferState::Active,
            3 => TradeOfferState::Accepted,
            4 => TradeOfferState::Countered,
            5 => TradeOfferState::Expired,
            6 => TradeOfferState::Cancelled,
            7 => TradeOfferState::Declined,
            8 => TradeOfferState::InvalidItems,
            9 => TradeOfferState::EmailPending,
            10 => TradeOfferState::EmailCancelled,
            11 => TradeOfferState::InEscrow,
            other => TradeOfferState::Unknown(other),
        }
    }
}

impl From<TradeOfferState> for i64 {
    fn from(state: TradeOfferState) -> i64 {
        state.code()
    }
}

#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Debug,
    Default,
    EnumString,
    Display,
    IntoStaticStr,
)]
pub enum OfferFilter {
    ActiveOnly,
    HistoricalOnly,
    #[default]
    All,
}

// Individual account in the public universe
const STEAM_ID_INDIVIDUAL_BASE: u64 = 76561197960265728;

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[serde(try_from = "u64")]
pub struct SteamId(u64);

impl SteamId {
    pub fn from_account_id(account_id: u32) -> Self {
        SteamId(STEAM_ID_INDIVIDUAL_BASE + account_id as u64)
    }

    pub fn from_steam64(steam64: u64) -> Result<Self, OfferError> {
        match steam64.checked_sub(STEAM_ID_INDIVIDUAL_BASE) {
            Some(offset) if offset <= u32::MAX as u64 => Ok(SteamId(steam64)),
            _ => Err(OfferError::InvalidPartner(steam64.to_string())),
        }
    }

    pub fn account_id(&self) -> u32 {
        (self.0 - STEAM_ID_INDIVIDUAL_BASE) as u32
    }

    pub fn steam64(&self) -> u64 {
        self.0
    }

    pub fn steam3(&self) -> String {
        format!("[U:1:{}]", self.account_id())
    }
}

impl TryFrom<u64> for SteamId {
    type Error = OfferError;

    fn try_from(steam64: u64) -> Result<Self, Self::Error> {
        SteamId::from_steam64(steam64)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = OfferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || OfferError::InvalidPartner(s.to_string());

        if let Some(inner) = input
            .strip_prefix("[U:")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let (universe, account) = inner.split_once(':').ok_or_else(invalid)?;
            if universe != "1" {
                return Err(invalid());
            }
            let account_id = account.parse::<u32>().map_err(|_| invalid())?;
            return Ok(SteamId::from_account_id(account_id));
        }

        if let Some(rest) = input.strip_prefix("STEAM_") {
            let parts: Vec<&str> = rest.split(':').collect();
            let [_universe, y, z] = parts.as_slice() else {
                return Err(invalid());
            };
            let y = y.parse::<u32>().map_err(|_| invalid())?;
            let z = z.parse::<u32>().map_err(|_| invalid())?;
            if y > 1 {
                return Err(invalid());
            }
            let account_id = z
                .checked_mul(2)
                .and_then(|v| v.checked_add(y))
                .ok_or_else(invalid)?;
            return Ok(SteamId::from_account_id(account_id));
        }

        let steam64 = input.parse::<u64>().map_err(|_| invalid())?;
        SteamId::from_steam64(steam64).map_err(|_| invalid())
    }
}
