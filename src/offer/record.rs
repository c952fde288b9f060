//! Remote representations returned by the trade offer web API.

use serde::Deserialize;

use super::Item;
use crate::common::{
    serde_helpers,
    types::{OfferIdString, TradeIdString, TradeOfferState},
};

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub response: Option<T>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SingleOfferResponse {
    pub offer: Option<OfferRecord>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct OffersResponse {
    #[serde(default)]
    pub trade_offers_sent: Vec<OfferRecord>,
    #[serde(default)]
    pub trade_offers_received: Vec<OfferRecord>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct OfferRecord {
    #[serde(deserialize_with = "serde_helpers::id_string")]
    pub tradeofferid: OfferIdString,
    pub accountid_other: u32,
    #[serde(default)]
    pub message: Option<String>,
    pub expiration_time: i64,
    pub trade_offer_state: TradeOfferState,
    #[serde(default)]
    pub items_to_give: Vec<Item>,
    #[serde(default)]
    pub items_to_receive: Vec<Item>,
    #[serde(default)]
    pub is_our_offer: bool,
    pub time_created: i64,
    pub time_updated: i64,
    #[serde(default, deserialize_with = "serde_helpers::opt_id_string")]
    pub tradeid: Option<TradeIdString>,
    #[serde(default)]
    pub from_real_time_trade: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TradeStatusResponse {
    #[serde(default)]
    pub trades: Vec<TradeStatusRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TradeStatusRecord {
    #[serde(default, deserialize_with = "serde_helpers::opt_id_string")]
    pub tradeid: Option<TradeIdString>,
    #[serde(default)]
    pub assets_received: Vec<ReceivedAssetRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ReceivedAssetRecord {
    pub appid: u32,
    #[serde(deserialize_with = "serde_helpers::id_string")]
    pub contextid: String,
    #[serde(deserialize_with = "serde_helpers::id_string")]
    pub assetid: String,
    #[serde(
        default = "ReceivedAssetRecord::default_amount",
        deserialize_with = "serde_helpers::number_from_any"
    )]
    pub amount: u64,
    #[serde(default, deserialize_with = "serde_helpers::opt_id_string")]
    pub new_assetid: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_id_string")]
    pub new_contextid: Option<String>,
}

impl ReceivedAssetRecord {
    fn default_amount() -> u64 {
        1
    }
}

// Settled items live under their new ids in our inventory
impl From<ReceivedAssetRecord> for Item {
    fn from(record: ReceivedAssetRecord) -> Self {
        Item {
            appid: record.appid,
            contextid: record.new_contextid.unwrap_or(record.contextid),
            assetid: record.new_assetid.unwrap_or(record.assetid),
            amount: record.amount,
        }
    }
}
