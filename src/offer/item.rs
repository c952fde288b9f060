use serde::{Deserialize, Serialize};

use crate::common::serde_helpers;

fn default_amount() -> u64 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Item {
    pub appid: u32,
    #[serde(deserialize_with = "serde_helpers::id_string")]
    pub contextid: String,
    #[serde(deserialize_with = "serde_helpers::id_string")]
    pub assetid: String,
    #[serde(
        default = "default_amount",
        deserialize_with = "serde_helpers::number_from_any"
    )]
    pub amount: u64,
}

impl Item {
    pub fn new(appid: u32, contextid: impl Into<String>, assetid: impl Into<String>) -> Self {
        Self {
            appid,
            contextid: contextid.into(),
            assetid: assetid.into(),
            amount: default_amount(),
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    // Same asset, regardless of amount
    pub fn is_same_asset(&self, other: &Item) -> bool {
        self.appid == other.appid
            && self.contextid == other.contextid
            && self.assetid == other.assetid
    }
}
